use ratatui::prelude::*;
use std::time::{Duration, Instant};

const DISPLAY_TIME: Duration = Duration::from_secs(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
  /// Work in progress; stays until replaced
  Pending,
  Info,
  Success,
  Error,
}

/// A status-line message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
  pub message: String,
  pub level: NoticeLevel,
}

impl Notice {
  pub fn pending(message: impl Into<String>) -> Self {
    Self::new(message, NoticeLevel::Pending)
  }

  pub fn info(message: impl Into<String>) -> Self {
    Self::new(message, NoticeLevel::Info)
  }

  pub fn success(message: impl Into<String>) -> Self {
    Self::new(message, NoticeLevel::Success)
  }

  pub fn error(message: impl Into<String>) -> Self {
    Self::new(message, NoticeLevel::Error)
  }

  fn new(message: impl Into<String>, level: NoticeLevel) -> Self {
    Self {
      message: message.into(),
      level,
    }
  }

  pub fn style(&self) -> Style {
    match self.level {
      NoticeLevel::Pending => Style::default().fg(Color::Yellow),
      NoticeLevel::Info => Style::default().fg(Color::White),
      NoticeLevel::Success => Style::default().fg(Color::Green),
      NoticeLevel::Error => Style::default().fg(Color::Red).bold(),
    }
  }
}

/// Latest notice plus when it was shown
#[derive(Debug, Default)]
pub struct Notifications {
  current: Option<(Notice, Instant)>,
}

impl Notifications {
  pub fn push(&mut self, notice: Notice) {
    match notice.level {
      NoticeLevel::Error => tracing::warn!(message = %notice.message, "notice"),
      _ => tracing::debug!(message = %notice.message, "notice"),
    }
    self.current = Some((notice, Instant::now()));
  }

  pub fn clear(&mut self) {
    self.current = None;
  }

  /// The notice to show now; finished ones fade after a few seconds
  pub fn current(&self) -> Option<&Notice> {
    let (notice, shown_at) = self.current.as_ref()?;
    if notice.level != NoticeLevel::Pending && shown_at.elapsed() > DISPLAY_TIME {
      return None;
    }
    Some(notice)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_latest_notice_wins() {
    let mut notices = Notifications::default();
    assert!(notices.current().is_none());
    notices.push(Notice::pending("Adding resident..."));
    notices.push(Notice::success("Resident added"));
    assert_eq!(notices.current(), Some(&Notice::success("Resident added")));
    notices.clear();
    assert!(notices.current().is_none());
  }

  #[test]
  fn test_pending_never_expires() {
    let mut notices = Notifications::default();
    notices.current = Some((
      Notice::pending("Archiving resident..."),
      Instant::now() - Duration::from_secs(60),
    ));
    assert!(notices.current().is_some());

    notices.current = Some((Notice::info("done"), Instant::now() - Duration::from_secs(60)));
    assert!(notices.current().is_none());
  }
}
