use super::KeyResult;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState};

/// Events emitted by the option picker that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickerEvent {
  /// Index into the options passed to `show`
  Selected(usize),
  Cancelled,
}

/// Centered single-choice list, used for the gender and barangay filters
#[derive(Debug, Clone, Default)]
pub struct OptionPicker {
  active: bool,
  options: Vec<String>,
  selected: usize,
  title: String,
}

impl OptionPicker {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  /// Show `options` with `selected` highlighted
  pub fn show(&mut self, title: impl Into<String>, options: Vec<String>, selected: usize) {
    self.active = true;
    self.selected = selected.min(options.len().saturating_sub(1));
    self.options = options;
    self.title = title.into();
  }

  pub fn hide(&mut self) {
    self.active = false;
    self.options.clear();
    self.selected = 0;
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<PickerEvent> {
    if !self.active {
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => {
        self.hide();
        KeyResult::Event(PickerEvent::Cancelled)
      }
      KeyCode::Enter => {
        let event = if self.selected < self.options.len() {
          PickerEvent::Selected(self.selected)
        } else {
          PickerEvent::Cancelled
        };
        self.hide();
        KeyResult::Event(event)
      }
      KeyCode::Char('j') | KeyCode::Down => {
        if !self.options.is_empty() {
          self.selected = (self.selected + 1) % self.options.len();
        }
        KeyResult::Handled
      }
      KeyCode::Char('k') | KeyCode::Up => {
        if !self.options.is_empty() {
          self.selected = (self.selected + self.options.len() - 1) % self.options.len();
        }
        KeyResult::Handled
      }
      _ => KeyResult::Handled,
    }
  }

  /// Render the picker overlay if active
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active || self.options.is_empty() {
      return;
    }

    let longest = self
      .options
      .iter()
      .map(|o| o.chars().count())
      .chain(std::iter::once(self.title.chars().count()))
      .max()
      .unwrap_or(10) as u16;
    let width = (longest + 6).max(20).min(area.width.saturating_sub(4));
    let height = (self.options.len() as u16 + 2).max(3).min(area.height.saturating_sub(4));

    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(format!(" {} ", self.title));

    let inner = block.inner(overlay_area);
    frame.render_widget(block, overlay_area);

    if inner.height == 0 {
      return;
    }

    let items: Vec<ListItem> = self
      .options
      .iter()
      .map(|option| ListItem::new(Span::styled(option.as_str(), Style::default().fg(Color::Cyan))))
      .collect();

    let list = List::new(items).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));

    let mut state = ListState::default();
    state.select(Some(self.selected));
    frame.render_stateful_widget(list, inner, &mut state);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn options() -> Vec<String> {
    vec!["All".to_string(), "Male".to_string(), "Female".to_string()]
  }

  #[test]
  fn test_navigation_wraps() {
    let mut picker = OptionPicker::new();
    picker.show("Gender", options(), 0);
    picker.handle_key(key(KeyCode::Up));
    assert_eq!(picker.handle_key(key(KeyCode::Enter)), KeyResult::Event(PickerEvent::Selected(2)));
    assert!(!picker.is_active());
  }

  #[test]
  fn test_initial_selection_and_cancel() {
    let mut picker = OptionPicker::new();
    picker.show("Gender", options(), 1);
    picker.handle_key(key(KeyCode::Char('j')));
    assert_eq!(picker.handle_key(key(KeyCode::Enter)), KeyResult::Event(PickerEvent::Selected(2)));

    picker.show("Gender", options(), 7);
    assert_eq!(picker.handle_key(key(KeyCode::Esc)), KeyResult::Event(PickerEvent::Cancelled));
  }
}
