use crate::api::User;
use crate::ui::view::ShortcutInfo;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with logo, title, signed-in user, and shortcuts
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  title: &str,
  user: Option<&User>,
  shortcuts: &[ShortcutInfo],
) {
  let mut spans = vec![
    Span::styled(" brgy ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", title), Style::default().fg(Color::White)),
  ];

  if let Some(user) = user {
    spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(
      format!(" {} ", user_label(user)),
      Style::default().fg(Color::Yellow).bold(),
    ));
  }

  spans.push(Span::raw(" "));

  // Keys and brackets highlighted, descriptions dimmed
  let mut sorted: Vec<&ShortcutInfo> = shortcuts.iter().collect();
  sorted.sort_by_key(|s| s.priority);
  for shortcut in sorted {
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
      format!("<{}>", shortcut.key),
      Style::default().fg(Color::Cyan),
    ));
    spans.push(Span::styled(
      format!(" {}", shortcut.label),
      Style::default().fg(Color::DarkGray),
    ));
  }

  let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
  frame.render_widget(paragraph, area);
}

fn user_label(user: &User) -> String {
  if user.is_admin {
    format!("{} (admin)", user.username)
  } else {
    user.username.clone()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_user_label() {
    let mut user = User {
      id: 1,
      username: "kap".to_string(),
      is_admin: true,
    };
    assert_eq!(user_label(&user), "kap (admin)");
    user.is_admin = false;
    assert_eq!(user_label(&user), "kap");
  }
}
