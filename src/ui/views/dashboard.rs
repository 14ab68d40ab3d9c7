use crate::api::User;
use crate::auth::Route;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Landing screen for signed-in users without admin rights
pub struct DashboardView {
  user: User,
}

impl DashboardView {
  pub fn new(user: User) -> Self {
    Self { user }
  }
}

impl View for DashboardView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Dashboard ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let dim = Style::default().fg(Color::DarkGray);
    let text = vec![
      Line::from(vec![
        Span::raw("Welcome, "),
        Span::styled(self.user.username.clone(), Style::default().fg(Color::Yellow).bold()),
      ]),
      Line::raw(""),
      Line::styled("Resident records are managed by barangay administrators.", dim),
      Line::from(vec![
        Span::styled(":logout", Style::default().fg(Color::Cyan)),
        Span::styled(" to sign out", dim),
      ]),
    ];

    frame.render_widget(
      Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
      area,
    );
  }

  fn breadcrumb_label(&self) -> String {
    Route::User.title().to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "quit").with_priority(20),
    ]
  }
}
