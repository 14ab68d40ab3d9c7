use crate::auth::Route;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Shown when a signed-in user asks for a screen their role can't open
pub struct UnauthorizedView {
  home: Route,
}

impl UnauthorizedView {
  pub fn new(home: Route) -> Self {
    Self { home }
  }
}

impl View for UnauthorizedView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Enter | KeyCode::Char('h') => ViewAction::Navigate(self.home),
      KeyCode::Char('l') => ViewAction::Navigate(Route::Login),
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let block = Block::default()
      .title(" Unauthorized ")
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Red));

    let text = vec![
      Line::from(Span::styled(
        "You do not have permission to view this page.",
        Style::default().fg(Color::Red).bold(),
      )),
      Line::raw(""),
      Line::from(vec![
        Span::styled("<enter>", Style::default().fg(Color::Cyan)),
        Span::styled(
          format!(" go to {}   ", self.home.title()),
          Style::default().fg(Color::DarkGray),
        ),
        Span::styled("<l>", Style::default().fg(Color::Cyan)),
        Span::styled(" login", Style::default().fg(Color::DarkGray)),
      ]),
    ];

    frame.render_widget(
      Paragraph::new(text).block(block).wrap(Wrap { trim: true }),
      area,
    );
  }

  fn breadcrumb_label(&self) -> String {
    Route::Unauthorized.title().to_string()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("enter", "home").with_priority(20),
    ]
  }
}
