pub mod components;
pub mod renderfns;
pub mod view;
pub mod views;

use crate::app::App;
use ratatui::prelude::*;
use ratatui::widgets::{Paragraph, TableState};
use renderfns::{draw_footer, draw_header};

/// Keep a table cursor on an existing row: first row when unset, last row when past the end
pub fn ensure_valid_selection(state: &mut TableState, len: usize) {
  if len == 0 {
    state.select(None);
    return;
  }
  match state.selected() {
    None => state.select(Some(0)),
    Some(i) if i >= len => state.select(Some(len - 1)),
    Some(_) => {}
  }
}

/// Main draw function
pub fn draw(frame: &mut Frame, app: &mut App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Main content
      Constraint::Length(1), // Footer
    ])
    .split(frame.area());

  let title = app.title();
  let shortcuts = app.shortcuts();
  draw_header(frame, chunks[0], &title, app.user(), &shortcuts);

  match app.current_view_mut() {
    Some(view) => view.render(frame, chunks[1]),
    None => {
      let waiting = Paragraph::new("Checking session...")
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(waiting, chunks[1]);
    }
  }

  let breadcrumb = app.view_breadcrumb();
  draw_footer(frame, chunks[2], &breadcrumb, app.notice());

  app.command().render_overlay(frame, chunks[1]);
}
