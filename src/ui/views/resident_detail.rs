use crate::api::Resident;
use crate::ui::components::render_resident;
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;

/// Read-only card for one resident, pushed from the table with Enter
pub struct ResidentDetailView {
  resident: Resident,
}

impl ResidentDetailView {
  pub fn new(resident: Resident) -> Self {
    Self { resident }
  }
}

impl View for ResidentDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    render_resident(frame, area, &self.resident);
  }

  fn breadcrumb_label(&self) -> String {
    self.resident.full_name()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new("q", "back").with_priority(10)]
  }
}
