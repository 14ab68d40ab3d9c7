use crate::api::AuthSession;
use crate::auth::Route;
use crate::ui::components::Notice;
use crossterm::event::KeyEvent;
use ratatui::prelude::*;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to input or a tick
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
  /// Show a message in the status line
  Notify(Notice),
  /// Login succeeded; persist the token and route by role
  SignedIn(AuthSession),
  /// The server no longer accepts our token
  SessionExpired,
  /// Replace the stack with another top-level screen
  Navigate(Route),
}

/// Trait for view behavior
///
/// Views handle their own input modes (search, forms, pickers) and return
/// actions for the App to execute: App → View → Components.
///
/// Views that load data asynchronously hold a `Query` or `QueryObserver`
/// and poll it in `tick()`.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Called on each tick to poll async work
  fn tick(&mut self) -> ViewAction {
    ViewAction::None
  }

  /// The terminal regained focus
  fn on_focus(&mut self) {}

  /// `:refresh`
  fn refresh(&mut self) {}

  /// True while a text field owns the keyboard, so `:` is typed, not a command
  fn captures_input(&self) -> bool {
    false
  }

  /// Keyboard shortcuts to display in the header
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}
