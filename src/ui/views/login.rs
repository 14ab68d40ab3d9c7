use crate::api::{ApiClient, ApiError, AuthSession};
use crate::query::{Query, QueryState};
use crate::ui::components::{InputResult, Notice, TextInput};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoginField {
  Username,
  Password,
}

/// What the user sees when a login attempt fails
pub fn login_failure_message(error: &ApiError) -> String {
  match error {
    ApiError::Rejected { message, .. } => message.clone(),
    _ => "Login failed. Please try again.".to_string(),
  }
}

/// Username/password prompt
pub struct LoginView {
  client: ApiClient,
  username: TextInput,
  password: TextInput,
  focus: LoginField,
  username_error: Option<&'static str>,
  password_error: Option<&'static str>,
  login: Query<AuthSession, ApiError>,
}

impl LoginView {
  pub fn new(client: ApiClient) -> Self {
    Self {
      client,
      username: TextInput::new(),
      password: TextInput::masked(),
      focus: LoginField::Username,
      username_error: None,
      password_error: None,
      login: Query::idle(),
    }
  }

  fn focused_input(&mut self) -> &mut TextInput {
    match self.focus {
      LoginField::Username => &mut self.username,
      LoginField::Password => &mut self.password,
    }
  }

  fn toggle_focus(&mut self) {
    self.focus = match self.focus {
      LoginField::Username => LoginField::Password,
      LoginField::Password => LoginField::Username,
    };
  }

  fn submit(&mut self) -> ViewAction {
    if self.login.is_loading() {
      return ViewAction::None;
    }

    let username = self.username.value().to_string();
    let password = self.password.value().to_string();
    self.username_error = username.is_empty().then_some("Username is required");
    self.password_error = password.is_empty().then_some("Password is required");

    if self.username_error.is_some() {
      self.focus = LoginField::Username;
      return ViewAction::None;
    }
    if self.password_error.is_some() {
      self.focus = LoginField::Password;
      return ViewAction::None;
    }

    let client = self.client.clone();
    self
      .login
      .run(async move { client.login(&username, &password).await });
    ViewAction::Notify(Notice::pending("Signing in..."))
  }

  fn field_line(&self, label: &'static str, field: LoginField) -> Vec<Line<'static>> {
    let focused = self.focus == field;
    let (input, error) = match field {
      LoginField::Username => (&self.username, self.username_error),
      LoginField::Password => (&self.password, self.password_error),
    };

    let marker = if focused { "> " } else { "  " };
    let mut spans = vec![
      Span::styled(marker, Style::default().fg(Color::Yellow)),
      Span::styled(format!("{:<10}", label), Style::default().fg(Color::DarkGray)),
    ];
    spans.extend(input.spans(focused));

    let mut lines = vec![Line::from(spans)];
    if let Some(error) = error {
      lines.push(Line::styled(
        format!("            {}", error),
        Style::default().fg(Color::Red),
      ));
    }
    lines
  }
}

impl View for LoginView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
        self.toggle_focus();
        return ViewAction::None;
      }
      _ => {}
    }

    match self.focused_input().handle_key(key) {
      InputResult::Submitted(_) if self.focus == LoginField::Username => {
        self.focus = LoginField::Password;
        ViewAction::None
      }
      InputResult::Submitted(_) => self.submit(),
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let width = 50.min(area.width);
    let height = 9.min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let card = Rect::new(x, y, width, height);

    let title = match self.login.state() {
      QueryState::Loading => " Sign in (signing in...) ",
      _ => " Sign in ",
    };
    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let mut lines = vec![Line::raw("")];
    lines.extend(self.field_line("Username", LoginField::Username));
    lines.extend(self.field_line("Password", LoginField::Password));
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
      Span::styled("<enter>", Style::default().fg(Color::Cyan)),
      Span::styled(" sign in   ", Style::default().fg(Color::DarkGray)),
      Span::styled("<tab>", Style::default().fg(Color::Cyan)),
      Span::styled(" switch field", Style::default().fg(Color::DarkGray)),
    ]));

    frame.render_widget(Clear, card);
    frame.render_widget(Paragraph::new(lines).block(block), card);
  }

  fn breadcrumb_label(&self) -> String {
    "Login".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    if !self.login.poll() {
      return ViewAction::None;
    }
    match self.login.take() {
      Some(Ok(session)) => {
        self.password.clear();
        ViewAction::SignedIn(session)
      }
      Some(Err(e)) => {
        tracing::warn!(error = %e, "login failed");
        ViewAction::Notify(Notice::error(login_failure_message(&e)))
      }
      None => ViewAction::None,
    }
  }

  fn captures_input(&self) -> bool {
    true
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new("enter", "sign in").with_priority(10),
      ShortcutInfo::new("tab", "next field").with_priority(20),
      ShortcutInfo::new("ctrl-c", "quit").with_priority(30),
    ]
  }
}
