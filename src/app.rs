use crate::api::{ApiClient, ApiError, AuthSession, User};
use crate::auth::{self, Route};
use crate::cache::{QueryCache, RetryPolicy};
use crate::commands::CommandId;
use crate::config::Config;
use crate::event::{Event, EventHandler};
use crate::query::Query;
use crate::residents::ResidentsService;
use crate::session::SessionStore;
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult, Notice, Notifications};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{DashboardView, LoginView, ResidentsView, UnauthorizedView};
use color_eyre::Result;
use crossterm::event::{DisableFocusChange, EnableFocusChange, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

const TICK_RATE: Duration = Duration::from_millis(100);
const GC_INTERVAL: Duration = Duration::from_secs(30);

/// Main application state
pub struct App {
  config: Config,
  client: ApiClient,
  session: SessionStore,
  /// Shared by every view; cleared on sign-in and sign-out
  cache: QueryCache,
  service: ResidentsService,
  user: Option<User>,

  /// Navigation stack - the route's screen is always at index 0
  view_stack: Vec<Box<dyn View>>,
  command: CommandInput,
  notices: Notifications,
  /// Startup `auth/me` check for a persisted token
  session_check: Query<User, ApiError>,

  last_gc: Instant,
  should_quit: bool,
}

impl App {
  pub fn new(config: Config, session: SessionStore) -> Result<Self> {
    let client = ApiClient::new(&config, session.clone())?;
    let cache = QueryCache::new(config.cache.stale_time());
    let retry = RetryPolicy::new(config.cache.retry);
    let service = ResidentsService::new(client.clone(), cache.clone(), retry);

    Ok(Self {
      config,
      client,
      session,
      cache,
      service,
      user: None,
      view_stack: Vec::new(),
      command: CommandInput::new(),
      notices: Notifications::default(),
      session_check: Query::idle(),
      last_gc: Instant::now(),
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableFocusChange)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Cleanup terminal, even when the loop failed
    stdout().execute(DisableFocusChange)?;
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);
    self.start();

    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }
    Ok(())
  }

  /// Resume a persisted session, or show the login screen
  fn start(&mut self) {
    if self.session.is_signed_in() {
      info!("checking persisted session");
      let client = self.client.clone();
      self.session_check.run(async move { client.me().await });
      self.notices.push(Notice::pending("Checking session..."));
    } else {
      self.navigate(Route::Login);
    }
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::FocusGained => {
        if let Some(view) = self.view_stack.last_mut() {
          view.on_focus();
        }
      }
      Event::Tick => self.tick(),
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    let view_has_keyboard = self
      .view_stack
      .last()
      .map(|v| v.captures_input())
      .unwrap_or(false);
    if self.command.is_active() || !view_has_keyboard {
      match self.command.handle_key(key) {
        KeyResult::Event(CommandEvent::Submitted(id)) => return self.execute(id),
        KeyResult::Event(CommandEvent::Unknown(name)) => {
          return self.notices.push(Notice::error(format!("Unknown command: {}", name)));
        }
        KeyResult::Event(CommandEvent::Cancelled) | KeyResult::Handled => return,
        KeyResult::NotHandled => {}
      }
    }

    if let Some(view) = self.view_stack.last_mut() {
      let action = view.handle_key(key);
      self.apply(action);
    }
  }

  fn execute(&mut self, command: CommandId) {
    info!(?command, "command");
    match command {
      CommandId::Residents => self.navigate(Route::Admin),
      CommandId::Dashboard => self.navigate(Route::User),
      CommandId::Refresh => {
        if let Some(view) = self.view_stack.last_mut() {
          view.refresh();
        }
      }
      CommandId::Logout => self.logout(),
      CommandId::Quit => self.should_quit = true,
    }
  }

  fn tick(&mut self) {
    if self.session_check.poll() {
      match self.session_check.take() {
        Some(Ok(user)) => {
          info!(user = %user.username, "session still valid");
          self.notices.push(Notice::success("Already signed in"));
          self.user = Some(user);
          self.navigate(auth::home_for(self.user.as_ref()));
        }
        Some(Err(e)) => {
          warn!(error = %e, "persisted session rejected");
          self.expire_session();
        }
        None => {}
      }
    }

    // Views below the top still have requests to settle
    let actions: Vec<ViewAction> = self.view_stack.iter_mut().map(|v| v.tick()).collect();
    for action in actions {
      self.apply(action);
    }

    if self.last_gc.elapsed() >= GC_INTERVAL {
      self.cache.collect_garbage(self.config.cache.gc_time());
      self.last_gc = Instant::now();
    }
  }

  fn apply(&mut self, action: ViewAction) {
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.view_stack.push(view),
      ViewAction::Pop => {
        if self.view_stack.len() > 1 {
          self.view_stack.pop();
        } else {
          self.should_quit = true;
        }
      }
      ViewAction::Notify(notice) => self.notices.push(notice),
      ViewAction::SignedIn(session) => self.sign_in(session),
      ViewAction::SessionExpired => self.expire_session(),
      ViewAction::Navigate(route) => self.navigate(route),
    }
  }

  /// Replace the stack with the screen `requested` resolves to for the current user
  fn navigate(&mut self, requested: Route) {
    let route = auth::resolve(requested, self.user.as_ref());
    if route != requested {
      info!(?requested, ?route, "route redirected");
    }
    let view = self.build_view(route);
    self.view_stack = vec![view];
  }

  fn build_view(&self, route: Route) -> Box<dyn View> {
    match (route, &self.user) {
      (Route::Admin, Some(user)) => {
        let created_by = self.config.defaults.created_by.unwrap_or(user.id);
        Box::new(ResidentsView::new(
          self.service.clone(),
          self.config.table.page_size,
          created_by,
        ))
      }
      (Route::User, Some(user)) => Box::new(DashboardView::new(user.clone())),
      (Route::Unauthorized, user) => Box::new(UnauthorizedView::new(auth::home_for(user.as_ref()))),
      _ => Box::new(LoginView::new(self.client.clone())),
    }
  }

  fn sign_in(&mut self, session: AuthSession) {
    if let Err(e) = self.session.save(&session.token) {
      error!(error = %e, "could not persist session");
      self.notices.push(Notice::error(format!("Signed in, but the session was not saved: {}", e)));
    } else {
      self.notices.push(Notice::success("Welcome back"));
    }
    info!(user = %session.user.username, admin = session.user.is_admin, "signed in");
    self.cache.clear();
    self.user = Some(session.user);
    self.navigate(auth::home_for(self.user.as_ref()));
  }

  fn end_session(&mut self) {
    if let Err(e) = self.session.clear() {
      error!(error = %e, "could not remove persisted session");
    }
    self.cache.clear();
    self.user = None;
  }

  fn expire_session(&mut self) {
    self.end_session();
    self.notices.push(Notice::error("Session expired, please login"));
    self.navigate(Route::Login);
  }

  fn logout(&mut self) {
    if self.user.is_none() && !self.session.is_signed_in() {
      self.notices.push(Notice::info("Not signed in"));
      return;
    }
    info!("signing out");
    self.end_session();
    self.notices.push(Notice::info("Signed out"));
    self.navigate(Route::Login);
  }

  // Accessors for UI rendering

  pub fn title(&self) -> String {
    self.config.display_title()
  }

  pub fn user(&self) -> Option<&User> {
    self.user.as_ref()
  }

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn shortcuts(&self) -> Vec<ShortcutInfo> {
    self
      .view_stack
      .last()
      .map(|v| v.shortcuts())
      .unwrap_or_default()
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }

  pub fn notice(&self) -> Option<&Notice> {
    self.notices.current()
  }

  pub fn command(&self) -> &CommandInput {
    &self.command
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::fixtures;
  use crate::residents::ResidentsQuery;
  use axum::http::{HeaderMap, StatusCode};
  use axum::routing::get;
  use axum::{Json, Router};
  use serde_json::json;

  /// `auth/me` answers per token: `admin`, `user`, anything else is rejected
  async fn spawn_server() -> String {
    let router = Router::new()
      .route(
        "/auth/me",
        get(|headers: HeaderMap| async move {
          let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
          match auth.as_str() {
            "Bearer admin" => (
              StatusCode::OK,
              Json(json!({ "user": { "id": 1, "username": "kap", "isAdmin": 1 } })),
            ),
            "Bearer user" => (
              StatusCode::OK,
              Json(json!({ "user": { "id": 2, "username": "juan", "isAdmin": 0 } })),
            ),
            _ => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid token" }))),
          }
        }),
      )
      .route(
        "/residents",
        get(|| async { Json(json!({ "data": [], "page": 1, "pageSize": 10, "total": 0 })) }),
      );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
  }

  fn app(url: &str, token: Option<&str>) -> (App, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let session = SessionStore::at(dir.path().join("session.json"));
    if let Some(token) = token {
      session.save(token).unwrap();
    }
    (App::new(Config::with_url(url), session).unwrap(), dir)
  }

  async fn settle(app: &mut App) {
    for _ in 0..200 {
      app.tick();
      if !app.view_stack.is_empty() {
        return;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("session check never finished");
  }

  #[tokio::test]
  async fn test_signed_out_starts_at_login() {
    let (mut app, _dir) = app("http://127.0.0.1:9", None);
    app.start();
    assert_eq!(app.view_breadcrumb(), vec!["Login"]);
  }

  #[tokio::test]
  async fn test_admin_token_opens_residents() {
    let url = spawn_server().await;
    let (mut app, _dir) = app(&url, Some("admin"));
    app.start();
    assert!(app.view_stack.is_empty());
    settle(&mut app).await;
    assert_eq!(app.view_breadcrumb(), vec!["Residents"]);
    assert_eq!(app.user().map(|u| u.is_admin), Some(true));
  }

  #[tokio::test]
  async fn test_rejected_token_is_cleared() {
    let url = spawn_server().await;
    let (mut app, _dir) = app(&url, Some("stale"));
    app.start();
    settle(&mut app).await;
    assert_eq!(app.view_breadcrumb(), vec!["Login"]);
    assert!(!app.session.is_signed_in());
    assert_eq!(app.notice(), Some(&Notice::error("Session expired, please login")));
  }

  #[tokio::test]
  async fn test_regular_user_cannot_open_residents() {
    let url = spawn_server().await;
    let (mut app, _dir) = app(&url, Some("user"));
    app.start();
    settle(&mut app).await;
    assert_eq!(app.view_breadcrumb(), vec!["Dashboard"]);

    app.execute(CommandId::Residents);
    assert_eq!(app.view_breadcrumb(), vec!["Unauthorized"]);
    app.apply(ViewAction::Navigate(Route::User));
    assert_eq!(app.view_breadcrumb(), vec!["Dashboard"]);
  }

  #[tokio::test]
  async fn test_logout_clears_session_and_cache() {
    let url = spawn_server().await;
    let (mut app, _dir) = app(&url, Some("admin"));
    app.start();
    settle(&mut app).await;
    app
      .cache
      .set(&ResidentsQuery::new(1, 10), &fixtures::page(vec![fixtures::resident(1)], 1));

    app.execute(CommandId::Logout);
    assert!(app.cache.is_empty());
    assert!(app.user().is_none());
    assert!(!app.session.is_signed_in());
    assert_eq!(app.view_breadcrumb(), vec!["Login"]);
  }

  #[tokio::test]
  async fn test_sign_in_persists_token_and_routes() {
    let (mut app, _dir) = app("http://127.0.0.1:9", None);
    app.start();
    app.apply(ViewAction::SignedIn(AuthSession {
      token: "tok".to_string(),
      user: User {
        id: 2,
        username: "juan".to_string(),
        is_admin: false,
      },
    }));
    assert_eq!(app.session.token().as_deref(), Some("tok"));
    assert_eq!(app.view_breadcrumb(), vec!["Dashboard"]);
  }

  #[tokio::test]
  async fn test_pop_on_root_quits() {
    let (mut app, _dir) = app("http://127.0.0.1:9", None);
    app.start();
    app.apply(ViewAction::Pop);
    assert!(app.should_quit);
  }
}
