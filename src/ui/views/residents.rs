use crate::api::{Gender, Resident};
use crate::residents::form::ValidDraft;
use crate::residents::{
  barangay_options, MutationOutcome, ResidentMutation, ResidentsObserver, ResidentsQuery,
  ResidentsService, SortDirection, SortField, TableState,
};
use crate::ui::components::{
  ConfirmDialog, ConfirmEvent, FormEvent, KeyResult, Notice, OptionPicker, PickerEvent,
  ResidentForm, SearchEvent, SearchInput,
};
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{or_dash, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::ResidentDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState as RowCursor};
use tracing::debug;

struct Column {
  field: SortField,
  title: &'static str,
  width: Constraint,
}

const COLUMNS: [Column; 7] = [
  Column { field: SortField::Id, title: "ID", width: Constraint::Length(7) },
  Column { field: SortField::FirstName, title: "First Name", width: Constraint::Min(12) },
  Column { field: SortField::LastName, title: "Last Name", width: Constraint::Min(12) },
  Column { field: SortField::Barangay, title: "Barangay", width: Constraint::Min(12) },
  Column { field: SortField::Age, title: "Age", width: Constraint::Length(5) },
  Column { field: SortField::Gender, title: "Gender", width: Constraint::Length(8) },
  Column { field: SortField::Occupation, title: "Occupation", width: Constraint::Min(12) },
];

const ALL_LABEL: &str = "All";

/// Which filter the option picker is choosing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PickerTarget {
  Gender,
  Barangay,
}

/// Admin screen: the paginated residents table with search, sort, filters,
/// selection, and optimistic add/edit/archive.
pub struct ResidentsView {
  service: ResidentsService,
  observer: ResidentsObserver,
  table: TableState,
  cursor: RowCursor,
  focused_column: usize,
  created_by: i64,

  search: SearchInput,
  picker: OptionPicker,
  picker_target: Option<PickerTarget>,
  barangay_choices: Vec<String>,
  form: Option<ResidentForm>,
  confirm: ConfirmDialog,
  archive_target: Option<i64>,
  mutation: Option<ResidentMutation>,
}

impl ResidentsView {
  pub fn new(service: ResidentsService, page_size: u32, created_by: i64) -> Self {
    let mut observer = service.observer();
    let table = TableState::new(page_size);
    observer.set_key(table.query());

    Self {
      service,
      observer,
      table,
      cursor: RowCursor::default(),
      focused_column: 0,
      created_by,
      search: SearchInput::new(),
      picker: OptionPicker::new(),
      picker_target: None,
      barangay_choices: Vec::new(),
      form: None,
      confirm: ConfirmDialog::new(),
      archive_target: None,
      mutation: None,
    }
  }

  fn rows(&self) -> &[Resident] {
    self.observer.data().map(|p| p.items.as_slice()).unwrap_or(&[])
  }

  fn selected_resident(&self) -> Option<&Resident> {
    self.cursor.selected().and_then(|i| self.rows().get(i))
  }

  /// Point the observer at whatever the table state now describes
  fn sync_key(&mut self) {
    let key = self.table.query();
    debug!(key = %key, "residents key changed");
    self.observer.set_key(key);
  }

  fn start_mutation(
    &mut self,
    start: impl FnOnce(&ResidentsService, &ResidentsQuery) -> ResidentMutation,
  ) -> ViewAction {
    if self.mutation.is_some() {
      return ViewAction::Notify(Notice::error("Another change is still being saved"));
    }
    let key = self.table.query();
    let mutation = start(&self.service, &key);
    let message = mutation.kind().pending_message();
    self.mutation = Some(mutation);
    ViewAction::Notify(Notice::pending(message))
  }

  // --------------------------------------------------------------------------
  // Overlays
  // --------------------------------------------------------------------------

  fn open_gender_picker(&mut self) {
    let mut options = vec![ALL_LABEL.to_string()];
    options.extend(Gender::ALL.iter().map(|g| g.to_string()));
    let selected = self
      .table
      .gender_filter()
      .and_then(|g| Gender::ALL.iter().position(|x| *x == g))
      .map(|i| i + 1)
      .unwrap_or(0);
    self.picker_target = Some(PickerTarget::Gender);
    self.picker.show("Gender", options, selected);
  }

  fn open_barangay_picker(&mut self) {
    let mut choices = barangay_options(self.rows());
    if let Some(current) = self.table.barangay_filter() {
      if !choices.iter().any(|c| c == current) {
        choices.push(current.to_string());
        choices.sort();
      }
    }
    let selected = self
      .table
      .barangay_filter()
      .and_then(|b| choices.iter().position(|c| c == b))
      .map(|i| i + 1)
      .unwrap_or(0);

    let mut options = vec![ALL_LABEL.to_string()];
    options.extend(choices.iter().cloned());
    self.picker_target = Some(PickerTarget::Barangay);
    self.barangay_choices = choices;
    self.picker.show("Barangay", options, selected);
  }

  fn apply_pick(&mut self, index: usize) {
    match self.picker_target.take() {
      Some(PickerTarget::Gender) => {
        let gender = index.checked_sub(1).and_then(|i| Gender::ALL.get(i)).copied();
        self.table.set_gender_filter(gender);
      }
      Some(PickerTarget::Barangay) => {
        let barangay = index
          .checked_sub(1)
          .and_then(|i| self.barangay_choices.get(i))
          .cloned();
        self.table.set_barangay_filter(barangay);
      }
      None => return,
    }
    self.sync_key();
  }

  fn submit_form(&mut self, form: ResidentForm, valid: ValidDraft) -> ViewAction {
    match form.original() {
      None => {
        let created_by = self.created_by;
        self.start_mutation(|service, key| service.create(key, valid.into_new(created_by)))
      }
      Some(original) => {
        let patch = valid.patch_against(original);
        if patch.is_empty() {
          return ViewAction::Notify(Notice::info("No changes to save"));
        }
        let id = original.id;
        self.start_mutation(|service, key| service.update(key, id, patch))
      }
    }
  }

  fn handle_form(&mut self, key: KeyEvent) -> Option<ViewAction> {
    let form = self.form.as_mut()?;
    match form.handle_key(key) {
      KeyResult::Event(FormEvent::Submitted(_)) if self.mutation.is_some() => Some(
        ViewAction::Notify(Notice::error("Another change is still being saved")),
      ),
      KeyResult::Event(FormEvent::Submitted(valid)) => {
        let form = self.form.take()?;
        Some(self.submit_form(form, valid))
      }
      KeyResult::Event(FormEvent::Cancelled) => {
        self.form = None;
        Some(ViewAction::None)
      }
      KeyResult::Handled | KeyResult::NotHandled => Some(ViewAction::None),
    }
  }

  fn handle_overlays(&mut self, key: KeyEvent) -> Option<ViewAction> {
    if self.form.is_some() {
      return self.handle_form(key);
    }

    match self.confirm.handle_key(key) {
      KeyResult::Event(ConfirmEvent::Confirmed) => {
        let id = self.archive_target.take()?;
        return Some(self.start_mutation(|service, key| service.archive(key, id)));
      }
      KeyResult::Event(ConfirmEvent::Cancelled) => {
        self.archive_target = None;
        return Some(ViewAction::None);
      }
      KeyResult::Handled => return Some(ViewAction::None),
      KeyResult::NotHandled => {}
    }

    match self.picker.handle_key(key) {
      KeyResult::Event(PickerEvent::Selected(index)) => {
        self.apply_pick(index);
        return Some(ViewAction::None);
      }
      KeyResult::Event(PickerEvent::Cancelled) => {
        self.picker_target = None;
        return Some(ViewAction::None);
      }
      KeyResult::Handled => return Some(ViewAction::None),
      KeyResult::NotHandled => {}
    }

    match self.search.handle_key(key) {
      KeyResult::Event(SearchEvent::Changed(q)) => {
        self.table.set_search(&q);
        self.sync_key();
        Some(ViewAction::None)
      }
      KeyResult::Event(SearchEvent::Submitted) | KeyResult::Handled => Some(ViewAction::None),
      KeyResult::NotHandled => None,
    }
  }

  fn handle_navigation(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.cursor.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.cursor.select_previous(),
      KeyCode::Char('h') | KeyCode::Left => {
        self.focused_column = (self.focused_column + COLUMNS.len() - 1) % COLUMNS.len();
      }
      KeyCode::Char('l') | KeyCode::Right => {
        self.focused_column = (self.focused_column + 1) % COLUMNS.len();
      }
      KeyCode::Char(']') => {
        self.table.next_page();
        self.sync_key();
      }
      KeyCode::Char('[') => {
        self.table.prev_page();
        self.sync_key();
      }
      KeyCode::Char('+') => {
        self.table.cycle_page_size(true);
        self.sync_key();
      }
      KeyCode::Char('-') => {
        self.table.cycle_page_size(false);
        self.sync_key();
      }
      _ => return None,
    }
    Some(ViewAction::None)
  }

  fn handle_actions(&mut self, key: KeyEvent) -> Option<ViewAction> {
    match key.code {
      KeyCode::Char('/') => {
        let current = self.table.search().unwrap_or_default().to_string();
        self.search.activate(&current);
      }
      KeyCode::Char('s') => {
        self.table.toggle_sort(COLUMNS[self.focused_column].field);
        self.sync_key();
      }
      KeyCode::Char('g') => self.open_gender_picker(),
      KeyCode::Char('b') => self.open_barangay_picker(),
      KeyCode::Char('x') => {
        self.table.reset_filters();
        self.sync_key();
      }
      KeyCode::Char(' ') => {
        if let Some(id) = self.selected_resident().map(|r| r.id) {
          self.table.toggle_row(id);
        }
      }
      KeyCode::Char('A') => {
        let rows = self.rows().to_vec();
        self.table.toggle_all(&rows);
      }
      KeyCode::Char('a') => self.form = Some(ResidentForm::add()),
      KeyCode::Char('e') => {
        let resident = self.selected_resident()?.clone();
        self.form = Some(ResidentForm::edit(resident));
      }
      KeyCode::Enter => {
        let resident = self.selected_resident()?.clone();
        return Some(ViewAction::Push(Box::new(ResidentDetailView::new(resident))));
      }
      KeyCode::Char('d') => {
        let (id, name) = self.selected_resident().map(|r| (r.id, r.full_name()))?;
        self.archive_target = Some(id);
        self.confirm.show(format!("Archive {}?", name));
      }
      KeyCode::Char('r') => self.observer.refetch(),
      KeyCode::Esc if !self.table.selected_ids().is_empty() => self.table.clear_selection(),
      KeyCode::Char('q') | KeyCode::Esc => return Some(ViewAction::Pop),
      _ => return None,
    }
    Some(ViewAction::None)
  }

  // --------------------------------------------------------------------------
  // Rendering
  // --------------------------------------------------------------------------

  fn title(&self) -> String {
    let count = match self.table.total() {
      Some(total) => format!("Residents ({})", total),
      None => "Residents".to_string(),
    };
    if let Some(e) = self.observer.error() {
      format!(" {} (error: {}) ", count, e)
    } else if self.observer.is_fetching() {
      format!(" {} (loading...) ", count)
    } else {
      format!(" {} ", count)
    }
  }

  fn render_filters(&self, frame: &mut Frame, area: Rect) {
    let label = Style::default().fg(Color::DarkGray);
    let value = Style::default().fg(Color::Yellow);
    let gender = self
      .table
      .gender_filter()
      .map(|g| g.to_string())
      .unwrap_or_else(|| ALL_LABEL.to_string());

    let mut spans = vec![
      Span::styled(" Search: ", label),
      Span::styled(self.table.search().unwrap_or("-").to_string(), value),
      Span::styled("   Gender: ", label),
      Span::styled(gender, value),
      Span::styled("   Barangay: ", label),
      Span::styled(self.table.barangay_filter().unwrap_or(ALL_LABEL).to_string(), value),
    ];

    let selected = self.table.selected_ids().len();
    if selected > 0 {
      spans.push(Span::styled(format!("   {} selected", selected), Style::default().fg(Color::Cyan)));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
  }

  fn render_pagination(&self, frame: &mut Frame, area: Rect) {
    let page = self.table.page_index() + 1;
    let pages = self
      .table
      .page_count()
      .map(|n| n.max(1).to_string())
      .unwrap_or_else(|| "?".to_string());
    let dim = Style::default().fg(Color::DarkGray);
    let arrow = |enabled: bool| if enabled { Style::default().fg(Color::Cyan) } else { dim };

    let line = Line::from(vec![
      Span::styled(" <[> ", arrow(self.table.can_prev_page())),
      Span::raw(format!("Page {} of {}", page, pages)),
      Span::styled(" <]> ", arrow(self.table.can_next_page())),
      Span::styled(format!("  {} per page <+/->", self.table.page_size()), dim),
    ]);
    frame.render_widget(Paragraph::new(line), area);
  }

  fn header_row(&self) -> Row<'static> {
    let rows = self.rows();
    let marker = if self.table.all_selected(rows) {
      "[x]"
    } else if self.table.some_selected(rows) {
      "[-]"
    } else {
      "[ ]"
    };

    let mut cells = vec![Cell::from(marker)];
    for (i, column) in COLUMNS.iter().enumerate() {
      let arrow = match self.table.sort() {
        Some((field, SortDirection::Asc)) if field == column.field => " ▲",
        Some((field, SortDirection::Desc)) if field == column.field => " ▼",
        _ => "",
      };
      let mut style = Style::default().fg(Color::Cyan).bold();
      if i == self.focused_column {
        style = style.fg(Color::Yellow).underlined();
      }
      cells.push(Cell::from(format!("{}{}", column.title, arrow)).style(style));
    }
    Row::new(cells)
  }

  fn render_table(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.rows().len();
    ensure_valid_selection(&mut self.cursor, len);

    let block = Block::default()
      .title(self.title())
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if len == 0 {
      let content = if let Some(e) = self.observer.error() {
        format!("Failed to load residents: {}\n\nPress 'r' to retry.", e)
      } else if self.observer.data().is_none() {
        "Loading residents...".to_string()
      } else {
        "No residents found.".to_string()
      };
      let paragraph = Paragraph::new(content)
        .block(block)
        .style(Style::default().fg(Color::DarkGray));
      frame.render_widget(paragraph, area);
      return;
    }

    // Collect rows first to avoid borrow conflicts with the cursor
    let dim = if self.observer.is_placeholder() {
      Style::default().fg(Color::DarkGray)
    } else {
      Style::default()
    };
    let rows: Vec<Row> = self
      .rows()
      .iter()
      .map(|r| {
        let marker = if self.table.is_selected(r.id) { "[x]" } else { "[ ]" };
        Row::new(vec![
          Cell::from(marker),
          Cell::from(Span::styled(r.id.to_string(), Style::default().fg(Color::Cyan))),
          Cell::from(truncate(&r.first_name, 24)),
          Cell::from(truncate(&r.last_name, 24)),
          Cell::from(truncate(&r.barangay, 24)),
          Cell::from(r.age.to_string()),
          Cell::from(r.gender.to_string()),
          Cell::from(truncate(&or_dash(r.occupation.as_deref()), 24)),
        ])
        .style(dim)
      })
      .collect();

    let mut widths = vec![Constraint::Length(4)];
    widths.extend(COLUMNS.iter().map(|c| c.width));

    let table = Table::new(rows, widths)
      .header(self.header_row())
      .block(block)
      .row_highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
      .highlight_symbol("> ");

    frame.render_stateful_widget(table, area, &mut self.cursor);
  }
}

impl View for ResidentsView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    self
      .handle_overlays(key)
      .or_else(|| self.handle_navigation(key))
      .or_else(|| self.handle_actions(key))
      .unwrap_or(ViewAction::None)
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Length(1), // Filters
        Constraint::Min(3),    // Table
        Constraint::Length(1), // Pagination
      ])
      .split(area);

    self.render_filters(frame, chunks[0]);
    self.render_table(frame, chunks[1]);
    self.render_pagination(frame, chunks[2]);

    self.search.render_overlay(frame, chunks[1]);
    self.picker.render_overlay(frame, area);
    self.confirm.render_overlay(frame, area);
    if let Some(form) = &self.form {
      form.render_overlay(frame, area);
    }
  }

  fn breadcrumb_label(&self) -> String {
    "Residents".to_string()
  }

  fn tick(&mut self) -> ViewAction {
    if self.observer.poll() {
      let len = self.rows().len();
      ensure_valid_selection(&mut self.cursor, len);
    }
    if !self.observer.is_placeholder() {
      if let Some(total) = self.observer.data().map(|p| p.total) {
        self.table.set_total(total);
      }
    }
    if self.observer.error().is_some_and(|e| e.is_session_expired()) {
      return ViewAction::SessionExpired;
    }

    let outcome = match &mut self.mutation {
      Some(mutation) => mutation.poll(),
      None => None,
    };
    let Some(outcome) = outcome else {
      return ViewAction::None;
    };
    self.mutation = None;
    match outcome {
      MutationOutcome::Saved(message) => ViewAction::Notify(Notice::success(message)),
      MutationOutcome::Failed {
        session_expired: true,
        ..
      } => ViewAction::SessionExpired,
      MutationOutcome::Failed { message, .. } => {
        ViewAction::Notify(Notice::error(message))
      }
    }
  }

  fn on_focus(&mut self) {
    self.observer.on_focus();
  }

  fn refresh(&mut self) {
    self.observer.refetch();
  }

  fn captures_input(&self) -> bool {
    self.search.is_active() || self.picker.is_active() || self.confirm.is_active() || self.form.is_some()
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("/", "search").with_priority(20),
      ShortcutInfo::new("s", "sort").with_priority(30),
      ShortcutInfo::new("g/b", "filter").with_priority(40),
      ShortcutInfo::new("a", "add").with_priority(50),
      ShortcutInfo::new("e", "edit").with_priority(60),
      ShortcutInfo::new("d", "archive").with_priority(70),
      ShortcutInfo::new("r", "refresh").with_priority(80),
    ]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::{fixtures, ApiClient};
  use crate::cache::{QueryCache, RetryPolicy};
  use crate::config::Config;
  use crate::session::SessionStore;
  use crate::ui::components::NoticeLevel;
  use axum::http::StatusCode;
  use axum::routing::{delete, get};
  use axum::{Json, Router};
  use crossterm::event::KeyModifiers;
  use serde_json::json;
  use std::time::Duration;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  async fn spawn_server() -> String {
    let rows = vec![fixtures::resident(1), fixtures::named(2, "Maria", "Poblacion")];
    let body = json!({ "data": rows, "page": 1, "pageSize": 10, "total": 2 });
    let router = Router::new()
      .route(
        "/residents",
        get(move || {
          let body = body.clone();
          async move { Json(body) }
        }),
      )
      .route(
        "/residents/delete",
        delete(|| async { (StatusCode::FORBIDDEN, Json(json!({ "message": "Admins only" }))) }),
      );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
      let _ = axum::serve(listener, router).await;
    });
    format!("http://{}", addr)
  }

  async fn loaded_view() -> (ResidentsView, tempfile::TempDir) {
    let url = spawn_server().await;
    let dir = tempfile::tempdir().unwrap();
    let session = SessionStore::at(dir.path().join("session.json"));
    let client = ApiClient::new(&Config::with_url(&url), session).unwrap();
    let cache = QueryCache::new(Duration::from_secs(60));
    let service = ResidentsService::new(client, cache, RetryPolicy::none());
    let mut view = ResidentsView::new(service, 10, 1);

    for _ in 0..200 {
      view.tick();
      if !view.rows().is_empty() {
        break;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(view.rows().len(), 2);
    (view, dir)
  }

  #[tokio::test]
  async fn test_sort_follows_focused_column() {
    let (mut view, _dir) = loaded_view().await;
    view.handle_key(key(KeyCode::Char('l')));
    view.handle_key(key(KeyCode::Char('s')));
    let observed = view.observer.key().cloned().unwrap();
    assert_eq!(observed.sort_by, Some(SortField::FirstName));
    assert_eq!(observed.sort_dir, Some(SortDirection::Asc));

    view.handle_key(key(KeyCode::Char('s')));
    view.handle_key(key(KeyCode::Char('s')));
    assert_eq!(view.observer.key().and_then(|k| k.sort_by), None);
  }

  #[tokio::test]
  async fn test_gender_filter_resets_page() {
    let (mut view, _dir) = loaded_view().await;
    view.table.set_total(50);
    view.handle_key(key(KeyCode::Char(']')));
    assert_eq!(view.observer.key().map(|k| k.page), Some(2));

    view.handle_key(key(KeyCode::Char('g')));
    assert!(view.captures_input());
    view.handle_key(key(KeyCode::Char('j')));
    view.handle_key(key(KeyCode::Enter));

    let observed = view.observer.key().cloned().unwrap();
    assert_eq!(observed.gender, Some(Gender::Male));
    assert_eq!(observed.page, 1);
  }

  #[tokio::test]
  async fn test_search_is_live() {
    let (mut view, _dir) = loaded_view().await;
    view.handle_key(key(KeyCode::Char('/')));
    view.handle_key(key(KeyCode::Char('m')));
    view.handle_key(key(KeyCode::Char('a')));
    assert_eq!(view.observer.key().and_then(|k| k.q.clone()), Some("ma".to_string()));
    // Still the previous page's rows while the search loads
    assert_eq!(view.rows().len(), 2);
    assert!(view.observer.is_placeholder());
  }

  #[tokio::test]
  async fn test_selection_toggles() {
    let (mut view, _dir) = loaded_view().await;
    view.handle_key(key(KeyCode::Char(' ')));
    assert_eq!(view.table.selected_ids(), vec![1]);
    view.handle_key(key(KeyCode::Char('A')));
    assert_eq!(view.table.selected_ids(), vec![1, 2]);
    view.handle_key(key(KeyCode::Esc));
    assert!(view.table.selected_ids().is_empty());
    assert!(matches!(view.handle_key(key(KeyCode::Esc)), ViewAction::Pop));
  }

  #[tokio::test]
  async fn test_archive_is_optimistic_and_exclusive() {
    let (mut view, _dir) = loaded_view().await;
    view.handle_key(key(KeyCode::Char('d')));
    let action = view.handle_key(key(KeyCode::Char('y')));
    assert!(matches!(
      action,
      ViewAction::Notify(Notice { level: NoticeLevel::Pending, .. })
    ));
    view.observer.poll();
    assert_eq!(view.rows().len(), 1);
    assert_eq!(view.rows()[0].id, 2);

    view.handle_key(key(KeyCode::Char('d')));
    let ViewAction::Notify(notice) = view.handle_key(key(KeyCode::Char('y'))) else {
      panic!("expected a notice");
    };
    assert_eq!(notice, Notice::error("Another change is still being saved"));
  }

  #[tokio::test]
  async fn test_unchanged_edit_sends_nothing() {
    let (mut view, _dir) = loaded_view().await;
    view.handle_key(key(KeyCode::Char('e')));
    assert!(view.form.is_some());
    let ViewAction::Notify(notice) = view.handle_key(key(KeyCode::Enter)) else {
      panic!("expected a notice");
    };
    assert_eq!(notice, Notice::info("No changes to save"));
    assert!(view.mutation.is_none());
  }

  #[tokio::test]
  async fn test_forbidden_archive_is_reported_not_logged_out() {
    let (mut view, _dir) = loaded_view().await;
    view.handle_key(key(KeyCode::Char('d')));
    view.handle_key(key(KeyCode::Char('y')));

    let mut settled = None;
    for _ in 0..200 {
      match view.tick() {
        ViewAction::None => tokio::time::sleep(Duration::from_millis(5)).await,
        action => {
          settled = Some(action);
          break;
        }
      }
    }
    let Some(ViewAction::Notify(notice)) = settled else {
      panic!("expected a failure notice");
    };
    assert_eq!(notice, Notice::error("Failed to archive resident: Admins only"));
    assert!(view.mutation.is_none());

    view.observer.poll();
    assert_eq!(view.rows().len(), 2);
  }
}
