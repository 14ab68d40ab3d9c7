use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::api::{CivilStatus, Gender, Resident};
use crate::residents::form::ValidDraft;
use crate::residents::{Field, ResidentDraft, ValidationErrors};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
  Submitted(ValidDraft),
  Cancelled,
}

/// Add/edit dialog for a resident.
///
/// Only the focused text field has a live `TextInput`; its text is written
/// back to the draft whenever focus moves.
#[derive(Debug, Clone)]
pub struct ResidentForm {
  original: Option<Resident>,
  draft: ResidentDraft,
  focus: usize,
  input: TextInput,
  errors: ValidationErrors,
}

impl ResidentForm {
  /// Empty form with the usual defaults
  pub fn add() -> Self {
    Self::with_draft(None, ResidentDraft::default())
  }

  /// Form pre-filled from `resident`
  pub fn edit(resident: Resident) -> Self {
    let draft = ResidentDraft::from_resident(&resident);
    Self::with_draft(Some(resident), draft)
  }

  fn with_draft(original: Option<Resident>, draft: ResidentDraft) -> Self {
    let mut form = Self {
      original,
      draft,
      focus: 0,
      input: TextInput::new(),
      errors: ValidationErrors::default(),
    };
    form.load_focused();
    form
  }

  /// The record being edited; `None` when adding
  pub fn original(&self) -> Option<&Resident> {
    self.original.as_ref()
  }

  pub fn focused(&self) -> Field {
    Field::ALL[self.focus]
  }

  pub fn draft(&self) -> &ResidentDraft {
    &self.draft
  }

  pub fn errors(&self) -> &ValidationErrors {
    &self.errors
  }

  fn load_focused(&mut self) {
    let field = self.focused();
    if field.is_choice() {
      self.input.clear();
    } else {
      self.input.set_value(self.draft.text(field));
    }
  }

  fn store_focused(&mut self) {
    let field = self.focused();
    if !field.is_choice() {
      self.draft.set_text(field, self.input.value().to_string());
    }
  }

  fn focus_on(&mut self, index: usize) {
    self.store_focused();
    self.focus = index % Field::ALL.len();
    self.load_focused();
  }

  fn cycle_choice(&mut self, forward: bool) {
    match self.focused() {
      Field::Gender => self.draft.gender = cycle(&Gender::ALL, self.draft.gender, forward),
      Field::CivilStatus => {
        self.draft.civil_status = cycle(&CivilStatus::ALL, self.draft.civil_status, forward)
      }
      _ => {}
    }
  }

  fn submit(&mut self) -> KeyResult<FormEvent> {
    self.store_focused();
    match self.draft.validate() {
      Ok(valid) => KeyResult::Event(FormEvent::Submitted(valid)),
      Err(errors) => {
        if let Some((field, _)) = errors.first() {
          if let Some(index) = Field::ALL.iter().position(|f| *f == field) {
            self.focus = index;
            self.load_focused();
          }
        }
        self.errors = errors;
        KeyResult::Handled
      }
    }
  }

  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<FormEvent> {
    let count = Field::ALL.len();
    match key.code {
      KeyCode::Esc => return KeyResult::Event(FormEvent::Cancelled),
      KeyCode::Enter => return self.submit(),
      KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => return self.submit(),
      KeyCode::Tab | KeyCode::Down => {
        self.focus_on(self.focus + 1);
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.focus_on(self.focus + count - 1);
        return KeyResult::Handled;
      }
      _ => {}
    }

    if self.focused().is_choice() {
      match key.code {
        KeyCode::Left | KeyCode::Char('h') => self.cycle_choice(false),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Char(' ') => self.cycle_choice(true),
        _ => {}
      }
      return KeyResult::Handled;
    }

    if let InputResult::Consumed = self.input.handle_key(key) {
      self.store_focused();
    }
    KeyResult::Handled
  }

  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    let width = 64.min(area.width.saturating_sub(4));
    let height = (Field::ALL.len() as u16 + 4).min(area.height);
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    let overlay_area = Rect::new(x, y, width, height);

    frame.render_widget(Clear, overlay_area);

    let title = match &self.original {
      Some(r) => format!(" Edit {} ", r.full_name()),
      None => " Add resident ".to_string(),
    };
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(title);

    let label_style = Style::default().fg(Color::DarkGray);
    let mut lines: Vec<Line> = Field::ALL
      .iter()
      .enumerate()
      .map(|(i, field)| {
        let focused = i == self.focus;
        let marker = if focused { "> " } else { "  " };
        let mut spans = vec![
          Span::styled(marker, Style::default().fg(Color::Yellow)),
          Span::styled(format!("{:<15}", field.label()), label_style),
        ];

        if field.is_choice() {
          let value = self.draft.text(*field).to_string();
          if focused {
            spans.push(Span::styled(format!("< {} >", value), Style::default().fg(Color::Cyan)));
          } else {
            spans.push(Span::raw(value));
          }
        } else if focused {
          spans.extend(self.input.spans(true));
        } else {
          spans.push(Span::raw(self.draft.text(*field).to_string()));
        }

        if let Some(message) = self.errors.get(*field) {
          spans.push(Span::styled(format!("  {}", message), Style::default().fg(Color::Red)));
        }
        Line::from(spans)
      })
      .collect();

    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
      Span::styled("<enter>", Style::default().fg(Color::Cyan)),
      Span::styled(" save   ", label_style),
      Span::styled("<tab>", Style::default().fg(Color::Cyan)),
      Span::styled(" next field   ", label_style),
      Span::styled("<esc>", Style::default().fg(Color::Cyan)),
      Span::styled(" cancel", label_style),
    ]));

    frame.render_widget(Paragraph::new(lines).block(block), overlay_area);
  }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, forward: bool) -> T {
  let index = all.iter().position(|v| *v == current).unwrap_or(0);
  let next = if forward {
    (index + 1) % all.len()
  } else {
    (index + all.len() - 1) % all.len()
  };
  all[next]
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::fixtures;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn type_str(form: &mut ResidentForm, s: &str) {
    for c in s.chars() {
      form.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_submit_empty_form_reports_errors() {
    let mut form = ResidentForm::add();
    assert_eq!(form.handle_key(key(KeyCode::Enter)), KeyResult::Handled);
    assert_eq!(form.errors().get(Field::FirstName), Some("First name is required"));
    assert_eq!(form.errors().get(Field::Barangay), Some("Barangay is required"));
    assert_eq!(form.errors().get(Field::Age), None);
    assert_eq!(form.focused(), Field::FirstName);
  }

  #[test]
  fn test_fill_and_submit() {
    let mut form = ResidentForm::add();
    type_str(&mut form, "Maria");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "Santos");
    // Skip middle name, replace the default age
    form.handle_key(key(KeyCode::Tab));
    form.handle_key(key(KeyCode::Tab));
    form.handle_key(key(KeyCode::Backspace));
    type_str(&mut form, "41");
    form.handle_key(key(KeyCode::Tab));
    assert_eq!(form.focused(), Field::Gender);
    form.handle_key(key(KeyCode::Right));
    form.handle_key(key(KeyCode::Tab));
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "Purok 2");
    form.handle_key(key(KeyCode::Tab));
    type_str(&mut form, "Poblacion");

    let KeyResult::Event(FormEvent::Submitted(valid)) = form.handle_key(key(KeyCode::Enter)) else {
      panic!("expected a valid draft");
    };
    let new = valid.into_new(7);
    assert_eq!(new.first_name, "Maria");
    assert_eq!(new.age, 41);
    assert_eq!(new.gender, Gender::Female);
    assert_eq!(new.civil_status, CivilStatus::Single);
    assert_eq!(new.middle_name, None);
    assert_eq!(new.barangay, "Poblacion");
  }

  #[test]
  fn test_edit_prefills_and_wraps_focus() {
    let resident = fixtures::resident(3);
    let mut form = ResidentForm::edit(resident.clone());
    assert_eq!(form.original(), Some(&resident));
    assert_eq!(form.draft().first_name, "Juan");

    form.handle_key(key(KeyCode::BackTab));
    assert_eq!(form.focused(), Field::Occupation);
    assert_eq!(form.handle_key(key(KeyCode::Esc)), KeyResult::Event(FormEvent::Cancelled));
  }
}
