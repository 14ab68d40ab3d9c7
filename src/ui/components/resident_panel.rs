use crate::api::Resident;
use crate::ui::renderfns::{format_timestamp, or_dash};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

/// Label/value pairs shown for one resident
pub fn detail_rows(resident: &Resident) -> Vec<(&'static str, String)> {
  vec![
    ("Name", resident.full_name()),
    ("Age", resident.age.to_string()),
    ("Gender", resident.gender.to_string()),
    ("Civil Status", resident.civil_status.to_string()),
    ("Barangay", resident.barangay.clone()),
    ("Address", resident.address.clone()),
    ("Occupation", or_dash(resident.occupation.as_deref())),
    ("Contact #", or_dash(resident.contact_number.as_deref())),
    ("Created", format_timestamp(resident.created_at.as_deref())),
    ("Updated", format_timestamp(resident.updated_at.as_deref())),
  ]
}

/// Bordered read-only card for `resident`
pub fn render_resident(frame: &mut Frame, area: Rect, resident: &Resident) {
  let block = Block::default()
    .title(format!(" Resident #{} ", resident.id))
    .title_alignment(Alignment::Center)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  let lines: Vec<Line> = detail_rows(resident)
    .into_iter()
    .map(|(label, value)| {
      Line::from(vec![
        Span::styled(format!("{:<14}", format!("{}:", label)), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
      ])
    })
    .collect();

  let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
  frame.render_widget(paragraph, area);
}
