//! Cases tab: filterable table, or the full record of one case.

use casedesk_core::case::CaseDetail;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Paragraph, Row, Table, TableState, Wrap},
};

use super::pane;
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  match &app.detail {
    Some(detail) => draw_detail(f, area, detail, app.detail_scroll),
    None => draw_list(f, area, app),
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

fn filter_label<T: std::fmt::Display>(value: Option<T>) -> String {
  value.map_or_else(|| "All".to_owned(), |v| v.to_string())
}

fn draw_list(f: &mut Frame, area: Rect, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Length(1), Constraint::Min(0)])
    .split(area);

  let key = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
  let mut filters = vec![
    Span::styled(" [s]", key),
    Span::raw(format!(" status: {}  ", filter_label(app.query.case_status))),
    Span::styled("[m]", key),
    Span::raw(format!(" marketplace: {}  ", filter_label(app.query.marketplace))),
    Span::styled("[p]", key),
    Span::raw(format!(" priority: {}  ", filter_label(app.query.priority))),
  ];
  if app.search_active || !app.search.is_empty() {
    let cursor = if app.search_active { "_" } else { "" };
    filters.push(Span::styled(
      format!("/{}{cursor}", app.search),
      Style::default().fg(Color::Yellow),
    ));
  }
  f.render_widget(Paragraph::new(Line::from(filters)), rows[0]);

  let filtered = app.filtered_cases();
  let title = if filtered.len() == app.cases.len() {
    format!("Cases ({})", app.cases.len())
  } else {
    format!("Cases ({}/{})", filtered.len(), app.cases.len())
  };

  let header = Row::new([
    "ID",
    "Seller",
    "Market",
    "Status",
    "Sub-status",
    "Priority",
    "Issue",
    "Updated",
  ])
  .style(key);

  let body = filtered.iter().map(|c| {
    Row::new([
      c.case_id.to_string(),
      c.seller_name.clone(),
      c.marketplace.to_string(),
      c.case_status.to_string(),
      c.last_sub_status.to_string(),
      c.priority.to_string(),
      c.issue_type.clone(),
      c.updated_at.format("%Y-%m-%d %H:%M").to_string(),
    ])
  });

  let table = Table::new(body, [
    Constraint::Length(9),
    Constraint::Percentage(20),
    Constraint::Length(6),
    Constraint::Length(20),
    Constraint::Length(12),
    Constraint::Length(8),
    Constraint::Percentage(25),
    Constraint::Length(16),
  ])
  .header(header)
  .block(pane(title))
  .row_highlight_style(
    Style::default()
      .bg(Color::Blue)
      .fg(Color::White)
      .add_modifier(Modifier::BOLD),
  );

  let mut state = TableState::default();
  state.select((!filtered.is_empty()).then_some(app.list_cursor));
  f.render_stateful_widget(table, rows[1], &mut state);
}

// ─── Detail ───────────────────────────────────────────────────────────────────

fn draw_detail(f: &mut Frame, area: Rect, detail: &CaseDetail, scroll: usize) {
  let case = &detail.case;
  let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
  let field = |name: &str, value: String| {
    Line::from(vec![Span::styled(format!("{name:<18}"), label), Span::raw(value)])
  };
  let opt = |v: Option<String>| v.unwrap_or_else(|| "—".into());

  let mut lines = vec![
    field("Seller", format!("{} ({})", case.seller_name, case.seller_id)),
    field("Reference", opt(case.case_reference.clone())),
    field("Status", format!("{} / {}", case.case_status, case.last_sub_status)),
    field("Marketplace", case.marketplace.to_string()),
    field("Source", case.case_source.to_string()),
    field("Workstream", case.workstream.to_string()),
    field("Issue", case.issue_type.clone()),
    field("API area", case.api_area.clone()),
    field("Integration", case.integration_type.clone()),
    field("Complexity", case.complexity.to_string()),
    field("Priority", case.priority.to_string()),
    field("Seller type", case.seller_type.to_string()),
    field(
      "Specialist",
      format!("{} ({})", case.specialist_name, case.specialist_id),
    ),
    field("Listing start", opt(case.listing_start_date.map(|d| d.to_string()))),
    field(
      "Listing done",
      opt(case.listing_completion_date.map(|d| d.to_string())),
    ),
    field("Feedback", if case.feedback_received { "yes" } else { "no" }.into()),
    field("CSAT", opt(case.satisfaction_score.map(|s| format!("{s:.1}")))),
    field("Created", case.created_at.format("%Y-%m-%d %H:%M").to_string()),
    field("Updated", case.updated_at.format("%Y-%m-%d %H:%M").to_string()),
    field("Notes", if case.notes.is_empty() { "—".into() } else { case.notes.clone() }),
    Line::from(""),
    Line::from(Span::styled(
      format!("History ({} updates)", detail.recent_updates.len()),
      label,
    )),
  ];

  for update in &detail.recent_updates {
    lines.push(Line::from(vec![
      Span::styled(
        update.timestamp.format("%Y-%m-%d %H:%M  ").to_string(),
        Style::default().fg(Color::DarkGray),
      ),
      Span::styled(
        format!("{:<13}", update.sub_status.as_str()),
        Style::default().fg(Color::Yellow),
      ),
      Span::raw(format!("{}  ", update.note)),
      Span::styled(
        format!("— {}", update.author),
        Style::default().fg(Color::DarkGray),
      ),
    ]));
  }

  f.render_widget(
    Paragraph::new(lines)
      .block(pane(case.case_id.to_string()))
      .wrap(Wrap { trim: false })
      .scroll((scroll as u16, 0)),
    area,
  );
}

#[cfg(test)]
mod tests {
  use casedesk_core::vocab::Priority;

  use super::*;

  #[test]
  fn filter_label_shows_all_when_unset() {
    assert_eq!(filter_label::<Priority>(None), "All");
    assert_eq!(filter_label(Some(Priority::High)), "High");
  }
}
