//! Dashboard tab: headline metrics, bar charts and the hierarchical
//! breakdown table.

use casedesk_core::{store::GroupCount, wire::DashboardSummary};
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{BarChart, Paragraph, Row, Table},
};

use super::pane;
use crate::app::App;

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let Some(summary) = &app.summary else {
    f.render_widget(
      Paragraph::new("No data yet. Press r to refresh.")
        .style(Style::default().fg(Color::DarkGray))
        .block(pane("Dashboard")),
      area,
    );
    return;
  };

  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(3),      // metrics
      Constraint::Percentage(55), // charts
      Constraint::Min(0),         // breakdown
    ])
    .split(area);

  draw_metrics(f, rows[0], summary);
  draw_charts(f, rows[1], summary);
  draw_breakdown(f, rows[2], app);
}

fn draw_metrics(f: &mut Frame, area: Rect, summary: &DashboardSummary) {
  let metrics = [
    ("Total cases", summary.total_cases.to_string()),
    ("Open cases", summary.open_cases.to_string()),
    (
      "Top priority",
      summary
        .most_common_priority
        .clone()
        .unwrap_or_else(|| "—".into()),
    ),
    ("Marketplaces", summary.marketplaces_in_use.to_string()),
    ("Updates today", summary.updates_today.to_string()),
  ];

  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Ratio(1, metrics.len() as u32); 5])
    .split(area);

  for ((label, value), col) in metrics.into_iter().zip(cols.iter()) {
    let line = Line::from(vec![
      Span::styled(
        value,
        Style::default()
          .fg(Color::White)
          .add_modifier(Modifier::BOLD),
      ),
    ]);
    f.render_widget(Paragraph::new(line).block(pane(label)), *col);
  }
}

fn draw_charts(f: &mut Frame, area: Rect, summary: &DashboardSummary) {
  let halves = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(area);
  let top = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(halves[0]);
  let bottom = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
    .split(halves[1]);

  draw_bars(f, top[0], "By status", &summary.by_status, Color::Cyan);
  draw_bars(f, top[1], "By marketplace", &summary.by_marketplace, Color::Magenta);
  draw_bars(f, bottom[0], "By priority", &summary.by_priority, Color::Yellow);
  draw_bars(f, bottom[1], "By API area", &summary.by_api_area, Color::Green);
}

fn draw_bars(f: &mut Frame, area: Rect, title: &str, groups: &[GroupCount], colour: Color) {
  let data: Vec<(&str, u64)> = groups
    .iter()
    .map(|g| (g.key.as_str(), g.count))
    .collect();
  let width = bar_width(area.width.saturating_sub(2), data.len());
  let chart = BarChart::default()
    .block(pane(title))
    .data(data.as_slice())
    .bar_width(width)
    .bar_gap(1)
    .bar_style(Style::default().fg(colour))
    .value_style(Style::default().fg(Color::Black).bg(colour));
  f.render_widget(chart, area);
}

/// Widest bar that still fits `bars` bars with one-column gaps.
fn bar_width(inner: u16, bars: usize) -> u16 {
  if bars == 0 {
    return 1;
  }
  let bars = bars as u16;
  (inner.saturating_sub(bars - 1) / bars).clamp(1, 12)
}

fn draw_breakdown(f: &mut Frame, area: Rect, app: &App) {
  let header = Row::new([
    "Workstream",
    "Marketplace",
    "Issue",
    "API area",
    "Sub-status",
    "Count",
  ])
  .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

  let rows = app.breakdown.iter().skip(app.breakdown_scroll).map(|r| {
    Row::new([
      r.workstream.to_string(),
      r.marketplace.to_string(),
      r.issue_type.clone(),
      r.api_area.clone(),
      r.last_sub_status.to_string(),
      r.count.to_string(),
    ])
  });

  let table = Table::new(rows, [
    Constraint::Percentage(24),
    Constraint::Length(11),
    Constraint::Percentage(24),
    Constraint::Percentage(18),
    Constraint::Length(14),
    Constraint::Length(6),
  ])
  .header(header)
  .block(pane(format!("Breakdown ({} groups)", app.breakdown.len())));
  f.render_widget(table, area);
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn bar_width_fits_area() {
    assert_eq!(bar_width(40, 0), 1);
    assert_eq!(bar_width(40, 3), 12);
    assert_eq!(bar_width(20, 4), 4);
    assert_eq!(bar_width(3, 9), 1);
  }
}
