//! TUI rendering: header tabs, the active tab's body, and the status bar.

pub mod cases;
pub mod chat;
pub mod dashboard;
pub mod new_case;

use chrono::Local;
use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Block, Paragraph, Tabs},
};

use crate::app::{App, Tab};

// ─── Root draw ────────────────────────────────────────────────────────────────

/// Main draw function called each frame.
pub fn draw(f: &mut Frame, app: &App) {
  let area = f.area();

  // Vertical stack: header, body, status bar.
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // header
      Constraint::Min(0),    // body
      Constraint::Length(1), // status bar
    ])
    .split(area);

  draw_header(f, rows[0], app);
  match app.tab {
    Tab::Chat => chat::draw(f, rows[1], app),
    Tab::NewCase => new_case::draw(f, rows[1], app),
    Tab::Dashboard => dashboard::draw(f, rows[1], app),
    Tab::Cases => cases::draw(f, rows[1], app),
  }
  draw_status(f, rows[2], app);
}

// ─── Header ───────────────────────────────────────────────────────────────────

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
  let right = format!("{}  {} ", app.tier, Local::now().format("%Y-%m-%d"));
  let cols = Layout::default()
    .direction(Direction::Horizontal)
    .constraints([Constraint::Min(0), Constraint::Length(right.len() as u16)])
    .split(area);

  let block = Block::default().style(Style::default().bg(Color::DarkGray));
  f.render_widget(block, area);

  let titles = Tab::ALL
    .iter()
    .enumerate()
    .map(|(i, t)| format!("{} {}", i + 1, t.title()));
  let selected = Tab::ALL.iter().position(|t| *t == app.tab).unwrap_or(0);
  let tabs = Tabs::new(titles)
    .select(selected)
    .style(Style::default().fg(Color::White))
    .highlight_style(
      Style::default()
        .fg(Color::Black)
        .bg(Color::Cyan)
        .add_modifier(Modifier::BOLD),
    )
    .divider("│");
  f.render_widget(tabs, cols[0]);

  f.render_widget(
    Paragraph::new(Span::styled(right, Style::default().fg(Color::Gray))),
    cols[1],
  );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
  let (mode_label, hints) = match app.tab {
    Tab::Chat => ("CHAT", "Enter send  Esc clear  F2 tier  Tab next tab  Ctrl-C quit"),
    Tab::NewCase => (
      "FORM",
      "↑↓ field  ←→ choose  Enter on submit creates  Esc clear  Tab next tab",
    ),
    Tab::Dashboard => ("DASH", "↑↓/jk scroll breakdown  r refresh  1-4 tabs  q quit"),
    Tab::Cases if app.search_active => ("SEARCH", "Type to filter  Esc cancel  Enter keep"),
    Tab::Cases if app.detail.is_some() => ("DETAIL", "↑↓/jk scroll  Esc back  q quit"),
    Tab::Cases => (
      "CASES",
      "s/m/p filter  c clear  / search  Enter detail  x export  r refresh  q quit",
    ),
  };

  let status = if app.status_msg.is_empty() {
    hints.to_string()
  } else {
    app.status_msg.clone()
  };

  let mode_span = Span::styled(
    format!(" {mode_label} "),
    Style::default()
      .fg(Color::Black)
      .bg(Color::Cyan)
      .add_modifier(Modifier::BOLD),
  );
  let hint_span = Span::styled(
    format!("  {status}"),
    Style::default().fg(Color::DarkGray),
  );

  let line = Line::from(vec![mode_span, hint_span]);
  f.render_widget(
    Paragraph::new(line).style(Style::default().bg(Color::Black)),
    area,
  );
}

/// Bordered block with the shared pane styling.
pub(crate) fn pane(title: impl Into<String>) -> Block<'static> {
  Block::bordered()
    .title(format!(" {} ", title.into()))
    .border_style(Style::default().fg(Color::DarkGray))
}
