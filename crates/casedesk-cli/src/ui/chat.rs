//! Chat tab: conversation history above a one-line input.

use ratatui::{
  Frame,
  layout::{Constraint, Direction, Layout, Rect},
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::{Paragraph, Wrap},
};

use super::pane;
use crate::app::{App, Speaker};

const GREETING: &str = "Describe a new case, post an update (\"CASE-0001 moved to PMA\"), \
                        ask about a case, or ask for counts by marketplace, status or priority.";

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let rows = Layout::default()
    .direction(Direction::Vertical)
    .constraints([Constraint::Min(0), Constraint::Length(3)])
    .split(area);

  let mut lines: Vec<Line> = Vec::new();
  if app.chat_log.is_empty() {
    lines.push(Line::from(Span::styled(
      GREETING,
      Style::default().fg(Color::DarkGray),
    )));
  }
  for entry in &app.chat_log {
    let (who, colour) = match entry.speaker {
      Speaker::User => ("you", Color::Cyan),
      Speaker::Assistant { ok: true } => ("bot", Color::Green),
      Speaker::Assistant { ok: false } => ("bot", Color::Red),
    };
    let label = Style::default().fg(colour).add_modifier(Modifier::BOLD);
    for (i, text) in entry.text.lines().enumerate() {
      let prefix = if i == 0 { format!("{who:>4} ") } else { "     ".into() };
      lines.push(Line::from(vec![
        Span::styled(prefix, label),
        Span::raw(text.replace("**", "")),
      ]));
    }
    lines.push(Line::from(""));
  }

  // Keep the newest messages in view.
  let block = pane("Conversation");
  let inner_height = block.inner(rows[0]).height as usize;
  let scroll = lines.len().saturating_sub(inner_height) as u16;
  f.render_widget(
    Paragraph::new(lines)
      .block(block)
      .wrap(Wrap { trim: false })
      .scroll((scroll, 0)),
    rows[0],
  );

  let input = Paragraph::new(format!("> {}_", app.chat_input))
    .style(Style::default().fg(Color::Yellow))
    .block(pane(format!("Message · {}", app.tier)));
  f.render_widget(input, rows[1]);
}
