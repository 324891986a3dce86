//! New Case tab: one row per form field.

use ratatui::{
  Frame,
  layout::Rect,
  style::{Color, Modifier, Style},
  text::{Line, Span},
  widgets::Paragraph,
};

use super::pane;
use crate::{app::App, form::FormField};

pub fn draw(f: &mut Frame, area: Rect, app: &App) {
  let form = &app.form;
  let current = form.current();

  let lines: Vec<Line> = FormField::ALL
    .iter()
    .map(|&field| {
      let focused = field == current;
      let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
      } else {
        Style::default().fg(Color::Gray)
      };

      if field == FormField::Submit {
        let style = if focused {
          Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD)
        } else {
          Style::default().fg(Color::Green)
        };
        return Line::from(vec![Span::raw(" ".repeat(18)), Span::styled(field.label(), style)]);
      }

      let value = form.value(field);
      let shown = match (field.is_choice(), focused) {
        (true, true) => format!("◀ {value} ▶"),
        (true, false) => value,
        (false, true) => format!("{value}_"),
        (false, false) => value,
      };
      Line::from(vec![
        Span::styled(format!("{:<17} ", field.label()), label_style),
        Span::raw(shown),
      ])
    })
    .collect();

  f.render_widget(Paragraph::new(lines).block(pane("New case")), area);
}
