use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use textwrap::wrap;

use super::super::view::UiContext;

/// The flat error list shown under the table: one `Row <n>: message` line
/// per cell error in table order, then any global validation messages,
/// wrapped to the terminal width.
pub fn error_report(ctx: &UiContext<'_>, width: u16) -> Vec<String> {
    let budget = (width as usize).saturating_sub(2).max(10);
    let mut lines = Vec::new();
    for message in ctx.state.footer_lines() {
        push_wrapped(&mut lines, &message, budget);
    }
    for message in ctx.global_errors {
        push_wrapped(&mut lines, message, budget);
    }
    lines
}

fn push_wrapped(lines: &mut Vec<String>, message: &str, budget: usize) {
    for (index, segment) in wrap(message, budget).into_iter().enumerate() {
        if index == 0 {
            lines.push(segment.into_owned());
        } else {
            lines.push(format!("  {segment}"));
        }
    }
}

pub fn render_error_list(frame: &mut Frame<'_>, area: Rect, lines: &[String]) {
    if lines.is_empty() || area.height == 0 {
        return;
    }
    let text: Vec<Line<'_>> = lines.iter().map(|line| Line::raw(line.as_str())).collect();
    let widget = Paragraph::new(text).style(Style::default().fg(Color::Red));
    frame.render_widget(widget, area);
}

pub fn render_footer(frame: &mut Frame<'_>, area: Rect, ctx: &UiContext<'_>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let actions = ctx.help.unwrap_or(" ");
    let actions_widget = Paragraph::new(format!("Actions: {actions}"))
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(actions_widget, rows[0]);

    let mut status = ctx.status_message.to_string();
    if ctx.dirty {
        status.push_str(" • unsaved changes");
    }
    if ctx.error_count > 0 {
        status.push_str(&format!(" • errors: {}", ctx.error_count));
    }
    if status.trim().is_empty() {
        status = "Ready".to_string();
    }

    let badge = if ctx.error_count > 0 {
        Span::styled(
            format!("[! {}]", ctx.error_count),
            Style::default().fg(Color::Red),
        )
    } else {
        Span::styled("[ok]", Style::default().fg(Color::Green))
    };

    let status_widget = Paragraph::new(Line::from(vec![
        Span::raw("Status: "),
        Span::raw(status),
        Span::raw(" "),
        badge,
    ]));
    frame.render_widget(status_widget, rows[1]);
}
