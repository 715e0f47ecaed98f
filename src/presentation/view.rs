use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::form::TableState;

use super::components::{error_report, render_error_list, render_footer, render_popup, render_table};

pub struct UiContext<'a> {
    pub state: &'a mut TableState,
    pub status_message: &'a str,
    pub dirty: bool,
    pub error_count: usize,
    pub help: Option<&'a str>,
    pub global_errors: &'a [String],
    pub popup: Option<PopupRender<'a>>,
}

pub struct PopupRender<'a> {
    pub title: &'a str,
    pub options: &'a [String],
    pub selected: usize,
}

pub fn draw(frame: &mut Frame<'_>, ctx: UiContext<'_>) {
    let errors = error_report(&ctx, frame.area().width);
    let error_height = errors.len().min(6) as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(error_height),
            Constraint::Length(2),
        ])
        .split(frame.area());

    render_title(frame, chunks[0], &ctx);
    let cursor_enabled = ctx.popup.is_none();
    render_table(frame, chunks[1], &mut *ctx.state, cursor_enabled);
    render_error_list(frame, chunks[2], &errors);
    render_footer(frame, chunks[3], &ctx);

    if let Some(popup) = ctx.popup {
        render_popup(frame, popup);
    }
}

fn render_title(frame: &mut Frame<'_>, area: Rect, ctx: &UiContext<'_>) {
    let schema = &ctx.state.schema;
    let line = Line::from(vec![
        Span::styled(
            schema.label.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[Ctrl+N: {}]", schema.add_row_text),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
