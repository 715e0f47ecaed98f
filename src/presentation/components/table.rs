use ratatui::{
    Frame,
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::domain::{CellValue, Column, ColumnKind};
use crate::form::{TableState, cell};

const ACTION_WIDTH: u16 = 8;
const COLUMN_SPACING: u16 = 1;

/// Render the table body: header row, the visible window of data rows and
/// the terminal cursor for the focused text cell. Scrolling is driven by
/// the state so the focused row is always inside the window.
pub fn render_table(frame: &mut Frame<'_>, area: Rect, state: &mut TableState, enable_cursor: bool) {
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);

    if state.row_count() == 0 {
        let placeholder = Paragraph::new("No rows. Press Ctrl+N to add one.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    }

    let window = inner.height.saturating_sub(1) as usize;
    let offset = state.visible_offset(window);
    let state = &*state;

    let columns = &state.schema.columns;
    let widths = column_widths(inner.width, columns);
    let (focus_row, focus_column) = state.focus();

    let header = Row::new(columns.iter().map(header_cell).collect::<Vec<_>>());
    let rows: Vec<Row<'_>> = state
        .rows()
        .records()
        .iter()
        .enumerate()
        .skip(offset)
        .take(window)
        .map(|(row, record)| {
            let cells = columns.iter().enumerate().map(|(col, column)| {
                let focused = (row, col) == (focus_row, focus_column);
                body_cell(state, row, col, column, record.value(&column.field), widths[col], focused)
            });
            Row::new(cells.collect::<Vec<_>>())
        })
        .collect();

    let table = Table::new(rows, widths.iter().map(|width| Constraint::Length(*width)))
        .header(header)
        .block(block)
        .column_spacing(COLUMN_SPACING);
    frame.render_widget(table, area);

    if enable_cursor {
        set_text_cursor(frame, inner, state, &widths, offset, window);
    }
}

fn header_cell(column: &Column) -> Cell<'static> {
    let mut spans = vec![Span::styled(
        column.header.clone(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    if column.rules.required && !column.kind.is_action() {
        spans.push(Span::styled(" *", Style::default().fg(Color::Yellow)));
    }
    Cell::from(Line::from(spans))
}

fn body_cell(
    state: &TableState,
    row: usize,
    col: usize,
    column: &Column,
    value: &CellValue,
    width: u16,
    focused: bool,
) -> Cell<'static> {
    let disabled = state.is_cell_disabled(row, col);
    let mut text = cell::display_text(column, value);
    let mut style = if disabled {
        text.clear();
        Style::default().fg(Color::DarkGray)
    } else if state.cell_error(row, &column.field).is_some() {
        Style::default().fg(Color::Red)
    } else if column.kind.is_action() {
        Style::default().fg(Color::Gray)
    } else {
        Style::default().fg(Color::White)
    };

    if text.is_empty() && !disabled && !column.kind.is_action() {
        text = column.placeholder();
        style = style.fg(Color::DarkGray);
    } else if focused && matches!(column.kind, ColumnKind::Text) {
        text = visible_tail(&text, width);
    }

    if focused {
        style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
    }
    Cell::from(text).style(style)
}

/// Place the terminal cursor after the focused text cell's content, when
/// that cell is editable and inside the visible window.
fn set_text_cursor(
    frame: &mut Frame<'_>,
    inner: Rect,
    state: &TableState,
    widths: &[u16],
    offset: usize,
    window: usize,
) {
    if state.is_focus_disabled() {
        return;
    }
    let Some(column) = state.focused_column() else {
        return;
    };
    if !matches!(column.kind, ColumnKind::Text) {
        return;
    }
    let (focus_row, focus_column) = state.focus();
    if focus_row < offset || focus_row >= offset + window {
        return;
    }

    let width = widths[focus_column];
    let text = state.focused_value().as_text().unwrap_or("");
    let text_width = UnicodeWidthStr::width(text) as u16;
    let cell_x: u16 = widths[..focus_column].iter().sum::<u16>()
        + COLUMN_SPACING * focus_column as u16;
    let x = inner.x + cell_x + text_width.min(width.saturating_sub(1));
    let y = inner.y + 1 + (focus_row - offset) as u16;
    frame.set_cursor_position((x, y));
}

/// Split the inner width over the columns: action columns take a fixed
/// slot, the rest share what remains evenly.
fn column_widths(total: u16, columns: &[Column]) -> Vec<u16> {
    let spacing = COLUMN_SPACING * columns.len().saturating_sub(1) as u16;
    let mut available = total.saturating_sub(spacing);
    let mut widths = vec![0u16; columns.len()];

    for (index, column) in columns.iter().enumerate() {
        if column.kind.is_action() {
            let width = ACTION_WIDTH.min(available);
            widths[index] = width;
            available -= width;
        }
    }

    let flexible = columns.iter().filter(|column| !column.kind.is_action()).count() as u16;
    if flexible > 0 {
        let share = available / flexible;
        let mut remainder = available % flexible;
        for (index, column) in columns.iter().enumerate() {
            if !column.kind.is_action() {
                let extra = if remainder > 0 {
                    remainder -= 1;
                    1
                } else {
                    0
                };
                widths[index] = share + extra;
            }
        }
    }
    widths
}

/// The trailing slice of `text` that fits in `width` minus one cursor
/// column. Keeps the insertion point visible while typing past the edge.
fn visible_tail(text: &str, width: u16) -> String {
    let budget = (width as usize).saturating_sub(1);
    if UnicodeWidthStr::width(text) <= budget {
        return text.to_string();
    }
    let mut tail = Vec::new();
    let mut used = 0;
    for ch in text.chars().rev() {
        let char_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + char_width > budget {
            break;
        }
        tail.push(ch);
        used += char_width;
    }
    tail.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_columns_get_a_fixed_slot() {
        let columns = vec![
            Column::text("name"),
            Column::text("label"),
            Column::action("remove"),
        ];
        let widths = column_widths(30, &columns);
        assert_eq!(widths, vec![10, 10, 8]);
    }

    #[test]
    fn narrow_areas_never_underflow() {
        let columns = vec![Column::text("name"), Column::action("remove")];
        let widths = column_widths(5, &columns);
        assert_eq!(widths.iter().sum::<u16>(), 4);
    }

    #[test]
    fn long_text_scrolls_to_the_tail() {
        assert_eq!(visible_tail("abcdef", 4), "def");
        assert_eq!(visible_tail("abc", 4), "abc");
        assert_eq!(visible_tail("abc", 0), "");
    }
}
