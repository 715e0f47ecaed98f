use ratatui::layout::{Constraint, Layout, Rect};

/// Center a `width` x `height` box inside `area`, clamped to its bounds.
pub fn popup_rect(area: Rect, width: u16, height: u16) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Length(area.height.saturating_sub(height) / 2),
        Constraint::Length(height),
        Constraint::Min(0),
    ])
    .split(area);
    let inner = vertical[1];
    let horizontal = Layout::horizontal([
        Constraint::Length(inner.width.saturating_sub(width) / 2),
        Constraint::Length(width),
        Constraint::Min(0),
    ])
    .split(inner);
    horizontal[1]
}
