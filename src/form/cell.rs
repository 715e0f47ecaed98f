use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::domain::{CellValue, Column, ColumnKind};

/// Compute the value a key edit turns `current` into, for the given
/// column. `None` means the key does not edit this cell kind and may be
/// handled elsewhere.
///
/// Text cells append and pop at the end of the buffer; `Delete` clears the
/// cell back to null. Select cells cycle their options with Left/Right or
/// Space. Action cells never edit.
pub fn apply_key(column: &Column, current: &CellValue, key: &KeyEvent) -> Option<CellValue> {
    match &column.kind {
        ColumnKind::Text => match key.code {
            KeyCode::Char(c) => {
                if key.modifiers.contains(KeyModifiers::CONTROL) {
                    return None;
                }
                let mut buffer = current.as_text().unwrap_or("").to_string();
                buffer.push(c);
                Some(CellValue::Text(buffer))
            }
            KeyCode::Backspace => {
                let text = current.as_text()?;
                let mut buffer = text.to_string();
                buffer.pop();
                Some(CellValue::Text(buffer))
            }
            KeyCode::Delete => Some(CellValue::Null),
            _ => None,
        },
        ColumnKind::Select { .. } => match key.code {
            KeyCode::Left => cycle_option(column, current, -1),
            KeyCode::Right | KeyCode::Char(' ') => cycle_option(column, current, 1),
            KeyCode::Delete => Some(CellValue::Null),
            _ => None,
        },
        ColumnKind::Action => None,
    }
}

/// Move a select cell to the previous or next option, wrapping at the
/// ends. An empty selection enters the list at the end `step` points at.
pub fn cycle_option(column: &Column, current: &CellValue, step: i32) -> Option<CellValue> {
    let options = column.options();
    if options.is_empty() {
        return None;
    }
    let len = options.len() as i32;
    let next = match selected_option_index(column, current) {
        Some(index) => (index as i32 + step).rem_euclid(len),
        None if step >= 0 => 0,
        None => len - 1,
    };
    Some(value_from_option(column, next as usize))
}

/// Index of the option the cell currently holds, if any.
pub fn selected_option_index(column: &Column, current: &CellValue) -> Option<usize> {
    let wire = wire_text(column, current)?;
    column
        .options()
        .iter()
        .position(|option| option.value == wire)
}

/// The stored value for picking option `index`, with boolean columns
/// coercing the wire string to a real boolean.
pub fn value_from_option(column: &Column, index: usize) -> CellValue {
    let Some(option) = column.options().get(index) else {
        return CellValue::Null;
    };
    if column.is_boolean() {
        CellValue::Bool(option.value == "true")
    } else {
        CellValue::Text(option.value.clone())
    }
}

/// The option-list wire form of a cell value: booleans map back to
/// `"true"` / `"false"`, text passes through, null has no wire form.
pub fn wire_text(column: &Column, value: &CellValue) -> Option<String> {
    match value {
        CellValue::Null => None,
        CellValue::Text(text) => Some(text.clone()),
        CellValue::Bool(flag) => {
            if column.is_boolean() {
                Some(flag.to_string())
            } else {
                None
            }
        }
    }
}

/// What the renderer prints inside the cell. Empty for cleared cells, the
/// option label for selects, a fixed caption for action cells.
pub fn display_text(column: &Column, value: &CellValue) -> String {
    match &column.kind {
        ColumnKind::Text => value.as_text().unwrap_or("").to_string(),
        ColumnKind::Select { .. } => wire_text(column, value)
            .map(|wire| column.option_label(&wire))
            .unwrap_or_default(),
        ColumnKind::Action => "Remove".to_string(),
    }
}
