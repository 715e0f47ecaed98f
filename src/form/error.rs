use std::cmp::Ordering;

use indexmap::IndexMap;

use crate::domain::Column;

/// Message shown when a required cell is empty and the raw validator
/// output would only restate the type violation.
pub const REQUIRED_MESSAGE: &str = "This field is required";

/// Derived map from `(row index, field)` to a validation message.
///
/// Filled from validator output after each validation pass, consulted
/// read-only by the renderer, and rebuilt rather than patched whenever the
/// rows change shape.
#[derive(Debug, Clone, Default)]
pub struct ErrorTree {
    entries: IndexMap<(usize, String), String>,
}

impl ErrorTree {
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn insert(&mut self, row: usize, field: &str, message: String) {
        self.entries.insert((row, field.to_string()), message);
    }

    pub fn remove(&mut self, row: usize, field: &str) {
        self.entries.shift_remove(&(row, field.to_string()));
    }

    pub fn get(&self, row: usize, field: &str) -> Option<&str> {
        self.entries
            .get(&(row, field.to_string()))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop the removed row's entries and shift the ones below it up by
    /// one, so messages keep pointing at the rows they were raised for.
    pub fn remove_row(&mut self, row: usize) {
        let entries = std::mem::take(&mut self.entries);
        for ((entry_row, field), message) in entries {
            match entry_row.cmp(&row) {
                Ordering::Less => {
                    self.entries.insert((entry_row, field), message);
                }
                Ordering::Equal => {}
                Ordering::Greater => {
                    self.entries.insert((entry_row - 1, field), message);
                }
            }
        }
    }

    /// Flat footer lines, one per entry, walking rows in order and columns
    /// in table order: `Row <n>: <message>` with 1-based row numbers.
    /// Empty when the tree is empty.
    pub fn footer_lines(&self, columns: &[Column]) -> Vec<String> {
        let mut rows: Vec<usize> = self.entries.keys().map(|(row, _)| *row).collect();
        rows.sort_unstable();
        rows.dedup();

        let mut lines = Vec::new();
        for row in rows {
            for column in columns {
                if let Some(message) = self.get(row, &column.field) {
                    lines.push(format!("Row {}: {message}", row + 1));
                }
            }
        }
        lines
    }
}
