use std::fmt;

use crossterm::event::KeyEvent;
use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::domain::{CellValue, Column, TableSchema};

use super::cell;
use super::disabled::{DisabledMatrix, reconcile_disabled};
use super::error::ErrorTree;
use super::rows::{RowArray, RowId};

/// Produces the initial values of a freshly added row.
pub type RowFactory = Box<dyn Fn() -> IndexMap<String, CellValue> + Send>;

/// Authoritative table state: the schema, the rows, the derived disabled
/// matrix and error tree, and the focused cell.
///
/// Every mutating operation re-syncs the disabled matrix before returning,
/// so readers always observe reconciled rows. The matrix and the error
/// tree are projections; the rows are the only source of truth.
pub struct TableState {
    pub schema: TableSchema,
    rows: RowArray,
    disabled: DisabledMatrix,
    errors: ErrorTree,
    initial: Vec<IndexMap<String, CellValue>>,
    factory: Option<RowFactory>,
    focus_row: usize,
    focus_column: usize,
    scroll: usize,
    dirty: bool,
}

impl TableState {
    pub fn new(schema: TableSchema) -> Self {
        let mut rows = RowArray::new();
        let disabled = reconcile_disabled(&mut rows, &schema.columns);
        let focus_column = first_editable_column(&schema);
        Self {
            schema,
            rows,
            disabled,
            errors: ErrorTree::default(),
            initial: Vec::new(),
            factory: None,
            focus_row: 0,
            focus_column,
            scroll: 0,
            dirty: false,
        }
    }

    /// Install the factory used by [`add_row`](Self::add_row). Without one,
    /// new rows start with every value column cleared.
    pub fn set_factory(&mut self, factory: RowFactory) {
        self.factory = Some(factory);
    }

    pub fn rows(&self) -> &RowArray {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn errors(&self) -> &ErrorTree {
        &self.errors
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Re-derive and reconcile the disabled matrix if the rows moved on
    /// since the last derivation. Mutators call this on their way out;
    /// it is public so observers holding the state across external ticks
    /// can pull the latest projection explicitly.
    pub fn sync(&mut self) {
        if self.disabled.is_stale(&self.rows) {
            self.disabled = reconcile_disabled(&mut self.rows, &self.schema.columns);
        }
    }

    /// Seed rows from decoded document entries. Fields the entries do not
    /// mention stay cleared; the result becomes the reset baseline and the
    /// table starts out clean.
    pub fn seed_rows(&mut self, entries: &[Value]) {
        for entry in entries {
            let mut values = self.default_row();
            if let Some(object) = entry.as_object() {
                for column in self.schema.value_columns() {
                    if let Some(value) = object.get(&column.field) {
                        values.insert(column.field.clone(), CellValue::from_json(value));
                    }
                }
            }
            self.rows.append(values);
        }
        self.disabled = reconcile_disabled(&mut self.rows, &self.schema.columns);
        self.initial = self.snapshot();
        self.dirty = false;
        self.normalize_focus();
    }

    /// Append a new row from the factory (or all-cleared defaults), focus
    /// its first editable cell, and mark the table dirty.
    pub fn add_row(&mut self) -> RowId {
        let values = match &self.factory {
            Some(factory) => factory(),
            None => self.default_row(),
        };
        let id = self.rows.append(values);
        self.sync();
        self.dirty = true;
        self.focus_row = self.rows.len() - 1;
        self.focus_column = first_editable_column(&self.schema);
        id
    }

    /// Remove the row at `index`. Later rows shift up, keep their ids, and
    /// their error entries follow them.
    pub fn remove_row(&mut self, index: usize) -> bool {
        if self.rows.remove_at(index).is_none() {
            return false;
        }
        self.errors.remove_row(index);
        self.sync();
        self.dirty = true;
        self.normalize_focus();
        true
    }

    /// Restore the seeded baseline, dropping edits, errors and dirtiness.
    pub fn reset(&mut self) {
        self.rows = RowArray::new();
        for values in self.initial.clone() {
            self.rows.append(values);
        }
        self.disabled = reconcile_disabled(&mut self.rows, &self.schema.columns);
        self.errors.clear();
        self.dirty = false;
        self.focus_row = 0;
        self.focus_column = first_editable_column(&self.schema);
        self.scroll = 0;
        self.normalize_focus();
    }

    pub fn focus(&self) -> (usize, usize) {
        (self.focus_row, self.focus_column)
    }

    /// Slide the scroll window so the focused row stays visible in a body
    /// of `window` rows, then return the first visible row index.
    pub(crate) fn visible_offset(&mut self, window: usize) -> usize {
        if window == 0 || self.rows.is_empty() {
            self.scroll = 0;
            return 0;
        }
        if self.focus_row < self.scroll {
            self.scroll = self.focus_row;
        } else if self.focus_row >= self.scroll + window {
            self.scroll = self.focus_row + 1 - window;
        }
        let max_offset = self.rows.len().saturating_sub(window);
        self.scroll = self.scroll.min(max_offset);
        self.scroll
    }

    pub fn focused_column(&self) -> Option<&Column> {
        self.schema.columns.get(self.focus_column)
    }

    pub fn focused_value(&self) -> &CellValue {
        match self.rows.record(self.focus_row) {
            Some(record) => {
                let field = match self.schema.columns.get(self.focus_column) {
                    Some(column) => column.field.as_str(),
                    None => return &CellValue::Null,
                };
                record.value(field)
            }
            None => &CellValue::Null,
        }
    }

    pub fn is_cell_disabled(&self, row: usize, column: usize) -> bool {
        self.disabled.is_disabled(row, column)
    }

    pub fn is_focus_disabled(&self) -> bool {
        self.is_cell_disabled(self.focus_row, self.focus_column)
    }

    /// Move the focus one cell forward, wrapping into the next row and
    /// from the last cell back to the first.
    pub fn focus_next_cell(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        if self.focus_column + 1 < self.schema.columns.len() {
            self.focus_column += 1;
        } else {
            self.focus_column = 0;
            self.focus_row = (self.focus_row + 1) % self.rows.len();
        }
    }

    /// Move the focus one cell back, wrapping into the previous row and
    /// from the first cell to the last.
    pub fn focus_prev_cell(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        if self.focus_column > 0 {
            self.focus_column -= 1;
        } else {
            self.focus_column = self.schema.columns.len().saturating_sub(1);
            self.focus_row = if self.focus_row == 0 {
                self.rows.len() - 1
            } else {
                self.focus_row - 1
            };
        }
    }

    /// Move the focused row up or down, clamped at the table edges.
    pub fn focus_row_delta(&mut self, delta: i32) {
        if self.rows.is_empty() {
            return;
        }
        let len = self.rows.len() as i32;
        let next = (self.focus_row as i32 + delta).clamp(0, len - 1);
        self.focus_row = next as usize;
    }

    /// Route a key into the focused cell. Disabled cells swallow nothing;
    /// the key is reported unhandled so callers can map it elsewhere.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if self.rows.is_empty() || self.is_focus_disabled() {
            return false;
        }
        let Some(column) = self.schema.columns.get(self.focus_column) else {
            return false;
        };
        let Some(record) = self.rows.record(self.focus_row) else {
            return false;
        };
        let Some(next) = cell::apply_key(column, record.value(&column.field), key) else {
            return false;
        };

        let field = column.field.clone();
        if self.rows.set_value(self.focus_row, &field, next) {
            self.dirty = true;
            self.errors.remove(self.focus_row, &field);
            self.sync();
        }
        true
    }

    /// Store the select option at `index` into the focused cell. Used by
    /// the chooser popup; no-op on disabled or non-select cells.
    pub fn apply_option(&mut self, index: usize) -> bool {
        if self.rows.is_empty() || self.is_focus_disabled() {
            return false;
        }
        let Some(column) = self.focused_column() else {
            return false;
        };
        if !column.kind.is_select() {
            return false;
        }
        let field = column.field.clone();
        let value = cell::value_from_option(column, index);

        if self.rows.set_value(self.focus_row, &field, value) {
            self.dirty = true;
            self.errors.remove(self.focus_row, &field);
            self.sync();
        }
        true
    }

    /// The rows document handed to the validator and the output writer:
    /// an array with one object per row, every value column serialized,
    /// cleared cells included as nulls.
    pub fn build_value(&self) -> Value {
        let entries = self
            .rows
            .records()
            .iter()
            .map(|record| {
                let mut object = Map::new();
                for column in self.schema.value_columns() {
                    object.insert(column.field.clone(), record.value(&column.field).to_json());
                }
                Value::Object(object)
            })
            .collect();
        Value::Array(entries)
    }

    /// The emitted document: the rows array keyed by the table name.
    pub fn document(&self) -> Value {
        let mut root = Map::new();
        root.insert(self.schema.name.clone(), self.build_value());
        Value::Object(root)
    }

    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Attach a message to a cell. Refused (for the caller to surface
    /// globally) when the row does not exist, the field names no column,
    /// or the cell is currently disabled.
    pub fn set_error(&mut self, row: usize, field: &str, message: String) -> bool {
        if row >= self.rows.len() {
            return false;
        }
        let Some(position) = self
            .schema
            .columns
            .iter()
            .position(|column| column.field == field)
        else {
            return false;
        };
        if self.is_cell_disabled(row, position) {
            return false;
        }
        self.errors.insert(row, field, message);
        true
    }

    pub fn cell_error(&self, row: usize, field: &str) -> Option<&str> {
        self.errors.get(row, field)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn footer_lines(&self) -> Vec<String> {
        self.errors.footer_lines(&self.schema.columns)
    }

    fn default_row(&self) -> IndexMap<String, CellValue> {
        self.schema
            .value_columns()
            .map(|column| (column.field.clone(), CellValue::Null))
            .collect()
    }

    fn snapshot(&self) -> Vec<IndexMap<String, CellValue>> {
        self.rows
            .records()
            .iter()
            .map(|record| record.values.clone())
            .collect()
    }

    fn normalize_focus(&mut self) {
        if self.rows.is_empty() {
            self.focus_row = 0;
            return;
        }
        if self.focus_row >= self.rows.len() {
            self.focus_row = self.rows.len() - 1;
        }
        if self.focus_column >= self.schema.columns.len() {
            self.focus_column = self.schema.columns.len().saturating_sub(1);
        }
    }
}

impl fmt::Debug for TableState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableState")
            .field("schema", &self.schema.name)
            .field("rows", &self.rows.len())
            .field("errors", &self.errors.len())
            .field("focus", &(self.focus_row, self.focus_column))
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

fn first_editable_column(schema: &TableSchema) -> usize {
    schema
        .columns
        .iter()
        .position(|column| !column.kind.is_action())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisabledPredicate, SelectOption, parse_table_schema};
    use crossterm::event::{KeyCode, KeyModifiers};
    use serde_json::json;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn parameters_schema() -> TableSchema {
        TableSchema::new(
            "parameters",
            vec![
                Column::text("name").required(),
                Column::select(
                    "role",
                    vec![
                        SelectOption::new("admin", "Admin"),
                        SelectOption::new("user", "User"),
                    ],
                )
                .disabled_when(DisabledPredicate::when_empty("name")),
                Column::boolean("required"),
                Column::action("remove"),
            ],
        )
    }

    fn seeded_state() -> TableState {
        let mut state = TableState::new(parameters_schema());
        state.seed_rows(&[
            json!({ "name": "token", "role": "admin", "required": true }),
            json!({ "name": "limit", "role": "user", "required": false }),
        ]);
        state
    }

    #[test]
    fn seeding_is_not_an_edit() {
        let state = seeded_state();
        assert_eq!(state.row_count(), 2);
        assert!(!state.is_dirty());
    }

    #[test]
    fn add_row_focuses_the_new_row() {
        let mut state = seeded_state();
        state.add_row();
        assert_eq!(state.row_count(), 3);
        assert!(state.is_dirty());
        assert_eq!(state.focus(), (2, 0));
        assert!(state.rows().record(2).unwrap().value("name").is_null());
    }

    #[test]
    fn factory_rows_are_reconciled_on_arrival() {
        let mut state = TableState::new(parameters_schema());
        state.set_factory(Box::new(|| {
            let mut values = IndexMap::new();
            values.insert("name".to_string(), CellValue::Null);
            values.insert("role".to_string(), CellValue::text("admin"));
            values
        }));
        state.add_row();
        // Blank name disables role, so the seeded pick is cleared away.
        assert!(state.rows().record(0).unwrap().value("role").is_null());
    }

    #[test]
    fn typing_edits_the_focused_cell() {
        let mut state = seeded_state();
        assert!(state.handle_key(&key(KeyCode::Char('s'))));
        assert!(state.is_dirty());
        assert_eq!(
            state.rows().record(0).unwrap().value("name"),
            &CellValue::text("tokens")
        );
    }

    #[test]
    fn disabled_cells_ignore_keys() {
        let mut state = TableState::new(parameters_schema());
        state.add_row();
        state.focus_next_cell();
        assert!(state.is_focus_disabled());
        assert!(!state.handle_key(&key(KeyCode::Right)));
        assert!(state.focused_value().is_null());
    }

    #[test]
    fn reenabled_select_waits_for_an_explicit_pick() {
        let mut state = TableState::new(parameters_schema());
        state.add_row();
        state.handle_key(&key(KeyCode::Char('x')));
        state.focus_next_cell();
        assert!(!state.is_focus_disabled());
        assert!(state.focused_value().is_null());

        assert!(state.handle_key(&key(KeyCode::Right)));
        assert_eq!(state.focused_value(), &CellValue::text("admin"));
    }

    #[test]
    fn parsed_disabled_when_tracks_boolean_picks() {
        let config = json!({
            "name": "parameters",
            "columns": [
                { "field": "name", "type": "text" },
                { "field": "required", "type": "select" },
                {
                    "field": "default",
                    "type": "text",
                    "disabled_when": { "field": "required", "equals": "true" }
                }
            ]
        });
        let mut state = TableState::new(parse_table_schema(&config).unwrap());
        state.add_row();
        state.focus_next_cell();
        state.focus_next_cell();
        state.handle_key(&key(KeyCode::Char('4')));
        state.handle_key(&key(KeyCode::Char('2')));

        // Picking Yes stores a real boolean; the dependent cell must go
        // disabled and lose its text to reconciliation.
        state.focus_prev_cell();
        assert!(state.apply_option(0));
        assert_eq!(state.focused_value(), &CellValue::Bool(true));
        assert!(state.is_cell_disabled(0, 2));
        assert!(state.rows().record(0).unwrap().value("default").is_null());

        assert!(state.apply_option(1));
        assert_eq!(state.focused_value(), &CellValue::Bool(false));
        assert!(!state.is_cell_disabled(0, 2));
    }

    #[test]
    fn boolean_cells_store_real_booleans() {
        let mut state = seeded_state();
        state.focus_next_cell();
        state.focus_next_cell();
        assert!(state.apply_option(1));
        assert_eq!(state.focused_value(), &CellValue::Bool(false));
        assert_eq!(state.build_value()[0]["required"], json!(false));
    }

    #[test]
    fn tab_navigation_wraps_rows_and_table() {
        let mut state = seeded_state();
        for _ in 0..4 {
            state.focus_next_cell();
        }
        assert_eq!(state.focus(), (1, 0));

        state.focus_prev_cell();
        assert_eq!(state.focus(), (0, 3));

        for _ in 0..5 {
            state.focus_next_cell();
        }
        assert_eq!(state.focus(), (0, 0));
    }

    #[test]
    fn navigation_survives_a_columnless_table() {
        let mut state = TableState::new(TableSchema::new("empty", vec![]));
        state.seed_rows(&[json!({})]);
        state.focus_prev_cell();
        state.focus_next_cell();
        assert_eq!(state.focus(), (0, 0));
    }

    #[test]
    fn row_navigation_clamps_at_the_edges() {
        let mut state = seeded_state();
        state.focus_row_delta(-1);
        assert_eq!(state.focus(), (0, 0));
        state.focus_row_delta(5);
        assert_eq!(state.focus(), (1, 0));
    }

    #[test]
    fn remove_row_shifts_errors_and_clamps_focus() {
        let mut state = seeded_state();
        state.set_error(1, "name", "broken".to_string());
        state.focus_row_delta(1);

        assert!(state.remove_row(0));
        assert_eq!(state.row_count(), 1);
        assert_eq!(state.cell_error(0, "name"), Some("broken"));
        assert_eq!(state.focus().0, 0);
        assert!(!state.remove_row(7));
    }

    #[test]
    fn errors_on_disabled_cells_are_refused() {
        let mut state = TableState::new(parameters_schema());
        state.add_row();
        assert!(!state.set_error(0, "role", "stale".to_string()));
        assert!(state.set_error(0, "name", "missing".to_string()));
        assert!(!state.set_error(0, "nonsense", "lost".to_string()));
        assert!(!state.set_error(9, "name", "lost".to_string()));
    }

    #[test]
    fn build_value_serializes_every_value_column() {
        let mut state = TableState::new(parameters_schema());
        state.add_row();
        assert_eq!(
            state.build_value(),
            json!([{ "name": null, "role": null, "required": null }])
        );
        assert_eq!(
            state.document(),
            json!({ "parameters": [{ "name": null, "role": null, "required": null }] })
        );
    }

    #[test]
    fn reset_restores_the_seeded_baseline() {
        let mut state = seeded_state();
        state.handle_key(&key(KeyCode::Char('x')));
        state.add_row();
        state.set_error(0, "name", "noise".to_string());

        state.reset();
        assert_eq!(state.row_count(), 2);
        assert!(!state.is_dirty());
        assert_eq!(state.error_count(), 0);
        assert_eq!(
            state.rows().record(0).unwrap().value("name"),
            &CellValue::text("token")
        );
    }

    #[test]
    fn editing_a_cell_drops_its_error() {
        let mut state = seeded_state();
        state.set_error(0, "name", "bad".to_string());
        state.handle_key(&key(KeyCode::Char('x')));
        assert_eq!(state.cell_error(0, "name"), None);
    }
}
