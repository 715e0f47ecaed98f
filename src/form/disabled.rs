use crate::domain::{CellValue, Column};

use super::rows::RowArray;

/// Derived rows-by-columns projection of every cell's disabled flag.
///
/// Tagged with the row revision it was computed from; consumers re-derive
/// when [`is_stale`](Self::is_stale) says the rows moved on. Never a source
/// of truth on its own.
#[derive(Debug, Clone)]
pub struct DisabledMatrix {
    revision: u64,
    flags: Vec<Vec<bool>>,
}

impl DisabledMatrix {
    /// Evaluate every column predicate against every row's current values.
    pub fn derive(rows: &RowArray, columns: &[Column]) -> Self {
        let flags = rows
            .records()
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| match &column.disabled {
                        Some(predicate) => predicate.evaluate(record.view()),
                        None => false,
                    })
                    .collect()
            })
            .collect();
        Self {
            revision: rows.revision(),
            flags,
        }
    }

    pub fn is_disabled(&self, row: usize, column: usize) -> bool {
        self.flags
            .get(row)
            .and_then(|row_flags| row_flags.get(column))
            .copied()
            .unwrap_or(false)
    }

    pub fn is_stale(&self, rows: &RowArray) -> bool {
        self.revision != rows.revision()
    }
}

/// Clear every disabled cell back to null and re-derive until the matrix
/// stops moving.
///
/// Clearing one cell may flip a predicate that watches it, so this loops
/// to a fixed point. Predicates are required to be acyclic across columns
/// (each may depend only on other columns), which bounds convergence at
/// one pass per column; the loop is capped there so a config that breaks
/// the precondition settles on the last derived state instead of spinning.
pub fn reconcile_disabled(rows: &mut RowArray, columns: &[Column]) -> DisabledMatrix {
    let mut matrix = DisabledMatrix::derive(rows, columns);
    for _ in 0..=columns.len() {
        let mut changed = false;
        for row_index in 0..rows.len() {
            for (column_index, column) in columns.iter().enumerate() {
                if column.kind.is_action() {
                    continue;
                }
                if matrix.is_disabled(row_index, column_index)
                    && rows.set_value(row_index, &column.field, CellValue::Null)
                {
                    changed = true;
                }
            }
        }
        if !changed {
            return matrix;
        }
        matrix = DisabledMatrix::derive(rows, columns);
    }
    matrix
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DisabledPredicate;
    use indexmap::IndexMap;

    fn row(pairs: &[(&str, &str)]) -> IndexMap<String, CellValue> {
        pairs
            .iter()
            .map(|(field, value)| (field.to_string(), CellValue::text(*value)))
            .collect()
    }

    fn name_role_columns() -> Vec<Column> {
        vec![
            Column::text("name"),
            Column::text("role").disabled_when(DisabledPredicate::when_empty("name")),
        ]
    }

    #[test]
    fn derive_mirrors_the_predicates() {
        let columns = name_role_columns();
        let mut rows = RowArray::new();
        rows.append(row(&[("name", ""), ("role", "admin")]));
        rows.append(row(&[("name", "api"), ("role", "user")]));

        let matrix = DisabledMatrix::derive(&rows, &columns);
        assert!(!matrix.is_disabled(0, 0));
        assert!(matrix.is_disabled(0, 1));
        assert!(!matrix.is_disabled(1, 1));
        assert!(!matrix.is_disabled(7, 7));
    }

    #[test]
    fn reconcile_nulls_out_disabled_cells() {
        let columns = name_role_columns();
        let mut rows = RowArray::new();
        rows.append(row(&[("name", ""), ("role", "admin")]));

        let matrix = reconcile_disabled(&mut rows, &columns);
        assert!(matrix.is_disabled(0, 1));
        assert!(rows.record(0).unwrap().value("role").is_null());
        assert!(!matrix.is_stale(&rows));
    }

    #[test]
    fn reenabled_cell_stays_cleared_until_edited() {
        let columns = name_role_columns();
        let mut rows = RowArray::new();
        rows.append(row(&[("name", ""), ("role", "admin")]));
        reconcile_disabled(&mut rows, &columns);

        rows.set_value(0, "name", CellValue::text("api"));
        let matrix = reconcile_disabled(&mut rows, &columns);
        assert!(!matrix.is_disabled(0, 1));
        assert!(rows.record(0).unwrap().value("role").is_null());
    }

    #[test]
    fn chained_predicates_reach_a_fixed_point() {
        let columns = vec![
            Column::text("a"),
            Column::text("b").disabled_when(DisabledPredicate::when_empty("a")),
            Column::text("c").disabled_when(DisabledPredicate::when_empty("b")),
        ];
        let mut rows = RowArray::new();
        rows.append(row(&[("a", ""), ("b", "x"), ("c", "y")]));

        // Clearing b flips c's predicate, which only the second pass sees.
        let matrix = reconcile_disabled(&mut rows, &columns);
        let record = rows.record(0).unwrap();
        assert!(record.value("b").is_null());
        assert!(record.value("c").is_null());
        assert!(matrix.is_disabled(0, 1));
        assert!(matrix.is_disabled(0, 2));
        assert!(!matrix.is_stale(&rows));
    }

    #[test]
    fn matrix_goes_stale_when_rows_move_on() {
        let columns = name_role_columns();
        let mut rows = RowArray::new();
        rows.append(row(&[("name", "api"), ("role", "user")]));

        let matrix = DisabledMatrix::derive(&rows, &columns);
        assert!(!matrix.is_stale(&rows));
        rows.set_value(0, "role", CellValue::text("admin"));
        assert!(matrix.is_stale(&rows));
    }

    #[test]
    fn action_cells_are_never_written() {
        let columns = vec![
            Column::text("name"),
            Column::action("remove").disabled_when(DisabledPredicate::when_empty("name")),
        ];
        let mut rows = RowArray::new();
        rows.append(row(&[("name", "")]));

        let matrix = reconcile_disabled(&mut rows, &columns);
        assert!(matrix.is_disabled(0, 1));
        assert!(!rows.record(0).unwrap().values.contains_key("remove"));
    }
}
