use jsonschema::Validator;
use serde_json::Value;

use crate::form::{REQUIRED_MESSAGE, TableState};

#[derive(Debug)]
pub enum ValidationOutcome {
    Valid(Value),
    Invalid {
        issues: usize,
        global_errors: Vec<String>,
    },
}

/// Where a validator failure lands.
enum Target {
    Cell {
        row: usize,
        column: usize,
        field: String,
    },
    Document,
}

/// Validate the current rows and route each failure to its cell.
///
/// Instance paths have the shape `/<row>/<field>`. Failures on cells that
/// are currently disabled are dropped entirely: a disabled cell holds no
/// value the user could fix, so it never blocks saving. Failures that do
/// not map onto an enabled cell are reported globally. Blank cells get the
/// default required message instead of the validator's phrasing.
pub fn validate_table(state: &mut TableState, validator: &Validator) -> ValidationOutcome {
    let value = state.build_value();
    state.clear_errors();

    let mut issues = 0usize;
    let mut global = Vec::new();
    for error in validator.iter_errors(&value) {
        let pointer = error.instance_path.to_string();
        match target(state, &pointer) {
            Target::Cell { row, column, field } => {
                if state.is_cell_disabled(row, column) {
                    continue;
                }
                issues += 1;
                let message = friendly_message(state, row, &field, error.to_string());
                if !state.set_error(row, &field, message.clone()) {
                    global.push(format!("{pointer}: {message}"));
                }
            }
            Target::Document => {
                issues += 1;
                let prefix = if pointer.is_empty() {
                    "<root>".to_string()
                } else {
                    pointer
                };
                global.push(format!("{prefix}: {error}"));
            }
        }
    }

    if issues == 0 {
        ValidationOutcome::Valid(value)
    } else {
        ValidationOutcome::Invalid {
            issues,
            global_errors: global,
        }
    }
}

fn friendly_message(state: &TableState, row: usize, field: &str, fallback: String) -> String {
    if state.rows().row_values(row).is_blank(field) {
        REQUIRED_MESSAGE.to_string()
    } else {
        fallback
    }
}

fn target(state: &TableState, pointer: &str) -> Target {
    let Some(rest) = pointer.strip_prefix('/') else {
        return Target::Document;
    };
    let mut parts = rest.splitn(2, '/');
    let Some(row) = parts.next().and_then(|part| part.parse::<usize>().ok()) else {
        return Target::Document;
    };
    let Some(field) = parts.next() else {
        return Target::Document;
    };
    if field.contains('/') || row >= state.row_count() {
        return Target::Document;
    }
    let Some(column) = state
        .schema
        .columns
        .iter()
        .position(|column| column.field == field)
    else {
        return Target::Document;
    };
    Target::Cell {
        row,
        column,
        field: field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Column, DisabledPredicate, SelectOption, TableSchema, document_schema};

    fn state(columns: Vec<Column>) -> (TableState, Validator) {
        let validator = jsonschema::validator_for(&document_schema(&columns)).unwrap();
        let mut state = TableState::new(TableSchema::new("parameters", columns));
        state.add_row();
        (state, validator)
    }

    #[test]
    fn blank_required_cells_get_the_default_message() {
        let (mut state, validator) = state(vec![
            Column::text("name").required(),
            Column::action("remove"),
        ]);

        let outcome = validate_table(&mut state, &validator);
        match outcome {
            ValidationOutcome::Invalid {
                issues,
                global_errors,
            } => {
                assert_eq!(issues, 1);
                assert!(global_errors.is_empty());
            }
            other => panic!("expected invalid, got {other:?}"),
        }
        assert_eq!(state.cell_error(0, "name"), Some(REQUIRED_MESSAGE));
        assert_eq!(state.footer_lines(), vec!["Row 1: This field is required"]);
    }

    #[test]
    fn non_blank_cells_keep_the_validator_phrasing() {
        let (mut state, validator) = state(vec![Column::select(
            "role",
            vec![SelectOption::plain("dev"), SelectOption::plain("ops")],
        )]);
        state.seed_rows(&[serde_json::json!({ "role": "intern" })]);

        let outcome = validate_table(&mut state, &validator);
        assert!(matches!(outcome, ValidationOutcome::Invalid { issues: 1, .. }));
        let message = state.cell_error(1, "role").unwrap();
        assert_ne!(message, REQUIRED_MESSAGE);
        assert!(message.contains("intern"));
    }

    #[test]
    fn failures_on_disabled_cells_never_block_saving() {
        let (mut state, validator) = state(vec![
            Column::text("name"),
            Column::select(
                "role",
                vec![SelectOption::plain("dev"), SelectOption::plain("ops")],
            )
            .required()
            .disabled_when(DisabledPredicate::when_empty("name")),
        ]);

        // The row is blank, so role is disabled and its schema failure
        // must be swallowed rather than routed or counted.
        let outcome = validate_table(&mut state, &validator);
        assert!(matches!(outcome, ValidationOutcome::Valid(_)));
        assert_eq!(state.error_count(), 0);
    }

    #[test]
    fn pointers_that_name_no_cell_stay_global() {
        let (state, _) = state(vec![Column::text("name")]);
        assert!(matches!(target(&state, "/0/name"), Target::Cell { .. }));
        assert!(matches!(target(&state, "/5/name"), Target::Document));
        assert!(matches!(target(&state, "/0/unknown"), Target::Document));
        assert!(matches!(target(&state, "/0"), Target::Document));
        assert!(matches!(target(&state, ""), Target::Document));
    }
}
