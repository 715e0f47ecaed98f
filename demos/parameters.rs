//! Interactive parameters table built from the typed API.
//!
//! Run with `cargo run --example parameters`. The `default` column is
//! disabled while a parameter is marked required, so forced defaults
//! cannot sneak into saved rows.

use anyhow::Result;
use tableui::{
    Column, DisabledPredicate, SelectOption, TableSchema, TableUI, ValidationRules,
};

fn main() -> Result<()> {
    let schema = TableSchema::new(
        "parameters",
        vec![
            Column::text("name").header("Name").rules(ValidationRules {
                required: true,
                min_length: Some(2),
                max_length: Some(32),
                pattern: Some("^[a-z][a-z0-9_]*$".to_string()),
            }),
            Column::select(
                "type",
                vec![
                    SelectOption::new("string", "String"),
                    SelectOption::new("number", "Number"),
                    SelectOption::new("boolean", "Boolean"),
                ],
            )
            .header("Type")
            .required(),
            Column::boolean("required").header("Required"),
            Column::text("default")
                .header("Default")
                .disabled_when(DisabledPredicate::new(|row| row.is_true("required"))),
            Column::action("remove").header("Del"),
        ],
    )
    .label("Request parameters")
    .add_row_text("Add parameter");

    let rows = TableUI::new(schema)
        .with_seed_rows(vec![serde_json::json!({
            "name": "token",
            "type": "string",
            "required": true,
        })])
        .run()?;

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
