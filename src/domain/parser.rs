use anyhow::{Context, Result, bail};
use regex::Regex;
use serde_json::Value;

use super::column::{
    BOOLEAN_FIELD, Column, ColumnKind, DisabledPredicate, SelectOption, TableSchema,
    ValidationRules,
};

/// Parse a declarative table config into a [`TableSchema`].
///
/// Root object: `{ "name", "label"?, "add_row_text"?, "columns": [...] }`.
/// Column objects: `{ "field", "header"?, "type": "text" | "select" |
/// "action", "options"?, "rules"?: { "required", "minLength", "maxLength",
/// "pattern" }, "disabled_when"?: { "field", "equals" | "empty" } }`.
///
/// Malformed configs are caller defects and come back as errors naming the
/// offending column.
pub fn parse_table_schema(value: &Value) -> Result<TableSchema> {
    let root = value.as_object().context("table config must be an object")?;

    let name = root
        .get("name")
        .and_then(Value::as_str)
        .context("table config must define a string 'name'")?;

    let column_values = root
        .get("columns")
        .and_then(Value::as_array)
        .context("table config must define a 'columns' array")?;
    if column_values.is_empty() {
        bail!("table config must define at least one column");
    }

    let mut columns = Vec::with_capacity(column_values.len());
    for entry in column_values {
        columns.push(parse_column(entry)?);
    }
    check_column_references(&columns)?;

    let mut schema = TableSchema::new(name, columns);
    if let Some(label) = root.get("label").and_then(Value::as_str) {
        schema = schema.label(label);
    }
    if let Some(text) = root.get("add_row_text").and_then(Value::as_str) {
        schema = schema.add_row_text(text);
    }
    Ok(schema)
}

fn parse_column(value: &Value) -> Result<Column> {
    let object = value
        .as_object()
        .context("column entries must be objects")?;
    let field = object
        .get("field")
        .and_then(Value::as_str)
        .context("column must define a string 'field'")?;

    let kind = object
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("text");
    let mut column = match kind {
        "text" => Column::text(field),
        "select" => parse_select_column(object, field)?,
        "action" => Column::action(field),
        other => bail!("column '{field}' has unknown type '{other}'"),
    };

    if let Some(header) = object.get("header").and_then(Value::as_str) {
        column = column.header(header);
    }
    if let Some(rules) = object.get("rules") {
        column = column.rules(parse_rules(rules, field)?);
    }
    if let Some(condition) = object.get("disabled_when") {
        column = column.disabled_when(parse_disabled_when(condition, field)?);
    }
    Ok(column)
}

fn parse_select_column(
    object: &serde_json::Map<String, Value>,
    field: &str,
) -> Result<Column> {
    let options = match object.get("options") {
        Some(value) => parse_options(value, field)?,
        None => Vec::new(),
    };

    // The reserved boolean field stores its pick as a bool on the wire.
    if field == BOOLEAN_FIELD {
        if options.is_empty() {
            return Ok(Column::boolean(field));
        }
        for option in &options {
            if option.value != "true" && option.value != "false" {
                bail!(
                    "boolean column '{field}' only takes option values 'true' and 'false', \
                     found '{}'",
                    option.value
                );
            }
        }
        let mut column = Column::select(field, options);
        if let ColumnKind::Select { boolean, .. } = &mut column.kind {
            *boolean = true;
        }
        return Ok(column);
    }

    if options.is_empty() {
        bail!("select column '{field}' must define options");
    }
    Ok(Column::select(field, options))
}

fn parse_options(value: &Value, field: &str) -> Result<Vec<SelectOption>> {
    let entries = value
        .as_array()
        .with_context(|| format!("options of column '{field}' must be an array"))?;

    let mut options = Vec::with_capacity(entries.len());
    for entry in entries {
        let option = match entry {
            Value::String(text) => SelectOption::plain(text.clone()),
            Value::Object(pair) => {
                let value = pair
                    .get("value")
                    .and_then(Value::as_str)
                    .with_context(|| {
                        format!("option of column '{field}' must define a string 'value'")
                    })?;
                let label = pair.get("label").and_then(Value::as_str).unwrap_or(value);
                SelectOption::new(value, label)
            }
            other => bail!(
                "option of column '{field}' must be a string or object, found {other}"
            ),
        };
        options.push(option);
    }
    Ok(options)
}

fn parse_rules(value: &Value, field: &str) -> Result<ValidationRules> {
    let object = value
        .as_object()
        .with_context(|| format!("rules of column '{field}' must be an object"))?;

    let pattern = match object.get("pattern").and_then(Value::as_str) {
        Some(pattern) => {
            Regex::new(pattern)
                .with_context(|| format!("invalid pattern for column '{field}'"))?;
            Some(pattern.to_string())
        }
        None => None,
    };

    Ok(ValidationRules {
        required: object
            .get("required")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        min_length: object.get("minLength").and_then(Value::as_u64),
        max_length: object.get("maxLength").and_then(Value::as_u64),
        pattern,
    })
}

fn parse_disabled_when(value: &Value, field: &str) -> Result<DisabledPredicate> {
    let object = value
        .as_object()
        .with_context(|| format!("disabled_when of column '{field}' must be an object"))?;
    let watched = object
        .get("field")
        .and_then(Value::as_str)
        .with_context(|| format!("disabled_when of column '{field}' must name a 'field'"))?;
    if watched == field {
        bail!("disabled_when of column '{field}' must reference another column");
    }

    let equals = object.get("equals").and_then(Value::as_str);
    let empty = object
        .get("empty")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    match (equals, empty) {
        (Some(target), false) => Ok(DisabledPredicate::when_equals(watched, target)),
        (None, true) => Ok(DisabledPredicate::when_empty(watched)),
        _ => bail!(
            "disabled_when of column '{field}' must set exactly one of 'equals' or 'empty'"
        ),
    }
}

fn check_column_references(columns: &[Column]) -> Result<()> {
    for (index, column) in columns.iter().enumerate() {
        if columns
            .iter()
            .take(index)
            .any(|earlier| earlier.field == column.field)
        {
            bail!("duplicate column field '{}'", column.field);
        }
    }
    Ok(())
}
