use serde_json::{Map, Value, json};

use super::column::{Column, ColumnKind, SelectOption};

/// Compile the column set into the draft-07 JSON Schema the rows document
/// is validated against.
///
/// The document is the bare array of row objects. Every value column is
/// listed as a required property because the table serializes all of them,
/// cleared cells included; emptiness therefore surfaces as a per-field type
/// or length violation with an instance path of `/<row>/<field>`, never as
/// a row-level missing-property error.
pub fn document_schema(columns: &[Column]) -> Value {
    let mut properties = Map::new();
    let mut field_names = Vec::new();

    for column in columns {
        let property = match &column.kind {
            ColumnKind::Action => continue,
            ColumnKind::Text => text_schema(column),
            ColumnKind::Select { options, boolean } => select_schema(column, options, *boolean),
        };
        properties.insert(column.field.clone(), property);
        field_names.push(Value::String(column.field.clone()));
    }

    json!({
        "$schema": "http://json-schema.org/draft-07/schema#",
        "type": "array",
        "items": {
            "type": "object",
            "properties": Value::Object(properties),
            "required": Value::Array(field_names),
            "additionalProperties": false,
        }
    })
}

fn select_schema(column: &Column, options: &[SelectOption], boolean: bool) -> Value {
    if boolean {
        if column.rules.required {
            json!({ "type": "boolean" })
        } else {
            json!({ "type": ["boolean", "null"] })
        }
    } else {
        let mut values: Vec<Value> = options
            .iter()
            .map(|option| Value::String(option.value.clone()))
            .collect();
        if !column.rules.required {
            values.push(Value::Null);
        }
        json!({ "enum": values })
    }
}

fn text_schema(column: &Column) -> Value {
    let mut schema = Map::new();
    let rules = &column.rules;

    if rules.required {
        schema.insert("type".to_string(), json!("string"));
        schema.insert(
            "minLength".to_string(),
            json!(rules.min_length.unwrap_or(1).max(1)),
        );
    } else {
        schema.insert("type".to_string(), json!(["string", "null"]));
        if let Some(min) = rules.min_length {
            schema.insert("minLength".to_string(), json!(min));
        }
    }
    if let Some(max) = rules.max_length {
        schema.insert("maxLength".to_string(), json!(max));
    }
    if let Some(pattern) = &rules.pattern {
        schema.insert("pattern".to_string(), json!(pattern));
    }

    Value::Object(schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::column::ValidationRules;
    use serde_json::json;

    fn columns() -> Vec<Column> {
        vec![
            Column::text("name").required(),
            Column::select(
                "in",
                vec![SelectOption::plain("query"), SelectOption::plain("path")],
            ),
            Column::boolean("required").required(),
            Column::action("remove"),
        ]
    }

    #[test]
    fn action_columns_are_left_out() {
        let schema = document_schema(&columns());
        let items = &schema["items"];
        assert!(items["properties"].get("remove").is_none());
        assert_eq!(items["required"], json!(["name", "in", "required"]));
        assert_eq!(items["additionalProperties"], json!(false));
    }

    #[test]
    fn required_text_rejects_null_and_empty() {
        let schema = document_schema(&columns());
        assert_eq!(
            schema["items"]["properties"]["name"],
            json!({ "type": "string", "minLength": 1 })
        );
    }

    #[test]
    fn optional_select_admits_null() {
        let schema = document_schema(&columns());
        assert_eq!(
            schema["items"]["properties"]["in"],
            json!({ "enum": ["query", "path", null] })
        );
    }

    #[test]
    fn boolean_column_is_typed_boolean() {
        let schema = document_schema(&columns());
        assert_eq!(
            schema["items"]["properties"]["required"],
            json!({ "type": "boolean" })
        );
    }

    #[test]
    fn length_and_pattern_rules_carry_over() {
        let column = Column::text("name").rules(ValidationRules {
            required: true,
            min_length: Some(2),
            max_length: Some(64),
            pattern: Some("^[a-z]+$".to_string()),
        });
        let schema = document_schema(&[column]);
        assert_eq!(
            schema["items"]["properties"]["name"],
            json!({
                "type": "string",
                "minLength": 2,
                "maxLength": 64,
                "pattern": "^[a-z]+$"
            })
        );
    }

    #[test]
    fn compiled_schema_validates_rows() {
        let validator = jsonschema::validator_for(&document_schema(&columns())).unwrap();

        let good = json!([{ "name": "token", "in": null, "required": true }]);
        assert!(validator.is_valid(&good));

        let blank_name = json!([{ "name": "", "in": "query", "required": false }]);
        let errors: Vec<String> = validator
            .iter_errors(&blank_name)
            .map(|err| err.instance_path.to_string())
            .collect();
        assert_eq!(errors, ["/0/name"]);

        let cleared_required = json!([{ "name": "token", "in": "query", "required": null }]);
        let errors: Vec<String> = validator
            .iter_errors(&cleared_required)
            .map(|err| err.instance_path.to_string())
            .collect();
        assert_eq!(errors, ["/0/required"]);
    }
}
