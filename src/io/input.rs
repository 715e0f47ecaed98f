use anyhow::{Context, Result, bail};
use serde_json::Value;

use super::DocumentFormat;

/// Parse a table config or seed document in any supported format.
pub fn parse_document_str(contents: &str, format: DocumentFormat) -> Result<Value> {
    match format {
        DocumentFormat::Json => {
            serde_json::from_str::<Value>(contents).context("failed to parse JSON document")
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => {
            serde_yaml::from_str::<Value>(contents).context("failed to parse YAML document")
        }
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => contents
            .parse::<toml::Value>()
            .context("failed to parse TOML document")
            .and_then(|value| {
                serde_json::to_value(value).context("failed to convert TOML to JSON")
            }),
    }
}

/// Pull the seed rows out of a decoded document: either the bare rows
/// array, or an object carrying that array under the table name.
pub fn seed_entries(document: &Value, table: &str) -> Result<Vec<Value>> {
    match document {
        Value::Array(entries) => Ok(entries.clone()),
        Value::Object(map) => match map.get(table) {
            Some(Value::Array(entries)) => Ok(entries.clone()),
            Some(_) => bail!("'{table}' in the seed document is not an array"),
            None => bail!("seed document has no '{table}' entry"),
        },
        _ => bail!("seed document must be an array or an object"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_json_documents() {
        let raw = r#"{"parameters":[{"name":"token"}]}"#;
        let parsed = parse_document_str(raw, DocumentFormat::Json).unwrap();
        assert_eq!(parsed["parameters"][0]["name"], json!("token"));
    }

    #[cfg(feature = "yaml")]
    #[test]
    fn parses_yaml_documents() {
        let raw = "parameters:\n  - name: token\n    required: true";
        let parsed = parse_document_str(raw, DocumentFormat::Yaml).unwrap();
        assert_eq!(parsed["parameters"][0]["required"], json!(true));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn parses_toml_documents() {
        let raw = "[[parameters]]\nname = \"token\"";
        let parsed = parse_document_str(raw, DocumentFormat::Toml).unwrap();
        assert_eq!(parsed["parameters"][0]["name"], json!("token"));
    }

    #[test]
    fn bad_json_reports_the_format() {
        let err = parse_document_str("{", DocumentFormat::Json).unwrap_err();
        assert!(err.to_string().contains("JSON"));
    }

    #[test]
    fn seed_entries_accepts_bare_arrays() {
        let document = json!([{ "name": "a" }]);
        let entries = seed_entries(&document, "parameters").unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn seed_entries_unwraps_the_table_key() {
        let document = json!({ "parameters": [{ "name": "a" }, { "name": "b" }] });
        let entries = seed_entries(&document, "parameters").unwrap();
        assert_eq!(entries.len(), 2);
    }

    #[test]
    fn seed_entries_rejects_other_shapes() {
        assert!(seed_entries(&json!("rows"), "parameters").is_err());
        assert!(seed_entries(&json!({ "other": [] }), "parameters").is_err());
        assert!(seed_entries(&json!({ "parameters": 1 }), "parameters").is_err());
    }
}
