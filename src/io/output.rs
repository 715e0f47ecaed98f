use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;

use super::DocumentFormat;

/// Where the saved rows document goes.
#[derive(Debug, Clone)]
pub enum OutputDestination {
    Stdout,
    File(PathBuf),
}

impl OutputDestination {
    pub fn file(path: impl AsRef<Path>) -> Self {
        OutputDestination::File(path.as_ref().to_path_buf())
    }

    fn write(&self, payload: &str) -> Result<()> {
        match self {
            OutputDestination::Stdout => {
                let mut stdout = io::stdout();
                stdout.write_all(payload.as_bytes())?;
                stdout.write_all(b"\n")?;
                stdout.flush()?;
            }
            OutputDestination::File(path) => {
                let mut file = File::create(path)?;
                file.write_all(payload.as_bytes())?;
                file.write_all(b"\n")?;
                file.flush()?;
            }
        }
        Ok(())
    }
}

/// How the rows document is serialized once the table is saved. With no
/// destinations, saving still validates but writes nothing.
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: DocumentFormat,
    pub pretty: bool,
    pub destinations: Vec<OutputDestination>,
}

impl OutputOptions {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            pretty: true,
            destinations: vec![OutputDestination::Stdout],
        }
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn with_destinations(mut self, destinations: Vec<OutputDestination>) -> Self {
        self.destinations = destinations;
        self
    }

    pub fn add_destination(mut self, destination: OutputDestination) -> Self {
        self.destinations.push(destination);
        self
    }
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self::new(DocumentFormat::Json)
    }
}

/// Serialize the document once and write it to every destination.
pub fn emit(value: &Value, options: &OutputOptions) -> Result<()> {
    if options.destinations.is_empty() {
        return Ok(());
    }
    let payload = serialize(value, options)?;
    for destination in &options.destinations {
        destination.write(&payload).with_context(|| match destination {
            OutputDestination::Stdout => "failed to write to stdout".to_string(),
            OutputDestination::File(path) => format!("failed to write {}", path.display()),
        })?;
    }
    Ok(())
}

/// Shape the saved rows for one serialization format. TOML has no
/// top-level arrays and no null, so the rows move under the table name
/// and cleared cells are dropped. Every other format takes the bare
/// array unchanged.
#[cfg(feature = "toml")]
pub(crate) fn rows_payload(table: &str, rows: &Value, format: DocumentFormat) -> Value {
    if format != DocumentFormat::Toml {
        return rows.clone();
    }
    let entries = rows
        .as_array()
        .into_iter()
        .flatten()
        .map(row_without_nulls)
        .collect();
    let mut document = serde_json::Map::new();
    document.insert(table.to_string(), Value::Array(entries));
    Value::Object(document)
}

#[cfg(not(feature = "toml"))]
pub(crate) fn rows_payload(_table: &str, rows: &Value, _format: DocumentFormat) -> Value {
    rows.clone()
}

#[cfg(feature = "toml")]
fn row_without_nulls(entry: &Value) -> Value {
    match entry {
        Value::Object(cells) => Value::Object(
            cells
                .iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(field, value)| (field.clone(), value.clone()))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn serialize(value: &Value, options: &OutputOptions) -> Result<String> {
    match options.format {
        DocumentFormat::Json => {
            if options.pretty {
                serde_json::to_string_pretty(value).context("failed to serialize JSON")
            } else {
                serde_json::to_string(value).context("failed to serialize JSON")
            }
        }
        #[cfg(feature = "yaml")]
        DocumentFormat::Yaml => serde_yaml::to_string(value).context("failed to serialize YAML"),
        #[cfg(feature = "toml")]
        DocumentFormat::Toml => {
            if options.pretty {
                toml::to_string_pretty(value).context("failed to serialize TOML")
            } else {
                toml::to_string(value).context("failed to serialize TOML")
            }
        }
    }
}
