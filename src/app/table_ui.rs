use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde_json::Value;

use crate::{
    domain::{CellValue, TableSchema, document_schema, parse_table_schema},
    form::{RowFactory, TableState},
    io::{self, OutputOptions, emit},
};

use super::{options::UiOptions, runtime::App};

/// Entry point: configure a table, run it, get the saved rows back.
///
/// ```no_run
/// use tableui::{Column, TableSchema, TableUI};
///
/// let schema = TableSchema::new(
///     "parameters",
///     vec![
///         Column::text("name").required(),
///         Column::boolean("required"),
///         Column::action("remove"),
///     ],
/// );
/// let rows = TableUI::new(schema).run()?;
/// assert!(rows.is_array());
/// # anyhow::Ok(())
/// ```
pub struct TableUI {
    schema: TableSchema,
    title: Option<String>,
    options: UiOptions,
    seed: Vec<Value>,
    factory: Option<RowFactory>,
    output: Option<OutputOptions>,
}

impl TableUI {
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            title: None,
            options: UiOptions::default(),
            seed: Vec::new(),
            factory: None,
            output: None,
        }
    }

    /// Build the table from a parsed column-config document.
    pub fn from_config(config: &Value) -> Result<Self> {
        Ok(Self::new(parse_table_schema(config)?))
    }

    /// Override the rendered table label.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_options(mut self, options: UiOptions) -> Self {
        self.options = options;
        self
    }

    /// Rows the table starts out with; they become the reset baseline.
    pub fn with_seed_rows(mut self, rows: Vec<Value>) -> Self {
        self.seed = rows;
        self
    }

    /// Seed from a whole decoded document: either a bare rows array, or an
    /// object carrying that array under the table name.
    pub fn with_seed_document(mut self, document: &Value) -> Result<Self> {
        self.seed = io::seed_entries(document, &self.schema.name)?;
        Ok(self)
    }

    /// Initial values for rows added interactively. Fields the factory
    /// leaves out start cleared.
    pub fn on_add_row(
        mut self,
        factory: impl Fn() -> IndexMap<String, CellValue> + Send + 'static,
    ) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// Also write the saved rows to these destinations after the run.
    pub fn with_output(mut self, output: OutputOptions) -> Self {
        self.output = Some(output);
        self
    }

    /// Compile the validator, run the interactive loop and return the
    /// saved rows array. Exiting without saving is an error.
    pub fn run(mut self) -> Result<Value> {
        let rows_schema = document_schema(&self.schema.columns);
        let validator =
            jsonschema::validator_for(&rows_schema).context("failed to compile the rows schema")?;

        if let Some(title) = self.title.take() {
            self.schema.label = title;
        }
        let table = self.schema.name.clone();
        let mut state = TableState::new(self.schema);
        if !self.seed.is_empty() {
            state.seed_rows(&self.seed);
        }
        if let Some(factory) = self.factory.take() {
            state.set_factory(factory);
        }

        let value = App::new(state, validator, self.options).run()?;
        if let Some(output) = &self.output {
            emit(&io::rows_payload(&table, &value, output.format), output)?;
        }
        Ok(value)
    }
}
