#![deny(rust_2018_idioms)]

mod app;
mod domain;
mod form;
mod io;
mod presentation;

pub use app::{TableUI, UiOptions};
pub use domain::{
    BOOLEAN_FIELD, CellValue, Column, ColumnKind, DisabledPredicate, RowValues, SelectOption,
    TableSchema, ValidationRules, parse_table_schema,
};
pub use form::{ErrorTree, REQUIRED_MESSAGE, RowArray, RowFactory, RowId, RowRecord, TableState};
pub use io::{DocumentFormat, OutputDestination, OutputOptions, emit, parse_document_str};
