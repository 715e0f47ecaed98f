mod column;
mod parser;
mod rules;
mod value;

pub use column::{
    BOOLEAN_FIELD, Column, ColumnKind, DisabledPredicate, SelectOption, TableSchema,
    ValidationRules,
};
pub use parser::parse_table_schema;
pub use rules::document_schema;
pub use value::{CellValue, RowValues};
