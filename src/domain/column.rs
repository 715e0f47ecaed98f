use std::fmt;
use std::sync::Arc;

use crate::domain::value::{CellValue, RowValues};

/// Field name whose select column stores booleans on the wire. Configs may
/// leave its options out entirely; the defaults are Yes/No over
/// `"true"` / `"false"`.
pub const BOOLEAN_FIELD: &str = "required";

/// One entry of a select column's dropdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Value stored in the row when this entry is picked.
    pub value: String,
    /// Text shown in the table and in the chooser popup.
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    /// Option whose label is its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

/// Declarative validation attached to a column.
///
/// These compile into the document schema handed to the validation engine;
/// the table itself never interprets them directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationRules {
    pub required: bool,
    pub min_length: Option<u64>,
    pub max_length: Option<u64>,
    pub pattern: Option<String>,
}

impl ValidationRules {
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }
}

/// What kind of cell a column renders. Closed set: rendering and editing
/// dispatch over this, so every variant has exactly one editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnKind {
    /// Free text, edited in place.
    Text,
    /// Single choice out of a fixed option list.
    Select {
        options: Vec<SelectOption>,
        /// Store the picked value as `CellValue::Bool` instead of text.
        /// Option values must then be `"true"` / `"false"`.
        boolean: bool,
    },
    /// Per-row remove button; holds no value and is never validated.
    Action,
}

impl ColumnKind {
    pub fn is_action(&self) -> bool {
        matches!(self, ColumnKind::Action)
    }

    pub fn is_select(&self) -> bool {
        matches!(self, ColumnKind::Select { .. })
    }
}

/// Decides whether a column's cell is disabled for a given row.
///
/// Predicates read other columns of the same row through [`RowValues`].
/// They must not depend on their own column, and no two columns may depend
/// on each other through their predicates; reconciliation assumes the
/// dependency graph between columns is acyclic.
#[derive(Clone)]
pub struct DisabledPredicate {
    func: Arc<dyn Fn(RowValues<'_>) -> bool + Send + Sync>,
}

impl DisabledPredicate {
    pub fn new(func: impl Fn(RowValues<'_>) -> bool + Send + Sync + 'static) -> Self {
        Self {
            func: Arc::new(func),
        }
    }

    /// Disabled while `field` holds exactly `value`. Boolean cells compare
    /// through their wire form, so `"true"` matches a stored `true`.
    pub fn when_equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        let field = field.into();
        let value = value.into();
        Self::new(move |row| match row.get(&field) {
            CellValue::Text(text) => *text == value,
            CellValue::Bool(flag) => value == if *flag { "true" } else { "false" },
            CellValue::Null => false,
        })
    }

    /// Disabled while `field` is null or blank.
    pub fn when_empty(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(move |row| row.is_blank(&field))
    }

    pub fn evaluate(&self, row: RowValues<'_>) -> bool {
        (self.func)(row)
    }
}

impl fmt::Debug for DisabledPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DisabledPredicate(..)")
    }
}

/// One column of the table: field name, header, cell kind, validation and
/// an optional disabled predicate.
#[derive(Debug, Clone)]
pub struct Column {
    /// Key under which this column's value is stored in each row.
    pub field: String,
    /// Header caption; defaults to the field name.
    pub header: String,
    pub kind: ColumnKind,
    pub rules: ValidationRules,
    pub disabled: Option<DisabledPredicate>,
}

impl Column {
    fn new(field: impl Into<String>, kind: ColumnKind) -> Self {
        let field = field.into();
        Self {
            header: field.clone(),
            field,
            kind,
            rules: ValidationRules::default(),
            disabled: None,
        }
    }

    pub fn text(field: impl Into<String>) -> Self {
        Self::new(field, ColumnKind::Text)
    }

    pub fn select(field: impl Into<String>, options: Vec<SelectOption>) -> Self {
        Self::new(
            field,
            ColumnKind::Select {
                options,
                boolean: false,
            },
        )
    }

    /// Yes/no select stored as a boolean. The wire options are fixed to
    /// `"true"` / `"false"`.
    pub fn boolean(field: impl Into<String>) -> Self {
        Self::new(
            field,
            ColumnKind::Select {
                options: vec![
                    SelectOption::new("true", "Yes"),
                    SelectOption::new("false", "No"),
                ],
                boolean: true,
            },
        )
    }

    pub fn action(field: impl Into<String>) -> Self {
        Self::new(field, ColumnKind::Action)
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = header.into();
        self
    }

    pub fn rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn required(mut self) -> Self {
        self.rules.required = true;
        self
    }

    pub fn disabled_when(mut self, predicate: DisabledPredicate) -> Self {
        self.disabled = Some(predicate);
        self
    }

    /// Header caption with the required marker appended.
    pub fn header_label(&self) -> String {
        if self.rules.required && !self.kind.is_action() {
            format!("{} *", self.header)
        } else {
            self.header.clone()
        }
    }

    /// Hint shown in an empty cell.
    pub fn placeholder(&self) -> String {
        match &self.kind {
            ColumnKind::Text => format!("Enter {}", self.field.to_lowercase()),
            ColumnKind::Select { .. } => format!("Select {}", self.field),
            ColumnKind::Action => String::new(),
        }
    }

    /// Options of a select column; empty for the other kinds.
    pub fn options(&self) -> &[SelectOption] {
        match &self.kind {
            ColumnKind::Select { options, .. } => options,
            _ => &[],
        }
    }

    /// Whether picks of this column are stored as booleans.
    pub fn is_boolean(&self) -> bool {
        matches!(&self.kind, ColumnKind::Select { boolean: true, .. })
    }

    /// Label for a stored value, looked up in the option list. Falls back
    /// to the raw text for values no option covers.
    pub fn option_label(&self, value: &str) -> String {
        self.options()
            .iter()
            .find(|option| option.value == value)
            .map(|option| option.label.clone())
            .unwrap_or_else(|| value.to_string())
    }
}

/// Column-configured table definition: what the binder renders and edits.
#[derive(Debug, Clone)]
pub struct TableSchema {
    /// Key of the row list inside the emitted document.
    pub name: String,
    /// Title shown above the table; defaults to the name.
    pub label: String,
    /// Caption of the add-row control.
    pub add_row_text: String,
    pub columns: Vec<Column>,
}

impl TableSchema {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Self {
        let name = name.into();
        Self {
            label: name.clone(),
            name,
            add_row_text: "Add row".to_string(),
            columns,
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn add_row_text(mut self, text: impl Into<String>) -> Self {
        self.add_row_text = text.into();
        self
    }

    pub fn column(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.field == field)
    }

    /// Columns that carry a value, in table order.
    pub fn value_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|column| !column.kind.is_action())
    }
}
