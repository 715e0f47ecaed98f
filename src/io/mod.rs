mod format;
mod input;
mod output;

pub use format::DocumentFormat;
pub use input::parse_document_str;
pub(crate) use input::seed_entries;
pub(crate) use output::rows_payload;
pub use output::{OutputDestination, OutputOptions, emit};
