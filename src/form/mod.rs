pub(crate) mod cell;
mod disabled;
mod error;
mod rows;
mod state;

pub use error::{ErrorTree, REQUIRED_MESSAGE};
pub use rows::{RowArray, RowId, RowRecord};
pub use state::{RowFactory, TableState};
