mod input;
mod options;
mod popup;
mod runtime;
mod status;
mod table_ui;
mod terminal;
mod validation;

pub use options::UiOptions;
pub use table_ui::TableUI;
