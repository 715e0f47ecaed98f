mod footer;
mod layout;
mod popup;
mod table;

pub use footer::{error_report, render_error_list, render_footer};
pub use popup::render_popup;
pub use table::render_table;
