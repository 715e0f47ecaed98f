/// One-line hint kept under the table. Updated on every interaction so the
/// footer always reflects the outcome of the last key press.
#[derive(Debug, Clone)]
pub struct StatusLine {
    text: String,
}

pub const READY_STATUS: &str = "Ready. Ctrl+S saves, Ctrl+N adds a row.";

impl Default for StatusLine {
    fn default() -> Self {
        StatusLine {
            text: READY_STATUS.into(),
        }
    }
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&self) -> &str {
        &self.text
    }

    pub fn show(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn ready(&mut self) {
        self.show(READY_STATUS);
    }

    pub fn editing(&mut self, label: &str) {
        self.show(format!("Editing {label}"));
    }

    pub fn picked(&mut self) {
        self.show("Value updated");
    }

    pub fn row_added(&mut self, total: usize) {
        self.show(format!("Row added ({total} total)"));
    }

    pub fn row_removed(&mut self, remaining: usize) {
        self.show(format!("Row removed ({remaining} left)"));
    }

    pub fn issues(&mut self, count: usize) {
        self.show(format!("Save blocked: {count} issue(s) to fix"));
    }

    pub fn pending_exit(&mut self) {
        self.show("Unsaved rows. Ctrl+Q again quits without saving.");
    }
}
