use std::time::Duration;

/// Runtime knobs for the interactive table.
#[derive(Debug, Clone)]
pub struct UiOptions {
    /// How long the event loop waits for input before redrawing.
    pub tick_rate: Duration,
    /// Re-validate after every edit instead of only on save.
    pub auto_validate: bool,
    /// Require a second Ctrl+Q when there are unsaved edits.
    pub confirm_exit: bool,
    /// Show the key hints line in the footer.
    pub show_help: bool,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            tick_rate: Duration::from_millis(250),
            auto_validate: true,
            confirm_exit: true,
            show_help: true,
        }
    }
}

impl UiOptions {
    pub fn with_tick_rate(mut self, tick_rate: Duration) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    pub fn with_auto_validate(mut self, enabled: bool) -> Self {
        self.auto_validate = enabled;
        self
    }

    pub fn with_confirm_exit(mut self, confirm: bool) -> Self {
        self.confirm_exit = confirm;
        self
    }

    pub fn with_help(mut self, show: bool) -> Self {
        self.show_help = show;
        self
    }
}
