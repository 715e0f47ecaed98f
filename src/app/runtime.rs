use anyhow::{Result, anyhow};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use jsonschema::Validator;
use serde_json::Value;

use crate::{
    form::TableState,
    presentation::{self, UiContext},
};

use super::{
    input::{self, KeyCommand},
    options::UiOptions,
    popup::PopupState,
    status::StatusLine,
    terminal::TerminalGuard,
    validation::{ValidationOutcome, validate_table},
};

const HELP_TEXT: &str = "Tab/Shift+Tab cell • ↑/↓ row • Enter choose/remove • \
     Ctrl+N add row • Ctrl+D remove row • Ctrl+S save • Ctrl+Q quit";

pub(crate) struct App {
    state: TableState,
    validator: Validator,
    options: UiOptions,
    status: StatusLine,
    popup: Option<PopupState>,
    document_errors: Vec<String>,
    issue_count: usize,
    exit_armed: bool,
    should_quit: bool,
    saved: Option<Value>,
}

impl App {
    pub fn new(state: TableState, validator: Validator, options: UiOptions) -> Self {
        Self {
            state,
            validator,
            options,
            status: StatusLine::new(),
            popup: None,
            document_errors: Vec::new(),
            issue_count: 0,
            exit_armed: false,
            should_quit: false,
            saved: None,
        }
    }

    pub fn run(&mut self) -> Result<Value> {
        let mut terminal = TerminalGuard::new()?;
        while !self.should_quit {
            terminal.draw(|frame| self.draw(frame))?;
            if event::poll(self.options.tick_rate)?
                && let Event::Key(key) = event::read()?
            {
                self.handle_key(key);
            }
        }
        self.saved
            .take()
            .ok_or_else(|| anyhow!("exited without saving"))
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let help = if self.options.show_help {
            Some(HELP_TEXT)
        } else {
            None
        };
        let dirty = self.state.is_dirty();

        presentation::draw(
            frame,
            UiContext {
                state: &mut self.state,
                status_message: self.status.message(),
                dirty,
                error_count: self.issue_count,
                help,
                global_errors: &self.document_errors,
                popup: self.popup.as_ref().map(|popup| popup.as_render()),
            },
        );
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        if self.handle_popup_key(&key) {
            return;
        }

        match input::classify(&key) {
            KeyCommand::Save => {
                self.exit_armed = false;
                self.on_save();
            }
            KeyCommand::Quit => self.on_exit(),
            KeyCommand::AddRow => self.on_add_row(),
            KeyCommand::RemoveRow => {
                let (row, _) = self.state.focus();
                self.remove_row_at(row);
            }
            KeyCommand::NextCell => {
                self.state.focus_next_cell();
                self.exit_armed = false;
            }
            KeyCommand::PrevCell => {
                self.state.focus_prev_cell();
                self.exit_armed = false;
            }
            KeyCommand::RowDown => {
                self.state.focus_row_delta(1);
                self.exit_armed = false;
            }
            KeyCommand::RowUp => {
                self.state.focus_row_delta(-1);
                self.exit_armed = false;
            }
            KeyCommand::ResetStatus => {
                self.exit_armed = false;
                self.status.ready();
            }
            KeyCommand::Activate => self.on_activate(),
            KeyCommand::Edit(key) => self.on_edit(&key),
            KeyCommand::None => {}
        }
    }

    fn handle_popup_key(&mut self, key: &KeyEvent) -> bool {
        let Some(popup) = &mut self.popup else {
            return false;
        };
        match key.code {
            KeyCode::Esc => {
                self.popup = None;
                self.status.ready();
            }
            KeyCode::Up => popup.select_previous(),
            KeyCode::Down => popup.select_next(),
            KeyCode::Enter => {
                let selection = popup.selection();
                self.popup = None;
                if self.state.apply_option(selection) {
                    if self.options.auto_validate {
                        self.validate_current(false);
                    }
                    self.status.picked();
                } else {
                    self.status.ready();
                }
            }
            _ => {}
        }
        true
    }

    /// Enter on an action cell removes its row; on a select cell it opens
    /// the chooser. Text cells ignore it.
    fn on_activate(&mut self) {
        self.exit_armed = false;
        let Some(column) = self.state.focused_column() else {
            return;
        };
        if column.kind.is_action() {
            let (row, _) = self.state.focus();
            self.remove_row_at(row);
            return;
        }
        self.try_open_popup();
    }

    fn try_open_popup(&mut self) -> bool {
        if self.popup.is_some() {
            return true;
        }
        if self.state.is_focus_disabled() {
            return false;
        }
        let Some(column) = self.state.focused_column() else {
            return false;
        };
        if let Some(popup) = PopupState::from_column(column, self.state.focused_value()) {
            self.popup = Some(popup);
            self.status.show("Use ↑/↓ and Enter to choose");
            return true;
        }
        false
    }

    fn on_edit(&mut self, key: &KeyEvent) {
        if self.state.handle_key(key) {
            self.exit_armed = false;
            if let Some(column) = self.state.focused_column() {
                self.status.editing(&column.header);
            }
            if self.options.auto_validate {
                self.validate_current(false);
            }
        }
    }

    /// A fresh row is not validated until it is edited or saved, so it
    /// does not arrive covered in errors.
    fn on_add_row(&mut self) {
        self.exit_armed = false;
        self.state.add_row();
        self.status.row_added(self.state.row_count());
    }

    fn remove_row_at(&mut self, row: usize) {
        self.exit_armed = false;
        if self.state.remove_row(row) {
            self.status.row_removed(self.state.row_count());
            self.issue_count = self.state.error_count() + self.document_errors.len();
        }
    }

    fn on_save(&mut self) {
        if let Some(value) = self.validate_current(true) {
            self.status.show("Rows saved");
            self.saved = Some(value);
            self.should_quit = true;
        }
    }

    fn on_exit(&mut self) {
        if self.options.confirm_exit && self.state.is_dirty() && !self.exit_armed {
            self.exit_armed = true;
            self.status.pending_exit();
            return;
        }
        self.should_quit = true;
        self.saved = None;
    }

    fn validate_current(&mut self, announce: bool) -> Option<Value> {
        match validate_table(&mut self.state, &self.validator) {
            ValidationOutcome::Valid(value) => {
                self.document_errors.clear();
                self.issue_count = 0;
                Some(value)
            }
            ValidationOutcome::Invalid {
                issues,
                global_errors,
            } => {
                self.document_errors = global_errors;
                self.issue_count = issues;
                if announce {
                    self.status.issues(issues);
                }
                None
            }
        }
    }
}
