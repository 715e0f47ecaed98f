use crate::{
    domain::{CellValue, Column},
    form::cell,
    presentation::PopupRender,
};

/// State of the option chooser opened over a select cell. The selection
/// is applied back through [`TableState::apply_option`] on Enter.
///
/// [`TableState::apply_option`]: crate::form::TableState::apply_option
pub(crate) struct PopupState {
    title: String,
    options: Vec<String>,
    selected: usize,
}

impl PopupState {
    /// Chooser for `column`, preselecting `current`. `None` for non-select
    /// columns and for selects without options.
    pub(crate) fn from_column(column: &Column, current: &CellValue) -> Option<Self> {
        if column.options().is_empty() {
            return None;
        }
        let options = column
            .options()
            .iter()
            .map(|option| option.label.clone())
            .collect();
        let selected = cell::selected_option_index(column, current).unwrap_or(0);
        Some(Self {
            title: column.header.clone(),
            options,
            selected,
        })
    }

    pub(crate) fn select_previous(&mut self) {
        if self.options.is_empty() {
            return;
        }
        if self.selected == 0 {
            self.selected = self.options.len().saturating_sub(1);
        } else {
            self.selected -= 1;
        }
    }

    pub(crate) fn select_next(&mut self) {
        if self.options.is_empty() {
            return;
        }
        self.selected = (self.selected + 1) % self.options.len();
    }

    pub(crate) fn selection(&self) -> usize {
        self.selected
    }

    pub(crate) fn as_render(&self) -> PopupRender<'_> {
        PopupRender {
            title: &self.title,
            options: &self.options,
            selected: self.selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SelectOption;

    #[test]
    fn chooser_preselects_the_current_value() {
        let column = Column::select(
            "role",
            vec![SelectOption::plain("dev"), SelectOption::plain("ops")],
        );
        let popup = PopupState::from_column(&column, &CellValue::text("ops"));
        let popup = popup.unwrap();
        assert_eq!(popup.selection(), 1);

        let fresh = PopupState::from_column(&column, &CellValue::Null).unwrap();
        assert_eq!(fresh.selection(), 0);
    }

    #[test]
    fn selection_wraps_both_ways() {
        let column = Column::boolean("required");
        let mut popup = PopupState::from_column(&column, &CellValue::Bool(true)).unwrap();
        assert_eq!(popup.selection(), 0);
        popup.select_previous();
        assert_eq!(popup.selection(), 1);
        popup.select_next();
        assert_eq!(popup.selection(), 0);
    }

    #[test]
    fn text_columns_never_open_a_chooser() {
        let column = Column::text("name");
        assert!(PopupState::from_column(&column, &CellValue::Null).is_none());
    }
}
