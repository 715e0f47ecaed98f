use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy)]
pub enum KeyCommand {
    Save,
    Quit,
    AddRow,
    RemoveRow,
    NextCell,
    PrevCell,
    RowUp,
    RowDown,
    ResetStatus,
    Activate,
    Edit(KeyEvent),
    None,
}

pub fn classify(key: &KeyEvent) -> KeyCommand {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('s') | KeyCode::Char('S') => KeyCommand::Save,
            KeyCode::Char('q') | KeyCode::Char('Q') => KeyCommand::Quit,
            KeyCode::Char('c') | KeyCode::Char('C') => KeyCommand::Quit,
            KeyCode::Char('n') | KeyCode::Char('N') => KeyCommand::AddRow,
            KeyCode::Char('d') | KeyCode::Char('D') => KeyCommand::RemoveRow,
            _ => KeyCommand::None,
        };
    }

    match key.code {
        KeyCode::Tab => KeyCommand::NextCell,
        KeyCode::BackTab => KeyCommand::PrevCell,
        KeyCode::Up => KeyCommand::RowUp,
        KeyCode::Down => KeyCommand::RowDown,
        KeyCode::Esc => KeyCommand::ResetStatus,
        KeyCode::Enter => KeyCommand::Activate,
        _ => KeyCommand::Edit(*key),
    }
}
