//! Key resolution for both input styles.

#![allow(missing_docs)]

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::model::{Action, InputStyle};

/// What a key press means for the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyResolution {
    Action(Action),
    /// Append to the input line.
    Insert(char),
    Backspace,
    /// Submit the input line as a command.
    Submit,
    Ignore,
}

/// Resolve a key event. Ctrl-C, Ctrl-Q and Esc quit in every style.
#[must_use]
pub fn resolve_key(key: &KeyEvent, style: InputStyle) -> KeyResolution {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => return KeyResolution::Action(Action::Quit),
        KeyCode::Char('c' | 'q') if ctrl => return KeyResolution::Action(Action::Quit),
        _ => {}
    }
    if ctrl || key.modifiers.contains(KeyModifiers::ALT) {
        return KeyResolution::Ignore;
    }

    match style {
        InputStyle::Hotkeys => match key.code {
            KeyCode::Char(c) => hotkey(c).map_or(KeyResolution::Ignore, KeyResolution::Action),
            _ => KeyResolution::Ignore,
        },
        InputStyle::Prompt => match key.code {
            KeyCode::Char(c) => KeyResolution::Insert(c),
            KeyCode::Backspace => KeyResolution::Backspace,
            KeyCode::Enter => KeyResolution::Submit,
            _ => KeyResolution::Ignore,
        },
    }
}

fn hotkey(c: char) -> Option<Action> {
    match c {
        'q' => Some(Action::Quit),
        'c' => Some(Action::Clear),
        's' => Some(Action::Save),
        'g' => Some(Action::Generate),
        _ => None,
    }
}

/// Parse a typed command. Case-insensitive, surrounding whitespace ignored.
#[must_use]
pub fn parse_command(input: &str) -> Option<Action> {
    match input.trim().to_lowercase().as_str() {
        "q" | "quit" => Some(Action::Quit),
        "c" | "clear" => Some(Action::Clear),
        "s" | "save" => Some(Action::Save),
        "g" | "generate" => Some(Action::Generate),
        _ => None,
    }
}
