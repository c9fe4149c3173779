//! Pure update function for the terminal controller.
//!
//! `update()` takes the current model and a message, mutates the model, and
//! returns a command describing any side-effect the runtime should execute.

use super::input::{KeyResolution, parse_command, resolve_key};
use super::model::{Action, ControllerCmd, ControllerModel, ControllerMsg, Phase};

/// Apply a message to the model and return the next command for the runtime.
///
/// Once the controller leaves `Running` every message is ignored.
pub fn update(model: &mut ControllerModel, msg: ControllerMsg) -> ControllerCmd {
    if !model.is_running() {
        return ControllerCmd::None;
    }
    match msg {
        ControllerMsg::Tick => {
            model.tick = model.tick.wrapping_add(1);
            ControllerCmd::RefreshCount
        }

        ControllerMsg::FilesCounted(count) => {
            model.file_count = count;
            model.needs_redraw = true;
            ControllerCmd::None
        }

        ControllerMsg::Key(key) => match resolve_key(&key, model.config.input_style) {
            KeyResolution::Action(action) => start_action(model, action),
            KeyResolution::Insert(c) => {
                model.input.push(c);
                model.needs_redraw = true;
                ControllerCmd::None
            }
            KeyResolution::Backspace => {
                model.input.pop();
                model.needs_redraw = true;
                ControllerCmd::None
            }
            KeyResolution::Submit => submit(model),
            KeyResolution::Ignore => ControllerCmd::None,
        },

        ControllerMsg::Resize { cols, rows } => {
            model.terminal_size = (cols, rows);
            model.needs_redraw = true;
            ControllerCmd::None
        }

        ControllerMsg::ActionFinished(outcome) => {
            model.push_log(outcome.message());
            ControllerCmd::None
        }

        ControllerMsg::Log(text) => {
            model.push_log(text);
            ControllerCmd::None
        }
    }
}

fn submit(model: &mut ControllerModel) -> ControllerCmd {
    let line = std::mem::take(&mut model.input);
    model.needs_redraw = true;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return ControllerCmd::None;
    }
    if let Some(action) = parse_command(trimmed) {
        start_action(model, action)
    } else {
        model.push_log(format!("Unknown command: {trimmed}"));
        ControllerCmd::None
    }
}

fn start_action(model: &mut ControllerModel, action: Action) -> ControllerCmd {
    match action {
        Action::Quit => {
            model.phase = Phase::Draining;
            ControllerCmd::Quit
        }
        Action::Clear => ControllerCmd::Clear,
        Action::Save => ControllerCmd::Save,
        Action::Generate => ControllerCmd::Generate,
    }
}
