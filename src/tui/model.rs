//! Elm-style state model for the terminal controller.
//!
//! All display state lives in [`ControllerModel`]. Terminal and timer events
//! arrive as [`ControllerMsg`] values; side-effects are described by
//! [`ControllerCmd`] values that the runtime executes.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::event::KeyEvent;

/// Interval between collector polls.
pub const DEFAULT_REFRESH: Duration = Duration::from_millis(100);

/// Maximum number of lines kept in the log pane.
pub const DEFAULT_LOG_CAPACITY: usize = 500;

// ──────────────────── configuration ────────────────────

/// How keystrokes become actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InputStyle {
    /// Commands are typed on the input line and submitted with Enter.
    #[default]
    Prompt,
    /// Single keys act immediately; the layout collapses to a status line
    /// and a bottom hint bar.
    Hotkeys,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub refresh: Duration,
    pub input_style: InputStyle,
    pub log_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            refresh: DEFAULT_REFRESH,
            input_style: InputStyle::default(),
            log_capacity: DEFAULT_LOG_CAPACITY,
        }
    }
}

// ──────────────────── state ────────────────────

/// Controller lifecycle. Only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    Running,
    Draining,
    Closed,
}

/// User-triggered operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Clear,
    Save,
    Generate,
    Quit,
}

/// Result of an executed action, rendered into the log pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Cleared,
    Saved(PathBuf),
    Generated(PathBuf),
    Failed(String),
}

impl ActionOutcome {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Cleared => "List cleared.".to_string(),
            Self::Saved(path) => {
                format!("IncludeList successfully saved to {}.", path.display())
            }
            Self::Generated(path) => format!(
                "Statically implemented assets have been generated in {}.",
                path.display()
            ),
            Self::Failed(err) => err.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Local wall-clock time, `HH:MM:SS`.
    pub stamp: String,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ControllerModel {
    pub config: ControllerConfig,
    pub phase: Phase,
    /// Oldest first, at most `config.log_capacity` lines.
    pub logs: VecDeque<LogLine>,
    /// Collector list length at the last refresh that saw a change.
    pub file_count: usize,
    /// Pending text on the input line (prompt style only).
    pub input: String,
    /// Terminal dimensions (columns, rows).
    pub terminal_size: (u16, u16),
    pub tick: u64,
    pub needs_redraw: bool,
}

impl ControllerModel {
    #[must_use]
    pub fn new(config: ControllerConfig, terminal_size: (u16, u16)) -> Self {
        Self {
            config,
            phase: Phase::Running,
            logs: VecDeque::new(),
            file_count: 0,
            input: String::new(),
            terminal_size,
            tick: 0,
            needs_redraw: true,
        }
    }

    /// Append a timestamped line, evicting the oldest past capacity.
    pub fn push_log(&mut self, text: impl Into<String>) {
        let stamp = chrono::Local::now().format("%H:%M:%S").to_string();
        self.logs.push_back(LogLine {
            stamp,
            text: text.into(),
        });
        let capacity = self.config.log_capacity.max(1);
        while self.logs.len() > capacity {
            self.logs.pop_front();
        }
        self.needs_redraw = true;
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }
}

// ──────────────────── messages ────────────────────

#[derive(Debug, Clone)]
pub enum ControllerMsg {
    /// Refresh timer fired.
    Tick,
    Key(KeyEvent),
    Resize { cols: u16, rows: u16 },
    /// The collector reported a change; this is its new list length.
    FilesCounted(usize),
    ActionFinished(ActionOutcome),
    /// Free-form line for the log pane.
    Log(String),
}

// ──────────────────── commands ────────────────────

/// Side-effects returned by `update` for the runtime to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerCmd {
    None,
    /// Ask the collector whether it changed and, if so, count its list.
    RefreshCount,
    Clear,
    Save,
    Generate,
    /// Leave the event loop.
    Quit,
}
