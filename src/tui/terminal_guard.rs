//! RAII terminal lifecycle guard backed by crossterm.
//!
//! [`TerminalGuard`] enters raw mode and the alternate screen on construction,
//! and restores the terminal on [`Drop`], including during panics and early
//! error returns. A panic hook restores the terminal *before* the previous
//! hook prints the panic message, so the backtrace lands on a normal screen.
//!
//! The hook is installed once per process and never removed: it only acts
//! while raw mode is active, and a host's own hook stays chained behind it.

use std::io;
use std::panic;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};

/// Set while raw mode is active. Checked by the panic hook and by `Drop` so
/// restoration runs once.
static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

static RESTORE_HOOK: OnceLock<()> = OnceLock::new();

pub struct TerminalGuard {
    _private: (),
}

impl TerminalGuard {
    /// Enter raw mode and the alternate screen, installing a panic-safe
    /// cleanup hook.
    ///
    /// # Errors
    /// Returns I/O errors if terminal setup fails. Raw mode is undone when
    /// the alternate screen cannot be entered.
    pub fn new() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);
        if let Err(err) = execute!(io::stdout(), EnterAlternateScreen) {
            restore_terminal_best_effort();
            return Err(err);
        }

        install_restore_hook();
        Ok(Self { _private: () })
    }

    /// Terminal dimensions (columns, rows), falling back to 80x24 when no
    /// terminal is attached.
    #[must_use]
    pub fn terminal_size() -> (u16, u16) {
        terminal::size()
            .ok()
            .filter(|&(cols, rows)| cols > 0 && rows > 0)
            .unwrap_or((80, 24))
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

/// Chain the terminal-restoring hook in front of the current panic hook.
/// Only the first call has an effect.
fn install_restore_hook() {
    RESTORE_HOOK.get_or_init(|| {
        let prev = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            restore_terminal_best_effort();
            prev(info);
        }));
    });
}

/// Leave the alternate screen, show the cursor and disable raw mode.
/// Idempotent.
fn restore_terminal_best_effort() {
    if RAW_MODE_ACTIVE.swap(false, Ordering::SeqCst) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = terminal::disable_raw_mode();
    }
}

// ──────────────────── tests ────────────────────
