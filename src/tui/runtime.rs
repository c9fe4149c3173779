//! Event loop for the terminal controller.
//!
//! One loop thread owns the terminal and the model and consumes a single
//! message queue. A ticker thread posts `Tick` every refresh interval and an
//! input thread posts terminal events; only the loop thread draws. Quitting
//! drops the cancel sender, which both helper threads observe within one
//! poll interval, and the loop joins them before restoring the terminal.

#![allow(missing_docs)]

use std::collections::VecDeque;
use std::io::{self, Write};
use std::sync::Weak;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError, bounded, unbounded};
use crossterm::event::{self, Event, KeyEventKind};

use super::model::{
    ActionOutcome, ControllerCmd, ControllerConfig, ControllerModel, ControllerMsg, Phase,
};
use super::render;
use super::terminal_guard::TerminalGuard;
use super::update::update;
use crate::collector::CollectorHandle;
use crate::core::errors::{Result, SpaError};
use crate::fs::filter_dir::SessionActions;

const INPUT_POLL: Duration = Duration::from_millis(50);

/// Run the controller until the user quits.
///
/// # Errors
/// `SpaError::TerminalInit` when the terminal cannot be taken over, and
/// `SpaError::Runtime` when a helper thread cannot be spawned.
pub fn run_controller(
    collector: &CollectorHandle,
    actions: &Weak<dyn SessionActions>,
    config: ControllerConfig,
) -> Result<()> {
    let guard = TerminalGuard::new().map_err(|e| SpaError::TerminalInit {
        details: e.to_string(),
    })?;
    let mut model = ControllerModel::new(config, TerminalGuard::terminal_size());

    let (msg_tx, msg_rx) = unbounded::<ControllerMsg>();
    let (cancel_tx, cancel_rx) = bounded::<()>(0);
    let ticker = spawn_helper("spa-assets-tick", {
        let tx = msg_tx.clone();
        let cancel = cancel_rx.clone();
        let refresh = model.config.refresh;
        move || ticker_main(&tx, &cancel, refresh)
    })?;
    let input = spawn_helper("spa-assets-input", {
        let tx = msg_tx;
        let cancel = cancel_rx;
        move || input_main(&tx, &cancel, poll_terminal)
    })?;

    event_loop(&mut io::stdout(), &mut model, &msg_rx, collector, actions);

    shut_down(
        &mut model,
        cancel_tx,
        [("ticker", ticker), ("input", input)],
        || drop(guard),
    );
    Ok(())
}

/// Stop and join the helper threads, then restore the terminal. Moves the
/// model through `Draining` to `Closed`.
fn shut_down<const N: usize>(
    model: &mut ControllerModel,
    cancel: Sender<()>,
    helpers: [(&str, JoinHandle<()>); N],
    restore: impl FnOnce(),
) {
    model.phase = Phase::Draining;
    drop(cancel);
    for (name, join) in helpers {
        if join.join().is_err() {
            tracing::warn!(thread = name, "controller helper thread panicked");
        }
    }
    restore();
    model.phase = Phase::Closed;
    tracing::debug!("terminal controller closed");
}

/// Process messages until the model leaves `Running` or every sender is gone.
/// Only this function draws.
pub fn event_loop<W: Write>(
    out: &mut W,
    model: &mut ControllerModel,
    msgs: &Receiver<ControllerMsg>,
    collector: &CollectorHandle,
    actions: &Weak<dyn SessionActions>,
) {
    redraw(out, model);
    while model.is_running() {
        let Ok(msg) = msgs.recv() else {
            break;
        };
        let mut pending = VecDeque::from([msg]);
        while let Some(msg) = pending.pop_front() {
            let cmd = update(model, msg);
            pending.extend(execute(cmd, collector, actions));
        }
        if model.needs_redraw {
            redraw(out, model);
        }
    }
}

/// Execute a command and return the follow-up message, if any.
///
/// Save and generate run synchronously so they finish before the loop can
/// observe a later quit.
pub fn execute(
    cmd: ControllerCmd,
    collector: &CollectorHandle,
    actions: &Weak<dyn SessionActions>,
) -> Option<ControllerMsg> {
    match cmd {
        ControllerCmd::None | ControllerCmd::Quit => None,
        ControllerCmd::RefreshCount => collector
            .changed()
            .then(|| ControllerMsg::FilesCounted(collector.list().len())),
        ControllerCmd::Clear => {
            collector.clear();
            Some(ControllerMsg::ActionFinished(ActionOutcome::Cleared))
        }
        ControllerCmd::Save => Some(ControllerMsg::ActionFinished(run_action(
            collector,
            actions,
            |a, list| a.save(list).map(ActionOutcome::Saved),
        ))),
        ControllerCmd::Generate => Some(ControllerMsg::ActionFinished(run_action(
            collector,
            actions,
            |a, list| a.generate(list).map(ActionOutcome::Generated),
        ))),
    }
}

fn run_action<F>(
    collector: &CollectorHandle,
    actions: &Weak<dyn SessionActions>,
    action: F,
) -> ActionOutcome
where
    F: FnOnce(&dyn SessionActions, &[String]) -> Result<ActionOutcome>,
{
    let Some(actions) = actions.upgrade() else {
        return ActionOutcome::Failed(
            SpaError::ChannelClosed {
                component: "filter-dir",
            }
            .to_string(),
        );
    };
    let list = collector.list();
    match action(actions.as_ref(), &list) {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::warn!(error = %err, "controller action failed");
            ActionOutcome::Failed(err.to_string())
        }
    }
}

fn redraw<W: Write>(out: &mut W, model: &mut ControllerModel) {
    if let Err(err) = render::draw(out, model) {
        tracing::warn!(error = %err, "draw failed; retrying on next refresh");
    }
    model.needs_redraw = false;
}

// ──────────────────── helper threads ────────────────────

fn spawn_helper<F>(name: &str, body: F) -> Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    thread::Builder::new()
        .name(name.to_string())
        .spawn(body)
        .map_err(|e| SpaError::Runtime {
            details: format!("failed to spawn {name}: {e}"),
        })
}

fn ticker_main(tx: &Sender<ControllerMsg>, cancel: &Receiver<()>, refresh: Duration) {
    loop {
        match cancel.recv_timeout(refresh) {
            Err(RecvTimeoutError::Timeout) => {
                if tx.send(ControllerMsg::Tick).is_err() {
                    break;
                }
            }
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
}

fn input_main<P>(tx: &Sender<ControllerMsg>, cancel: &Receiver<()>, mut poll: P)
where
    P: FnMut(Duration) -> io::Result<Option<Event>>,
{
    while matches!(cancel.try_recv(), Err(TryRecvError::Empty)) {
        let event = match poll(INPUT_POLL) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(err) => {
                tracing::warn!(error = %err, "terminal input failed");
                break;
            }
        };
        let msg = match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => ControllerMsg::Key(key),
            Event::Resize(cols, rows) => ControllerMsg::Resize { cols, rows },
            _ => continue,
        };
        if tx.send(msg).is_err() {
            break;
        }
    }
}

/// Wait up to `timeout` for a terminal event.
fn poll_terminal(timeout: Duration) -> io::Result<Option<Event>> {
    if event::poll(timeout)? {
        event::read().map(Some)
    } else {
        Ok(None)
    }
}
