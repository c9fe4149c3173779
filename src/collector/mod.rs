//! Observation collector: a deduplicated, lazily sorted list of served paths.
//!
//! Architecture: a dedicated worker thread owns the list, the membership set
//! and the dirty flag. File-system threads push paths through a bounded
//! crossbeam channel with `try_send()`, so serving a request is never blocked
//! by the collector. Readers talk to the worker over a rendezvous channel and
//! get their answer on a one-shot reply channel.

#![allow(missing_docs)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, never, select};

use crate::core::errors::{Result, SpaError};

/// Capacity of the observation channel.
pub const OBSERVATION_CAPACITY: usize = 100;

// ──────────────────── messages ────────────────────

enum Request {
    List(Sender<Vec<String>>),
    Changed(Sender<bool>),
    Clear,
    Shutdown,
}

// ──────────────────── public handles ────────────────────

/// Sending side of the observation channel. Cheap to clone.
#[derive(Clone)]
pub struct Observer {
    tx: Sender<String>,
    dropped: Arc<AtomicU64>,
}

impl Observer {
    /// Record that `path` was served. Non-blocking.
    ///
    /// When the channel is full the observation is dropped and counted.
    pub fn observe(&self, path: &str) {
        if let Err(TrySendError::Full(path)) = self.tx.try_send(path.to_string()) {
            let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
            tracing::warn!(%path, total, "observation channel full, dropping");
        }
        // Disconnected is fine during shutdown.
    }

    /// Number of observations dropped due to back-pressure.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Query side of the collector. Cheap to clone.
///
/// Queries never fail: once the worker is gone, `list` answers empty and
/// `changed` answers `false`.
#[derive(Clone)]
pub struct CollectorHandle {
    requests: Sender<Request>,
    observer: Observer,
}

impl CollectorHandle {
    /// Sorted copy of the collected paths.
    pub fn list(&self) -> Vec<String> {
        let (reply_tx, reply_rx) = bounded(1);
        if self.requests.send(Request::List(reply_tx)).is_err() {
            return Vec::new();
        }
        reply_rx.recv().unwrap_or_default()
    }

    /// Whether the list changed since it was last sorted. Non-destructive.
    pub fn changed(&self) -> bool {
        let (reply_tx, reply_rx) = bounded(1);
        if self.requests.send(Request::Changed(reply_tx)).is_err() {
            return false;
        }
        reply_rx.recv().unwrap_or(false)
    }

    /// Forget every collected path.
    pub fn clear(&self) {
        let _ = self.requests.send(Request::Clear);
    }

    /// Ask the worker to exit. Pending queries from other handles answer
    /// with their empty defaults afterwards.
    pub fn shutdown(&self) {
        let _ = self.requests.send(Request::Shutdown);
    }

    /// Producer side feeding this collector.
    #[must_use]
    pub fn observer(&self) -> Observer {
        self.observer.clone()
    }
}

// ──────────────────── spawn ────────────────────

/// Spawn the collector worker and return its handle.
pub fn spawn_collector() -> Result<(CollectorHandle, thread::JoinHandle<()>)> {
    spawn_collector_with_capacity(OBSERVATION_CAPACITY)
}

/// Like [`spawn_collector`] with an explicit observation channel capacity.
pub fn spawn_collector_with_capacity(
    capacity: usize,
) -> Result<(CollectorHandle, thread::JoinHandle<()>)> {
    let (obs_tx, obs_rx) = bounded::<String>(capacity);
    let (req_tx, req_rx) = bounded::<Request>(0);

    let join = thread::Builder::new()
        .name("spa-collector".to_string())
        .spawn(move || worker_main(&obs_rx, &req_rx))
        .map_err(|e| SpaError::Runtime {
            details: format!("failed to spawn collector thread: {e}"),
        })?;

    let handle = CollectorHandle {
        requests: req_tx,
        observer: Observer {
            tx: obs_tx,
            dropped: Arc::new(AtomicU64::new(0)),
        },
    };
    Ok((handle, join))
}

// ──────────────────── worker ────────────────────

/// State confined to the worker thread.
#[derive(Debug, Default)]
struct SortedList {
    items: Vec<String>,
    members: HashSet<String>,
    dirty: bool,
}

impl SortedList {
    fn add(&mut self, path: String) {
        if self.members.insert(path.clone()) {
            self.items.push(path);
            self.dirty = true;
        }
    }

    fn list(&mut self) -> Vec<String> {
        if self.dirty {
            // `sort` is stable; equal strings cannot occur anyway.
            self.items.sort();
            self.dirty = false;
        }
        self.items.clone()
    }

    fn clear(&mut self) {
        self.items.clear();
        self.members.clear();
        self.dirty = true;
    }
}

fn worker_main(observations: &Receiver<String>, requests: &Receiver<Request>) {
    let mut state = SortedList::default();
    let never_rx = never::<String>();
    let mut producers_alive = true;

    loop {
        let obs_rx = if producers_alive {
            observations
        } else {
            &never_rx
        };
        select! {
            recv(obs_rx) -> msg => match msg {
                Ok(path) => state.add(path),
                // All producers are gone; keep serving queries.
                Err(_) => producers_alive = false,
            },
            recv(requests) -> msg => match msg {
                Ok(Request::List(reply)) => {
                    drain(obs_rx, &mut state);
                    let _ = reply.send(state.list());
                }
                Ok(Request::Changed(reply)) => {
                    drain(obs_rx, &mut state);
                    let _ = reply.send(state.dirty);
                }
                Ok(Request::Clear) => {
                    drain(obs_rx, &mut state);
                    state.clear();
                }
                Ok(Request::Shutdown) | Err(_) => break,
            },
        }
    }
    tracing::debug!(collected = state.items.len(), "collector stopped");
}

/// Absorb observations already queued so a query sees everything sent before it.
fn drain(observations: &Receiver<String>, state: &mut SortedList) {
    while let Ok(path) = observations.try_recv() {
        state.add(path);
    }
}
