//! Interactive terminal controller for the dev session.
//!
//! Elm-style split: `model` holds state, `update` is the pure reducer,
//! `input` maps keys, `render` draws frames, and `runtime` owns the terminal
//! and the event loop.

#![allow(missing_docs)]

pub mod input;
pub mod model;
pub mod render;
pub mod runtime;
pub mod terminal_guard;
pub mod update;

pub use model::{ControllerConfig, InputStyle, Phase};
pub use runtime::run_controller;
