//! Core types: errors, options, shared path helpers.

pub mod errors;
pub mod options;
pub mod paths;
