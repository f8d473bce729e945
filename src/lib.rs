//! envconf library
//!
//! INI-style configuration with per-environment overrides. See [`config`]
//! for the grammar and resolution rules.

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
