//! CLI command definitions for envconf
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::format::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Environment variable naming the configuration file.
pub const FILE_ENV: &str = "ENVCONF_FILE";

/// Environment variable listing environments, comma-separated.
pub const ENVIRONMENTS_ENV: &str = "ENVCONF_ENVIRONMENTS";

/// Used when neither `--file` nor `ENVCONF_FILE` is given.
pub const DEFAULT_CONFIG_FILE: &str = "settings.conf";

/// Query INI-style configuration with per-environment overrides
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (default: $ENVCONF_FILE, then settings.conf)
    #[arg(short, long, global = true)]
    pub file: Option<PathBuf>,

    /// Environments to apply, highest priority first (repeatable or comma-separated)
    #[arg(short, long = "env", value_name = "ENV", value_delimiter = ',', global = true)]
    pub environments: Vec<String>,

    /// Output format: text (default), json, or yaml
    #[arg(long, default_value = "text", value_name = "FORMAT", global = true)]
    pub format: OutputFormat,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Print the resolved value of one parameter
    Get { group: String, param: String },

    /// List groups in declaration order
    Groups,

    /// Print the whole resolved configuration
    Dump,

    /// Show every stored value of a parameter and which one wins
    Explain { group: String, param: String },

    /// Parse the file and report what it contains
    Check,
}

impl Cli {
    /// `--file`, else `$ENVCONF_FILE`, else `settings.conf`.
    pub fn config_path(&self) -> PathBuf {
        self.file
            .clone()
            .or_else(|| std::env::var_os(FILE_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// `--env` values, else `$ENVCONF_ENVIRONMENTS`, else none.
    pub fn environments(&self) -> Vec<String> {
        if !self.environments.is_empty() {
            return self.environments.clone();
        }
        std::env::var(ENVIRONMENTS_ENV)
            .map(|value| split_environments(&value))
            .unwrap_or_default()
    }
}

/// Split a comma-separated environment list, dropping blanks.
pub fn split_environments(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|env| !env.is_empty())
        .map(String::from)
        .collect()
}
