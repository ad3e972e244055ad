//! Global CLI options shared across all commands
//!
//! Consolidates the global flags so command handlers take one value instead
//! of threading each flag separately.

use std::path::{Path, PathBuf};

use crate::cli::{Cli, OutputFormat};

/// Global CLI options passed to all command handlers.
///
/// # Precedence
///
/// CLI flag > environment variable > config file > default. This struct
/// captures the CLI/env layer; config file values are merged in
/// `CommandContext`.
#[derive(Debug, Clone)]
pub struct GlobalOptions {
    /// Output format (table, json)
    pub format: OutputFormat,

    /// Custom config file path (defaults to ~/.threatlens/config.yaml)
    pub config: Option<PathBuf>,

    /// Database path override
    pub database: Option<PathBuf>,

    /// Bypass the query cache
    pub no_cache: bool,

    /// Resolve each query this many times
    pub repeat: u32,
}

impl GlobalOptions {
    /// Create GlobalOptions from a parsed CLI struct.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            format: cli.format,
            config: cli.config.clone(),
            database: cli.database.clone(),
            no_cache: cli.no_cache,
            repeat: cli.repeat.max(1),
        }
    }

    pub fn config_ref(&self) -> Option<&Path> {
        self.config.as_deref()
    }
}
