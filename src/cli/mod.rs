//! CLI command definitions and handlers

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod args;
pub mod campaign;
pub mod context;
pub mod dashboard;
pub mod indicator;

pub use args::{GlobalOptions, OutputFormat, PaginationArgs, SearchFilterArgs, TimelineArgs};
pub use context::CommandContext;

/// ThreatLens CLI - cached queries over a threat-intelligence store
#[derive(Parser, Debug)]
#[command(name = "threatlens")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "THREATLENS_FORMAT",
        default_value = "table",
        hide_env = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "THREATLENS_CONFIG", hide_env = true)]
    pub config: Option<PathBuf>,

    /// SQLite database to query
    #[arg(long, global = true, env = "THREATLENS_DATABASE", hide_env = true)]
    pub database: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true, env = "THREATLENS_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass the query cache, always read the data store
    #[arg(long, global = true, env = "THREATLENS_NO_CACHE", hide_env = true)]
    pub no_cache: bool,

    /// Resolve the query this many times and log cache statistics
    #[arg(long, global = true, default_value_t = 1)]
    pub repeat: u32,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Look up and search indicators of compromise
    #[command(subcommand)]
    Indicator(IndicatorCommands),

    /// Campaign views
    #[command(subcommand)]
    Campaign(CampaignCommands),

    /// Show the dashboard summary
    Dashboard(DashboardArgs),

    /// Display version information
    Version,
}

/// Indicator subcommands
#[derive(Subcommand, Debug)]
pub enum IndicatorCommands {
    /// Show an indicator with its actors, campaigns and related indicators
    Get {
        /// Indicator ID
        id: String,
    },

    /// Search indicators
    Search(SearchFilterArgs),
}

/// Campaign subcommands
#[derive(Subcommand, Debug)]
pub enum CampaignCommands {
    /// Show a campaign's indicators bucketed by day or week
    Timeline(TimelineArgs),
}

/// Arguments for the dashboard command
#[derive(Args, Debug, Clone)]
pub struct DashboardArgs {
    /// Time window (24h, 7d, 30d); anything else means 7d
    #[arg(long, short = 'r', default_value = "7d")]
    pub range: String,
}
