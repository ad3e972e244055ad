//! ThreatLens CLI - cached queries over a threat-intelligence store

use clap::Parser;

use threatlens::cli::{self, CampaignCommands, Cli, Commands, GlobalOptions, IndicatorCommands};
use threatlens::config::Config;
use threatlens::error::Result;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let opts = GlobalOptions::from_cli(&cli);

    if let Commands::Version = cli.command {
        println!("threatlens version {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config::load_at(opts.config_ref())?;
    init_logging(&config, cli.debug);

    let ctx = cli::CommandContext::new(config, &opts)?;

    match cli.command {
        Commands::Indicator(IndicatorCommands::Get { id }) => cli::indicator::get(&ctx, &id).await,
        Commands::Indicator(IndicatorCommands::Search(args)) => {
            cli::indicator::search(&ctx, &args).await
        }
        Commands::Campaign(CampaignCommands::Timeline(args)) => {
            cli::campaign::timeline(&ctx, &args).await
        }
        Commands::Dashboard(args) => cli::dashboard::run(&ctx, &args).await,
        Commands::Version => Ok(()),
    }
}

/// Log to stderr. `RUST_LOG` wins, then `--debug`, then the configured level.
fn init_logging(config: &Config, debug: bool) {
    let level = if debug { "debug" } else { config.log_level.as_str() };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_millis()
        .init();
    log::debug!("Debug logging enabled");
}
