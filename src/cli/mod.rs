use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

use crate::app::App;
use crate::config::ConfigLoader;

pub mod commands;

use self::commands::{ComposeArgs, SearchArgs, SnapshotArgs};

#[derive(Parser, Debug)]
#[command(
    name = "mentionfeed",
    version,
    about = "Live mention feed simulator with a search API client"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Override the config file location (takes precedence over MENTIONFEED_CONFIG)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Minimum log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Launch the live dashboard (default)
    Tui,
    /// Print a freshly loaded feed and exit
    Snapshot(SnapshotArgs),
    /// Run one search through the configured source
    Search(SearchArgs),
    /// Exchange API credentials for a bearer token
    Token,
    /// Print a compose link with a promotional message
    Compose(ComposeArgs),
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level)
        .with_context(|| format!("initialising logging at level {}", cli.log_level))?;
    let loader = match &cli.config {
        Some(path) => ConfigLoader::at(path),
        None => ConfigLoader::discover()?,
    };
    let config = loader.load_or_init()?;
    tracing::debug!(path = %loader.paths().config_file.display(), ?config, "config loaded");

    let command = cli.command.unwrap_or(Commands::Tui);
    match command {
        Commands::Tui => {
            let mut app = App::new(config)?;
            commands::run_tui(&mut app)
        }
        Commands::Snapshot(args) => commands::snapshot(&config, args),
        Commands::Search(args) => commands::search(&config, args),
        Commands::Token => commands::token(&config),
        Commands::Compose(args) => commands::compose(args),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    static INIT: OnceCell<()> = OnceCell::new();
    INIT.get_or_try_init(|| {
        let env_filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
        Ok(())
    })
    .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_invocation_defaults_to_the_dashboard() {
        let cli = Cli::try_parse_from(["mentionfeed"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.log_level, "warn");
    }

    #[test]
    fn search_flags_parse() {
        let cli = Cli::try_parse_from([
            "mentionfeed",
            "--config",
            "/tmp/feed.toml",
            "search",
            "@monad_xyz",
            "--limit",
            "15",
            "--source",
            "synthetic",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/feed.toml")));
        match cli.command {
            Some(Commands::Search(args)) => {
                assert_eq!(args.query.as_deref(), Some("@monad_xyz"));
                assert_eq!(args.limit, Some(15));
                assert_eq!(args.source, Some(crate::config::SourceKind::Synthetic));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn unknown_source_is_rejected() {
        assert!(Cli::try_parse_from(["mentionfeed", "search", "--source", "carrier-pigeon"]).is_err());
    }
}
