//! cpan-index - print the CPAN package index
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use cpan_index::cli::{commands, Cli, Commands, ConfigAction};
use cpan_index::config::{Config, ConfigManager};
use cpan_index::error::IndexResult;
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> IndexResult<()> {
    let cli = Cli::parse();

    // 0 = warn, 1 = info, 2+ = debug. Stdout carries the index itself.
    let filter = match cli.verbose {
        0 => EnvFilter::new("cpan_index=warn"),
        1 => EnvFilter::new("cpan_index=info"),
        _ => EnvFilter::new("cpan_index=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    let command = cli.resolved_command();

    // Init must work even when the existing file no longer parses
    if let Commands::Config(ref args) = command {
        if matches!(args.action, Some(ConfigAction::Init { .. })) {
            let config = Config::default();
            return commands::config(args.clone(), &config_manager, &config).await;
        }
    }

    let mut config = config_manager.load().await?;
    cli.apply_overrides(&mut config);
    debug!("Source: {}", config.source.url);

    let cancel = CancellationToken::new();
    tokio::spawn(watch_interrupts(cancel.clone()));

    match command {
        Commands::Cat => commands::cat(&config, &cancel).await,
        Commands::Mtime => commands::mtime(&config, &cancel).await,
        Commands::Path => commands::path(&config).await,
        Commands::Config(args) => commands::config(args, &config_manager, &config).await,
    }
}

/// Ctrl-C cancels in-flight work
async fn watch_interrupts(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        debug!("Interrupted, cancelling");
        cancel.cancel();
    }
}
