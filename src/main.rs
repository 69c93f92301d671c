use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod scan;
mod server;

use config::{Cli, ServeConfig};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    if cli.debug {
        tracing::debug!("Debugging mode enabled.");
        tracing::debug!("  - args: {:?}", cli);
    }

    if !cli.scan && !cli.view {
        tracing::info!("Nothing to do. Pass --scan and/or --view (see --help).");
        return ExitCode::SUCCESS;
    }

    // 1. Build data.json
    if cli.scan {
        tracing::info!("🔍 Scanning directory: {}", cli.directory.display());

        match scan::scan_and_write(&cli.directory, &cli.scan_options()) {
            Ok(Some(json_path)) => {
                tracing::info!("✅ Written: {}", json_path.display());
            }
            Ok(None) => {
                tracing::info!("There is no image file in the directory.");
                return ExitCode::SUCCESS;
            }
            Err(e) => {
                tracing::error!("❌ Scan failed: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    // 2. Start the preview server
    if cli.view {
        if let Err(e) = view(&cli) {
            tracing::error!("❌ {}", e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}

fn view(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ServeConfig::from_cli(cli)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(server::run(config))?;
    Ok(())
}

/// RUST_LOG wins; otherwise warn for dependencies and info (or debug with
/// `--debug`) for this crate.
fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "warn,image_compare_slider=debug"
    } else {
        "warn,image_compare_slider=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}
