//! RipleyFlow command-line binary.

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod cli;
mod commands;

use cli::Cli;

fn init_tracing() -> Result<()> {
    // Colored output for terminals, JSON when LOG_FORMAT=json
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("ripley_client=info".parse()?)
        .add_directive("ripley_media=info".parse()?)
        .add_directive("ripley_storage=info".parse()?);

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(false),
            )
            .with(env_filter)
            .init();
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    if let Err(e) = init_tracing() {
        eprintln!("Failed to initialise logging: {}", e);
    }

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli).await {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
