// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Luminous - hardware-aware local model orchestration
//!
//! Entry point for the luminous CLI.

use clap::Parser;

use luminous_nix::cli::{Cli, Commands};
use luminous_nix::commands::{self, AppContext};
use luminous_nix::config::Settings;
use luminous_nix::error::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `RUST_LOG` still takes precedence for other targets
    let directive = match cli.verbose {
        0 => None,
        1 => Some("luminous_nix=info"),
        _ => Some("luminous_nix=debug"),
    };
    if let Some(directive) = directive {
        if let Ok(parsed) = directive.parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let ctx = AppContext::load(cli.config.as_deref())?;
    Settings::ensure_directories()?;

    let format = cli.format;
    match cli.command {
        Commands::System(args) => commands::system::execute(&ctx, &args, &format).await?,
        Commands::Select(args) => commands::models::select(&ctx, &args, &format).await?,
        Commands::Run(args) => commands::models::run(&ctx, &args, &format).await?,
        Commands::Council => commands::models::council(&ctx, &format).await?,
        Commands::Status => commands::models::status(&ctx, &format).await?,
        Commands::Evolve(args) => commands::curate::evolve(&ctx, &args, &format).await?,
        Commands::Curator => commands::curate::curator(&ctx, &format).await?,
    }

    Ok(())
}
