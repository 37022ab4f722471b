// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::io;

use anyhow::Result;
use tv_cli::{Cli, Commands, Parser, default_log_level};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = tv_config::load(&cli.config_overrides())?;
    cli.logging.clone().init("tv", default_log_level(&resolved.settings))?;

    let mut out = io::stdout().lock();
    match cli.command {
        Commands::Open(args) => args.run(&resolved.settings, &mut out).await,
        Commands::Fetch(args) => args.run(&resolved.settings, &mut out).await,
        Commands::Validate(args) => args.run(&mut out).await,
        Commands::Config { subcommand } => {
            subcommand.run(&resolved, &tv_config::user_config_path(), &mut out)
        }
    }
}
