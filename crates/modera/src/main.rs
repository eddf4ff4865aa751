// SPDX-FileCopyrightText: 2026 Modera Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Modera - conversational safety moderation with human-in-the-loop review.
//!
//! This is the binary entry point for the Modera service.

use clap::{Parser, Subcommand};

mod serve;

/// Modera - conversational safety moderation service.
#[derive(Parser, Debug)]
#[command(name = "modera", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the Modera moderation server.
    Serve,
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match modera_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            modera_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(err) = serve::run_serve(config).await {
                eprintln!("modera serve: {err}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => {
                eprintln!("modera config: failed to render: {err}");
                std::process::exit(1);
            }
        },
        None => {
            println!("modera: use --help for available commands");
        }
    }
}
