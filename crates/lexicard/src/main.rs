// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lexicard - a Telegram bot that turns words into vocabulary flashcards.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod stats;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lexicard_config::{ConfigError, LexicardConfig};

/// Lexicard - vocabulary flashcards over Telegram.
#[derive(Parser, Debug)]
#[command(name = "lexicard", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default hierarchy.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bot and poll Telegram until interrupted.
    Serve,
    /// Validate the configuration and print a summary.
    CheckConfig,
    /// Show history and export counts from the data directory.
    Stats {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            lexicard_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::CheckConfig) => {
            print_config_summary(&config);
            Ok(())
        }
        Some(Commands::Stats { json }) => stats::run_stats(&config, json).await,
        None => {
            println!("lexicard: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("lexicard: {e}");
        std::process::exit(1);
    }
}

fn load(path: Option<&std::path::Path>) -> Result<LexicardConfig, Vec<ConfigError>> {
    match path {
        Some(path) => lexicard_config::load_and_validate_path(path),
        None => lexicard_config::load_and_validate(),
    }
}

fn print_config_summary(config: &LexicardConfig) {
    use colored::Colorize;

    println!("  {} configuration is valid", "✓".green());
    println!("  model:         {}", config.openrouter.model);
    println!("  endpoint:      {}", config.openrouter.base_url);
    println!(
        "  retries:       {} attempts, {}ms base delay",
        config.generation.max_attempts, config.generation.base_delay_ms
    );
    println!("  max pending:   {}", config.bot.max_pending);
    println!("  data dir:      {}", config.storage.data_dir);
    println!("  english file:  {}", config.storage.english_export);
    println!("  german file:   {}", config.storage.german_export);

    if config.telegram.bot_token.is_none() {
        println!("  {} telegram.bot_token is not set; `serve` will refuse to start", "!".yellow());
    }
    if config.telegram.allowed_user.is_none() {
        println!("  {} telegram.allowed_user is not set; every sender will be rejected", "!".yellow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["lexicard", "--config", "bot.toml", "stats", "--json"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("bot.toml")));
        assert!(matches!(cli.command, Some(Commands::Stats { json: true })));

        let cli = Cli::try_parse_from(["lexicard", "check-config"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::CheckConfig)));
    }

    #[test]
    fn defaults_are_valid() {
        let config = lexicard_config::load_and_validate_str("").expect("default config should be valid");
        assert_eq!(config.bot.max_pending, 50);
    }
}
