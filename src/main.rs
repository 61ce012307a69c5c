//! Banner Comments - command-line host
//!
//! Main entry point for the CLI.
//!
//! # Overview
//!
//! The binary wires the library together:
//! - Logging (stderr, or rotating files with `--log-dir`)
//! - Settings from a YAML file ([`FileSettingsStore`])
//! - Fonts: the builtin font, packaged fonts from `--fonts-dir` and the user's
//!   custom fonts
//! - Language comment syntax from installed extensions (`--extensions-dir`)
//!
//! # Subcommands
//!
//! - `render`: print a banner
//! - `apply`: replace lines of a file with banners
//! - `fonts`: list fonts
//! - `run`: run any command interactively (pickers and inputs on the terminal)
//!
//! Banners go to stdout; logs and prompts go to stderr.
//!
//! [`FileSettingsStore`]: banner_comments::config::FileSettingsStore

mod cli;
mod terminal;

use anyhow::Result;
use banner_comments::{APP_NAME, VERSION};
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Held until exit so buffered file logs are flushed
    let _guard = match &cli.log_dir {
        Some(log_dir) => Some(banner_comments::logging::setup_logging_with_console(
            log_dir,
            APP_NAME,
            cli.debug,
            cli.debug,
        )?),
        None => {
            banner_comments::logging::setup_console_logging(cli.debug)?;
            None
        }
    };

    tracing::debug!("Starting {} v{}", APP_NAME, VERSION);

    cli::run(cli).map_err(|e| {
        tracing::error!("{:#}", e);
        e
    })
}
