//! CLI for tunefeed.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use commands::{run_completions, run_manpage, run_probe, run_session, RunOverrides};

/// Top-level CLI for tunefeed.
#[derive(Debug, Parser)]
#[command(name = "tunefeed")]
#[command(
    about = "tunefeed: read DASH/HLS locators from stdin and hand them to a playback engine",
    long_about = None
)]
pub struct Cli {
    /// Defaults to `run` when omitted.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Prompt for locators on stdin and tune the engine to each one.
    Run {
        /// Load a native engine from this shared library (overrides config).
        #[arg(long, value_name = "PATH")]
        engine_lib: Option<PathBuf>,
        /// End the session at end-of-input instead of forwarding it repeatedly.
        #[arg(long)]
        stop_on_eof: bool,
        /// Prompt printed before every read (overrides config).
        #[arg(long, value_name = "TEXT")]
        prompt: Option<String>,
    },

    /// Print the media format detected for a locator.
    Probe {
        /// DASH/HLS URL or device locator (hdmiin:, live:, ...).
        locator: String,
    },

    /// Write shell completions to stdout.
    Completions {
        shell: Shell,
    },

    /// Write a roff man page to stdout.
    Manpage,
}

impl Default for CliCommand {
    fn default() -> Self {
        CliCommand::Run {
            engine_lib: None,
            stop_on_eof: false,
            prompt: None,
        }
    }
}

impl Cli {
    pub fn into_command(self) -> CliCommand {
        self.command.unwrap_or_default()
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.into_command() {
            CliCommand::Run {
                engine_lib,
                stop_on_eof,
                prompt,
            } => {
                let overrides = RunOverrides {
                    engine_lib,
                    stop_on_eof,
                    prompt,
                };
                run_session(overrides).await?;
            }
            CliCommand::Probe { locator } => run_probe(&locator)?,
            CliCommand::Completions { shell } => run_completions(shell)?,
            CliCommand::Manpage => run_manpage()?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
