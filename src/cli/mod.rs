use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::CONFIG_FILE;
use crate::shipping_label::SuggestionChoice;

pub mod commands;

#[derive(Parser)]
#[command(name = "label-flow")]
#[command(about = "Drive the multi-step shipping label workflow")]
#[command(long_about = "label-flow runs the shipping label creation workflow (addresses, packaging, \
                       customs, carrier and payment) against order fixtures, validating addresses \
                       through a scripted validation service.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a label creation session headlessly against a fixture
    Run {
        /// TOML fixture with the order data and validator verdicts
        #[arg(long, help = "Path to the order fixture")]
        fixture: PathBuf,
        /// Which address to keep when the validator suggests a correction
        #[arg(long, value_enum, default_value_t = SuggestionPick::Suggested)]
        choose: SuggestionPick,
        /// Print each view update as a JSON line
        #[arg(long)]
        json: bool,
    },
    /// Manage label-flow configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write the default configuration file
    Init {
        #[arg(long, default_value = CONFIG_FILE)]
        path: PathBuf,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SuggestionPick {
    Entered,
    Suggested,
}

impl From<SuggestionPick> for SuggestionChoice {
    fn from(pick: SuggestionPick) -> Self {
        match pick {
            SuggestionPick::Entered => SuggestionChoice::SelectEntered,
            SuggestionPick::Suggested => SuggestionChoice::SelectSuggested,
        }
    }
}
