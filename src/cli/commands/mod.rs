pub mod config;
pub mod run;

pub use config::ConfigInitCommand;
pub use run::{RunCommand, RunOutcome};
