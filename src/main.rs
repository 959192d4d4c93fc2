use anyhow::Result;
use clap::Parser;

use label_flow::cli::commands::{ConfigInitCommand, RunCommand};
use label_flow::cli::{Cli, Commands, ConfigAction};
use label_flow::{config, init_config, init_telemetry, SessionOptions, ShutdownCoordinator};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            fixture,
            choose,
            json,
        } => {
            let config = config()?;
            init_telemetry(&config.observability)?;
            init_config()?;

            let shutdown = ShutdownCoordinator::new();
            let signals = shutdown.install_signal_handlers();

            let outcome = RunCommand::new(fixture)
                .with_choice(choose)
                .with_json(json)
                .with_options(SessionOptions::from_config(config))
                .with_shutdown(shutdown)
                .execute()
                .await?;
            signals.abort();

            if !outcome.is_completed() {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Config {
            action: ConfigAction::Init { path, force },
        } => ConfigInitCommand::new(path).with_force(force).execute().await,
    }
}
