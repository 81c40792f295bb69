#![forbid(unsafe_code)]
//! Simulates a transfer between the addresses fixed in the configuration.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use transfer_sim::cli::{finish, load_config_or_report, reader_from_config, report_error};
use transfer_sim::logging::init_logging;
use transfer_sim::prompt::{PromptSource, TerminalPrompt};
use transfer_sim::receipt::RawRequest;
use transfer_sim::simulator::{SimSettings, Simulator};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Simulate a token transfer between configured addresses. Nothing is sent.",
    long_about = None
)]
struct Cli {
    /// Path to a TOML config file (default: ./transfer-sim.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let Some(config) = load_config_or_report(cli.config.as_deref()) else {
        return ExitCode::from(1);
    };
    let settings = match SimSettings::from_config(&config) {
        Ok(settings) => settings,
        Err(e) => {
            report_error(&e);
            return ExitCode::from(1);
        }
    };

    let raw = RawRequest::new(
        &config.transfer.from,
        &config.transfer.to,
        &config.transfer.amount,
    );

    let mut terminal = TerminalPrompt::new();
    let confirm: Option<&mut dyn PromptSource> = if config.simulation.confirm {
        Some(&mut terminal)
    } else {
        None
    };

    let mut simulator = Simulator::new(settings, reader_from_config(&config), std::io::stdout());
    let result = simulator.run(&raw, confirm).await;
    finish(&result)
}
