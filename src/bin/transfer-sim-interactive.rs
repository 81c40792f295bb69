#![forbid(unsafe_code)]
//! Prompts for a destination and an amount, then simulates the transfer
//! after a yes/no confirmation.

use clap::Parser;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;
use transfer_sim::cli::{finish, load_config_or_report, reader_from_config, report_error};
use transfer_sim::error::SimError;
use transfer_sim::logging::init_logging;
use transfer_sim::prompt::{collect_request, TerminalPrompt};
use transfer_sim::simulator::{SimSettings, Simulator};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Interactively simulate a token transfer. Nothing is sent.",
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

    println!("{}", "Token Transfer Simulator (interactive)".bright_cyan().bold());
    println!("{}", "--------------------------------------".bright_cyan());
    println!("Sending from: {}", config.transfer.from.bright_white());
    println!(
        "{}",
        "This is a simulation. No keys are needed and nothing is broadcast.".yellow()
    );
    println!();

    let mut terminal = TerminalPrompt::new();
    let raw = match collect_request(&mut terminal, &config.transfer.from, &config.token.symbol) {
        Ok(raw) => raw,
        Err(e) => {
            report_error(&SimError::from(e));
            return ExitCode::from(1);
        }
    };

    let mut simulator = Simulator::new(settings, reader_from_config(&config), std::io::stdout());
    let result = simulator.run(&raw, Some(&mut terminal)).await;
    finish(&result)
}
