//! Helpers shared by the binaries

use crate::balance::{BalanceReader, OfflineReader};
use crate::config::{load_config, Config};
use crate::error::SimError;
use crate::simulator::{exit_code, Outcome};
use crate::tron::TronGridReader;
use colored::*;
use std::path::Path;
use std::process::ExitCode;
use tracing::warn;

/// Loads configuration, printing the error if it is unusable.
pub fn load_config_or_report(path: Option<&Path>) -> Option<Config> {
    match load_config(path) {
        Ok(config) => Some(config),
        Err(e) => {
            report_error(&e);
            None
        }
    }
}

/// Picks the balance reader described by `config`. A reader that cannot be
/// built falls back to offline mode instead of failing the run.
pub fn reader_from_config(config: &Config) -> Box<dyn BalanceReader> {
    if !config.network.enabled {
        return Box::new(OfflineReader);
    }
    match TronGridReader::new(&config.network) {
        Ok(reader) => Box::new(reader),
        Err(e) => {
            warn!("cannot build HTTP client, running offline: {}", e);
            Box::new(OfflineReader)
        }
    }
}

pub fn report_error(err: &SimError) {
    eprintln!("{}", format!("[!] ERROR: {}", err).red().bold());
    if err.is_input_error() {
        eprintln!(
            "{}",
            "Addresses must start with 'T' and be at least 30 characters; amounts must be positive numbers."
                .yellow()
        );
    }
}

/// Maps a finished run to the process exit status, reporting any error.
pub fn finish(result: &Result<Outcome, SimError>) -> ExitCode {
    if let Err(e) = result {
        report_error(e);
    }
    ExitCode::from(exit_code(result) as u8)
}
