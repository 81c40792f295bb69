//! The transfer simulator
//!
//! Runs one request through `Start -> Validating -> Confirmed -> Simulating ->
//! Completed`, stopping early at `InvalidInput` or `Cancelled`. Balance lookups
//! only decorate the report: when they fail the run carries on offline.
//! Nothing is ever signed or sent.

use crate::amount::{format_amount, TokenAmount};
use crate::balance::{BalanceQuery, BalanceReader, BalanceSnapshot};
use crate::config::Config;
use crate::error::SimError;
use crate::prompt::{is_affirmative, PromptSource};
use crate::receipt::{RawRequest, SimulatedReceipt, TransferRequest};
use colored::*;
use std::io::Write;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    Start,
    Validating,
    InvalidInput,
    Cancelled,
    Confirmed,
    Simulating,
    Completed,
}

/// How a run ended when no error occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(SimulatedReceipt),
    Cancelled,
}

impl Outcome {
    pub fn receipt(&self) -> Option<&SimulatedReceipt> {
        match self {
            Outcome::Completed(receipt) => Some(receipt),
            Outcome::Cancelled => None,
        }
    }
}

/// Process exit status: 0 for completion or cancellation, 1 for errors.
pub fn exit_code(result: &Result<Outcome, SimError>) -> i32 {
    match result {
        Ok(_) => 0,
        Err(e) => e.exit_code(),
    }
}

/// Settings the simulator needs, resolved from [`Config`].
#[derive(Debug, Clone)]
pub struct SimSettings {
    pub contract: String,
    pub fallback_symbol: String,
    pub fallback_decimals: u8,
    pub steps: u32,
    pub step_delay: Duration,
    pub txid_prefix: Option<String>,
}

impl SimSettings {
    pub fn from_config(config: &Config) -> Result<Self, SimError> {
        Ok(Self {
            contract: config.token.contract.clone(),
            fallback_symbol: config.token.symbol.clone(),
            fallback_decimals: config.token.decimals,
            steps: config.simulation.steps,
            step_delay: config.simulation.step_delay()?,
            txid_prefix: config.simulation.txid_prefix().map(str::to_string),
        })
    }
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            contract: "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t".to_string(),
            fallback_symbol: "USDT".to_string(),
            fallback_decimals: 6,
            steps: 0,
            step_delay: Duration::ZERO,
            txid_prefix: None,
        }
    }
}

pub struct Simulator<R, W> {
    settings: SimSettings,
    reader: R,
    out: W,
    transitions: Vec<SimState>,
}

impl<R: BalanceReader, W: Write> Simulator<R, W> {
    pub fn new(settings: SimSettings, reader: R, out: W) -> Self {
        Self {
            settings,
            reader,
            out,
            transitions: vec![SimState::Start],
        }
    }

    pub fn state(&self) -> SimState {
        self.transitions
            .last()
            .copied()
            .unwrap_or(SimState::Start)
    }

    /// Every state visited so far, starting with `Start`.
    pub fn transitions(&self) -> &[SimState] {
        &self.transitions
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn transition(&mut self, next: SimState) {
        debug!("simulator: {:?} -> {:?}", self.state(), next);
        self.transitions.push(next);
    }

    /// Runs one simulated transfer. With `confirm` set, the user must answer
    /// yes before anything is simulated.
    pub async fn run(
        &mut self,
        raw: &RawRequest,
        confirm: Option<&mut dyn PromptSource>,
    ) -> Result<Outcome, SimError> {
        self.transition(SimState::Validating);
        let request = match raw.validate() {
            Ok(request) => request,
            Err(e) => {
                self.transition(SimState::InvalidInput);
                return Err(e);
            }
        };
        debug!(
            "validated request {} -> {} ({})",
            request.source, request.destination, request.amount
        );

        self.print_header(&request)?;

        let snapshot = self.lookup_balances(&request).await?;
        let (symbol, decimals) = match &snapshot {
            Some(snap) => (snap.symbol.clone(), snap.decimals),
            None => (
                self.settings.fallback_symbol.clone(),
                self.settings.fallback_decimals,
            ),
        };

        self.print_sufficiency(&request, snapshot.as_ref(), &symbol, decimals)?;

        if let Some(prompt) = confirm {
            let answer = prompt.ask("Proceed with the SIMULATED transfer? [y/N]: ")?;
            if !answer.as_deref().map(is_affirmative).unwrap_or(false) {
                self.transition(SimState::Cancelled);
                writeln!(
                    self.out,
                    "{}",
                    "[*] Cancelled. No transfer was simulated.".cyan()
                )?;
                return Ok(Outcome::Cancelled);
            }
        }
        self.transition(SimState::Confirmed);

        self.transition(SimState::Simulating);
        writeln!(self.out, "\n--- Simulating Transfer ---")?;
        writeln!(
            self.out,
            "Sending {} {} from {} to {} (simulated)...",
            format_amount(request.amount, decimals),
            symbol,
            request.source.short(),
            request.destination.short()
        )?;
        self.fake_processing().await?;

        let receipt =
            SimulatedReceipt::new(&request, &symbol, self.settings.txid_prefix.as_deref());
        writeln!(
            self.out,
            "{}",
            format!("[+] Transaction simulated. (Fake TXID: {})", receipt.txid).green()
        )?;
        writeln!(self.out, "{}", receipt.render_table(decimals))?;

        self.print_projection(request.amount, snapshot.as_ref(), &symbol, decimals)?;

        writeln!(self.out, "\n--- Simulation Complete ---")?;
        writeln!(
            self.out,
            "{}",
            format!(
                "Note: This was a SIMULATED transfer. No actual {} was moved.",
                symbol
            )
            .bold()
        )?;
        self.transition(SimState::Completed);

        Ok(Outcome::Completed(receipt))
    }

    fn print_header(&mut self, request: &TransferRequest) -> Result<(), SimError> {
        let decimals = self.settings.fallback_decimals;
        writeln!(self.out, "\n{}", "--- Token Transfer Simulator ---".bright_cyan().bold())?;
        writeln!(
            self.out,
            "Simulating a transfer of {} (contract {}).",
            self.settings.fallback_symbol, self.settings.contract
        )?;
        writeln!(self.out, "From   : {}", request.source)?;
        writeln!(self.out, "To     : {}", request.destination)?;
        writeln!(
            self.out,
            "Amount : {} {}\n",
            format_amount(request.amount, decimals),
            self.settings.fallback_symbol
        )?;
        Ok(())
    }

    async fn lookup_balances(
        &mut self,
        request: &TransferRequest,
    ) -> Result<Option<BalanceSnapshot>, SimError> {
        let query = BalanceQuery {
            contract: self.settings.contract.clone(),
            source: request.source.clone(),
            destination: request.destination.clone(),
        };

        match self.reader.fetch(&query).await {
            Ok(snap) => {
                writeln!(
                    self.out,
                    "{}",
                    format!(
                        "[+] Connected to network. Token symbol: {}, Decimals: {}",
                        snap.symbol, snap.decimals
                    )
                    .green()
                )?;
                writeln!(
                    self.out,
                    "[+] Balance of source address ({}): {} {}",
                    request.source,
                    format_amount(snap.source_balance, snap.decimals),
                    snap.symbol
                )?;
                writeln!(
                    self.out,
                    "[+] Balance of destination address ({}): {} {}",
                    request.destination,
                    format_amount(snap.destination_balance, snap.decimals),
                    snap.symbol
                )?;
                Ok(Some(snap))
            }
            Err(e) => {
                info!("balance lookup failed, continuing offline: {}", e);
                writeln!(
                    self.out,
                    "{}",
                    format!("[!] Balance lookup unavailable: {}", e).yellow()
                )?;
                writeln!(self.out, "Continuing in offline simulation mode...")?;
                Ok(None)
            }
        }
    }

    fn print_sufficiency(
        &mut self,
        request: &TransferRequest,
        snapshot: Option<&BalanceSnapshot>,
        symbol: &str,
        decimals: u8,
    ) -> Result<(), SimError> {
        match snapshot {
            Some(snap) if snap.is_insufficient(request.amount) => {
                writeln!(
                    self.out,
                    "{}",
                    format!(
                        "[!] Warning: source address holds {} {}, which is less than the send amount {}. Proceeding with simulation anyway.",
                        format_amount(snap.source_balance, decimals),
                        symbol,
                        format_amount(request.amount, decimals)
                    )
                    .yellow()
                )?;
            }
            Some(_) => {}
            None => {
                writeln!(
                    self.out,
                    "{}",
                    "[*] Source balance unavailable; cannot verify sufficient balance (simulation only)."
                        .cyan()
                )?;
            }
        }
        Ok(())
    }

    async fn fake_processing(&mut self) -> Result<(), SimError> {
        let steps = self.settings.steps;
        for step in 1..=steps {
            if !self.settings.step_delay.is_zero() {
                tokio::time::sleep(self.settings.step_delay).await;
            }
            writeln!(self.out, "  processing... [{}/{}]", step, steps)?;
        }
        Ok(())
    }

    fn print_projection(
        &mut self,
        amount: TokenAmount,
        snapshot: Option<&BalanceSnapshot>,
        symbol: &str,
        decimals: u8,
    ) -> Result<(), SimError> {
        match snapshot {
            Some(snap) => {
                let (source, destination) = snap.after_transfer(amount);
                writeln!(
                    self.out,
                    "{}",
                    "[+] NEW (simulated) balances after transfer:".green()
                )?;
                writeln!(
                    self.out,
                    "    Source:      {} {}",
                    format_amount(source, decimals),
                    symbol
                )?;
                writeln!(
                    self.out,
                    "    Destination: {} {}",
                    format_amount(destination, decimals),
                    symbol
                )?;
            }
            None => {
                writeln!(
                    self.out,
                    "{}",
                    "[*] Balances after transfer not computed (offline simulation mode).".cyan()
                )?;
            }
        }
        Ok(())
    }
}
