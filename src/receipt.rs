//! Transfer requests and the receipts produced for them

use crate::address::Address;
use crate::amount::{format_amount, parse_amount, TokenAmount};
use crate::error::SimError;
use crate::txid::TxId;
use chrono::{DateTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color as TableColor, ContentArrangement, Table};

/// A validated transfer request. Lives for one invocation only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub source: Address,
    pub destination: Address,
    pub amount: TokenAmount,
}

impl TransferRequest {
    /// Validates the source, then the destination, then the amount.
    pub fn parse(source: &str, destination: &str, amount: &str) -> Result<Self, SimError> {
        let source = Address::parse(source)?;
        let destination = Address::parse(destination)?;
        let amount = parse_amount(amount)?;
        Ok(TransferRequest {
            source,
            destination,
            amount,
        })
    }
}

/// Unvalidated input as typed by the user or read from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRequest {
    pub source: String,
    pub destination: String,
    pub amount: String,
}

impl RawRequest {
    pub fn new(
        source: impl Into<String>,
        destination: impl Into<String>,
        amount: impl Into<String>,
    ) -> Self {
        RawRequest {
            source: source.into(),
            destination: destination.into(),
            amount: amount.into(),
        }
    }

    pub fn validate(&self) -> Result<TransferRequest, SimError> {
        TransferRequest::parse(&self.source, &self.destination, &self.amount)
    }
}

/// Record of a simulated transfer. Has no effect outside this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedReceipt {
    pub txid: TxId,
    pub timestamp: DateTime<Utc>,
    pub source: Address,
    pub destination: Address,
    pub amount: TokenAmount,
    pub symbol: String,
}

impl SimulatedReceipt {
    pub fn new(request: &TransferRequest, symbol: &str, txid_prefix: Option<&str>) -> Self {
        SimulatedReceipt {
            txid: TxId::generate(txid_prefix),
            timestamp: Utc::now(),
            source: request.source.clone(),
            destination: request.destination.clone(),
            amount: request.amount,
            symbol: symbol.to_string(),
        }
    }

    pub fn render_table(&self, decimals: u8) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Disabled)
            .set_header(vec![
                Cell::new("Field")
                    .fg(TableColor::Cyan)
                    .add_attribute(Attribute::Bold),
                Cell::new("Value (simulated)")
                    .fg(TableColor::Cyan)
                    .add_attribute(Attribute::Bold),
            ]);

        table.add_row(vec![
            Cell::new("Fake TXID"),
            Cell::new(self.txid.to_string()).fg(TableColor::Yellow),
        ]);
        table.add_row(vec![
            Cell::new("Timestamp"),
            Cell::new(self.timestamp.format("%Y-%m-%d %H:%M:%S UTC").to_string()),
        ]);
        table.add_row(vec![Cell::new("From"), Cell::new(self.source.as_str())]);
        table.add_row(vec![Cell::new("To"), Cell::new(self.destination.as_str())]);
        table.add_row(vec![
            Cell::new("Amount"),
            Cell::new(format!(
                "{} {}",
                format_amount(self.amount, decimals),
                self.symbol
            ))
            .fg(TableColor::Green),
        ]);
        table
    }
}
