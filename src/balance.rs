//! Read-only balance lookups used to decorate the simulation

use crate::address::Address;
use crate::amount::TokenAmount;
use crate::error::SimError;
use async_trait::async_trait;

/// What to look up: token metadata plus the balances of both parties.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceQuery {
    pub contract: String,
    pub source: Address,
    pub destination: Address,
}

/// Token metadata and the two balances, already scaled by `decimals`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub symbol: String,
    pub decimals: u8,
    pub source_balance: TokenAmount,
    pub destination_balance: TokenAmount,
}

impl BalanceSnapshot {
    pub fn is_insufficient(&self, amount: TokenAmount) -> bool {
        amount > self.source_balance
    }

    /// Projected `(source, destination)` balances if the transfer were real.
    /// The source side never goes below zero.
    pub fn after_transfer(&self, amount: TokenAmount) -> (TokenAmount, TokenAmount) {
        let source = self
            .source_balance
            .saturating_sub(amount)
            .max(TokenAmount::ZERO);
        let destination = self.destination_balance.saturating_add(amount);
        (source, destination)
    }
}

/// Capability for fetching a [`BalanceSnapshot`]. Implementations must only
/// read; failures are reported as [`SimError::NetworkUnavailable`].
#[async_trait]
pub trait BalanceReader: Send + Sync {
    async fn fetch(&self, query: &BalanceQuery) -> Result<BalanceSnapshot, SimError>;
}

#[async_trait]
impl<R: BalanceReader + ?Sized> BalanceReader for Box<R> {
    async fn fetch(&self, query: &BalanceQuery) -> Result<BalanceSnapshot, SimError> {
        (**self).fetch(query).await
    }
}

/// Reader used when network lookups are switched off.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineReader;

#[async_trait]
impl BalanceReader for OfflineReader {
    async fn fetch(&self, _query: &BalanceQuery) -> Result<BalanceSnapshot, SimError> {
        Err(SimError::NetworkUnavailable(
            "balance lookups disabled".to_string(),
        ))
    }
}
