//! transfer-sim - a token transfer simulator that never moves funds
//!
//! # Architecture
//!
//! ## Request & Receipt
//! - [`address`] - Address validation (prefix and length only)
//! - [`amount`] - Fixed-point token amounts
//! - [`txid`] - Random receipt identifiers
//! - [`receipt`] - Transfer requests and simulated receipts
//!
//! ## Capabilities
//! - [`balance`] - Balance snapshots and the `BalanceReader` capability
//! - [`tron`] - Read-only TronGrid reader
//! - [`prompt`] - Interactive input and the `PromptSource` capability
//!
//! ## Simulation
//! - [`simulator`] - The simulation state machine and report
//!
//! ## Configuration & Utilities
//! - [`cli`] - Helpers shared by the binaries
//! - [`config`] - Configuration management
//! - [`error`] - Error types
//! - [`logging`] - Diagnostic logging setup

#![forbid(unsafe_code)]

// ============================================================================
// Request & Receipt
// ============================================================================
pub mod address;
pub mod amount;
pub mod receipt;
pub mod txid;

// ============================================================================
// Capabilities
// ============================================================================
pub mod balance;
pub mod prompt;
pub mod tron;

// ============================================================================
// Simulation
// ============================================================================
pub mod simulator;

// ============================================================================
// Configuration & Utilities
// ============================================================================
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
