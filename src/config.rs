//! Configuration management for the transfer simulator

use crate::amount::MAX_DECIMALS;
use crate::error::SimError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "transfer-sim.toml";
const MAX_STEPS: u32 = 20;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub transfer: TransferConfig,
    #[serde(default)]
    pub token: TokenConfig,
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Fixed request used by the non-interactive binary. The interactive one only
/// takes `from` from here.
#[derive(Debug, Clone, Deserialize)]
pub struct TransferConfig {
    #[serde(default = "default_from")]
    pub from: String,
    #[serde(default = "default_to")]
    pub to: String,
    #[serde(default = "default_amount")]
    pub amount: String,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            from: default_from(),
            to: default_to(),
            amount: default_amount(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    #[serde(default = "default_contract")]
    pub contract: String,
    /// Shown when the contract cannot be queried
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            contract: default_contract(),
            symbol: default_symbol(),
            decimals: default_decimals(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_url: default_api_url(),
            timeout_secs: default_timeout(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_steps")]
    pub steps: u32,
    /// Pause between progress ticks, e.g. "400ms" or "1s"
    #[serde(default = "default_step_delay")]
    pub step_delay: String,
    #[serde(default)]
    pub txid_prefix: Option<String>,
    #[serde(default)]
    pub confirm: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            step_delay: default_step_delay(),
            txid_prefix: None,
            confirm: false,
        }
    }
}

impl SimulationConfig {
    pub fn step_delay(&self) -> Result<Duration, SimError> {
        humantime::parse_duration(self.step_delay.trim()).map_err(|e| {
            SimError::Config(format!(
                "simulation.step_delay '{}' is not a duration: {}",
                self.step_delay, e
            ))
        })
    }

    pub fn txid_prefix(&self) -> Option<&str> {
        self.txid_prefix.as_deref().filter(|p| !p.is_empty())
    }
}

fn default_from() -> String {
    "TYYYYYYYYYYYYYYYYYYYYYYYYYYYYYYY".to_string()
}

fn default_to() -> String {
    "TXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX".to_string()
}

fn default_amount() -> String {
    "10.0".to_string()
}

fn default_contract() -> String {
    "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t".to_string()
}

fn default_symbol() -> String {
    "USDT".to_string()
}

fn default_decimals() -> u8 {
    6
}

fn default_enabled() -> bool {
    true
}

fn default_api_url() -> String {
    "https://api.trongrid.io".to_string()
}

fn default_timeout() -> u64 {
    10
}

fn default_steps() -> u32 {
    3
}

fn default_step_delay() -> String {
    "500ms".to_string()
}

/// Per-user config location, e.g. `~/.config/transfer-sim/config.toml`.
pub fn get_user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("transfer-sim").join("config.toml"))
}

/// Loads configuration from `path`, or from the first of
/// `./transfer-sim.toml` and the per-user path that exists. Falls back to
/// built-in defaults when no file is found.
pub fn load_config(path: Option<&Path>) -> Result<Config, SimError> {
    let config = match path {
        Some(explicit) => parse_file(explicit)?,
        None => {
            let candidates = std::iter::once(PathBuf::from(CONFIG_FILE_NAME))
                .chain(get_user_config_path());
            let mut found = None;
            for candidate in candidates {
                if candidate.is_file() {
                    found = Some(parse_file(&candidate)?);
                    break;
                }
            }
            found.unwrap_or_default()
        }
    };

    validate(&config)?;
    Ok(config)
}

/// Parses configuration text without touching the filesystem.
pub fn parse_config(text: &str) -> Result<Config, SimError> {
    let config: Config = toml::from_str(text)?;
    validate(&config)?;
    Ok(config)
}

fn parse_file(path: &Path) -> Result<Config, SimError> {
    let text = fs::read_to_string(path).map_err(|e| {
        SimError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    Ok(toml::from_str(&text)?)
}

// Validate critical values
fn validate(config: &Config) -> Result<(), SimError> {
    if config.token.decimals > MAX_DECIMALS {
        return Err(SimError::Config(format!(
            "token.decimals must be at most {}",
            MAX_DECIMALS
        )));
    }

    if config.token.contract.trim().is_empty() {
        return Err(SimError::Config("token.contract must be set".into()));
    }

    if config.network.enabled {
        if config.network.api_url.trim().is_empty() {
            return Err(SimError::Config(
                "network.api_url must be set when network.enabled = true".into(),
            ));
        }
        if config.network.timeout_secs == 0 {
            return Err(SimError::Config(
                "network.timeout_secs must be greater than zero".into(),
            ));
        }
    }

    if config.simulation.steps > MAX_STEPS {
        return Err(SimError::Config(format!(
            "simulation.steps must be at most {}",
            MAX_STEPS
        )));
    }

    config.simulation.step_delay()?;
    Ok(())
}
