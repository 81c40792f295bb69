//! Read-only TRC20 queries against a TronGrid-compatible HTTP API
//!
//! Only constant (view) contract calls are issued. Nothing here signs or
//! broadcasts a transaction.

use crate::address::Address;
use crate::amount::{from_raw_units, TokenAmount, MAX_DECIMALS};
use crate::balance::{BalanceQuery, BalanceReader, BalanceSnapshot};
use crate::config::NetworkConfig;
use crate::error::SimError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tracing::debug;

/// Version byte of mainnet account addresses.
const ADDRESS_VERSION: u8 = 0x41;
const DECODED_ADDRESS_LEN: usize = 25;
const WORD_HEX_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum TronApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API returned status {0}")]
    Status(u16),
    #[error("contract call rejected: {0}")]
    Rejected(String),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("cannot encode address {0}: {1}")]
    Address(String, String),
}

impl From<TronApiError> for SimError {
    fn from(err: TronApiError) -> Self {
        SimError::NetworkUnavailable(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct TriggerRequest<'a> {
    owner_address: &'a str,
    contract_address: &'a str,
    function_selector: &'a str,
    #[serde(skip_serializing_if = "String::is_empty")]
    parameter: String,
    visible: bool,
}

#[derive(Debug, Deserialize)]
struct TriggerResponse {
    #[serde(default)]
    result: Option<TriggerResult>,
    #[serde(default)]
    constant_result: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TriggerResult {
    #[serde(default)]
    result: bool,
    #[serde(default)]
    message: Option<String>,
}

pub struct TronGridReader {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl TronGridReader {
    pub fn new(config: &NetworkConfig) -> Result<Self, SimError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(TronApiError::from)?;
        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.is_empty()),
        })
    }

    async fn call(
        &self,
        owner: &Address,
        contract: &str,
        selector: &str,
        parameter: String,
    ) -> Result<String, TronApiError> {
        let url = format!("{}/wallet/triggerconstantcontract", self.base_url);
        let body = TriggerRequest {
            owner_address: owner.as_str(),
            contract_address: contract,
            function_selector: selector,
            parameter,
            visible: true,
        };
        debug!("POST {} {}", url, selector);

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("TRON-PRO-API-KEY", key);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(TronApiError::Status(response.status().as_u16()));
        }

        let parsed: TriggerResponse = response.json().await?;
        first_constant_result(parsed)
    }

    async fn balance_of(
        &self,
        contract: &str,
        holder: &Address,
        decimals: u8,
    ) -> Result<TokenAmount, TronApiError> {
        let raw = self
            .call(holder, contract, "balanceOf(address)", encode_address_param(holder)?)
            .await?;
        let units = decode_uint(&raw)?;
        from_raw_units(units, decimals).ok_or_else(|| {
            TronApiError::Malformed(format!("balance {} does not fit the amount type", units))
        })
    }
}

#[async_trait]
impl BalanceReader for TronGridReader {
    async fn fetch(&self, query: &BalanceQuery) -> Result<BalanceSnapshot, SimError> {
        let owner = &query.source;

        let symbol = decode_string(
            &self
                .call(owner, &query.contract, "symbol()", String::new())
                .await?,
        )?;
        let decimals = decode_uint(
            &self
                .call(owner, &query.contract, "decimals()", String::new())
                .await?,
        )?;
        let decimals = u8::try_from(decimals)
            .ok()
            .filter(|d| *d <= MAX_DECIMALS)
            .ok_or_else(|| TronApiError::Malformed(format!("unsupported decimals {}", decimals)))?;

        let source_balance = self
            .balance_of(&query.contract, &query.source, decimals)
            .await?;
        let destination_balance = self
            .balance_of(&query.contract, &query.destination, decimals)
            .await?;

        Ok(BalanceSnapshot {
            symbol,
            decimals,
            source_balance,
            destination_balance,
        })
    }
}

fn first_constant_result(response: TriggerResponse) -> Result<String, TronApiError> {
    if let Some(result) = response.result {
        if !result.result {
            let message = result
                .message
                .map(|m| decode_api_message(&m))
                .unwrap_or_else(|| "no message".to_string());
            return Err(TronApiError::Rejected(message));
        }
    }
    response
        .constant_result
        .into_iter()
        .next()
        .ok_or_else(|| TronApiError::Malformed("missing constant_result".to_string()))
}

/// Error messages are usually hex encoded UTF-8; fall back to the raw text.
fn decode_api_message(message: &str) -> String {
    hex::decode(message)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| message.to_string())
}

/// Decodes a base58check address into its 21 byte form (version + account id).
pub fn decode_address(address: &Address) -> Result<[u8; 21], TronApiError> {
    let invalid = |reason: &str| TronApiError::Address(address.to_string(), reason.to_string());

    let decoded = bs58::decode(address.as_str())
        .into_vec()
        .map_err(|e| invalid(&e.to_string()))?;
    if decoded.len() != DECODED_ADDRESS_LEN {
        return Err(invalid(&format!(
            "expected {} bytes, got {}",
            DECODED_ADDRESS_LEN,
            decoded.len()
        )));
    }

    let (payload, checksum) = decoded.split_at(21);
    let digest = Sha256::digest(Sha256::digest(payload));
    if &digest[..4] != checksum {
        return Err(invalid("checksum mismatch"));
    }
    if payload[0] != ADDRESS_VERSION {
        return Err(invalid("unexpected version byte"));
    }

    let mut out = [0u8; 21];
    out.copy_from_slice(payload);
    Ok(out)
}

/// ABI encoding of an `address` argument: the 20 byte account id left-padded to 32 bytes.
pub fn encode_address_param(address: &Address) -> Result<String, TronApiError> {
    let bytes = decode_address(address)?;
    Ok(format!("{:0>64}", hex::encode(&bytes[1..])))
}

fn decode_words(raw: &str) -> Result<Vec<u8>, TronApiError> {
    let bytes = hex::decode(raw.trim_start_matches("0x"))
        .map_err(|e| TronApiError::Malformed(format!("invalid hex: {}", e)))?;
    if bytes.is_empty() || bytes.len() % 32 != 0 {
        return Err(TronApiError::Malformed(format!(
            "result is {} bytes, not a whole number of words",
            bytes.len()
        )));
    }
    Ok(bytes)
}

/// Decodes the first word of an ABI result as an unsigned integer.
pub fn decode_uint(raw: &str) -> Result<u128, TronApiError> {
    if raw.trim_start_matches("0x").len() < WORD_HEX_LEN {
        return Err(TronApiError::Malformed("uint result too short".to_string()));
    }
    let bytes = decode_words(raw)?;
    let word = &bytes[..32];
    if word[..16].iter().any(|b| *b != 0) {
        return Err(TronApiError::Malformed(
            "uint value exceeds 128 bits".to_string(),
        ));
    }
    let mut low = [0u8; 16];
    low.copy_from_slice(&word[16..]);
    Ok(u128::from_be_bytes(low))
}

/// Decodes a dynamic ABI `string` return value.
pub fn decode_string(raw: &str) -> Result<String, TronApiError> {
    let bytes = decode_words(raw)?;
    let out_of_range = |what: &str| TronApiError::Malformed(format!("string {} out of range", what));
    let word_at = |offset: usize| -> Result<usize, TronApiError> {
        let end = offset.checked_add(32).ok_or_else(|| out_of_range("offset"))?;
        let word = bytes.get(offset..end).ok_or_else(|| out_of_range("offset"))?;
        if word[..24].iter().any(|b| *b != 0) {
            return Err(TronApiError::Malformed("string header too large".to_string()));
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&word[24..]);
        usize::try_from(u64::from_be_bytes(low)).map_err(|_| out_of_range("header"))
    };

    let offset = word_at(0)?;
    let len = word_at(offset)?;
    let data = offset
        .checked_add(32)
        .and_then(|start| Some(start..start.checked_add(len)?))
        .and_then(|range| bytes.get(range))
        .ok_or_else(|| out_of_range("length"))?;
    String::from_utf8(data.to_vec())
        .map_err(|e| TronApiError::Malformed(format!("string is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const USDT_CONTRACT: &str = "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t";

    fn word(n: u128) -> String {
        format!("{:064x}", n)
    }

    #[test]
    fn test_decode_known_address() {
        let addr = Address::parse(USDT_CONTRACT).unwrap();
        let bytes = decode_address(&addr).unwrap();
        assert_eq!(
            hex::encode(bytes),
            "41a614f803b6fd780986a42c78ec9c7f77e6ded13c"
        );
    }

    #[test]
    fn test_encode_address_param() {
        let addr = Address::parse(USDT_CONTRACT).unwrap();
        let param = encode_address_param(&addr).unwrap();
        assert_eq!(param.len(), 64);
        assert_eq!(
            param,
            "000000000000000000000000a614f803b6fd780986a42c78ec9c7f77e6ded13c"
        );
    }

    #[test]
    fn test_placeholder_address_is_not_decodable() {
        let addr = Address::parse("TXXXXXXXXXXXXXXXXXXXXXXXXXXXXXXX").unwrap();
        assert!(matches!(
            decode_address(&addr),
            Err(TronApiError::Address(_, _))
        ));
        // Not base58 at all
        let addr = Address::parse(&format!("T{}", "0".repeat(33))).unwrap();
        assert!(decode_address(&addr).is_err());
    }

    #[test]
    fn test_decode_uint() {
        assert_eq!(decode_uint(&word(6)).unwrap(), 6);
        assert_eq!(decode_uint(&word(12_500_000)).unwrap(), 12_500_000);
        assert!(decode_uint("").is_err());
        assert!(decode_uint("zz").is_err());
        let too_big = format!("{}{}", "01", "0".repeat(62));
        assert!(decode_uint(&too_big).is_err());
    }

    #[test]
    fn test_decode_string() {
        let encoded = format!(
            "{}{}{:0<64}",
            word(32),
            word(4),
            hex::encode("USDT")
        );
        assert_eq!(decode_string(&encoded).unwrap(), "USDT");
    }

    #[test]
    fn test_decode_string_out_of_range() {
        let encoded = format!("{}{}", word(32), word(40));
        assert!(decode_string(&encoded).is_err());
        let encoded = word(4096);
        assert!(decode_string(&encoded).is_err());
    }

    #[test]
    fn test_decode_string_huge_header_words() {
        let offset_max = format!("{:0>64}", "ffffffffffffffff");
        assert!(matches!(
            decode_string(&offset_max),
            Err(TronApiError::Malformed(_))
        ));

        let len_max = format!("{}{:0>64}", word(32), "ffffffffffffffff");
        assert!(matches!(
            decode_string(&len_max),
            Err(TronApiError::Malformed(_))
        ));

        let len_near_max = format!("{}{:0>64}", word(32), "ffffffffffffffe0");
        assert!(decode_string(&len_near_max).is_err());
    }

    #[test]
    fn test_rejected_call_message() {
        let response = TriggerResponse {
            result: Some(TriggerResult {
                result: false,
                message: Some(hex::encode("contract validate error")),
            }),
            constant_result: vec![],
        };
        let err = first_constant_result(response).unwrap_err();
        assert_eq!(
            err.to_string(),
            "contract call rejected: contract validate error"
        );
    }

    #[test]
    fn test_missing_constant_result() {
        let response: TriggerResponse =
            serde_json::from_str(r#"{"result":{"result":true}}"#).unwrap();
        assert!(matches!(
            first_constant_result(response),
            Err(TronApiError::Malformed(_))
        ));
    }

    #[test]
    fn test_error_downgrades_to_network_unavailable() {
        let err: SimError = TronApiError::Status(503).into();
        assert_eq!(err, SimError::NetworkUnavailable("API returned status 503".to_string()));
    }

    // Address with account id 0x1111...11
    const HOLDER: &str = "TBXSw8fM4jpQkGc6zZjsVABFpVN7UvXPdV";

    struct Recorded {
        head: String,
        body: serde_json::Value,
    }

    type Log = Arc<Mutex<Vec<Recorded>>>;

    /// Serves `/wallet/triggerconstantcontract` on a local port. Every
    /// request is logged and answered with `status` and `reply(body)`.
    async fn spawn_node(status: u16, reply: fn(&serde_json::Value) -> String) -> (String, Log) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let log: Log = Arc::new(Mutex::new(Vec::new()));
        let seen = log.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 1024];
                let mut head_end = None;
                while head_end.is_none() {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                    head_end = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4);
                }
                let Some(head_end) = head_end else { continue };

                let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
                let len = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|v| v.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                while buf.len() < head_end + len {
                    let n = socket.read(&mut chunk).await.unwrap_or(0);
                    if n == 0 {
                        break;
                    }
                    buf.extend_from_slice(&chunk[..n]);
                }

                let body = serde_json::from_slice(&buf[head_end..]).unwrap_or(serde_json::Value::Null);
                let payload = reply(&body);
                seen.lock().unwrap().push(Recorded { head, body });

                let response = format!(
                    "HTTP/1.1 {} Stub\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    status,
                    payload.len(),
                    payload
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        (url, log)
    }

    fn usdt_node(body: &serde_json::Value) -> String {
        let holder_param = format!("{:0>64}", "11".repeat(20));
        let result = match body["function_selector"].as_str().unwrap_or_default() {
            "symbol()" => format!("{}{}{:0<64}", word(32), word(4), hex::encode("USDT")),
            "decimals()" => word(6),
            "balanceOf(address)" if body["parameter"] == holder_param.as_str() => word(3_000_000),
            "balanceOf(address)" => word(12_500_000),
            _ => String::new(),
        };
        serde_json::json!({ "result": { "result": true }, "constant_result": [result] }).to_string()
    }

    fn reader_for(url: String, api_key: Option<&str>) -> TronGridReader {
        TronGridReader::new(&NetworkConfig {
            enabled: true,
            api_url: format!("{}/", url),
            timeout_secs: 5,
            api_key: api_key.map(str::to_string),
        })
        .unwrap()
    }

    fn usdt_query() -> BalanceQuery {
        BalanceQuery {
            contract: USDT_CONTRACT.to_string(),
            source: Address::parse(USDT_CONTRACT).unwrap(),
            destination: Address::parse(HOLDER).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_fetch_over_http() {
        let (url, log) = spawn_node(200, usdt_node).await;
        let reader = reader_for(url, Some("test-key"));

        let snapshot = reader.fetch(&usdt_query()).await.unwrap();
        assert_eq!(snapshot.symbol, "USDT");
        assert_eq!(snapshot.decimals, 6);
        assert_eq!(snapshot.source_balance, TokenAmount::from_num(12.5));
        assert_eq!(snapshot.destination_balance, TokenAmount::from_num(3));

        let log = log.lock().unwrap();
        let selectors: Vec<_> = log
            .iter()
            .map(|r| r.body["function_selector"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            selectors,
            ["symbol()", "decimals()", "balanceOf(address)", "balanceOf(address)"]
        );
        for request in log.iter() {
            assert!(request.head.starts_with("post /wallet/triggerconstantcontract "));
            assert!(request.head.contains("tron-pro-api-key: test-key"));
            assert_eq!(request.body["visible"], true);
            assert_eq!(request.body["owner_address"], USDT_CONTRACT);
            assert_eq!(request.body["contract_address"], USDT_CONTRACT);
        }
        assert!(log[0].body.get("parameter").is_none());
        assert_eq!(
            log[2].body["parameter"],
            "000000000000000000000000a614f803b6fd780986a42c78ec9c7f77e6ded13c"
        );
        assert_eq!(log[3].body["parameter"], format!("{:0>64}", "11".repeat(20)).as_str());
    }

    #[tokio::test]
    async fn test_fetch_without_api_key_omits_header() {
        let (url, log) = spawn_node(200, usdt_node).await;
        let reader = reader_for(url, Some(""));

        reader.fetch(&usdt_query()).await.unwrap();
        assert!(log
            .lock()
            .unwrap()
            .iter()
            .all(|r| !r.head.contains("tron-pro-api-key")));
    }

    #[tokio::test]
    async fn test_fetch_error_status() {
        let (url, log) = spawn_node(503, |_| "{}".to_string()).await;
        let reader = reader_for(url, None);

        let err = reader.fetch(&usdt_query()).await.unwrap_err();
        assert_eq!(
            err,
            SimError::NetworkUnavailable("API returned status 503".to_string())
        );
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let (url, _log) = spawn_node(200, |_| "not json".to_string()).await;
        let reader = reader_for(url, None);

        let err = reader.fetch(&usdt_query()).await.unwrap_err();
        assert!(matches!(err, SimError::NetworkUnavailable(_)));
    }

    #[tokio::test]
    async fn test_fetch_rejected_call() {
        let (url, _log) = spawn_node(200, |_| {
            serde_json::json!({
                "result": { "result": false, "message": hex::encode("contract validate error") }
            })
            .to_string()
        })
        .await;
        let reader = reader_for(url, None);

        let err = reader.fetch(&usdt_query()).await.unwrap_err();
        assert_eq!(
            err,
            SimError::NetworkUnavailable(
                "contract call rejected: contract validate error".to_string()
            )
        );
    }
}
