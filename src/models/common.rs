use std::fmt;
use std::path::PathBuf;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize, Serializer};

use crate::models::datasets::transactions::TransformedTransactionData;

pub const DEFAULT_BASE_URL: &str = "https://api.etherscan.io/api";
pub const DEFAULT_API_KEY_FILE: &str = ".apikey";
pub const DEFAULT_OUTPUT_FILE: &str = "ethereum_transactions.csv";
pub const DEFAULT_PREVIEW_ROWS: usize = 5;
pub const DEFAULT_START_BLOCK: u64 = 0;
pub const DEFAULT_END_BLOCK: u64 = 99_999_999;
pub const DEFAULT_SORT: &str = "asc";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 10^18 wei per ether.
pub const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;
const ETHER_DECIMALS: usize = 18;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub start_block: u64,
    pub end_block: u64,
    pub sort: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            start_block: DEFAULT_START_BLOCK,
            end_block: DEFAULT_END_BLOCK,
            sort: DEFAULT_SORT.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub address: Option<String>,
    pub api_key_file: PathBuf,
    pub output_file: PathBuf,
    pub preview_rows: usize,
    pub api: ApiConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: None,
            api_key_file: PathBuf::from(DEFAULT_API_KEY_FILE),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            preview_rows: DEFAULT_PREVIEW_ROWS,
            api: ApiConfig::default(),
        }
    }
}

/// Explorer API key. Kept out of `Debug` output so it never lands in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// An exact ether amount backed by its wei value.
///
/// Displays as `<whole>.<fraction>` with trailing zeros trimmed and at least
/// one fractional digit, e.g. `1.0` or `0.000000000000000001`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct EtherAmount(U256);

impl EtherAmount {
    pub fn from_wei(wei: U256) -> Self {
        Self(wei)
    }
}

impl fmt::Display for EtherAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unit = U256::from(WEI_PER_ETHER);
        let whole = self.0 / unit;
        let fraction = format!("{:0>width$}", (self.0 % unit).to_string(), width = ETHER_DECIMALS);
        let fraction = fraction.trim_end_matches('0');
        let fraction = if fraction.is_empty() { "0" } else { fraction };
        write!(f, "{whole}.{fraction}")
    }
}

impl Serialize for EtherAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Result of a successful export run.
#[derive(Debug)]
pub struct RunSummary {
    pub output_file: PathBuf,
    pub transactions: Vec<TransformedTransactionData>,
}
