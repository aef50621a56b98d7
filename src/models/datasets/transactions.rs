use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::models::common::EtherAmount;

/// Output column order of the exported table.
pub const TRANSACTION_COLUMNS: [&str; 5] = ["hash", "from", "to", "value_eth", "timestamp"];

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

////////////////////////////////////// API Data ////////////////////////////////////////
/////////////////////////////////// account/txlist /////////////////////////////////////

/// A single `txlist` entry exactly as the explorer returned it.
pub type RawTransaction = Map<String, Value>;

/// Envelope of every explorer response. `result` is an array of transactions
/// on success and usually a string describing the problem otherwise.
#[derive(Debug, Deserialize)]
pub struct TxListResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub result: Value,
}

//////////////////////////////////// Output Data ///////////////////////////////////////

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformedTransactionData {
    pub hash: String,
    pub from: String,
    pub to: String,
    pub value_eth: EtherAmount,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl TransformedTransactionData {
    /// Cell values in `TRANSACTION_COLUMNS` order, as they are written out.
    pub fn cells(&self) -> [String; 5] {
        [
            self.hash.clone(),
            self.from.clone(),
            self.to.clone(),
            self.value_eth.to_string(),
            self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        ]
    }
}

fn serialize_timestamp<S: Serializer>(
    timestamp: &DateTime<Utc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
}
