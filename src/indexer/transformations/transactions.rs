use alloy_primitives::U256;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::common::EtherAmount;
use crate::models::datasets::transactions::{RawTransaction, TransformedTransactionData};
use crate::models::errors::NormalizationError;

pub trait TransactionTransformer {
    fn transform_transactions(self) -> Result<Vec<TransformedTransactionData>, NormalizationError>;
}

impl TransactionTransformer for Vec<RawTransaction> {
    /// Projects every raw record onto the output columns, keeping input order.
    /// The first bad record aborts the whole batch.
    fn transform_transactions(self) -> Result<Vec<TransformedTransactionData>, NormalizationError> {
        self.into_iter()
            .enumerate()
            .map(|(index, mut tx)| -> Result<TransformedTransactionData, NormalizationError> {
                let hash = take_string(&mut tx, "hash", index)?;
                let from = take_string(&mut tx, "from", index)?;
                // Empty for contract creations
                let to = take_string(&mut tx, "to", index)?;
                let value = take_integer_text(&mut tx, "value", index)?;
                let time_stamp = take_integer_text(&mut tx, "timeStamp", index)?;

                Ok(TransformedTransactionData {
                    hash,
                    from,
                    to,
                    value_eth: parse_wei(&value, index)?,
                    timestamp: parse_timestamp(&time_stamp, index)?,
                })
            })
            .collect()
    }
}

fn take_field(
    tx: &mut RawTransaction,
    field: &'static str,
    index: usize,
) -> Result<Value, NormalizationError> {
    match tx.remove(field) {
        None | Some(Value::Null) => Err(NormalizationError::MissingField { field, index }),
        Some(value) => Ok(value),
    }
}

fn take_string(
    tx: &mut RawTransaction,
    field: &'static str,
    index: usize,
) -> Result<String, NormalizationError> {
    match take_field(tx, field, index)? {
        Value::String(s) => Ok(s),
        other => Err(NormalizationError::InvalidField {
            field,
            index,
            value: other.to_string(),
        }),
    }
}

/// The explorer encodes integers as decimal strings; bare JSON numbers are
/// accepted as well.
fn take_integer_text(
    tx: &mut RawTransaction,
    field: &'static str,
    index: usize,
) -> Result<String, NormalizationError> {
    match take_field(tx, field, index)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(NormalizationError::InvalidField {
            field,
            index,
            value: other.to_string(),
        }),
    }
}

fn parse_wei(value: &str, index: usize) -> Result<EtherAmount, NormalizationError> {
    let invalid = || NormalizationError::InvalidField {
        field: "value",
        index,
        value: value.to_string(),
    };

    let digits = value.trim();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    U256::from_str_radix(digits, 10)
        .map(EtherAmount::from_wei)
        .map_err(|_| invalid())
}

fn parse_timestamp(time_stamp: &str, index: usize) -> Result<DateTime<Utc>, NormalizationError> {
    time_stamp
        .trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| NormalizationError::InvalidField {
            field: "timeStamp",
            index,
            value: time_stamp.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawTransaction {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    fn record(hash: &str, value: &str, time_stamp: &str) -> RawTransaction {
        raw(json!({
            "blockNumber": "14923678",
            "hash": hash,
            "from": "0x1111111111111111111111111111111111111111",
            "to": "0x2222222222222222222222222222222222222222",
            "value": value,
            "gas": "21000",
            "timeStamp": time_stamp,
            "isError": "0",
        }))
    }

    #[test]
    fn test_one_row_per_record_in_order() {
        let records = vec![
            record("0xc", "3", "300"),
            record("0xa", "1", "100"),
            record("0xb", "2", "200"),
        ];

        let rows = records.transform_transactions().unwrap();

        let hashes: Vec<&str> = rows.iter().map(|r| r.hash.as_str()).collect();
        assert_eq!(hashes, vec!["0xc", "0xa", "0xb"]);
    }

    #[test]
    fn test_value_converted_from_wei() {
        let rows = vec![
            record("0x1", "1000000000000000000", "0"),
            record("0x2", "1", "0"),
        ]
        .transform_transactions()
        .unwrap();

        assert_eq!(rows[0].value_eth.to_string(), "1.0");
        assert_eq!(rows[1].value_eth.to_string(), "0.000000000000000001");
    }

    #[test]
    fn test_value_larger_than_u128() {
        let wei = format!("1{}", "0".repeat(40));
        let rows = vec![record("0x1", &wei, "0")].transform_transactions().unwrap();

        assert_eq!(rows[0].value_eth.to_string(), format!("1{}.0", "0".repeat(22)));
    }

    #[test]
    fn test_zero_timestamp_is_epoch() {
        let rows = vec![record("0x1", "0", "0")].transform_transactions().unwrap();

        assert_eq!(rows[0].timestamp, DateTime::from_timestamp(0, 0).unwrap());
        assert_eq!(rows[0].cells()[4], "1970-01-01 00:00:00");
    }

    #[test]
    fn test_timestamp_is_utc() {
        let rows = vec![record("0x1", "0", "1700000000")]
            .transform_transactions()
            .unwrap();

        assert_eq!(rows[0].timestamp.to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }

    #[test]
    fn test_numeric_json_fields_accepted() {
        let tx = raw(json!({
            "hash": "0x1",
            "from": "0xaa",
            "to": "",
            "value": 2000000000000000000u64,
            "timeStamp": 60,
        }));

        let rows = vec![tx].transform_transactions().unwrap();

        assert_eq!(rows[0].value_eth.to_string(), "2.0");
        assert_eq!(rows[0].to, "");
        assert_eq!(rows[0].cells()[4], "1970-01-01 00:01:00");
    }

    #[test]
    fn test_missing_value_aborts_batch() {
        let mut broken = record("0x2", "1", "0");
        broken.remove("value");
        let records = vec![record("0x1", "1", "0"), broken, record("0x3", "1", "0")];

        let err = records.transform_transactions().unwrap_err();

        assert_eq!(
            err,
            NormalizationError::MissingField {
                field: "value",
                index: 1
            }
        );
    }

    #[test]
    fn test_null_field_is_missing() {
        let mut tx = record("0x1", "1", "0");
        tx.insert("from".to_string(), Value::Null);

        let err = vec![tx].transform_transactions().unwrap_err();

        assert_eq!(
            err,
            NormalizationError::MissingField {
                field: "from",
                index: 0
            }
        );
    }

    #[test]
    fn test_invalid_value_rejected() {
        for bad in ["", "-1", "1.5", "0x10", "abc"] {
            let err = vec![record("0x1", bad, "0")]
                .transform_transactions()
                .unwrap_err();
            assert!(
                matches!(err, NormalizationError::InvalidField { field: "value", index: 0, .. }),
                "expected invalid value for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn test_invalid_timestamp_rejected() {
        let err = vec![record("0x1", "1", "yesterday")]
            .transform_transactions()
            .unwrap_err();

        assert_eq!(
            err,
            NormalizationError::InvalidField {
                field: "timeStamp",
                index: 0,
                value: "yesterday".to_string()
            }
        );
    }

    #[test]
    fn test_non_string_hash_rejected() {
        let mut tx = record("0x1", "1", "0");
        tx.insert("hash".to_string(), json!(42));

        let err = vec![tx].transform_transactions().unwrap_err();

        assert!(matches!(err, NormalizationError::InvalidField { field: "hash", .. }));
    }

    #[test]
    fn test_extra_fields_dropped() {
        let rows = vec![record("0x1", "1", "0")].transform_transactions().unwrap();

        assert_eq!(
            rows[0].cells(),
            [
                "0x1".to_string(),
                "0x1111111111111111111111111111111111111111".to_string(),
                "0x2222222222222222222222222222222222222222".to_string(),
                "0.000000000000000001".to_string(),
                "1970-01-01 00:00:00".to_string(),
            ]
        );
    }
}
