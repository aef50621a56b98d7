pub mod transformations;

use std::error::Error as _;
use std::str::FromStr;
use std::time::Duration;

use alloy_primitives::Address;
use reqwest::Client;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use crate::indexer::transformations::transactions::TransactionTransformer;
use crate::models::common::{ApiConfig, ApiKey, Config, RunSummary};
use crate::models::datasets::transactions::{RawTransaction, TRANSACTION_COLUMNS, TxListResponse};
use crate::models::errors::{FetchError, PipelineError};
use crate::storage::csv::write_csv;
use crate::utils::{load_api_key, strip_html};

/// Status value the explorer uses for a successful call.
const STATUS_OK: &str = "1";

pub fn build_client(api: &ApiConfig) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(Duration::from_secs(api.request_timeout_secs))
        .build()
        .map_err(transport_error)
}

/// Fetches the full `txlist` for `address` in one request.
///
/// Transport problems (connection, timeout, non-2xx, undecodable body) come
/// back as `FetchError::Transport`; a response whose `status` is not `"1"`
/// comes back as `FetchError::ApiRejected`. Records are returned unparsed.
pub async fn fetch_transactions(
    client: &Client,
    api: &ApiConfig,
    address: &str,
    api_key: &ApiKey,
) -> Result<Vec<RawTransaction>, FetchError> {
    let start_block = api.start_block.to_string();
    let end_block = api.end_block.to_string();
    let params = [
        ("module", "account"),
        ("action", "txlist"),
        ("address", address),
        ("startblock", start_block.as_str()),
        ("endblock", end_block.as_str()),
        ("sort", api.sort.as_str()),
        ("apikey", api_key.expose()),
    ];

    info!(
        "Requesting txlist for {} (blocks {} to {}) from {}",
        address, api.start_block, api.end_block, api.base_url
    );

    let response = client
        .get(&api.base_url)
        .query(&params)
        .send()
        .await
        .map_err(transport_error)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        warn!("Explorer responded with HTTP {}", status);
        return Err(FetchError::Transport {
            detail: format!("HTTP {}: {}", status, strip_html(body.trim())),
        });
    }

    let envelope: TxListResponse = response.json().await.map_err(transport_error)?;

    if envelope.status != STATUS_OK {
        let message = match envelope.result {
            Value::String(reason) if !reason.is_empty() && reason != envelope.message => {
                format!("{} ({})", envelope.message, reason)
            }
            _ => envelope.message,
        };
        warn!("Explorer rejected txlist request: {}", message);
        return Err(FetchError::ApiRejected { message });
    }

    match envelope.result {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::Object(tx) => Ok(tx),
                other => Err(FetchError::ApiRejected {
                    message: format!("result entry #{} is not a transaction object: {}", i, other),
                }),
            })
            .collect(),
        other => Err(FetchError::ApiRejected {
            message: format!("unexpected result payload: {}", other),
        }),
    }
}

/// Runs the whole export for the configured address: API key, fetch,
/// normalize, write. Nothing is written unless every step succeeds.
pub async fn process_address(config: &Config) -> Result<RunSummary, PipelineError> {
    let address = config.address.as_deref().ok_or_else(|| {
        PipelineError::Config(
            "no wallet address configured (use --address or ETHTX_ADDRESS)".to_string(),
        )
    })?;
    Address::from_str(address)
        .map_err(|e| PipelineError::Config(format!("invalid address '{}': {}", address, e)))?;
    Url::parse(&config.api.base_url).map_err(|e| {
        PipelineError::Config(format!("invalid API base URL '{}': {}", config.api.base_url, e))
    })?;
    if config.api.request_timeout_secs == 0 {
        return Err(PipelineError::Config(
            "api.request_timeout_secs must be greater than 0".to_string(),
        ));
    }

    let api_key = load_api_key(&config.api_key_file)?;

    let client = build_client(&config.api)?;
    let raw_transactions = fetch_transactions(&client, &config.api, address, &api_key).await?;
    info!("Received {} transactions from explorer", raw_transactions.len());

    let transactions = raw_transactions.transform_transactions()?;

    write_csv(&config.output_file, &TRANSACTION_COLUMNS, &transactions)?;
    info!(
        "Wrote {} rows to {}",
        transactions.len(),
        config.output_file.to_string_lossy()
    );

    Ok(RunSummary {
        output_file: config.output_file.clone(),
        transactions,
    })
}

/// Flattens a reqwest error and its causes into one line. The request URL is
/// dropped since it carries the API key.
fn transport_error(e: reqwest::Error) -> FetchError {
    let e = e.without_url();
    let mut detail = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    FetchError::Transport { detail }
}
