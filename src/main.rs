use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{self, EnvFilter};

use eth_tx_exporter::indexer;
use eth_tx_exporter::models::common::Config;
use eth_tx_exporter::models::datasets::transactions::{
    TRANSACTION_COLUMNS, TransformedTransactionData,
};
use eth_tx_exporter::models::errors::PipelineError;
use eth_tx_exporter::utils::load_config;

const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Export the transaction history of an Ethereum address to CSV
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Wallet address to export. Overrides `address` from the config file
    #[arg(short, long)]
    address: Option<String>,

    /// YAML config file. Without this flag `config.yml` is used when present
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// File holding the explorer API key
    #[arg(long)]
    api_key_file: Option<PathBuf>,

    /// Output CSV path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Number of rows to print after the export
    #[arg(long)]
    preview: Option<usize>,
}

impl Cli {
    fn apply(self, config: &mut Config) {
        if let Some(address) = self.address {
            config.address = Some(address);
        }
        if let Some(api_key_file) = self.api_key_file {
            config.api_key_file = api_key_file;
        }
        if let Some(output) = self.output {
            config.output_file = output;
        }
        if let Some(preview) = self.preview {
            config.preview_rows = preview;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();

    // Load config. An explicitly named file must exist
    let loaded = match &cli.config {
        Some(path) => load_config(path, true),
        None => load_config(DEFAULT_CONFIG_FILE, false),
    };
    let mut config = match loaded {
        Ok(config) => {
            info!("Config loaded successfully");
            config
        }
        Err(e) => {
            let err = PipelineError::Config(format!("{:#}", e));
            error!("{}", err);
            return ExitCode::from(err.exit_code());
        }
    };
    cli.apply(&mut config);

    match indexer::process_address(&config).await {
        Ok(summary) => {
            println!("Fetched {} transactions", summary.transactions.len());
            println!(
                "{}",
                render_preview(&summary.transactions, config.preview_rows)
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// First `limit` rows as a left-aligned text table with a row index column.
fn render_preview(rows: &[TransformedTransactionData], limit: usize) -> String {
    let index_header = String::new();
    let header: Vec<String> = std::iter::once(index_header)
        .chain(TRANSACTION_COLUMNS.iter().map(|c| c.to_string()))
        .collect();
    let body: Vec<Vec<String>> = rows
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, row)| std::iter::once(i.to_string()).chain(row.cells()).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for line in &body {
        for (width, cell) in widths.iter_mut().zip(line) {
            *width = (*width).max(cell.len());
        }
    }

    std::iter::once(&header)
        .chain(&body)
        .map(|line| {
            line.iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{:<width$}", cell, width = width))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
