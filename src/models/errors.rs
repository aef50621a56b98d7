use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error(
        "API key file '{}' not found. Please create it with your Etherscan API key.",
        .path.display()
    )]
    NotFound { path: PathBuf },
    #[error("Cannot read API key file '{}': {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("API key file '{}' is empty", .path.display())]
    Empty { path: PathBuf },
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Error fetching transactions: {detail}")]
    Transport { detail: String },
    #[error("Explorer API rejected the request: {message}")]
    ApiRejected { message: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("Missing required field '{field}' in transaction #{index}")]
    MissingField { field: &'static str, index: usize },
    #[error("Invalid value for field '{field}' in transaction #{index}: {value}")]
    InvalidField {
        field: &'static str,
        index: usize,
        value: String,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error while writing output: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error while writing output: {0}")]
    Csv(#[from] csv::Error),
}

/// Every way a run can fail. `main` turns these into an exit code.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Normalization(#[from] NormalizationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl PipelineError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 1,
            Self::Credential(_) => 2,
            Self::Fetch(_) => 3,
            Self::Normalization(_) => 4,
            Self::Storage(_) => 5,
        }
    }
}
