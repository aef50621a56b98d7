use anyhow::{Context, Result};
use config::{Environment, File, FileFormat};
use std::{fs, io, path::Path};
use tracing::info;

use crate::models::common::{
    ApiKey, Config, DEFAULT_API_KEY_FILE, DEFAULT_BASE_URL, DEFAULT_END_BLOCK,
    DEFAULT_OUTPUT_FILE, DEFAULT_PREVIEW_ROWS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SORT,
    DEFAULT_START_BLOCK,
};
use crate::models::errors::CredentialError;

const ENV_PREFIX: &str = "ETHTX";

/// Loads the run configuration: built-in defaults, then the YAML file at
/// `file_name`, then `ETHTX_*` environment variables (`ETHTX_API__BASE_URL`
/// sets `api.base_url`). The file is parsed as YAML whatever its extension.
/// A missing file is an error only when `required` is set.
pub fn load_config<P: AsRef<Path>>(file_name: P, required: bool) -> Result<Config> {
    build_config(file_name.as_ref(), required, None)
}

fn build_config(
    config_path: &Path,
    required: bool,
    env_source: Option<config::Map<String, String>>,
) -> Result<Config> {
    if config_path.is_file() {
        info!("Config path: {}", config_path.to_string_lossy());
    } else if !required {
        info!(
            "No config file at {}, using defaults and environment",
            config_path.to_string_lossy()
        );
    }

    let settings = config::Config::builder()
        .set_default("api_key_file", DEFAULT_API_KEY_FILE)?
        .set_default("output_file", DEFAULT_OUTPUT_FILE)?
        .set_default("preview_rows", DEFAULT_PREVIEW_ROWS as u64)?
        .set_default("api.base_url", DEFAULT_BASE_URL)?
        .set_default("api.start_block", DEFAULT_START_BLOCK)?
        .set_default("api.end_block", DEFAULT_END_BLOCK)?
        .set_default("api.sort", DEFAULT_SORT)?
        .set_default("api.request_timeout_secs", DEFAULT_REQUEST_TIMEOUT_SECS)?
        .add_source(
            File::from(config_path)
                .format(FileFormat::Yaml)
                .required(required),
        )
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env_source),
        )
        .build()
        .with_context(|| format!("failed to read config {}", config_path.to_string_lossy()))?;

    let mut config: Config = settings
        .try_deserialize()
        .context("failed to parse config")?;

    // Blank address in a template config means "not set"
    config.address = config
        .address
        .map(|address| address.trim().to_string())
        .filter(|address| !address.is_empty());

    Ok(config)
}

/// Reads the explorer API key from `path`, trimming surrounding whitespace.
/// The file is closed before this returns.
pub fn load_api_key<P: AsRef<Path>>(path: P) -> Result<ApiKey, CredentialError> {
    let path = path.as_ref();

    let contents = fs::read_to_string(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => CredentialError::NotFound {
            path: path.to_path_buf(),
        },
        _ => CredentialError::Unreadable {
            path: path.to_path_buf(),
            source: e,
        },
    })?;

    let key = contents.trim();
    if key.is_empty() {
        return Err(CredentialError::Empty {
            path: path.to_path_buf(),
        });
    }

    info!("API key loaded from {}", path.to_string_lossy());
    Ok(ApiKey::new(key))
}

pub fn strip_html(error: &str) -> String {
    // If the error contains HTML tags, extract just the text content
    if error.contains("<!doctype html>") || error.contains("<html>") {
        // Remove all HTML tags and return the first non-empty line of text
        error
            .lines()
            .map(|line| line.trim())
            .find(|line| {
                !line.starts_with('<')
                    && !line.ends_with('>')
                    && !line.is_empty()
                    && !line.starts_with("<!")
                    && *line != "html"
                    && *line != "body"
            })
            .unwrap_or(error)
            .to_string()
    } else {
        error.to_string()
    }
}
