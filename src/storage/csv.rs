use std::path::Path;

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::models::errors::StorageError;

/// Writes `rows` as comma-separated text with a `columns` header line and no
/// index column.
///
/// The data goes to a temporary file next to `path` which is renamed into
/// place only after every row has been written, so a failure leaves any
/// previous file untouched and never produces a partial one.
pub fn write_csv<T: Serialize>(
    path: impl AsRef<Path>,
    columns: &[&str],
    rows: &[T],
) -> Result<(), StorageError> {
    let path = path.as_ref();

    if rows.is_empty() {
        info!("No rows to write, {} will only contain the header", path.to_string_lossy());
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    debug!("Staging CSV output in {}", tmp.path().to_string_lossy());

    {
        // Header is written by hand so an empty table still gets one
        let mut writer = ::csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(tmp.as_file_mut());
        writer.write_record(columns)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
    }

    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StorageError::Io(e.error))?;

    Ok(())
}
