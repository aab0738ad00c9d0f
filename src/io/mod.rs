pub mod csv;
pub mod json;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to write CSV: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("failed to write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Create `path` for writing, making parent directories as needed.
pub(crate) fn create_file(path: &std::path::Path) -> Result<std::fs::File, OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(std::fs::File::create(path)?)
}
