//! Reading records and compendiums from disk, and writing rendered output.
//!
//! Both inputs are JSON documents produced from the Fight Club XML by an
//! external conversion step.

use crate::record::{CompendiumIndex, RawRecord};
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

/// Errors from file operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RawRecord {
    /// Load a character record from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Reading character record");
        let content = fs::read_to_string(path).await?;
        Ok(Self::from_json(&content)?)
    }
}

impl CompendiumIndex {
    /// Load a compendium from a JSON file.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Reading compendium");
        let content = fs::read_to_string(path).await?;
        Ok(Self::from_json(&content)?)
    }
}

/// Write rendered text to a file.
pub async fn save_text(path: impl AsRef<Path>, text: &str) -> Result<(), PersistError> {
    fs::write(path, text).await?;
    Ok(())
}

/// Write any serializable value as pretty-printed JSON.
pub async fn save_json<T: Serialize>(path: impl AsRef<Path>, value: &T) -> Result<(), PersistError> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).await?;
    Ok(())
}
