use std::fs;
use std::path::{Path, PathBuf};

use crate::model::host::HostSnapshot;

/// Error type for reading the host snapshot
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Load the host's contract snapshot
pub fn read_snapshot(path: &Path) -> Result<HostSnapshot, SnapshotError> {
    let text = fs::read_to_string(path).map_err(|e| SnapshotError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let snapshot: HostSnapshot = serde_json::from_str(&text).map_err(|e| SnapshotError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(
        path = %path.display(),
        contracts = snapshot.contracts.len(),
        universal_time = snapshot.universal_time,
        "loaded host snapshot"
    );
    Ok(snapshot)
}
