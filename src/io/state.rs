use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::model::host::ContractId;
use crate::model::store::{ContextSettings, PresentationContext};
use crate::ops::session::{SavedLists, Session};

/// Error type for saving window state
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not serialize window state: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persisted list state: the two partitions' ids and each context's
/// settings. Written to `.window-state.json` by default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub primary: Vec<ContractId>,
    #[serde(default)]
    pub hidden: Vec<ContractId>,
    #[serde(default)]
    pub contexts: BTreeMap<PresentationContext, ContextSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<DateTime<Utc>>,
}

impl PersistedState {
    /// Capture what a session needs to resume later
    pub fn capture(session: &Session) -> Self {
        let lists = session.saved_lists();
        PersistedState {
            primary: lists.primary,
            hidden: lists.hidden,
            contexts: session.contexts().clone(),
            saved_at: Some(Utc::now()),
        }
    }

    /// Split into the pieces `Session::restore` takes
    pub fn into_parts(self) -> (SavedLists, BTreeMap<PresentationContext, ContextSettings>) {
        (
            SavedLists {
                primary: self.primary,
                hidden: self.hidden,
            },
            self.contexts,
        )
    }
}

/// Read the state file. A missing or unreadable file means there is no
/// saved state.
pub fn read_state(path: &Path) -> Option<PersistedState> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no saved window state");
            return None;
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read window state");
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(state) => Some(state),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed window state");
            None
        }
    }
}

/// Atomically replace the state file
pub fn write_state(path: &Path, state: &PersistedState) -> Result<(), StateError> {
    let content = serde_json::to_string_pretty(state)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let write_err = |source| StateError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    tracing::debug!(path = %path.display(), "saved window state");
    Ok(())
}
