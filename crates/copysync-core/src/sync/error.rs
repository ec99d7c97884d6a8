//! Sync operation errors
//!
//! Every orchestrator call returns either its payload or a `SyncError`.
//! `ErrorResponse` is the structured form handed to clients.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::remote::RemoteError;
use crate::storage::StoreError;

/// Errors returned by sync and store operations
#[derive(Error, Debug)]
pub enum SyncError {
    /// No remote config, or owner/repo/token missing
    #[error("GitHub configuration not found or incomplete (missing: {})", .missing.join(", "))]
    ConfigMissing { missing: Vec<&'static str> },

    /// A page, item or config does not exist locally
    #[error("{0} not found")]
    NotFound(String),

    /// The remote store rejected or failed the request
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Malformed request, such as a missing identifier
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Local storage failed
    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidKey { .. } => SyncError::Validation(err.to_string()),
            other => SyncError::Storage(other),
        }
    }
}

impl SyncError {
    /// Whether the caller should ask for configuration rather than retry
    pub fn is_config_missing(&self) -> bool {
        matches!(self, SyncError::ConfigMissing { .. })
    }

    /// Short machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::ConfigMissing { .. } => "config_missing",
            SyncError::NotFound(_) => "not_found",
            SyncError::Remote(_) => "remote",
            SyncError::Validation(_) => "validation",
            SyncError::Storage(_) => "storage",
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            SyncError::ConfigMissing { .. } => Some(
                "Configure GitHub first: copysync remote set --owner <owner> --repo <repo> --token <token>",
            ),
            SyncError::Remote(err) if err.is_conflict() => {
                Some("The file changed on GitHub while syncing. Pull and try again.")
            }
            SyncError::Remote(err) if err.status() == Some(401) => {
                Some("GitHub rejected the token. Check it with: copysync remote show")
            }
            SyncError::Storage(err) => err.recovery_suggestion(),
            _ => None,
        }
    }

    fn summary(&self) -> &'static str {
        match self {
            SyncError::ConfigMissing { .. } => {
                "GitHub configuration not found. Please configure GitHub settings first."
            }
            SyncError::NotFound(_) => "Not found",
            SyncError::Remote(_) => "GitHub request failed",
            SyncError::Validation(_) => "Invalid request",
            SyncError::Storage(_) => "Storage failure",
        }
    }
}

/// Structured error returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub kind: String,
}

impl From<&SyncError> for ErrorResponse {
    fn from(err: &SyncError) -> Self {
        Self {
            error: err.summary().to_string(),
            details: Some(err.to_string()),
            kind: err.kind().to_string(),
        }
    }
}
