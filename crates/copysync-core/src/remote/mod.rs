//! Remote file store
//!
//! Page content lives in a repository as one JSON file per page, mapping
//! item keys to their synced text. Files are versioned: every read returns
//! a version tag (the blob `sha`), and a write that carries a stale tag is
//! rejected by the remote instead of overwriting concurrent changes.
//!
//! This is a compare-and-swap on a single file, not a transaction. Two
//! writers that look up the same tag race, and the loser gets a
//! `RemoteError::Status` back. Nothing here retries.
//!
//! Implementations:
//! - `GitHubContents` - the GitHub Contents REST API
//! - `MemoryRemote` - in-process store with the same versioning rules
//!   (test builds and the `testing` feature only)

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::RemoteConfig;

mod github;
#[cfg(any(test, feature = "testing"))]
mod memory;

pub use github::{decode_content, encode_content, GitHubContents};
#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryRemote;

/// Key -> text map stored in one remote file. Sorted, so serialization is stable.
pub type FileContent = BTreeMap<String, String>;

/// A file read from the remote store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RemoteFile {
    /// Parsed key -> text map (empty if the file does not exist)
    pub content: FileContent,
    /// Version tag of the file, `None` if it does not exist
    pub sha: Option<String>,
}

impl RemoteFile {
    /// Whether the file exists on the remote
    pub fn exists(&self) -> bool {
        self.sha.is_some()
    }
}

/// Errors from the remote store
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Non-2xx response, including stale version tag rejections
    #[error("GitHub API error: {status} {body}")]
    Status { status: u16, body: String },

    /// The request never produced a response
    #[error("Request to GitHub failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The file exists but is not a JSON object of strings
    #[error("Invalid content in '{path}': {details}")]
    Decode { path: String, details: String },

    /// The configured API URL cannot address repository contents
    #[error("Invalid API URL '{url}': {details}")]
    InvalidUrl { url: String, details: String },
}

impl RemoteError {
    /// HTTP status of the rejection, if the remote answered
    pub fn status(&self) -> Option<u16> {
        match self {
            RemoteError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the remote rejected a write because the version tag was stale
    pub fn is_conflict(&self) -> bool {
        matches!(self.status(), Some(409) | Some(422))
    }
}

/// A versioned store of JSON copy files
#[async_trait]
pub trait RemoteFileStore: Send + Sync {
    /// Read a page file. A missing file is empty content, not an error.
    async fn read_file(&self, config: &RemoteConfig, path: &str) -> Result<RemoteFile, RemoteError>;

    /// Create or replace a page file
    ///
    /// When `sha` is `None` the current version tag is looked up first and
    /// sent with the write; a file that does not exist yet is created.
    async fn write_file(
        &self,
        config: &RemoteConfig,
        path: &str,
        content: &FileContent,
        sha: Option<String>,
    ) -> Result<(), RemoteError>;
}
