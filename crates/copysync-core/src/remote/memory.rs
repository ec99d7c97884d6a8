//! In-process remote store
//!
//! Follows the same versioning rules as the GitHub adapter: every write
//! produces a new version tag and a write carrying a stale tag is rejected
//! with status 409. Counts calls so callers can check that no remote I/O
//! happened.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use super::{FileContent, RemoteError, RemoteFile, RemoteFileStore};
use crate::models::RemoteConfig;

#[derive(Debug, Clone)]
struct StoredFile {
    content: FileContent,
    sha: String,
}

/// Remote file store kept in memory
#[derive(Debug, Default)]
pub struct MemoryRemote {
    files: Mutex<HashMap<String, StoredFile>>,
    failing: Mutex<HashSet<String>>,
    version: AtomicU64,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a file directly, as another client editing the repository would
    pub fn put(&self, config: &RemoteConfig, path: &str, content: FileContent) -> String {
        let sha = self.next_sha();
        self.files().insert(
            file_key(config, path),
            StoredFile {
                content,
                sha: sha.clone(),
            },
        );
        sha
    }

    /// Current content of a file
    pub fn content(&self, config: &RemoteConfig, path: &str) -> Option<FileContent> {
        self.files()
            .get(&file_key(config, path))
            .map(|f| f.content.clone())
    }

    /// Current version tag of a file
    pub fn sha(&self, config: &RemoteConfig, path: &str) -> Option<String> {
        self.files()
            .get(&file_key(config, path))
            .map(|f| f.sha.clone())
    }

    /// Make every write to `path` fail with status 500
    pub fn fail_writes_to(&self, config: &RemoteConfig, path: &str) {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(file_key(config, path));
    }

    /// Number of reads, including version lookups made by writes
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of write attempts
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Total remote calls
    pub fn call_count(&self) -> usize {
        self.read_count() + self.write_count()
    }

    fn files(&self) -> MutexGuard<'_, HashMap<String, StoredFile>> {
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_sha(&self) -> String {
        let n = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{:040x}", n)
    }
}

#[async_trait]
impl RemoteFileStore for MemoryRemote {
    async fn read_file(
        &self,
        config: &RemoteConfig,
        path: &str,
    ) -> Result<RemoteFile, RemoteError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(match self.files().get(&file_key(config, path)) {
            Some(file) => RemoteFile {
                content: file.content.clone(),
                sha: Some(file.sha.clone()),
            },
            None => RemoteFile::default(),
        })
    }

    async fn write_file(
        &self,
        config: &RemoteConfig,
        path: &str,
        content: &FileContent,
        sha: Option<String>,
    ) -> Result<(), RemoteError> {
        let key = file_key(config, path);

        let expected = match sha {
            Some(sha) => Some(sha),
            None => {
                self.reads.fetch_add(1, Ordering::SeqCst);
                self.files().get(&key).map(|f| f.sha.clone())
            }
        };

        self.writes.fetch_add(1, Ordering::SeqCst);
        let failing = self
            .failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&key);
        if failing {
            return Err(RemoteError::Status {
                status: 500,
                body: format!("write to {} failed", key),
            });
        }

        let new_sha = self.next_sha();
        let mut files = self.files();
        let current = files.get(&key).map(|f| f.sha.clone());
        if expected != current {
            return Err(RemoteError::Status {
                status: 409,
                body: format!("{} does not match {}", key, expected.unwrap_or_default()),
            });
        }

        files.insert(
            key,
            StoredFile {
                content: content.clone(),
                sha: new_sha,
            },
        );
        Ok(())
    }
}

fn file_key(config: &RemoteConfig, path: &str) -> String {
    format!(
        "{}/{}@{}:{}",
        config.owner,
        config.repo,
        config.branch,
        config.full_path(path)
    )
}
