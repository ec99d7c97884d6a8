//! copysync core library
//!
//! This crate provides the core functionality for copysync, which keeps
//! design copy (short UI strings grouped into pages) in sync with JSON
//! files in a GitHub repository.
//!
//! # Architecture
//!
//! - **Store**: pages and remote config per user, in a SQLite key-value table
//! - **Remote**: one JSON file per page, written with version-tag checks
//!
//! An item's status (`new`, `modified`, `synced`) is always computed from
//! its edited and synced text.
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::open(&config)?;
//! let remote = GitHubContents::new(&config.api_url)?;
//! let orchestrator = Orchestrator::new(store, remote);
//!
//! // Push every page
//! let report = orchestrator.sync_all(&user_id).await?;
//!
//! // Take remote edits as the new synced text
//! orchestrator.pull(&user_id, None).await?;
//! ```
//!
//! # Modules
//!
//! - `sync`: Orchestrator, reconciliation and per-page reports (main entry point)
//! - `store`: Page and remote config storage
//! - `remote`: Remote file store trait and the GitHub adapter
//! - `models`: Data structures for items, pages and remote config
//! - `storage`: SQLite key-value persistence
//! - `seed`: Sample pages for new users
//! - `config`: Application configuration

pub mod config;
pub mod models;
pub mod remote;
pub mod seed;
pub mod storage;
pub mod store;
pub mod sync;

pub use config::Config;
pub use models::{CopyItem, ItemStatus, Page, RemoteConfig};
#[cfg(any(test, feature = "testing"))]
pub use remote::MemoryRemote;
pub use remote::{FileContent, GitHubContents, RemoteError, RemoteFile, RemoteFileStore};
pub use storage::{StoreError, StoreResult};
pub use store::Store;
pub use sync::{BatchReport, ErrorResponse, Orchestrator, PageOutcome, SyncError};
