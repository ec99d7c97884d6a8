//! Sync between local pages and the remote repository
//!
//! - `reconcile`: pure push/pull rules for item text
//! - `orchestrator`: the sync, sync-all and pull operations
//! - `report`: per-page outcomes of multi-page operations
//! - `error`: errors and the structured client response

pub mod error;
pub mod orchestrator;
pub mod reconcile;
pub mod report;

pub use error::{ErrorResponse, SyncError};
pub use orchestrator::{Clock, Orchestrator};
pub use report::{BatchReport, PageOutcome};
