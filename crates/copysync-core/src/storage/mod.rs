//! Storage layer
//!
//! A small key-value store backed by SQLite. Values are JSON documents.
//!
//! ## Keys
//!
//! - `config:<userId>` - the user's `RemoteConfig`
//! - `page:<userId>:<pageId>` - one `Page` aggregate
//!
//! There are no multi-key transactions: writing two pages is two
//! independent writes.

pub mod error;
pub mod kv;
pub mod schema;

pub use error::{StoreError, StoreResult};
pub use kv::KvStore;
pub use schema::{init_schema, needs_init, SCHEMA_VERSION};
