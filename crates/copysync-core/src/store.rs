//! Page and config store
//!
//! The `Store` owns persisted `Page` aggregates and remote configs, keyed by
//! user. Pages are always read and written whole; callers read-modify-write.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open(&config)?;
//!
//! if let Some(mut page) = store.get_page("user_1", "home")? {
//!     if let Some(item) = page.item_mut("hero") {
//!         item.set_text("Welcome");
//!     }
//!     store.save_page("user_1", &page)?;
//! }
//! ```

use tracing::{debug, info};

use crate::config::Config;
use crate::models::{Page, RemoteConfig};
use crate::seed;
use crate::storage::{KvStore, StoreError, StoreResult};

const CONFIG_PREFIX: &str = "config";
const PAGE_PREFIX: &str = "page";

/// Persistent store for pages and remote configuration
pub struct Store {
    kv: KvStore,
}

impl Store {
    /// Open the store in the configured data directory
    pub fn open(config: &Config) -> StoreResult<Self> {
        let kv = KvStore::open(&config.database_path())?;
        Ok(Self { kv })
    }

    /// Open an in-memory store (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self {
            kv: KvStore::open_in_memory()?,
        })
    }

    // ==================== Remote Config ====================

    /// Get the user's remote config, if one was saved
    pub fn get_config(&self, user_id: &str) -> StoreResult<Option<RemoteConfig>> {
        self.kv.get(&config_key(user_id)?)
    }

    /// Save the user's remote config
    pub fn save_config(&self, user_id: &str, config: &RemoteConfig) -> StoreResult<()> {
        self.kv.set(&config_key(user_id)?, config)?;
        info!("Remote config saved for user {}", user_id);
        Ok(())
    }

    // ==================== Pages ====================

    /// List all of the user's pages, ordered by page ID
    pub fn list_pages(&self, user_id: &str) -> StoreResult<Vec<Page>> {
        let prefix = format!("{}:{}:", PAGE_PREFIX, check_segment("user id", user_id)?);
        let pages: Vec<Page> = self
            .kv
            .get_by_prefix::<Page>(&prefix)?
            .into_iter()
            .map(|(_, page)| page)
            .collect();
        debug!("Found {} pages for user {}", pages.len(), user_id);
        Ok(pages)
    }

    /// Get one page
    pub fn get_page(&self, user_id: &str, page_id: &str) -> StoreResult<Option<Page>> {
        self.kv.get(&page_key(user_id, page_id)?)
    }

    /// Save a page, replacing the stored copy
    pub fn save_page(&self, user_id: &str, page: &Page) -> StoreResult<()> {
        let key = page_key(user_id, &page.id)?;
        debug!("Saving page {} ({} items)", page.id, page.items.len());
        self.kv.set(&key, page)
    }

    /// List the user's pages, seeding the sample set if there are none
    pub fn list_or_seed_pages(&self, user_id: &str) -> StoreResult<Vec<Page>> {
        let pages = self.list_pages(user_id)?;
        if !pages.is_empty() {
            return Ok(pages);
        }

        info!("No pages found for user {}, seeding sample pages", user_id);
        for page in seed::sample_pages() {
            self.save_page(user_id, &page)?;
        }
        self.list_pages(user_id)
    }
}

fn config_key(user_id: &str) -> StoreResult<String> {
    Ok(format!(
        "{}:{}",
        CONFIG_PREFIX,
        check_segment("user id", user_id)?
    ))
}

fn page_key(user_id: &str, page_id: &str) -> StoreResult<String> {
    Ok(format!(
        "{}:{}:{}",
        PAGE_PREFIX,
        check_segment("user id", user_id)?,
        check_segment("page id", page_id)?
    ))
}

/// Key segments must be non-empty and free of the ':' separator
fn check_segment<'a>(what: &'static str, segment: &'a str) -> StoreResult<&'a str> {
    if segment.trim().is_empty() {
        return Err(StoreError::InvalidKey {
            what,
            details: "must not be empty".to_string(),
        });
    }
    if segment.contains(':') {
        return Err(StoreError::InvalidKey {
            what,
            details: format!("'{}' must not contain ':'", segment),
        });
    }
    Ok(segment)
}
