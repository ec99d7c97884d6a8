//! Sync orchestrator
//!
//! Ties the store, the remote file store and reconciliation together.
//! Every operation runs to completion before returning; there is no
//! background work and no automatic retry.
//!
//! Push and pull both check that the user's remote config is complete
//! before touching the store or the remote.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::error::SyncError;
use super::reconcile;
use super::report::{BatchReport, PageOutcome};
use crate::models::{Page, RemoteConfig};
use crate::remote::RemoteFileStore;
use crate::store::Store;

/// Source of "now" for sync timestamps
pub type Clock = fn() -> DateTime<Utc>;

/// Runs sync and pull operations for a user
pub struct Orchestrator<R> {
    store: Store,
    remote: R,
    clock: Clock,
}

impl<R: RemoteFileStore> Orchestrator<R> {
    pub fn new(store: Store, remote: R) -> Self {
        Self {
            store,
            remote,
            clock: Utc::now,
        }
    }

    /// Replace the clock (fixed timestamps in tests)
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    // ==================== Config ====================

    /// The user's saved remote config, if any
    pub fn get_config(&self, user_id: &str) -> Result<Option<RemoteConfig>, SyncError> {
        Ok(self.store.get_config(user_id)?)
    }

    /// The saved remote config, or the default template when none exists
    pub fn config_or_template(&self, user_id: &str) -> Result<RemoteConfig, SyncError> {
        Ok(self.get_config(user_id)?.unwrap_or_default())
    }

    /// Save a remote config; incomplete configs are rejected
    pub fn save_config(&self, user_id: &str, config: &RemoteConfig) -> Result<(), SyncError> {
        let missing = config.missing_fields();
        if !missing.is_empty() {
            return Err(SyncError::Validation(format!(
                "remote config is missing {}",
                missing.join(", ")
            )));
        }
        self.store.save_config(user_id, config)?;
        Ok(())
    }

    // ==================== Pages ====================

    /// List the user's pages, seeding the sample set on first use
    pub fn list_pages(&self, user_id: &str) -> Result<Vec<Page>, SyncError> {
        Ok(self.store.list_or_seed_pages(user_id)?)
    }

    /// Load one page
    pub fn get_page(&self, user_id: &str, page_id: &str) -> Result<Page, SyncError> {
        self.store
            .get_page(user_id, page_id)?
            .ok_or_else(|| SyncError::NotFound(format!("page {}", page_id)))
    }

    /// Replace a page with the given copy
    pub fn save_page(&self, user_id: &str, page: &Page) -> Result<Page, SyncError> {
        if page.name.trim().is_empty() {
            return Err(SyncError::Validation("page name must not be empty".to_string()));
        }
        if page.path.trim().is_empty() {
            return Err(SyncError::Validation("page path must not be empty".to_string()));
        }
        self.store.save_page(user_id, page)?;
        Ok(page.clone())
    }

    // ==================== Sync ====================

    /// Push one item and write its page's remote file
    pub async fn sync_item(
        &self,
        user_id: &str,
        page_id: &str,
        item_id: &str,
    ) -> Result<Page, SyncError> {
        let config = self.require_config(user_id)?;
        if item_id.trim().is_empty() {
            return Err(SyncError::Validation("item id must not be empty".to_string()));
        }

        let mut page = self.get_page(user_id, page_id)?;
        let now = (self.clock)();
        let item = page
            .item_mut(item_id)
            .ok_or_else(|| SyncError::NotFound(format!("item {} on page {}", item_id, page_id)))?;
        info!("Syncing item {} ({}) on page {}", item_id, item.key, page_id);
        reconcile::push_item(item, now);
        page.last_synced_at = Some(now);

        let content = reconcile::page_content(&page.items);
        self.remote
            .write_file(&config, &page.path, &content, None)
            .await?;
        self.store.save_page(user_id, &page)?;
        Ok(page)
    }

    /// Push every page that has items, stopping at the first failure
    pub async fn sync_all(&self, user_id: &str) -> Result<BatchReport, SyncError> {
        let config = self.require_config(user_id)?;

        let pages: Vec<Page> = self
            .store
            .list_pages(user_id)?
            .into_iter()
            .filter(|p| !p.items.is_empty())
            .collect();
        if pages.is_empty() {
            return Err(SyncError::NotFound("pages with copy items".to_string()));
        }

        info!("Syncing {} pages for user {}", pages.len(), user_id);
        let now = (self.clock)();
        let mut report = BatchReport::default();
        let mut failed = false;

        for mut page in pages {
            if failed {
                report.outcomes.push(PageOutcome::Skipped { page_id: page.id });
                continue;
            }

            reconcile::push_page(&mut page, now);
            let content = reconcile::page_content(&page.items);
            let result = match self
                .remote
                .write_file(&config, &page.path, &content, None)
                .await
            {
                Ok(()) => self.store.save_page(user_id, &page).map_err(SyncError::from),
                Err(e) => Err(e.into()),
            };

            match result {
                Ok(()) => report.outcomes.push(PageOutcome::Succeeded(page)),
                Err(error) => {
                    warn!("Sync of page {} failed: {}", page.id, error);
                    failed = true;
                    report.outcomes.push(PageOutcome::Failed {
                        page_id: page.id,
                        error,
                    });
                }
            }
        }

        Ok(report)
    }

    /// Pull remote values into one page, or into every page
    pub async fn pull(
        &self,
        user_id: &str,
        page_id: Option<&str>,
    ) -> Result<BatchReport, SyncError> {
        let config = self.require_config(user_id)?;

        if let Some(page_id) = page_id {
            let page = self.get_page(user_id, page_id)?;
            let page = self.pull_page(&config, user_id, page).await?;
            return Ok(BatchReport {
                outcomes: vec![PageOutcome::Succeeded(page)],
            });
        }

        let pages = self.store.list_pages(user_id)?;
        if pages.is_empty() {
            return Err(SyncError::NotFound("pages".to_string()));
        }

        info!("Pulling {} pages for user {}", pages.len(), user_id);
        let mut report = BatchReport::default();
        let mut failed = false;

        for page in pages {
            if failed {
                report.outcomes.push(PageOutcome::Skipped { page_id: page.id });
                continue;
            }

            let page_id = page.id.clone();
            match self.pull_page(&config, user_id, page).await {
                Ok(page) => report.outcomes.push(PageOutcome::Succeeded(page)),
                Err(error) => {
                    warn!("Pull of page {} failed: {}", page_id, error);
                    failed = true;
                    report.outcomes.push(PageOutcome::Failed { page_id, error });
                }
            }
        }

        Ok(report)
    }

    async fn pull_page(
        &self,
        config: &RemoteConfig,
        user_id: &str,
        mut page: Page,
    ) -> Result<Page, SyncError> {
        let remote = self.remote.read_file(config, &page.path).await?;
        let changed = reconcile::pull_items(&mut page.items, &remote.content);
        info!(
            "Pulled page {} ({} of {} items changed)",
            page.id,
            changed,
            page.items.len()
        );
        self.store.save_page(user_id, &page)?;
        Ok(page)
    }

    /// The user's remote config, or `ConfigMissing` naming the empty fields
    ///
    /// Reads only the stored config, never pages or the remote.
    pub fn require_config(&self, user_id: &str) -> Result<RemoteConfig, SyncError> {
        let config = self
            .store
            .get_config(user_id)?
            .ok_or(SyncError::ConfigMissing {
                missing: vec!["owner", "repo", "token"],
            })?;
        let missing = config.missing_fields();
        if !missing.is_empty() {
            return Err(SyncError::ConfigMissing { missing });
        }
        Ok(config)
    }
}
