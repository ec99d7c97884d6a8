//! Reconciliation between edited text, synced text and remote content
//!
//! No I/O happens here. Statuses are never written: they follow from the
//! text fields these functions update.

use chrono::{DateTime, Utc};

use crate::models::{CopyItem, Page};
use crate::remote::FileContent;

/// Mark an item as pushed: its edited text becomes the synced text
pub fn push_item(item: &mut CopyItem, now: DateTime<Utc>) {
    item.synced_text = item.edited_text.clone();
    item.last_synced_at = Some(now);
}

/// Push every item of a page and stamp the page
pub fn push_page(page: &mut Page, now: DateTime<Utc>) {
    for item in &mut page.items {
        push_item(item, now);
    }
    page.last_synced_at = Some(now);
}

/// Take remote values as the new synced text
///
/// Items whose key is missing from `remote` (or maps to an empty string)
/// are left alone. Returns how many items changed.
pub fn pull_items(items: &mut [CopyItem], remote: &FileContent) -> usize {
    let mut changed = 0;
    for item in items.iter_mut() {
        match remote.get(&item.key) {
            Some(text) if !text.is_empty() => {
                if item.synced_text != *text {
                    item.synced_text = text.clone();
                    changed += 1;
                }
            }
            _ => {}
        }
    }
    changed
}

/// Key -> synced text map for the page's remote file
///
/// Later items win when keys repeat.
pub fn page_content(items: &[CopyItem]) -> FileContent {
    items
        .iter()
        .map(|item| (item.key.clone(), item.synced_text.clone()))
        .collect()
}
