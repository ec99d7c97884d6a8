//! Item command handlers
//!
//! Items are edited locally; nothing reaches GitHub until `copysync sync`.

use anyhow::{bail, Context, Result};

use copysync_core::{CopyItem, Page, SyncError};

use super::{resolve_item_id, resolve_page, App};
use crate::editor::{confirm, edit_text};
use crate::output::{short_id, Output};

/// Add an item to a page
pub fn add(
    app: &App,
    page: String,
    key: String,
    text: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut page = load_page(app, &page)?;
    let key = check_key(&key)?;
    if page.items.iter().any(|i| i.key == key) {
        bail!("Page '{}' already has an item with key '{}'", page.name, key);
    }

    let text = match text {
        Some(text) => text,
        None => edit_text("")?,
    };

    let id = page.add_item(CopyItem::new(key, text));
    save(app, &page)?;

    output.success(&format!("Added item: {}", id));
    if let Some(item) = page.item(&id) {
        output.print_item(item);
    }
    Ok(())
}

/// Change an item's text or key
///
/// Opens $EDITOR on the current text when neither is given.
pub fn edit(
    app: &App,
    page: String,
    item: String,
    text: Option<String>,
    key: Option<String>,
    output: &Output,
) -> Result<()> {
    let mut page = load_page(app, &page)?;
    let item_id = resolve_item_id(&page, &item)?;

    let key = key.as_deref().map(check_key).transpose()?;
    if let Some(ref key) = key {
        if page.items.iter().any(|i| i.key == *key && i.id != item_id) {
            output.message(&format!(
                "Warning: key '{}' is already used on this page; the last item wins on sync",
                key
            ));
        }
    }

    let text = match (text, &key) {
        (Some(text), _) => Some(text),
        (None, Some(_)) => None,
        (None, None) => {
            let current = page
                .item(&item_id)
                .map(|i| i.edited_text.clone())
                .unwrap_or_default();
            Some(edit_text(&current)?)
        }
    };

    let Some(item) = page.item_mut(&item_id) else {
        return Err(SyncError::NotFound(format!("item {}", item_id)).into());
    };
    if let Some(key) = key {
        item.set_key(key);
    }
    if let Some(text) = text {
        item.set_text(text);
    }
    let item = item.clone();

    save(app, &page)?;

    output.success(&format!("Item updated ({})", item.status()));
    output.print_item(&item);
    Ok(())
}

/// Remove an item from a page
pub fn delete(app: &App, page: String, item: String, output: &Output) -> Result<()> {
    let mut page = load_page(app, &page)?;
    let item_id = resolve_item_id(&page, &item)?;

    if output.should_prompt() {
        if let Some(item) = page.item(&item_id) {
            println!("Delete item: {} - {}", short_id(&item.id), item.key);
        }
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    page.remove_item(&item_id);
    save(app, &page)?;

    output.success(&format!("Deleted item: {}", item_id));
    Ok(())
}

/// Show one item with its edited and synced text
pub fn show(app: &App, page: String, item: String, output: &Output) -> Result<()> {
    let page = load_page(app, &page)?;
    let item_id = resolve_item_id(&page, &item)?;
    if let Some(item) = page.item(&item_id) {
        output.print_item(item);
    }
    Ok(())
}

fn load_page(app: &App, query: &str) -> Result<Page> {
    let pages = app.orchestrator.list_pages(&app.user_id)?;
    Ok(resolve_page(&pages, query)?.clone())
}

fn save(app: &App, page: &Page) -> Result<()> {
    app.orchestrator
        .save_page(&app.user_id, page)
        .context("Failed to save page")?;
    Ok(())
}

/// Keys become JSON property names in the remote file
fn check_key(key: &str) -> Result<String> {
    let key = key.trim();
    if key.is_empty() {
        bail!("Item key must not be empty");
    }
    if key.chars().any(char::is_whitespace) {
        bail!("Item key must not contain whitespace: '{}'", key);
    }
    Ok(key.to_string())
}
