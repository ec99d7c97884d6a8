//! Page command handlers

use anyhow::{bail, Context, Result};

use copysync_core::Page;

use super::{resolve_page, App};
use crate::output::Output;

/// List all pages, seeding the sample pages on first use
pub fn list(app: &App, output: &Output) -> Result<()> {
    let pages = app.orchestrator.list_pages(&app.user_id)?;
    output.print_pages(&pages);
    Ok(())
}

/// Show a single page with its items
pub fn show(app: &App, page: String, output: &Output) -> Result<()> {
    let pages = app.orchestrator.list_pages(&app.user_id)?;
    let page = resolve_page(&pages, &page)?;
    output.print_page(page);
    Ok(())
}

/// Create an empty page
pub fn create(app: &App, name: String, path: Option<String>, output: &Output) -> Result<()> {
    let name = name.trim().to_string();
    let path = path.unwrap_or_else(|| Page::default_path(&name));
    if !path.ends_with(".json") {
        bail!("Page path must end in .json: {}", path);
    }

    let pages = app.orchestrator.list_pages(&app.user_id)?;
    if let Some(existing) = pages.iter().find(|p| p.path == path) {
        bail!("Page '{}' already uses {}", existing.name, path);
    }

    let page = app
        .orchestrator
        .save_page(&app.user_id, &Page::new(name, path))
        .context("Failed to create page")?;

    output.success(&format!("Created page: {}", page.id));
    output.print_page(&page);
    Ok(())
}
