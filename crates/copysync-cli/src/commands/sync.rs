//! Sync and pull command handlers

use anyhow::Result;

use copysync_core::BatchReport;

use super::{resolve_item_id, resolve_page, App, Incomplete};
use crate::output::Output;

/// Push one item, or every page when no item is given
pub async fn sync(
    app: &App,
    page: Option<String>,
    item: Option<String>,
    output: &Output,
) -> Result<()> {
    let (Some(page), Some(item)) = (page, item) else {
        output.message("Syncing all pages to GitHub...");
        let report = app.orchestrator.sync_all(&app.user_id).await?;
        output.print_report(&report, "Synced");
        return finish(&report);
    };

    // Listing pages seeds them, so check the remote config first
    app.orchestrator.require_config(&app.user_id)?;
    let pages = app.orchestrator.list_pages(&app.user_id)?;
    let page = resolve_page(&pages, &page)?;
    let item_id = resolve_item_id(page, &item)?;

    let page = app
        .orchestrator
        .sync_item(&app.user_id, &page.id, &item_id)
        .await?;

    if output.is_json() {
        output.print_json(&page);
    } else if let Some(item) = page.item(&item_id) {
        output.success(&format!("Synced {} to {}", item.key, page.path));
    }
    Ok(())
}

/// Pull remote text into one page or every page
pub async fn pull(app: &App, page: Option<String>, output: &Output) -> Result<()> {
    let page_id = match page {
        Some(query) => {
            app.orchestrator.require_config(&app.user_id)?;
            let pages = app.orchestrator.list_pages(&app.user_id)?;
            Some(resolve_page(&pages, &query)?.id.clone())
        }
        None => None,
    };

    output.message("Pulling from GitHub...");
    let report = app
        .orchestrator
        .pull(&app.user_id, page_id.as_deref())
        .await?;
    output.print_report(&report, "Pulled");
    finish(&report)
}

fn finish(report: &BatchReport) -> Result<()> {
    if report.is_complete() {
        return Ok(());
    }
    let failed = report.outcomes.len() - report.succeeded().len() - report.skipped().len();
    Err(Incomplete {
        failed,
        skipped: report.skipped().len(),
    }
    .into())
}
