//! Status command handler

use anyhow::Result;

use super::App;
use crate::output::{Output, OutputFormat};

/// Show pending changes per page and the GitHub connection state
pub fn show(app: &App, output: &Output) -> Result<()> {
    let pages = app.orchestrator.list_pages(&app.user_id)?;
    let remote = app.orchestrator.get_config(&app.user_id)?;
    let total: usize = pages.iter().map(|p| p.pending_changes()).sum();

    match output.format {
        OutputFormat::Json => {
            let pages: Vec<_> = pages
                .iter()
                .map(|p| {
                    serde_json::json!({
                        "id": p.id,
                        "name": p.name,
                        "path": p.path,
                        "items": p.items.len(),
                        "pending": p.pending_changes(),
                        "duplicateKeys": p.duplicate_keys(),
                        "lastSyncedAt": p.last_synced_at,
                    })
                })
                .collect();
            output.print_json(&serde_json::json!({
                "userId": app.user_id,
                "remote": {
                    "configured": remote.is_some(),
                    "complete": remote.as_ref().is_some_and(|r| r.is_complete()),
                    "repository": remote.as_ref().map(|r| format!("{}/{}", r.owner, r.repo)),
                    "branch": remote.as_ref().map(|r| r.branch.clone()),
                },
                "pages": pages,
                "totalPending": total,
            }));
        }
        OutputFormat::Quiet => {
            println!("{}", total);
        }
        OutputFormat::Human => {
            println!("copysync Status");
            println!("===============");
            println!();
            println!("GitHub:");
            match remote {
                Some(ref r) if r.is_complete() => {
                    println!("  Repository: {}/{}", r.owner, r.repo);
                    println!("  Branch:     {}", r.branch);
                    println!("  Files:      {}", r.full_path("*.json"));
                }
                Some(ref r) => {
                    println!("  Incomplete (missing {})", r.missing_fields().join(", "));
                }
                None => {
                    println!("  Not configured. Run: copysync remote set --owner <owner> --repo <repo> --token <token>");
                }
            }
            println!();
            println!("Pages:");
            for page in &pages {
                println!(
                    "  {:<20} {:>3} item(s), {:>3} pending",
                    page.name,
                    page.items.len(),
                    page.pending_changes()
                );
                for key in page.duplicate_keys() {
                    println!("    ⚠ duplicate key '{}' (last item wins on sync)", key);
                }
            }
            println!();
            println!("Total pending changes: {}", total);
        }
    }

    Ok(())
}
