//! Command handlers

use std::fmt;

use copysync_core::{GitHubContents, Orchestrator, Page, SyncError};

pub mod config;
pub mod item;
pub mod page;
pub mod remote;
pub mod status;
pub mod sync;

/// Everything a store-backed command needs
pub struct App {
    pub orchestrator: Orchestrator<GitHubContents>,
    pub user_id: String,
}

/// A multi-page operation stopped early; its report has been printed
#[derive(Debug)]
pub struct Incomplete {
    pub failed: usize,
    pub skipped: usize,
}

impl fmt::Display for Incomplete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} page(s) failed, {} page(s) skipped",
            self.failed, self.skipped
        )
    }
}

impl std::error::Error for Incomplete {}

/// Resolve a page argument (full ID, exact name or unique ID prefix)
pub fn resolve_page<'a>(pages: &'a [Page], query: &str) -> Result<&'a Page, SyncError> {
    let candidates: Vec<(&str, &str)> = pages
        .iter()
        .map(|p| (p.id.as_str(), p.name.as_str()))
        .collect();
    let id = resolve("page", &candidates, query)?;
    pages
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| SyncError::NotFound(format!("page matching '{}'", query)))
}

/// Resolve an item argument (full ID, exact key or unique ID prefix)
pub fn resolve_item_id(page: &Page, query: &str) -> Result<String, SyncError> {
    let candidates: Vec<(&str, &str)> = page
        .items
        .iter()
        .map(|i| (i.id.as_str(), i.key.as_str()))
        .collect();
    resolve("item", &candidates, query).map(str::to_string)
}

fn resolve<'a>(
    kind: &str,
    candidates: &[(&'a str, &'a str)],
    query: &str,
) -> Result<&'a str, SyncError> {
    if let Some((id, _)) = candidates.iter().find(|(id, _)| *id == query) {
        return Ok(*id);
    }

    let by_label: Vec<_> = candidates
        .iter()
        .filter(|(_, label)| label.eq_ignore_ascii_case(query))
        .collect();
    if by_label.len() == 1 {
        return Ok(by_label[0].0);
    }

    let matches: Vec<_> = candidates
        .iter()
        .filter(|(id, _)| id.starts_with(query))
        .collect();

    match matches.len() {
        0 => Err(SyncError::NotFound(format!("{} matching '{}'", kind, query))),
        1 => Ok(matches[0].0),
        _ => {
            eprintln!("Multiple {}s match '{}':", kind, query);
            for (id, label) in &matches {
                eprintln!("  {} - {}", id, label);
            }
            Err(SyncError::Validation(format!(
                "ambiguous {} ID '{}'; provide more characters",
                kind, query
            )))
        }
    }
}
