//! Per-page results of multi-page operations
//!
//! Sync-all and pull-all are not atomic across pages. They stop at the
//! first failing page: pages before it are done, the failing page is
//! reported, and the rest are skipped untouched. Rerunning the whole
//! operation is safe because pushing an already-synced page changes
//! nothing.

use serde::ser::Serializer;
use serde::Serialize;

use super::error::{ErrorResponse, SyncError};
use crate::models::Page;

/// What happened to one page
#[derive(Debug)]
pub enum PageOutcome {
    /// Written (or read) and saved; holds the updated page
    Succeeded(Page),
    /// The remote or the store failed for this page
    Failed { page_id: String, error: SyncError },
    /// Not attempted because an earlier page failed
    Skipped { page_id: String },
}

impl PageOutcome {
    pub fn page_id(&self) -> &str {
        match self {
            PageOutcome::Succeeded(page) => &page.id,
            PageOutcome::Failed { page_id, .. } | PageOutcome::Skipped { page_id } => page_id,
        }
    }
}

/// Outcomes of a multi-page operation, in processing order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<PageOutcome>,
}

impl BatchReport {
    /// Whether every page succeeded
    pub fn is_complete(&self) -> bool {
        self.outcomes
            .iter()
            .all(|o| matches!(o, PageOutcome::Succeeded(_)))
    }

    /// Pages that succeeded
    pub fn succeeded(&self) -> Vec<&Page> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                PageOutcome::Succeeded(page) => Some(page),
                _ => None,
            })
            .collect()
    }

    /// The error that stopped the operation, if any
    pub fn first_error(&self) -> Option<&SyncError> {
        self.outcomes.iter().find_map(|o| match o {
            PageOutcome::Failed { error, .. } => Some(error),
            _ => None,
        })
    }

    /// IDs of pages that were not attempted
    pub fn skipped(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                PageOutcome::Skipped { page_id } => Some(page_id.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Consume the report, keeping the pages that succeeded
    pub fn into_pages(self) -> Vec<Page> {
        self.outcomes
            .into_iter()
            .filter_map(|o| match o {
                PageOutcome::Succeeded(page) => Some(page),
                _ => None,
            })
            .collect()
    }
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum OutcomeView<'a> {
    Succeeded {
        page: &'a Page,
    },
    Failed {
        #[serde(rename = "pageId")]
        page_id: &'a str,
        error: ErrorResponse,
    },
    Skipped {
        #[serde(rename = "pageId")]
        page_id: &'a str,
    },
}

impl Serialize for PageOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let view = match self {
            PageOutcome::Succeeded(page) => OutcomeView::Succeeded { page },
            PageOutcome::Failed { page_id, error } => OutcomeView::Failed {
                page_id,
                error: ErrorResponse::from(error),
            },
            PageOutcome::Skipped { page_id } => OutcomeView::Skipped { page_id },
        };
        view.serialize(serializer)
    }
}

impl Serialize for BatchReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct ReportView<'a> {
            success: bool,
            outcomes: &'a [PageOutcome],
        }

        ReportView {
            success: self.is_complete(),
            outcomes: &self.outcomes,
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::RemoteError;

    fn partial_report() -> BatchReport {
        BatchReport {
            outcomes: vec![
                PageOutcome::Succeeded(Page::with_id("1", "Home", "home.json")),
                PageOutcome::Failed {
                    page_id: "2".to_string(),
                    error: SyncError::Remote(RemoteError::Status {
                        status: 409,
                        body: "conflict".to_string(),
                    }),
                },
                PageOutcome::Skipped {
                    page_id: "3".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_empty_report_is_complete() {
        assert!(BatchReport::default().is_complete());
    }

    #[test]
    fn test_partial_report_accessors() {
        let report = partial_report();
        assert!(!report.is_complete());
        assert_eq!(report.succeeded().len(), 1);
        assert_eq!(report.skipped(), vec!["3"]);
        assert!(matches!(report.first_error(), Some(SyncError::Remote(_))));

        let ids: Vec<&str> = report.outcomes.iter().map(|o| o.page_id()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);

        let pages = report.into_pages();
        assert_eq!(pages[0].id, "1");
    }

    #[test]
    fn test_report_serialization() {
        let json = serde_json::to_value(partial_report()).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["outcomes"][0]["status"], "succeeded");
        assert_eq!(json["outcomes"][0]["page"]["id"], "1");
        assert_eq!(json["outcomes"][1]["status"], "failed");
        assert_eq!(json["outcomes"][1]["pageId"], "2");
        assert_eq!(json["outcomes"][1]["error"]["kind"], "remote");
        assert_eq!(json["outcomes"][2]["status"], "skipped");
    }
}
