//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use copysync_core::{
    BatchReport, CopyItem, ErrorResponse, Page, PageOutcome, RemoteConfig, SyncError,
};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print any serializable value as pretty JSON
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Failed to serialize output: {}", e),
        }
    }

    /// Print a list of pages
    pub fn print_pages(&self, pages: &[Page]) {
        match self.format {
            OutputFormat::Human => {
                if pages.is_empty() {
                    println!("No pages found.");
                    return;
                }
                for page in pages {
                    println!(
                        "{} | {} | {} | {} item(s), {} pending",
                        short_id(&page.id),
                        truncate(&page.name, 30),
                        truncate(&page.path, 30),
                        page.items.len(),
                        page.pending_changes()
                    );
                }
                println!("\n{} page(s)", pages.len());
            }
            OutputFormat::Json => self.print_json(pages),
            OutputFormat::Quiet => {
                for page in pages {
                    println!("{}", page.id);
                }
            }
        }
    }

    /// Print a single page with its items
    pub fn print_page(&self, page: &Page) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", page.id);
                println!("Name:        {}", page.name);
                println!("Path:        {}", page.path);
                println!(
                    "Last synced: {}",
                    page.last_synced_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "never".to_string())
                );

                println!();
                println!("── Items ({}) ──", page.items.len());
                for item in &page.items {
                    println!(
                        "{} {:<8} {:<24} {}",
                        short_id(&item.id),
                        item.status(),
                        truncate(&item.key, 24),
                        truncate_line(&item.edited_text, 50)
                    );
                }
                let pending = page.pending_changes();
                if pending > 0 {
                    println!("\n{} pending change(s)", pending);
                }
            }
            OutputFormat::Json => self.print_json(page),
            OutputFormat::Quiet => {
                println!("{}", page.id);
            }
        }
    }

    /// Print a single item, showing edited and synced text side by side
    pub fn print_item(&self, item: &CopyItem) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:          {}", item.id);
                println!("Key:         {}", item.key);
                println!("Status:      {}", item.status());
                println!(
                    "Last synced: {}",
                    item.last_synced_at
                        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "never".to_string())
                );
                println!();
                println!("── Edited ──");
                println!("{}", item.edited_text);
                if item.synced_text != item.edited_text {
                    println!();
                    println!("── Synced ──");
                    if item.synced_text.is_empty() {
                        println!("(never synced)");
                    } else {
                        println!("{}", item.synced_text);
                    }
                }
            }
            OutputFormat::Json => self.print_json(item),
            OutputFormat::Quiet => {
                println!("{}", item.id);
            }
        }
    }

    /// Print a remote config with its token masked
    pub fn print_remote_config(&self, config: &RemoteConfig, saved: bool) {
        match self.format {
            OutputFormat::Human => {
                if !saved {
                    println!("GitHub is not configured yet. Defaults:");
                }
                println!("Owner:     {}", or_unset(&config.owner));
                println!("Repo:      {}", or_unset(&config.repo));
                println!("Branch:    {}", config.branch);
                println!("Base path: {}", config.base_path);
                println!("Token:     {}", or_unset(&config.masked_token()));
                let missing = config.missing_fields();
                if !missing.is_empty() {
                    println!();
                    println!("Missing: {}", missing.join(", "));
                }
            }
            OutputFormat::Json => {
                self.print_json(&serde_json::json!({
                    "owner": config.owner,
                    "repo": config.repo,
                    "branch": config.branch,
                    "basePath": config.base_path,
                    "token": config.masked_token(),
                    "saved": saved,
                    "complete": config.is_complete(),
                }));
            }
            OutputFormat::Quiet => {
                if config.is_complete() {
                    println!("{}/{}@{}", config.owner, config.repo, config.branch);
                }
            }
        }
    }

    /// Print the outcome of a multi-page sync or pull
    pub fn print_report(&self, report: &BatchReport, verb: &str) {
        match self.format {
            OutputFormat::Human => {
                for outcome in &report.outcomes {
                    match outcome {
                        PageOutcome::Succeeded(page) => {
                            println!("✓ {} ({})", page.name, page.path)
                        }
                        PageOutcome::Failed { page_id, error } => {
                            println!("✗ {}: {}", short_id(page_id), error)
                        }
                        PageOutcome::Skipped { page_id } => {
                            println!("- {}: skipped", short_id(page_id))
                        }
                    }
                }
                let done = report.succeeded().len();
                if report.is_complete() {
                    println!("\n{} {} page(s)", verb, done);
                } else {
                    println!(
                        "\n{} {} of {} page(s); rerun to retry the rest",
                        verb,
                        done,
                        report.outcomes.len()
                    );
                }
            }
            OutputFormat::Json => self.print_json(report),
            OutputFormat::Quiet => {
                for page in report.succeeded() {
                    println!("{}", page.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an error, as an `ErrorResponse` in JSON mode
    pub fn error(&self, err: &anyhow::Error) {
        let sync_error = err.downcast_ref::<SyncError>();
        match self.format {
            OutputFormat::Json => {
                let response = match sync_error {
                    Some(e) => ErrorResponse::from(e),
                    None => ErrorResponse {
                        error: err.to_string(),
                        details: err.chain().nth(1).map(|c| c.to_string()),
                        kind: "cli".to_string(),
                    },
                };
                self.print_json(&response);
            }
            OutputFormat::Human | OutputFormat::Quiet => {
                eprintln!("Error: {:#}", err);
                if let Some(hint) = sync_error.and_then(|e| e.recovery_suggestion()) {
                    eprintln!("{}", hint);
                }
            }
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// First eight characters of an ID
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((idx, _)) => &id[..idx],
        None => id,
    }
}

fn or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

/// Truncate to first line and max length
fn truncate_line(s: &str, max_len: usize) -> String {
    let first_line = s.lines().next().unwrap_or("");
    truncate(first_line, max_len)
}
