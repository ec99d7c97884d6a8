//! copysync CLI
//!
//! Command-line interface for copysync - edit design copy locally and sync
//! it to JSON files in a GitHub repository.

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use copysync_core::{Config, GitHubContents, Orchestrator, Store};

mod commands;
mod editor;
mod output;

use commands::remote::RemoteUpdate;
use commands::{App, Incomplete};
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "copysync")]
#[command(about = "copysync - Sync design copy with GitHub")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or set application configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show or set the GitHub repository settings
    Remote {
        #[command(subcommand)]
        command: Option<RemoteCommands>,
    },
    /// Manage pages
    Page {
        #[command(subcommand)]
        command: PageCommands,
    },
    /// Manage copy items
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Push copy to GitHub (one item, or every page)
    Sync {
        /// Page ID (full, prefix or name)
        #[arg(requires = "item")]
        page: Option<String>,
        /// Item ID (full, prefix or key)
        item: Option<String>,
    },
    /// Take text from GitHub as the synced text
    Pull {
        /// Only pull this page
        #[arg(short, long)]
        page: Option<String>,
    },
    /// Show pending changes and GitHub settings
    Status,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, api_url, user_id, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Subcommand)]
enum RemoteCommands {
    /// Show GitHub settings (token masked)
    Show,
    /// Set GitHub settings; unspecified fields keep their value
    Set {
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        repo: Option<String>,
        #[arg(long)]
        branch: Option<String>,
        /// Personal access token with contents write access
        #[arg(long, env = "COPYSYNC_GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Directory in the repository holding the page files
        #[arg(long)]
        base_path: Option<String>,
    },
}

#[derive(Subcommand)]
enum PageCommands {
    /// List all pages
    #[command(alias = "ls")]
    List,
    /// Show a page and its items
    Show {
        /// Page ID (full, prefix or name)
        page: String,
    },
    /// Create an empty page
    #[command(alias = "add")]
    Create {
        /// Display name
        name: String,
        /// File path under the base path (default: derived from the name)
        #[arg(long)]
        path: Option<String>,
    },
}

#[derive(Subcommand)]
enum ItemCommands {
    /// Add an item to a page
    Add {
        /// Page ID (full, prefix or name)
        page: String,
        /// Dotted key, e.g. hero.title
        key: String,
        /// Text (opens editor if not provided)
        #[arg(short, long)]
        text: Option<String>,
    },
    /// Edit an item's text or key
    Edit {
        /// Page ID (full, prefix or name)
        page: String,
        /// Item ID (full, prefix or key)
        item: String,
        /// New text (opens editor if neither --text nor --key is given)
        #[arg(short, long)]
        text: Option<String>,
        /// New key
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Delete an item
    #[command(alias = "delete")]
    Rm {
        /// Page ID (full, prefix or name)
        page: String,
        /// Item ID (full, prefix or key)
        item: String,
    },
    /// Show an item with its edited and synced text
    Show {
        /// Page ID (full, prefix or name)
        page: String,
        /// Item ID (full, prefix or key)
        item: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    match run(cli, &output).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            // Report already printed
            if !e.is::<Incomplete>() {
                output.error(&e);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let config_path = cli.config;

    // Commands that don't need the store
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path.as_ref(), output);
    }

    let mut config = Config::load_with_cli_override(config_path.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&config);

    let (user_id, created) = config.ensure_user_id();
    if created {
        let save_path = config_path.clone().unwrap_or_else(Config::config_file_path);
        config
            .save_to_path(&save_path)
            .context("Failed to save generated user ID")?;
        info!("Generated user ID {}", user_id);
    }
    debug!("Using data directory {:?}", config.data_dir);

    let store = Store::open(&config).context("Failed to open store")?;
    let remote = GitHubContents::new(&config.api_url).context("Failed to create GitHub client")?;
    let app = App {
        orchestrator: Orchestrator::new(store, remote),
        user_id,
    };

    match cli.command {
        Commands::Config { .. } => Ok(()), // Handled above
        Commands::Remote { command } => handle_remote_command(command, &app, output),
        Commands::Page { command } => handle_page_command(command, &app, output),
        Commands::Item { command } => handle_item_command(command, &app, output),
        Commands::Sync { page, item } => commands::sync::sync(&app, page, item, output).await,
        Commands::Pull { page } => commands::sync::pull(&app, page, output).await,
        Commands::Status => commands::status::show(&app, output),
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

fn handle_remote_command(
    command: Option<RemoteCommands>,
    app: &App,
    output: &Output,
) -> Result<()> {
    match command {
        Some(RemoteCommands::Show) | None => commands::remote::show(app, output),
        Some(RemoteCommands::Set {
            owner,
            repo,
            branch,
            token,
            base_path,
        }) => commands::remote::set(
            app,
            RemoteUpdate {
                owner,
                repo,
                branch,
                token,
                base_path,
            },
            output,
        ),
    }
}

fn handle_page_command(command: PageCommands, app: &App, output: &Output) -> Result<()> {
    match command {
        PageCommands::List => commands::page::list(app, output),
        PageCommands::Show { page } => commands::page::show(app, page, output),
        PageCommands::Create { name, path } => commands::page::create(app, name, path, output),
    }
}

fn handle_item_command(command: ItemCommands, app: &App, output: &Output) -> Result<()> {
    match command {
        ItemCommands::Add { page, key, text } => {
            commands::item::add(app, page, key, text, output)
        }
        ItemCommands::Edit {
            page,
            item,
            text,
            key,
        } => commands::item::edit(app, page, item, text, key, output),
        ItemCommands::Rm { page, item } => commands::item::delete(app, page, item, output),
        ItemCommands::Show { page, item } => commands::item::show(app, page, item, output),
    }
}

/// Initialize logging
///
/// Only initializes if COPYSYNC_LOG is set (to a level such as `debug`).
/// Logs to config.log_file when set, stderr otherwise.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("COPYSYNC_LOG") else {
        return;
    };

    let env_filter = EnvFilter::new(format!(
        "copysync_core={},copysync={}",
        log_level, log_level
    ));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    // Ignore the error if a subscriber is already installed
    match &config.log_file {
        Some(log_path) => {
            let log_file = match File::create(log_path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
                    return;
                }
            };
            let _ = builder.with_ansi(false).with_writer(log_file).try_init();
            info!("Logging to {:?}", log_path);
        }
        None => {
            let _ = builder.with_writer(std::io::stderr).try_init();
        }
    }
}
