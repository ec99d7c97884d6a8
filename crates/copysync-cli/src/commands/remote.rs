//! Remote (GitHub) config command handlers

use anyhow::Result;

use copysync_core::RemoteConfig;

use super::App;
use crate::output::Output;

/// Fields to change on the remote config
#[derive(Debug, Default, Clone)]
pub struct RemoteUpdate {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub branch: Option<String>,
    pub token: Option<String>,
    pub base_path: Option<String>,
}

impl RemoteUpdate {
    fn is_empty(&self) -> bool {
        self.owner.is_none()
            && self.repo.is_none()
            && self.branch.is_none()
            && self.token.is_none()
            && self.base_path.is_none()
    }

    fn apply(self, config: &mut RemoteConfig) {
        if let Some(owner) = self.owner {
            config.owner = owner.trim().to_string();
        }
        if let Some(repo) = self.repo {
            config.repo = repo.trim().to_string();
        }
        if let Some(branch) = self.branch {
            config.branch = branch.trim().to_string();
        }
        if let Some(token) = self.token {
            config.token = token.trim().to_string();
        }
        if let Some(base_path) = self.base_path {
            config.base_path = base_path.trim().to_string();
        }
    }
}

/// Show the remote config (or the defaults when none is saved)
pub fn show(app: &App, output: &Output) -> Result<()> {
    match app.orchestrator.get_config(&app.user_id)? {
        Some(config) => output.print_remote_config(&config, true),
        None => output.print_remote_config(&RemoteConfig::default(), false),
    }
    Ok(())
}

/// Update and save the remote config
pub fn set(app: &App, update: RemoteUpdate, output: &Output) -> Result<()> {
    if update.is_empty() {
        anyhow::bail!(
            "Nothing to set. Use --owner, --repo, --branch, --token or --base-path."
        );
    }

    let mut config = app.orchestrator.config_or_template(&app.user_id)?;
    update.apply(&mut config);
    app.orchestrator.save_config(&app.user_id, &config)?;

    output.success(&format!(
        "GitHub configured: {}/{}@{}",
        config.owner, config.repo, config.branch
    ));
    if !output.is_json() {
        output.print_remote_config(&config, true);
    }
    Ok(())
}
