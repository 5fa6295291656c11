pub mod export;
pub mod import;
pub mod patch;
pub mod update;
pub mod users;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use clap::Args;
use tqlshift_client::{StriimClient, Timeouts};
use tqlshift_engine::config::{ProfileOverrides, Target, ToolConfig};

/// Connection flags shared by every server-facing command.
#[derive(Args, Clone, Default)]
pub struct ServerArgs {
    /// Server URL, e.g. https://striim.internal:9081
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub username: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    /// Passphrase protecting exported application archives
    #[arg(long)]
    pub passphrase: Option<String>,
}

impl ServerArgs {
    fn overrides(&self) -> ProfileOverrides {
        ProfileOverrides {
            url: self.url.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            passphrase: self.passphrase.clone(),
            accept_invalid_certs: None,
        }
    }
}

/// Settings resolved once per invocation.
pub struct Context {
    pub config: ToolConfig,
    pub environment: Option<String>,
}

impl Context {
    /// Build and authenticate a client for `target`.
    pub async fn connect(&self, target: Target, server: &ServerArgs) -> Result<StriimClient> {
        let profile =
            self.config
                .profile(target, self.environment.as_deref(), &server.overrides())?;
        let advanced = &self.config.advanced;
        let timeouts = Timeouts {
            request: std::time::Duration::from_secs(advanced.request_timeout_secs),
            auth: std::time::Duration::from_secs(advanced.auth_timeout_secs),
        };

        tracing::info!(
            server = target.as_str(),
            url = %profile.base_url(),
            user = %profile.username,
            "Connecting"
        );
        let mut client = StriimClient::connect(profile, timeouts)?;
        client
            .authenticate()
            .await
            .with_context(|| format!("Authentication failed for {} server", target.as_str()))?;
        Ok(client)
    }
}

/// `flag` if given, else the configured directory.
pub fn directory_or(flag: Option<&Path>, configured: &Path) -> PathBuf {
    flag.unwrap_or(configured).to_path_buf()
}
