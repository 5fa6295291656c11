use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Deserialize;
use tqlshift_types::ServerProfile;

/// Which installation a command talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The installation applications are exported from.
    Export,
    /// The installation applications are imported into.
    Import,
}

impl Target {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Export => "export",
            Self::Import => "import",
        }
    }

    /// Profile used when nothing is configured.
    ///
    /// Import targets are usually fresh installations with self-signed
    /// certificates, so they skip certificate verification by default.
    #[must_use]
    pub fn builtin_profile(self) -> ServerProfile {
        match self {
            Self::Export => ServerProfile::default(),
            Self::Import => ServerProfile {
                accept_invalid_certs: true,
                ..ServerProfile::default()
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub export: ProfileOverrides,
    #[serde(default)]
    pub import: ProfileOverrides,
    /// Named installations selectable with `--environment`.
    #[serde(default)]
    pub environments: BTreeMap<String, ProfileOverrides>,
    #[serde(default)]
    pub processing: ProcessingConfig,
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            export: ProfileOverrides::default(),
            import: ProfileOverrides::default(),
            environments: BTreeMap::new(),
            processing: ProcessingConfig::default(),
            advanced: AdvancedConfig::default(),
        }
    }
}

impl ToolConfig {
    /// Section configured for `target`.
    #[must_use]
    pub fn section(&self, target: Target) -> &ProfileOverrides {
        match target {
            Target::Export => &self.export,
            Target::Import => &self.import,
        }
    }

    /// Resolve the connection profile for `target`.
    ///
    /// Later layers win: built-in default, the `export`/`import` section,
    /// the selected environment, then explicit command-line flags.
    ///
    /// # Errors
    ///
    /// Returns an error if `environment` names an environment that is not
    /// configured.
    pub fn profile(
        &self,
        target: Target,
        environment: Option<&str>,
        flags: &ProfileOverrides,
    ) -> anyhow::Result<ServerProfile> {
        let mut profile = target.builtin_profile();
        self.section(target).apply(&mut profile);
        if let Some(name) = environment {
            let Some(env) = self.environments.get(name) else {
                let known: Vec<&str> = self.environments.keys().map(String::as_str).collect();
                anyhow::bail!(
                    "Unknown environment '{name}' (configured: {})",
                    if known.is_empty() {
                        "none".to_string()
                    } else {
                        known.join(", ")
                    }
                );
            };
            env.apply(&mut profile);
        }
        flags.apply(&mut profile);
        Ok(profile)
    }
}

/// Partial connection settings; unset fields fall through to the next layer.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileOverrides {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub passphrase: Option<String>,
    pub accept_invalid_certs: Option<bool>,
}

impl ProfileOverrides {
    /// Overwrite every field of `profile` that is set here.
    pub fn apply(&self, profile: &mut ServerProfile) {
        if let Some(url) = &self.url {
            profile.url.clone_from(url);
        }
        if let Some(username) = &self.username {
            profile.username.clone_from(username);
        }
        if let Some(password) = &self.password {
            profile.password.clone_from(password);
        }
        if let Some(passphrase) = &self.passphrase {
            profile.passphrase.clone_from(passphrase);
        }
        if let Some(accept) = self.accept_invalid_certs {
            profile.accept_invalid_certs = accept;
        }
    }
}

impl std::fmt::Debug for ProfileOverrides {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |v: &Option<String>| v.as_ref().map(|_| "***");
        f.debug_struct("ProfileOverrides")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &redact(&self.password))
            .field("passphrase", &redact(&self.passphrase))
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessingConfig {
    #[serde(default = "default_stage_directory")]
    pub stage_directory: PathBuf,
    #[serde(default = "default_import_directory")]
    pub import_directory: PathBuf,
    #[serde(default = "default_users_directory")]
    pub users_directory: PathBuf,
    /// Replace files already present in the output directories.
    #[serde(default = "default_overwrite_existing")]
    pub overwrite_existing: bool,
}

fn default_stage_directory() -> PathBuf {
    PathBuf::from("stage")
}
fn default_import_directory() -> PathBuf {
    PathBuf::from("import")
}
fn default_users_directory() -> PathBuf {
    PathBuf::from("users")
}
fn default_overwrite_existing() -> bool {
    true
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            stage_directory: default_stage_directory(),
            import_directory: default_import_directory(),
            users_directory: default_users_directory(),
            overwrite_existing: default_overwrite_existing(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AdvancedConfig {
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_auth_timeout_secs")]
    pub auth_timeout_secs: u64,
    #[serde(default = "default_export_archive_name")]
    pub export_archive_name: String,
}

fn default_request_timeout_secs() -> u64 {
    30
}
fn default_auth_timeout_secs() -> u64 {
    10
}
fn default_export_archive_name() -> String {
    "all_applications.zip".to_string()
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            auth_timeout_secs: default_auth_timeout_secs(),
            export_archive_name: default_export_archive_name(),
        }
    }
}
