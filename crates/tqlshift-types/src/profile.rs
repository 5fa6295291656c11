//! Server connection profile.

use serde::{Deserialize, Serialize};

/// Connection settings for one platform installation.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerProfile {
    pub url: String,
    pub username: String,
    pub password: String,
    /// Passphrase protecting exported/imported application archives.
    pub passphrase: String,
    /// Skip TLS certificate verification (self-signed installations).
    #[serde(default)]
    pub accept_invalid_certs: bool,
}

impl ServerProfile {
    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }
}

impl Default for ServerProfile {
    fn default() -> Self {
        Self {
            url: "http://localhost:9080".to_string(),
            username: "admin".to_string(),
            password: "admin".to_string(),
            passphrase: "striim123".to_string(),
            accept_invalid_certs: false,
        }
    }
}

// Hand-written so credentials never reach a log line.
impl std::fmt::Debug for ServerProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerProfile")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"***")
            .field("passphrase", &"***")
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_strips_trailing_slash() {
        let profile = ServerProfile {
            url: "https://prod-striim:9081/".into(),
            ..ServerProfile::default()
        };
        assert_eq!(profile.base_url(), "https://prod-striim:9081");
    }

    #[test]
    fn debug_redacts_secrets() {
        let profile = ServerProfile {
            password: "hunter2".into(),
            passphrase: "prod789secure".into(),
            ..ServerProfile::default()
        };
        let rendered = format!("{profile:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("prod789secure"));
        assert!(rendered.contains("localhost:9080"));
    }

    #[test]
    fn accept_invalid_certs_defaults_to_false() {
        let profile: ServerProfile = serde_yaml::from_str(
            "url: http://h:9080\nusername: u\npassword: p\npassphrase: x\n",
        )
        .unwrap();
        assert!(!profile.accept_invalid_certs);
    }
}
