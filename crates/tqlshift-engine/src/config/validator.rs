//! Semantic validation for parsed tool configuration values.

use anyhow::{bail, Result};

use crate::config::types::{ProfileOverrides, ToolConfig};

fn validate_profile(profile: &ProfileOverrides, context: &str, errors: &mut Vec<String>) {
    if let Some(url) = &profile.url {
        let trimmed = url.trim();
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            errors.push(format!(
                "{context}: url '{url}' must start with http:// or https://"
            ));
        }
    }
    if let Some(username) = &profile.username {
        if username.trim().is_empty() {
            errors.push(format!("{context}: username must not be empty"));
        }
    }
}

/// Validate a parsed tool configuration.
/// Returns `Ok(())` if valid, Err with all validation errors if not.
///
/// # Errors
///
/// Returns an error listing all validation failures found in the config.
pub fn validate_config(config: &ToolConfig) -> Result<()> {
    let mut errors = Vec::new();

    if config.version != "1.0" {
        errors.push(format!(
            "Unsupported config version '{}', expected '1.0'",
            config.version
        ));
    }

    validate_profile(&config.export, "export", &mut errors);
    validate_profile(&config.import, "import", &mut errors);
    for (name, profile) in &config.environments {
        if name.trim().is_empty() {
            errors.push("Environment names must not be empty".to_string());
        }
        validate_profile(profile, &format!("environments.{name}"), &mut errors);
    }

    if config.advanced.request_timeout_secs == 0 {
        errors.push("request_timeout_secs must be > 0".to_string());
    }
    if config.advanced.auth_timeout_secs == 0 {
        errors.push("auth_timeout_secs must be > 0".to_string());
    }
    if !config
        .advanced
        .export_archive_name
        .to_ascii_lowercase()
        .ends_with(".zip")
    {
        errors.push(format!(
            "export_archive_name '{}' must end with .zip",
            config.advanced.export_archive_name
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        bail!("Config validation failed:\n  - {}", errors.join("\n  - "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parser::parse_config_str;

    fn valid_yaml() -> &'static str {
        r#"
version: "1.0"
export:
  url: https://source:9081
  username: admin
import:
  url: http://target:9080
environments:
  prod:
    url: https://prod:9081
"#
    }

    #[test]
    fn test_valid_config_passes() {
        let config = parse_config_str(valid_yaml()).unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_default_config_passes() {
        assert!(validate_config(&ToolConfig::default()).is_ok());
    }

    #[test]
    fn test_wrong_version_fails() {
        let yaml = valid_yaml().replace("\"1.0\"", "\"2.0\"");
        let config = parse_config_str(&yaml).unwrap();
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("Unsupported config version"));
    }

    #[test]
    fn test_bad_scheme_fails() {
        let yaml = valid_yaml().replace("https://prod:9081", "prod:9081");
        let config = parse_config_str(&yaml).unwrap();
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("environments.prod: url 'prod:9081'"));
    }

    #[test]
    fn test_empty_username_fails() {
        let yaml = valid_yaml().replace("username: admin", "username: \"\"");
        let config = parse_config_str(&yaml).unwrap();
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("export: username must not be empty"));
    }

    #[test]
    fn test_all_errors_reported_together() {
        let yaml = r#"
version: "1.0"
advanced:
  request_timeout_secs: 0
  auth_timeout_secs: 0
  export_archive_name: apps.tar
"#;
        let config = parse_config_str(yaml).unwrap();
        let err = validate_config(&config).unwrap_err().to_string();
        assert!(err.contains("request_timeout_secs"));
        assert!(err.contains("auth_timeout_secs"));
        assert!(err.contains("must end with .zip"));
    }
}
