//! Tool YAML parsing with environment variable substitution.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result};
use regex::Regex;

use crate::config::types::ToolConfig;

static ENV_VAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("valid env var regex"));

/// Substitute `${VAR_NAME}` patterns with environment variable values.
///
/// # Errors
///
/// Returns an error naming every referenced variable that is not set.
pub fn substitute_env_vars(input: &str) -> Result<String> {
    let mut missing = Vec::new();
    let substituted = ENV_VAR_RE.replace_all(input, |caps: &regex::Captures<'_>| {
        std::env::var(&caps[1]).unwrap_or_else(|_| {
            missing.push(caps[1].to_string());
            String::new()
        })
    });

    if !missing.is_empty() {
        missing.sort();
        missing.dedup();
        anyhow::bail!("Missing environment variable(s): {}", missing.join(", "));
    }

    Ok(substituted.into_owned())
}

/// Parse a tool YAML string (after env var substitution).
///
/// # Errors
///
/// Returns an error if env var substitution fails or the YAML is invalid.
pub fn parse_config_str(yaml_str: &str) -> Result<ToolConfig> {
    let substituted = substitute_env_vars(yaml_str)?;
    if substituted.trim().is_empty() {
        return Ok(ToolConfig::default());
    }
    let config: ToolConfig =
        serde_yaml::from_str(&substituted).context("Failed to parse config YAML")?;
    Ok(config)
}

/// Parse a tool YAML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the YAML is invalid.
pub fn parse_config(path: &Path) -> Result<ToolConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config_str(&content).with_context(|| format!("In config file {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("TQS_TEST_HOST", "striim.example.com");
        let input = "url: https://${TQS_TEST_HOST}:9081";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "url: https://striim.example.com:9081");
        std::env::remove_var("TQS_TEST_HOST");
    }

    #[test]
    fn test_multiple_env_vars() {
        std::env::set_var("TQS_TEST_A", "alpha");
        std::env::set_var("TQS_TEST_B", "beta");
        let input = "${TQS_TEST_A} and ${TQS_TEST_B}";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, "alpha and beta");
        std::env::remove_var("TQS_TEST_A");
        std::env::remove_var("TQS_TEST_B");
    }

    #[test]
    fn test_no_env_vars_passthrough() {
        let input = "processing:\n  stage_directory: stage";
        let result = substitute_env_vars(input).unwrap();
        assert_eq!(result, input);
    }

    #[test]
    fn test_multiple_missing_env_vars_all_reported() {
        let input = "${TQS_MISSING_X} and ${TQS_MISSING_Y}";
        let err_msg = substitute_env_vars(input).unwrap_err().to_string();
        assert!(err_msg.contains("TQS_MISSING_X"));
        assert!(err_msg.contains("TQS_MISSING_Y"));
    }

    #[test]
    fn test_repeated_missing_env_var_reported_once() {
        let input = "${TQS_MISSING_Q} ${TQS_MISSING_P} ${TQS_MISSING_Q}";
        let err_msg = substitute_env_vars(input).unwrap_err().to_string();
        assert_eq!(
            err_msg,
            "Missing environment variable(s): TQS_MISSING_P, TQS_MISSING_Q"
        );
    }

    #[test]
    fn test_parse_config_from_string() {
        std::env::set_var("TQS_TEST_EXPORT_PASS", "s3cret");
        let yaml = r#"
version: "1.0"
export:
  url: https://source:9081
  password: ${TQS_TEST_EXPORT_PASS}
advanced:
  request_timeout_secs: 60
"#;
        let config = parse_config_str(yaml).unwrap();
        assert_eq!(config.export.password.as_deref(), Some("s3cret"));
        assert_eq!(config.advanced.request_timeout_secs, 60);
        assert_eq!(config.advanced.auth_timeout_secs, 10);
        std::env::remove_var("TQS_TEST_EXPORT_PASS");
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = parse_config_str("\n  \n").unwrap();
        assert_eq!(config.version, "1.0");
    }

    #[test]
    fn test_parse_invalid_yaml_errors() {
        let yaml = "this is not: [valid: yaml: {{{}}}";
        assert!(parse_config_str(yaml).is_err());
    }

    #[test]
    fn test_parse_config_file_not_found() {
        let err_msg = parse_config(Path::new("/nonexistent/tqlshift.yaml"))
            .unwrap_err()
            .to_string();
        assert!(err_msg.contains("Failed to read config file"));
    }
}
