//! Tool configuration: YAML file, env substitution, validation.

pub mod parser;
pub mod types;
pub mod validator;

use std::path::Path;

use anyhow::Result;

pub use types::{AdvancedConfig, ProcessingConfig, ProfileOverrides, Target, ToolConfig};

/// Config file looked up in the working directory when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "tqlshift.yaml";

/// Load and validate the tool configuration.
///
/// An explicitly named file must exist. Without one, `tqlshift.yaml` in
/// the working directory is used if present, else the built-in defaults.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load(explicit: Option<&Path>) -> Result<ToolConfig> {
    let config = match explicit {
        Some(path) => parser::parse_config(path)?,
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            parser::parse_config(Path::new(DEFAULT_CONFIG_FILE))?
        }
        None => {
            tracing::debug!("No {DEFAULT_CONFIG_FILE} found; using built-in defaults");
            ToolConfig::default()
        }
    };
    validator::validate_config(&config)?;
    Ok(config)
}
