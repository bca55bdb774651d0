//! Configuration file loading
//!
//! ```toml
//! [validate]
//! forbidden_commands = ["includegraphics", "input"]
//! max_listed_math_commands = 3
//!
//! [convert]
//! render_header = false
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::latex2html::ConvertOptions;
use crate::core::validate::ValidateOptions;
use crate::utils::error::{PreviewError, PreviewResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub validate: ValidateOptions,
    pub convert: ConvertOptions,
}

impl Config {
    /// Parse a TOML document.
    pub fn from_toml_str(source: &str) -> PreviewResult<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> PreviewResult<Self> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&source).map_err(|e| e.with_path(path.display().to_string()))?;
        debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> PreviewResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Reject values that parse but make no sense.
pub fn check_config(config: &Config) -> PreviewResult<()> {
    if let Some(name) = config
        .validate
        .forbidden_commands
        .iter()
        .find(|name| name.is_empty() || name.starts_with('\\'))
    {
        return Err(PreviewError::config(format!(
            "forbidden command {:?} must be a bare command name",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.validate.forbidden_commands, vec!["includegraphics"]);
        assert_eq!(config.validate.max_listed_math_commands, 5);
        assert!(config.convert.render_header);
        assert!(config.convert.external_links_new_tab);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml_str(
            "[validate]\nmax_listed_math_commands = 2\n\n[convert]\nrender_header = false\n",
        )
        .unwrap();
        assert_eq!(config.validate.max_listed_math_commands, 2);
        assert_eq!(config.validate.forbidden_commands, vec!["includegraphics"]);
        assert!(!config.convert.render_header);
        assert!(config.convert.external_links_new_tab);
    }

    #[test]
    fn test_unknown_section_rejected() {
        let err = Config::from_toml_str("[render]\nx = 1\n").unwrap_err();
        assert!(matches!(err, PreviewError::InvalidConfig { .. }));
    }

    #[test]
    fn test_check_config() {
        let mut config = Config::default();
        assert!(check_config(&config).is_ok());
        config.validate.forbidden_commands.push("\\input".to_string());
        assert!(check_config(&config).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/texpreview.toml").unwrap_err();
        assert!(matches!(err, PreviewError::IoError { .. }));
    }
}
