//! Configuration for a locale strings context.

use crate::error::{I18nError, I18nResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding [`I18nConfig::root_path`].
pub const ENV_ROOT: &str = "LOCALE_STRINGS_ROOT";
/// Environment variable overriding [`I18nConfig::folder`].
pub const ENV_FOLDER: &str = "LOCALE_STRINGS_FOLDER";
/// Environment variable overriding [`I18nConfig::default_locale`].
pub const ENV_LOCALE: &str = "LOCALE_STRINGS_LOCALE";

/// Settings for loading and resolving string tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct I18nConfig {
    /// Root that the string-table folder is resolved against.
    pub root_path: PathBuf,
    /// Folder, relative to the root, holding the string-table sources.
    pub folder: PathBuf,
    /// Locale used instead of the system-detected one.
    pub default_locale: Option<String>,
    /// Fall back to CLDR plural rules when no per-language rules apply.
    pub use_system_plurals: bool,
    /// Deepest container nesting that template traversal will enter.
    pub max_depth: usize,
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            root_path: PathBuf::from("."),
            folder: PathBuf::from("i18n/"),
            default_locale: None,
            use_system_plurals: true,
            max_depth: 64,
        }
    }
}

impl I18nConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml_str(text: &str) -> I18nResult<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| I18nError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> I18nResult<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {:?}", path);
        let text = fs::read_to_string(path).map_err(|source| I18nError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Applies overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_with(|name| std::env::var(name).ok());
    }

    /// Applies overrides read through `lookup`; empty values are ignored.
    pub fn apply_overrides_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(root) = lookup(ENV_ROOT) {
            self.root_path = PathBuf::from(root);
        }
        if let Some(folder) = lookup(ENV_FOLDER) {
            self.folder = PathBuf::from(folder);
        }
        if let Some(locale) = lookup(ENV_LOCALE) {
            self.default_locale = Some(locale);
        }
    }

    /// Validates the configuration.
    pub fn validate(&self) -> I18nResult<()> {
        if self.max_depth == 0 {
            return Err(I18nError::Config("max_depth must be greater than 0".to_string()));
        }
        if self.folder.is_absolute() {
            return Err(I18nError::Config(format!(
                "folder must be relative to root_path, got {}",
                self.folder.display()
            )));
        }
        if matches!(self.default_locale.as_deref(), Some(l) if l.trim().is_empty()) {
            return Err(I18nError::Config("default_locale must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = I18nConfig::default();
        assert_eq!(config.folder, PathBuf::from("i18n/"));
        assert!(config.use_system_plurals);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = I18nConfig::from_toml_str(
            r#"
root_path = "/srv/app"
default_locale = "fr-CA"
"#,
        )
        .unwrap();

        assert_eq!(config.root_path, PathBuf::from("/srv/app"));
        assert_eq!(config.default_locale.as_deref(), Some("fr-CA"));
        assert_eq!(config.max_depth, 64);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            I18nConfig::from_toml_str("max_depth = 0"),
            Err(I18nError::Config(_))
        ));
        assert!(matches!(
            I18nConfig::from_toml_str("max_depth = \"deep\""),
            Err(I18nError::Config(_))
        ));
        assert!(I18nConfig::from_toml_str("folder = \"/abs/i18n\"").is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = I18nConfig::default();
        config.apply_overrides_with(|name| match name {
            ENV_ROOT => Some("/data".to_string()),
            ENV_LOCALE => Some("de-DE".to_string()),
            ENV_FOLDER => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.root_path, PathBuf::from("/data"));
        assert_eq!(config.folder, PathBuf::from("i18n/"));
        assert_eq!(config.default_locale.as_deref(), Some("de-DE"));
    }
}
