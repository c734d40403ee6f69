use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_format")]
    pub default_format: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_format() -> String {
    "text".to_string()
}
fn default_color() -> String {
    "auto".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_format: default_format(),
            color: default_color(),
        }
    }
}

/// Default input files, used when neither a flag nor an env var names one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Paths {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workloads: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub paths: Paths,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("clustercost").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if !["text", "json"].contains(&self.settings.default_format.as_str()) {
            issues.push(format!(
                "Invalid default_format: '{}' (must be 'text' or 'json')",
                self.settings.default_format
            ));
        }
        if !["auto", "always", "never"].contains(&self.settings.color.as_str()) {
            issues.push(format!(
                "Invalid color: '{}' (must be 'auto', 'always', or 'never')",
                self.settings.color
            ));
        }
        for (key, path) in [
            ("catalog", &self.paths.catalog),
            ("workloads", &self.paths.workloads),
        ] {
            if let Some(path) = path {
                if !path.exists() {
                    issues.push(format!(
                        "paths.{}: file not found: {}",
                        key,
                        path.display()
                    ));
                }
            }
        }
        if let Some(catalog) = &self.paths.catalog {
            let ext = catalog.extension().and_then(|e| e.to_str()).unwrap_or("");
            if !["json", "toml"].contains(&ext) {
                issues.push(format!(
                    "paths.catalog: unsupported extension '{}' (must be .json or .toml)",
                    ext
                ));
            }
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("clustercost-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn default_settings_are_valid() {
        let config = AppConfig::default();
        let issues = config.validate();
        assert!(issues.is_empty(), "Default config should be valid, got: {:?}", issues);
    }

    #[test]
    fn default_format_is_text() {
        let settings = Settings::default();
        assert_eq!(settings.default_format, "text");
    }

    #[test]
    fn default_color_is_auto() {
        let settings = Settings::default();
        assert_eq!(settings.color, "auto");
    }

    #[test]
    fn validate_catches_invalid_format() {
        let mut config = AppConfig::default();
        config.settings.default_format = "xml".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("default_format")));
    }

    #[test]
    fn validate_catches_invalid_color() {
        let mut config = AppConfig::default();
        config.settings.color = "blue".to_string();
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("color")));
    }

    #[test]
    fn validate_catches_missing_input_files() {
        let mut config = AppConfig::default();
        config.paths.workloads = Some(PathBuf::from("/nonexistent/clustercost/workloads.toml"));
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("paths.workloads")));
    }

    #[test]
    fn validate_catches_unsupported_catalog_extension() {
        let mut config = AppConfig::default();
        config.paths.catalog = Some(PathBuf::from("/nonexistent/catalog.yaml"));
        let issues = config.validate();
        assert!(issues.iter().any(|i| i.contains("unsupported extension 'yaml'")));
    }

    #[test]
    fn parse_minimal_toml() {
        let toml = r#"
[settings]
default_format = "json"
color = "always"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.settings.default_format, "json");
        assert_eq!(config.settings.color, "always");
        assert!(config.paths.catalog.is_none());
    }

    #[test]
    fn parse_paths_toml() {
        let toml = r#"
[paths]
catalog = "/srv/pricing/catalog.json"
workloads = "team.toml"
"#;
        let config: AppConfig = toml::from_str(toml).unwrap();
        assert_eq!(
            config.paths.catalog,
            Some(PathBuf::from("/srv/pricing/catalog.json"))
        );
        assert_eq!(config.paths.workloads, Some(PathBuf::from("team.toml")));
        assert_eq!(config.settings.default_format, "text");
    }

    #[test]
    fn parse_empty_toml_gives_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.settings.default_format, "text");
        assert_eq!(config.settings.color, "auto");
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = scratch_dir("save");
        let path = dir.join("config.toml");
        let mut config = AppConfig::default();
        config.settings.default_format = "json".to_string();
        config.paths.catalog = Some(PathBuf::from("catalog.toml"));
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.settings.default_format, "json");
        assert_eq!(loaded.paths.catalog, Some(PathBuf::from("catalog.toml")));
        assert!(loaded.paths.workloads.is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn load_missing_file_gives_defaults() {
        let dir = scratch_dir("missing");
        let config = AppConfig::load_from(&dir.join("config.toml")).unwrap();
        assert_eq!(config.settings.color, "auto");
    }

    #[test]
    fn load_reports_parse_errors() {
        let dir = scratch_dir("broken");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "[settings\ncolor = ").unwrap();
        assert!(matches!(
            AppConfig::load_from(&path),
            Err(ConfigError::ParseError(_))
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn config_path_uses_xdg_when_set() {
        std::env::set_var("XDG_CONFIG_HOME", "/tmp/test_xdg_config");
        let path = AppConfig::config_path();
        std::env::remove_var("XDG_CONFIG_HOME");
        assert_eq!(
            path,
            PathBuf::from("/tmp/test_xdg_config/clustercost/config.toml")
        );
    }
}
