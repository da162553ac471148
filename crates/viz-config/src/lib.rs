//! Configuration management for vizdoc.
//!
//! Parses `vizdoc.toml` files with serde. Every section and field is
//! optional; missing values fall back to defaults that match a local
//! deployment rendering against the public PlantUML server.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use viz_engine::{PageFormat, PageGeometry};

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Application configuration.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Diagram rendering configuration.
    pub render: RenderConfig,
    /// Artifact page configuration.
    pub page: PageConfig,
    /// Remote rendering services.
    pub remote: RemoteConfig,
}

/// Diagram rendering configuration.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Per-block wait timeout, in seconds.
    pub timeout_secs: u64,
    /// Delay before printing, letting embedded images lay out, in
    /// milliseconds.
    pub settle_delay_ms: u64,
    /// Minimum length for a bare-keyword block to count as a diagram.
    pub min_block_len: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            settle_delay_ms: 1000,
            min_block_len: 10,
        }
    }
}

impl RenderConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Artifact page configuration.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    /// Page format name, `a4` or `letter`.
    pub format: String,
    /// Page margin on all sides, in millimeters.
    pub margin_mm: u32,
    /// Whether backgrounds are printed.
    pub print_background: bool,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            format: "a4".to_owned(),
            margin_mm: 20,
            print_background: true,
        }
    }
}

impl PageConfig {
    /// Resolves the section into engine geometry.
    ///
    /// # Errors
    /// Returns `ConfigError::Validation` when the format name is unknown.
    pub fn geometry(&self) -> Result<PageGeometry, ConfigError> {
        let format = PageFormat::parse(&self.format).ok_or_else(|| {
            ConfigError::Validation(format!("unknown page format: {}", self.format))
        })?;
        Ok(PageGeometry {
            format,
            margin_mm: self.margin_mm,
            print_background: self.print_background,
        })
    }
}

/// Remote rendering services.
#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the PlantUML server.
    pub plantuml_url: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            plantuml_url: "https://www.plantuml.com/plantuml".to_owned(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`.
    ///
    /// # Errors
    /// Returns `ConfigError::NotFound` if the file does not exist, and
    /// parse or validation errors otherwise.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.remote.plantuml_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "remote.plantuml_url cannot be empty".to_owned(),
            ));
        }
        self.page.geometry().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write as _;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config.render.timeout(), Duration::from_secs(30));
        assert_eq!(config.render.settle_delay(), Duration::from_millis(1000));
        assert_eq!(config.render.min_block_len, 10);
        assert_eq!(config.page.geometry().unwrap(), PageGeometry::default());
        assert_eq!(config.remote.plantuml_url, "https://www.plantuml.com/plantuml");
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml_str(
            r#"
[render]
timeout_secs = 5

[page]
format = "letter"
margin_mm = 10
"#,
        )
        .unwrap();
        assert_eq!(config.render.timeout(), Duration::from_secs(5));
        // Untouched fields keep their defaults.
        assert_eq!(config.render.settle_delay_ms, 1000);
        let geometry = config.page.geometry().unwrap();
        assert_eq!(geometry.format, PageFormat::Letter);
        assert_eq!(geometry.margin_mm, 10);
        assert!(geometry.print_background);
    }

    #[test]
    fn test_unknown_page_format_rejected() {
        let result = Config::from_toml_str("[page]\nformat = \"a5\"\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_empty_plantuml_url_rejected() {
        let result = Config::from_toml_str("[remote]\nplantuml_url = \" \"\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vizdoc.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[render]\ntimeout_secs = 7").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.render.timeout_secs, 7);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load(&dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }
}
