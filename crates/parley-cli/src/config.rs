//! Configuration file support

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for parley
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation backend (echo, http)
    pub backend: Option<String>,
    /// Endpoint for the http backend
    pub endpoint: Option<String>,
    /// Simulated latency of the echo backend
    pub echo_delay_ms: Option<u64>,
    /// Timeout for http backend requests
    pub request_timeout_secs: Option<u64>,
    /// Default tone for briefs and tone refinements
    pub tone: Option<String>,
    /// Default platform for briefs
    pub platform: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("parley")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        if let Ok(path) = std::env::var("PARLEY_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`, falling back to defaults on any problem
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Save config to `path`
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        let default_config = Config {
            backend: Some("echo".to_string()),
            endpoint: None,
            echo_delay_ms: Some(2000),
            request_timeout_secs: Some(60),
            tone: Some("professional".to_string()),
            platform: Some("twitter".to_string()),
        };

        default_config.save_to(&path)?;
        Ok(path)
    }
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# parley configuration file
# Place at ~/.config/parley/config.toml (Linux/Mac) or %APPDATA%\parley\config.toml (Windows)

# Generation backend (echo, http)
backend = "echo"

# Endpoint for the http backend. Receives {"prompt": "..."} and answers
# {"response": "..."} or {"error": "..."}
# endpoint = "http://localhost:5000/chat"

# Simulated latency of the echo backend
echo_delay_ms = 2000

# Timeout for http backend requests
request_timeout_secs = 60

# Defaults for /brief and /refine changeTone (casual, professional, humorous, informative)
tone = "professional"

# Default platform for /brief (twitter, facebook, linkedin, instagram)
platform = "twitter"
"#
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("parley-config-test-{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn test_example_config_parses() {
        let config: Config = toml::from_str(example_config()).unwrap();
        assert_eq!(config.backend.as_deref(), Some("echo"));
        assert_eq!(config.echo_delay_ms, Some(2000));
        assert_eq!(config.endpoint, None);
    }

    #[test]
    fn test_missing_fields_default() {
        let config: Config = toml::from_str("tone = \"casual\"").unwrap();
        assert_eq!(config.tone.as_deref(), Some("casual"));
        assert_eq!(config.backend, None);
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip/config.toml");
        let config = Config {
            backend: Some("http".into()),
            endpoint: Some("http://localhost:5000/chat".into()),
            request_timeout_secs: Some(5),
            ..Default::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path), config);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_missing_or_invalid_file_gives_defaults() {
        assert_eq!(
            Config::load_from(&temp_path("does-not-exist.toml")),
            Config::default()
        );

        let path = temp_path("invalid/config.toml");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "backend = [not toml").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
        let _ = fs::remove_file(&path);
    }
}
