use std::path::{Path, PathBuf};

use compact_str::ToCompactString;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::result::{GistrError, Result};

/// Settings read from `gistr.toml`
#[derive(Default, Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct GistrConfig {
    /// Client id of the GitHub OAuth App
    pub client_id: String,
    /// Client secret of the GitHub OAuth App
    pub client_secret: String,
    /// REST API base URL, for GitHub Enterprise
    pub api_url: Option<String>,
    /// Base URL of the OAuth endpoints, for GitHub Enterprise
    pub oauth_url: Option<String>,
    /// Log level, or "Off"
    pub log_level: Option<String>,
}

impl GistrConfig {
    /// Credentials from the environment win over the file
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(client_id) = std::env::var("GISTR_CLIENT_ID") {
            self.client_id = client_id;
        }
        if let Ok(client_secret) = std::env::var("GISTR_CLIENT_SECRET") {
            self.client_secret = client_secret;
        }
        self
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.client_id.trim().is_empty() {
            return Err("client_id is required".to_string());
        }
        if self.client_secret.trim().is_empty() {
            return Err("client_secret is required".to_string());
        }
        Ok(())
    }
}

pub fn default_config_path() -> PathBuf {
    if let Some(dirs) = BaseDirs::new() {
        dirs.config_dir().join("gistr.toml")
    } else {
        PathBuf::from("gistr.toml")
    }
}

/// Settings as stored on disk, without environment overrides
pub fn load_config_file(config_file: &Path) -> Result<GistrConfig> {
    if config_file.exists() {
        confy::load_path(config_file).map_err(|e| GistrError::ConfigError(e.to_compact_string()))
    } else {
        Ok(GistrConfig::default())
    }
}

pub fn load_config(config_file: &Path) -> Result<GistrConfig> {
    Ok(load_config_file(config_file)?.with_env_overrides())
}

pub fn save_config(config_file: &Path, config: &GistrConfig) -> Result<()> {
    confy::store_path(config_file, config)
        .map_err(|e| GistrError::ConfigError(e.to_compact_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gistr-{}-{name}.toml", std::process::id()))
    }

    #[test]
    fn test_validate() {
        assert!(GistrConfig::default().validate().is_err());

        let config = GistrConfig {
            client_id: "client".into(),
            client_secret: "secret".into(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let path = temp_config_path("round-trip");
        let config = GistrConfig {
            client_id: "client".into(),
            client_secret: "secret".into(),
            api_url: Some("https://github.example.com/api/v3".into()),
            oauth_url: None,
            log_level: Some("debug".into()),
        };

        save_config(&path, &config).unwrap();
        let loaded = load_config_file(&path).unwrap();
        assert_eq!(loaded, config);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_file_yields_default() {
        let path = temp_config_path("missing");
        let config = load_config(&path).unwrap();
        assert_eq!(config.api_url, None);
    }
}
