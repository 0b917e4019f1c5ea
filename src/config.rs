use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, TwistError};

const CONFIG_DIR: &str = "twist-cli";
const CONFIG_FILE: &str = "config.toml";
pub const TOKEN_ENV: &str = "TWIST_API_TOKEN";

/// Persistent CLI configuration.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct TwistConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(
        rename = "current-workspace",
        skip_serializing_if = "Option::is_none"
    )]
    pub current_workspace: Option<u64>,
}

/// Returns the config file path, honouring `XDG_CONFIG_HOME`.
pub fn config_path() -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let config_home = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home.join(".config"));
    config_home.join(CONFIG_DIR).join(CONFIG_FILE)
}

/// Reads config from disk, returning an empty config if missing.
pub fn read_config(path: &Path) -> Result<TwistConfig> {
    if !path.exists() {
        return Ok(TwistConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|err| TwistError::Config(err.to_string()))
}

/// Writes config to disk, creating parent directories as needed.
pub fn write_config(path: &Path, config: &TwistConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content =
        toml::to_string_pretty(config).map_err(|err| TwistError::Config(err.to_string()))?;
    std::fs::write(path, content)?;
    Ok(())
}

/// Applies `update` to the stored config and writes it back.
pub fn update_config(path: &Path, update: impl FnOnce(&mut TwistConfig)) -> Result<()> {
    let mut config = read_config(path)?;
    update(&mut config);
    write_config(path, &config)
}

/// The API token from `TWIST_API_TOKEN` or the config file.
pub fn api_token(path: &Path) -> Result<String> {
    let env = std::env::var(TOKEN_ENV).ok();
    token_from(env.as_deref(), &read_config(path)?).ok_or_else(|| {
        TwistError::Message(format!(
            "No API token found. Set {TOKEN_ENV} environment variable or run `tw login token <token>` (config: {})",
            path.display()
        ))
    })
}

fn token_from(env: Option<&str>, config: &TwistConfig) -> Option<String> {
    env.filter(|token| !token.is_empty())
        .map(str::to_string)
        .or_else(|| config.token.clone().filter(|token| !token.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_config_is_empty() {
        let dir = tempdir().expect("tempdir");
        let config = read_config(&dir.path().join("config.toml")).expect("read");
        assert_eq!(config, TwistConfig::default());
    }

    #[test]
    fn update_preserves_other_fields() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("config.toml");
        update_config(&path, |c| c.token = Some("secret".to_string())).expect("token");
        update_config(&path, |c| c.current_workspace = Some(42)).expect("workspace");

        let content = std::fs::read_to_string(&path).expect("read raw");
        assert!(content.contains("current-workspace = 42"));

        let config = read_config(&path).expect("read");
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.current_workspace, Some(42));
    }

    #[test]
    fn env_token_wins_over_config() {
        let config = TwistConfig {
            token: Some("from-config".to_string()),
            current_workspace: None,
        };
        assert_eq!(token_from(Some("from-env"), &config).as_deref(), Some("from-env"));
        assert_eq!(token_from(Some(""), &config).as_deref(), Some("from-config"));
        assert_eq!(token_from(None, &TwistConfig::default()), None);
    }

    #[test]
    fn rejects_malformed_config() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "current-workspace = \"nope\"").expect("write");
        assert!(matches!(read_config(&path), Err(TwistError::Config(_))));
    }
}
