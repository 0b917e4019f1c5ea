use std::path::Path;

use crate::cli::LoginCommand;
use crate::config::{config_path, update_config};
use crate::error::{Result, TwistError};
use crate::ui;

pub fn run_login(command: LoginCommand) -> Result<()> {
    match command {
        LoginCommand::Token { token } => {
            let path = config_path();
            save_token(&path, &token)?;
            ui::success("API token saved successfully!");
            ui::info(&ui::dim(&format!("Token saved to {}", path.display())));
            Ok(())
        }
    }
}

/// Stores the trimmed token, keeping the rest of the config.
pub fn save_token(path: &Path, token: &str) -> Result<()> {
    let token = token.trim();
    if token.is_empty() {
        return Err(TwistError::Message("Token cannot be empty".to_string()));
    }
    update_config(path, |config| config.token = Some(token.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::read_config;
    use tempfile::tempdir;

    #[test]
    fn saves_trimmed_token() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        update_config(&path, |c| c.current_workspace = Some(7)).expect("seed");

        save_token(&path, "  abc123\n").expect("save");

        let config = read_config(&path).expect("read");
        assert_eq!(config.token.as_deref(), Some("abc123"));
        assert_eq!(config.current_workspace, Some(7));
    }

    #[test]
    fn rejects_blank_token() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("config.toml");
        assert!(save_token(&path, "   ").is_err());
        assert!(!path.exists());
    }
}
