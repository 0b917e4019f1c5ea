use std::path::{Path, PathBuf};

use crate::agent::AgentConfig;
use crate::error::{Result, TwistError};

pub const SKILL_NAME: &str = "twist-cli";
pub const SKILL_DESCRIPTION: &str = "Twist messaging CLI for team communication";
const SKILL_FILE: &str = "SKILL.md";
const SKILLS_SUBDIR: &str = "skills";

/// Bundled skill file, frontmatter included.
pub const SKILL_CONTENT: &str = include_str!("../assets/SKILL.md");

/// Install status of one agent.
#[derive(Debug, Clone)]
pub struct AgentStatus {
    pub agent: AgentConfig,
    pub installed: bool,
    pub path: PathBuf,
}

/// Writes the skill file into agent directories under a home (global) or
/// project (local) root.
#[derive(Debug, Clone)]
pub struct SkillInstaller {
    home: PathBuf,
    project: PathBuf,
}

impl SkillInstaller {
    pub fn new(home: PathBuf, project: PathBuf) -> Self {
        Self { home, project }
    }

    /// Uses the user's home directory and the current directory.
    pub fn from_env() -> Result<Self> {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Ok(Self::new(home, std::env::current_dir()?))
    }

    fn base(&self, local: bool) -> &Path {
        if local { &self.project } else { &self.home }
    }

    /// `<root>/<agent-dir>/skills/twist-cli/SKILL.md`
    pub fn install_path(&self, agent: &AgentConfig, local: bool) -> PathBuf {
        self.base(local)
            .join(agent.dir_name)
            .join(SKILLS_SUBDIR)
            .join(SKILL_NAME)
            .join(SKILL_FILE)
    }

    pub fn is_installed(&self, agent: &AgentConfig, local: bool) -> bool {
        self.install_path(agent, local).is_file()
    }

    pub fn install(&self, agent: &AgentConfig, local: bool, force: bool) -> Result<PathBuf> {
        if !local {
            let agent_dir = self.home.join(agent.dir_name);
            if !agent_dir.is_dir() {
                return Err(TwistError::Message(format!(
                    "{} does not appear to be installed ({} not found)",
                    agent.name,
                    agent_dir.display()
                )));
            }
        }

        let path = self.install_path(agent, local);
        if path.exists() && !force {
            return Err(TwistError::Message(format!(
                "Skill already installed at {}. Use --force to overwrite.",
                path.display()
            )));
        }

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, SKILL_CONTENT)?;
        tracing::debug!(path = %path.display(), "installed skill");
        Ok(path)
    }

    /// Removes the whole `twist-cli` skill directory.
    pub fn uninstall(&self, agent: &AgentConfig, local: bool) -> Result<PathBuf> {
        let path = self.install_path(agent, local);
        if !path.exists() {
            return Err(TwistError::Message(format!(
                "Skill not installed at {}",
                path.display()
            )));
        }
        let skill_dir = path.parent().unwrap_or(&path).to_path_buf();
        std::fs::remove_dir_all(&skill_dir)?;
        Ok(skill_dir)
    }

    pub fn list(&self, agents: &[AgentConfig], local: bool) -> Vec<AgentStatus> {
        agents
            .iter()
            .map(|agent| AgentStatus {
                agent: *agent,
                installed: self.is_installed(agent, local),
                path: self.install_path(agent, local),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_skill_has_frontmatter() {
        assert!(SKILL_CONTENT.starts_with("---\n"));
        assert!(SKILL_CONTENT.contains(&format!("name: {SKILL_NAME}")));
        assert!(SKILL_CONTENT.contains(&format!("description: {SKILL_DESCRIPTION}")));
    }
}
