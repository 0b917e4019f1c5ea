use console::style;

use crate::agent::{AgentConfig, agent_configs, find_agent};
use crate::cli::SkillCommand;
use crate::error::{Result, TwistError};
use crate::install::{SKILL_DESCRIPTION, SkillInstaller};
use crate::ui;

pub fn run_skill(command: SkillCommand) -> Result<()> {
    let installer = SkillInstaller::from_env()?;
    match command {
        SkillCommand::List { local } => list_agents(&installer, local),
        SkillCommand::Install {
            agent,
            local,
            force,
        } => {
            let agent = lookup(&agent)?;
            let path = installer.install(agent, local, force)?;
            ui::success(&format!("Installed {} {}", agent.name, location(local)));
            ui::info(&ui::dim(&format!("  {}", path.display())));
            Ok(())
        }
        SkillCommand::Uninstall { agent, local } => {
            let agent = lookup(&agent)?;
            installer.uninstall(agent, local)?;
            ui::success(&format!("Uninstalled {} {}", agent.name, location(local)));
            Ok(())
        }
    }
}

fn lookup(name: &str) -> Result<&'static AgentConfig> {
    find_agent(name).ok_or_else(|| {
        TwistError::Message(format!(
            "Unknown agent: {name}\nRun `tw skill list` to see available agents."
        ))
    })
}

fn location(local: bool) -> &'static str {
    if local { "locally" } else { "globally" }
}

fn list_agents(installer: &SkillInstaller, local: bool) -> Result<()> {
    let statuses = installer.list(agent_configs(), local);
    if statuses.is_empty() {
        ui::info("No agents available.");
        return Ok(());
    }

    let scope = if local { "local" } else { "global" };
    ui::info(&ui::bold(&format!("Available agents ({scope}):")));
    ui::info("");
    for status in statuses {
        let state = if status.installed {
            style("✓ installed").green().to_string()
        } else {
            ui::dim("not installed")
        };
        ui::info(&format!("  {}  {state}", ui::bold(status.agent.name)));
        ui::info(&format!("    {} ({SKILL_DESCRIPTION})", status.agent.display_name));
        if status.installed {
            ui::info(&format!("    {}", ui::dim(&status.path.display().to_string())));
        }
        ui::info("");
    }
    Ok(())
}
