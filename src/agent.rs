/// A coding agent that can load the bundled `tw` skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentConfig {
    pub name: &'static str,
    pub display_name: &'static str,
    /// Directory under the home or project root holding the agent's config.
    pub dir_name: &'static str,
}

const AGENTS: &[AgentConfig] = &[
    AgentConfig {
        name: "claude-code",
        display_name: "Claude Code",
        dir_name: ".claude",
    },
    AgentConfig {
        name: "codex",
        display_name: "Codex",
        dir_name: ".codex",
    },
    AgentConfig {
        name: "cursor",
        display_name: "Cursor",
        dir_name: ".cursor",
    },
    AgentConfig {
        name: "opencode",
        display_name: "OpenCode",
        dir_name: ".opencode",
    },
    AgentConfig {
        name: "windsurf",
        display_name: "Windsurf",
        dir_name: ".windsurf",
    },
];

/// Returns the full list of known agents.
pub fn agent_configs() -> &'static [AgentConfig] {
    AGENTS
}

pub fn find_agent(name: &str) -> Option<&'static AgentConfig> {
    AGENTS.iter().find(|agent| agent.name == name)
}
