use tempfile::tempdir;
use twist_cli::agent::{agent_configs, find_agent};
use twist_cli::install::{SKILL_CONTENT, SkillInstaller};

fn installer() -> (SkillInstaller, tempfile::TempDir) {
    let dir = tempdir().expect("tempdir");
    let home = dir.path().join("home");
    let project = dir.path().join("project");
    std::fs::create_dir_all(&home).expect("home");
    std::fs::create_dir_all(&project).expect("project");
    (SkillInstaller::new(home, project), dir)
}

#[test]
fn install_path_layout() {
    let (installer, dir) = installer();
    let agent = find_agent("claude-code").expect("agent");
    assert_eq!(
        installer.install_path(agent, false),
        dir.path().join("home/.claude/skills/twist-cli/SKILL.md")
    );
    assert_eq!(
        installer.install_path(agent, true),
        dir.path().join("project/.claude/skills/twist-cli/SKILL.md")
    );
}

#[test]
fn local_install_writes_skill_file() {
    let (installer, _dir) = installer();
    let agent = find_agent("codex").expect("agent");

    let path = installer.install(agent, true, false).expect("install");
    assert!(installer.is_installed(agent, true));
    assert!(!installer.is_installed(agent, false));
    assert_eq!(std::fs::read_to_string(&path).expect("read"), SKILL_CONTENT);
}

#[test]
fn global_install_requires_agent_dir() {
    let (installer, dir) = installer();
    let agent = find_agent("cursor").expect("agent");

    let err = installer.install(agent, false, false).expect_err("missing agent");
    assert!(err.to_string().contains("does not appear to be installed"));

    std::fs::create_dir_all(dir.path().join("home/.cursor")).expect("agent dir");
    installer.install(agent, false, false).expect("install");
    assert!(installer.is_installed(agent, false));
}

#[test]
fn reinstall_needs_force() {
    let (installer, _dir) = installer();
    let agent = find_agent("claude-code").expect("agent");
    let path = installer.install(agent, true, false).expect("install");
    std::fs::write(&path, "stale").expect("overwrite");

    let err = installer.install(agent, true, false).expect_err("exists");
    assert!(err.to_string().contains("Use --force to overwrite"));

    installer.install(agent, true, true).expect("force");
    assert_eq!(std::fs::read_to_string(&path).expect("read"), SKILL_CONTENT);
}

#[test]
fn uninstall_removes_skill_dir() {
    let (installer, _dir) = installer();
    let agent = find_agent("claude-code").expect("agent");

    let err = installer.uninstall(agent, true).expect_err("not installed");
    assert!(err.to_string().starts_with("Skill not installed at"));

    let path = installer.install(agent, true, false).expect("install");
    let removed = installer.uninstall(agent, true).expect("uninstall");
    assert_eq!(Some(removed.as_path()), path.parent());
    assert!(!removed.exists());
    assert!(removed.parent().is_some_and(|skills| skills.exists()));
}

#[test]
fn lists_every_agent_with_status() {
    let (installer, _dir) = installer();
    let agent = find_agent("claude-code").expect("agent");
    installer.install(agent, true, false).expect("install");

    let statuses = installer.list(agent_configs(), true);
    assert_eq!(statuses.len(), agent_configs().len());
    let installed: Vec<&str> = statuses
        .iter()
        .filter(|s| s.installed)
        .map(|s| s.agent.name)
        .collect();
    assert_eq!(installed, vec!["claude-code"]);
}
