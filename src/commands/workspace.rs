use console::style;

use crate::cli::OutputArgs;
use crate::config::update_config;
use crate::error::Result;
use crate::output::{EntityKind, Format, print_json, print_ndjson};
use crate::session::Session;
use crate::ui;

pub fn run_workspaces(session: &mut Session, output: OutputArgs) -> Result<()> {
    let workspaces = session.workspaces()?.to_vec();
    if workspaces.is_empty() {
        ui::info("No workspaces found.");
        return Ok(());
    }

    match output.format() {
        Format::Json => return print_json(&workspaces, Some(EntityKind::Workspace), output.full),
        Format::Ndjson => {
            return print_ndjson(&workspaces, Some(EntityKind::Workspace), output.full);
        }
        Format::Text => {}
    }

    let current = session.current_workspace_id().ok();
    for workspace in &workspaces {
        let is_current = current == Some(workspace.id);
        let name = if is_current {
            ui::bold(&workspace.name)
        } else {
            workspace.name.clone()
        };
        let marker = if is_current {
            style(" (current)").green().to_string()
        } else {
            String::new()
        };
        let plan = workspace
            .plan
            .as_deref()
            .map(|plan| ui::channel().apply_to(format!("[{plan}]")).to_string())
            .unwrap_or_default();
        ui::info(&format!("{}  {name}{marker} {plan}", ui::id_tag(workspace.id)));
    }
    Ok(())
}

pub fn run_workspace_use(session: &mut Session, reference: &str) -> Result<()> {
    let workspace = session.resolve_workspace(reference)?;
    update_config(session.config_path(), |config| {
        config.current_workspace = Some(workspace.id)
    })?;
    tracing::debug!(workspace_id = workspace.id, "switched workspace");
    ui::success(&format!("Switched to workspace: {}", workspace.name));
    Ok(())
}
