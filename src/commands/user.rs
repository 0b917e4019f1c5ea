use console::style;

use crate::cli::{OutputArgs, UsersArgs};
use crate::error::Result;
use crate::models::WorkspaceUser;
use crate::output::{EntityKind, Format, print_json, print_ndjson};
use crate::session::Session;
use crate::ui;

pub fn run_user(session: &mut Session, output: OutputArgs) -> Result<()> {
    let user = session.session_user()?;
    match output.format() {
        Format::Json => return print_json(&user, Some(EntityKind::User), output.full),
        Format::Ndjson => {
            return print_ndjson(std::slice::from_ref(&user), Some(EntityKind::User), output.full);
        }
        Format::Text => {}
    }

    ui::info(&ui::bold(&user.name));
    ui::info("");
    ui::info(&format!("ID:        {}", user.id));
    ui::info(&format!("Email:     {}", user.email));
    ui::info(&format!("Timezone:  {}", user.timezone));
    if let Some(workspace_id) = user.default_workspace {
        ui::info(&format!("Default:   workspace id:{workspace_id}"));
    }
    Ok(())
}

pub fn run_users(session: &mut Session, args: UsersArgs) -> Result<()> {
    let workspace_id = super::selected_workspace(session, &args.selector)?;
    let mut users = session.client().workspace_users(workspace_id)?;
    if let Some(search) = &args.search {
        users = filter_users(users, search);
    }

    if users.is_empty() {
        ui::info("No users found.");
        return Ok(());
    }

    let output = args.output;
    match output.format() {
        Format::Json => return print_json(&users, Some(EntityKind::User), output.full),
        Format::Ndjson => return print_ndjson(&users, Some(EntityKind::User), output.full),
        Format::Text => {}
    }

    for user in &users {
        let email = user
            .email
            .as_deref()
            .map(|email| ui::dim(&format!("<{email}>")))
            .unwrap_or_default();
        let kind = ui::channel().apply_to(format!("[{}]", user.user_type));
        let bot = if user.bot {
            style(" [bot]").yellow().to_string()
        } else {
            String::new()
        };
        ui::info(&format!(
            "{}  {} {email} {kind}{bot}",
            ui::id_tag(user.id),
            user.name
        ));
    }
    Ok(())
}

/// Case-insensitive substring match on name or email.
pub fn filter_users(users: Vec<WorkspaceUser>, search: &str) -> Vec<WorkspaceUser> {
    let needle = search.to_lowercase();
    users
        .into_iter()
        .filter(|user| {
            user.name.to_lowercase().contains(&needle)
                || user
                    .email
                    .as_deref()
                    .is_some_and(|email| email.to_lowercase().contains(&needle))
        })
        .collect()
}
