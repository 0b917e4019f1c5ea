use std::collections::HashMap;

use serde_json::json;

use crate::api::Window;
use crate::cli::{MsgArgs, MsgCommand, MsgViewOptions, OutputArgs, WorkspaceSelector};
use crate::dates::format_relative;
use crate::error::{Result, TwistError};
use crate::input::reply_content;
use crate::markdown::render_markdown;
use crate::models::Conversation;
use crate::output::{EntityKind, Format, print_json, print_ndjson, tagged_line, with_fields};
use crate::refs::resolve_conversation_id;
use crate::session::Session;
use crate::ui;

pub fn run_msg(session: &mut Session, args: MsgArgs) -> Result<()> {
    match args.command {
        Some(MsgCommand::Unread { selector, output }) => show_unread(session, &selector, output),
        Some(MsgCommand::View { reference, options }) => {
            view_conversation(session, &reference, &options)
        }
        Some(MsgCommand::Reply {
            reference,
            content,
            dry_run,
        }) => reply_to_conversation(session, &reference, content.as_deref(), dry_run),
        Some(MsgCommand::Done { reference, dry_run }) => {
            mark_conversation_done(session, &reference, dry_run)
        }
        None => match args.reference {
            Some(reference) => view_conversation(session, &reference, &args.view),
            None => Err(TwistError::Message(
                "Missing conversation reference. Usage: tw msg <conversation-ref>".to_string(),
            )),
        },
    }
}

fn participant_names(conversation: &Conversation, names: &HashMap<u64, String>) -> Vec<Option<String>> {
    conversation
        .user_ids
        .iter()
        .map(|id| names.get(id).cloned())
        .collect()
}

/// The conversation title, or its participants when untitled.
pub fn conversation_title(conversation: &Conversation, names: &HashMap<u64, String>) -> String {
    match conversation.title.as_deref().filter(|t| !t.is_empty()) {
        Some(title) => title.to_string(),
        None => format!("Conversation with {}", participants(conversation, names)),
    }
}

fn participants(conversation: &Conversation, names: &HashMap<u64, String>) -> String {
    conversation
        .user_ids
        .iter()
        .map(|id| super::display_name(names, *id))
        .collect::<Vec<_>>()
        .join(", ")
}

fn show_unread(session: &mut Session, selector: &WorkspaceSelector, output: OutputArgs) -> Result<()> {
    let workspace_id = super::selected_workspace(session, selector)?;
    let client = session.client();
    let unread = client.unread_conversations(workspace_id)?;
    if unread.is_empty() {
        ui::info("No unread conversations.");
        return Ok(());
    }

    let conversations = unread
        .iter()
        .map(|u| client.conversation(u.conversation_id))
        .collect::<Result<Vec<_>>>()?;
    let names = super::user_names(client, workspace_id)?;

    if output.format() != Format::Text {
        let records = conversations
            .iter()
            .map(|c| with_fields(c, json!({ "participant_names": participant_names(c, &names) })))
            .collect::<Result<Vec<_>>>()?;
        return if output.format() == Format::Json {
            print_json(&records, Some(EntityKind::Conversation), output.full)
        } else {
            print_ndjson(&records, Some(EntityKind::Conversation), output.full)
        };
    }

    for conversation in &conversations {
        ui::info(&ui::bold(&conversation_title(conversation, &names)));
        ui::info(&format!(
            "  {}  {}",
            ui::id_tag(conversation.id),
            ui::author().apply_to(participants(conversation, &names))
        ));
        ui::info(&format!("  {}", ui::dim(&conversation.url)));
        ui::info("");
    }
    Ok(())
}

fn view_conversation(session: &Session, reference: &str, options: &MsgViewOptions) -> Result<()> {
    let conversation_id = resolve_conversation_id(reference)?;
    let window = Window {
        newer_than_ts: super::parse_date_flag("--since", options.since.as_deref())?,
        older_than_ts: super::parse_date_flag("--until", options.until.as_deref())?,
        limit: Some(options.limit),
    };

    let client = session.client();
    let conversation = client.conversation(conversation_id)?;
    let messages = client.messages(conversation_id, window)?;
    let names = super::user_names(client, conversation.workspace_id)?;
    let output = options.output;

    match output.format() {
        Format::Json => {
            let record = with_fields(
                &conversation,
                json!({ "participant_names": participant_names(&conversation, &names) }),
            )?;
            let messages = messages
                .iter()
                .map(|m| with_fields(m, json!({ "creator_name": names.get(&m.creator) })))
                .collect::<Result<Vec<_>>>()?;
            return print_json(
                &json!({ "conversation": record, "messages": messages }),
                None,
                output.full,
            );
        }
        Format::Ndjson => {
            let record = with_fields(
                &conversation,
                json!({ "participant_names": participant_names(&conversation, &names) }),
            )?;
            ui::info(&tagged_line("conversation", &record)?);
            for message in &messages {
                let record = with_fields(message, json!({ "creator_name": names.get(&message.creator) }))?;
                ui::info(&tagged_line("message", &record)?);
            }
            return Ok(());
        }
        Format::Text => {}
    }

    ui::info(&ui::bold(&conversation_title(&conversation, &names)));
    ui::info(&ui::id_tag(conversation.id));
    ui::info("");

    if messages.is_empty() {
        ui::info("No messages.");
        return Ok(());
    }

    for message in &messages {
        ui::info(&format!(
            "{}  {}  {}",
            ui::author().apply_to(super::display_name(&names, message.creator)),
            ui::dim(&format_relative(message.posted())),
            ui::id_tag(message.id)
        ));
        if options.raw {
            ui::info(&message.content);
        } else {
            ui::info(&render_markdown(&message.content));
        }
        ui::info("");
    }
    Ok(())
}

fn reply_to_conversation(
    session: &Session,
    reference: &str,
    content: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let conversation_id = resolve_conversation_id(reference)?;
    let content = reply_content(content)?;

    if dry_run {
        ui::info(&format!(
            "Dry run: would send message to conversation {conversation_id}"
        ));
        ui::info("");
        ui::info(&content);
        return Ok(());
    }

    let message = session.client().add_message(conversation_id, &content)?;
    ui::success(&format!("Message sent: {}", message.url));
    Ok(())
}

fn mark_conversation_done(session: &Session, reference: &str, dry_run: bool) -> Result<()> {
    let conversation_id = resolve_conversation_id(reference)?;
    if dry_run {
        ui::info(&format!("Dry run: would archive conversation {conversation_id}"));
        return Ok(());
    }
    session.client().archive_conversation(conversation_id)?;
    ui::success(&format!("Conversation {conversation_id} archived."));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untitled_conversations_list_participants() {
        let names = HashMap::from([(1, "Ana".to_string())]);
        let conversation = Conversation {
            user_ids: vec![1, 2],
            ..Conversation::default()
        };
        assert_eq!(
            conversation_title(&conversation, &names),
            "Conversation with Ana, user:2"
        );

        let titled = Conversation {
            title: Some("Launch".to_string()),
            ..conversation
        };
        assert_eq!(conversation_title(&titled, &names), "Launch");
    }
}
