use std::collections::HashMap;

use serde_json::json;

use crate::api::{Recipients, Window};
use crate::cli::{ThreadArgs, ThreadCommand, ThreadViewOptions};
use crate::dates::format_relative;
use crate::error::{Result, TwistError};
use crate::input::reply_content;
use crate::markdown::render_markdown;
use crate::models::{Channel, Comment, Thread};
use crate::output::{Format, print_json, tagged_line, with_fields};
use crate::refs::{ParsedUrl, Reference, classify_reference, extract_id, resolve_thread_id};
use crate::session::Session;
use crate::ui;

pub fn run_thread(session: &mut Session, args: ThreadArgs) -> Result<()> {
    match args.command {
        Some(ThreadCommand::View { reference, options }) => view_thread(session, &reference, &options),
        Some(ThreadCommand::Reply {
            reference,
            content,
            notify,
            dry_run,
        }) => reply_to_thread(session, &reference, content.as_deref(), &notify, dry_run),
        Some(ThreadCommand::Done { reference, dry_run }) => {
            mark_thread_done(session, &reference, dry_run)
        }
        None => match args.reference {
            Some(reference) => view_thread(session, &reference, &args.view),
            None => Err(TwistError::Message(
                "Missing thread reference. Usage: tw thread <thread-ref>".to_string(),
            )),
        },
    }
}

fn thread_link(thread: &Thread, comment_id: Option<u64>) -> String {
    ParsedUrl {
        workspace_id: Some(thread.workspace_id),
        channel_id: Some(thread.channel_id),
        thread_id: Some(thread.id),
        comment_id,
        ..ParsedUrl::default()
    }
    .to_link()
}

fn body(content: &str, raw: bool) -> String {
    if raw {
        content.to_string()
    } else {
        render_markdown(content)
    }
}

fn print_comment(comment: &Comment, names: &HashMap<u64, String>, raw: bool) {
    ui::info(&format!(
        "{}  {}  {}",
        ui::author().apply_to(super::display_name(names, comment.creator)),
        ui::dim(&format_relative(comment.posted())),
        ui::id_tag(comment.id)
    ));
    ui::info(&body(&comment.content, raw));
    ui::info("");
}

fn print_header(thread: &Thread, channel: &Channel) {
    ui::info(&ui::bold(&thread.title));
    ui::info(&ui::channel().apply_to(format!("[{}]", channel.name)).to_string());
    ui::info("");
}

/// Comments split around the last read position.
#[derive(Debug)]
pub struct UnreadSplit<'a> {
    pub context: Vec<&'a Comment>,
    pub unread: Vec<&'a Comment>,
}

/// Unread comments are those past `last_read`; `context` holds up to
/// `context_size` of the latest read ones, oldest first.
pub fn split_unread(comments: &[Comment], last_read: u64, context_size: usize) -> UnreadSplit<'_> {
    let unread = comments.iter().filter(|c| c.obj_index > last_read).collect();
    let mut read: Vec<&Comment> = comments.iter().filter(|c| c.obj_index <= last_read).collect();
    read.sort_by(|a, b| b.obj_index.cmp(&a.obj_index));
    read.truncate(context_size);
    read.reverse();
    UnreadSplit {
        context: read,
        unread,
    }
}

fn view_thread(session: &mut Session, reference: &str, options: &ThreadViewOptions) -> Result<()> {
    let thread_id = resolve_thread_id(reference)?;
    let comment_id = match &options.comment {
        Some(raw) => Some(extract_id(raw)?),
        None => match classify_reference(reference)? {
            Reference::Url(parsed) => parsed.comment_id,
            _ => None,
        },
    };

    let thread = session.client().thread(thread_id)?;
    session.assert_thread_is_public(&thread)?;

    if let Some(comment_id) = comment_id {
        return view_single_comment(session, &thread, comment_id, options);
    }

    let window = Window {
        newer_than_ts: super::parse_date_flag("--since", options.since.as_deref())?,
        older_than_ts: super::parse_date_flag("--until", options.until.as_deref())?,
        limit: Some(options.limit),
    };
    let client = session.client();
    let comments = client.comments(thread_id, window)?;

    let last_read = if options.unread {
        let unread = client.unread_threads(thread.workspace_id)?;
        match unread.into_iter().find(|u| u.thread_id == thread_id) {
            Some(entry) => Some(entry.obj_index),
            None => {
                ui::info("No unread comments in this thread.");
                return Ok(());
            }
        }
    } else {
        None
    };

    let channel = client.channel(thread.channel_id)?;
    let names = super::user_names(client, thread.workspace_id)?;
    let output = options.output;

    match output.format() {
        Format::Json => {
            let comments = comments
                .iter()
                .map(|c| {
                    with_fields(
                        c,
                        json!({
                            "creator_name": names.get(&c.creator),
                            "url": thread_link(&thread, Some(c.id)),
                        }),
                    )
                })
                .collect::<Result<Vec<_>>>()?;
            let thread_record = with_fields(
                &thread,
                json!({
                    "channel_name": channel.name,
                    "creator_name": names.get(&thread.creator),
                    "url": thread_link(&thread, None),
                }),
            )?;
            return print_json(
                &json!({ "thread": thread_record, "comments": comments }),
                None,
                output.full,
            );
        }
        Format::Ndjson => {
            let thread_record = with_fields(
                &thread,
                json!({
                    "channel_name": channel.name,
                    "creator_name": names.get(&thread.creator),
                }),
            )?;
            ui::info(&tagged_line("thread", &thread_record)?);
            for comment in &comments {
                let record = with_fields(comment, json!({ "creator_name": names.get(&comment.creator) }))?;
                ui::info(&tagged_line("comment", &record)?);
            }
            return Ok(());
        }
        Format::Text => {}
    }

    print_header(&thread, &channel);
    let creator = ui::author().apply_to(super::display_name(&names, thread.creator));
    let posted = ui::dim(&format_relative(thread.posted()));

    let Some(last_read) = last_read else {
        ui::info(&format!("{creator}  {posted}"));
        ui::info("");
        ui::info(&body(&thread.content, options.raw));
        ui::info("");
        if !comments.is_empty() {
            ui::info(&ui::dim(&format!(
                "--- {} {} ---",
                comments.len(),
                ui::pluralize(comments.len(), "comment")
            )));
            ui::info("");
            for comment in &comments {
                print_comment(comment, &names, options.raw);
            }
        }
        return Ok(());
    };

    let split = split_unread(&comments, last_read, options.context);
    if split.unread.is_empty() {
        ui::info("No unread comments.");
        return Ok(());
    }

    ui::info(&format!("{creator}  {posted}  {}", ui::dim("(original post)")));
    ui::info("");
    ui::info(&body(&thread.content, options.raw));

    if let Some(first) = split.context.first() {
        let skipped = first.obj_index.saturating_sub(1) as usize;
        if skipped > 0 {
            ui::separator(&format!("{skipped} {} skipped", ui::pluralize(skipped, "comment")));
        } else {
            ui::info("");
        }
        for comment in &split.context {
            print_comment(comment, &names, options.raw);
        }
    } else if last_read > 0 {
        let skipped = last_read as usize;
        ui::separator(&format!("{skipped} {} skipped", ui::pluralize(skipped, "comment")));
    }

    ui::separator(&format!("UNREAD ({} new)", split.unread.len()));
    for comment in &split.unread {
        print_comment(comment, &names, options.raw);
    }
    Ok(())
}

fn view_single_comment(
    session: &Session,
    thread: &Thread,
    comment_id: u64,
    options: &ThreadViewOptions,
) -> Result<()> {
    let client = session.client();
    let comment = client.comment(comment_id)?;
    let channel = client.channel(thread.channel_id)?;
    let names = super::user_names(client, thread.workspace_id)?;
    let url = thread_link(thread, Some(comment.id));
    let output = options.output;

    match output.format() {
        Format::Json => {
            let record = with_fields(
                &comment,
                json!({
                    "creator_name": names.get(&comment.creator),
                    "channel_name": channel.name,
                    "thread_title": thread.title,
                    "url": url,
                }),
            )?;
            print_json(&record, None, output.full)
        }
        Format::Ndjson => {
            let record = with_fields(
                &comment,
                json!({ "creator_name": names.get(&comment.creator), "url": url }),
            )?;
            ui::info(&tagged_line("comment", &record)?);
            Ok(())
        }
        Format::Text => {
            print_header(thread, &channel);
            print_comment(&comment, &names, options.raw);
            Ok(())
        }
    }
}

fn reply_to_thread(
    session: &mut Session,
    reference: &str,
    content: Option<&str>,
    notify: &str,
    dry_run: bool,
) -> Result<()> {
    let thread_id = resolve_thread_id(reference)?;
    let recipients = Recipients::parse(notify)?;
    let content = reply_content(content)?;

    if dry_run {
        ui::info(&format!("Dry run: would post comment to thread {thread_id}"));
        ui::info(&format!("Notify: {recipients}"));
        ui::info("");
        ui::info(&content);
        return Ok(());
    }

    let thread = session.client().thread(thread_id)?;
    session.assert_thread_is_public(&thread)?;
    let comment = session.client().add_comment(thread_id, &content, &recipients)?;
    tracing::debug!(thread_id, comment_id = comment.id, "comment posted");
    ui::success(&format!(
        "Comment posted: {}",
        thread_link(&thread, Some(comment.id))
    ));
    Ok(())
}

fn mark_thread_done(session: &mut Session, reference: &str, dry_run: bool) -> Result<()> {
    let thread_id = resolve_thread_id(reference)?;
    if dry_run {
        ui::info(&format!("Dry run: would archive thread {thread_id}"));
        return Ok(());
    }
    let thread = session.client().thread(thread_id)?;
    session.assert_thread_is_public(&thread)?;
    session.client().archive_thread(thread_id)?;
    ui::success(&format!("Thread {thread_id} archived."));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: u64, obj_index: u64) -> Comment {
        Comment {
            id,
            obj_index,
            ..Comment::default()
        }
    }

    fn ids(comments: &[&Comment]) -> Vec<u64> {
        comments.iter().map(|c| c.id).collect()
    }

    #[test]
    fn splits_unread_with_context() {
        let comments: Vec<Comment> = (1..=6).map(|i| comment(100 + i, i)).collect();
        let split = split_unread(&comments, 4, 2);
        assert_eq!(ids(&split.context), vec![103, 104]);
        assert_eq!(ids(&split.unread), vec![105, 106]);
    }

    #[test]
    fn context_is_capped_by_available_reads() {
        let comments = vec![comment(1, 1), comment(2, 2)];
        let split = split_unread(&comments, 1, 5);
        assert_eq!(ids(&split.context), vec![1]);
        assert_eq!(ids(&split.unread), vec![2]);
    }

    #[test]
    fn no_context_by_default() {
        let comments = vec![comment(1, 1), comment(2, 2)];
        let split = split_unread(&comments, 2, 0);
        assert!(split.context.is_empty());
        assert!(split.unread.is_empty());
    }

    #[test]
    fn links_include_comment() {
        let thread = Thread {
            id: 3,
            channel_id: 2,
            workspace_id: 1,
            ..Thread::default()
        };
        assert_eq!(thread_link(&thread, None), "https://twist.com/a/1/ch/2/t/3");
        assert_eq!(
            thread_link(&thread, Some(4)),
            "https://twist.com/a/1/ch/2/t/3/c/4"
        );
    }
}
