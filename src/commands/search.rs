use std::collections::HashSet;

use serde_json::json;

use crate::cli::SearchArgs;
use crate::dates::format_relative;
use crate::error::Result;
use crate::models::{SearchResult, WorkspaceUser};
use crate::output::{Format, cursor_line, print_json, with_fields};
use crate::refs::{ParsedUrl, extract_id, resolve_user_refs};
use crate::search::SearchParams;
use crate::session::Session;
use crate::ui;

pub fn run_search(session: &mut Session, args: SearchArgs) -> Result<()> {
    let workspace_id = super::selected_workspace(session, &args.selector)?;

    let mut users: Option<Vec<WorkspaceUser>> = None;
    let mut user_refs = |refs: Option<&str>| -> Result<Vec<u64>> {
        let Some(refs) = refs else {
            return Ok(Vec::new());
        };
        if users.is_none() {
            users = Some(session.client().workspace_users(workspace_id)?);
        }
        resolve_user_refs(users.as_deref().unwrap_or_default(), refs)
    };
    let author_ids = user_refs(args.author.as_deref())?;
    let to_user_ids = user_refs(args.to.as_deref())?;

    let (query, title) = if args.title_only {
        (None, Some(args.query.clone()))
    } else {
        (Some(args.query.clone()), None)
    };
    let params = SearchParams {
        workspace_id,
        query,
        title,
        kind: args.kind,
        channel_ids: id_list(args.channel.as_deref())?,
        conversation_ids: id_list(args.conversation.as_deref())?,
        author_ids,
        to_user_ids,
        mention_self: args.mention_me,
        after_ts: super::parse_date_flag("--since", args.since.as_deref())?,
        before_ts: super::parse_date_flag("--until", args.until.as_deref())?,
        limit: Some(args.limit),
        cursor: args.cursor.clone(),
    };

    let mut response = session.client().search(&params)?;
    let public = if session.include_private_channels() {
        None
    } else {
        Some(session.public_channel_ids(workspace_id)?)
    };
    response.items = keep_public(response.items, public);

    let next_cursor = response.next_cursor_mark.as_deref().filter(|c| !c.is_empty());
    if response.items.is_empty() {
        match empty_page(response.has_more, next_cursor) {
            EmptyPage::MoreOnNextPage(cursor) => {
                ui::info("No public results on this page.");
                ui::info(&ui::dim(&format!(
                    "More results available. Use --cursor {cursor}"
                )));
            }
            EmptyPage::NoResults => ui::info("No results found."),
        }
        return Ok(());
    }

    let records = || {
        response
            .items
            .iter()
            .map(|r| with_fields(r, json!({ "url": result_link(workspace_id, r) })))
            .collect::<Result<Vec<_>>>()
    };

    let output = args.output;
    match output.format() {
        Format::Json => {
            return print_json(
                &json!({ "results": records()?, "next_cursor": next_cursor }),
                None,
                output.full,
            );
        }
        Format::Ndjson => {
            for record in records()? {
                ui::info(&serde_json::to_string(&record)?);
            }
            if let Some(cursor) = next_cursor {
                ui::info(&cursor_line(cursor));
            }
            return Ok(());
        }
        Format::Text => {}
    }

    for result in &response.items {
        let title = match result.title.as_deref().filter(|t| !t.is_empty()) {
            Some(title) => title.to_string(),
            None => super::truncate(&result.snippet, 50),
        };
        ui::info(&format!(
            "{} {title}",
            ui::channel().apply_to(format!("[{}]", result.kind))
        ));
        ui::info(&format!("  {}", ui::dim(&super::truncate(&result.snippet, 100))));
        ui::info(&format!(
            "  {}  {}",
            ui::dim(&format_relative(result.last_updated())),
            ui::dim(&result_link(workspace_id, result))
        ));
        ui::info("");
    }

    if response.has_more
        && let Some(cursor) = next_cursor
    {
        ui::info(&ui::dim(&format!(
            "More results available. Use --cursor {cursor}"
        )));
    }
    Ok(())
}

/// Drops results from channels outside `public`; `None` keeps everything.
/// Results without a channel (conversation messages) are kept.
pub fn keep_public(items: Vec<SearchResult>, public: Option<&HashSet<u64>>) -> Vec<SearchResult> {
    let Some(public) = public else {
        return items;
    };
    items
        .into_iter()
        .filter(|item| item.channel_id.is_none_or(|id| public.contains(&id)))
        .collect()
}

/// What to tell the user when a page has nothing to show.
#[derive(Debug, PartialEq, Eq)]
pub enum EmptyPage<'a> {
    NoResults,
    /// Everything on this page was filtered, but the cursor leads further.
    MoreOnNextPage(&'a str),
}

pub fn empty_page(has_more: bool, next_cursor: Option<&str>) -> EmptyPage<'_> {
    match next_cursor {
        Some(cursor) if has_more => EmptyPage::MoreOnNextPage(cursor),
        _ => EmptyPage::NoResults,
    }
}

/// Web link for a search hit, falling back to the workspace.
pub fn result_link(workspace_id: u64, result: &SearchResult) -> String {
    let base = ParsedUrl {
        workspace_id: Some(workspace_id),
        ..ParsedUrl::default()
    };
    let parsed = match (result.kind.as_str(), result.channel_id, result.thread_id) {
        ("thread", Some(channel_id), Some(thread_id)) => ParsedUrl {
            channel_id: Some(channel_id),
            thread_id: Some(thread_id),
            ..base
        },
        ("comment", Some(channel_id), Some(thread_id)) if result.comment_id.is_some() => {
            ParsedUrl {
                channel_id: Some(channel_id),
                thread_id: Some(thread_id),
                comment_id: result.comment_id,
                ..base
            }
        }
        ("message", _, _) if result.conversation_id.is_some() => ParsedUrl {
            conversation_id: result.conversation_id,
            ..base
        },
        _ => base,
    };
    parsed.to_link()
}

/// Comma-separated ids, each optionally prefixed with `id:`.
fn id_list(value: Option<&str>) -> Result<Vec<u64>> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(extract_id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(kind: &str) -> SearchResult {
        SearchResult {
            kind: kind.to_string(),
            channel_id: Some(2),
            thread_id: Some(3),
            comment_id: Some(4),
            conversation_id: Some(5),
            ..SearchResult::default()
        }
    }

    #[test]
    fn links_by_result_type() {
        assert_eq!(result_link(1, &result("thread")), "https://twist.com/a/1/ch/2/t/3");
        assert_eq!(
            result_link(1, &result("comment")),
            "https://twist.com/a/1/ch/2/t/3/c/4"
        );
        assert_eq!(result_link(1, &result("message")), "https://twist.com/a/1/msg/5");
        assert_eq!(result_link(1, &result("user")), "https://twist.com/a/1");
    }

    #[test]
    fn keeps_results_without_channel() {
        let public = HashSet::from([2]);
        let items = vec![
            result("thread"),
            SearchResult {
                channel_id: Some(9),
                ..result("thread")
            },
            SearchResult {
                channel_id: None,
                ..result("message")
            },
        ];
        let kept = keep_public(items.clone(), Some(&public));
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[1].kind, "message");

        assert_eq!(keep_public(items, None).len(), 3);
    }

    #[test]
    fn fully_filtered_page_points_to_next_cursor() {
        let private_only = vec![SearchResult {
            channel_id: Some(9),
            ..result("thread")
        }];
        let kept = keep_public(private_only, Some(&HashSet::from([2])));
        assert!(kept.is_empty());
        assert_eq!(empty_page(true, Some("abc")), EmptyPage::MoreOnNextPage("abc"));
    }

    #[test]
    fn empty_last_page_has_no_results() {
        assert_eq!(empty_page(false, Some("abc")), EmptyPage::NoResults);
        assert_eq!(empty_page(true, None), EmptyPage::NoResults);
    }

    #[test]
    fn parses_id_lists() {
        assert_eq!(id_list(Some("1, id:2,3")).expect("ids"), vec![1, 2, 3]);
        assert_eq!(id_list(None).expect("none"), Vec::<u64>::new());
        assert!(id_list(Some("1,general")).is_err());
    }
}
