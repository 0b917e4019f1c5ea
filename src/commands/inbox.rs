use std::collections::{HashMap, HashSet};

use console::style;
use serde_json::json;

use crate::api::Window;
use crate::cli::InboxArgs;
use crate::dates::format_relative;
use crate::error::Result;
use crate::models::{Channel, Thread};
use crate::output::{EntityKind, Format, print_json, print_ndjson, with_fields};
use crate::session::Session;
use crate::ui;

/// An inbox thread with its read state.
#[derive(Debug, Clone)]
pub struct InboxThread {
    pub thread: Thread,
    pub is_unread: bool,
}

pub fn run_inbox(session: &mut Session, args: InboxArgs) -> Result<()> {
    let workspace_id = super::selected_workspace(session, &args.selector)?;
    let window = Window {
        newer_than_ts: super::parse_date_flag("--since", args.since.as_deref())?,
        older_than_ts: super::parse_date_flag("--until", args.until.as_deref())?,
        limit: Some(args.limit),
    };

    let client = session.client();
    let threads = client.inbox(workspace_id, window)?;
    let unread: HashSet<u64> = client
        .unread_threads(workspace_id)?
        .into_iter()
        .map(|u| u.thread_id)
        .collect();

    let mut inbox: Vec<InboxThread> = threads
        .into_iter()
        .map(|thread| InboxThread {
            is_unread: unread.contains(&thread.id),
            thread,
        })
        .collect();
    if args.unread {
        inbox.retain(|t| t.is_unread);
    }
    if inbox.is_empty() {
        ui::info("No threads in inbox.");
        return Ok(());
    }

    let channels = session.channels(workspace_id)?;
    let include_private = session.include_private_channels();
    inbox = keep_visible(inbox, &channels, include_private);
    if inbox.is_empty() {
        ui::info("No threads in public channels.");
        return Ok(());
    }
    let channel_names: HashMap<u64, String> = channels
        .into_iter()
        .map(|channel| (channel.id, channel.name))
        .collect();

    if let Some(filter) = &args.channel {
        inbox = filter_by_channel_name(inbox, &channel_names, filter);
        if inbox.is_empty() {
            ui::info(&format!("No threads in channels matching \"{filter}\"."));
            return Ok(());
        }
    }

    let inbox = order_inbox(inbox);
    let channel_name = |id: u64| {
        channel_names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("ch:{id}"))
    };

    let output = args.output;
    if output.format() != Format::Text {
        let records = inbox
            .iter()
            .map(|t| {
                with_fields(
                    &t.thread,
                    json!({
                        "is_unread": t.is_unread,
                        "channel_name": channel_names.get(&t.thread.channel_id),
                    }),
                )
            })
            .collect::<Result<Vec<_>>>()?;
        return if output.format() == Format::Json {
            print_json(&records, Some(EntityKind::Thread), output.full)
        } else {
            print_ndjson(&records, Some(EntityKind::Thread), output.full)
        };
    }

    let mut current_channel = None;
    for item in &inbox {
        let thread = &item.thread;
        if current_channel != Some(thread.channel_id) {
            if current_channel.is_some() {
                ui::info("");
            }
            ui::info(
                &style(format!("[{}]", channel_name(thread.channel_id)))
                    .bold()
                    .blue()
                    .to_string(),
            );
            ui::info("");
            current_channel = Some(thread.channel_id);
        }

        let (title, badge) = if item.is_unread {
            (ui::bold(&thread.title), style(" *").blue().to_string())
        } else {
            (thread.title.clone(), String::new())
        };
        ui::info(&format!("  {title}{badge}"));
        ui::info(&format!(
            "    {}  {}",
            ui::dim(&format_relative(thread.posted())),
            ui::id_tag(thread.id)
        ));
        ui::info(&format!("    {}", ui::dim(&thread.url)));
        ui::info("");
    }
    Ok(())
}

/// Drops threads outside the public channels of `channels` unless private
/// channels are included. Threads in unknown channels count as private.
pub fn keep_visible(
    inbox: Vec<InboxThread>,
    channels: &[Channel],
    include_private: bool,
) -> Vec<InboxThread> {
    if include_private {
        return inbox;
    }
    let public: HashSet<u64> = channels
        .iter()
        .filter(|channel| channel.public)
        .map(|channel| channel.id)
        .collect();
    inbox
        .into_iter()
        .filter(|t| public.contains(&t.thread.channel_id))
        .collect()
}

/// Keeps threads whose channel name contains `filter`, case-insensitively.
pub fn filter_by_channel_name(
    inbox: Vec<InboxThread>,
    channel_names: &HashMap<u64, String>,
    filter: &str,
) -> Vec<InboxThread> {
    let needle = filter.to_lowercase();
    let matching: HashSet<u64> = channel_names
        .iter()
        .filter(|(_, name)| name.to_lowercase().contains(&needle))
        .map(|(id, _)| *id)
        .collect();
    inbox
        .into_iter()
        .filter(|t| matching.contains(&t.thread.channel_id))
        .collect()
}

/// Groups threads by channel in order of first appearance. Within a channel,
/// unread threads come first, each part sorted newest first.
pub fn order_inbox(inbox: Vec<InboxThread>) -> Vec<InboxThread> {
    let mut channel_order: Vec<u64> = Vec::new();
    let mut groups: HashMap<u64, Vec<InboxThread>> = HashMap::new();
    for item in inbox {
        let channel_id = item.thread.channel_id;
        if !groups.contains_key(&channel_id) {
            channel_order.push(channel_id);
        }
        groups.entry(channel_id).or_default().push(item);
    }

    let mut ordered = Vec::new();
    for channel_id in channel_order {
        let Some(mut group) = groups.remove(&channel_id) else {
            continue;
        };
        group.sort_by(|a, b| {
            b.is_unread
                .cmp(&a.is_unread)
                .then(b.thread.posted_ts.cmp(&a.thread.posted_ts))
        });
        ordered.extend(group);
    }
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, channel_id: u64, posted_ts: i64, is_unread: bool) -> InboxThread {
        InboxThread {
            thread: Thread {
                id,
                channel_id,
                posted_ts,
                ..Thread::default()
            },
            is_unread,
        }
    }

    fn ids(inbox: &[InboxThread]) -> Vec<u64> {
        inbox.iter().map(|t| t.thread.id).collect()
    }

    #[test]
    fn unread_first_then_newest_within_channel() {
        let ordered = order_inbox(vec![
            item(1, 10, 100, false),
            item(2, 20, 500, true),
            item(3, 10, 300, false),
            item(4, 10, 50, true),
            item(5, 10, 80, true),
        ]);
        assert_eq!(ids(&ordered), vec![5, 4, 3, 1, 2]);
    }

    fn channel(id: u64, public: bool) -> Channel {
        Channel {
            id,
            public,
            ..Channel::default()
        }
    }

    #[test]
    fn hides_threads_outside_public_channels() {
        let channels = vec![channel(10, true), channel(20, false)];
        let inbox = vec![item(1, 10, 0, false), item(2, 20, 0, true), item(3, 30, 0, false)];

        let visible = keep_visible(inbox.clone(), &channels, false);
        assert_eq!(ids(&visible), vec![1]);

        let all = keep_visible(inbox, &channels, true);
        assert_eq!(ids(&all), vec![1, 2, 3]);
    }

    #[test]
    fn every_thread_private_leaves_nothing() {
        let channels = vec![channel(20, false)];
        assert!(keep_visible(vec![item(2, 20, 0, true)], &channels, false).is_empty());
    }

    #[test]
    fn filters_by_fuzzy_channel_name() {
        let names = HashMap::from([
            (10, "Engineering".to_string()),
            (20, "General".to_string()),
        ]);
        let filtered = filter_by_channel_name(
            vec![item(1, 10, 0, false), item(2, 20, 0, false), item(3, 30, 0, false)],
            &names,
            "ENG",
        );
        assert_eq!(ids(&filtered), vec![1]);
    }
}
