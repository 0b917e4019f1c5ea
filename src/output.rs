//! Machine-readable output.
//!
//! JSON output is projected onto a small set of essential fields per entity
//! unless `--full` is given.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Thread,
    Comment,
    Conversation,
    Message,
    Workspace,
    User,
    Channel,
}

impl EntityKind {
    fn essential_fields(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Thread => &[
                "id",
                "title",
                "channel_id",
                "workspace_id",
                "creator",
                "posted_ts",
                "comment_count",
                "is_archived",
                "is_unread",
                "channel_name",
            ],
            EntityKind::Comment => &["id", "content", "creator", "thread_id", "posted_ts"],
            EntityKind::Conversation => &[
                "id",
                "workspace_id",
                "user_ids",
                "title",
                "message_count",
                "last_active_ts",
                "archived",
                "participant_names",
            ],
            EntityKind::Message => &["id", "content", "creator", "conversation_id", "posted_ts"],
            EntityKind::Workspace => &["id", "name", "creator", "plan"],
            EntityKind::User => &["id", "name", "email", "timezone", "user_type"],
            EntityKind::Channel => &["id", "name", "workspace_id"],
        }
    }
}

/// Output selected by `--json` / `--ndjson`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
    Ndjson,
}

impl Format {
    pub fn from_flags(json: bool, ndjson: bool) -> Self {
        if json {
            Format::Json
        } else if ndjson {
            Format::Ndjson
        } else {
            Format::Text
        }
    }
}

fn project(value: Value, kind: Option<EntityKind>, full: bool) -> Value {
    let (Some(kind), false) = (kind, full) else {
        return value;
    };
    match value {
        Value::Object(object) => {
            let mut picked = Map::new();
            for field in kind.essential_fields() {
                if let Some(v) = object.get(*field) {
                    picked.insert((*field).to_string(), v.clone());
                }
            }
            Value::Object(picked)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| project(item, Some(kind), full))
                .collect(),
        ),
        other => other,
    }
}

pub fn format_json<T: Serialize + ?Sized>(
    data: &T,
    kind: Option<EntityKind>,
    full: bool,
) -> Result<String> {
    let value = project(serde_json::to_value(data)?, kind, full);
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn format_ndjson<T: Serialize>(
    items: &[T],
    kind: Option<EntityKind>,
    full: bool,
) -> Result<String> {
    let lines = items
        .iter()
        .map(|item| {
            let value = project(serde_json::to_value(item)?, kind, full);
            Ok(serde_json::to_string(&value)?)
        })
        .collect::<Result<Vec<String>>>()?;
    Ok(lines.join("\n"))
}

/// One NDJSON line: `record` tagged with `"type": kind`.
pub fn tagged_line<T: Serialize>(tag: &str, record: &T) -> Result<String> {
    let mut value = serde_json::to_value(record)?;
    if let Value::Object(object) = &mut value {
        object.insert("type".to_string(), json!(tag));
    }
    Ok(serde_json::to_string(&value)?)
}

/// Trailing NDJSON line announcing another page.
pub fn cursor_line(next_cursor: &str) -> String {
    json!({ "_meta": true, "next_cursor": next_cursor }).to_string()
}

/// Serializes `record` and merges `extra` keys on top.
pub fn with_fields<T: Serialize>(record: &T, extra: Value) -> Result<Value> {
    let mut value = serde_json::to_value(record)?;
    if let (Value::Object(target), Value::Object(fields)) = (&mut value, extra) {
        target.extend(fields);
    }
    Ok(value)
}

pub fn print_json<T: Serialize + ?Sized>(
    data: &T,
    kind: Option<EntityKind>,
    full: bool,
) -> Result<()> {
    println!("{}", format_json(data, kind, full)?);
    Ok(())
}

pub fn print_ndjson<T: Serialize>(items: &[T], kind: Option<EntityKind>, full: bool) -> Result<()> {
    println!("{}", format_ndjson(items, kind, full)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Workspace;

    fn workspace() -> Workspace {
        let mut extra = Map::new();
        extra.insert("color".to_string(), json!(4));
        Workspace {
            id: 1,
            name: "Doist".to_string(),
            plan: Some("unlimited".to_string()),
            creator: 9,
            extra,
        }
    }

    #[test]
    fn projects_essential_fields() {
        let out = format_json(&workspace(), Some(EntityKind::Workspace), false).expect("json");
        let value: Value = serde_json::from_str(&out).expect("parse");
        assert_eq!(value["name"], json!("Doist"));
        assert!(value.get("color").is_none());
    }

    #[test]
    fn full_keeps_everything() {
        let out = format_json(&[workspace()], Some(EntityKind::Workspace), true).expect("json");
        let value: Value = serde_json::from_str(&out).expect("parse");
        assert_eq!(value[0]["color"], json!(4));
    }

    #[test]
    fn ndjson_is_one_line_per_item() {
        let out = format_ndjson(&[workspace(), workspace()], Some(EntityKind::Workspace), false)
            .expect("ndjson");
        assert_eq!(out.lines().count(), 2);
        assert!(out.lines().all(|line| !line.contains("color")));
    }

    #[test]
    fn tags_lines() {
        let line = tagged_line("workspace", &workspace()).expect("line");
        let value: Value = serde_json::from_str(&line).expect("parse");
        assert_eq!(value["type"], json!("workspace"));
        assert!(!line.contains('\n'));
    }

    #[test]
    fn merges_extra_fields() {
        let value = with_fields(&workspace(), json!({ "url": "https://twist.com/a/1" })).expect("merge");
        assert_eq!(value["url"], json!("https://twist.com/a/1"));
        assert_eq!(value["id"], json!(1));
    }
}
