//! Records returned by the Twist API.
//!
//! Every record keeps the fields the CLI reads as typed members and carries
//! the rest of the payload in `extra`, so `--full` output is lossless.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn timestamp(secs: i64) -> Timestamp {
    Timestamp::from_second(secs).unwrap_or(Timestamp::UNIX_EPOCH)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workspace {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(default)]
    pub creator: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Channel {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub workspace_id: u64,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Thread {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub channel_id: u64,
    pub workspace_id: u64,
    #[serde(default)]
    pub creator: u64,
    #[serde(default)]
    pub posted_ts: i64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Thread {
    pub fn posted(&self) -> Timestamp {
        timestamp(self.posted_ts)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub creator: u64,
    #[serde(default)]
    pub thread_id: u64,
    #[serde(default)]
    pub posted_ts: i64,
    #[serde(default)]
    pub obj_index: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Comment {
    pub fn posted(&self) -> Timestamp {
        timestamp(self.posted_ts)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    pub id: u64,
    pub workspace_id: u64,
    #[serde(default)]
    pub user_ids: Vec<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub message_count: u64,
    #[serde(default)]
    pub last_active_ts: i64,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: u64,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub creator: u64,
    #[serde(default)]
    pub conversation_id: u64,
    #[serde(default)]
    pub posted_ts: i64,
    #[serde(default)]
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConversationMessage {
    pub fn posted(&self) -> Timestamp {
        timestamp(self.posted_ts)
    }
}

/// The authenticated user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_workspace: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceUser {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub user_type: String,
    #[serde(default)]
    pub bot: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnreadThread {
    pub thread_id: u64,
    #[serde(default)]
    pub obj_index: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnreadConversation {
    pub conversation_id: u64,
    #[serde(default)]
    pub obj_index: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub snippet_last_updated_ts: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thread_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SearchResult {
    pub fn last_updated(&self) -> Timestamp {
        timestamp(self.snippet_last_updated_ts)
    }
}
