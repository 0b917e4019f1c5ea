//! Blocking client for the Twist v3 REST API.
//!
//! Every call is wrapped in a spinner explicitly at its call site.

use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::error::{Result, TwistError};
use crate::models::{
    Channel, Comment, Conversation, ConversationMessage, Thread, UnreadConversation,
    UnreadThread, User, Workspace, WorkspaceUser,
};
use crate::ui;

pub const API_BASE_URL: &str = "https://api.twist.com/api/v3";
const USER_AGENT: &str = concat!("twist-cli/", env!("CARGO_PKG_VERSION"));

/// Collections the reference resolver and visibility gate read from.
pub trait Directory {
    fn fetch_workspaces(&self) -> Result<Vec<Workspace>>;
    fn fetch_channels(&self, workspace_id: u64) -> Result<Vec<Channel>>;
    fn fetch_session_user(&self) -> Result<User>;
}

/// Who gets notified about a new comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipients {
    Everyone,
    EveryoneInThread,
    Users(Vec<u64>),
}

impl Recipients {
    /// Parses `EVERYONE`, `EVERYONE_IN_THREAD` or a comma-separated id list.
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "EVERYONE" => Ok(Recipients::Everyone),
            "EVERYONE_IN_THREAD" => Ok(Recipients::EveryoneInThread),
            list => list
                .split(',')
                .map(|id| {
                    let id = id.trim();
                    if id.is_empty() || !id.chars().all(|c| c.is_ascii_digit()) {
                        return Err(TwistError::Message(format!("Invalid user ID: {id}")));
                    }
                    id.parse()
                        .map_err(|_| TwistError::Message(format!("Invalid user ID: {id}")))
                })
                .collect::<Result<Vec<u64>>>()
                .map(Recipients::Users),
        }
    }

    fn to_value(&self) -> Value {
        match self {
            Recipients::Everyone => json!("EVERYONE"),
            Recipients::EveryoneInThread => json!("EVERYONE_IN_THREAD"),
            Recipients::Users(ids) => json!(ids),
        }
    }
}

impl std::fmt::Display for Recipients {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Recipients::Everyone => f.write_str("EVERYONE"),
            Recipients::EveryoneInThread => f.write_str("EVERYONE_IN_THREAD"),
            Recipients::Users(ids) => {
                let ids: Vec<String> = ids.iter().map(u64::to_string).collect();
                f.write_str(&ids.join(", "))
            }
        }
    }
}

/// What a reaction is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReactionTarget {
    Thread,
    Comment,
    Message,
}

impl ReactionTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionTarget::Thread => "thread",
            ReactionTarget::Comment => "comment",
            ReactionTarget::Message => "message",
        }
    }

    /// Threads and comments live in a channel; messages do not.
    pub fn in_channel(&self) -> bool {
        matches!(self, ReactionTarget::Thread | ReactionTarget::Comment)
    }

    fn id_field(&self) -> &'static str {
        match self {
            ReactionTarget::Thread => "thread_id",
            ReactionTarget::Comment => "comment_id",
            ReactionTarget::Message => "message_id",
        }
    }
}

/// Optional time window and size for listing calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Window {
    pub newer_than_ts: Option<i64>,
    pub older_than_ts: Option<i64>,
    pub limit: Option<u32>,
}

impl Window {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(ts) = self.newer_than_ts {
            params.push(("newer_than_ts", ts.to_string()));
        }
        if let Some(ts) = self.older_than_ts {
            params.push(("older_than_ts", ts.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

pub struct TwistClient {
    http: reqwest::blocking::Client,
    token: String,
    base_url: String,
}

impl TwistClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(token, API_BASE_URL)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            token: token.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub(crate) fn url(&self, path: &str, params: &[(&str, String)]) -> String {
        let mut url = format!("{}/{}", self.base_url, path);
        for (i, (key, value)) in params.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(key);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    pub(crate) fn get<T: DeserializeOwned>(
        &self,
        message: &str,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        let url = self.url(path, params);
        tracing::debug!(%url, "GET");
        self.send(message, self.http.get(url))
    }

    fn post<T: DeserializeOwned>(&self, message: &str, path: &str, body: Value) -> Result<T> {
        let url = self.url(path, &[]);
        tracing::debug!(%url, "POST");
        self.send(message, self.http.post(url).json(&body))
    }

    fn send<T: DeserializeOwned>(
        &self,
        message: &str,
        request: reqwest::blocking::RequestBuilder,
    ) -> Result<T> {
        let spinner = ui::spinner(message);
        let result = self.execute(request);
        spinner.finish_and_clear();
        result
    }

    fn execute<T: DeserializeOwned>(&self, request: reqwest::blocking::RequestBuilder) -> Result<T> {
        let res = request.bearer_auth(&self.token).send()?;
        let status = res.status();
        if !status.is_success() {
            let body = res.text().unwrap_or_default();
            tracing::debug!(status = status.as_u16(), %body, "request failed");
            return Err(TwistError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let body = res.text()?;
        tracing::trace!(%body, "response");
        Ok(serde_json::from_str(&body)?)
    }

    pub fn workspace_users(&self, workspace_id: u64) -> Result<Vec<WorkspaceUser>> {
        self.get(
            "Loading workspace users...",
            "workspace_users/get",
            &[("id", workspace_id.to_string())],
        )
    }

    pub fn channel(&self, channel_id: u64) -> Result<Channel> {
        self.get(
            "Loading channel...",
            "channels/getone",
            &[("id", channel_id.to_string())],
        )
    }

    pub fn thread(&self, thread_id: u64) -> Result<Thread> {
        self.get(
            "Loading thread...",
            "threads/getone",
            &[("id", thread_id.to_string())],
        )
    }

    pub fn unread_threads(&self, workspace_id: u64) -> Result<Vec<UnreadThread>> {
        self.get(
            "Loading unread threads...",
            "threads/get_unread",
            &[("workspace_id", workspace_id.to_string())],
        )
    }

    pub fn comment(&self, comment_id: u64) -> Result<Comment> {
        self.get(
            "Loading comment...",
            "comments/getone",
            &[("id", comment_id.to_string())],
        )
    }

    pub fn comments(&self, thread_id: u64, window: Window) -> Result<Vec<Comment>> {
        let mut params = vec![("thread_id", thread_id.to_string())];
        params.extend(window.params());
        self.get("Loading comments...", "comments/get", &params)
    }

    pub fn add_comment(
        &self,
        thread_id: u64,
        content: &str,
        recipients: &Recipients,
    ) -> Result<Comment> {
        self.post(
            "Creating comment...",
            "comments/add",
            json!({
                "thread_id": thread_id,
                "content": content,
                "recipients": recipients.to_value(),
            }),
        )
    }

    pub fn inbox(&self, workspace_id: u64, window: Window) -> Result<Vec<Thread>> {
        let mut params = vec![("workspace_id", workspace_id.to_string())];
        params.extend(window.params());
        self.get("Loading inbox...", "inbox/get", &params)
    }

    pub fn archive_thread(&self, thread_id: u64) -> Result<Value> {
        self.post("Archiving thread...", "inbox/archive", json!({ "id": thread_id }))
    }

    pub fn conversation(&self, conversation_id: u64) -> Result<Conversation> {
        self.get(
            "Loading conversation...",
            "conversations/getone",
            &[("id", conversation_id.to_string())],
        )
    }

    pub fn unread_conversations(&self, workspace_id: u64) -> Result<Vec<UnreadConversation>> {
        self.get(
            "Loading unread conversations...",
            "conversations/get_unread",
            &[("workspace_id", workspace_id.to_string())],
        )
    }

    pub fn archive_conversation(&self, conversation_id: u64) -> Result<Value> {
        self.post(
            "Archiving conversation...",
            "conversations/archive",
            json!({ "id": conversation_id }),
        )
    }

    pub fn messages(&self, conversation_id: u64, window: Window) -> Result<Vec<ConversationMessage>> {
        let mut params = vec![("conversation_id", conversation_id.to_string())];
        params.extend(window.params());
        self.get("Loading messages...", "conversation_messages/get", &params)
    }

    pub fn add_message(&self, conversation_id: u64, content: &str) -> Result<ConversationMessage> {
        self.post(
            "Sending message...",
            "conversation_messages/add",
            json!({ "conversation_id": conversation_id, "content": content }),
        )
    }

    pub fn add_reaction(&self, target: ReactionTarget, id: u64, reaction: &str) -> Result<Value> {
        self.post(
            "Adding reaction...",
            "reactions/add",
            json!({ target.id_field(): id, "reaction": reaction }),
        )
    }

    pub fn remove_reaction(&self, target: ReactionTarget, id: u64, reaction: &str) -> Result<Value> {
        self.post(
            "Removing reaction...",
            "reactions/remove",
            json!({ target.id_field(): id, "reaction": reaction }),
        )
    }
}

impl Directory for TwistClient {
    fn fetch_workspaces(&self) -> Result<Vec<Workspace>> {
        self.get("Loading workspaces...", "workspaces/get", &[])
    }

    fn fetch_channels(&self, workspace_id: u64) -> Result<Vec<Channel>> {
        self.get(
            "Loading channels...",
            "channels/get",
            &[("workspace_id", workspace_id.to_string())],
        )
    }

    fn fetch_session_user(&self) -> Result<User> {
        self.get(
            "Checking authentication...",
            "users/get_session_user",
            &[],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_notify_recipients() {
        assert_eq!(
            Recipients::parse("EVERYONE").expect("everyone"),
            Recipients::Everyone
        );
        assert_eq!(
            Recipients::parse("EVERYONE_IN_THREAD").expect("thread"),
            Recipients::EveryoneInThread
        );
        assert_eq!(
            Recipients::parse("12, 34").expect("ids"),
            Recipients::Users(vec![12, 34])
        );
        assert!(Recipients::parse("12,abc").is_err());
        assert!(Recipients::parse("everyone").is_err());
    }

    #[test]
    fn builds_encoded_urls() {
        let client = TwistClient::with_base_url("token", "https://example.test/api/").expect("client");
        assert_eq!(
            client.url("search", &[("query", "a b&c".to_string()), ("limit", "5".to_string())]),
            "https://example.test/api/search?query=a%20b%26c&limit=5"
        );
    }

    #[test]
    fn only_channel_content_is_gated() {
        assert!(ReactionTarget::Thread.in_channel());
        assert!(ReactionTarget::Comment.in_channel());
        assert!(!ReactionTarget::Message.in_channel());
    }

    #[test]
    fn window_only_sends_given_bounds() {
        let window = Window {
            limit: Some(20),
            ..Default::default()
        };
        assert_eq!(window.params(), vec![("limit", "20".to_string())]);
    }
}
