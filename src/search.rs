//! Workspace-wide search.

use serde::Deserialize;

use crate::api::TwistClient;
use crate::error::Result;
use crate::models::SearchResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SearchType {
    Threads,
    Messages,
    All,
}

impl SearchType {
    fn as_str(&self) -> &'static str {
        match self {
            SearchType::Threads => "threads",
            SearchType::Messages => "messages",
            SearchType::All => "all",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    pub workspace_id: u64,
    pub query: Option<String>,
    pub title: Option<String>,
    pub kind: Option<SearchType>,
    pub channel_ids: Vec<u64>,
    pub conversation_ids: Vec<u64>,
    pub author_ids: Vec<u64>,
    pub to_user_ids: Vec<u64>,
    pub mention_self: bool,
    pub after_ts: Option<i64>,
    pub before_ts: Option<i64>,
    pub limit: Option<u32>,
    pub cursor: Option<String>,
}

impl SearchParams {
    /// Query parameters in the order the endpoint documents them. A title
    /// search with no query also sends the title as the query.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("workspace_id", self.workspace_id.to_string())];
        if let Some(query) = self.query.as_ref().or(self.title.as_ref()) {
            params.push(("query", query.clone()));
        }
        if let Some(title) = &self.title {
            params.push(("title", title.clone()));
        }
        if let Some(kind) = self.kind {
            params.push(("type", kind.as_str().to_string()));
        }
        if !self.channel_ids.is_empty() {
            params.push(("channel_ids", json_list(&self.channel_ids)));
        }
        if !self.conversation_ids.is_empty() {
            params.push(("conversation_ids", json_list(&self.conversation_ids)));
        }
        // The endpoint filters on a single author and recipient.
        if let Some(author) = self.author_ids.first() {
            params.push(("from_user_id", author.to_string()));
        }
        if let Some(to) = self.to_user_ids.first() {
            params.push(("to_user_id", to.to_string()));
        }
        if self.mention_self {
            params.push(("mention_self", "true".to_string()));
        }
        if let Some(ts) = self.after_ts {
            params.push(("after_ts", ts.to_string()));
        }
        if let Some(ts) = self.before_ts {
            params.push(("before_ts", ts.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(cursor) = &self.cursor {
            params.push(("cursor_mark", cursor.clone()));
        }
        params
    }
}

fn json_list(ids: &[u64]) -> String {
    let ids: Vec<String> = ids.iter().map(u64::to_string).collect();
    format!("[{}]", ids.join(","))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub items: Vec<SearchResult>,
    #[serde(default)]
    pub next_cursor_mark: Option<String>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub is_plan_restricted: bool,
}

impl TwistClient {
    pub fn search(&self, params: &SearchParams) -> Result<SearchResponse> {
        self.get("Searching...", "search", &params.to_query())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn title_search_doubles_as_query() {
        let params = SearchParams {
            workspace_id: 1,
            title: Some("release".to_string()),
            ..Default::default()
        }
        .to_query();
        assert_eq!(value(&params, "query"), Some("release"));
        assert_eq!(value(&params, "title"), Some("release"));
    }

    #[test]
    fn encodes_filters() {
        let params = SearchParams {
            workspace_id: 9,
            query: Some("deploy".to_string()),
            kind: Some(SearchType::Threads),
            channel_ids: vec![1, 2],
            author_ids: vec![5, 6],
            mention_self: true,
            cursor: Some("abc".to_string()),
            ..Default::default()
        }
        .to_query();
        assert_eq!(value(&params, "workspace_id"), Some("9"));
        assert_eq!(value(&params, "type"), Some("threads"));
        assert_eq!(value(&params, "channel_ids"), Some("[1,2]"));
        assert_eq!(value(&params, "from_user_id"), Some("5"));
        assert_eq!(value(&params, "mention_self"), Some("true"));
        assert_eq!(value(&params, "cursor_mark"), Some("abc"));
        assert_eq!(value(&params, "title"), None);
    }
}
