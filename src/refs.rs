//! Parsing and resolution of user-supplied references.
//!
//! A reference is whatever the user typed to point at something: `123`,
//! `id:123`, a link copied from the Twist web app, or (for workspaces and
//! users only) a name.

use reqwest::Url;

use crate::error::{Result, TwistError};
use crate::models::{Workspace, WorkspaceUser};

/// Host token a link must contain to be decomposed.
pub const TWIST_DOMAIN: &str = "twist.com";
const TWIST_BASE_URL: &str = "https://twist.com";
const ID_PREFIX: &str = "id:";
const MAX_CANDIDATES: usize = 5;

/// Identifiers found in a Twist link. Each field is extracted on its own,
/// so a link may carry a comment id without a thread id.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParsedUrl {
    pub workspace_id: Option<u64>,
    pub channel_id: Option<u64>,
    pub thread_id: Option<u64>,
    pub comment_id: Option<u64>,
    pub conversation_id: Option<u64>,
    pub message_id: Option<u64>,
}

impl ParsedUrl {
    fn is_empty(&self) -> bool {
        *self == ParsedUrl::default()
    }

    /// Builds the web link for the populated fields.
    pub fn to_link(&self) -> String {
        let segments = [
            ("a", self.workspace_id),
            ("ch", self.channel_id),
            ("t", self.thread_id),
            ("c", self.comment_id),
            ("msg", self.conversation_id),
            ("m", self.message_id),
        ];
        let mut link = TWIST_BASE_URL.to_string();
        for (marker, id) in segments {
            if let Some(id) = id {
                link.push_str(&format!("/{marker}/{id}"));
            }
        }
        link
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Id(u64),
    Url(ParsedUrl),
    Name(String),
}

/// Classifies a raw reference.
///
/// `id:` prefixes must be followed by an integer. Links that do not decompose
/// degrade to names, as does anything that is not a canonical integer.
pub fn classify_reference(input: &str) -> Result<Reference> {
    if let Some(rest) = input.strip_prefix(ID_PREFIX) {
        return parse_digits(rest)
            .map(Reference::Id)
            .ok_or_else(|| invalid_id(input));
    }

    if (input.starts_with("http://") || input.starts_with("https://"))
        && let Some(parsed) = decompose_url(input)
    {
        return Ok(Reference::Url(parsed));
    }

    if let Some(id) = parse_canonical(input) {
        return Ok(Reference::Id(id));
    }

    Ok(Reference::Name(input.to_string()))
}

/// Accepts only `id:N` or a bare `N`.
pub fn extract_id(input: &str) -> Result<u64> {
    let id = match input.strip_prefix(ID_PREFIX) {
        Some(rest) => parse_digits(rest),
        None => parse_canonical(input),
    };
    id.ok_or_else(|| invalid_id(input))
}

/// Extracts identifiers from a Twist link, or `None` for foreign hosts,
/// malformed URLs and links without any recognised segment.
pub fn decompose_url(url: &str) -> Option<ParsedUrl> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    if !host.contains(TWIST_DOMAIN) {
        return None;
    }

    let path = parsed.path();
    let result = ParsedUrl {
        workspace_id: marker_id(path, "/a/"),
        channel_id: marker_id(path, "/ch/"),
        thread_id: marker_id(path, "/t/"),
        comment_id: marker_id(path, "/c/"),
        conversation_id: marker_id(path, "/msg/"),
        message_id: marker_id(path, "/m/"),
    };

    if result.is_empty() {
        None
    } else {
        Some(result)
    }
}

/// First occurrence of `marker` directly followed by digits.
fn marker_id(path: &str, marker: &str) -> Option<u64> {
    path.match_indices(marker).find_map(|(start, _)| {
        let digits: String = path[start + marker.len()..]
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    })
}

fn parse_digits(value: &str) -> Option<u64> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

/// Parses `value` only if it is exactly how the integer prints, which rejects
/// `+12`, `012`, ` 12` and `12.5`.
fn parse_canonical(value: &str) -> Option<u64> {
    let id: u64 = value.parse().ok()?;
    (id.to_string() == value).then_some(id)
}

fn invalid_id(input: &str) -> TwistError {
    TwistError::InvalidReference(format!("Invalid ID: {input}"))
}

fn resolve_numeric(
    input: &str,
    kind: &'static str,
    field: fn(&ParsedUrl) -> Option<u64>,
) -> Result<u64> {
    match classify_reference(input)? {
        Reference::Id(id) => Ok(id),
        Reference::Url(parsed) => field(&parsed).ok_or_else(|| {
            TwistError::InvalidReference(format!(
                "Invalid {kind} reference: {input}. Use {kind} ID or Twist URL."
            ))
        }),
        Reference::Name(_) => Err(TwistError::UnsupportedReferenceKind {
            kind,
            input: input.to_string(),
        }),
    }
}

pub fn resolve_thread_id(input: &str) -> Result<u64> {
    resolve_numeric(input, "thread", |p| p.thread_id)
}

pub fn resolve_comment_id(input: &str) -> Result<u64> {
    resolve_numeric(input, "comment", |p| p.comment_id)
}

pub fn resolve_conversation_id(input: &str) -> Result<u64> {
    resolve_numeric(input, "conversation", |p| p.conversation_id)
}

pub fn resolve_message_id(input: &str) -> Result<u64> {
    resolve_numeric(input, "message", |p| p.message_id)
}

/// Picks a workspace from an already-fetched collection.
///
/// Names match case-insensitively: an exact match wins, otherwise a single
/// substring match is accepted and several are reported as ambiguous.
pub fn resolve_workspace<'a>(workspaces: &'a [Workspace], input: &str) -> Result<&'a Workspace> {
    let by_id = |id: u64| {
        workspaces
            .iter()
            .find(|w| w.id == id)
            .ok_or_else(|| TwistError::NotFound(format!("Workspace with ID {id} not found")))
    };

    match classify_reference(input)? {
        Reference::Id(id) => by_id(id),
        Reference::Url(ParsedUrl {
            workspace_id: Some(id),
            ..
        }) => by_id(id),
        Reference::Url(_) => Err(workspace_not_found(input)),
        Reference::Name(name) => {
            let needle = name.to_lowercase();
            if let Some(exact) = workspaces.iter().find(|w| w.name.to_lowercase() == needle) {
                return Ok(exact);
            }

            let partial: Vec<&Workspace> = workspaces
                .iter()
                .filter(|w| w.name.to_lowercase().contains(&needle))
                .collect();
            match partial.as_slice() {
                [] => Err(workspace_not_found(input)),
                [only] => Ok(only),
                many => Err(TwistError::AmbiguousReference {
                    kind: "workspace",
                    input: input.to_string(),
                    candidates: candidate_list(many.iter().map(|w| (w.name.as_str(), w.id))),
                }),
            }
        }
    }
}

fn workspace_not_found(input: &str) -> TwistError {
    TwistError::NotFound(format!("Workspace \"{input}\" not found"))
}

fn candidate_list<'a>(items: impl Iterator<Item = (&'a str, u64)>) -> String {
    items
        .take(MAX_CANDIDATES)
        .map(|(name, id)| format!("\"{name}\" (id:{id})"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Resolves a comma-separated list of user references against workspace
/// members. Ids are passed through; names match name or email.
pub fn resolve_user_refs(users: &[WorkspaceUser], refs: &str) -> Result<Vec<u64>> {
    let mut ids = Vec::new();
    for raw in refs.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let id = match classify_reference(raw)? {
            Reference::Id(id) => id,
            Reference::Url(_) => {
                return Err(TwistError::InvalidReference(format!(
                    "Invalid user reference: {raw}. Use user ID or name."
                )));
            }
            Reference::Name(name) => resolve_user_name(users, &name)?.id,
        };
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

fn resolve_user_name<'a>(users: &'a [WorkspaceUser], name: &str) -> Result<&'a WorkspaceUser> {
    let needle = name.to_lowercase();
    let email_of = |u: &WorkspaceUser| u.email.as_deref().unwrap_or_default().to_lowercase();

    if let Some(exact) = users
        .iter()
        .find(|u| u.name.to_lowercase() == needle || email_of(u) == needle)
    {
        return Ok(exact);
    }

    let partial: Vec<&WorkspaceUser> = users
        .iter()
        .filter(|u| u.name.to_lowercase().contains(&needle) || email_of(u).contains(&needle))
        .collect();
    match partial.as_slice() {
        [] => Err(TwistError::NotFound(format!("User \"{name}\" not found"))),
        [only] => Ok(only),
        many => Err(TwistError::AmbiguousReference {
            kind: "user",
            input: name.to_string(),
            candidates: candidate_list(many.iter().map(|u| (u.name.as_str(), u.id))),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_skips_occurrences_without_digits() {
        assert_eq!(marker_id("/a/x/a/42", "/a/"), Some(42));
        assert_eq!(marker_id("/a/12abc", "/a/"), Some(12));
        assert_eq!(marker_id("/msg/9", "/m/"), None);
    }

    #[test]
    fn canonical_integers_only() {
        assert_eq!(parse_canonical("12"), Some(12));
        assert_eq!(parse_canonical("0"), Some(0));
        assert_eq!(parse_canonical("+12"), None);
        assert_eq!(parse_canonical("012"), None);
        assert_eq!(parse_canonical(" 12"), None);
        assert_eq!(parse_canonical("12.5"), None);
    }

    #[test]
    fn link_round_trips_through_decomposer() {
        let parsed = ParsedUrl {
            workspace_id: Some(1),
            channel_id: Some(2),
            thread_id: Some(3),
            comment_id: Some(4),
            ..Default::default()
        };
        let link = parsed.to_link();
        assert_eq!(link, "https://twist.com/a/1/ch/2/t/3/c/4");
        assert_eq!(decompose_url(&link), Some(parsed));
    }
}
