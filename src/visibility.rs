//! Private channel visibility.
//!
//! Private channels are hidden unless the user opts in with
//! `--include-private-channels` or `TWIST_INCLUDE_PRIVATE_CHANNELS`.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::api::Directory;
use crate::error::{Result, TwistError};
use crate::models::Channel;

pub const INCLUDE_PRIVATE_FLAG: &str = "--include-private-channels";
pub const INCLUDE_PRIVATE_ENV: &str = "TWIST_INCLUDE_PRIVATE_CHANNELS";

/// Reads the policy from the process arguments and environment.
pub fn include_private_channels() -> bool {
    let env = std::env::var(INCLUDE_PRIVATE_ENV).ok();
    include_private_channels_from(std::env::args(), env.as_deref())
}

/// Only the exact values `1` and `true` enable the env var.
pub fn include_private_channels_from<I, S>(args: I, env: Option<&str>) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    matches!(env, Some("1" | "true"))
        || args.into_iter().any(|arg| arg.as_ref() == INCLUDE_PRIVATE_FLAG)
}

/// Where the visibility decision comes from.
#[derive(Debug, Clone, Copy, Default)]
pub enum VisibilityPolicy {
    /// Re-read argv and env on every check.
    #[default]
    Process,
    Fixed(bool),
}

impl VisibilityPolicy {
    pub fn includes_private(&self) -> bool {
        match self {
            VisibilityPolicy::Process => include_private_channels(),
            VisibilityPolicy::Fixed(include) => *include,
        }
    }
}

/// Public channel ids per workspace, filled at most once per workspace.
#[derive(Debug, Default)]
pub struct PublicChannelCache {
    by_workspace: HashMap<u64, HashSet<u64>>,
}

impl PublicChannelCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn public_channel_ids<D: Directory + ?Sized>(
        &mut self,
        directory: &D,
        workspace_id: u64,
    ) -> Result<&HashSet<u64>> {
        match self.by_workspace.entry(workspace_id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                tracing::debug!(workspace_id, "loading public channels");
                let ids: HashSet<u64> = directory
                    .fetch_channels(workspace_id)?
                    .into_iter()
                    .filter(|channel| channel.public)
                    .map(|channel| channel.id)
                    .collect();
                Ok(entry.insert(ids))
            }
        }
    }

    /// Fills the set for `workspace_id` from a channel list the caller already
    /// fetched. An existing entry is left alone.
    pub fn record(&mut self, workspace_id: u64, channels: &[Channel]) {
        self.by_workspace.entry(workspace_id).or_insert_with(|| {
            channels
                .iter()
                .filter(|channel| channel.public)
                .map(|channel| channel.id)
                .collect()
        });
    }

    /// Fails unless private channels are allowed or `channel_id` is public.
    /// Unknown channels fail the same way as private ones.
    pub fn assert_channel_is_public<D: Directory + ?Sized>(
        &mut self,
        include_private: bool,
        directory: &D,
        channel_id: u64,
        workspace_id: u64,
    ) -> Result<()> {
        if include_private {
            return Ok(());
        }
        if self
            .public_channel_ids(directory, workspace_id)?
            .contains(&channel_id)
        {
            Ok(())
        } else {
            Err(TwistError::PrivateChannelAccess { channel_id })
        }
    }

    pub fn clear(&mut self) {
        self.by_workspace.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn hidden_by_default() {
        assert!(!include_private_channels_from(args(&["tw", "channels"]), None));
    }

    #[test]
    fn flag_anywhere_in_argv() {
        assert!(include_private_channels_from(
            args(&["tw", "channels", "--include-private-channels"]),
            None
        ));
        assert!(include_private_channels_from(
            args(&["tw", "--include-private-channels", "inbox"]),
            Some("0")
        ));
    }

    #[test]
    fn env_accepts_only_exact_truthy_values() {
        for value in ["1", "true"] {
            assert!(include_private_channels_from(args(&["tw"]), Some(value)));
        }
        for value in ["0", "false", "", "TRUE", "yes", " 1"] {
            assert!(
                !include_private_channels_from(args(&["tw"]), Some(value)),
                "{value:?} should not enable private channels"
            );
        }
    }

    #[test]
    fn fixed_policy_ignores_process_state() {
        assert!(VisibilityPolicy::Fixed(true).includes_private());
        assert!(!VisibilityPolicy::Fixed(false).includes_private());
    }
}
