//! Per-invocation state shared by all commands.
//!
//! A `Session` owns the remote directory together with the caches that live
//! for one CLI invocation: the workspace list, the session user and the
//! public channel sets. Nothing here is persisted except the current
//! workspace choice, which goes to the config file.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::api::{Directory, TwistClient};
use crate::config::{api_token, read_config, update_config};
use crate::error::{Result, TwistError};
use crate::models::{Channel, Thread, User, Workspace};
use crate::refs::resolve_workspace;
use crate::visibility::{PublicChannelCache, VisibilityPolicy};

pub struct Session<D: Directory = TwistClient> {
    directory: D,
    config_path: PathBuf,
    policy: VisibilityPolicy,
    workspaces: Option<Vec<Workspace>>,
    session_user: Option<User>,
    public_channels: PublicChannelCache,
}

impl Session<TwistClient> {
    /// Builds a session against the live API using the configured token.
    pub fn connect(config_path: PathBuf) -> Result<Self> {
        let token = api_token(&config_path)?;
        Ok(Session::new(TwistClient::new(token)?, config_path))
    }

    pub fn client(&self) -> &TwistClient {
        &self.directory
    }
}

impl<D: Directory> Session<D> {
    pub fn new(directory: D, config_path: PathBuf) -> Self {
        Self {
            directory,
            config_path,
            policy: VisibilityPolicy::default(),
            workspaces: None,
            session_user: None,
            public_channels: PublicChannelCache::new(),
        }
    }

    pub fn with_policy(mut self, policy: VisibilityPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn directory(&self) -> &D {
        &self.directory
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn include_private_channels(&self) -> bool {
        self.policy.includes_private()
    }

    /// All workspaces of the user, fetched once.
    pub fn workspaces(&mut self) -> Result<&[Workspace]> {
        if self.workspaces.is_none() {
            tracing::debug!("loading workspaces");
            self.workspaces = Some(self.directory.fetch_workspaces()?);
        }
        Ok(self.workspaces.as_deref().unwrap_or_default())
    }

    pub fn resolve_workspace(&mut self, reference: &str) -> Result<Workspace> {
        let workspaces = self.workspaces()?;
        resolve_workspace(workspaces, reference).cloned()
    }

    pub fn session_user(&mut self) -> Result<User> {
        match &self.session_user {
            Some(user) => Ok(user.clone()),
            None => {
                let user = self.directory.fetch_session_user()?;
                self.session_user = Some(user.clone());
                Ok(user)
            }
        }
    }

    /// The configured workspace, else the user's default, else the first
    /// workspace. A fallback choice is saved to the config.
    pub fn current_workspace_id(&mut self) -> Result<u64> {
        if let Some(id) = read_config(&self.config_path)?.current_workspace {
            return Ok(id);
        }

        let fallback = match self.session_user()?.default_workspace {
            Some(id) => id,
            None => self
                .workspaces()?
                .first()
                .map(|w| w.id)
                .ok_or_else(|| TwistError::Message("No workspaces found for this user".to_string()))?,
        };
        tracing::debug!(workspace_id = fallback, "saving current workspace");
        update_config(&self.config_path, |config| {
            config.current_workspace = Some(fallback)
        })?;
        Ok(fallback)
    }

    /// Workspace for commands taking both a positional reference and
    /// `--workspace`.
    pub fn workspace_id_for(
        &mut self,
        positional: Option<&str>,
        flag: Option<&str>,
    ) -> Result<u64> {
        match (positional, flag) {
            (Some(_), Some(_)) => Err(TwistError::Message(
                "Cannot specify workspace both as argument and --workspace flag".to_string(),
            )),
            (Some(reference), None) | (None, Some(reference)) => {
                Ok(self.resolve_workspace(reference)?.id)
            }
            (None, None) => self.current_workspace_id(),
        }
    }

    /// Full channel list of a workspace. The public set is filled from the
    /// same response, so a later gate check does not fetch again.
    pub fn channels(&mut self, workspace_id: u64) -> Result<Vec<Channel>> {
        let channels = self.directory.fetch_channels(workspace_id)?;
        self.public_channels.record(workspace_id, &channels);
        Ok(channels)
    }

    pub fn public_channel_ids(&mut self, workspace_id: u64) -> Result<&HashSet<u64>> {
        self.public_channels
            .public_channel_ids(&self.directory, workspace_id)
    }

    pub fn assert_channel_is_public(&mut self, channel_id: u64, workspace_id: u64) -> Result<()> {
        let include_private = self.include_private_channels();
        self.public_channels.assert_channel_is_public(
            include_private,
            &self.directory,
            channel_id,
            workspace_id,
        )
    }

    /// Gate for commands acting on a thread.
    pub fn assert_thread_is_public(&mut self, thread: &Thread) -> Result<()> {
        self.assert_channel_is_public(thread.channel_id, thread.workspace_id)
    }

    pub fn clear_public_channel_cache(&mut self) {
        self.public_channels.clear();
    }
}
