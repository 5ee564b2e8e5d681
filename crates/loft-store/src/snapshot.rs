use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use loft_types::models::{
    Channel, ContainerId, Credential, Dm, Message, Notification, Standup, StatPoint, User,
    UserStats, WorkspaceStats,
};
use loft_types::{LoftError, Result};

/// The whole workspace state. Serialized as one opaque snapshot; id-keyed
/// maps are BTreeMaps so listings come back in creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workspace {
    pub users: BTreeMap<u64, User>,
    /// email -> credential; removed (not tombstoned) on user removal so the
    /// email becomes reusable.
    pub credentials: HashMap<String, Credential>,
    /// token -> user id; many tokens per user.
    pub sessions: HashMap<String, u64>,
    pub channels: BTreeMap<u64, Channel>,
    pub dms: BTreeMap<u64, Dm>,
    pub messages: BTreeMap<u64, Message>,
    /// channel id -> active standup.
    pub standups: HashMap<u64, Standup>,
    /// Per-user feed, newest first.
    pub notifications: HashMap<u64, Vec<Notification>>,
    pub user_stats: HashMap<u64, UserStats>,
    pub workspace_stats: WorkspaceStats,
    /// Workspace-wide administrators; never empty once a user exists.
    pub global_owners: BTreeSet<u64>,

    pub next_user_id: u64,
    pub next_channel_id: u64,
    pub next_dm_id: u64,
    pub next_message_id: u64,
}

impl Workspace {
    pub fn new(now: i64) -> Self {
        let zero = vec![StatPoint { num: 0, time: now }];
        Self {
            users: BTreeMap::new(),
            credentials: HashMap::new(),
            sessions: HashMap::new(),
            channels: BTreeMap::new(),
            dms: BTreeMap::new(),
            messages: BTreeMap::new(),
            standups: HashMap::new(),
            notifications: HashMap::new(),
            user_stats: HashMap::new(),
            workspace_stats: WorkspaceStats {
                channels_exist: zero.clone(),
                dms_exist: zero.clone(),
                messages_exist: zero,
            },
            global_owners: BTreeSet::new(),
            next_user_id: 1,
            next_channel_id: 1,
            next_dm_id: 1,
            next_message_id: 1,
        }
    }

    // -- Lookups --

    /// Any user that ever existed, tombstoned or not.
    pub fn user(&self, id: u64) -> Result<&User> {
        self.users
            .get(&id)
            .ok_or_else(|| LoftError::input(format!("user {id} not found")))
    }

    pub fn user_mut(&mut self, id: u64) -> Result<&mut User> {
        self.users
            .get_mut(&id)
            .ok_or_else(|| LoftError::input(format!("user {id} not found")))
    }

    /// A user that exists and has not been removed.
    pub fn active_user(&self, id: u64) -> Result<&User> {
        match self.users.get(&id) {
            Some(u) if !u.removed => Ok(u),
            _ => Err(LoftError::input(format!("user {id} not found"))),
        }
    }

    pub fn channel(&self, id: u64) -> Result<&Channel> {
        self.channels
            .get(&id)
            .ok_or_else(|| LoftError::input(format!("channel {id} not found")))
    }

    pub fn channel_mut(&mut self, id: u64) -> Result<&mut Channel> {
        self.channels
            .get_mut(&id)
            .ok_or_else(|| LoftError::input(format!("channel {id} not found")))
    }

    /// A DM that exists and has not been tombstoned.
    pub fn dm(&self, id: u64) -> Result<&Dm> {
        match self.dms.get(&id) {
            Some(dm) if !dm.removed => Ok(dm),
            _ => Err(LoftError::input(format!("dm {id} not found"))),
        }
    }

    pub fn dm_mut(&mut self, id: u64) -> Result<&mut Dm> {
        match self.dms.get_mut(&id) {
            Some(dm) if !dm.removed => Ok(dm),
            _ => Err(LoftError::input(format!("dm {id} not found"))),
        }
    }

    pub fn message(&self, id: u64) -> Result<&Message> {
        self.messages
            .get(&id)
            .ok_or_else(|| LoftError::input(format!("message {id} not found")))
    }

    pub fn message_mut(&mut self, id: u64) -> Result<&mut Message> {
        self.messages
            .get_mut(&id)
            .ok_or_else(|| LoftError::input(format!("message {id} not found")))
    }

    /// Existence check for a container. Tombstoned DMs do not count.
    pub fn container_exists(&self, container: ContainerId) -> bool {
        match container {
            ContainerId::Channel(id) => self.channels.contains_key(&id),
            ContainerId::Dm(id) => self.dms.get(&id).is_some_and(|dm| !dm.removed),
        }
    }

    pub fn container_name(&self, container: ContainerId) -> Result<&str> {
        match container {
            ContainerId::Channel(id) => Ok(&self.channel(id)?.name),
            ContainerId::Dm(id) => Ok(&self.dm(id)?.name),
        }
    }

    // -- Membership and ownership --

    pub fn is_channel_member(&self, user_id: u64, channel: &Channel) -> bool {
        channel.members.contains(&user_id)
    }

    pub fn is_container_member(&self, user_id: u64, container: ContainerId) -> Result<bool> {
        match container {
            ContainerId::Channel(id) => Ok(self.channel(id)?.members.contains(&user_id)),
            ContainerId::Dm(id) => Ok(self.dm(id)?.members.contains(&user_id)),
        }
    }

    pub fn is_global_owner(&self, user_id: u64) -> bool {
        self.global_owners.contains(&user_id)
    }

    /// Channel-owner permission: a listed owner, or a global owner who is a
    /// member of the channel.
    pub fn has_channel_owner_perms(&self, user_id: u64, channel: &Channel) -> bool {
        channel.owners.contains(&user_id)
            || (self.is_global_owner(user_id) && channel.members.contains(&user_id))
    }

    /// Owner permission over any container. For DMs only the creator has it.
    pub fn has_container_owner_perms(&self, user_id: u64, container: ContainerId) -> Result<bool> {
        match container {
            ContainerId::Channel(id) => {
                let channel = self.channel(id)?;
                Ok(self.has_channel_owner_perms(user_id, channel))
            }
            ContainerId::Dm(id) => Ok(self.dm(id)?.creator == user_id),
        }
    }

    /// Message id list of a container, newest first.
    pub fn container_messages_mut(&mut self, container: ContainerId) -> Result<&mut Vec<u64>> {
        match container {
            ContainerId::Channel(id) => Ok(&mut self.channel_mut(id)?.messages),
            ContainerId::Dm(id) => Ok(&mut self.dm_mut(id)?.messages),
        }
    }
}
