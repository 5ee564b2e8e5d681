use serde::{Deserialize, Serialize};

/// Addressable target of a message: a channel or a DM. Channel and DM ids are
/// independent monotonic counters, both starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ContainerId {
    Channel(u64),
    Dm(u64),
}

/// Workspace-wide permission levels. Level 1 ("stream owner") is a global
/// administrator; at least one must exist at all times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionLevel {
    Owner,
    Member,
}

impl PermissionLevel {
    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Self::Owner),
            2 => Some(Self::Member),
            _ => None,
        }
    }
}

/// A registered account. Removal is a soft tombstone: the record stays so
/// historical messages keep a valid author, but email and handle are cleared
/// and the name is replaced with sentinel values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub email: String,
    pub name_first: String,
    pub name_last: String,
    pub handle: String,
    pub profile_img_url: String,
    pub removed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub password_hash: String,
    pub user_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Channel {
    pub id: u64,
    pub name: String,
    pub is_public: bool,
    /// Subset of `members`, insertion-ordered.
    pub owners: Vec<u64>,
    /// Insertion-ordered; a user appears at most once.
    pub members: Vec<u64>,
    /// Message ids, newest first.
    pub messages: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dm {
    pub id: u64,
    /// Derived at creation: sorted member handles joined with ", ".
    pub name: String,
    pub creator: u64,
    pub members: Vec<u64>,
    pub messages: Vec<u64>,
    /// A removed DM keeps its message records but accepts no new activity
    /// and disappears from listings.
    pub removed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Globally unique, monotonically increasing across all containers.
    pub id: u64,
    pub container: ContainerId,
    pub author: u64,
    pub body: String,
    pub time_sent: i64,
    pub reactions: Vec<Reaction>,
    pub is_pinned: bool,
}

/// Only react id 1 ("thumbs up") is currently valid.
pub const REACT_THUMBS_UP: u64 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    pub react_id: u64,
    /// Reacting users in insertion order.
    pub user_ids: Vec<u64>,
}

/// At most one active standup per channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Standup {
    pub initiator: u64,
    pub time_finish: i64,
    /// Newline-joined "{handle}: {line}" entries.
    pub buffer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub container: ContainerId,
    pub message: String,
}

/// One point of an append-only usage series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatPoint {
    pub num: u64,
    pub time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStats {
    pub channels_joined: Vec<StatPoint>,
    pub dms_joined: Vec<StatPoint>,
    pub messages_sent: Vec<StatPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceStats {
    pub channels_exist: Vec<StatPoint>,
    pub dms_exist: Vec<StatPoint>,
    pub messages_exist: Vec<StatPoint>,
}
