use serde::{Deserialize, Serialize};

use crate::models::{ContainerId, StatPoint};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub user_id: u64,
    pub token: String,
}

// -- Users --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: u64,
    pub email: String,
    pub name_first: String,
    pub name_last: String,
    pub handle: String,
    pub profile_img_url: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetNameRequest {
    pub name_first: String,
    pub name_last: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetEmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetHandleRequest {
    pub handle: String,
}

// -- Channels --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelCreateRequest {
    pub name: String,
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelCreateResponse {
    pub channel_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel_id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelDetails {
    pub name: String,
    pub is_public: bool,
    pub owner_members: Vec<UserProfile>,
    pub all_members: Vec<UserProfile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InviteRequest {
    pub user_id: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OwnerRequest {
    pub user_id: u64,
}

// -- DMs --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DmCreateRequest {
    /// Members to add besides the creator.
    pub user_ids: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmCreateResponse {
    pub dm_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmSummary {
    pub dm_id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmDetails {
    pub name: String,
    pub members: Vec<UserProfile>,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendLaterRequest {
    pub message: String,
    /// Unix seconds; must not be in the past.
    pub time_sent: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub message_id: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionView {
    pub react_id: u64,
    pub user_ids: Vec<u64>,
    pub is_this_user_reacted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageView {
    pub message_id: u64,
    pub author_id: u64,
    pub message: String,
    pub time_sent: i64,
    pub reactions: Vec<ReactionView>,
    pub is_pinned: bool,
}

/// One page of a newest-first message listing. `end` is `-1` when the page
/// reaches the oldest message, `start + 50` otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesPage {
    pub messages: Vec<MessageView>,
    pub start: u64,
    pub end: i64,
}

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    #[serde(default)]
    pub start: u64,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditMessageRequest {
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShareMessageRequest {
    pub og_message_id: u64,
    /// Extra text appended to the original body; may be empty.
    #[serde(default)]
    pub message: String,
    pub target: ContainerId,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReactRequest {
    pub react_id: u64,
}

// -- Standups --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandupStartRequest {
    /// Duration in seconds.
    pub length: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandupStartResponse {
    pub time_finish: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandupActiveResponse {
    pub is_active: bool,
    pub time_finish: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandupSendRequest {
    pub message: String,
}

// -- Notifications --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationView {
    pub container: ContainerId,
    pub message: String,
}

// -- Search --

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

// -- Admin --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PermissionChangeRequest {
    /// 1 = global owner, 2 = member.
    pub permission_id: u8,
}

// -- Stats --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStatsView {
    pub channels_joined: Vec<StatPoint>,
    pub dms_joined: Vec<StatPoint>,
    pub messages_sent: Vec<StatPoint>,
    pub involvement_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceStatsView {
    pub channels_exist: Vec<StatPoint>,
    pub dms_exist: Vec<StatPoint>,
    pub messages_exist: Vec<StatPoint>,
    pub utilization_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
