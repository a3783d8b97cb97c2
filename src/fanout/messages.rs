use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::GroupId;
use crate::store::{EventRecord, UserSummary};

pub const EVENT_UPDATED: &str = "eventUpdated";
pub const USER_JOINED_EVENT: &str = "userJoinedEvent";
pub const ERROR: &str = "error";

/// Tag of a server-to-client frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageTag {
    /// `eventUpdated`, sent to every connection
    EventUpdated,
    /// `userJoinedEvent`, sent to the members of one room
    UserJoinedEvent,
    /// `event:<eventId>:userJoined`, sent to every connection
    EventUserJoined(GroupId),
    /// `error`, sent back to a client whose frame was rejected
    Error,
}

impl MessageTag {
    pub fn wire_name(&self) -> String {
        match self {
            MessageTag::EventUpdated => EVENT_UPDATED.to_string(),
            MessageTag::UserJoinedEvent => USER_JOINED_EVENT.to_string(),
            MessageTag::EventUserJoined(event_id) => format!("event:{}:userJoined", event_id),
            MessageTag::Error => ERROR.to_string(),
        }
    }
}

/// Metadata for WebSocket messages
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessageMeta {
    pub timestamp: DateTime<Utc>,
}

/// Envelope of every server-to-client frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebSocketMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    pub payload: serde_json::Value,
    pub meta: Option<WebSocketMessageMeta>,
}

/// Payload shared by `userJoinedEvent` and `event:<eventId>:userJoined`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserJoinedPayload {
    pub event_id: GroupId,
    pub user: UserSummary,
    pub attendee_count: usize,
}

impl WebSocketMessage {
    pub fn new(tag: &MessageTag, payload: serde_json::Value) -> Self {
        Self {
            message_type: tag.wire_name(),
            payload,
            meta: Some(WebSocketMessageMeta {
                timestamp: Utc::now(),
            }),
        }
    }

    pub fn event_updated(event: &EventRecord) -> Result<Self, serde_json::Error> {
        Ok(Self::new(
            &MessageTag::EventUpdated,
            serde_json::to_value(event)?,
        ))
    }

    pub fn user_joined(tag: &MessageTag, payload: &UserJoinedPayload) -> Result<Self, serde_json::Error> {
        Ok(Self::new(tag, serde_json::to_value(payload)?))
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(
            &MessageTag::Error,
            serde_json::json!({ "message": message.into() }),
        )
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Client-to-server control frames
///
/// `{"type": "joinEventRoom", "payload": "<eventId>"}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum ClientMessage {
    JoinEventRoom(GroupId),
    LeaveEventRoom(GroupId),
}
