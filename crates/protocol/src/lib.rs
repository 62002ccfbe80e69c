//! Wire payloads for the chat and location sockets.
//!
//! Both sockets carry JSON text frames:
//! - chat: `{type, username, message, time}` in both directions
//! - location: `{username, lat, lon}` in both directions, no `type` tag
//!
//! The two endpoints are independent connections; nothing here ties a chat
//! frame to a location frame.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Which of the two sockets a frame travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Chat,
    Location,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Chat => "chat",
            Channel::Location => "location",
        }
    }
}

/// Discriminator of a chat frame.
///
/// Servers are free to invent new types; anything unrecognised (a missing,
/// `null` or non-string `type` included) lands in `Other` and is rendered as
/// an ordinary user message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    /// Sent once by the client right after the chat socket opens.
    Connect,
    /// Server notice that a user joined.
    Announcement,
    /// Ordinary chat line.
    Message,
    /// Protocol-level error from the server (e.g. username taken).
    Error,
    #[default]
    Other,
}

impl ChatKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "connect" => ChatKind::Connect,
            "announcement" => ChatKind::Announcement,
            "message" => ChatKind::Message,
            "error" => ChatKind::Error,
            _ => ChatKind::Other,
        }
    }
}

impl<'de> Deserialize<'de> for ChatKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<Value>::deserialize(deserializer)? {
            Some(Value::String(tag)) => ChatKind::from_tag(&tag),
            _ => ChatKind::Other,
        })
    }
}

/// Text field that tolerates non-string JSON: `null` is empty, numbers and
/// other values keep their JSON spelling.
fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text,
        Some(other) => other.to_string(),
    })
}

/// A chat frame.
///
/// Every field except `type` may be absent on the wire; the server omits
/// `username` and `time` on errors, and the client omits `message` and `time`
/// on connect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "type", default)]
    pub kind: ChatKind,
    #[serde(default, deserialize_with = "lenient_text")]
    pub username: String,
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "String::is_empty"
    )]
    pub message: String,
    /// Local time-of-day, `HH:MM:SS`.
    #[serde(
        default,
        deserialize_with = "lenient_text",
        skip_serializing_if = "String::is_empty"
    )]
    pub time: String,
}

impl ChatMessage {
    /// Announcement sent on chat-socket open.
    pub fn connect(username: impl Into<String>) -> Self {
        Self {
            kind: ChatKind::Connect,
            username: username.into(),
            ..Self::default()
        }
    }

    /// Outbound chat line stamped with the sender's local time.
    pub fn text(
        username: impl Into<String>,
        message: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            kind: ChatKind::Message,
            username: username.into(),
            message: message.into(),
            time: time.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A position report for one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationUpdate {
    pub username: String,
    pub lat: f64,
    pub lon: f64,
}

impl LocationUpdate {
    pub fn new(username: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            username: username.into(),
            lat,
            lon,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

pub fn decode_chat(text: &str) -> Result<ChatMessage, serde_json::Error> {
    serde_json::from_str(text)
}

pub fn decode_location(text: &str) -> Result<LocationUpdate, serde_json::Error> {
    serde_json::from_str(text)
}
