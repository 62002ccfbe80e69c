use foundation::LatLon;
use serde::{Deserialize, Serialize};

use crate::error::ClientError;

/// Endpoints and map defaults.
///
/// Every field is optional when deserializing; missing ones take the
/// defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub chat_url: String,
    pub location_url: String,
    /// Also close the location socket and stop the position watch on
    /// disconnect. Off by default: disconnecting only leaves the chat.
    pub close_location_on_disconnect: bool,
    pub map: MapConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chat_url: "ws://127.0.0.1:8080".to_string(),
            location_url: "ws://127.0.0.1:8081".to_string(),
            close_location_on_disconnect: false,
            map: MapConfig::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_json(text: &str) -> Result<Self, ClientError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Initial view before any marker exists.
    pub center: LatLon,
    pub zoom: u8,
    pub max_zoom: u8,
    pub tile_url: String,
    pub attribution: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: LatLon::new(-6.871382, 107.571098),
            zoom: 17,
            max_zoom: 19,
            tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors"
                .to_string(),
        }
    }
}
