use foundation::{ConnectionId, LatLon};
use protocol::Channel;

#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Open,
    Text(String),
    Closed,
    Error(String),
}

/// Which geolocation request produced a fix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixSource {
    Current,
    Watch,
}

/// Everything that can happen to a client, from any source.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    UsernameEdited(String),
    MessageEdited(String),
    ConnectClicked,
    DisconnectClicked,
    SendClicked,
    Socket {
        connection: ConnectionId,
        channel: Channel,
        event: SocketEvent,
    },
    Position {
        connection: ConnectionId,
        source: FixSource,
        outcome: Result<LatLon, String>,
    },
}

impl ClientEvent {
    pub fn socket(connection: ConnectionId, channel: Channel, event: SocketEvent) -> Self {
        ClientEvent::Socket {
            connection,
            channel,
            event,
        }
    }
}
