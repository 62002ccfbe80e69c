//! Platform collaborators: sockets, geolocation and wall clock.
//!
//! Implementations deliver everything asynchronous back to the session as
//! [`ClientEvent`](crate::ClientEvent)s tagged with the [`ConnectionId`] they
//! were started under.

use foundation::{ConnectionId, WatchId};
use protocol::Channel;

use crate::error::ClientError;

/// An open (or opening) text socket.
pub trait Socket {
    fn send_text(&mut self, text: &str) -> Result<(), ClientError>;
    /// True once the handshake finished and until a close starts.
    fn is_open(&self) -> bool;
    fn close(&mut self);
}

/// Opens sockets whose events are routed back as `ClientEvent::Socket`.
pub trait Connector {
    fn open(
        &mut self,
        connection: ConnectionId,
        channel: Channel,
        url: &str,
    ) -> Result<Box<dyn Socket>, ClientError>;
}

/// Device position source; results arrive as `ClientEvent::Position`.
pub trait Geolocator {
    /// One-shot reading.
    fn current_position(&mut self, connection: ConnectionId) -> Result<(), ClientError>;
    /// Continuous readings until [`Geolocator::clear_watch`].
    fn watch_position(&mut self, connection: ConnectionId) -> Result<WatchId, ClientError>;
    fn clear_watch(&mut self, watch: WatchId);
}

/// Local wall clock.
pub trait Clock {
    /// Time of day as `HH:MM:SS` (24h).
    fn time_of_day(&self) -> String;
}
