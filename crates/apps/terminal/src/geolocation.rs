//! A stationary position source for hosts without a GPS.

use std::collections::HashMap;
use std::time::Duration;

use client::{ClientError, ClientEvent, FixSource, Geolocator};
use foundation::{ConnectionId, LatLon, WatchId};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::socket::Events;

/// Reports a fixed position once on request and then on every tick of each
/// active watch. Without a position every request fails.
#[derive(Debug)]
pub struct FixedGeolocator {
    position: Option<LatLon>,
    every: Duration,
    events: Events,
    watches: HashMap<i32, JoinHandle<()>>,
    next_watch: i32,
}

impl FixedGeolocator {
    pub fn new(position: Option<LatLon>, every: Duration, events: Events) -> Self {
        Self {
            position,
            every,
            events,
            watches: HashMap::new(),
            next_watch: 1,
        }
    }

    fn position(&self) -> Result<LatLon, ClientError> {
        self.position.ok_or(ClientError::GeolocationUnavailable)
    }
}

impl Geolocator for FixedGeolocator {
    fn current_position(&mut self, connection: ConnectionId) -> Result<(), ClientError> {
        let at = self.position()?;
        let _ = self.events.send(ClientEvent::Position {
            connection,
            source: FixSource::Current,
            outcome: Ok(at),
        });
        Ok(())
    }

    fn watch_position(&mut self, connection: ConnectionId) -> Result<WatchId, ClientError> {
        let at = self.position()?;
        let events = self.events.clone();
        let mut ticks = interval(self.every);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let task = tokio::spawn(async move {
            // The first tick fires immediately; the one-shot reading covers it.
            ticks.tick().await;
            loop {
                ticks.tick().await;
                let fix = ClientEvent::Position {
                    connection,
                    source: FixSource::Watch,
                    outcome: Ok(at),
                };
                if events.send(fix).is_err() {
                    break;
                }
            }
        });

        let id = self.next_watch;
        self.next_watch = self.next_watch.wrapping_add(1);
        self.watches.insert(id, task);
        debug!(id, every = ?self.every, "watch started");
        Ok(WatchId(id))
    }

    fn clear_watch(&mut self, watch: WatchId) {
        if let Some(task) = self.watches.remove(&watch.0) {
            task.abort();
            debug!(id = watch.0, "watch cleared");
        }
    }
}
