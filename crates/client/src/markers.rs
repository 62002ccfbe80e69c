use std::collections::BTreeMap;

use foundation::{GeoBounds, LatLon};
use tracing::{debug, warn};

use crate::markup::Markup;

/// Map widget primitives the marker store drives.
pub trait MapSurface {
    /// Platform handle of a placed marker.
    type Handle;

    /// Place a marker with a popup bound to it.
    fn add_marker(&mut self, at: LatLon, popup: &Markup) -> Self::Handle;
    fn remove_marker(&mut self, handle: Self::Handle);
    /// Adjust the viewport so `bounds` is visible.
    fn fit_bounds(&mut self, bounds: GeoBounds);
}

#[derive(Debug)]
pub struct Marker<H> {
    pub position: LatLon,
    pub handle: H,
}

/// One marker per username, kept in sync with the map.
#[derive(Debug)]
pub struct MarkerStore<M: MapSurface> {
    map: M,
    markers: BTreeMap<String, Marker<M::Handle>>,
}

impl<M: MapSurface> MarkerStore<M> {
    pub fn new(map: M) -> Self {
        Self {
            map,
            markers: BTreeMap::new(),
        }
    }

    /// Insert or replace the marker for `username`, then refit the viewport
    /// to all markers.
    ///
    /// The previous handle is removed from the map before the new one is
    /// added. Returns `false` (and leaves the store untouched) for
    /// non-finite coordinates.
    pub fn upsert(&mut self, username: &str, at: LatLon) -> bool {
        if !at.is_finite() {
            warn!(%username, lat = at.lat, lon = at.lon, "ignoring non-finite position");
            return false;
        }

        if let Some(old) = self.markers.remove(username) {
            self.map.remove_marker(old.handle);
        }
        let handle = self.map.add_marker(at, &Markup::text(username));
        self.markers.insert(
            username.to_string(),
            Marker {
                position: at,
                handle,
            },
        );
        debug!(%username, lat = at.lat, lon = at.lon, markers = self.markers.len(), "marker upserted");

        if let Some(bounds) = self.bounds() {
            self.map.fit_bounds(bounds);
        }
        true
    }

    /// Remove every marker from the map.
    pub fn clear(&mut self) {
        for (_, marker) in std::mem::take(&mut self.markers) {
            self.map.remove_marker(marker.handle);
        }
    }

    pub fn position(&self, username: &str) -> Option<LatLon> {
        self.markers.get(username).map(|m| m.position)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn usernames(&self) -> impl Iterator<Item = &str> {
        self.markers.keys().map(String::as_str)
    }

    /// Box covering every marker; `None` when there are none.
    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::covering(self.markers.values().map(|m| m.position))
    }

    pub fn map(&self) -> &M {
        &self.map
    }
}

/// Map surface that only tracks state; for headless frontends and tests.
#[derive(Debug, Default)]
pub struct InMemoryMap {
    next_handle: u64,
    live: BTreeMap<u64, (LatLon, Markup)>,
    last_fit: Option<GeoBounds>,
    fits: usize,
}

impl InMemoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markers currently on the map as `(popup text, position)`.
    pub fn live_markers(&self) -> Vec<(String, LatLon)> {
        self.live
            .values()
            .map(|(at, popup)| (popup.plain().to_string(), *at))
            .collect()
    }

    /// Popup HTML exactly as handed to the map, in placement order.
    pub fn popup_html(&self) -> Vec<String> {
        self.live
            .values()
            .map(|(_, popup)| popup.html().to_string())
            .collect()
    }

    pub fn last_fit(&self) -> Option<GeoBounds> {
        self.last_fit
    }

    pub fn fit_count(&self) -> usize {
        self.fits
    }
}

impl MapSurface for InMemoryMap {
    type Handle = u64;

    fn add_marker(&mut self, at: LatLon, popup: &Markup) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.live.insert(handle, (at, popup.clone()));
        handle
    }

    fn remove_marker(&mut self, handle: u64) {
        self.live.remove(&handle);
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        self.last_fit = Some(bounds);
        self.fits += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn upsert_same_user_keeps_single_marker_at_latest_position() {
        let mut store = MarkerStore::new(InMemoryMap::new());
        assert!(store.upsert("alice", LatLon::new(1.0, 2.0)));
        assert!(store.upsert("alice", LatLon::new(3.0, 4.0)));

        assert_eq!(store.len(), 1);
        assert_eq!(store.position("alice"), Some(LatLon::new(3.0, 4.0)));
        assert_eq!(
            store.map().live_markers(),
            vec![("alice".to_string(), LatLon::new(3.0, 4.0))]
        );
    }

    #[test]
    fn every_upsert_refits_to_all_markers() {
        let mut store = MarkerStore::new(InMemoryMap::new());
        store.upsert("alice", LatLon::new(-6.9, 107.5));
        assert!(store.map().last_fit().unwrap().is_point());

        store.upsert("bob", LatLon::new(-6.8, 107.7));
        let fit = store.map().last_fit().unwrap();
        assert_eq!(fit.south_west, LatLon::new(-6.9, 107.5));
        assert_eq!(fit.north_east, LatLon::new(-6.8, 107.7));
        assert_eq!(store.map().fit_count(), 2);
        assert_eq!(store.usernames().collect::<Vec<_>>(), vec!["alice", "bob"]);
    }

    #[test]
    fn non_finite_position_is_rejected() {
        let mut store = MarkerStore::new(InMemoryMap::new());
        store.upsert("alice", LatLon::new(1.0, 1.0));
        assert!(!store.upsert("alice", LatLon::new(f64::NAN, 1.0)));
        assert_eq!(store.position("alice"), Some(LatLon::new(1.0, 1.0)));
        assert_eq!(store.map().fit_count(), 1);
    }

    #[test]
    fn popup_html_is_escaped_username() {
        let mut store = MarkerStore::new(InMemoryMap::new());
        store.upsert("<b>eve</b>", LatLon::new(1.0, 1.0));
        assert_eq!(
            store.map().popup_html(),
            vec!["&lt;b&gt;eve&lt;/b&gt;".to_string()]
        );
        assert_eq!(
            store.map().live_markers(),
            vec![("<b>eve</b>".to_string(), LatLon::new(1.0, 1.0))]
        );
    }

    #[test]
    fn clear_removes_map_handles() {
        let mut store = MarkerStore::new(InMemoryMap::new());
        store.upsert("alice", LatLon::new(1.0, 1.0));
        store.upsert("bob", LatLon::new(2.0, 2.0));
        store.clear();
        assert!(store.is_empty());
        assert!(store.map().live_markers().is_empty());
        assert!(store.bounds().is_none());
    }
}
