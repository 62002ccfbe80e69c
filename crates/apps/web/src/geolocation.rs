//! `navigator.geolocation` as a [`Geolocator`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use client::{ClientError, ClientEvent, FixSource, Geolocator};
use foundation::{ConnectionId, LatLon, WatchId};
use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::Geolocation;

use crate::dispatch;

fn number(obj: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(obj, &JsValue::from_str(key)).ok()?.as_f64()
}

/// `GeolocationPosition` → coordinates.
fn coords_of(position: &JsValue) -> Result<LatLon, String> {
    let coords = Reflect::get(position, &JsValue::from_str("coords"))
        .map_err(|_| "position without coords".to_string())?;
    match (number(&coords, "latitude"), number(&coords, "longitude")) {
        (Some(lat), Some(lon)) => Ok(LatLon::new(lat, lon)),
        _ => Err("position without latitude/longitude".to_string()),
    }
}

/// `GeolocationPositionError` → its message.
fn error_text(err: &JsValue) -> String {
    Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
        .unwrap_or_else(|| format!("{err:?}"))
}

fn report(connection: ConnectionId, source: FixSource, outcome: Result<LatLon, String>) {
    dispatch(ClientEvent::Position {
        connection,
        source,
        outcome,
    });
}

type Callback = Closure<dyn FnMut(JsValue)>;

/// Holds the callbacks of a one-shot request; whichever fires first takes
/// them out so both are released together.
struct OneShot<T>(Rc<RefCell<Option<T>>>);

impl<T> Clone for OneShot<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> OneShot<T> {
    fn new() -> Self {
        Self(Rc::new(RefCell::new(None)))
    }

    fn arm(&self, value: T) {
        *self.0.borrow_mut() = Some(value);
    }

    fn take(&self) -> Option<T> {
        self.0.borrow_mut().take()
    }
}

impl OneShot<(Callback, Callback)> {
    /// Drop both callbacks once the one currently running has returned.
    fn release(&self) {
        if let Some(callbacks) = self.take() {
            spawn_local(async move { drop(callbacks) });
        }
    }
}

#[derive(Debug, Default)]
pub struct BrowserGeolocator {
    watches: HashMap<i32, (Callback, Callback)>,
}

impl BrowserGeolocator {
    fn api() -> Result<Geolocation, ClientError> {
        web_sys::window()
            .ok_or(ClientError::GeolocationUnavailable)?
            .navigator()
            .geolocation()
            .map_err(|_| ClientError::GeolocationUnavailable)
    }
}

impl Geolocator for BrowserGeolocator {
    fn current_position(&mut self, connection: ConnectionId) -> Result<(), ClientError> {
        let geo = Self::api()?;
        let pending = OneShot::new();
        let on_fix = {
            let pending = pending.clone();
            Callback::new(move |position: JsValue| {
                pending.release();
                report(connection, FixSource::Current, coords_of(&position));
            })
        };
        let on_error = {
            let pending = pending.clone();
            Callback::new(move |err: JsValue| {
                pending.release();
                report(connection, FixSource::Current, Err(error_text(&err)));
            })
        };
        geo.get_current_position_with_error_callback(
            on_fix.as_ref().unchecked_ref(),
            Some(on_error.as_ref().unchecked_ref()),
        )
        .map_err(|e| ClientError::Transport(error_text(&e)))?;
        // Callbacks never run synchronously, so arming afterwards is safe.
        pending.arm((on_fix, on_error));
        Ok(())
    }

    fn watch_position(&mut self, connection: ConnectionId) -> Result<WatchId, ClientError> {
        let geo = Self::api()?;
        let on_fix = Callback::new(move |position: JsValue| {
            report(connection, FixSource::Watch, coords_of(&position));
        });
        let on_error = Callback::new(move |err: JsValue| {
            report(connection, FixSource::Watch, Err(error_text(&err)));
        });
        let id = geo
            .watch_position_with_error_callback(
                on_fix.as_ref().unchecked_ref(),
                Some(on_error.as_ref().unchecked_ref()),
            )
            .map_err(|e| ClientError::Transport(error_text(&e)))?;
        self.watches.insert(id, (on_fix, on_error));
        Ok(WatchId(id))
    }

    fn clear_watch(&mut self, watch: WatchId) {
        if let Ok(geo) = Self::api() {
            geo.clear_watch(watch.0);
        }
        if let Some(callbacks) = self.watches.remove(&watch.0) {
            spawn_local(async move { drop(callbacks) });
        }
    }
}
