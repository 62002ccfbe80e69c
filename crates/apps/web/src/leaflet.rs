//! Bindings for the subset of Leaflet (global `L`) the client uses, and the
//! `MapSurface` built on them.

use client::{MapConfig, MapSurface, Markup};
use foundation::{GeoBounds, LatLon};
use js_sys::{Array, Object, Reflect};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[derive(Debug, Clone)]
    pub type Map;

    #[derive(Debug, Clone)]
    pub type Layer;

    #[wasm_bindgen(catch, js_namespace = L, js_name = map)]
    fn new_map(element_id: &str) -> Result<Map, JsValue>;

    #[wasm_bindgen(method, js_name = setView)]
    fn set_view(this: &Map, center: &Array, zoom: u8) -> Map;

    #[wasm_bindgen(method, js_name = removeLayer)]
    fn remove_layer(this: &Map, layer: &Layer) -> Map;

    #[wasm_bindgen(method, js_name = fitBounds)]
    fn fit_bounds(this: &Map, bounds: &Array, options: &JsValue) -> Map;

    #[wasm_bindgen(js_namespace = L, js_name = tileLayer)]
    fn tile_layer(url_template: &str, options: &JsValue) -> Layer;

    #[wasm_bindgen(js_namespace = L, js_name = marker)]
    fn marker(at: &Array) -> Layer;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &Layer, map: &Map) -> Layer;

    #[wasm_bindgen(method, js_name = bindPopup)]
    fn bind_popup(this: &Layer, html: &str) -> Layer;
}

fn lat_lng(p: LatLon) -> Array {
    Array::of2(&JsValue::from_f64(p.lat), &JsValue::from_f64(p.lon))
}

fn options(entries: &[(&str, JsValue)]) -> Result<JsValue, JsValue> {
    let obj = Object::new();
    for (key, value) in entries {
        Reflect::set(&obj, &JsValue::from_str(key), value)?;
    }
    Ok(obj.into())
}

/// Leaflet map with the configured tile layer and initial view.
#[derive(Debug)]
pub struct LeafletMap {
    map: Map,
    fit_options: JsValue,
}

impl LeafletMap {
    pub fn mount(element_id: &str, cfg: &MapConfig) -> Result<Self, JsValue> {
        let map = new_map(element_id)?;
        map.set_view(&lat_lng(cfg.center), cfg.zoom);

        let tile_options = options(&[
            ("attribution", JsValue::from_str(&cfg.attribution)),
            ("maxZoom", JsValue::from(cfg.max_zoom)),
        ])?;
        tile_layer(&cfg.tile_url, &tile_options).add_to(&map);

        let fit_options = options(&[("maxZoom", JsValue::from(cfg.max_zoom))])?;
        Ok(Self { map, fit_options })
    }
}

impl MapSurface for LeafletMap {
    type Handle = Layer;

    fn add_marker(&mut self, at: LatLon, popup: &Markup) -> Layer {
        let layer = marker(&lat_lng(at)).add_to(&self.map);
        layer.bind_popup(popup.html());
        layer
    }

    fn remove_marker(&mut self, handle: Layer) {
        self.map.remove_layer(&handle);
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        let corners = Array::of2(&lat_lng(bounds.south_west), &lat_lng(bounds.north_east));
        self.map.fit_bounds(&corners, &self.fit_options);
    }
}
