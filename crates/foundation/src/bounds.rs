use serde::{Deserialize, Serialize};

/// WGS84 position in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        LatLon { lat, lon }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

/// Lat/lon aligned bounding box (south-west / north-east corners).
///
/// No antimeridian handling: a box spanning the dateline grows to cover the
/// whole longitude range in between, which is what a tile map expects from
/// `fitBounds`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south_west: LatLon,
    pub north_east: LatLon,
}

impl GeoBounds {
    pub fn new(south_west: LatLon, north_east: LatLon) -> Self {
        GeoBounds {
            south_west,
            north_east,
        }
    }

    /// Degenerate box around a single point.
    pub fn point(p: LatLon) -> Self {
        GeoBounds::new(p, p)
    }

    pub fn extend(&mut self, p: LatLon) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lon = self.south_west.lon.min(p.lon);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lon = self.north_east.lon.max(p.lon);
    }

    /// Smallest box covering every point; `None` for an empty input.
    pub fn covering<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = LatLon>,
    {
        let mut iter = points.into_iter();
        let mut bounds = GeoBounds::point(iter.next()?);
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    pub fn contains(&self, p: LatLon) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lon >= self.south_west.lon
            && p.lon <= self.north_east.lon
    }

    pub fn center(&self) -> LatLon {
        LatLon::new(
            (self.south_west.lat + self.north_east.lat) * 0.5,
            (self.south_west.lon + self.north_east.lon) * 0.5,
        )
    }

    pub fn is_point(&self) -> bool {
        self.south_west == self.north_east
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoBounds, LatLon};

    #[test]
    fn covering_empty_is_none() {
        assert!(GeoBounds::covering(Vec::<LatLon>::new()).is_none());
    }

    #[test]
    fn covering_single_point_is_degenerate() {
        let p = LatLon::new(-6.87, 107.57);
        let b = GeoBounds::covering([p]).unwrap();
        assert!(b.is_point());
        assert_eq!(b.center(), p);
    }

    #[test]
    fn covering_spans_all_points() {
        let pts = [
            LatLon::new(-6.9, 107.5),
            LatLon::new(-6.8, 107.7),
            LatLon::new(-7.0, 107.6),
        ];
        let b = GeoBounds::covering(pts).unwrap();
        assert_eq!(b.south_west, LatLon::new(-7.0, 107.5));
        assert_eq!(b.north_east, LatLon::new(-6.8, 107.7));
        for p in pts {
            assert!(b.contains(p));
        }
        assert!(!b.contains(LatLon::new(0.0, 0.0)));
    }
}
