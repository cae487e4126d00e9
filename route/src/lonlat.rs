use std::f64::consts::TAU;
use std::fmt;

use serde::{Deserialize, Serialize};

// Rough meters per degree, good enough at the mid-latitudes we route through
const METERS_PER_DEGREE_LON_AT_EQUATOR: f64 = 111320.0;
const METERS_PER_DEGREE_LAT: f64 = 110540.0;

/// A WGS84 position. Serialized like GeoJSON, as `[lon, lat]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct LonLat {
    pub lon: f64,
    pub lat: f64,
}

impl LonLat {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    pub fn is_finite(&self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    pub fn to_geojson_position(self) -> Vec<f64> {
        vec![self.lon, self.lat]
    }
}

impl fmt::Display for LonLat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}

// GeoJSON positions may carry a third element for elevation; ignore it.
impl TryFrom<Vec<f64>> for LonLat {
    type Error = String;

    fn try_from(raw: Vec<f64>) -> Result<Self, Self::Error> {
        if raw.len() < 2 {
            return Err(format!("position needs lon and lat, got {:?}", raw));
        }
        Ok(Self::new(raw[0], raw[1]))
    }
}

impl From<LonLat> for [f64; 2] {
    fn from(pt: LonLat) -> Self {
        [pt.lon, pt.lat]
    }
}

/// Reduces a bearing in radians to `[0, 2π)`.
pub fn normalize_bearing(bearing: f64) -> f64 {
    let result = bearing % TAU;
    let result = if result < 0.0 { result + TAU } else { result };
    // Adding 2π to a tiny negative remainder can round up to exactly 2π
    if result >= TAU {
        0.0
    } else {
        result
    }
}

/// A bearing in radians as compass degrees in `[0, 360)`.
pub fn to_normalized_degrees(bearing: f64) -> f64 {
    normalize_bearing(bearing).to_degrees()
}

/// Projects `origin` by `distance` meters along `bearing` (radians, 0 is north, clockwise).
///
/// This is a flat approximation, not a geodesic. It's fine for the short offsets used to draw
/// annotations along roads, but the longitude term divides by `cos(lat)`, so near the poles the
/// result blows up or turns into NaN. Callers that care must check `LonLat::is_finite`.
pub fn destination_point(origin: LonLat, distance: f64, bearing: f64) -> LonLat {
    let dx = distance * bearing.sin();
    let dy = distance * bearing.cos();
    let delta_lon = dx / (METERS_PER_DEGREE_LON_AT_EQUATOR * origin.lat.to_radians().cos());
    let delta_lat = dy / METERS_PER_DEGREE_LAT;
    LonLat::new(origin.lon + delta_lon, origin.lat + delta_lat)
}
