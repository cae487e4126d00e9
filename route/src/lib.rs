#[macro_use]
extern crate log;

mod bends;
mod describe;
mod lonlat;
mod road_bend;
mod segment;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

pub use self::bends::{BendDetector, TurnIndicator, BEND_THRESHOLD_METERS, TIP_LENGTH_FACTOR};
pub use self::describe::{describe_leg, Icon};
pub use self::lonlat::{destination_point, normalize_bearing, to_normalized_degrees, LonLat};
pub use self::road_bend::RoadBend;
pub use self::segment::{Leg, Segment, Sign, SignInfo};

/// What the routing service returns for one requested route. Only the parts we draw are kept.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    #[serde(default)]
    pub route_id: Option<String>,
    /// Legs and signs, in driving order
    #[serde(default)]
    pub points: Vec<Segment>,
    #[serde(default)]
    pub additional_info: Vec<Value>,
    /// Simulated vehicle states, keyed by milliseconds since the start. Entries are left raw;
    /// invalid ones are filtered out when building a time series.
    #[serde(default)]
    pub simulation: Option<Map<String, Value>>,
}

impl RouteResult {
    pub fn from_json(raw: &str) -> Result<Self> {
        let route: RouteResult = serde_json::from_str(raw)?;
        info!(
            "Route {} has {} legs over {:.0} m and {} signs",
            route.route_id.as_deref().unwrap_or("(unnamed)"),
            route.legs().count(),
            route.total_length(),
            route.signs().count()
        );
        Ok(route)
    }

    pub fn load(path: &str) -> Result<Self> {
        let raw = fs_err::read_to_string(path)?;
        Self::from_json(&raw).with_context(|| format!("parsing route from {path}"))
    }

    pub fn legs(&self) -> impl Iterator<Item = &Leg> {
        self.points.iter().filter_map(Segment::as_leg)
    }

    pub fn signs(&self) -> impl Iterator<Item = &Sign> {
        self.points.iter().filter_map(Segment::as_sign)
    }

    pub fn turn_indicators(&self) -> BendDetector<'_> {
        BendDetector::new(&self.points)
    }

    pub fn road_bends(&self) -> Vec<RoadBend> {
        RoadBend::parse_all(&self.additional_info)
    }

    /// Meters
    pub fn total_length(&self) -> f64 {
        self.legs().map(|leg| leg.length).sum()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn parse_response() {
        let route = RouteResult::from_json(
            r#"{
                "routeId": "abc",
                "paths": [{"distance": 30.0}],
                "points": [
                    {"type": "LineString", "coordinates": [[0, 0], [0, 0.0001]],
                     "orientation": 0, "length": 11.05},
                    {"type": "Point", "info": "stopSign", "id": 3, "coordinates": [0, 0.0001]},
                    {"type": "LineString", "coordinates": [[0, 0.0001], [0.0001, 0.0001]],
                     "orientation": 1.5707963267948966, "length": 11.13}
                ],
                "additionalInfo": []
            }"#,
        )
        .unwrap();
        assert_eq!(route.route_id.as_deref(), Some("abc"));
        assert_eq!(route.legs().count(), 2);
        assert_eq!(route.signs().count(), 1);
        assert!(route.simulation.is_none());
        assert_abs_diff_eq!(route.total_length(), 22.18, epsilon = 1e-9);
        assert_eq!(route.turn_indicators().count(), 1);
    }

    #[test]
    fn unknown_segment_type() {
        assert!(RouteResult::from_json(
            r#"{"points": [{"type": "Polygon", "coordinates": []}]}"#
        )
        .is_err());
    }
}
