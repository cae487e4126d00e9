use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::LonLat;

/// A bend found by the routing service itself, reported in `additionalInfo`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadBend {
    /// Where the bend starts
    pub coordinates: LonLat,
    pub length: f64,
    pub angle: f64,
    pub radius: f64,
    /// The service's ID for the turn direction
    pub direction: i64,
    pub initial_orientation: f64,
}

impl RoadBend {
    /// Picks the road bends out of `additionalInfo`, skipping anything else.
    pub fn parse_all(additional_info: &[Value]) -> Vec<RoadBend> {
        let mut bends = Vec::new();
        for (idx, value) in additional_info.iter().enumerate() {
            let info = value.get("info").and_then(Value::as_str).unwrap_or("");
            if info != "RoadBend" {
                warn!("Skipping additionalInfo entry {idx} with unknown info {info:?}");
                continue;
            }
            match serde_json::from_value::<RoadBend>(value.clone()) {
                Ok(bend) => bends.push(bend),
                Err(err) => warn!("Skipping malformed road bend {idx}: {err}"),
            }
        }
        bends
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn only_road_bends_are_kept() {
        let info = vec![
            json!({
                "type": "Point",
                "info": "RoadBend",
                "length": 42.5,
                "angle": 0.8,
                "radius": 30.0,
                "direction": 1,
                "initialOrientation": 1.2,
                "coordinates": [13.1, 52.4]
            }),
            json!({"type": "Point", "info": "speedCamera", "coordinates": [13.1, 52.4]}),
            // No radius
            json!({
                "type": "Point",
                "info": "RoadBend",
                "length": 42.5,
                "angle": 0.8,
                "direction": 1,
                "initialOrientation": 1.2,
                "coordinates": [13.1, 52.4]
            }),
        ];
        let bends = RoadBend::parse_all(&info);
        assert_eq!(bends.len(), 1);
        assert_eq!(bends[0].coordinates, LonLat::new(13.1, 52.4));
        assert_eq!(bends[0].radius, 30.0);
        assert_eq!(bends[0].direction, 1);
    }
}
