use serde::{Deserialize, Serialize};

use crate::LonLat;

/// One entry of a route's `points`, in the order the routing service produced them. Road signs
/// are placed right after the leg that leads up to them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Segment {
    #[serde(rename = "LineString")]
    Line(Leg),
    Point(Sign),
}

impl Segment {
    pub fn as_leg(&self) -> Option<&Leg> {
        match self {
            Segment::Line(leg) => Some(leg),
            Segment::Point(_) => None,
        }
    }

    pub fn as_sign(&self) -> Option<&Sign> {
        match self {
            Segment::Line(_) => None,
            Segment::Point(sign) => Some(sign),
        }
    }
}

/// A short straight piece of road
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub coordinates: [LonLat; 2],
    /// Direction of travel in radians
    pub orientation: f64,
    /// Meters
    pub length: f64,
    #[serde(default)]
    pub grade: f64,
    /// Empty when the road has no name
    #[serde(default)]
    pub road: String,
    /// m/s
    #[serde(default)]
    pub speed_limit: Option<f64>,
}

impl Leg {
    pub fn start(&self) -> LonLat {
        self.coordinates[0]
    }

    pub fn end(&self) -> LonLat {
        self.coordinates[1]
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sign {
    pub coordinates: LonLat,
    #[serde(default)]
    pub info: SignInfo,
    #[serde(default)]
    pub id: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SignInfo {
    TrafficLight,
    StopSign,
    /// Any other node along the route. Empty if the service didn't say anything.
    #[default]
    TowerNode,
    Other(String),
}

impl From<String> for SignInfo {
    fn from(x: String) -> Self {
        match x.as_str() {
            "trafficLight" => SignInfo::TrafficLight,
            "stopSign" => SignInfo::StopSign,
            "" | "towerNode" => SignInfo::TowerNode,
            _ => SignInfo::Other(x),
        }
    }
}

impl From<SignInfo> for String {
    fn from(x: SignInfo) -> Self {
        match x {
            SignInfo::TrafficLight => "trafficLight".to_string(),
            SignInfo::StopSign => "stopSign".to_string(),
            SignInfo::TowerNode => "towerNode".to_string(),
            SignInfo::Other(x) => x,
        }
    }
}
