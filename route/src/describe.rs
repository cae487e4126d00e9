use crate::{to_normalized_degrees, Leg, Sign, SignInfo};

/// Popup text for the `idx`th leg of a route (counting legs only, not signs).
pub fn describe_leg(idx: usize, leg: &Leg) -> String {
    let speed_limit = match leg.speed_limit {
        Some(mps) => format!("{:.0} km/h", mps * 3.6),
        None => "unknown".to_string(),
    };
    let mut txt = format!(
        "{} - length: {:.0} m - {:.1}° - speed limit: {}",
        idx,
        leg.length,
        to_normalized_degrees(leg.orientation),
        speed_limit
    );
    if !leg.road.is_empty() {
        txt.push_str(&format!(" - {}", leg.road));
    }
    txt
}

/// How to draw a sign along the route
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Icon {
    TrafficLight,
    StopSign,
    TowerNode,
}

impl Icon {
    pub fn for_sign(sign: &Sign) -> Self {
        match sign.info {
            SignInfo::TrafficLight => Icon::TrafficLight,
            SignInfo::StopSign => Icon::StopSign,
            SignInfo::TowerNode | SignInfo::Other(_) => Icon::TowerNode,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Icon::TrafficLight => "traffic_light",
            Icon::StopSign => "stop_sign",
            Icon::TowerNode => "tower_node",
        }
    }
}
