use geojson::{Feature, FeatureCollection, Geometry, Value};

use route::{
    describe_leg, to_normalized_degrees, Icon, Leg, RoadBend, RouteResult, Segment, Sign,
    TurnIndicator,
};

use crate::TimeSeries;

const LINE_WEIGHT: usize = 5;
const LINE_OPACITY: f64 = 0.9;

/// Collects everything drawn for one route into map-ready GeoJSON features. Every feature has a
/// `type` property saying what it is.
#[derive(Default)]
pub struct AnnotationAssembler {
    features: Vec<Feature>,
}

impl AnnotationAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The legs as colored lines with popups, and signs as icons
    pub fn route(mut self, route: &RouteResult) -> Self {
        let mut leg_idx = 0;
        for segment in &route.points {
            match segment {
                Segment::Line(leg) => {
                    self.features.push(leg_feature(leg_idx, leg));
                    leg_idx += 1;
                }
                Segment::Point(sign) => {
                    self.features.push(sign_feature(sign));
                }
            }
        }
        self
    }

    pub fn turn_indicators(mut self, indicators: &[TurnIndicator]) -> Self {
        for indicator in indicators {
            if !indicator.tip.is_finite() {
                warn!(
                    "Skipping turn indicator at {}, it projects to {}",
                    indicator.anchor, indicator.tip
                );
                continue;
            }
            self.features.push(indicator_feature(indicator));
        }
        self
    }

    pub fn road_bends(mut self, bends: &[RoadBend]) -> Self {
        for bend in bends {
            self.features.push(road_bend_feature(bend));
        }
        self
    }

    /// The trajectory as one MultiPoint, with the timestamps lined up with the coordinates
    pub fn trajectory(mut self, series: &TimeSeries) -> Self {
        if !series.is_empty() {
            self.features.push(trajectory_feature(series));
        }
        self
    }

    pub fn build(self) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features: self.features,
            foreign_members: None,
        }
    }
}

fn new_feature(value: Value) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: None,
        properties: None,
        foreign_members: None,
    }
}

fn leg_feature(idx: usize, leg: &Leg) -> Feature {
    let mut feature = new_feature(Value::LineString(vec![
        leg.start().to_geojson_position(),
        leg.end().to_geojson_position(),
    ]));
    feature.set_property("type", "leg");
    feature.set_property("index", idx);
    feature.set_property("length", leg.length);
    feature.set_property("orientation", leg.orientation);
    feature.set_property("popup", describe_leg(idx, leg));
    // Legs are short, so color them differently to tell neighbors apart
    let color = colorous::CATEGORY10[idx % colorous::CATEGORY10.len()];
    feature.set_property("color", format!("#{:x}", color));
    feature.set_property("weight", LINE_WEIGHT);
    feature.set_property("opacity", LINE_OPACITY);
    feature
}

fn sign_feature(sign: &Sign) -> Feature {
    let mut feature = new_feature(Value::Point(sign.coordinates.to_geojson_position()));
    feature.set_property("type", "sign");
    feature.set_property("icon", Icon::for_sign(sign).name());
    if let Some(id) = sign.id {
        feature.set_property("id", id);
    }
    feature
}

fn indicator_feature(indicator: &TurnIndicator) -> Feature {
    let mut feature = new_feature(Value::LineString(vec![
        indicator.anchor.to_geojson_position(),
        indicator.tip.to_geojson_position(),
    ]));
    feature.set_property("type", "turn_indicator");
    feature.set_property("base_length", indicator.base_length);
    feature.set_property("bearing", indicator.bearing);
    feature.set_property("bearing_degrees", to_normalized_degrees(indicator.bearing));
    feature
}

fn road_bend_feature(bend: &RoadBend) -> Feature {
    let mut feature = new_feature(Value::Point(bend.coordinates.to_geojson_position()));
    feature.set_property("type", "road_bend");
    feature.set_property("length", bend.length);
    feature.set_property("angle", bend.angle);
    feature.set_property("radius", bend.radius);
    feature.set_property("direction", bend.direction);
    feature.set_property("initial_orientation", bend.initial_orientation);
    feature
}

fn trajectory_feature(series: &TimeSeries) -> Feature {
    let mut feature = new_feature(Value::MultiPoint(
        series
            .coordinates()
            .iter()
            .map(|pt| pt.to_geojson_position())
            .collect(),
    ));
    feature.set_property("type", "trajectory");
    feature.set_property(
        "time",
        series
            .timestamps()
            .iter()
            .map(|t| t.inner_millis())
            .collect::<Vec<_>>(),
    );
    feature
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{RawSample, Timestamp};
    use route::LonLat;

    fn types(fc: &FeatureCollection) -> Vec<String> {
        fc.features
            .iter()
            .map(|f| f.property("type").unwrap().as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn route_features() {
        let route: RouteResult = serde_json::from_value(json!({
            "points": [
                {"type": "LineString", "coordinates": [[0, 0], [0, 0.0001]],
                 "orientation": 0, "length": 11.0, "speedLimit": 8.3333},
                {"type": "Point", "info": "trafficLight", "coordinates": [0, 0.0001]},
                {"type": "LineString", "coordinates": [[0, 0.0001], [0.0001, 0.0001]],
                 "orientation": 1.5707963267948966, "length": 11.0}
            ]
        }))
        .unwrap();
        let indicators: Vec<TurnIndicator> = route.turn_indicators().collect();
        let fc = AnnotationAssembler::new()
            .route(&route)
            .turn_indicators(&indicators)
            .build();
        assert_eq!(types(&fc), vec!["leg", "sign", "leg", "turn_indicator"]);

        let second_leg = &fc.features[2];
        assert_eq!(second_leg.property("index"), Some(&json!(1)));
        assert_ne!(
            fc.features[0].property("color"),
            second_leg.property("color")
        );
        assert_eq!(
            fc.features[0].property("popup"),
            Some(&json!("0 - length: 11 m - 0.0° - speed limit: 30 km/h"))
        );
        assert_eq!(
            fc.features[1].property("icon"),
            Some(&json!("traffic_light"))
        );
        assert_eq!(fc.features[3].property("base_length"), Some(&json!(11.0)));
    }

    #[test]
    fn non_finite_indicators_are_skipped() {
        let indicator = TurnIndicator {
            anchor: LonLat::new(0.0, 90.0),
            tip: LonLat::new(f64::NAN, 90.0),
            base_length: 10.0,
            bearing: 0.0,
        };
        let fc = AnnotationAssembler::new()
            .turn_indicators(&[indicator])
            .build();
        assert!(fc.features.is_empty());
    }

    #[test]
    fn trajectory_feature_lines_up() {
        let series = TimeSeries::new(vec![
            (Timestamp(200), RawSample::new(2.0, 20.0, 0.0, 0.0)),
            (Timestamp(100), RawSample::new(1.0, 10.0, 0.0, 0.0)),
        ]);
        let fc = AnnotationAssembler::new().trajectory(&series).build();
        assert_eq!(types(&fc), vec!["trajectory"]);
        let feature = &fc.features[0];
        assert_eq!(feature.property("time"), Some(&json!([100, 200])));
        assert_eq!(
            feature.geometry.as_ref().unwrap().value,
            Value::MultiPoint(vec![vec![1.0, 10.0], vec![2.0, 20.0]])
        );

        let empty = AnnotationAssembler::new()
            .trajectory(&TimeSeries::new(Vec::new()))
            .build();
        assert!(empty.features.is_empty());
    }
}
