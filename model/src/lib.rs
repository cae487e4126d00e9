#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod annotate;
mod driving_cycle;
mod playback;
mod timeseries;

use geojson::FeatureCollection;

use route::{RoadBend, RouteResult, TurnIndicator};

pub use self::annotate::AnnotationAssembler;
pub use self::driving_cycle::{DrivingCycle, SpeedPoint};
pub use self::playback::{Listener, MarkerRenderer, PlaybackClock, PlaybackSession, PlaybackState};
pub use self::timeseries::{RawPosition, RawSample, Sample, TimeSeries, Timestamp};

/// Everything shown for one route: the route itself, annotations derived from it, and the vehicle
/// replaying a trajectory along it. Each view owns its own playback session.
pub struct RouteView<R: MarkerRenderer> {
    route: Option<RouteResult>,
    turn_indicators: Vec<TurnIndicator>,
    road_bends: Vec<RoadBend>,
    pub playback: PlaybackSession<R>,
}

impl<R: MarkerRenderer> RouteView<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            route: None,
            turn_indicators: Vec::new(),
            road_bends: Vec::new(),
            playback: PlaybackSession::new(renderer),
        }
    }

    /// Replaces the current route. If it comes with a simulation, playback switches to that;
    /// otherwise any earlier trajectory is cleared.
    pub fn show_route(&mut self, route: RouteResult) {
        self.turn_indicators = route.turn_indicators().collect();
        self.road_bends = route.road_bends();
        info!(
            "Found {} turn indicators; the routing service reported {} road bends",
            self.turn_indicators.len(),
            self.road_bends.len()
        );

        if let Some(ref simulation) = route.simulation {
            self.playback.set_data(TimeSeries::from_json(simulation));
        } else if self.playback.series().is_some() {
            // Don't keep replaying the previous route's vehicle
            self.playback.set_data(TimeSeries::new(Vec::new()));
        }
        self.route = Some(route);
    }

    /// Plays back recorded measurements instead of whatever was playing before
    pub fn show_measurements(&mut self, series: TimeSeries) {
        self.playback.set_data(series);
    }

    pub fn route(&self) -> Option<&RouteResult> {
        self.route.as_ref()
    }

    pub fn turn_indicators(&self) -> &[TurnIndicator] {
        &self.turn_indicators
    }

    pub fn road_bends(&self) -> &[RoadBend] {
        &self.road_bends
    }

    pub fn series(&self) -> Option<&TimeSeries> {
        self.playback.series()
    }

    pub fn annotations(&self) -> FeatureCollection {
        let mut assembler = AnnotationAssembler::new();
        if let Some(ref route) = self.route {
            assembler = assembler
                .route(route)
                .turn_indicators(&self.turn_indicators)
                .road_bends(&self.road_bends);
        }
        if let Some(series) = self.series() {
            assembler = assembler.trajectory(series);
        }
        assembler.build()
    }

    /// None if there's nothing being played back
    pub fn driving_cycle(&self) -> Option<DrivingCycle> {
        self.series()
            .filter(|series| !series.is_empty())
            .map(DrivingCycle::from_series)
    }
}
