use std::f64::consts::{FRAC_PI_2, PI, TAU};
use std::iter::FusedIterator;

use serde::Serialize;

use crate::{destination_point, Leg, LonLat, Segment};

/// Only a pair of legs where the shorter one is below this many meters counts as a bend. Longer
/// legs are a straight road that happens to be split up.
pub const BEND_THRESHOLD_METERS: f64 = 50.0;
/// The indicator is drawn this many times longer than the shorter leg.
pub const TIP_LENGTH_FACTOR: f64 = 5.0;
const MAX_STEPS_PER_SEGMENT: usize = 3;

/// Marks a change of direction between two short consecutive legs
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnIndicator {
    /// Where the two legs meet
    pub anchor: LonLat,
    pub tip: LonLat,
    /// The shorter of the two legs, in meters
    pub base_length: f64,
    /// From `anchor` to `tip`, in radians. Perpendicular to the bisector of the two legs. Not
    /// normalized.
    pub bearing: f64,
}

/// Walks the legs of a route in order, pairing each leg with the next one (skipping road signs in
/// between), and yields a `TurnIndicator` for every pair that forms a bend.
///
/// Each leg is the second half of one pair and the first half of the next, so consecutive bends
/// are all found.
pub struct BendDetector<'a> {
    segments: &'a [Segment],
    // Where to look for the first leg of the next pair
    next: usize,
    steps: usize,
    max_steps: usize,
    done: bool,
}

impl<'a> BendDetector<'a> {
    pub fn new(segments: &'a [Segment]) -> Self {
        Self {
            segments,
            next: 0,
            steps: 0,
            max_steps: MAX_STEPS_PER_SEGMENT * segments.len().max(1),
            done: false,
        }
    }

    /// Gives up after this many pairs have been examined, keeping whatever was found before.
    pub fn with_step_limit(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    fn next_leg(&self, from: usize) -> Option<(usize, &'a Leg)> {
        let segments: &'a [Segment] = self.segments;
        segments
            .get(from..)?
            .iter()
            .enumerate()
            .find_map(|(offset, segment)| segment.as_leg().map(|leg| (from + offset, leg)))
    }
}

impl<'a> Iterator for BendDetector<'a> {
    type Item = TurnIndicator;

    fn next(&mut self) -> Option<TurnIndicator> {
        while !self.done {
            self.steps += 1;
            if self.steps > self.max_steps {
                warn!(
                    "Stopped looking for bends after {} steps through {} segments",
                    self.max_steps,
                    self.segments.len()
                );
                self.done = true;
                break;
            }

            let pair = self.next_leg(self.next).and_then(|(idx1, leg1)| {
                self.next_leg(idx1 + 1)
                    .map(|(idx2, leg2)| (idx1, leg1, idx2, leg2))
            });
            let (_, leg1, idx2, leg2) = match pair {
                Some(x) => x,
                None => {
                    // Zero or one legs left
                    self.done = true;
                    break;
                }
            };
            self.next = idx2;

            if let Some(indicator) = turn_indicator(leg1, leg2) {
                return Some(indicator);
            }
        }
        None
    }
}

impl<'a> FusedIterator for BendDetector<'a> {}

/// None if the legs are long enough to not count as a bend.
fn turn_indicator(first: &Leg, second: &Leg) -> Option<TurnIndicator> {
    let base_length = first.length.min(second.length);
    if base_length.is_nan() || base_length >= BEND_THRESHOLD_METERS {
        return None;
    }

    let bearing = perpendicular_bearing(first.orientation, second.orientation);
    let anchor = first.end();
    Some(TurnIndicator {
        anchor,
        tip: destination_point(anchor, base_length * TIP_LENGTH_FACTOR, bearing),
        base_length,
        bearing,
    })
}

/// Bisects the shortest turn from `orientation1` to `orientation2`, then rotates that by 90° in
/// the same sense as the turn.
fn perpendicular_bearing(orientation1: f64, orientation2: f64) -> f64 {
    let mut diff = orientation2 - orientation1;
    if diff > PI {
        diff -= TAU;
    }
    let half_diff = diff / 2.0;
    let bisector = orientation1 + half_diff;
    if half_diff < 0.0 {
        bisector - FRAC_PI_2
    } else {
        bisector + FRAC_PI_2
    }
}
