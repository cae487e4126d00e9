use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use route::LonLat;

/// Milliseconds since the start of a recording or simulation
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn inner_millis(self) -> i64 {
        self.0
    }

    pub fn inner_seconds(self) -> f64 {
        self.0 as f64 / 1000.0
    }

    fn abs_diff(self, other: Timestamp) -> u64 {
        self.0.abs_diff(other.0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.3}s", self.inner_seconds())
    }
}

/// The state of the vehicle at one point in time
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Sample {
    pub timestamp: Timestamp,
    pub position: LonLat,
    /// m/s
    pub speed: f64,
    /// Heading in radians, 0 is north
    pub direction: f64,
}

impl Sample {
    /// How far to rotate the vehicle marker
    pub fn heading_degrees(&self) -> f64 {
        self.direction * 180.0 / std::f64::consts::PI
    }
}

/// A sample as it arrives, before validation. Any part may be missing.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawSample {
    #[serde(default)]
    pub position: Option<RawPosition>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub direction: Option<f64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawPosition {
    pub lon: Option<f64>,
    pub lat: Option<f64>,
}

impl RawSample {
    pub fn new(lon: f64, lat: f64, speed: f64, direction: f64) -> Self {
        Self {
            position: Some(RawPosition {
                lon: Some(lon),
                lat: Some(lat),
            }),
            speed: Some(speed),
            direction: Some(direction),
        }
    }

    /// None if the position is incomplete. Downstream consumers loop forever on a sample without a
    /// coordinate, so these must never make it into a `TimeSeries`.
    fn validate(self, timestamp: Timestamp) -> Option<Sample> {
        let position = self.position?;
        let (lon, lat) = (position.lon?, position.lat?);
        Some(Sample {
            timestamp,
            position: LonLat::new(lon, lat),
            speed: self.speed.unwrap_or(0.0),
            direction: self.direction.unwrap_or(0.0),
        })
    }
}

/// Vehicle states ordered by time, for looking up what happened when. Built once per data set and
/// never modified.
#[derive(Clone, Debug, PartialEq)]
pub struct TimeSeries {
    // These three are parallel, sorted by time, with no duplicate timestamps
    timestamps: Vec<Timestamp>,
    coordinates: Vec<LonLat>,
    samples: Vec<Sample>,
}

impl TimeSeries {
    /// Input may come in any order. Samples without a full position are dropped.
    pub fn new<I: IntoIterator<Item = (Timestamp, RawSample)>>(raw: I) -> Self {
        let mut samples = Vec::new();
        let mut invalid = 0;
        for (timestamp, sample) in raw {
            match sample.validate(timestamp) {
                Some(sample) => samples.push(sample),
                None => {
                    invalid += 1;
                }
            }
        }
        if invalid > 0 {
            warn!("Skipped {invalid} samples without a complete position");
        }

        // Stable, so the first of any duplicates wins
        samples.sort_by_key(|s| s.timestamp);
        let before = samples.len();
        samples.dedup_by_key(|s| s.timestamp);
        if samples.len() != before {
            warn!(
                "Skipped {} samples with a duplicate timestamp",
                before - samples.len()
            );
        }

        Self {
            timestamps: samples.iter().map(|s| s.timestamp).collect(),
            coordinates: samples.iter().map(|s| s.position).collect(),
            samples,
        }
    }

    /// Builds from a JSON object keyed by millisecond timestamps. Entries with a key that isn't a
    /// number, or a value that isn't shaped like a sample, are skipped like any other invalid
    /// sample.
    pub fn from_json(raw: &Map<String, Value>) -> Self {
        let mut input = Vec::new();
        for (key, value) in raw {
            let timestamp = match key.trim().parse::<i64>() {
                Ok(x) => Timestamp(x),
                Err(_) => {
                    warn!("Skipping sample with bad timestamp {key:?}");
                    continue;
                }
            };
            match RawSample::deserialize(value) {
                Ok(sample) => input.push((timestamp, sample)),
                Err(err) => {
                    warn!("Skipping malformed sample at {timestamp}: {err}");
                }
            }
        }
        Self::new(input)
    }

    /// Parses a measurement file, `{"measurements": {<ms>: sample, ...}}`
    pub fn from_measurements_json(raw: &str) -> Result<Self> {
        let mut doc: Map<String, Value> = serde_json::from_str(raw)?;
        match doc.remove("measurements") {
            Some(Value::Object(map)) => Ok(Self::from_json(&map)),
            Some(_) => bail!("measurements isn't an object"),
            None => bail!("No measurements in the file"),
        }
    }

    pub fn load_measurements(path: &str) -> Result<Self> {
        let raw = fs_err::read_to_string(path)?;
        let series = Self::from_measurements_json(&raw)
            .with_context(|| format!("loading measurements from {path}"))?;
        info!("Loaded {} samples from {path}", series.len());
        Ok(series)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn coordinates(&self) -> &[LonLat] {
        &self.coordinates
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn start_time(&self) -> Option<Timestamp> {
        self.timestamps.first().copied()
    }

    pub fn end_time(&self) -> Option<Timestamp> {
        self.timestamps.last().copied()
    }

    /// Only exact matches count.
    pub fn has_time(&self, time: Timestamp) -> bool {
        self.timestamps.binary_search(&time).is_ok()
    }

    /// The index of the first timestamp that isn't before `probe`. Can be `len()`.
    pub fn bisect_left(&self, probe: Timestamp) -> usize {
        self.timestamps.partition_point(|t| *t < probe)
    }

    /// The index of the sample closest in time to `probe`. Starting from the left bisection,
    /// compares that candidate with the one just before it; ties go to the earlier sample. None if
    /// the series is empty.
    pub fn nearest_index_at_or_before(&self, probe: Timestamp) -> Option<usize> {
        if self.timestamps.is_empty() {
            return None;
        }
        let idx = self.bisect_left(probe).min(self.timestamps.len() - 1);
        if idx == 0 {
            return Some(0);
        }
        let before = idx - 1;
        if probe.abs_diff(self.timestamps[before]) <= probe.abs_diff(self.timestamps[idx]) {
            Some(before)
        } else {
            Some(idx)
        }
    }

    /// The sample closest in time to `probe`, for hovering over the trajectory
    pub fn nearest(&self, probe: Timestamp) -> Option<&Sample> {
        let idx = self.nearest_index_at_or_before(probe)?;
        debug!("Nearest sample to {probe} is at {}", self.timestamps[idx]);
        Some(&self.samples[idx])
    }

    /// Fails unless `time` exactly matches a sample.
    pub fn state_at(&self, time: Timestamp) -> Result<&Sample> {
        match self.timestamps.binary_search(&time) {
            Ok(idx) => Ok(&self.samples[idx]),
            Err(_) => bail!("No sample at {time}"),
        }
    }
}
