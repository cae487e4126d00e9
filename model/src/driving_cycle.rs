use anyhow::Result;
use serde::Serialize;

use crate::TimeSeries;

/// Speed over time, for plotting next to the map
pub struct DrivingCycle {
    // Sorted by time
    points: Vec<SpeedPoint>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SpeedPoint {
    #[serde(rename = "time_s")]
    pub seconds: f64,
    #[serde(rename = "speed_mps")]
    pub speed: f64,
}

impl DrivingCycle {
    /// Only samples with a complete position are in the series, so speeds recorded without one
    /// are left out of the cycle too.
    pub fn from_series(series: &TimeSeries) -> Self {
        Self {
            points: series
                .samples()
                .iter()
                .map(|s| SpeedPoint {
                    seconds: s.timestamp.inner_seconds(),
                    speed: s.speed,
                })
                .collect(),
        }
    }

    pub fn points(&self) -> &[SpeedPoint] {
        &self.points
    }

    /// 0 if there are no points
    pub fn max_speed(&self) -> f64 {
        self.points.iter().map(|pt| pt.speed).fold(0.0, f64::max)
    }

    pub fn duration_seconds(&self) -> f64 {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => last.seconds - first.seconds,
            _ => 0.0,
        }
    }

    pub fn write_csv<W: std::io::Write>(&self, writer: W) -> Result<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for pt in &self.points {
            writer.serialize(pt)?;
        }
        writer.flush()?;
        Ok(())
    }
}
