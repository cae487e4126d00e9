use std::cell::Cell;
use std::rc::Rc;

use anyhow::Result;

use model::{MarkerRenderer, PlaybackClock, PlaybackSession, TimeSeries};
use route::LonLat;

use crate::speed::SpeedSetting;

/// Stands in for a map: logs where the vehicle marker goes and remembers the track.
#[derive(Default)]
pub struct LogRenderer {
    visible: bool,
    pos: Option<LonLat>,
    // Position and heading in degrees
    track: Vec<(LonLat, f64)>,
}

impl LogRenderer {
    pub fn track(&self) -> &[(LonLat, f64)] {
        &self.track
    }
}

impl MarkerRenderer for LogRenderer {
    fn create_marker(&mut self, series: &TimeSeries) {
        info!("Creating vehicle marker for {} samples", series.len());
    }

    fn clear(&mut self) {
        self.pos = None;
        self.track.clear();
    }

    fn bind(&mut self, series: &TimeSeries) {
        match (series.start_time(), series.end_time()) {
            (Some(start), Some(end)) => info!("Marker now follows {start} to {end}"),
            _ => warn!("Marker bound to an empty trajectory"),
        }
    }

    fn move_to(&mut self, pos: LonLat) {
        self.pos = Some(pos);
    }

    fn set_rotation(&mut self, degrees: f64) {
        if let Some(pos) = self.pos {
            debug!("Vehicle at {pos}, heading {degrees:.1}°");
            self.track.push((pos, degrees));
        }
    }

    fn reveal(&mut self) {
        if !self.visible {
            self.visible = true;
            info!("Showing playback controls");
        }
    }
}

/// Steps through the whole current series. With `realtime`, waits between ticks according to the
/// speed setting; otherwise runs as fast as possible.
pub fn run(
    session: &mut PlaybackSession<LogRenderer>,
    tick_len_ms: i64,
    speed: SpeedSetting,
    realtime: bool,
) -> Result<()> {
    let clock = match session.series().and_then(|s| PlaybackClock::new(s, tick_len_ms)) {
        Some(clock) => clock,
        None => bail!("Nothing to replay"),
    };

    let hits = Rc::new(Cell::new(0));
    let hits2 = hits.clone();
    session.register_callback(move |_| hits2.set(hits2.get() + 1));

    let delay = speed.real_delay(clock.tick_len_ms());
    let mut ticks = 0;
    for time in clock {
        ticks += 1;
        session.tick(time);
        if realtime {
            std::thread::sleep(delay);
        }
    }

    info!(
        "Replayed {} ticks, {} of them landed on a sample. The marker moved {} times.",
        ticks,
        hits.get(),
        session.renderer().track().len()
    );
    Ok(())
}
