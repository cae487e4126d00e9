use route::LonLat;

use crate::{TimeSeries, Timestamp};

/// Whatever draws the moving vehicle. Rotation is part of the contract; implementations must not
/// reach into their rendering library's internals to turn the marker.
pub trait MarkerRenderer {
    /// Creates the marker and playback control, bound to the first data set. Called at most once
    /// per session.
    fn create_marker(&mut self, series: &TimeSeries);
    /// Forgets the previous data set, before `bind` is called with a new one
    fn clear(&mut self);
    fn bind(&mut self, series: &TimeSeries);
    fn move_to(&mut self, pos: LonLat);
    fn set_rotation(&mut self, degrees: f64);
    /// Called on the first tick that shows anything, to unhide controls and such
    fn reveal(&mut self) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// No data yet
    Uninitialized,
    /// Has data, but no tick has hit a sample yet
    Armed,
    /// Once running, there's no way to tell if the playback reached the end.
    Running,
}

pub type Listener = Box<dyn FnMut(Timestamp)>;

/// Replays one trajectory at a time on a marker. An external clock drives it by calling `tick`
/// once per timestamp; the data can be swapped at any point with `set_data`.
pub struct PlaybackSession<R: MarkerRenderer> {
    renderer: R,
    series: Option<TimeSeries>,
    listeners: Vec<Listener>,
    on_first_tick: Option<Box<dyn FnOnce()>>,
    // Has the marker been created?
    rendered: bool,
    running: bool,
}

impl<R: MarkerRenderer> PlaybackSession<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            series: None,
            listeners: Vec::new(),
            on_first_tick: None,
            rendered: false,
            running: false,
        }
    }

    /// Replaces the current data set. The marker is only created the first time; after that it's
    /// cleared and rebound. Listeners stay registered.
    pub fn set_data(&mut self, series: TimeSeries) {
        if self.rendered {
            self.renderer.clear();
            self.renderer.bind(&series);
            info!("Rebound playback to {} samples", series.len());
        } else {
            self.renderer.create_marker(&series);
            self.rendered = true;
            info!("Created playback marker for {} samples", series.len());
        }
        // The old series is dropped here, in one step
        self.series = Some(series);
    }

    /// Listeners are called with every timestamp that matches a sample. Registering the same
    /// listener again means it runs twice per tick, so register once per session, not once per
    /// `set_data`.
    pub fn register_callback<F: FnMut(Timestamp) + 'static>(&mut self, listener: F) {
        self.listeners.push(Box::new(listener));
    }

    /// Runs once, on the first tick that hits a sample.
    pub fn on_first_tick<F: FnOnce() + 'static>(&mut self, callback: F) {
        self.on_first_tick = Some(Box::new(callback));
    }

    /// Moves the marker to the sample at `time` and notifies listeners. Does nothing and returns
    /// false if there's no data or no sample at exactly that time.
    pub fn tick(&mut self, time: Timestamp) -> bool {
        let series = match self.series {
            Some(ref series) => series,
            None => return false,
        };
        let sample = match series.state_at(time) {
            Ok(sample) => sample,
            Err(_) => return false,
        };

        self.renderer.move_to(sample.position);
        self.renderer.set_rotation(sample.heading_degrees());

        if !self.running {
            self.running = true;
            debug!("First playback tick at {time}");
            self.renderer.reveal();
            if let Some(callback) = self.on_first_tick.take() {
                callback();
            }
        }

        for listener in &mut self.listeners {
            listener(time);
        }
        true
    }

    pub fn state(&self) -> PlaybackState {
        if self.series.is_none() {
            PlaybackState::Uninitialized
        } else if self.running {
            PlaybackState::Running
        } else {
            PlaybackState::Armed
        }
    }

    pub fn series(&self) -> Option<&TimeSeries> {
        self.series.as_ref()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

/// Steps through a series' time range in fixed increments, yielding each tick's timestamp once.
/// Most ticks won't land on a sample; the session skips those.
#[derive(Clone, Debug)]
pub struct PlaybackClock {
    next: Timestamp,
    end: Timestamp,
    tick_len_ms: i64,
}

impl PlaybackClock {
    /// None for an empty series
    pub fn new(series: &TimeSeries, tick_len_ms: i64) -> Option<Self> {
        Some(Self {
            next: series.start_time()?,
            end: series.end_time()?,
            tick_len_ms: tick_len_ms.max(1),
        })
    }

    pub fn tick_len_ms(&self) -> i64 {
        self.tick_len_ms
    }
}

impl Iterator for PlaybackClock {
    type Item = Timestamp;

    fn next(&mut self) -> Option<Timestamp> {
        if self.next > self.end {
            return None;
        }
        let time = self.next;
        self.next = Timestamp(time.0.saturating_add(self.tick_len_ms));
        // Saturating at the very end of time would repeat the last tick
        if self.next == time {
            self.end = Timestamp(i64::MIN);
        }
        Some(time)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::RawSample;

    #[derive(Default)]
    struct Recorder {
        created: usize,
        cleared: usize,
        bound: Vec<usize>,
        positions: Vec<LonLat>,
        rotations: Vec<f64>,
        revealed: usize,
    }

    impl MarkerRenderer for Recorder {
        fn create_marker(&mut self, series: &TimeSeries) {
            self.created += 1;
            self.bound.push(series.len());
        }
        fn clear(&mut self) {
            self.cleared += 1;
        }
        fn bind(&mut self, series: &TimeSeries) {
            self.bound.push(series.len());
        }
        fn move_to(&mut self, pos: LonLat) {
            self.positions.push(pos);
        }
        fn set_rotation(&mut self, degrees: f64) {
            self.rotations.push(degrees);
        }
        fn reveal(&mut self) {
            self.revealed += 1;
        }
    }

    fn series(samples: &[(i64, f64)]) -> TimeSeries {
        TimeSeries::new(samples.iter().map(|(t, direction)| {
            (
                Timestamp(*t),
                RawSample::new(*t as f64 / 1000.0, 0.0, 1.0, *direction),
            )
        }))
    }

    fn counting_listener(session: &mut PlaybackSession<Recorder>) -> Rc<RefCell<Vec<Timestamp>>> {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let calls2 = calls.clone();
        session.register_callback(move |t| calls2.borrow_mut().push(t));
        calls
    }

    #[test]
    fn marker_is_created_once() {
        let mut session = PlaybackSession::new(Recorder::default());
        assert_eq!(session.state(), PlaybackState::Uninitialized);
        let calls = counting_listener(&mut session);

        session.set_data(series(&[(0, 0.0), (100, 0.0)]));
        assert_eq!(session.state(), PlaybackState::Armed);
        session.set_data(series(&[(0, 0.0), (100, 0.0), (200, 0.0)]));

        let renderer = session.renderer();
        assert_eq!(renderer.created, 1);
        assert_eq!(renderer.cleared, 1);
        assert_eq!(renderer.bound, vec![2, 3]);
        assert_eq!(session.series().unwrap().len(), 3);
        assert_eq!(session.listener_count(), 1);

        // One call per tick, even after swapping data
        assert!(session.tick(Timestamp(100)));
        assert!(session.tick(Timestamp(200)));
        assert_eq!(*calls.borrow(), vec![Timestamp(100), Timestamp(200)]);
    }

    #[test]
    fn ticks_without_a_sample_are_skipped() {
        let mut session = PlaybackSession::new(Recorder::default());
        let calls = counting_listener(&mut session);

        // No data yet
        assert!(!session.tick(Timestamp(0)));

        session.set_data(series(&[(0, 0.0), (100, 0.0)]));
        assert!(!session.tick(Timestamp(50)));
        assert!(calls.borrow().is_empty());
        assert!(session.renderer().positions.is_empty());
        assert_eq!(session.state(), PlaybackState::Armed);
        assert_eq!(session.renderer().revealed, 0);
    }

    #[test]
    fn first_tick_reveals_once() {
        let mut session = PlaybackSession::new(Recorder::default());
        let revealed = Rc::new(RefCell::new(0));
        let revealed2 = revealed.clone();
        session.on_first_tick(move || *revealed2.borrow_mut() += 1);

        session.set_data(series(&[(0, 0.0), (100, 0.0)]));
        assert!(session.tick(Timestamp(0)));
        assert!(session.tick(Timestamp(100)));
        assert_eq!(session.state(), PlaybackState::Running);
        assert_eq!(*revealed.borrow(), 1);
        assert_eq!(session.renderer().revealed, 1);

        // Still running after a swap; the control already exists
        session.set_data(series(&[(0, 0.0)]));
        assert_eq!(session.state(), PlaybackState::Running);
        assert!(session.tick(Timestamp(0)));
        assert_eq!(*revealed.borrow(), 1);
    }

    #[test]
    fn marker_follows_the_samples() {
        let mut session = PlaybackSession::new(Recorder::default());
        session.set_data(series(&[(0, 0.0), (1000, std::f64::consts::PI)]));
        session.tick(Timestamp(0));
        session.tick(Timestamp(1000));

        let renderer = session.renderer();
        assert_eq!(
            renderer.positions,
            vec![LonLat::new(0.0, 0.0), LonLat::new(1.0, 0.0)]
        );
        assert_eq!(renderer.rotations.len(), 2);
        assert!((renderer.rotations[1] - 180.0).abs() < 1e-9);
    }

    #[test]
    fn clock_covers_the_range_once() {
        let ts = series(&[(100, 0.0), (350, 0.0), (600, 0.0)]);
        let ticks: Vec<Timestamp> = PlaybackClock::new(&ts, 250).unwrap().collect();
        assert_eq!(ticks, vec![Timestamp(100), Timestamp(350), Timestamp(600)]);

        let ticks: Vec<Timestamp> = PlaybackClock::new(&ts, 200).unwrap().collect();
        assert_eq!(
            ticks,
            vec![Timestamp(100), Timestamp(300), Timestamp(500)]
        );

        assert!(PlaybackClock::new(&series(&[]), 250).is_none());
        assert_eq!(PlaybackClock::new(&ts, 0).unwrap().tick_len_ms(), 1);
    }

    #[test]
    fn clock_drives_session() {
        let ts = series(&[(0, 0.0), (250, 0.0), (300, 0.0), (750, 0.0)]);
        let clock = PlaybackClock::new(&ts, 250).unwrap();
        let mut session = PlaybackSession::new(Recorder::default());
        let calls = counting_listener(&mut session);
        session.set_data(ts);

        let hits = clock.filter(|t| session.tick(*t)).count();
        assert_eq!(hits, 3);
        assert_eq!(
            *calls.borrow(),
            vec![Timestamp(0), Timestamp(250), Timestamp(750)]
        );
    }
}
