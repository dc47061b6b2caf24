//! Fixed-tick playback clock.
//!
//! A virtual ~30 Hz ticker: the host drives `tick` at its own cadence and
//! the clock advances by a fixed step while playing. Scrubbing is a direct
//! time-set, independent of the ticker.

/// Seconds advanced per tick (~30 Hz).
pub const TICK_SECS: f64 = 1.0 / 30.0;

/// The playback state: current time plus a playing flag.
///
/// `current_time` is the one field history never captures — undo/redo must
/// not move the playhead.
#[derive(Debug, Clone, Default)]
pub struct PlaybackClock {
    playing: bool,
    current_time: f64,
}

impl PlaybackClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a clock at a saved position, paused.
    pub fn at_time(current_time: f64) -> Self {
        Self {
            playing: false,
            current_time: current_time.max(0.0),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    /// The furthest position playback may reach: content duration minus a
    /// guard band reserved for the rendered playhead width.
    fn limit(duration: f64, guard: f64) -> f64 {
        (duration - guard).max(0.0)
    }

    /// Advance one tick while playing, clamped to the limit; reaching the
    /// clamp pauses automatically. Returns whether the time changed.
    pub fn tick(&mut self, duration: f64, guard: f64) -> bool {
        if !self.playing {
            return false;
        }
        let limit = Self::limit(duration, guard);
        let next = self.current_time + TICK_SECS;
        if next >= limit {
            let changed = self.current_time != limit;
            self.current_time = limit;
            self.playing = false;
            changed
        } else {
            self.current_time = next;
            true
        }
    }

    /// Toggle play/pause. From a position at or past the clamp this
    /// restarts from zero instead of pausing at the end — the deliberate
    /// "replay from start" affordance.
    pub fn toggle(&mut self, duration: f64, guard: f64) {
        if !self.playing && self.current_time >= Self::limit(duration, guard) {
            self.current_time = 0.0;
            self.playing = true;
        } else {
            self.playing = !self.playing;
        }
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Scrub to a position. Does not require playback to be active.
    pub fn seek(&mut self, time: f64, duration: f64) {
        self.current_time = time.clamp(0.0, duration.max(0.0));
    }
}
