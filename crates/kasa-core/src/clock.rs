//! Wall-clock-driven beat counter.
//!
//! [`BeatClock`] turns irregular host frame times into a continuous musical
//! beat position. It is advanced once per tick with a wall-clock timestamp,
//! so variable frame rates never drift the tempo: the clock accumulates real
//! elapsed milliseconds and overflows them into whole beats.
//!
//! Tempo changes are deferred to the next beat boundary. Committing a new
//! interval mid-beat would visibly jump the phase of everything driven by
//! the fractional beat, so `set_bpm` only stages the change and `advance`
//! commits it the next time a boundary is crossed.

/// Default tempo for a freshly created clock.
pub const DEFAULT_BPM: f64 = 120.0;

/// Taps older than this are considered a new tapping gesture.
const TAP_TIMEOUT_MS: f64 = 2000.0;

/// Sliding window of taps used for the tempo estimate.
const MAX_TAPS: usize = 4;

/// Beat clock with deferred tempo changes and tap-tempo estimation.
#[derive(Debug, Clone)]
pub struct BeatClock {
    bpm: f64,
    pending_bpm: Option<f64>,
    interval_ms: f64,
    beat_count: u64,
    phase_ms: f64,
    running: bool,
    last_ms: Option<f64>,
    boundary: bool,
    taps: Vec<f64>,
}

impl Default for BeatClock {
    fn default() -> Self {
        Self::new()
    }
}

impl BeatClock {
    /// Create a stopped clock at the default tempo.
    pub fn new() -> Self {
        Self::with_bpm(DEFAULT_BPM)
    }

    /// Create a stopped clock at the given tempo.
    ///
    /// Non-positive values fall back to the default tempo. This is the only
    /// place a tempo takes effect immediately; once the clock exists, tempo
    /// changes go through [`BeatClock::set_bpm`] and wait for a beat boundary.
    pub fn with_bpm(bpm: f64) -> Self {
        let bpm = if bpm > 0.0 { bpm } else { DEFAULT_BPM };
        Self {
            bpm,
            pending_bpm: None,
            interval_ms: 60_000.0 / bpm,
            beat_count: 0,
            phase_ms: 0.0,
            running: false,
            last_ms: None,
            boundary: false,
            taps: Vec::new(),
        }
    }

    /// Start the clock from beat zero.
    ///
    /// Idempotent while already running: a second `start` keeps the current
    /// position instead of resetting it.
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        self.beat_count = 0;
        self.phase_ms = 0.0;
        self.last_ms = None;
        self.boundary = false;
    }

    /// Stop the clock. `advance` becomes a no-op until the next `start`.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Whether the clock is running.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance the clock to `now_ms` (milliseconds from any fixed origin).
    ///
    /// Call once per host tick. The first call after `start` only captures
    /// the wall-clock baseline. Each whole-beat overflow commits a pending
    /// tempo change exactly at the boundary, so all consumers observe the
    /// old rate up to the boundary and the new rate after it.
    pub fn advance(&mut self, now_ms: f64) {
        if !self.running {
            return;
        }
        self.boundary = false;

        let last = self.last_ms.replace(now_ms);
        let Some(last) = last else {
            return;
        };

        // A host clock hiccup must never rewind the beat.
        let delta = (now_ms - last).max(0.0);
        self.phase_ms += delta;

        while self.phase_ms >= self.interval_ms {
            self.phase_ms -= self.interval_ms;
            self.beat_count += 1;
            self.boundary = true;
            if let Some(bpm) = self.pending_bpm.take() {
                self.bpm = bpm;
                self.interval_ms = 60_000.0 / bpm;
            }
        }
    }

    /// Continuous beat position: whole beats plus fractional progress.
    ///
    /// Monotonically non-decreasing while the clock runs.
    pub fn beat(&self) -> f64 {
        self.beat_count as f64 + self.phase_ms / self.interval_ms
    }

    /// Whole beats elapsed since `start`.
    pub fn beat_count(&self) -> u64 {
        self.beat_count
    }

    /// Whether the most recent `advance` crossed a beat boundary.
    ///
    /// One-tick flag: cleared at the start of the next `advance`.
    pub fn is_beat_boundary(&self) -> bool {
        self.boundary
    }

    /// Current tempo in beats per minute.
    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// The tempo the clock is heading toward: the staged value if a change
    /// is pending, otherwise the current one.
    pub fn target_bpm(&self) -> f64 {
        self.pending_bpm.unwrap_or(self.bpm)
    }

    /// Stage a tempo change for the next beat boundary.
    ///
    /// Non-positive values are rejected without touching any state. Setting
    /// the current tempo again is a no-op and also discards any pending
    /// change.
    pub fn set_bpm(&mut self, bpm: f64) {
        if bpm <= 0.0 {
            log::warn!("Rejecting invalid BPM {}", bpm);
            return;
        }
        if (bpm - self.bpm).abs() < f64::EPSILON {
            self.pending_bpm = None;
            return;
        }
        self.pending_bpm = Some(bpm);
    }

    /// Register a tempo tap at `now_ms`.
    ///
    /// Keeps a sliding window of the last four taps. A gap longer than two
    /// seconds starts a fresh gesture so stale taps never skew the estimate.
    /// Once two or more taps are buffered, the mean inter-tap interval is
    /// converted to BPM and staged via [`BeatClock::set_bpm`].
    pub fn tap_tempo(&mut self, now_ms: f64) {
        if let Some(&last) = self.taps.last() {
            if now_ms - last > TAP_TIMEOUT_MS {
                self.taps.clear();
            }
        }
        self.taps.push(now_ms);
        if self.taps.len() > MAX_TAPS {
            self.taps.remove(0);
        }
        if self.taps.len() < 2 {
            return;
        }

        let first = self.taps[0];
        let last = self.taps[self.taps.len() - 1];
        let mean_interval = (last - first) / (self.taps.len() - 1) as f64;
        if mean_interval <= 0.0 {
            log::warn!("Ignoring tap burst with zero interval");
            return;
        }
        self.set_bpm(60_000.0 / mean_interval);
    }
}
