//! Frame clock with periodic frame-rate reporting

use std::time::{Duration, Instant};

/// Average frame rate since the clock started
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FpsReport {
    pub frames: u64,
    pub average_fps: f64,
}

/// Tracks per-frame delta time and total elapsed time
pub struct FrameClock {
    /// Total elapsed time in seconds
    pub total_time: f64,
    /// Time since last frame in seconds
    pub delta_time: f64,
    /// Frames between reports; 0 disables reporting
    pub report_interval: u64,
    frames: u64,
    start_instant: Instant,
    last_instant: Instant,
    first_tick: bool,
}

impl Default for FrameClock {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            total_time: 0.0,
            delta_time: Self::INITIAL_DELTA,
            report_interval: 100,
            frames: 0,
            start_instant: now,
            last_instant: now,
            first_tick: true,
        }
    }
}

impl FrameClock {
    /// Delta reported before a real frame has been timed
    pub const INITIAL_DELTA: f64 = 1.0 / 60.0;

    pub fn new() -> Self {
        Self::default()
    }

    /// Create a clock that reports every `interval` frames
    pub fn with_report_interval(interval: u64) -> Self {
        Self {
            report_interval: interval,
            ..Self::default()
        }
    }

    /// Advance the clock. Call once per frame; returns the delta in seconds.
    pub fn tick(&mut self) -> f64 {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> f64 {
        if self.first_tick {
            self.first_tick = false;
            self.start_instant = now;
            self.last_instant = now;
            self.delta_time = Self::INITIAL_DELTA;
            return self.delta_time;
        }

        self.delta_time = now.duration_since(self.last_instant).as_secs_f64();
        self.last_instant = now;
        self.total_time = now.duration_since(self.start_instant).as_secs_f64();
        self.delta_time
    }

    /// Count a presented frame. Every `report_interval` frames returns the
    /// average frame rate since the first tick.
    pub fn end_frame(&mut self) -> Option<FpsReport> {
        self.frames += 1;
        if self.report_interval == 0 || self.frames % self.report_interval != 0 {
            return None;
        }
        let elapsed = self.start_instant.elapsed().max(Duration::from_micros(1));
        Some(FpsReport {
            frames: self.frames,
            average_fps: self.frames as f64 / elapsed.as_secs_f64(),
        })
    }

    /// Frames counted so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}
