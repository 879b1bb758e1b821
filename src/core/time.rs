//! Frame timing and FPS analytics

use std::time::{Duration, Instant};

/// FPS statistics gathered over one sample window
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct FpsSample {
    pub avg: f32,
    pub min: f32,
    pub max: f32,
    pub frames: u32,
}

/// Accumulates frame times and closes a sample once the window has elapsed
#[derive(Debug, Clone)]
pub struct FpsAccumulator {
    window: Duration,
    elapsed: Duration,
    frames: u32,
    min: f32,
    max: f32,
}

impl FpsAccumulator {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            elapsed: Duration::ZERO,
            frames: 0,
            min: f32::INFINITY,
            max: 0.0,
        }
    }

    /// Record one frame; returns the finished sample when the window is full
    pub fn record(&mut self, frame_time: Duration) -> Option<FpsSample> {
        let secs = frame_time.as_secs_f32();
        if secs > 0.0 {
            let fps = 1.0 / secs;
            self.min = self.min.min(fps);
            self.max = self.max.max(fps);
        }
        self.frames += 1;
        self.elapsed += frame_time;

        if self.elapsed < self.window {
            return None;
        }

        let sample = FpsSample {
            avg: self.frames as f32 / self.elapsed.as_secs_f32(),
            min: if self.min.is_finite() { self.min } else { 0.0 },
            max: self.max,
            frames: self.frames,
        };
        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.min = f32::INFINITY;
        self.max = 0.0;
        Some(sample)
    }
}

/// Tracks frame timing and calculates FPS
pub struct FrameTimer {
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
    accumulator: FpsAccumulator,
    last_sample: Option<FpsSample>,
}

impl FrameTimer {
    /// Create a new frame timer with a one second analytics window
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta: Duration::ZERO,
            frame_count: 0,
            accumulator: FpsAccumulator::new(Duration::from_secs(1)),
            last_sample: None,
        }
    }

    /// Call once per frame to update timing
    ///
    /// Returns a new [`FpsSample`] each time the analytics window closes.
    pub fn tick(&mut self) -> Option<FpsSample> {
        let now = Instant::now();
        self.delta = now - self.last_frame;
        self.last_frame = now;
        self.frame_count += 1;

        let sample = self.accumulator.record(self.delta);
        if sample.is_some() {
            self.last_sample = sample;
        }
        sample
    }

    /// Get delta time in seconds
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Most recent completed sample
    pub fn last_sample(&self) -> Option<FpsSample> {
        self.last_sample
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}
