//! Frame timing.
//!
//! [`FrameClock`] counts frames, measures the delta between them and samples
//! the frame rate at a fixed interval for display.

use std::time::{Duration, Instant};

/// Per-frame timing for the demo window.
#[derive(Debug)]
pub struct FrameClock {
    last_frame: Instant,
    delta_secs: f32,
    frame_count: u64,
    fps: f32,
    sample_start: Instant,
    sample_frames: u64,
    sample_interval: Duration,
}

impl FrameClock {
    /// Clock sampling FPS every 500 ms.
    pub fn new() -> Self {
        Self::with_interval(Duration::from_millis(500))
    }

    /// Clock sampling FPS every `interval`.
    pub fn with_interval(interval: Duration) -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta_secs: 0.0,
            frame_count: 0,
            fps: 0.0,
            sample_start: now,
            sample_frames: 0,
            sample_interval: interval,
        }
    }

    /// Record a frame. Returns a fresh FPS sample when the interval elapsed.
    pub fn tick(&mut self) -> Option<f32> {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> Option<f32> {
        self.delta_secs = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.frame_count += 1;
        self.sample_frames += 1;

        let window = now.duration_since(self.sample_start);
        if window < self.sample_interval {
            return None;
        }
        self.fps = self.sample_frames as f32 / window.as_secs_f32();
        self.sample_frames = 0;
        self.sample_start = now;
        Some(self.fps)
    }

    /// Seconds between the last two frames.
    #[inline]
    pub fn delta(&self) -> f32 {
        self.delta_secs
    }

    /// Frames recorded so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Most recent FPS sample.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clock() {
        let clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        assert_eq!(clock.fps(), 0.0);
    }

    #[test]
    fn test_fps_sampled_after_interval() {
        let mut clock = FrameClock::with_interval(Duration::from_secs(1));
        let start = clock.sample_start;

        for i in 1..60 {
            let sample = clock.tick_at(start + Duration::from_millis(i * 10));
            assert!(sample.is_none());
        }
        let sample = clock.tick_at(start + Duration::from_secs(1)).unwrap();

        assert_eq!(clock.frame(), 60);
        assert!((sample - 60.0).abs() < 1e-3);
        assert!((clock.delta() - 0.41).abs() < 1e-3);
    }
}
