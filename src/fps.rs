//! Frame-rate instrument with a sliding sample window.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Samples kept for the moving average (about one second at 60 Hz)
const WINDOW: usize = 60;

pub struct FpsTracker {
    frame_times: VecDeque<Duration>,
    last_frame: Instant,
    last_report: Instant,
    min_fps: f32,
    max_fps: f32,
}

impl FpsTracker {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            frame_times: VecDeque::new(),
            last_frame: now,
            last_report: now,
            min_fps: f32::MAX,
            max_fps: 0.0,
        }
    }

    /// Record one frame sample; reports through `log` once per second.
    pub fn record_frame(&mut self) {
        let now = Instant::now();
        let frame_time = now - self.last_frame;
        self.last_frame = now;

        self.frame_times.push_back(frame_time);
        if self.frame_times.len() > WINDOW {
            self.frame_times.pop_front();
        }

        let current_fps = self.current_fps();
        if current_fps > 0.0 {
            self.min_fps = self.min_fps.min(current_fps);
            self.max_fps = self.max_fps.max(current_fps);
        }

        if now - self.last_report > Duration::from_secs(1) {
            let (min, avg, max) = self.stats();
            log::info!("FPS - Min: {:.1}, Avg: {:.1}, Max: {:.1}", min, avg, max);
            self.last_report = now;
        }
    }

    /// Average FPS over the sample window, 0 before the first sample
    pub fn current_fps(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }

        let total: Duration = self.frame_times.iter().sum();
        let avg_frame_time = total.as_secs_f32() / self.frame_times.len() as f32;

        if avg_frame_time > 0.0 {
            1.0 / avg_frame_time
        } else {
            0.0
        }
    }

    pub fn stats(&self) -> (f32, f32, f32) {
        (self.min_fps, self.current_fps(), self.max_fps)
    }
}

impl Default for FpsTracker {
    fn default() -> Self {
        Self::new()
    }
}
