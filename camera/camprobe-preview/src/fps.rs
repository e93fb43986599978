use std::time::{Duration, Instant};

/// Length of the measurement window used by [FpsCounter::default].
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(1);

/// Counts events and reports their rate once per interval.
///
/// The rate is `events / elapsed` over the window that just closed, without
/// smoothing. Nothing is reported before the first full interval.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    interval: Duration,
    window_start: Instant,
    count: u32,
    last_fps: f64,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

impl FpsCounter {
    pub fn new(interval: Duration) -> Self {
        Self::new_at(interval, Instant::now())
    }

    pub fn new_at(interval: Duration, start: Instant) -> Self {
        Self {
            interval,
            window_start: start,
            count: 0,
            last_fps: 0.0,
        }
    }

    pub fn tick(&mut self) -> Option<f64> {
        self.tick_at(Instant::now())
    }

    /// Record one event at `now`. Returns the rate if this closed a window.
    pub fn tick_at(&mut self, now: Instant) -> Option<f64> {
        self.count += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.interval || elapsed.is_zero() {
            return None;
        }
        let fps = self.count as f64 / elapsed.as_secs_f64();
        self.last_fps = fps;
        self.count = 0;
        self.window_start = now;
        Some(fps)
    }

    /// Events counted in the current window.
    pub fn frame_count(&self) -> u32 {
        self.count
    }

    /// The most recently published rate, 0.0 before the first one.
    pub fn last_fps(&self) -> f64 {
        self.last_fps
    }
}

/// Title of the preview window.
pub fn window_title(fps: f64) -> String {
    format!("Image Viewer - FPS: {fps:.2}")
}
