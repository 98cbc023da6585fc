//! Frame timing
//!
//! Wall-clock deltas come from the window loop driving the engine; simulation
//! time lives in [`SimulationState`](crate::simulation::SimulationState).

/// Frame-rate estimate averaged over a fixed window of frames
///
/// The estimate only changes once per window, which keeps the overlay
/// readable instead of flickering every frame.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: u32,
    frames: u32,
    accumulated: f32,
}

impl FpsCounter {
    /// Frames averaged per estimate
    pub const DEFAULT_WINDOW: u32 = 5;

    /// Create a counter averaging over `window` frames (at least one)
    pub fn new(window: u32) -> Self {
        Self {
            window: window.max(1),
            frames: 0,
            accumulated: 0.0,
        }
    }

    /// Record a frame; returns the rounded FPS when a window completes
    pub fn record(&mut self, delta_time: f32) -> Option<u32> {
        self.accumulated += delta_time;
        self.frames += 1;

        if self.frames < self.window {
            return None;
        }

        let average = self.accumulated / self.window as f32;
        self.frames = 0;
        self.accumulated = 0.0;

        if average > 0.0 {
            Some((1.0 / average).round() as u32)
        } else {
            None
        }
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps_counter_reports_once_per_window() {
        let mut counter = FpsCounter::new(5);
        for _ in 0..4 {
            assert_eq!(counter.record(0.02), None);
        }
        assert_eq!(counter.record(0.02), Some(50));

        for _ in 0..4 {
            assert_eq!(counter.record(0.01), None);
        }
        assert_eq!(counter.record(0.01), Some(100));
    }

    #[test]
    fn test_fps_counter_ignores_zero_time_window() {
        let mut counter = FpsCounter::new(1);
        assert_eq!(counter.record(0.0), None);
    }
}
