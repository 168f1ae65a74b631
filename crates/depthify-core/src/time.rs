//! Frame timing for cooperative, frame-paced loops
//!
//! Both the job poll loop and the viewer render loop advance one frame at a time
//! and feed the measured delta into [`FrameTime`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for frame pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeConfig {
    /// Target frames per second for the loop
    pub frame_rate: u32,
    /// Maximum delta time fed to a single frame (seconds)
    pub max_delta_time: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            max_delta_time: 0.25,
        }
    }
}

impl TimeConfig {
    /// Wall-clock budget for one frame at the configured rate
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.frame_rate.max(1)))
    }
}

/// Per-frame time tracking
#[derive(Debug, Clone, Default)]
pub struct FrameTime {
    /// Configuration
    pub config: TimeConfig,
    /// Time since the loop started, in seconds
    pub total_time: f64,
    /// Delta time for this frame (clamped)
    pub delta_time: f32,
    /// Frame counter
    pub frame_count: u64,
}

impl FrameTime {
    /// Create a new frame timer with custom config
    pub fn new(config: TimeConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Update with the raw delta measured since the previous frame
    pub fn update(&mut self, raw_delta: Duration) {
        self.delta_time = raw_delta.as_secs_f32().min(self.config.max_delta_time);
        self.total_time += f64::from(self.delta_time);
        self.frame_count += 1;
    }

    /// The clamped delta of the current frame
    pub fn delta(&self) -> Duration {
        Duration::from_secs_f32(self.delta_time)
    }
}
