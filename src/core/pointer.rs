//! Pointer metrics from cursor movement.
//!
//! Speed comes from the two most recent samples. Smoothness counts sharp
//! heading changes across the whole window.

use crate::collector::types::PointerEvent;
use crate::core::window::RollingWindow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of pointer positions kept for smoothing.
pub const POINTER_WINDOW: usize = 10;

/// Heading change (radians) that counts as a direction change.
pub const DIRECTION_CHANGE_THRESHOLD: f64 = 0.5;

/// Smoothness reported until there are enough samples to judge.
pub const DEFAULT_SMOOTHNESS: f64 = 0.5;

/// Speeds (px/ms) separating the activity levels.
const ACTIVE_SPEED: f64 = 2.0;
const MODERATE_SPEED: f64 = 0.5;

/// Coarse level of pointer activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Idle,
    Moderate,
    Active,
}

impl Activity {
    pub fn from_speed(speed: f64) -> Self {
        if speed > ACTIVE_SPEED {
            Activity::Active
        } else if speed > MODERATE_SPEED {
            Activity::Moderate
        } else {
            Activity::Idle
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Activity::Idle => "idle",
            Activity::Moderate => "moderate",
            Activity::Active => "active",
        }
    }
}

impl std::fmt::Display for Activity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of pointer behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MouseMetrics {
    /// Pixels per millisecond, rounded to the nearest integer
    pub speed: f64,
    /// 1.0 = no sharp turns, 0.0 = a turn on every segment
    pub smoothness: f64,
    pub activity: Activity,
}

impl Default for MouseMetrics {
    fn default() -> Self {
        Self {
            speed: 0.0,
            smoothness: DEFAULT_SMOOTHNESS,
            activity: Activity::Idle,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Sample {
    x: f64,
    y: f64,
    time: DateTime<Utc>,
}

/// Rolling estimator fed one pointer move at a time.
#[derive(Debug, Clone)]
pub struct PointerEstimator {
    positions: RollingWindow<Sample>,
}

impl PointerEstimator {
    pub fn new() -> Self {
        Self {
            positions: RollingWindow::new(POINTER_WINDOW),
        }
    }

    /// Fold one pointer move into the window.
    ///
    /// Yields no reading until there are two positions to measure between.
    pub fn record(&mut self, event: &PointerEvent) -> Option<MouseMetrics> {
        self.positions.push(Sample {
            x: event.x,
            y: event.y,
            time: event.timestamp,
        });

        let mut recent = self.positions.recent(2);
        let (prev, last) = match (recent.next(), recent.next()) {
            (Some(prev), Some(last)) => (prev, last),
            _ => return None,
        };

        let distance = (last.x - prev.x).hypot(last.y - prev.y);
        // Floor at 1 ms so a repeated timestamp cannot divide by zero.
        let elapsed_ms = ((last.time - prev.time).num_milliseconds() as f64).max(1.0);
        // Activity uses the raw speed; only the reported speed is rounded.
        let raw_speed = distance / elapsed_ms;

        Some(MouseMetrics {
            speed: raw_speed.round(),
            smoothness: self.smoothness(),
            activity: Activity::from_speed(raw_speed),
        })
    }

    /// Fraction of segments that keep roughly the same heading as the previous one.
    fn smoothness(&self) -> f64 {
        if self.positions.len() < 3 {
            return DEFAULT_SMOOTHNESS;
        }

        let directions: Vec<f64> = self
            .positions
            .pairs()
            .map(|(a, b)| (b.y - a.y).atan2(b.x - a.x))
            .collect();

        let changes = directions
            .windows(2)
            .filter(|pair| (pair[1] - pair[0]).abs() > DIRECTION_CHANGE_THRESHOLD)
            .count();

        (1.0 - changes as f64 / directions.len() as f64).max(0.0)
    }

    /// Number of positions currently in the window.
    pub fn sample_count(&self) -> usize {
        self.positions.len()
    }

    pub fn reset(&mut self) {
        self.positions.clear();
    }
}

impl Default for PointerEstimator {
    fn default() -> Self {
        Self::new()
    }
}
