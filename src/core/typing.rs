//! Typing metrics from keystroke timing.
//!
//! Each keystroke contributes the interval since the previous one to a
//! rolling window. Rate, rhythm and intensity are recomputed from that
//! window on every keystroke.

use crate::collector::types::KeyboardEvent;
use crate::core::window::RollingWindow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Number of inter-key intervals kept for smoothing.
pub const KEY_INTERVAL_WINDOW: usize = 20;

/// Interval variance (ms²) above which typing is erratic.
pub const ERRATIC_VARIANCE: f64 = 10_000.0;

/// Interval variance (ms²) below which typing is steady.
pub const STEADY_VARIANCE: f64 = 2_000.0;

/// Characters per word for the words-per-minute heuristic.
const CHARS_PER_WORD: f64 = 5.0;

/// Words per minute that map to full intensity.
const FULL_INTENSITY_WPM: f64 = 100.0;

/// Regularity of the key intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rhythm {
    Steady,
    Moderate,
    Erratic,
}

impl Rhythm {
    /// Classify an interval variance (ms²).
    pub fn from_variance(variance: f64) -> Self {
        if variance > ERRATIC_VARIANCE {
            Rhythm::Erratic
        } else if variance < STEADY_VARIANCE {
            Rhythm::Steady
        } else {
            Rhythm::Moderate
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rhythm::Steady => "steady",
            Rhythm::Moderate => "moderate",
            Rhythm::Erratic => "erratic",
        }
    }
}

impl std::fmt::Display for Rhythm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rhythm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "steady" => Ok(Rhythm::Steady),
            "moderate" => Ok(Rhythm::Moderate),
            "erratic" => Ok(Rhythm::Erratic),
            other => Err(format!("unknown rhythm: {other}")),
        }
    }
}

/// Snapshot of typing behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TypingMetrics {
    pub words_per_minute: u32,
    pub rhythm: Rhythm,
    /// Typing rate scaled to [0, 1]
    pub intensity: f64,
}

impl Default for TypingMetrics {
    /// The snapshot in force before any rate can be computed.
    fn default() -> Self {
        Self {
            words_per_minute: 0,
            rhythm: Rhythm::Steady,
            intensity: 0.5,
        }
    }
}

impl TypingMetrics {
    /// Compute metrics from a set of inter-key intervals in milliseconds.
    ///
    /// Returns `None` when there are no intervals.
    pub fn from_intervals<'a, I>(intervals: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a f64> + Clone,
    {
        if intervals.clone().into_iter().next().is_none() {
            return None;
        }

        // A zero mean (keys in the same millisecond) would make the rate infinite.
        let mean = intervals.clone().mean().max(1.0);
        let variance = intervals.population_variance();
        let variance = if variance.is_nan() { 0.0 } else { variance };

        let words_per_minute = (60_000.0 / mean / CHARS_PER_WORD).round() as u32;
        let intensity = (words_per_minute as f64 / FULL_INTENSITY_WPM).min(1.0);

        Some(Self {
            words_per_minute,
            rhythm: Rhythm::from_variance(variance),
            intensity,
        })
    }
}

/// Rolling estimator fed one keystroke at a time.
#[derive(Debug, Clone)]
pub struct TypingEstimator {
    intervals: RollingWindow<f64>,
    last_key: Option<DateTime<Utc>>,
}

impl TypingEstimator {
    pub fn new() -> Self {
        Self {
            intervals: RollingWindow::new(KEY_INTERVAL_WINDOW),
            last_key: None,
        }
    }

    /// Fold one keystroke into the window.
    ///
    /// The first keystroke only arms the estimator: there is no interval yet,
    /// so it yields no reading.
    pub fn record(&mut self, event: &KeyboardEvent) -> Option<TypingMetrics> {
        let previous = self.last_key.replace(event.timestamp)?;

        // Out-of-order timestamps count as simultaneous.
        let interval = (event.timestamp - previous).num_milliseconds().max(0) as f64;
        self.intervals.push(interval);

        TypingMetrics::from_intervals(self.intervals.iter())
    }

    /// Number of intervals currently in the window.
    pub fn sample_count(&self) -> usize {
        self.intervals.len()
    }

    pub fn reset(&mut self) {
        self.intervals.clear();
        self.last_key = None;
    }
}

impl Default for TypingEstimator {
    fn default() -> Self {
        Self::new()
    }
}
