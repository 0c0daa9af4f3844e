//! Heart rate sources.
//!
//! A session picks its source when it is activated: a capture device if one
//! can be opened, otherwise a synthetic generator. Callers only see the
//! [`HeartRateSource`] trait and do not care which variant is running.

pub mod device;
pub mod synthetic;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use device::{
    CaptureDevice, DeviceError, DeviceSource, NoCaptureDevice, SimulatedCamera, VideoStream,
};
pub use synthetic::SyntheticSource;

/// Heart rate reported before the first sample arrives.
pub const DEFAULT_HEART_RATE: f64 = 72.0;

/// Bounds applied to generated heart rates.
pub const MIN_HEART_RATE: f64 = 50.0;
pub const MAX_HEART_RATE: f64 = 120.0;

/// Default emission period.
pub const HEART_RATE_INTERVAL: Duration = Duration::from_millis(500);

/// Which variant is producing the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Device,
    Synthetic,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Device => "device",
            SourceKind::Synthetic => "synthetic",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A periodic heart rate signal.
pub trait HeartRateSource: Send {
    fn kind(&self) -> SourceKind;

    /// How often the session should ask for a new rate.
    fn interval(&self) -> Duration {
        HEART_RATE_INTERVAL
    }

    /// Produce the rate for `elapsed` time since activation.
    ///
    /// `None` means no reading this period; the previous rate stays in force.
    fn next_rate(&mut self, elapsed: Duration) -> Option<f64>;

    /// Release any acquired resource. Safe to call more than once.
    fn release(&mut self);
}

/// Choose a source for a new activation.
///
/// Tries the capture device first. Failure to open it is not an error for
/// the caller: it is logged and the synthetic generator takes over.
pub fn acquire(device: &dyn CaptureDevice, seed: Option<u64>) -> Box<dyn HeartRateSource> {
    match device.open() {
        Ok(stream) => {
            tracing::info!(device = device.name(), "heart rate from capture device");
            Box::new(DeviceSource::new(device.name(), stream))
        }
        Err(e) => {
            tracing::warn!(
                device = device.name(),
                error = %e,
                "capture device unavailable, using simulated heart rate"
            );
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            Box::new(SyntheticSource::new(rng))
        }
    }
}

/// Clamp a rate into the plausible range.
pub fn clamp_rate(rate: f64) -> f64 {
    rate.clamp(MIN_HEART_RATE, MAX_HEART_RATE)
}
