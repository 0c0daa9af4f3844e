//! Device-backed heart rate.
//!
//! A [`CaptureDevice`] hands out a [`VideoStream`]; how a stream turns
//! frames into a pulse is its own business. [`DeviceSource`] owns the open
//! stream and closes it on release.

use crate::heart::{clamp_rate, HeartRateSource, SourceKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Errors that can occur while acquiring a capture device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceError {
    PermissionDenied,
    NotFound,
    Unavailable(String),
}

impl std::fmt::Display for DeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceError::PermissionDenied => write!(f, "Camera access denied"),
            DeviceError::NotFound => write!(f, "No capture device found"),
            DeviceError::Unavailable(e) => write!(f, "Capture device unavailable: {e}"),
        }
    }
}

impl std::error::Error for DeviceError {}

/// Something that can be asked for a video stream.
pub trait CaptureDevice: Send + Sync {
    fn name(&self) -> &str;

    fn open(&self) -> Result<Box<dyn VideoStream>, DeviceError>;
}

/// An open capture stream that periodically yields a pulse estimate.
pub trait VideoStream: Send {
    fn estimate_rate(&mut self, elapsed: Duration) -> Option<f64>;

    /// Stop all tracks. Must tolerate repeated calls.
    fn close(&mut self);
}

/// Heart rate source reading from an open stream.
pub struct DeviceSource {
    device_name: String,
    stream: Option<Box<dyn VideoStream>>,
}

impl DeviceSource {
    pub fn new(device_name: &str, stream: Box<dyn VideoStream>) -> Self {
        Self {
            device_name: device_name.to_string(),
            stream: Some(stream),
        }
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl HeartRateSource for DeviceSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Device
    }

    fn next_rate(&mut self, elapsed: Duration) -> Option<f64> {
        self.stream
            .as_mut()
            .and_then(|stream| stream.estimate_rate(elapsed))
            .filter(|rate| rate.is_finite())
    }

    fn release(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.close();
            tracing::debug!(device = %self.device_name, "capture stream released");
        }
    }
}

impl Drop for DeviceSource {
    fn drop(&mut self) {
        self.release();
    }
}

/// A machine without a camera.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCaptureDevice;

impl CaptureDevice for NoCaptureDevice {
    fn name(&self) -> &str {
        "none"
    }

    fn open(&self) -> Result<Box<dyn VideoStream>, DeviceError> {
        Err(DeviceError::NotFound)
    }
}

/// Camera stand-in whose streams report a plausible, slowly swinging pulse.
///
/// Tracks how many of its streams are open so callers can verify that
/// deactivation released them.
#[derive(Debug, Clone)]
pub struct SimulatedCamera {
    seed: Option<u64>,
    deny: bool,
    open_streams: Arc<AtomicUsize>,
}

impl SimulatedCamera {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            deny: false,
            open_streams: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A camera whose permission prompt is always declined.
    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::new(None)
        }
    }

    /// Number of streams currently open.
    pub fn open_streams(&self) -> usize {
        self.open_streams.load(Ordering::SeqCst)
    }
}

impl CaptureDevice for SimulatedCamera {
    fn name(&self) -> &str {
        "simulated-camera"
    }

    fn open(&self) -> Result<Box<dyn VideoStream>, DeviceError> {
        if self.deny {
            return Err(DeviceError::PermissionDenied);
        }
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.open_streams.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(SimulatedStream {
            rng,
            open: true,
            open_streams: self.open_streams.clone(),
        }))
    }
}

struct SimulatedStream {
    rng: StdRng,
    open: bool,
    open_streams: Arc<AtomicUsize>,
}

impl VideoStream for SimulatedStream {
    fn estimate_rate(&mut self, elapsed: Duration) -> Option<f64> {
        if !self.open {
            return None;
        }
        let variation = elapsed.as_secs_f64().sin() * 10.0;
        let noise = self.rng.gen_range(-2.5..=2.5);
        Some(clamp_rate(70.0 + variation + noise).round())
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.open_streams.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for SimulatedStream {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_capture_device_fails() {
        assert!(matches!(NoCaptureDevice.open(), Err(DeviceError::NotFound)));
    }

    #[test]
    fn test_denied_camera() {
        let camera = SimulatedCamera::denied();
        assert!(matches!(camera.open(), Err(DeviceError::PermissionDenied)));
        assert_eq!(camera.open_streams(), 0);
    }

    #[test]
    fn test_device_source_reads_whole_bpm() {
        let camera = SimulatedCamera::new(Some(9));
        let mut source = DeviceSource::new(camera.name(), camera.open().unwrap());

        let rate = source.next_rate(Duration::from_secs(3)).unwrap();
        assert_eq!(rate, rate.round());
        assert!((50.0..=120.0).contains(&rate));
    }

    #[test]
    fn test_release_closes_stream_once() {
        let camera = SimulatedCamera::new(Some(9));
        let mut source = DeviceSource::new(camera.name(), camera.open().unwrap());
        assert_eq!(camera.open_streams(), 1);

        source.release();
        source.release();
        assert!(!source.is_open());
        assert_eq!(camera.open_streams(), 0);
        assert_eq!(source.next_rate(Duration::from_secs(1)), None);
    }

    #[test]
    fn test_drop_releases_stream() {
        let camera = SimulatedCamera::new(Some(9));
        {
            let _source = DeviceSource::new(camera.name(), camera.open().unwrap());
            assert_eq!(camera.open_streams(), 1);
        }
        assert_eq!(camera.open_streams(), 0);
    }
}
