//! Synthetic heart rate generator.
//!
//! `70 + 10·sin(t) + noise`, with `t` in seconds since activation and
//! uniform noise in [-2.5, 2.5], clamped to the plausible range.

use crate::heart::{clamp_rate, HeartRateSource, SourceKind};
use rand::rngs::StdRng;
use rand::Rng;
use std::time::Duration;

const BASE_RATE: f64 = 70.0;
const VARIATION: f64 = 10.0;
const NOISE: f64 = 2.5;

/// Heart rate generator used when no capture device is available.
#[derive(Debug)]
pub struct SyntheticSource {
    rng: StdRng,
    released: bool,
}

impl SyntheticSource {
    pub fn new(rng: StdRng) -> Self {
        Self {
            rng,
            released: false,
        }
    }

    /// The noiseless part of the signal.
    pub fn baseline(elapsed: Duration) -> f64 {
        BASE_RATE + VARIATION * elapsed.as_secs_f64().sin()
    }
}

impl HeartRateSource for SyntheticSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Synthetic
    }

    fn next_rate(&mut self, elapsed: Duration) -> Option<f64> {
        if self.released {
            return None;
        }
        let noise = self.rng.gen_range(-NOISE..=NOISE);
        Some(clamp_rate(Self::baseline(elapsed) + noise))
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_rate_stays_near_baseline() {
        let mut source = SyntheticSource::new(StdRng::seed_from_u64(42));
        for step in 0..200u64 {
            let elapsed = Duration::from_millis(step * 500);
            let rate = source.next_rate(elapsed).unwrap();
            let baseline = SyntheticSource::baseline(elapsed);

            assert!((50.0..=120.0).contains(&rate));
            assert!((rate - baseline).abs() <= NOISE + 1e-9);
        }
    }

    #[test]
    fn test_baseline_shape() {
        assert_eq!(SyntheticSource::baseline(Duration::ZERO), 70.0);
        let peak = SyntheticSource::baseline(Duration::from_secs_f64(std::f64::consts::FRAC_PI_2));
        assert!((peak - 80.0).abs() < 1e-9);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut source = SyntheticSource::new(StdRng::seed_from_u64(1));
        source.release();
        source.release();
        assert_eq!(source.next_rate(Duration::from_secs(1)), None);
    }
}
