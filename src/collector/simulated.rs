//! Simulated input collector.
//!
//! Generates keystrokes and pointer moves on a background thread so the
//! pipeline can be exercised without OS input hooks. The generated stream
//! follows a [`TypingProfile`]: key cadence, key jitter, pointer speed and
//! how often the pointer changes heading.

use crate::collector::types::{KeyboardEvent, PointerEvent, SensorEvent};
use crossbeam_channel::{Sender, TrySendError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Pointer sampling period of the simulated mouse.
const POINTER_PERIOD: Duration = Duration::from_millis(16);

/// Granularity of the generator loop.
const STEP: Duration = Duration::from_millis(4);

/// The kind of person the simulated collector imitates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypingProfile {
    /// Slow, even typing and long smooth pointer arcs
    Relaxed,
    /// Fast, even typing with quick straight pointer sweeps
    Focused,
    /// Bursty typing and jittery pointer
    Agitated,
}

impl TypingProfile {
    /// Mean key interval and jitter half-width, in milliseconds.
    fn key_timing(self) -> (f64, f64) {
        match self {
            TypingProfile::Relaxed => (420.0, 20.0),
            TypingProfile::Focused => (110.0, 15.0),
            TypingProfile::Agitated => (150.0, 140.0),
        }
    }

    /// Pointer travel per sample in pixels.
    fn pointer_step(self) -> f64 {
        match self {
            TypingProfile::Relaxed => 4.0,
            TypingProfile::Focused => 48.0,
            TypingProfile::Agitated => 64.0,
        }
    }

    /// Probability that the pointer picks a new heading on a sample.
    fn turn_probability(self) -> f64 {
        match self {
            TypingProfile::Relaxed => 0.0,
            TypingProfile::Focused => 0.05,
            TypingProfile::Agitated => 0.6,
        }
    }
}

impl std::str::FromStr for TypingProfile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relaxed" => Ok(TypingProfile::Relaxed),
            "focused" => Ok(TypingProfile::Focused),
            "agitated" => Ok(TypingProfile::Agitated),
            other => Err(format!("unknown typing profile: {other}")),
        }
    }
}

/// Configuration for which event sources to simulate.
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub capture_keyboard: bool,
    pub capture_mouse: bool,
    pub profile: TypingProfile,
    /// Bounds the pointer stays inside
    pub width: f64,
    pub height: f64,
    pub seed: Option<u64>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            capture_keyboard: true,
            capture_mouse: true,
            profile: TypingProfile::Focused,
            width: 800.0,
            height: 400.0,
            seed: None,
        }
    }
}

/// Errors that can occur during event collection.
#[derive(Debug)]
pub enum CollectorError {
    AlreadyRunning,
    NoSourcesEnabled,
}

impl std::fmt::Display for CollectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectorError::AlreadyRunning => write!(f, "Collector is already running"),
            CollectorError::NoSourcesEnabled => {
                write!(f, "At least one source must be enabled (keyboard or mouse)")
            }
        }
    }
}

impl std::error::Error for CollectorError {}

/// Collector that synthesizes input on a background thread.
pub struct SimulatedCollector {
    config: CollectorConfig,
    sender: Sender<SensorEvent>,
    running: Arc<AtomicBool>,
    thread_handle: Option<JoinHandle<()>>,
}

impl SimulatedCollector {
    /// Create a collector that delivers into `sender`.
    pub fn new(config: CollectorConfig, sender: Sender<SensorEvent>) -> Self {
        Self {
            config,
            sender,
            running: Arc::new(AtomicBool::new(false)),
            thread_handle: None,
        }
    }

    /// Start generating events in a background thread.
    pub fn start(&mut self) -> Result<(), CollectorError> {
        if self.running.load(Ordering::SeqCst) {
            return Err(CollectorError::AlreadyRunning);
        }
        if !self.config.capture_keyboard && !self.config.capture_mouse {
            return Err(CollectorError::NoSourcesEnabled);
        }

        self.running.store(true, Ordering::SeqCst);

        let sender = self.sender.clone();
        let running = self.running.clone();
        let config = self.config.clone();

        let handle = thread::spawn(move || {
            run_generator(sender, running.clone(), config);
            running.store(false, Ordering::SeqCst);
        });

        self.thread_handle = Some(handle);
        tracing::debug!(profile = ?self.config.profile, "simulated collector started");
        Ok(())
    }

    /// Stop generating events.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }

    /// Check if the collector is currently running.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn profile(&self) -> TypingProfile {
        self.config.profile
    }
}

impl Drop for SimulatedCollector {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Pointer walker: moves at a fixed step along a heading, bouncing off the
/// bounds, occasionally turning.
struct PointerWalk {
    x: f64,
    y: f64,
    heading: f64,
}

impl PointerWalk {
    fn advance<R: Rng>(&mut self, rng: &mut R, config: &CollectorConfig) -> (f64, f64) {
        let profile = config.profile;
        if profile == TypingProfile::Relaxed {
            // gentle constant curvature
            self.heading += 0.05;
        } else if rng.gen_bool(profile.turn_probability()) {
            self.heading = rng.gen_range(-std::f64::consts::PI..std::f64::consts::PI);
        }

        let step = profile.pointer_step();
        self.x += self.heading.cos() * step;
        self.y += self.heading.sin() * step;

        if self.x < 0.0 || self.x > config.width {
            self.heading = std::f64::consts::PI - self.heading;
            self.x = self.x.clamp(0.0, config.width);
        }
        if self.y < 0.0 || self.y > config.height {
            self.heading = -self.heading;
            self.y = self.y.clamp(0.0, config.height);
        }

        (self.x, self.y)
    }
}

fn next_key_delay<R: Rng>(rng: &mut R, profile: TypingProfile) -> Duration {
    let (mean, jitter) = profile.key_timing();
    let ms = (mean + rng.gen_range(-jitter..=jitter)).max(1.0);
    Duration::from_millis(ms as u64)
}

fn run_generator(sender: Sender<SensorEvent>, running: Arc<AtomicBool>, config: CollectorConfig) {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut walk = PointerWalk {
        x: config.width / 2.0,
        y: config.height / 2.0,
        heading: 0.0,
    };

    let mut next_key = Instant::now() + next_key_delay(&mut rng, config.profile);
    let mut next_pointer = Instant::now();

    while running.load(Ordering::SeqCst) {
        let now = Instant::now();

        if config.capture_keyboard && now >= next_key {
            if !deliver(&sender, KeyboardEvent::new().into()) {
                break;
            }
            next_key = now + next_key_delay(&mut rng, config.profile);
        }

        if config.capture_mouse && now >= next_pointer {
            let (x, y) = walk.advance(&mut rng, &config);
            if !deliver(&sender, PointerEvent::new(x, y).into()) {
                break;
            }
            next_pointer = now + POINTER_PERIOD;
        }

        thread::sleep(STEP);
    }
}

/// Returns false once the receiving side is gone.
fn deliver(sender: &Sender<SensorEvent>, event: SensorEvent) -> bool {
    match sender.try_send(event) {
        Ok(()) => true,
        // Drop on backpressure rather than block the generator.
        Err(TrySendError::Full(_)) => true,
        Err(TrySendError::Disconnected(_)) => false,
    }
}
