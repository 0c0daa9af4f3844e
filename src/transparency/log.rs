//! Session capture log.
//!
//! Counts what a session consumed and produced so users can see exactly
//! what was captured. Only counts are kept, never event content.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Capture counters for one session.
#[derive(Debug)]
pub struct TransparencyLog {
    /// Number of keystrokes folded into typing metrics
    keyboard_events: AtomicU64,
    /// Number of pointer moves folded into mouse metrics
    pointer_events: AtomicU64,
    /// Number of heart rate samples received
    heart_samples: AtomicU64,
    /// Number of frames painted
    frames_rendered: AtomicU64,
    /// Number of particles spawned
    particles_spawned: AtomicU64,
    /// Number of times the session was activated
    activations: AtomicU64,
    /// Session start time
    session_start: DateTime<Utc>,
}

impl TransparencyLog {
    pub fn new() -> Self {
        Self {
            keyboard_events: AtomicU64::new(0),
            pointer_events: AtomicU64::new(0),
            heart_samples: AtomicU64::new(0),
            frames_rendered: AtomicU64::new(0),
            particles_spawned: AtomicU64::new(0),
            activations: AtomicU64::new(0),
            session_start: Utc::now(),
        }
    }

    pub fn record_keyboard_event(&self) {
        self.keyboard_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_pointer_event(&self) {
        self.pointer_events.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_heart_sample(&self) {
        self.heart_samples.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_frame(&self) {
        self.frames_rendered.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_particles_spawned(&self, count: u64) {
        self.particles_spawned.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_activation(&self) {
        self.activations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> TransparencyStats {
        TransparencyStats {
            keyboard_events: self.keyboard_events.load(Ordering::Relaxed),
            pointer_events: self.pointer_events.load(Ordering::Relaxed),
            heart_samples: self.heart_samples.load(Ordering::Relaxed),
            frames_rendered: self.frames_rendered.load(Ordering::Relaxed),
            particles_spawned: self.particles_spawned.load(Ordering::Relaxed),
            activations: self.activations.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Keystrokes processed: {}\n\
             - Pointer moves processed: {}\n\
             - Heart rate samples: {}\n\
             - Frames rendered: {}\n\
             - Particles spawned: {}\n\
             - Activations: {}\n\
             - Session duration: {} seconds\n\
             \n\
             Capture Guarantee:\n\
             - No key content captured, keystroke timing only\n\
             - Pointer positions kept for the last 10 moves only\n\
             - Nothing is written to disk unless you export it",
            stats.keyboard_events,
            stats.pointer_events,
            stats.heart_samples,
            stats.frames_rendered,
            stats.particles_spawned,
            stats.activations,
            stats.session_duration_secs
        )
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.keyboard_events.store(0, Ordering::Relaxed);
        self.pointer_events.store(0, Ordering::Relaxed);
        self.heart_samples.store(0, Ordering::Relaxed);
        self.frames_rendered.store(0, Ordering::Relaxed);
        self.particles_spawned.store(0, Ordering::Relaxed);
        self.activations.store(0, Ordering::Relaxed);
    }
}

impl Default for TransparencyLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of capture statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransparencyStats {
    pub keyboard_events: u64,
    pub pointer_events: u64,
    pub heart_samples: u64,
    pub frames_rendered: u64,
    pub particles_spawned: u64,
    pub activations: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Thread-safe shared capture log.
pub type SharedTransparencyLog = Arc<TransparencyLog>;

/// Create a new shared capture log.
pub fn create_shared_log() -> SharedTransparencyLog {
    Arc::new(TransparencyLog::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transparency_log_counting() {
        let log = TransparencyLog::new();

        log.record_keyboard_event();
        log.record_keyboard_event();
        log.record_pointer_event();
        log.record_particles_spawned(8);
        log.record_particles_spawned(3);

        let stats = log.stats();
        assert_eq!(stats.keyboard_events, 2);
        assert_eq!(stats.pointer_events, 1);
        assert_eq!(stats.particles_spawned, 11);
    }

    #[test]
    fn test_transparency_log_reset() {
        let log = TransparencyLog::new();

        log.record_frame();
        log.record_heart_sample();
        log.record_activation();
        log.reset();

        let stats = log.stats();
        assert_eq!(stats.frames_rendered, 0);
        assert_eq!(stats.heart_samples, 0);
        assert_eq!(stats.activations, 0);
    }

    #[test]
    fn test_summary_format() {
        let log = TransparencyLog::new();
        let summary = log.summary();

        assert!(summary.contains("Keystrokes processed"));
        assert!(summary.contains("Frames rendered"));
        assert!(summary.contains("Capture Guarantee"));
        assert!(summary.contains("No key content captured"));
    }
}
