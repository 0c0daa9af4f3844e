//! Serializable snapshots of the session state.
//!
//! A snapshot captures everything the classifier saw at one instant plus
//! the label it produced. The CLI writes them as JSON lines; observers can
//! forward them wherever they like.

use crate::core::classifier::{classify, EmotionLabel};
use crate::core::pointer::MouseMetrics;
use crate::core::typing::TypingMetrics;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The name of this producer.
pub const PRODUCER_NAME: &str = "biometric-art";

/// Producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Producer {
    pub name: String,
    pub version: String,
}

impl Default for Producer {
    fn default() -> Self {
        Self {
            name: PRODUCER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// The three classifier inputs at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub heart_rate: f64,
    pub typing: TypingMetrics,
    pub mouse: MouseMetrics,
}

impl Default for Readings {
    fn default() -> Self {
        Self {
            heart_rate: crate::heart::DEFAULT_HEART_RATE,
            typing: TypingMetrics::default(),
            mouse: MouseMetrics::default(),
        }
    }
}

impl Readings {
    pub fn emotion(&self) -> EmotionLabel {
        classify(self.heart_rate, &self.typing, &self.mouse)
    }
}

/// State of a session at one instant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub session_id: String,
    /// When the state was observed (RFC3339)
    pub observed_at_utc: String,
    pub producer: Producer,
    /// "device" or "synthetic"; absent while inactive
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heart_rate_source: Option<String>,
    pub heart_rate: f64,
    pub typing: TypingMetrics,
    pub mouse: MouseMetrics,
    pub emotion: EmotionLabel,
    pub particle_count: usize,
}

/// Stamps snapshots with a session identity.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    session_id: Uuid,
}

impl SnapshotBuilder {
    /// Create a builder with a fresh session ID.
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn build(
        &self,
        readings: &Readings,
        heart_rate_source: Option<&str>,
        particle_count: usize,
    ) -> StateSnapshot {
        StateSnapshot {
            session_id: self.session_id.to_string(),
            observed_at_utc: Utc::now().to_rfc3339(),
            producer: Producer::default(),
            heart_rate_source: heart_rate_source.map(str::to_string),
            heart_rate: readings.heart_rate,
            typing: readings.typing,
            mouse: readings.mouse,
            emotion: readings.emotion(),
            particle_count,
        }
    }

    /// Build a snapshot and serialize it to a single JSON line.
    pub fn build_json(
        &self,
        readings: &Readings,
        heart_rate_source: Option<&str>,
        particle_count: usize,
    ) -> String {
        let snapshot = self.build(readings, heart_rate_source, particle_count);
        serde_json::to_string(&snapshot).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}
