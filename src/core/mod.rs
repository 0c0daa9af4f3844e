//! Core signal pipeline.
//!
//! This module contains:
//! - Rolling windows over recent samples
//! - Typing and pointer metric estimators
//! - The emotion classifier
//! - Serializable state snapshots

pub mod classifier;
pub mod pointer;
pub mod snapshot;
pub mod typing;
pub mod window;

// Re-export commonly used types
pub use classifier::{classify, EmotionLabel};
pub use pointer::{Activity, MouseMetrics, PointerEstimator};
pub use snapshot::{Readings, SnapshotBuilder, StateSnapshot, PRODUCER_NAME};
pub use typing::{Rhythm, TypingEstimator, TypingMetrics};
pub use window::RollingWindow;
