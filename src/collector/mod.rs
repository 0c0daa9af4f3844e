//! Input event collection.
//!
//! Real OS-level keyboard/pointer hooks are supplied by the embedding
//! application, which pushes [`SensorEvent`]s into the session's input
//! channel. The [`SimulatedCollector`] stands in for a person at the
//! keyboard so the pipeline can run headless.

pub mod simulated;
pub mod types;

// Re-export commonly used types
pub use simulated::{CollectorConfig, CollectorError, SimulatedCollector, TypingProfile};
pub use types::{KeyboardEvent, PointerEvent, SensorEvent};

/// Platform-agnostic collector type alias
pub type Collector = SimulatedCollector;
