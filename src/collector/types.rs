//! Raw input event types consumed by the metric estimators.
//!
//! Keyboard events carry only timing. Pointer events carry the cursor
//! position because smoothness depends on direction, not just magnitude.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A keystroke notification. No key code or character is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeyboardEvent {
    /// Timestamp when the key went down
    pub timestamp: DateTime<Utc>,
}

impl KeyboardEvent {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self { timestamp }
    }
}

impl Default for KeyboardEvent {
    fn default() -> Self {
        Self::new()
    }
}

/// A pointer-move notification in surface pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    /// Timestamp when the move was observed
    pub timestamp: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64) -> Self {
        Self::at(x, y, Utc::now())
    }

    pub fn at(x: f64, y: f64, timestamp: DateTime<Utc>) -> Self {
        Self { timestamp, x, y }
    }
}

/// Unified event type for the collector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SensorEvent {
    Keyboard(KeyboardEvent),
    Pointer(PointerEvent),
}

impl SensorEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            SensorEvent::Keyboard(e) => e.timestamp,
            SensorEvent::Pointer(e) => e.timestamp,
        }
    }
}

impl From<KeyboardEvent> for SensorEvent {
    fn from(event: KeyboardEvent) -> Self {
        SensorEvent::Keyboard(event)
    }
}

impl From<PointerEvent> for SensorEvent {
    fn from(event: PointerEvent) -> Self {
        SensorEvent::Pointer(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_event_timestamp() {
        let t = Utc::now();
        let key: SensorEvent = KeyboardEvent::at(t).into();
        let ptr: SensorEvent = PointerEvent::at(1.0, 2.0, t + Duration::milliseconds(5)).into();

        assert_eq!(key.timestamp(), t);
        assert_eq!(ptr.timestamp(), t + Duration::milliseconds(5));
    }

    #[test]
    fn test_pointer_event_serializes_position() {
        let event = PointerEvent::new(3.0, 4.0);
        let json = serde_json::to_value(event).unwrap();
        assert_eq!(json["x"], 3.0);
        assert_eq!(json["y"], 4.0);
    }
}
