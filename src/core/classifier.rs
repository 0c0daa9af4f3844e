//! Rule-based emotion classification.
//!
//! Rules are evaluated in a fixed priority order and the first one that
//! holds wins. Several rules can hold at once (a fast, erratic typist with a
//! racing pulse satisfies both the stress and the excitement rule), so the
//! order is part of the contract.

use crate::core::pointer::MouseMetrics;
use crate::core::typing::{Rhythm, TypingMetrics};
use serde::{Deserialize, Serialize};

/// Discrete emotional state driving the visualization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmotionLabel {
    Stress,
    Calm,
    Flow,
    Focus,
    Excitement,
    #[default]
    Neutral,
}

impl EmotionLabel {
    pub const ALL: [EmotionLabel; 6] = [
        EmotionLabel::Stress,
        EmotionLabel::Calm,
        EmotionLabel::Flow,
        EmotionLabel::Focus,
        EmotionLabel::Excitement,
        EmotionLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EmotionLabel::Stress => "stress",
            EmotionLabel::Calm => "calm",
            EmotionLabel::Flow => "flow",
            EmotionLabel::Focus => "focus",
            EmotionLabel::Excitement => "excitement",
            EmotionLabel::Neutral => "neutral",
        }
    }

    /// Display color as `#rrggbb`.
    pub fn hex_color(&self) -> &'static str {
        match self {
            EmotionLabel::Stress => "#ff4444",
            EmotionLabel::Calm => "#44ff88",
            EmotionLabel::Flow => "#4488ff",
            EmotionLabel::Focus => "#ff8844",
            EmotionLabel::Excitement => "#ff44ff",
            EmotionLabel::Neutral => "#888888",
        }
    }
}

impl std::fmt::Display for EmotionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EmotionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        EmotionLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| format!("unknown emotion: {s}"))
    }
}

/// Map a heart rate and the two behavioral snapshots to a label.
pub fn classify(heart_rate: f64, typing: &TypingMetrics, mouse: &MouseMetrics) -> EmotionLabel {
    let TypingMetrics {
        rhythm, intensity, ..
    } = *typing;
    let MouseMetrics {
        speed, smoothness, ..
    } = *mouse;

    if heart_rate > 90.0 && rhythm == Rhythm::Erratic && speed > 3.0 {
        EmotionLabel::Stress
    } else if heart_rate < 65.0 && smoothness > 0.7 && intensity < 0.3 {
        EmotionLabel::Calm
    } else if smoothness > 0.8 && rhythm == Rhythm::Steady && heart_rate > 70.0 && heart_rate < 85.0
    {
        EmotionLabel::Flow
    } else if intensity > 0.7 && speed > 2.0 {
        EmotionLabel::Focus
    } else if heart_rate > 85.0 && intensity > 0.6 {
        EmotionLabel::Excitement
    } else {
        EmotionLabel::Neutral
    }
}
