//! One iteration of the render loop.
//!
//! Order per frame: fade overlay, update and draw particles, flow ring,
//! spawn. Scheduling of frames lives in the session driver.

use crate::core::classifier::EmotionLabel;
use crate::visual::particle::{emotion_color, ParticleSystem};
use crate::visual::surface::{Color, Surface};
use rand::Rng;
use std::time::Duration;

/// Alpha of the overlay painted over the previous frame.
pub const TRAIL_ALPHA: f64 = 0.1;

/// Overlay tint while calm.
pub const CALM_TINT: Color = Color::rgb(240, 248, 255);

/// Overlay tint for every other emotion.
pub const DEFAULT_TINT: Color = Color::rgb(20, 20, 30);

const FLOW_RING_RADIUS: f64 = 100.0;
const FLOW_RING_SWING: f64 = 20.0;
const FLOW_RING_WIDTH: f64 = 2.0;
const FLOW_RING_ALPHA: f64 = 0.3;

/// What a single frame did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameReport {
    /// Particles painted, including any that expired on this frame
    pub drawn: usize,
    pub spawned: usize,
    pub flow_ring: bool,
}

/// Overlay color used to fade the previous frame.
pub fn trail_overlay(emotion: EmotionLabel) -> Color {
    let tint = if emotion == EmotionLabel::Calm {
        CALM_TINT
    } else {
        DEFAULT_TINT
    };
    tint.with_alpha(TRAIL_ALPHA)
}

/// Radius of the breathing ring at session time `t`.
pub fn flow_ring_radius(t: Duration) -> f64 {
    FLOW_RING_RADIUS + (t.as_secs_f64()).sin() * FLOW_RING_SWING
}

/// Paint one frame and run the spawn policy.
///
/// `spawning` is false when the session is winding down; the frame is still
/// painted but no new particles appear.
pub fn render_frame<S, R>(
    surface: &mut S,
    particles: &mut ParticleSystem,
    emotion: EmotionLabel,
    t: Duration,
    spawning: bool,
    rng: &mut R,
) -> FrameReport
where
    S: Surface + ?Sized,
    R: Rng,
{
    surface.fill_rect(trail_overlay(emotion));

    let drawn = particles.update_and_draw(emotion, t, surface);

    let flow_ring = emotion == EmotionLabel::Flow;
    if flow_ring {
        let color = emotion_color(emotion).with_alpha(FLOW_RING_ALPHA);
        let center = surface.center();
        surface.stroke_circle(center, flow_ring_radius(t), FLOW_RING_WIDTH, color);
    }

    let spawned = if spawning {
        let center = surface.center();
        particles.maybe_spawn(center, emotion, rng)
    } else {
        0
    };

    FrameReport {
        drawn,
        spawned,
        flow_ring,
    }
}
