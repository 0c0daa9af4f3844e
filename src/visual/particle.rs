//! Particle simulation.
//!
//! Particles are spawned in rings around the canvas center, drift with a
//! constant velocity, pulse in size for some emotions and fade out after a
//! fixed number of ticks. The population is hard-capped.

use crate::core::classifier::EmotionLabel;
use crate::visual::surface::{Color, Point, Surface};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Life of a freshly spawned particle.
pub const INITIAL_LIFE: f64 = 100.0;

/// Life lost per simulation tick.
pub const LIFE_DECAY: f64 = 0.5;

/// Population above which the oldest particles are evicted.
pub const MAX_PARTICLES: usize = 200;

/// Population kept after an eviction.
pub const RETAINED_PARTICLES: usize = 150;

/// Chance that a render tick spawns a ring.
pub const SPAWN_PROBABILITY: f64 = 0.1;

/// Display color for an emotion.
pub fn emotion_color(emotion: EmotionLabel) -> Color {
    match emotion {
        EmotionLabel::Stress => Color::rgb(0xff, 0x44, 0x44),
        EmotionLabel::Calm => Color::rgb(0x44, 0xff, 0x88),
        EmotionLabel::Flow => Color::rgb(0x44, 0x88, 0xff),
        EmotionLabel::Focus => Color::rgb(0xff, 0x88, 0x44),
        EmotionLabel::Excitement => Color::rgb(0xff, 0x44, 0xff),
        EmotionLabel::Neutral => Color::rgb(0x88, 0x88, 0x88),
    }
}

/// Number of particles in one spawned ring.
pub fn ring_size(emotion: EmotionLabel) -> usize {
    if emotion == EmotionLabel::Stress {
        8
    } else {
        3
    }
}

/// Distance of a spawned ring from the canvas center.
pub fn ring_radius(emotion: EmotionLabel) -> f64 {
    if emotion == EmotionLabel::Focus {
        50.0
    } else {
        100.0
    }
}

/// Size oscillation for the current emotion at session time `t`.
pub fn pulse(emotion: EmotionLabel, t: Duration) -> f64 {
    let ms = t.as_secs_f64() * 1000.0;
    match emotion {
        EmotionLabel::Calm => (ms / 500.0).sin() * 2.0,
        EmotionLabel::Stress => (ms / 100.0).sin() * 5.0,
        _ => 0.0,
    }
}

/// A single animated dot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub position: Point,
    pub origin: Point,
    /// Pixels per tick
    pub velocity: Point,
    pub color: Color,
    pub size: f64,
    pub life: f64,
    /// Emotion in force when the particle was spawned
    pub emotion: EmotionLabel,
    pub pulse: f64,
}

impl Particle {
    /// Spawn at `position` with a random drift in [-1, 1] per axis and a size in [2, 6].
    pub fn spawn<R: Rng>(position: Point, emotion: EmotionLabel, rng: &mut R) -> Self {
        Self {
            position,
            origin: position,
            velocity: Point::new(rng.gen_range(-1.0..=1.0), rng.gen_range(-1.0..=1.0)),
            color: emotion_color(emotion),
            size: rng.gen_range(2.0..=6.0),
            life: INITIAL_LIFE,
            emotion,
            pulse: 0.0,
        }
    }

    /// Advance one tick under the current emotion.
    pub fn update(&mut self, emotion: EmotionLabel, t: Duration) {
        self.position.x += self.velocity.x;
        self.position.y += self.velocity.y;
        self.pulse = pulse(emotion, t);
        self.life -= LIFE_DECAY;
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }

    /// Radius actually drawn; a strong negative pulse collapses the dot.
    pub fn radius(&self) -> f64 {
        (self.size + self.pulse).max(0.0)
    }

    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        surface.fill_circle(self.position, self.radius(), self.color);
    }
}

/// The bounded, creation-ordered particle population.
#[derive(Debug, Clone, Default)]
pub struct ParticleSystem {
    particles: Vec<Particle>,
    spawned_total: u64,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles created since the system was built.
    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    /// Emit one ring around `center` unconditionally.
    ///
    /// Returns the number of particles added.
    pub fn spawn_ring<R: Rng>(&mut self, center: Point, emotion: EmotionLabel, rng: &mut R) -> usize {
        let count = ring_size(emotion);
        let radius = ring_radius(emotion);
        let step = std::f64::consts::TAU / count as f64;

        for i in 0..count {
            let angle = step * i as f64;
            let position = Point::new(
                center.x + angle.cos() * radius,
                center.y + angle.sin() * radius,
            );
            self.particles.push(Particle::spawn(position, emotion, rng));
        }
        self.spawned_total += count as u64;
        self.maintain();
        count
    }

    /// Spawn a ring with [`SPAWN_PROBABILITY`].
    pub fn maybe_spawn<R: Rng>(&mut self, center: Point, emotion: EmotionLabel, rng: &mut R) -> usize {
        if rng.gen_bool(SPAWN_PROBABILITY) {
            self.spawn_ring(center, emotion, rng)
        } else {
            0
        }
    }

    /// Advance and draw every particle in creation order, then drop the dead
    /// and enforce the cap.
    ///
    /// Returns the number of particles drawn, including those that died on
    /// this tick.
    pub fn update_and_draw<S: Surface + ?Sized>(
        &mut self,
        emotion: EmotionLabel,
        t: Duration,
        surface: &mut S,
    ) -> usize {
        for particle in &mut self.particles {
            particle.update(emotion, t);
            particle.draw(surface);
        }
        let drawn = self.particles.len();
        self.maintain();
        drawn
    }

    /// Drop dead particles; past the cap keep only the most recent ones.
    fn maintain(&mut self) {
        self.particles.retain(Particle::is_alive);
        if self.particles.len() > MAX_PARTICLES {
            let excess = self.particles.len() - RETAINED_PARTICLES;
            self.particles.drain(..excess);
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }
}
