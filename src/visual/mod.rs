//! Particle visualization.
//!
//! This module contains:
//! - Drawing surfaces (recorded draw lists and an RGB raster)
//! - The particle population and its spawn/update policies
//! - The per-frame render routine

pub mod particle;
pub mod raster;
pub mod render;
pub mod surface;

// Re-export commonly used types
pub use particle::{emotion_color, Particle, ParticleSystem, MAX_PARTICLES, RETAINED_PARTICLES};
pub use raster::Raster;
pub use render::{render_frame, FrameReport};
pub use surface::{Color, DrawCommand, DrawList, Point, Surface};
