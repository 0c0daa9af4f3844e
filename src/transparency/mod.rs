//! Transparency module.
//!
//! Tracks and exposes what a session captured, so users can see that only
//! timing and short-lived pointer positions are consumed.

pub mod log;

// Re-export commonly used types
pub use log::{create_shared_log, SharedTransparencyLog, TransparencyLog, TransparencyStats};
