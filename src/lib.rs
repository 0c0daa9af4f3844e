//! Biometric Art - turns typing rhythm, pointer motion and heart rate into
//! a live particle visualization.
//!
//! Input timing is folded into rolling statistics, combined with a heart
//! rate signal, classified into one of six emotional states, and the state
//! drives a particle field painted every frame.
//!
//! # Capture Guarantees
//!
//! - **No key content**: only the time of each keystroke is used
//! - **Short-lived positions**: the last 10 pointer positions, nothing older
//! - **No camera frames kept**: a capture device only yields a rate
//! - **Transparency**: every session keeps auditable capture counters
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Session                              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐        │
//! │  │  Collector  │──▶│ Estimators  │──▶│ Classifier  │        │
//! │  │ (key/mouse) │   │ (windows)   │   │  (6 labels) │        │
//! │  └─────────────┘   └─────────────┘   └─────────────┘        │
//! │                           ▲                 │                │
//! │  ┌─────────────┐          │                 ▼                │
//! │  │ Heart rate  │──────────┘          ┌─────────────┐        │
//! │  │(device/synth)│                    │  Particles  │        │
//! │  └─────────────┘                     │  + Render   │        │
//! │         │                            └─────────────┘        │
//! │         ▼                                   │                │
//! │  ┌─────────────┐                            ▼                │
//! │  │Transparency │                     ┌─────────────┐        │
//! │  │    Log      │                     │   Surface   │        │
//! │  └─────────────┘                     └─────────────┘        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use biometric_art::{heart::NoCaptureDevice, Config, KeyboardEvent, Session};
//!
//! # async fn demo() -> Result<(), biometric_art::SessionError> {
//! let mut session = Session::new(Config::default(), Arc::new(NoCaptureDevice))?;
//! let input = session.input_sender();
//!
//! session.activate().await;
//! let _ = input.send(KeyboardEvent::new().into());
//! println!("{}", session.emotion());
//! session.deactivate().await?;
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod core;
pub mod heart;
pub mod session;
pub mod transparency;
pub mod visual;

// Re-export key types at crate root for convenience
pub use collector::{
    Collector, CollectorConfig, CollectorError, KeyboardEvent, PointerEvent, SensorEvent,
};
pub use config::{Config, ConfigError};
pub use core::{
    classify, EmotionLabel, MouseMetrics, Readings, Rhythm, StateSnapshot, TypingMetrics,
};
pub use heart::{HeartRateSource, SourceKind};
pub use session::{Session, SessionError, SessionUpdate};
pub use transparency::{SharedTransparencyLog, TransparencyLog, TransparencyStats};
pub use visual::{Raster, Surface};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Capture declaration that can be displayed to users.
pub const CAPTURE_DECLARATION: &str = r#"
╔══════════════════════════════════════════════════════════════════╗
║              BIOMETRIC ART - CAPTURE DECLARATION                 ║
╠══════════════════════════════════════════════════════════════════╣
║                                                                  ║
║  This session turns how you type and move into moving color.     ║
║                                                                  ║
║  ✓ WHAT WE USE:                                                  ║
║    • When keys are pressed (timing only)                         ║
║    • The last few pointer positions (speed and smoothness)       ║
║    • Your heart rate, from a camera or a simulation              ║
║                                                                  ║
║  ✗ WHAT WE NEVER KEEP:                                           ║
║    • Which keys you press (no passwords, messages, etc.)         ║
║    • Camera frames                                               ║
║    • Anything on disk, unless you export it                      ║
║                                                                  ║
║  Press Ctrl+C to stop. A capture summary is printed on exit.     ║
║                                                                  ║
╚══════════════════════════════════════════════════════════════════╝
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_declaration_contents() {
        assert!(CAPTURE_DECLARATION.contains("CAPTURE DECLARATION"));
        assert!(CAPTURE_DECLARATION.contains("NEVER KEEP"));
        assert!(CAPTURE_DECLARATION.contains("keys you press"));
    }
}
