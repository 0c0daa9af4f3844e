//! Session lifecycle.
//!
//! A [`Session`] owns the pipeline for one user. While inactive it holds the
//! [`Engine`] directly. Activation picks a heart rate source and moves the
//! engine into a driver task that multiplexes the heart rate, frame and
//! input-poll intervals. Deactivation signals the task, waits for it and
//! takes the engine back, so metrics and particles survive a pause.

pub mod engine;

pub use engine::{Engine, LiveState, SessionUpdate};

use crate::collector::types::SensorEvent;
use crate::config::{Config, ConfigError};
use crate::core::{EmotionLabel, Readings, SnapshotBuilder, StateSnapshot};
use crate::heart::{self, CaptureDevice, HeartRateSource, SourceKind};
use crate::transparency::{create_shared_log, SharedTransparencyLog};
use crate::visual::Raster;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};

/// Capacity of the input event queue.
pub const INPUT_CAPACITY: usize = 10_000;

/// Capacity of the push update queue. Updates are dropped while it is full.
pub const UPDATE_CAPACITY: usize = 1_024;

/// Session errors.
#[derive(Debug)]
pub enum SessionError {
    Config(ConfigError),
    DriverFailed(String),
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Config(e) => write!(f, "{e}"),
            SessionError::DriverFailed(e) => write!(f, "Session driver failed: {e}"),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ConfigError> for SessionError {
    fn from(e: ConfigError) -> Self {
        SessionError::Config(e)
    }
}

/// A running driver task.
struct Driver {
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<Box<Engine>>,
    kind: SourceKind,
}

/// One user's biometric-art session.
pub struct Session {
    config: Config,
    device: Arc<dyn CaptureDevice>,
    /// Present while inactive
    engine: Option<Box<Engine>>,
    /// Present while active
    driver: Option<Driver>,
    input_tx: Sender<SensorEvent>,
    input_rx: Receiver<SensorEvent>,
    updates_tx: Sender<SessionUpdate>,
    updates_rx: Receiver<SessionUpdate>,
    live_tx: watch::Sender<LiveState>,
    live: watch::Receiver<LiveState>,
    snapshots: SnapshotBuilder,
    log: SharedTransparencyLog,
}

impl Session {
    pub fn new(config: Config, device: Arc<dyn CaptureDevice>) -> Result<Self, SessionError> {
        config.validate()?;

        let (input_tx, input_rx) = bounded(INPUT_CAPACITY);
        let (updates_tx, updates_rx) = bounded(UPDATE_CAPACITY);
        let (live_tx, live) = watch::channel(LiveState::default());
        let log = create_shared_log();
        let engine = Engine::new(&config, updates_tx.clone(), live_tx.clone(), log.clone());

        Ok(Self {
            config,
            device,
            engine: Some(Box::new(engine)),
            driver: None,
            input_tx,
            input_rx,
            updates_tx,
            updates_rx,
            live_tx,
            live,
            snapshots: SnapshotBuilder::new(),
            log,
        })
    }

    /// Sender for keyboard and pointer events.
    ///
    /// Events sent while the session is inactive are discarded on the next
    /// activation.
    pub fn input_sender(&self) -> Sender<SensorEvent> {
        self.input_tx.clone()
    }

    /// Receiver for pushed metric and label changes.
    pub fn updates(&self) -> Receiver<SessionUpdate> {
        self.updates_rx.clone()
    }

    /// Receiver that always holds the latest committed state.
    pub fn watch(&self) -> watch::Receiver<LiveState> {
        self.live.clone()
    }

    pub fn readings(&self) -> Readings {
        self.live.borrow().readings
    }

    pub fn heart_rate(&self) -> f64 {
        self.readings().heart_rate
    }

    pub fn emotion(&self) -> EmotionLabel {
        self.live.borrow().emotion
    }

    pub fn session_id(&self) -> uuid::Uuid {
        self.snapshots.session_id()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        let live = *self.live.borrow();
        self.snapshots.build(
            &live.readings,
            live.heart_rate_source.map(|kind| kind.as_str()),
            live.particle_count,
        )
    }

    /// The current snapshot as a single JSON line.
    pub fn snapshot_json(&self) -> String {
        let live = *self.live.borrow();
        self.snapshots.build_json(
            &live.readings,
            live.heart_rate_source.map(|kind| kind.as_str()),
            live.particle_count,
        )
    }

    pub fn log(&self) -> &SharedTransparencyLog {
        &self.log
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.driver.is_some()
    }

    /// The heart rate source feeding the session, if active.
    pub fn source_kind(&self) -> Option<SourceKind> {
        self.driver.as_ref().map(|driver| driver.kind)
    }

    /// The painted canvas. Only reachable while inactive.
    pub fn raster(&self) -> Option<&Raster> {
        self.engine.as_deref().map(Engine::raster)
    }

    /// Start capture and rendering. Activating twice is a no-op.
    pub async fn activate(&mut self) -> SourceKind {
        if let Some(driver) = &self.driver {
            return driver.kind;
        }

        let discarded = self.input_rx.try_iter().count();
        if discarded > 0 {
            tracing::debug!(discarded, "dropped input queued while inactive");
        }

        let source = heart::acquire(self.device.as_ref(), self.config.seed);
        let kind = source.kind();

        let mut engine = self
            .engine
            .take()
            .unwrap_or_else(|| Box::new(self.fresh_engine()));
        engine.set_heart_rate_source(Some(kind));

        let (shutdown, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(drive(
            engine,
            source,
            self.input_rx.clone(),
            shutdown_rx,
            self.config.frame_interval,
            self.config.input_poll_interval,
        ));

        self.log.record_activation();
        tracing::info!(session = %self.session_id(), source = %kind, "session activated");

        self.driver = Some(Driver {
            shutdown,
            handle,
            kind,
        });
        kind
    }

    /// Stop capture and rendering and release the heart rate source.
    ///
    /// Harmless when already inactive.
    pub async fn deactivate(&mut self) -> Result<(), SessionError> {
        let Some(driver) = self.driver.take() else {
            return Ok(());
        };

        let _ = driver.shutdown.send(());
        let result = match driver.handle.await {
            Ok(engine) => {
                self.engine = Some(engine);
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, "session driver did not finish cleanly");
                self.engine = Some(Box::new(self.fresh_engine()));
                Err(SessionError::DriverFailed(e.to_string()))
            }
        };

        if let Some(engine) = self.engine.as_mut() {
            engine.set_heart_rate_source(None);
        }
        tracing::info!(session = %self.session_id(), "session deactivated");
        result
    }

    /// Drive the activation gate from a boolean.
    pub async fn set_active(&mut self, active: bool) -> Result<(), SessionError> {
        if active {
            self.activate().await;
            Ok(())
        } else {
            self.deactivate().await
        }
    }

    fn fresh_engine(&self) -> Engine {
        Engine::new(
            &self.config,
            self.updates_tx.clone(),
            self.live_tx.clone(),
            self.log.clone(),
        )
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            // The task releases its source on the way out.
            let _ = driver.shutdown.send(());
        }
    }
}

/// Driver loop for one activation.
///
/// Input is drained before every heart sample and every frame so each step
/// sees the latest committed metrics.
async fn drive(
    mut engine: Box<Engine>,
    mut source: Box<dyn HeartRateSource>,
    input: Receiver<SensorEvent>,
    mut shutdown: oneshot::Receiver<()>,
    frame_interval: Duration,
    poll_interval: Duration,
) -> Box<Engine> {
    let started = Instant::now();

    let heart_period = source.interval();
    let mut heart_ticks = interval_at(started + heart_period, heart_period);
    let mut frames = interval(frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut polls = interval(poll_interval);
    polls.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => break,
            _ = heart_ticks.tick() => {
                engine.drain(&input);
                if let Some(rate) = source.next_rate(started.elapsed()) {
                    engine.record_heart_rate(rate);
                }
            }
            _ = frames.tick() => {
                engine.drain(&input);
                engine.render(started.elapsed());
            }
            _ = polls.tick() => {
                engine.drain(&input);
            }
        }
    }

    source.release();
    engine
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heart::{NoCaptureDevice, SimulatedCamera};

    fn session(device: Arc<dyn CaptureDevice>) -> Session {
        let config = Config {
            seed: Some(7),
            ..Config::default()
        };
        Session::new(config, device).unwrap()
    }

    #[test]
    fn test_new_session_is_idle_with_defaults() {
        let session = session(Arc::new(NoCaptureDevice));
        assert!(!session.is_active());
        assert_eq!(session.heart_rate(), 72.0);
        assert_eq!(session.emotion(), EmotionLabel::Neutral);
        assert!(session.raster().is_some());
        assert!(session.snapshot().heart_rate_source.is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = Config {
            frame_interval: Duration::ZERO,
            ..Config::default()
        };
        assert!(matches!(
            Session::new(config, Arc::new(NoCaptureDevice)),
            Err(SessionError::Config(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_activate_is_idempotent() {
        let camera = Arc::new(SimulatedCamera::new(Some(1)));
        let mut session = session(camera.clone());

        assert_eq!(session.activate().await, SourceKind::Device);
        assert_eq!(session.activate().await, SourceKind::Device);
        assert_eq!(camera.open_streams(), 1);
        assert_eq!(session.log().stats().activations, 1);

        session.deactivate().await.unwrap();
        assert_eq!(camera.open_streams(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_snapshot_reports_source_while_active() {
        let mut session = session(Arc::new(NoCaptureDevice));
        session.set_active(true).await.unwrap();
        assert_eq!(
            session.snapshot().heart_rate_source.as_deref(),
            Some("synthetic")
        );
        assert!(session.raster().is_none());

        session.set_active(false).await.unwrap();
        assert!(session.snapshot().heart_rate_source.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reactivation_keeps_engine() {
        let mut session = session(Arc::new(NoCaptureDevice));
        session.activate().await;
        tokio::time::sleep(Duration::from_secs(2)).await;
        session.deactivate().await.unwrap();
        let frames = session.log().stats().frames_rendered;

        session.activate().await;
        assert!(session.raster().is_none());
        session.deactivate().await.unwrap();
        assert!(session.raster().is_some());
        assert!(session.log().stats().frames_rendered >= frames);
    }

    #[test]
    fn test_snapshot_json_line() {
        let session = session(Arc::new(NoCaptureDevice));
        let line = session.snapshot_json();
        assert!(!line.contains('\n'));

        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["session_id"], session.session_id().to_string());
        assert_eq!(value["emotion"], "neutral");
    }
}
