//! Session-scoped pipeline state.
//!
//! The engine owns everything a session mutates: both estimators, the
//! latest readings, the particle population, the raster and the RNG. It is
//! driven one call at a time and never blocks, so it can be exercised
//! directly in tests without a runtime.

use crate::collector::types::SensorEvent;
use crate::config::Config;
use crate::core::{
    EmotionLabel, MouseMetrics, PointerEstimator, Readings, TypingEstimator, TypingMetrics,
};
use crate::heart::SourceKind;
use crate::transparency::SharedTransparencyLog;
use crate::visual::{render_frame, FrameReport, ParticleSystem, Raster, Surface};
use crossbeam_channel::{Receiver, Sender};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::watch;

/// A change pushed to the session observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SessionUpdate {
    HeartRate(f64),
    Typing(TypingMetrics),
    Mouse(MouseMetrics),
    Emotion(EmotionLabel),
}

/// The most recently committed state, readable at any time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveState {
    pub readings: Readings,
    pub emotion: EmotionLabel,
    pub particle_count: usize,
    /// Present while the session is active
    pub heart_rate_source: Option<SourceKind>,
}

impl Default for LiveState {
    fn default() -> Self {
        let readings = Readings::default();
        Self {
            readings,
            emotion: readings.emotion(),
            particle_count: 0,
            heart_rate_source: None,
        }
    }
}

/// Pipeline state for one session.
pub struct Engine {
    typing: TypingEstimator,
    pointer: PointerEstimator,
    readings: Readings,
    emotion: EmotionLabel,
    particles: ParticleSystem,
    raster: Raster,
    rng: StdRng,
    updates: Sender<SessionUpdate>,
    live: watch::Sender<LiveState>,
    log: SharedTransparencyLog,
}

impl Engine {
    pub fn new(
        config: &Config,
        updates: Sender<SessionUpdate>,
        live: watch::Sender<LiveState>,
        log: SharedTransparencyLog,
    ) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let readings = Readings::default();

        Self {
            typing: TypingEstimator::new(),
            pointer: PointerEstimator::new(),
            readings,
            emotion: readings.emotion(),
            particles: ParticleSystem::new(),
            raster: Raster::new(config.canvas.width, config.canvas.height),
            rng,
            updates,
            live,
            log,
        }
    }

    pub fn readings(&self) -> &Readings {
        &self.readings
    }

    pub fn emotion(&self) -> EmotionLabel {
        self.emotion
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.particles
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Fold one input event into the matching estimator.
    pub fn handle_event(&mut self, event: &SensorEvent) {
        match event {
            SensorEvent::Keyboard(key) => {
                self.log.record_keyboard_event();
                if let Some(typing) = self.typing.record(key) {
                    self.readings.typing = typing;
                    self.publish(SessionUpdate::Typing(typing));
                    self.commit();
                }
            }
            SensorEvent::Pointer(pointer) => {
                self.log.record_pointer_event();
                if let Some(mouse) = self.pointer.record(pointer) {
                    self.readings.mouse = mouse;
                    self.publish(SessionUpdate::Mouse(mouse));
                    self.commit();
                }
            }
        }
    }

    /// Apply every event queued at call time, in delivery order.
    ///
    /// Returns the number of events applied.
    pub fn drain(&mut self, input: &Receiver<SensorEvent>) -> usize {
        let pending = input.len();
        let mut applied = 0;
        for event in input.try_iter().take(pending) {
            self.handle_event(&event);
            applied += 1;
        }
        applied
    }

    pub fn record_heart_rate(&mut self, rate: f64) {
        self.log.record_heart_sample();
        self.readings.heart_rate = rate;
        self.publish(SessionUpdate::HeartRate(rate));
        self.commit();
    }

    /// Paint one frame onto the engine's own raster.
    pub fn render(&mut self, t: Duration) -> FrameReport {
        let report = render_frame(
            &mut self.raster,
            &mut self.particles,
            self.emotion,
            t,
            true,
            &mut self.rng,
        );
        self.after_frame(report);
        report
    }

    /// Paint one frame onto another surface, sharing the particle population.
    pub fn render_onto<S: Surface + ?Sized>(&mut self, surface: &mut S, t: Duration) -> FrameReport {
        let report = render_frame(
            surface,
            &mut self.particles,
            self.emotion,
            t,
            true,
            &mut self.rng,
        );
        self.after_frame(report);
        report
    }

    /// Mark which heart rate source is feeding the session.
    pub fn set_heart_rate_source(&mut self, source: Option<SourceKind>) {
        self.live.send_modify(|live| live.heart_rate_source = source);
    }

    fn after_frame(&mut self, report: FrameReport) {
        self.log.record_frame();
        if report.spawned > 0 {
            self.log.record_particles_spawned(report.spawned as u64);
            tracing::trace!(spawned = report.spawned, emotion = %self.emotion, "particle ring");
        }
        let count = self.particles.len();
        self.live.send_modify(|live| live.particle_count = count);
    }

    /// Reclassify and expose the latest readings.
    fn commit(&mut self) {
        let emotion = self.readings.emotion();
        if emotion != self.emotion {
            tracing::debug!(from = %self.emotion, to = %emotion, "emotion changed");
            self.emotion = emotion;
            self.publish(SessionUpdate::Emotion(emotion));
        }

        let readings = self.readings;
        self.live.send_modify(|live| {
            live.readings = readings;
            live.emotion = emotion;
        });
    }

    fn publish(&self, update: SessionUpdate) {
        // Nobody listening is fine.
        let _ = self.updates.try_send(update);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::types::{KeyboardEvent, PointerEvent};
    use crate::core::Rhythm;
    use crate::transparency::create_shared_log;
    use crate::visual::DrawList;
    use chrono::{Duration as ChronoDuration, Utc};
    use crossbeam_channel::unbounded;
    use pretty_assertions::assert_eq;

    struct Harness {
        engine: Engine,
        updates: Receiver<SessionUpdate>,
        live: watch::Receiver<LiveState>,
        log: SharedTransparencyLog,
    }

    fn harness() -> Harness {
        let config = Config {
            seed: Some(99),
            ..Config::default()
        };
        let (tx, updates) = unbounded();
        let (live_tx, live) = watch::channel(LiveState::default());
        let log = create_shared_log();
        Harness {
            engine: Engine::new(&config, tx, live_tx, log.clone()),
            updates,
            live,
            log,
        }
    }

    fn steady_keys(count: i64, interval_ms: i64) -> Vec<SensorEvent> {
        let start = Utc::now();
        (0..count)
            .map(|i| KeyboardEvent::at(start + ChronoDuration::milliseconds(i * interval_ms)).into())
            .collect()
    }

    #[test]
    fn test_first_keystroke_publishes_nothing() {
        let mut h = harness();
        h.engine.handle_event(&steady_keys(1, 100)[0]);

        assert!(h.updates.try_recv().is_err());
        assert_eq!(h.engine.readings().typing, TypingMetrics::default());
        assert_eq!(h.log.stats().keyboard_events, 1);
    }

    #[test]
    fn test_typing_update_is_pushed() {
        let mut h = harness();
        for event in steady_keys(3, 120) {
            h.engine.handle_event(&event);
        }

        let updates: Vec<SessionUpdate> = h.updates.try_iter().collect();
        let typing: Vec<_> = updates
            .iter()
            .filter_map(|u| match u {
                SessionUpdate::Typing(t) => Some(*t),
                _ => None,
            })
            .collect();
        assert_eq!(typing.len(), 2);
        assert_eq!(typing[1].words_per_minute, 100);
        assert_eq!(typing[1].rhythm, Rhythm::Steady);
    }

    #[test]
    fn test_emotion_change_is_pushed_and_visible() {
        let mut h = harness();

        // Slow steady pulse, smooth pointer, light typing: calm.
        h.engine.record_heart_rate(60.0);
        let start = Utc::now();
        for i in 0..5 {
            let t = start + ChronoDuration::milliseconds(i * 16);
            h.engine
                .handle_event(&PointerEvent::at(i as f64 * 4.0, 0.0, t).into());
        }
        for event in steady_keys(3, 500) {
            h.engine.handle_event(&event);
        }

        assert_eq!(h.engine.emotion(), EmotionLabel::Calm);
        assert!(h
            .updates
            .try_iter()
            .any(|u| u == SessionUpdate::Emotion(EmotionLabel::Calm)));

        let live = *h.live.borrow();
        assert_eq!(live.emotion, EmotionLabel::Calm);
        assert_eq!(live.readings.heart_rate, 60.0);
    }

    #[test]
    fn test_drain_applies_in_order() {
        let mut h = harness();
        let (tx, rx) = unbounded();
        for event in steady_keys(4, 200) {
            tx.send(event).unwrap();
        }

        assert_eq!(h.engine.drain(&rx), 4);
        assert_eq!(h.engine.drain(&rx), 0);
        assert_eq!(h.engine.readings().typing.words_per_minute, 60);
    }

    #[test]
    fn test_render_tracks_particles_and_frames() {
        let mut h = harness();
        let mut list = DrawList::new(800.0, 400.0);
        let mut spawned = 0;
        for frame in 0..200u64 {
            spawned += h
                .engine
                .render_onto(&mut list, Duration::from_millis(frame * 16))
                .spawned;
        }

        let stats = h.log.stats();
        assert_eq!(stats.frames_rendered, 200);
        assert_eq!(stats.particles_spawned, spawned as u64);
        assert_eq!(h.live.borrow().particle_count, h.engine.particles().len());
    }

    #[test]
    fn test_render_on_raster() {
        let mut h = harness();
        let report = h.engine.render(Duration::ZERO);
        assert!(!report.flow_ring);
        assert_eq!(h.engine.raster().dimensions(), (800, 400));
    }
}
