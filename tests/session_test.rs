//! Integration tests for the session lifecycle

use biometric_art::heart::{CaptureDevice, NoCaptureDevice, SimulatedCamera};
use biometric_art::{
    Config, EmotionLabel, KeyboardEvent, PointerEvent, Rhythm, Session, SessionUpdate, SourceKind,
};
use chrono::{Duration as ChronoDuration, Utc};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn seeded_session(device: Arc<dyn CaptureDevice>) -> Session {
    let config = Config {
        seed: Some(2024),
        ..Config::default()
    };
    Session::new(config, device).expect("valid config")
}

#[tokio::test(start_paused = true)]
async fn test_deactivate_stops_everything() {
    let camera = Arc::new(SimulatedCamera::new(Some(3)));
    let mut session = seeded_session(camera.clone());
    let updates = session.updates();

    assert_eq!(session.activate().await, SourceKind::Device);
    assert_eq!(camera.open_streams(), 1);

    tokio::time::sleep(Duration::from_millis(1250)).await;

    let stats = session.log().stats();
    assert_eq!(stats.heart_samples, 2);
    assert!(stats.frames_rendered > 0);
    let pushed: Vec<SessionUpdate> = updates.try_iter().collect();
    assert!(pushed
        .iter()
        .any(|u| matches!(u, SessionUpdate::HeartRate(_))));

    session.deactivate().await.unwrap();
    let _ = updates.try_iter().count();
    assert!(!session.is_active());
    assert_eq!(camera.open_streams(), 0);

    let frames = session.log().stats().frames_rendered;
    let samples = session.log().stats().heart_samples;
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert!(updates.try_recv().is_err());
    assert_eq!(session.log().stats().frames_rendered, frames);
    assert_eq!(session.log().stats().heart_samples, samples);
}

#[tokio::test(start_paused = true)]
async fn test_deactivate_is_harmless_when_inactive() {
    let camera = Arc::new(SimulatedCamera::new(None));
    let mut session = seeded_session(camera.clone());

    session.deactivate().await.unwrap();
    session.set_active(false).await.unwrap();
    assert_eq!(camera.open_streams(), 0);

    session.activate().await;
    session.deactivate().await.unwrap();
    session.deactivate().await.unwrap();
    assert_eq!(camera.open_streams(), 0);
    assert_eq!(session.log().stats().activations, 1);
}

#[tokio::test(start_paused = true)]
async fn test_falls_back_to_synthetic() {
    let mut session = seeded_session(Arc::new(NoCaptureDevice));
    assert_eq!(session.activate().await, SourceKind::Synthetic);
    assert_eq!(session.source_kind(), Some(SourceKind::Synthetic));

    tokio::time::sleep(Duration::from_millis(600)).await;
    let rate = session.heart_rate();
    assert!((50.0..=120.0).contains(&rate));
    session.deactivate().await.unwrap();

    let camera = Arc::new(SimulatedCamera::denied());
    let mut session = seeded_session(camera.clone());
    assert_eq!(session.activate().await, SourceKind::Synthetic);
    assert_eq!(camera.open_streams(), 0);
    session.deactivate().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_injected_input_produces_metrics() {
    let mut session = seeded_session(Arc::new(NoCaptureDevice));
    let input = session.input_sender();
    let updates = session.updates();
    session.activate().await;

    let start = Utc::now();
    for i in 0..3 {
        let at = start + ChronoDuration::milliseconds(i * 120);
        input.send(KeyboardEvent::at(at).into()).unwrap();
    }
    for i in 0..4 {
        let at = start + ChronoDuration::milliseconds(i * 16);
        input
            .send(PointerEvent::at(i as f64 * 80.0, 0.0, at).into())
            .unwrap();
    }

    tokio::time::sleep(Duration::from_millis(50)).await;

    let readings = session.readings();
    assert_eq!(readings.typing.words_per_minute, 100);
    assert_eq!(readings.typing.rhythm, Rhythm::Steady);
    assert_eq!(readings.mouse.speed, 5.0);
    assert_eq!(readings.mouse.smoothness, 1.0);

    let typing_updates = updates
        .try_iter()
        .filter(|u| matches!(u, SessionUpdate::Typing(_)))
        .count();
    assert_eq!(typing_updates, 2);

    let stats = session.log().stats();
    assert_eq!(stats.keyboard_events, 3);
    assert_eq!(stats.pointer_events, 4);

    session.deactivate().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_input_queued_while_inactive_is_discarded() {
    let mut session = seeded_session(Arc::new(NoCaptureDevice));
    let input = session.input_sender();

    for _ in 0..5 {
        input.send(KeyboardEvent::new().into()).unwrap();
    }

    session.activate().await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    session.deactivate().await.unwrap();

    assert_eq!(session.log().stats().keyboard_events, 0);
}

#[tokio::test(start_paused = true)]
async fn test_particles_survive_reactivation() {
    let mut session = seeded_session(Arc::new(NoCaptureDevice));

    session.activate().await;
    tokio::time::sleep(Duration::from_secs(2)).await;
    session.deactivate().await.unwrap();

    let paused = session.snapshot();
    assert!(paused.particle_count > 0);
    assert!(paused.particle_count <= 200);
    assert!(session.raster().is_some());

    session.activate().await;
    assert_eq!(session.snapshot().particle_count, paused.particle_count);
    session.deactivate().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_snapshot_reflects_session() {
    let mut session = seeded_session(Arc::new(NoCaptureDevice));
    session.activate().await;

    let snapshot = session.snapshot();
    assert_eq!(snapshot.session_id, session.session_id().to_string());
    assert_eq!(snapshot.heart_rate_source.as_deref(), Some("synthetic"));
    assert_eq!(snapshot.emotion, EmotionLabel::Neutral);

    session.deactivate().await.unwrap();
}
