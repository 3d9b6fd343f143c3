use super::*;
use crate::camera::{MediaDevices, MediaStream, MockBehavior, MockMediaDevices};
use crate::error::CameraError;
use crate::config::{FruitcamConfig, InferenceConfig};
use crate::inference::HttpInferenceClient;
use crate::narrator::{LogChannel, Speaker};
use crate::session::{CameraSessionBuilder, SessionState};
use crate::test_support::spawn_predict_server;
use crate::ui::StatusSurface;
use async_trait::async_trait;
use axum::http::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

struct NullSurface;

impl StatusSurface for NullSurface {
    fn set_status(&self, _text: &str) {}
    fn set_preview_visible(&self, _visible: bool) {}
}

/// Camera whose permission prompt takes `delay` to answer, or never answers
struct SlowCamera {
    inner: MockMediaDevices,
    delay: Option<Duration>,
}

#[async_trait]
impl MediaDevices for SlowCamera {
    async fn get_user_media(&self) -> Result<Box<dyn MediaStream>, CameraError> {
        match self.delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => std::future::pending::<()>().await,
        }
        self.inner.get_user_media().await
    }
}

fn slow_app(endpoint: &str, delay: Option<Duration>) -> (FruitcamApp, Arc<Speaker<LogChannel>>) {
    let speaker = Arc::new(Speaker::new(LogChannel::default()));
    let inference = HttpInferenceClient::new(&InferenceConfig {
        endpoint: endpoint.to_string(),
        ..FruitcamConfig::default().inference
    })
    .unwrap();

    let session = CameraSessionBuilder::new()
        .devices(Arc::new(SlowCamera {
            inner: MockMediaDevices::new(64, 48),
            delay,
        }))
        .inference(Arc::new(inference))
        .narrator(speaker.clone())
        .surface(Arc::new(NullSurface))
        .build()
        .unwrap();

    (FruitcamApp::from_session(Arc::new(session)), speaker)
}

struct Fixture {
    app: FruitcamApp,
    devices: Arc<MockMediaDevices>,
    speaker: Arc<Speaker<LogChannel>>,
}

fn fixture(endpoint: &str, behavior: MockBehavior) -> Fixture {
    let devices = Arc::new(MockMediaDevices::new(320, 240).with_behavior(behavior));
    let speaker = Arc::new(Speaker::new(LogChannel::default()));
    let inference = HttpInferenceClient::new(&InferenceConfig {
        endpoint: endpoint.to_string(),
        ..FruitcamConfig::default().inference
    })
    .unwrap();

    let session = CameraSessionBuilder::new()
        .devices(devices.clone())
        .inference(Arc::new(inference))
        .narrator(speaker.clone())
        .surface(Arc::new(NullSurface))
        .build()
        .unwrap();

    Fixture {
        app: FruitcamApp::from_session(Arc::new(session)),
        devices,
        speaker,
    }
}

async fn wait_for_utterance(speaker: &Speaker<LogChannel>, expected: &str) {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while speaker.channel().last_utterance().as_deref() != Some(expected) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert!(
        waited.is_ok(),
        "expected {:?}, last heard {:?}",
        expected,
        speaker.channel().last_utterance()
    );
}

#[tokio::test]
async fn test_commands_drive_full_flow() {
    let server = spawn_predict_server(StatusCode::OK, r#"{"result":"Fresh"}"#).await;
    let fx = fixture(&server.url, MockBehavior::Grant);
    let (tx, rx) = mpsc::unbounded_channel();

    let speaker = fx.speaker.clone();
    let driver = async move {
        tx.send(SessionCommand::Open).unwrap();
        tx.send(SessionCommand::Capture).unwrap();
        wait_for_utterance(&speaker, "The fruit is Fresh").await;
        tx.send(SessionCommand::Quit).unwrap();
        tx
    };

    let (reason, _tx) = tokio::join!(
        fx.app.run_commands(rx, std::future::pending()),
        driver
    );

    assert_eq!(reason, ShutdownReason::UserRequest);
    assert_eq!(server.requests.lock().len(), 1);
    assert_eq!(fx.devices.stats().active_streams(), 0);
    assert_eq!(fx.app.session().state().await, SessionState::Closed);
    // Quitting releases silently so the result is the last thing heard
    assert_eq!(
        fx.speaker.channel().last_utterance().as_deref(),
        Some("The fruit is Fresh")
    );
}

#[tokio::test]
async fn test_input_closed_stops_loop() {
    let fx = fixture("http://127.0.0.1:9/predict", MockBehavior::Grant);
    let (tx, rx) = mpsc::unbounded_channel();

    tx.send(SessionCommand::Open).unwrap();
    drop(tx);

    let reason = fx.app.run_commands(rx, std::future::pending()).await;

    assert_eq!(reason, ShutdownReason::InputClosed);
    assert_eq!(fx.devices.stats().requests(), 1);
    assert_eq!(fx.devices.stats().active_streams(), 0);
}

#[tokio::test]
async fn test_signal_stops_loop() {
    let fx = fixture("http://127.0.0.1:9/predict", MockBehavior::Grant);
    let (_tx, rx) = mpsc::unbounded_channel();

    let reason = fx
        .app
        .run_commands(rx, async { ShutdownReason::Signal("SIGTERM".to_string()) })
        .await;

    assert_eq!(reason, ShutdownReason::Signal("SIGTERM".to_string()));
}

#[tokio::test]
async fn test_close_command_announces() {
    let fx = fixture("http://127.0.0.1:9/predict", MockBehavior::Grant);
    let (tx, rx) = mpsc::unbounded_channel();

    tx.send(SessionCommand::Open).unwrap();
    tx.send(SessionCommand::Close).unwrap();
    drop(tx);

    fx.app.run_commands(rx, std::future::pending()).await;

    assert_eq!(fx.devices.stats().tracks_stopped(), 1);
    assert_eq!(
        fx.speaker.channel().last_utterance().as_deref(),
        Some("Camera closed.")
    );
}

#[tokio::test]
async fn test_run_once_labels_and_releases() {
    let server = spawn_predict_server(StatusCode::OK, r#"{"result":"Banana"}"#).await;
    let fx = fixture(&server.url, MockBehavior::Grant);

    assert!(fx.app.run_once().await);
    assert_eq!(fx.devices.stats().active_streams(), 0);
    assert_eq!(
        fx.speaker.channel().last_utterance().as_deref(),
        Some("The fruit is Banana")
    );
}

#[tokio::test]
async fn test_run_once_reports_server_error() {
    let server = spawn_predict_server(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
    let fx = fixture(&server.url, MockBehavior::Grant);

    assert!(!fx.app.run_once().await);
    assert_eq!(fx.devices.stats().active_streams(), 0);
}

#[tokio::test]
async fn test_run_once_without_camera() {
    let server = spawn_predict_server(StatusCode::OK, r#"{"result":"Apple"}"#).await;
    let fx = fixture(&server.url, MockBehavior::DenyPermission);

    assert!(!fx.app.run_once().await);
    assert!(server.requests.lock().is_empty());
    assert_eq!(
        fx.speaker.channel().last_utterance().as_deref(),
        Some("Unable to access camera.")
    );
}

#[test]
fn test_app_from_default_config_with_mock_camera() {
    let app = FruitcamApp::new(&FruitcamConfig::default(), true);
    assert!(app.is_ok());
}

#[tokio::test]
async fn test_quit_interrupts_stalled_open() {
    let (app, _speaker) = slow_app("http://127.0.0.1:9/predict", None);
    let (tx, rx) = mpsc::unbounded_channel();

    tx.send(SessionCommand::Open).unwrap();
    tx.send(SessionCommand::Quit).unwrap();

    let reason = tokio::time::timeout(
        Duration::from_secs(5),
        app.run_commands(rx, std::future::pending()),
    )
    .await
    .expect("quit should not wait for the camera");

    assert_eq!(reason, ShutdownReason::UserRequest);
    assert_eq!(app.session().state().await, SessionState::Closed);
}

#[tokio::test]
async fn test_signal_interrupts_stalled_open() {
    let (app, _speaker) = slow_app("http://127.0.0.1:9/predict", None);
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(SessionCommand::Open).unwrap();

    let signal = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        ShutdownReason::Signal("SIGINT".to_string())
    };
    let reason = tokio::time::timeout(Duration::from_secs(5), app.run_commands(rx, signal))
        .await
        .expect("signal should not wait for the camera");

    assert_eq!(reason, ShutdownReason::Signal("SIGINT".to_string()));
    drop(tx);
}

#[tokio::test]
async fn test_commands_during_open_run_after_it() {
    let server = spawn_predict_server(StatusCode::OK, r#"{"result":"Kiwi"}"#).await;
    let (app, speaker) = slow_app(&server.url, Some(Duration::from_millis(100)));
    let (tx, rx) = mpsc::unbounded_channel();

    let waiter = speaker.clone();
    let driver = async move {
        tx.send(SessionCommand::Open).unwrap();
        tx.send(SessionCommand::Capture).unwrap();
        wait_for_utterance(&waiter, "The fruit is Kiwi").await;
        tx.send(SessionCommand::Quit).unwrap();
        tx
    };

    let (reason, _tx) = tokio::join!(app.run_commands(rx, std::future::pending()), driver);

    assert_eq!(reason, ShutdownReason::UserRequest);
    assert_eq!(server.requests.lock().len(), 1);
}
