use super::types::{SessionCommand, ShutdownReason};
use crate::camera::MediaDevicesBuilder;
use crate::config::FruitcamConfig;
use crate::error::Result;
use crate::inference::HttpInferenceClient;
use crate::narrator;
use crate::session::{CameraSession, CameraSessionBuilder, CaptureOutcome, OpenOutcome};
use crate::ui::TerminalSurface;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Wires the camera session to its collaborators and feeds it user commands
pub struct FruitcamApp {
    pub(super) session: Arc<CameraSession>,
    pub(super) terminal: Option<Arc<TerminalSurface>>,
}

impl FruitcamApp {
    /// Build every collaborator from configuration
    pub fn new(config: &FruitcamConfig, mock_camera: bool) -> Result<Self> {
        let devices = MediaDevicesBuilder::new()
            .config(config.camera.clone())
            .mock(mock_camera)
            .build()?;
        let inference = HttpInferenceClient::new(&config.inference)?;
        let terminal = Arc::new(TerminalSurface::new());

        let session = CameraSessionBuilder::new()
            .devices(devices)
            .inference(Arc::new(inference))
            .narrator(narrator::from_config(&config.narrator))
            .surface(terminal.clone())
            .jpeg_quality(config.camera.jpeg_quality)
            .build()?;

        info!("Fruitcam initialized");

        Ok(Self {
            session: Arc::new(session),
            terminal: Some(terminal),
        })
    }

    /// Wrap an already assembled session
    pub fn from_session(session: Arc<CameraSession>) -> Self {
        Self {
            session,
            terminal: None,
        }
    }

    pub fn session(&self) -> &Arc<CameraSession> {
        &self.session
    }

    /// Dispatch commands until the user quits, input ends, or `shutdown` fires.
    ///
    /// Captures run as their own tasks so a slow server never blocks the
    /// other controls. A pending open can be interrupted by Quit or
    /// `shutdown`; other commands sent meanwhile run once it completes. Any
    /// capture still pending at shutdown is aborted and the camera is
    /// released.
    pub async fn run_commands<F>(
        &self,
        mut commands: UnboundedReceiver<SessionCommand>,
        shutdown: F,
    ) -> ShutdownReason
    where
        F: Future<Output = ShutdownReason>,
    {
        tokio::pin!(shutdown);
        let mut captures = JoinSet::new();
        let mut deferred = VecDeque::new();
        let mut input_closed = false;

        let reason = loop {
            let command = match deferred.pop_front() {
                Some(command) => Some(command),
                None if input_closed => None,
                None => tokio::select! {
                    reason = &mut shutdown => break reason,
                    command = commands.recv() => command,
                    Some(joined) = captures.join_next(), if !captures.is_empty() => {
                        match joined {
                            Ok(outcome) => debug!("Capture finished: {:?}", outcome),
                            Err(e) => error!("Capture task failed: {}", e),
                        }
                        continue;
                    }
                },
            };

            match command {
                Some(SessionCommand::Open) => {
                    let interrupted = self
                        .open_interruptibly(
                            &mut commands,
                            shutdown.as_mut(),
                            &mut deferred,
                            &mut input_closed,
                        )
                        .await;
                    if let Some(reason) = interrupted {
                        break reason;
                    }
                }
                Some(SessionCommand::Capture) => {
                    let session = Arc::clone(&self.session);
                    captures.spawn(async move { session.capture().await });
                }
                Some(SessionCommand::Close) => {
                    self.session.close().await;
                }
                Some(SessionCommand::Quit) => break ShutdownReason::UserRequest,
                None => break ShutdownReason::InputClosed,
            }
        };

        info!("Stopping: {:?}", reason);
        captures.shutdown().await;
        self.session.release().await;

        reason
    }

    /// Wait for the camera while still listening for Quit and `shutdown`
    async fn open_interruptibly<F>(
        &self,
        commands: &mut UnboundedReceiver<SessionCommand>,
        mut shutdown: Pin<&mut F>,
        deferred: &mut VecDeque<SessionCommand>,
        input_closed: &mut bool,
    ) -> Option<ShutdownReason>
    where
        F: Future<Output = ShutdownReason>,
    {
        let opening = self.session.open();
        tokio::pin!(opening);

        loop {
            tokio::select! {
                _ = &mut opening => return None,
                reason = &mut shutdown => {
                    warn!("Camera open abandoned");
                    return Some(reason);
                }
                command = commands.recv(), if !*input_closed => match command {
                    Some(SessionCommand::Quit) => {
                        warn!("Camera open abandoned");
                        return Some(ShutdownReason::UserRequest);
                    }
                    Some(command) => deferred.push_back(command),
                    None => *input_closed = true,
                },
            }
        }
    }

    /// Open, capture one frame, release the camera. True when a label came back.
    pub async fn run_once(&self) -> bool {
        match self.session.open().await {
            OpenOutcome::Opened => {}
            OpenOutcome::AlreadyOpen => {}
            OpenOutcome::Failed(e) => {
                error!("Cannot capture: {}", e);
                return false;
            }
        }

        let outcome = self.session.capture().await;
        self.session.release().await;

        match outcome {
            CaptureOutcome::Labeled(label) => {
                println!("{}", label);
                true
            }
            other => {
                debug!("One-shot capture ended with {:?}", other);
                false
            }
        }
    }
}
