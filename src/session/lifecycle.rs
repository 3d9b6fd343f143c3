use super::messages::{
    result_status, result_utterance, ANALYZING, CAMERA_CLOSED, SAY_ANALYSIS_ERROR,
    SAY_CAMERA_ALREADY_OPEN, SAY_CAMERA_OPEN, SAY_CAMERA_UNAVAILABLE, SAY_OPEN_CAMERA_FIRST,
    STATUS_AWAITING_CAPTURE,
};
use super::types::{CaptureOutcome, CloseOutcome, OpenOutcome, SessionState};
use crate::camera::{MediaDevices, MediaStream};
use crate::capture::CapturedFrame;
use crate::error::{CameraError, FruitcamError};
use crate::frame::FrameData;
use crate::inference::InferenceClient;
use crate::narrator::Narrator;
use crate::ui::StatusSurface;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Owns one camera stream and drives capture, inference and narration.
///
/// All operations take `&self` and may be called from several tasks. The
/// stream handle sits behind an async mutex so open and close are
/// serialized; captures hold the lock only while pulling a frame, so a close
/// can proceed while an analysis is still waiting on the server.
pub struct CameraSession {
    devices: Arc<dyn MediaDevices>,
    inference: Arc<dyn InferenceClient>,
    narrator: Arc<dyn Narrator>,
    surface: Arc<dyn StatusSurface>,
    jpeg_quality: u8,
    stream: Mutex<Option<Box<dyn MediaStream>>>,
    capture_in_flight: AtomicBool,
}

/// Clears the single-flight flag when a capture finishes, however it ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CameraSession {
    pub fn new(
        devices: Arc<dyn MediaDevices>,
        inference: Arc<dyn InferenceClient>,
        narrator: Arc<dyn Narrator>,
        surface: Arc<dyn StatusSurface>,
        jpeg_quality: u8,
    ) -> Self {
        Self {
            devices,
            inference,
            narrator,
            surface,
            jpeg_quality,
            stream: Mutex::new(None),
            capture_in_flight: AtomicBool::new(false),
        }
    }

    pub async fn state(&self) -> SessionState {
        if self.stream.lock().await.is_some() {
            SessionState::Open
        } else {
            SessionState::Closed
        }
    }

    /// Whether a capture is waiting on the inference server
    pub fn is_capturing(&self) -> bool {
        self.capture_in_flight.load(Ordering::Acquire)
    }

    /// Request camera access and show the preview
    pub async fn open(&self) -> OpenOutcome {
        let mut stream = self.stream.lock().await;

        if let Some(existing) = stream.as_ref() {
            warn!("Open requested while stream {} is active", existing.id());
            self.narrate(SAY_CAMERA_ALREADY_OPEN);
            return OpenOutcome::AlreadyOpen;
        }

        match self.devices.get_user_media().await {
            Ok(granted) => {
                info!(
                    "Camera opened: stream {} with {} track(s)",
                    granted.id(),
                    granted.track_count()
                );
                *stream = Some(granted);
                self.surface.set_preview_visible(true);
                self.surface.set_status(STATUS_AWAITING_CAPTURE);
                self.narrate(SAY_CAMERA_OPEN);
                OpenOutcome::Opened
            }
            Err(e) => {
                error!("Camera error: {}", e);
                self.narrate(SAY_CAMERA_UNAVAILABLE);
                OpenOutcome::Failed(e.into())
            }
        }
    }

    /// Grab the current frame, have it classified, and announce the label
    pub async fn capture(&self) -> CaptureOutcome {
        let span = info_span!("capture", request_id = %Uuid::new_v4());
        self.capture_inner().instrument(span).await
    }

    async fn capture_inner(&self) -> CaptureOutcome {
        let guard = self.stream.lock().await;

        let Some(stream) = guard.as_ref() else {
            debug!("Capture requested with no open camera");
            self.narrate(SAY_OPEN_CAMERA_FIRST);
            return CaptureOutcome::CameraNotOpen;
        };

        if self.capture_in_flight.swap(true, Ordering::AcqRel) {
            warn!("Capture requested while a previous image is still being analyzed");
            return CaptureOutcome::Busy;
        }
        let _in_flight = InFlight(&self.capture_in_flight);

        let frame = stream.current_frame().await;
        drop(guard);

        let captured = match frame {
            Ok(frame) => self.encode(frame).await,
            Err(e) => Err(e),
        };
        let captured = match captured {
            Ok(captured) => captured,
            Err(e) => {
                error!("Frame capture error: {}", e);
                self.narrate(SAY_ANALYSIS_ERROR);
                return CaptureOutcome::Failed(e.into());
            }
        };

        let (width, height) = captured.dimensions();
        info!(
            "Captured frame {} ({}x{}, {} JPEG bytes)",
            captured.frame_id(),
            width,
            height,
            captured.encoded_len()
        );

        self.surface.set_status(ANALYZING);
        self.narrate(ANALYZING);

        let data_uri = captured.into_data_uri();
        match self.inference.predict(&data_uri).await {
            Ok(label) => {
                info!("Prediction: {}", label);
                self.surface.set_status(&result_status(&label));
                self.narrate(&result_utterance(&label));
                CaptureOutcome::Labeled(label)
            }
            Err(e) => {
                // The status line keeps the analyzing message
                error!("Prediction error: {}", e);
                self.narrate(SAY_ANALYSIS_ERROR);
                CaptureOutcome::Failed(FruitcamError::Inference(e))
            }
        }
    }

    /// Stop every track and hide the preview; no-op when already closed
    pub async fn close(&self) -> CloseOutcome {
        let outcome = self.release().await;

        if let CloseOutcome::Closed { .. } = outcome {
            self.surface.set_preview_visible(false);
            self.surface.set_status(CAMERA_CLOSED);
            self.narrate(CAMERA_CLOSED);
        }

        outcome
    }

    /// Stop every track without touching the surface or speaking.
    /// Used on shutdown so the last announcement is not cut off.
    pub async fn release(&self) -> CloseOutcome {
        let Some(stream) = self.stream.lock().await.take() else {
            debug!("Close requested with no open camera");
            return CloseOutcome::NotOpen;
        };

        let tracks_stopped = stream.track_count();
        let id = stream.id().to_string();
        stream.stop();
        info!("Camera closed: stream {} ({} track(s) stopped)", id, tracks_stopped);

        CloseOutcome::Closed { tracks_stopped }
    }

    /// Decode, rasterize and re-encode off the async workers
    async fn encode(&self, frame: FrameData) -> Result<CapturedFrame, CameraError> {
        let quality = self.jpeg_quality;
        task::spawn_blocking(move || CapturedFrame::capture(&frame, quality))
            .await
            .map_err(|e| CameraError::Encode {
                details: format!("Encoding task failed: {}", e),
            })?
    }

    fn narrate(&self, text: &str) {
        if let Err(e) = self.narrator.speak(text) {
            warn!("Narration failed: {}", e);
        }
    }
}
