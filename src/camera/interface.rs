use crate::error::CameraError;
use crate::frame::FrameData;
use async_trait::async_trait;

/// Platform capability that grants access to a camera
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Request video-only access to the camera.
    ///
    /// Fails with [`CameraError::PermissionDenied`] or
    /// [`CameraError::DeviceNotFound`] when the platform refuses, and with
    /// another [`CameraError`] for any other platform failure.
    async fn get_user_media(&self) -> Result<Box<dyn MediaStream>, CameraError>;
}

/// Live, revocable camera tracks handed out by [`MediaDevices`]
#[async_trait]
pub trait MediaStream: Send + Sync {
    /// Identifier used in logs
    fn id(&self) -> &str;

    /// Number of live tracks held by this stream
    fn track_count(&self) -> usize;

    /// Pull the current frame at the stream's native resolution
    async fn current_frame(&self) -> Result<FrameData, CameraError>;

    /// Stop every track. Consumes the handle so it cannot be reused.
    fn stop(self: Box<Self>);
}
