use thiserror::Error;

#[derive(Error, Debug)]
pub enum FruitcamError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Camera error: {0}")]
    Camera(#[from] CameraError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Narrator error: {0}")]
    Narrator(#[from] NarratorError),

    #[error("System error: {message}")]
    System { message: String },
}

impl FruitcamError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }
}

/// Failures acquiring or reading from a camera device
#[derive(Error, Debug)]
pub enum CameraError {
    #[error("Permission denied for camera device {device}")]
    PermissionDenied { device: String },

    #[error("Camera device not found: {device}")]
    DeviceNotFound { device: String },

    #[error("Failed to open camera device {device}: {details}")]
    DeviceOpen { device: String, details: String },

    #[error("Camera configuration error: {details}")]
    Configuration { details: String },

    #[error("Capture stream error: {details}")]
    CaptureStream { details: String },

    #[error("Frame encoding error: {details}")]
    Encode { details: String },
}

/// Failures talking to the remote `/predict` endpoint
#[derive(Error, Debug)]
pub enum InferenceError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Inference server returned HTTP {code}")]
    Status { code: u16 },

    #[error("Malformed inference response: {details}")]
    Decode { details: String },

    #[error("Failed to build HTTP client: {details}")]
    Client { details: String },
}

/// Failures driving the speech engine
#[derive(Error, Debug)]
pub enum NarratorError {
    #[error("Failed to start speech command '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to cancel previous utterance: {source}")]
    Cancel {
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, FruitcamError>;
