use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Matches the browser canvas `toDataURL` default
pub const DEFAULT_JPEG_QUALITY: u8 = 92;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FruitcamConfig {
    pub camera: CameraConfig,
    pub inference: InferenceConfig,
    pub narrator: NarratorConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CameraConfig {
    /// Camera device index (e.g., 0 for /dev/video0)
    #[serde(default = "default_camera_index")]
    pub index: u32,

    /// Requested camera resolution (width, height)
    #[serde(default = "default_camera_resolution")]
    pub resolution: (u32, u32),

    /// Frames per second
    #[serde(default = "default_camera_fps")]
    pub fps: u32,

    /// Video format (MJPG, RGB)
    #[serde(default = "default_camera_format")]
    pub format: String,

    /// JPEG quality used when encoding the captured frame (1-100)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct InferenceConfig {
    /// Full URL of the prediction endpoint
    #[serde(default = "default_inference_endpoint")]
    pub endpoint: String,

    /// Optional per-request timeout; unset means wait indefinitely
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NarratorConfig {
    /// Speak through the speech command; when false, utterances are only logged
    #[serde(default = "default_narrator_enabled")]
    pub enabled: bool,

    /// Speech synthesis program
    #[serde(default = "default_narrator_command")]
    pub command: String,

    /// Extra arguments placed before the utterance text
    #[serde(default)]
    pub args: Vec<String>,
}

impl InferenceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds.map(Duration::from_secs)
    }
}

impl FruitcamConfig {
    /// Load configuration from a specific file path
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path_str = path.as_ref().to_string_lossy();
        debug!("Loading configuration from: {}", path_str);

        let settings = Config::builder()
            .set_default("camera.index", default_camera_index())?
            .set_default(
                "camera.resolution",
                vec![default_camera_resolution().0, default_camera_resolution().1],
            )?
            .set_default("camera.fps", default_camera_fps())?
            .set_default("camera.format", default_camera_format())?
            .set_default("inference.endpoint", default_inference_endpoint())?
            .set_default("camera.jpeg_quality", default_jpeg_quality() as i64)?
            .set_default("narrator.enabled", default_narrator_enabled())?
            .set_default("narrator.command", default_narrator_command())?
            .set_default("narrator.args", Vec::<String>::new())?
            .add_source(File::with_name(&path_str).required(false))
            // FRUITCAM_INFERENCE__ENDPOINT=http://... overrides inference.endpoint
            .add_source(
                Environment::with_prefix("FRUITCAM")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        let config: FruitcamConfig = settings.try_deserialize()?;

        info!("Configuration loaded successfully");
        debug!("Final configuration: {:#?}", config);

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.camera.resolution.0 == 0 || self.camera.resolution.1 == 0 {
            return Err(ConfigError::Message(
                "Camera resolution must be greater than 0".to_string(),
            ));
        }

        if self.camera.fps == 0 {
            return Err(ConfigError::Message(
                "Camera fps must be greater than 0".to_string(),
            ));
        }

        if !matches!(self.camera.format.as_str(), "MJPG" | "RGB") {
            return Err(ConfigError::Message(format!(
                "Unsupported camera format '{}', expected MJPG or RGB",
                self.camera.format
            )));
        }

        let endpoint = self.inference.endpoint.trim();
        if endpoint.is_empty() {
            return Err(ConfigError::Message(
                "Inference endpoint must not be empty".to_string(),
            ));
        }

        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::Message(format!(
                "Inference endpoint must be an http(s) URL, got '{}'",
                endpoint
            )));
        }

        if self.inference.timeout_seconds == Some(0) {
            return Err(ConfigError::Message(
                "Inference timeout must be greater than 0 when set".to_string(),
            ));
        }

        if !(1..=100).contains(&self.camera.jpeg_quality) {
            return Err(ConfigError::Message(
                "JPEG quality must be between 1 and 100".to_string(),
            ));
        }

        if self.narrator.enabled && self.narrator.command.trim().is_empty() {
            return Err(ConfigError::Message(
                "Narrator command must not be empty when narration is enabled".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for FruitcamConfig {
    fn default() -> Self {
        Self {
            camera: CameraConfig {
                index: default_camera_index(),
                resolution: default_camera_resolution(),
                fps: default_camera_fps(),
                format: default_camera_format(),
                jpeg_quality: default_jpeg_quality(),
            },
            inference: InferenceConfig {
                endpoint: default_inference_endpoint(),
                timeout_seconds: None,
            },
            narrator: NarratorConfig {
                enabled: default_narrator_enabled(),
                command: default_narrator_command(),
                args: Vec::new(),
            },
        }
    }
}

// Default value functions
fn default_camera_index() -> u32 {
    0
}
fn default_camera_resolution() -> (u32, u32) {
    (640, 480)
}
fn default_camera_fps() -> u32 {
    30
}
fn default_camera_format() -> String {
    "MJPG".to_string()
}

fn default_inference_endpoint() -> String {
    "http://127.0.0.1:5000/predict".to_string()
}
fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_narrator_enabled() -> bool {
    true
}
fn default_narrator_command() -> String {
    "espeak-ng".to_string()
}
