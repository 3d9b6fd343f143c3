use super::interface::MediaDevices;
use super::mock::MockMediaDevices;
use crate::config::CameraConfig;
use crate::error::{CameraError, FruitcamError, Result};
use crate::frame::FrameFormat;
use std::sync::Arc;
use tracing::info;

/// Builder that picks the camera backend for the session
pub struct MediaDevicesBuilder {
    config: Option<CameraConfig>,
    mock: bool,
}

impl MediaDevicesBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            mock: false,
        }
    }

    pub fn config(mut self, config: CameraConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use the synthetic camera instead of real hardware
    pub fn mock(mut self, mock: bool) -> Self {
        self.mock = mock;
        self
    }

    pub fn build(self) -> Result<Arc<dyn MediaDevices>> {
        let config = self
            .config
            .ok_or_else(|| FruitcamError::system("Camera configuration must be specified"))?;

        if self.mock {
            let format = FrameFormat::from_config_name(&config.format).ok_or_else(|| {
                CameraError::Configuration {
                    details: format!("Unsupported camera format '{}'", config.format),
                }
            })?;
            info!(
                "Using mock camera ({}x{}, {:?})",
                config.resolution.0, config.resolution.1, format
            );
            let devices =
                MockMediaDevices::new(config.resolution.0, config.resolution.1).with_format(format);
            return Ok(Arc::new(devices));
        }

        Self::build_hardware(config)
    }

    #[cfg(all(target_os = "linux", feature = "camera"))]
    fn build_hardware(config: CameraConfig) -> Result<Arc<dyn MediaDevices>> {
        let devices = super::gst::GstMediaDevices::new(config)?;
        Ok(Arc::new(devices))
    }

    #[cfg(not(all(target_os = "linux", feature = "camera")))]
    fn build_hardware(_config: CameraConfig) -> Result<Arc<dyn MediaDevices>> {
        Err(CameraError::Configuration {
            details: "Camera support not compiled in; rebuild with --features camera on Linux \
                      or run with --mock-camera"
                .to_string(),
        }
        .into())
    }
}

impl Default for MediaDevicesBuilder {
    fn default() -> Self {
        Self::new()
    }
}
