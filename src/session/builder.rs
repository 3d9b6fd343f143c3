use super::lifecycle::CameraSession;
use crate::camera::MediaDevices;
use crate::config::DEFAULT_JPEG_QUALITY;
use crate::error::{FruitcamError, Result};
use crate::inference::InferenceClient;
use crate::narrator::Narrator;
use crate::ui::StatusSurface;
use std::sync::Arc;

/// Builder for [`CameraSession`]
pub struct CameraSessionBuilder {
    devices: Option<Arc<dyn MediaDevices>>,
    inference: Option<Arc<dyn InferenceClient>>,
    narrator: Option<Arc<dyn Narrator>>,
    surface: Option<Arc<dyn StatusSurface>>,
    jpeg_quality: u8,
}

impl CameraSessionBuilder {
    pub fn new() -> Self {
        Self {
            devices: None,
            inference: None,
            narrator: None,
            surface: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }

    pub fn devices(mut self, devices: Arc<dyn MediaDevices>) -> Self {
        self.devices = Some(devices);
        self
    }

    pub fn inference(mut self, inference: Arc<dyn InferenceClient>) -> Self {
        self.inference = Some(inference);
        self
    }

    pub fn narrator(mut self, narrator: Arc<dyn Narrator>) -> Self {
        self.narrator = Some(narrator);
        self
    }

    pub fn surface(mut self, surface: Arc<dyn StatusSurface>) -> Self {
        self.surface = Some(surface);
        self
    }

    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    pub fn build(self) -> Result<CameraSession> {
        let devices = self
            .devices
            .ok_or_else(|| FruitcamError::system("Media devices must be specified"))?;
        let inference = self
            .inference
            .ok_or_else(|| FruitcamError::system("Inference client must be specified"))?;
        let narrator = self
            .narrator
            .ok_or_else(|| FruitcamError::system("Narrator must be specified"))?;
        let surface = self
            .surface
            .ok_or_else(|| FruitcamError::system("Status surface must be specified"))?;

        Ok(CameraSession::new(
            devices,
            inference,
            narrator,
            surface,
            self.jpeg_quality,
        ))
    }
}

impl Default for CameraSessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}
