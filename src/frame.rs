use crate::error::CameraError;
use std::sync::Arc;

/// Pixel layout of the frames a camera stream hands out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// Each frame is a complete JPEG image
    Mjpeg,
    /// Packed 8-bit RGB, row major
    Rgb24,
}

impl FrameFormat {
    /// Parse the `camera.format` configuration value
    pub fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "MJPG" => Some(FrameFormat::Mjpeg),
            "RGB" => Some(FrameFormat::Rgb24),
            _ => None,
        }
    }

    pub fn config_name(&self) -> &'static str {
        match self {
            FrameFormat::Mjpeg => "MJPG",
            FrameFormat::Rgb24 => "RGB",
        }
    }

    /// Exact payload length for raw layouts; `None` when compressed
    pub fn raw_len(&self, width: u32, height: u32) -> Option<usize> {
        match self {
            FrameFormat::Mjpeg => None,
            FrameFormat::Rgb24 => Some(width as usize * height as usize * 3),
        }
    }
}

/// One frame pulled from a live stream, at the stream's native resolution
#[derive(Debug, Clone)]
pub struct FrameData {
    pub id: u64,
    /// Shared so the session can hand the bytes to the encoder without copying
    pub data: Arc<Vec<u8>>,
    pub width: u32,
    pub height: u32,
    pub format: FrameFormat,
}

impl FrameData {
    pub fn new(
        id: u64,
        data: Vec<u8>,
        width: u32,
        height: u32,
        format: FrameFormat,
    ) -> Self {
        Self {
            id,
            data: Arc::new(data),
            width,
            height,
            format,
        }
    }

    /// Check the payload can hold the advertised image
    pub fn check_payload(&self) -> Result<(), CameraError> {
        match self.format.raw_len(self.width, self.height) {
            Some(expected) if self.data.len() != expected => Err(CameraError::Encode {
                details: format!(
                    "{} frame {} has {} bytes, expected {}",
                    self.format.config_name(),
                    self.id,
                    self.data.len(),
                    expected
                ),
            }),
            None if self.data.is_empty() => Err(CameraError::Encode {
                details: format!("{} frame {} is empty", self.format.config_name(), self.id),
            }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(data: Vec<u8>, format: FrameFormat) -> FrameData {
        FrameData::new(7, data, 4, 2, format)
    }

    #[test]
    fn test_config_names() {
        for format in [FrameFormat::Mjpeg, FrameFormat::Rgb24] {
            assert_eq!(FrameFormat::from_config_name(format.config_name()), Some(format));
        }
        assert_eq!(FrameFormat::from_config_name("YUYV"), None);
        assert_eq!(FrameFormat::from_config_name("mjpg"), None);
    }

    #[test]
    fn test_raw_len() {
        assert_eq!(FrameFormat::Rgb24.raw_len(640, 480), Some(921_600));
        assert_eq!(FrameFormat::Mjpeg.raw_len(640, 480), None);
    }

    #[test]
    fn test_rgb_payload_must_match_dimensions() {
        assert!(frame(vec![0u8; 24], FrameFormat::Rgb24).check_payload().is_ok());

        let short = frame(vec![0u8; 23], FrameFormat::Rgb24).check_payload();
        assert!(matches!(short, Err(CameraError::Encode { details }) if details.contains("expected 24")));
    }

    #[test]
    fn test_mjpeg_payload_must_not_be_empty() {
        assert!(frame(vec![0xFF, 0xD8], FrameFormat::Mjpeg).check_payload().is_ok());
        assert!(frame(Vec::new(), FrameFormat::Mjpeg).check_payload().is_err());
    }
}
