use crate::error::CameraError;
use crate::frame::{FrameData, FrameFormat};
use base64::{engine::general_purpose::STANDARD, Engine};
use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, RgbImage};
use tracing::debug;

/// MIME type of the encoded capture
pub const JPEG_MIME: &str = "image/jpeg";

/// Render a frame onto an RGB surface sized to its native resolution
pub fn render_frame(frame: &FrameData) -> Result<RgbImage, CameraError> {
    if frame.width == 0 || frame.height == 0 {
        return Err(CameraError::Encode {
            details: format!("Frame {} has no pixels", frame.id),
        });
    }

    let surface = match frame.format {
        FrameFormat::Mjpeg => {
            let decoded = image::load_from_memory_with_format(&frame.data, ImageFormat::Jpeg)
                .map_err(|e| CameraError::Encode {
                    details: format!("JPEG decode failed: {}", e),
                })?
                .to_rgb8();

            // The decoder is authoritative, but the surface must match the stream
            if decoded.dimensions() != (frame.width, frame.height) {
                return Err(CameraError::Encode {
                    details: format!(
                        "Decoded frame is {}x{}, stream reports {}x{}",
                        decoded.width(),
                        decoded.height(),
                        frame.width,
                        frame.height
                    ),
                });
            }
            decoded
        }
        FrameFormat::Rgb24 => {
            frame.check_payload()?;
            RgbImage::from_raw(frame.width, frame.height, frame.data.as_ref().clone()).ok_or_else(
                || CameraError::Encode {
                    details: "Failed to create image buffer".to_string(),
                },
            )?
        }
    };

    Ok(surface)
}

/// Compress a rendered surface as JPEG
pub fn encode_jpeg(surface: &RgbImage, quality: u8) -> Result<Vec<u8>, CameraError> {
    let mut jpeg_bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg_bytes, quality.clamp(1, 100))
        .encode_image(surface)
        .map_err(|e| CameraError::Encode {
            details: format!("Failed to encode JPEG: {}", e),
        })?;
    Ok(jpeg_bytes)
}

/// Format bytes as a base64 `data:` URI
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// A single frame encoded for the inference request. Never persisted.
#[derive(Debug)]
pub struct CapturedFrame {
    frame_id: u64,
    width: u32,
    height: u32,
    encoded_len: usize,
    data_uri: String,
}

impl CapturedFrame {
    /// Render and encode the frame as a JPEG data URI
    pub fn capture(frame: &FrameData, quality: u8) -> Result<Self, CameraError> {
        let surface = render_frame(frame)?;
        let jpeg = encode_jpeg(&surface, quality)?;
        let data_uri = to_data_uri(JPEG_MIME, &jpeg);

        debug!(
            "Encoded frame {} ({}x{}) to {} JPEG bytes",
            frame.id,
            surface.width(),
            surface.height(),
            jpeg.len()
        );

        Ok(Self {
            frame_id: frame.id,
            width: surface.width(),
            height: surface.height(),
            encoded_len: jpeg.len(),
            data_uri,
        })
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Size of the JPEG payload before base64 encoding
    pub fn encoded_len(&self) -> usize {
        self.encoded_len
    }

    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    pub fn into_data_uri(self) -> String {
        self.data_uri
    }
}
