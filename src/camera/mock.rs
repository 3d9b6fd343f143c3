use super::interface::{MediaDevices, MediaStream};
use crate::error::CameraError;
use crate::frame::{FrameData, FrameFormat};
use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, trace};

/// How the mock device answers an access request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    Grant,
    DenyPermission,
    NoDevice,
}

/// Counters shared between a mock device and every stream it hands out
#[derive(Debug, Default)]
pub struct MockDeviceStats {
    requests: AtomicUsize,
    active_streams: AtomicUsize,
    tracks_stopped: AtomicUsize,
    frames_served: AtomicU64,
}

impl MockDeviceStats {
    /// Number of `get_user_media` calls, granted or not
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Streams handed out and not yet stopped
    pub fn active_streams(&self) -> usize {
        self.active_streams.load(Ordering::SeqCst)
    }

    pub fn tracks_stopped(&self) -> usize {
        self.tracks_stopped.load(Ordering::SeqCst)
    }

    pub fn frames_served(&self) -> u64 {
        self.frames_served.load(Ordering::SeqCst)
    }
}

/// Synthetic camera for testing and for running without hardware
pub struct MockMediaDevices {
    width: u32,
    height: u32,
    format: FrameFormat,
    tracks: usize,
    behavior: MockBehavior,
    stats: Arc<MockDeviceStats>,
    stream_counter: AtomicU64,
}

impl MockMediaDevices {
    /// Create a mock camera that grants access and produces MJPEG frames
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            format: FrameFormat::Mjpeg,
            tracks: 1,
            behavior: MockBehavior::Grant,
            stats: Arc::new(MockDeviceStats::default()),
            stream_counter: AtomicU64::new(0),
        }
    }

    pub fn with_format(mut self, format: FrameFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_tracks(mut self, tracks: usize) -> Self {
        self.tracks = tracks;
        self
    }

    pub fn with_behavior(mut self, behavior: MockBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn stats(&self) -> Arc<MockDeviceStats> {
        Arc::clone(&self.stats)
    }
}

#[async_trait]
impl MediaDevices for MockMediaDevices {
    async fn get_user_media(&self) -> Result<Box<dyn MediaStream>, CameraError> {
        self.stats.requests.fetch_add(1, Ordering::SeqCst);

        match self.behavior {
            MockBehavior::DenyPermission => {
                return Err(CameraError::PermissionDenied {
                    device: "mock".to_string(),
                })
            }
            MockBehavior::NoDevice => {
                return Err(CameraError::DeviceNotFound {
                    device: "mock".to_string(),
                })
            }
            MockBehavior::Grant => {}
        }

        let stream_id = self.stream_counter.fetch_add(1, Ordering::SeqCst);
        self.stats.active_streams.fetch_add(1, Ordering::SeqCst);

        info!(
            "Mock camera granted stream {} ({}x{}, {:?}, {} tracks)",
            stream_id, self.width, self.height, self.format, self.tracks
        );

        Ok(Box::new(MockMediaStream {
            id: format!("mock-{}", stream_id),
            width: self.width,
            height: self.height,
            format: self.format,
            tracks: self.tracks,
            frame_counter: AtomicU64::new(0),
            stats: Arc::clone(&self.stats),
        }))
    }
}

struct MockMediaStream {
    id: String,
    width: u32,
    height: u32,
    format: FrameFormat,
    tracks: usize,
    frame_counter: AtomicU64,
    stats: Arc<MockDeviceStats>,
}

impl MockMediaStream {
    /// Diagonal gradient whose phase moves with the frame id
    fn render_pattern(&self, frame_id: u64) -> RgbImage {
        let shift = (frame_id % 256) as u32;
        RgbImage::from_fn(self.width, self.height, |x, y| {
            Rgb([
                ((x + shift) % 256) as u8,
                ((y + shift) % 256) as u8,
                ((x + y) % 256) as u8,
            ])
        })
    }
}

#[async_trait]
impl MediaStream for MockMediaStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn track_count(&self) -> usize {
        self.tracks
    }

    async fn current_frame(&self) -> Result<FrameData, CameraError> {
        let frame_id = self.frame_counter.fetch_add(1, Ordering::SeqCst);
        let pattern = self.render_pattern(frame_id);

        let data = match self.format {
            FrameFormat::Rgb24 => pattern.into_raw(),
            FrameFormat::Mjpeg => {
                let mut buf = Vec::new();
                JpegEncoder::new_with_quality(&mut buf, 90)
                    .encode_image(&pattern)
                    .map_err(|e| CameraError::CaptureStream {
                        details: format!("Mock JPEG encoding failed: {}", e),
                    })?;
                buf
            }
        };

        trace!(
            "Generated mock frame {} ({}x{}, {} bytes)",
            frame_id,
            self.width,
            self.height,
            data.len()
        );
        self.stats.frames_served.fetch_add(1, Ordering::SeqCst);

        Ok(FrameData::new(
            frame_id,
            data,
            self.width,
            self.height,
            self.format,
        ))
    }

    fn stop(self: Box<Self>) {
        self.stats
            .tracks_stopped
            .fetch_add(self.tracks, Ordering::SeqCst);
        self.stats.active_streams.fetch_sub(1, Ordering::SeqCst);
        debug!("Mock stream {} stopped {} tracks", self.id, self.tracks);
    }
}
