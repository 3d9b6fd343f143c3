use super::interface::{MediaDevices, MediaStream};
use crate::config::CameraConfig;
use crate::error::CameraError;
use crate::frame::{FrameData, FrameFormat};
use async_trait::async_trait;
use gstreamer::prelude::*;
use gstreamer::Pipeline;
use gstreamer_app::AppSink;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, info, trace};

/// How long to wait for the pipeline to hand over a frame
const SAMPLE_TIMEOUT_SECONDS: u64 = 5;

/// GStreamer-backed V4L2 camera access
pub struct GstMediaDevices {
    config: CameraConfig,
    format: FrameFormat,
    stream_counter: AtomicU64,
}

impl GstMediaDevices {
    pub fn new(config: CameraConfig) -> Result<Self, CameraError> {
        let format = FrameFormat::from_config_name(&config.format).ok_or_else(|| {
            CameraError::Configuration {
                details: format!("Unsupported camera format '{}'", config.format),
            }
        })?;

        gstreamer::init().map_err(|e| CameraError::Configuration {
            details: format!("Failed to initialize GStreamer: {}", e),
        })?;

        info!(
            "GStreamer camera access ready for device {} ({}x{} @ {}fps, {:?})",
            config.index, config.resolution.0, config.resolution.1, config.fps, format
        );

        Ok(Self {
            config,
            format,
            stream_counter: AtomicU64::new(0),
        })
    }

    fn device_path(&self) -> String {
        format!("/dev/video{}", self.config.index)
    }

    /// Build GStreamer pipeline string for the configured frame layout
    fn build_pipeline_string(&self) -> String {
        let (width, height) = self.config.resolution;
        let fps = self.config.fps;
        let device = self.device_path();

        // A single-buffer leaky sink keeps only the newest frame, like a live preview
        let sink = "appsink name=sink sync=false max-buffers=1 drop=true emit-signals=false";

        match self.format {
            FrameFormat::Mjpeg => format!(
                "v4l2src device={} io-mode=mmap do-timestamp=true ! \
                 image/jpeg,width={},height={},framerate={}/1 ! {}",
                device, width, height, fps, sink
            ),
            FrameFormat::Rgb24 => format!(
                "v4l2src device={} io-mode=mmap do-timestamp=true ! \
                 video/x-raw,width={},height={},framerate={}/1 ! \
                 videoconvert ! video/x-raw,format=RGB ! {}",
                device, width, height, fps, sink
            ),
        }
    }
}

/// Map device node problems onto the permission/no-device taxonomy
fn probe_device(device: &str) -> Result<(), CameraError> {
    if !Path::new(device).exists() {
        return Err(CameraError::DeviceNotFound {
            device: device.to_string(),
        });
    }

    match std::fs::OpenOptions::new().read(true).open(device) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(CameraError::PermissionDenied {
                device: device.to_string(),
            })
        }
        Err(e) => Err(CameraError::DeviceOpen {
            device: device.to_string(),
            details: e.to_string(),
        }),
    }
}

/// Probe the device and bring the pipeline to Playing. Blocks on V4L2 and
/// GStreamer state changes, so callers run it on the blocking pool.
fn start_stream(
    id: String,
    device: &str,
    pipeline_desc: &str,
    format: FrameFormat,
) -> Result<GstMediaStream, CameraError> {
    probe_device(device)?;

    info!("Creating GStreamer pipeline: {}", pipeline_desc);

    let pipeline = gstreamer::parse::launch(pipeline_desc)
        .map_err(|e| CameraError::Configuration {
            details: format!("Failed to create pipeline: {}", e),
        })?
        .downcast::<Pipeline>()
        .map_err(|_| CameraError::Configuration {
            details: "Failed to downcast to Pipeline".to_string(),
        })?;

    let appsink = pipeline
        .by_name("sink")
        .ok_or_else(|| CameraError::Configuration {
            details: "Pipeline has no appsink named 'sink'".to_string(),
        })?
        .downcast::<AppSink>()
        .map_err(|_| CameraError::Configuration {
            details: "Element 'sink' is not an AppSink".to_string(),
        })?;

    // From here on Drop returns the pipeline to Null on every exit path
    let stream = GstMediaStream {
        id,
        format,
        pipeline,
        appsink,
        frame_counter: AtomicU64::new(0),
    };

    stream
        .pipeline
        .set_state(gstreamer::State::Playing)
        .map_err(|e| CameraError::DeviceOpen {
            device: device.to_string(),
            details: format!("Failed to start pipeline: {}", e),
        })?;

    info!("GStreamer stream {} started", stream.id);
    Ok(stream)
}

#[async_trait]
impl MediaDevices for GstMediaDevices {
    async fn get_user_media(&self) -> Result<Box<dyn MediaStream>, CameraError> {
        let device = self.device_path();
        let pipeline_desc = self.build_pipeline_string();
        let format = self.format;
        let id = format!(
            "{}#{}",
            device,
            self.stream_counter.fetch_add(1, Ordering::Relaxed)
        );

        let stream = tokio::task::spawn_blocking(move || {
            start_stream(id, &device, &pipeline_desc, format)
        })
        .await
        .map_err(|e| CameraError::Configuration {
            details: format!("Camera start task failed: {}", e),
        })??;

        Ok(Box::new(stream))
    }
}

struct GstMediaStream {
    id: String,
    format: FrameFormat,
    pipeline: Pipeline,
    appsink: AppSink,
    frame_counter: AtomicU64,
}

#[async_trait]
impl MediaStream for GstMediaStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn track_count(&self) -> usize {
        1
    }

    async fn current_frame(&self) -> Result<FrameData, CameraError> {
        let appsink = self.appsink.clone();

        let sample = tokio::task::spawn_blocking(move || {
            appsink.try_pull_sample(gstreamer::ClockTime::from_seconds(SAMPLE_TIMEOUT_SECONDS))
        })
        .await
        .map_err(|e| CameraError::CaptureStream {
            details: format!("Frame pull task failed: {}", e),
        })?
        .ok_or_else(|| CameraError::CaptureStream {
            details: format!("No frame received within {}s", SAMPLE_TIMEOUT_SECONDS),
        })?;

        let buffer = sample.buffer().ok_or_else(|| CameraError::CaptureStream {
            details: "No buffer in sample".to_string(),
        })?;

        let caps = sample.caps().ok_or_else(|| CameraError::CaptureStream {
            details: "No caps in sample".to_string(),
        })?;

        let structure = caps.structure(0).ok_or_else(|| CameraError::CaptureStream {
            details: "Empty caps in sample".to_string(),
        })?;

        let width = structure.get::<i32>("width").map_err(|e| CameraError::CaptureStream {
            details: format!("Caps missing width: {}", e),
        })? as u32;
        let height = structure.get::<i32>("height").map_err(|e| CameraError::CaptureStream {
            details: format!("Caps missing height: {}", e),
        })? as u32;

        let map = buffer
            .map_readable()
            .map_err(|e| CameraError::CaptureStream {
                details: format!("Failed to map buffer: {}", e),
            })?;

        let frame_id = self.frame_counter.fetch_add(1, Ordering::Relaxed);

        trace!(
            "Pulled frame {} from {} ({}x{}, {} bytes)",
            frame_id,
            self.id,
            width,
            height,
            map.len()
        );

        Ok(FrameData::new(
            frame_id,
            map.as_slice().to_vec(),
            width,
            height,
            self.format,
        ))
    }

    fn stop(self: Box<Self>) {
        debug!("Stopping GStreamer stream {}", self.id);
    }
}

impl Drop for GstMediaStream {
    fn drop(&mut self) {
        match self.pipeline.set_state(gstreamer::State::Null) {
            Ok(_) => debug!("GStreamer stream {} stopped", self.id),
            Err(e) => error!("Failed to stop GStreamer stream {}: {}", self.id, e),
        }
    }
}
