pub mod app;
pub mod camera;
pub mod capture;
pub mod config;
pub mod error;
pub mod frame;
pub mod inference;
pub mod narrator;
pub mod session;
pub mod ui;

#[cfg(test)]
mod test_support;

pub use app::{FruitcamApp, SessionCommand, ShutdownReason};
pub use camera::{MediaDevices, MediaDevicesBuilder, MediaStream, MockMediaDevices};
pub use capture::CapturedFrame;
pub use config::FruitcamConfig;
pub use error::{CameraError, FruitcamError, InferenceError, NarratorError, Result};
pub use frame::{FrameData, FrameFormat};
pub use inference::{HttpInferenceClient, InferenceClient};
pub use narrator::{CommandNarrator, LogNarrator, Narrator, Speaker};
pub use session::{CameraSession, CameraSessionBuilder, CaptureOutcome, CloseOutcome, OpenOutcome, SessionState};
pub use ui::{StatusSurface, TerminalSurface};
