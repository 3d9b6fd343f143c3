mod builder;
mod lifecycle;
pub mod messages;
mod types;

pub use builder::CameraSessionBuilder;
pub use lifecycle::CameraSession;
pub use types::{CaptureOutcome, CloseOutcome, OpenOutcome, SessionState};
