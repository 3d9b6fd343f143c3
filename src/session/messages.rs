//! Fixed status and spoken messages.

pub const STATUS_AWAITING_CAPTURE: &str = "Camera opened. Say 'take image' to capture.";
pub const SAY_CAMERA_OPEN: &str = "Camera is now open.";
pub const SAY_CAMERA_ALREADY_OPEN: &str = "Camera is already open.";
pub const SAY_CAMERA_UNAVAILABLE: &str = "Unable to access camera.";

pub const SAY_OPEN_CAMERA_FIRST: &str = "Please open the camera first.";
pub const ANALYZING: &str = "Analyzing image, please wait...";
pub const SAY_ANALYSIS_ERROR: &str = "Error analyzing the image.";

pub const CAMERA_CLOSED: &str = "Camera closed.";

pub fn result_status(label: &str) -> String {
    format!("🧾 Result: {}", label)
}

pub fn result_utterance(label: &str) -> String {
    format!("The fruit is {}", label)
}
