mod builder;
#[cfg(all(target_os = "linux", feature = "camera"))]
mod gst;
mod interface;
mod mock;

pub use builder::MediaDevicesBuilder;
#[cfg(all(target_os = "linux", feature = "camera"))]
pub use gst::GstMediaDevices;
pub use interface::{MediaDevices, MediaStream};
pub use mock::{MockBehavior, MockDeviceStats, MockMediaDevices};
