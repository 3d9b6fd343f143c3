mod encode;

pub use encode::{encode_jpeg, render_frame, to_data_uri, CapturedFrame, JPEG_MIME};
