use crate::error::FruitcamError;

/// Camera lifecycle as seen by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Closed,
    Open,
}

/// What an open request did
#[derive(Debug)]
pub enum OpenOutcome {
    Opened,
    /// A stream was already held; it was kept and no new one requested
    AlreadyOpen,
    Failed(FruitcamError),
}

/// What a capture request did
#[derive(Debug)]
pub enum CaptureOutcome {
    /// The server labelled the frame
    Labeled(String),
    /// No stream was held; nothing was sent
    CameraNotOpen,
    /// Another capture was still waiting on the server
    Busy,
    Failed(FruitcamError),
}

/// What a close request did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed { tracks_stopped: usize },
    NotOpen,
}
