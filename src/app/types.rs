/// User actions routed to the camera session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    Open,
    Capture,
    Close,
    Quit,
}

/// Why the command loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    Signal(String),
    UserRequest,
    InputClosed,
}
