mod keyboard;
mod terminal;

pub use keyboard::KeyboardInputHandler;
pub use terminal::TerminalSurface;

/// Visible part of the client: one status line and the preview toggle
pub trait StatusSurface: Send + Sync {
    fn set_status(&self, text: &str);

    fn set_preview_visible(&self, visible: bool);
}
