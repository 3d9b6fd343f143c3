use super::StatusSurface;
use crossterm::cursor::MoveToColumn;
use crossterm::style::Print;
use crossterm::terminal::{Clear, ClearType};
use parking_lot::Mutex;
use std::io::{stdout, Write};
use tracing::warn;

#[derive(Debug, Clone)]
struct SurfaceState {
    status: String,
    preview_visible: bool,
}

/// Status line redrawn in place on stdout
pub struct TerminalSurface {
    state: Mutex<SurfaceState>,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SurfaceState {
                status: String::new(),
                preview_visible: false,
            }),
        }
    }

    /// Print the key bindings on their own line
    pub fn print_help(&self) {
        let mut out = stdout();
        let result = crossterm::execute!(
            out,
            MoveToColumn(0),
            Print("[o] open camera  [c/space] capture  [x] close camera  [q] quit\r\n")
        );
        if let Err(e) = result {
            warn!("Failed to draw help line: {}", e);
        }
    }

    pub fn status(&self) -> String {
        self.state.lock().status.clone()
    }

    pub fn preview_visible(&self) -> bool {
        self.state.lock().preview_visible
    }

    fn render(&self) {
        let line = {
            let state = self.state.lock();
            render_line(&state.status, state.preview_visible)
        };

        let mut out = stdout();
        let result = crossterm::execute!(
            out,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(line)
        )
        .and_then(|_| out.flush());

        if let Err(e) = result {
            warn!("Failed to draw status line: {}", e);
        }
    }
}

impl Default for TerminalSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSurface for TerminalSurface {
    fn set_status(&self, text: &str) {
        self.state.lock().status = text.to_string();
        self.render();
    }

    fn set_preview_visible(&self, visible: bool) {
        self.state.lock().preview_visible = visible;
        self.render();
    }
}

fn render_line(status: &str, preview_visible: bool) -> String {
    let preview = if preview_visible { "preview on" } else { "preview off" };
    format!("[{}] {}", preview, status)
}
