use crate::app::SessionCommand;
use crate::error::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Keyboard stand-in for the open/capture/close buttons
pub struct KeyboardInputHandler {
    commands: UnboundedSender<SessionCommand>,
    cancellation_token: CancellationToken,
}

impl KeyboardInputHandler {
    pub fn new(commands: UnboundedSender<SessionCommand>) -> Self {
        Self {
            commands,
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Start listening for keyboard input
    pub async fn start(&self) -> Result<()> {
        info!("Starting keyboard input handler");

        let commands = self.commands.clone();
        let cancellation_token = self.cancellation_token.clone();

        task::spawn_blocking(move || {
            // Raw mode delivers individual key presses
            if let Err(e) = enable_raw_mode() {
                error!("Failed to enable raw mode for keyboard input: {}", e);
                let _ = commands.send(SessionCommand::Quit);
                return;
            }

            loop {
                if cancellation_token.is_cancelled() {
                    debug!("Keyboard input handler stopping");
                    break;
                }

                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => {
                        let Ok(Event::Key(key_event)) = event::read() else {
                            continue;
                        };
                        if key_event.kind != KeyEventKind::Press {
                            continue;
                        }

                        let Some(command) = command_for_key(&key_event) else {
                            debug!("Key pressed: {:?}", key_event.code);
                            continue;
                        };

                        debug!("Key {:?} mapped to {:?}", key_event.code, command);
                        let quit = command == SessionCommand::Quit;
                        if commands.send(command).is_err() {
                            debug!("Command receiver dropped");
                            break;
                        }
                        if quit {
                            break;
                        }
                    }
                    Ok(false) => {}
                    Err(e) => {
                        warn!("Error polling for keyboard events: {}", e);
                    }
                }
            }

            if let Err(e) = disable_raw_mode() {
                error!("Failed to disable raw mode: {}", e);
            } else {
                debug!("Raw mode disabled");
            }
        });

        Ok(())
    }

    /// Stop the keyboard input handler
    pub async fn stop(&self) -> Result<()> {
        info!("Stopping keyboard input handler");
        self.cancellation_token.cancel();

        // Give the task a moment to clean up and disable raw mode
        tokio::time::sleep(Duration::from_millis(200)).await;

        let _ = disable_raw_mode();

        Ok(())
    }
}

/// Map a key press to a session command
fn command_for_key(key_event: &KeyEvent) -> Option<SessionCommand> {
    // Raw mode swallows SIGINT, so Ctrl+C arrives here as a key
    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return match key_event.code {
            KeyCode::Char('c') | KeyCode::Char('d') => Some(SessionCommand::Quit),
            _ => None,
        };
    }

    match key_event.code {
        KeyCode::Char('o') => Some(SessionCommand::Open),
        KeyCode::Char('c') | KeyCode::Char(' ') => Some(SessionCommand::Capture),
        KeyCode::Char('x') => Some(SessionCommand::Close),
        KeyCode::Char('q') | KeyCode::Esc => Some(SessionCommand::Quit),
        _ => None,
    }
}
