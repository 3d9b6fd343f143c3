use super::{FruitcamApp, SessionCommand, ShutdownReason};
use crate::error::Result;
use crate::ui::{KeyboardInputHandler, StatusSurface};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

const STATUS_IDLE: &str = "Press o to open the camera.";

impl FruitcamApp {
    /// Run the keyboard-driven session until the user quits or a signal arrives
    pub async fn run_interactive(&self) -> Result<i32> {
        info!("Fruitcam is running");

        let (commands_tx, commands_rx) = mpsc::unbounded_channel::<SessionCommand>();
        let keyboard = KeyboardInputHandler::new(commands_tx);

        if let Some(terminal) = &self.terminal {
            terminal.print_help();
            terminal.set_status(STATUS_IDLE);
        }

        keyboard.start().await?;

        let reason = self.run_commands(commands_rx, shutdown_signal()).await;
        info!("Shutdown initiated: {:?}", reason);

        let mut exit_code = 0;
        if let Err(e) = keyboard.stop().await {
            error!("Error stopping keyboard: {}", e);
            exit_code = 1;
        }

        // Leave the status line intact above the shell prompt
        println!();

        info!("Fruitcam shutdown complete");
        Ok(exit_code)
    }
}

/// Resolve on SIGINT, or SIGTERM on Unix
async fn shutdown_signal() -> ShutdownReason {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received SIGINT signal (Ctrl+C)"),
            Err(e) => {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("Received SIGTERM signal");
            }
            Err(e) => {
                warn!("Failed to register SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => ShutdownReason::Signal("SIGINT".to_string()),
        _ = terminate => ShutdownReason::Signal("SIGTERM".to_string()),
    }
}
