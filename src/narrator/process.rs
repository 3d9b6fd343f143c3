use super::channel::SpeechChannel;
use crate::error::NarratorError;
use parking_lot::Mutex;
use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

/// Speech channel backed by an external synthesizer such as `espeak-ng`.
///
/// One child process is one utterance; cancelling kills the running child.
/// Must be used from within a Tokio runtime.
pub struct ProcessChannel {
    command: String,
    args: Vec<String>,
    current: Mutex<Option<Child>>,
    cancelled: AtomicU64,
}

impl ProcessChannel {
    pub fn new(command: String, args: Vec<String>) -> Self {
        Self {
            command,
            args,
            current: Mutex::new(None),
            cancelled: AtomicU64::new(0),
        }
    }

    /// Process id of the utterance currently playing
    pub fn current_pid(&self) -> Option<u32> {
        let mut current = self.current.lock();
        match current.as_mut() {
            Some(child) => match child.try_wait() {
                Ok(None) => child.id(),
                _ => None,
            },
            None => None,
        }
    }

    /// Number of utterances cut short by a newer one
    pub fn cancelled_count(&self) -> u64 {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl SpeechChannel for ProcessChannel {
    fn cancel(&self) -> Result<(), NarratorError> {
        let Some(mut child) = self.current.lock().take() else {
            return Ok(());
        };

        match child.try_wait() {
            Ok(Some(status)) => {
                debug!("Previous utterance already finished ({})", status);
                Ok(())
            }
            Ok(None) => {
                child
                    .start_kill()
                    .map_err(|source| NarratorError::Cancel { source })?;
                self.cancelled.fetch_add(1, Ordering::Relaxed);
                debug!("Cancelled utterance (pid {:?})", child.id());
                Ok(())
            }
            Err(source) => Err(NarratorError::Cancel { source }),
        }
    }

    fn enqueue(&self, text: &str) -> Result<(), NarratorError> {
        let child = Command::new(&self.command)
            .args(&self.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| {
                warn!("Speech command '{}' could not start: {}", self.command, source);
                NarratorError::Spawn {
                    command: self.command.clone(),
                    source,
                }
            })?;

        debug!("Speaking via {} (pid {:?})", self.command, child.id());
        *self.current.lock() = Some(child);
        Ok(())
    }
}
