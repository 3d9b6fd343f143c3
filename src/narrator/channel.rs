use crate::error::NarratorError;
use parking_lot::Mutex;
use tracing::info;

/// Shared output where utterances are queued for playback
pub trait SpeechChannel: Send + Sync {
    /// Drop anything queued or currently playing
    fn cancel(&self) -> Result<(), NarratorError>;

    /// Queue `text` for immediate playback
    fn enqueue(&self, text: &str) -> Result<(), NarratorError>;
}

/// Channel that writes utterances to the log instead of a speaker
#[derive(Default)]
pub struct LogChannel {
    last: Mutex<Option<String>>,
}

impl LogChannel {
    /// Most recent utterance
    pub fn last_utterance(&self) -> Option<String> {
        self.last.lock().clone()
    }
}

impl SpeechChannel for LogChannel {
    fn cancel(&self) -> Result<(), NarratorError> {
        self.last.lock().take();
        Ok(())
    }

    fn enqueue(&self, text: &str) -> Result<(), NarratorError> {
        info!(utterance = %text, "Narration");
        *self.last.lock() = Some(text.to_string());
        Ok(())
    }
}
