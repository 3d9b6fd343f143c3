//! Spoken feedback.
//!
//! A [`Narrator`] speaks one sentence at a time on a shared
//! [`SpeechChannel`]. Every call cancels whatever the channel is still
//! playing before enqueueing the new text, so rapid calls truncate earlier
//! utterances and only the latest one is heard in full.

mod channel;
mod process;

pub use channel::{LogChannel, SpeechChannel};
pub use process::ProcessChannel;

use crate::config::NarratorConfig;
use crate::error::NarratorError;
use std::sync::Arc;
use tracing::{trace, warn};

/// Capability to vocalize a status or result
pub trait Narrator: Send + Sync {
    fn speak(&self, text: &str) -> Result<(), NarratorError>;
}

/// Last-wins narrator over a speech channel
pub struct Speaker<C> {
    channel: C,
}

impl<C: SpeechChannel> Speaker<C> {
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }
}

impl<C: SpeechChannel> Narrator for Speaker<C> {
    fn speak(&self, text: &str) -> Result<(), NarratorError> {
        trace!("Speaking: {}", text);

        // A failed cancel must not swallow the newer message
        if let Err(e) = self.channel.cancel() {
            warn!("Failed to cancel previous utterance: {}", e);
        }

        self.channel.enqueue(text)
    }
}

/// Speaks through an external speech synthesis program
pub type CommandNarrator = Speaker<ProcessChannel>;

/// Only logs what would have been said
pub type LogNarrator = Speaker<LogChannel>;

/// Build the narrator described by the configuration
pub fn from_config(config: &NarratorConfig) -> Arc<dyn Narrator> {
    if config.enabled {
        let narrator: CommandNarrator = Speaker::new(ProcessChannel::new(
            config.command.clone(),
            config.args.clone(),
        ));
        Arc::new(narrator)
    } else {
        let narrator: LogNarrator = Speaker::new(LogChannel::default());
        Arc::new(narrator)
    }
}
