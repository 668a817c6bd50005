#[cfg(test)]
#[path = "transcript_test.rs"]
mod tests;

use std::sync::Arc;

use crate::domain::models::Message;
use crate::domain::models::MessageId;
use crate::domain::models::MessagePatch;
use crate::domain::models::Transcript;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TranscriptError {
    #[error("message {0} does not exist")]
    UnknownMessage(MessageId),
    #[error("message {0} is not streaming and can no longer change")]
    NotStreaming(MessageId),
    #[error("patch would shrink streaming message {0}")]
    ContentShrunk(MessageId),
}

/// Ordered message log. Writes go through `Arc::make_mut`, so a snapshot
/// returned by `read` is never modified after the fact.
#[derive(Default)]
pub struct TranscriptStore {
    messages: Arc<Vec<Message>>,
}

impl TranscriptStore {
    pub fn new(messages: Vec<Message>) -> TranscriptStore {
        return TranscriptStore {
            messages: Arc::new(messages),
        };
    }

    pub fn append(&mut self, message: Message) {
        Arc::make_mut(&mut self.messages).push(message);
    }

    /// Updates the streaming message. Any other target is rejected.
    pub fn patch(&mut self, id: MessageId, patch: MessagePatch) -> Result<(), TranscriptError> {
        let idx = self
            .messages
            .iter()
            .position(|message| return message.id == id)
            .ok_or(TranscriptError::UnknownMessage(id))?;

        let current = &self.messages[idx];
        if !current.streaming {
            return Err(TranscriptError::NotStreaming(id));
        }

        if !patch.finalizes() {
            if let Some(content) = &patch.content {
                if content.len() < current.content.len() {
                    return Err(TranscriptError::ContentShrunk(id));
                }
            }
        }

        Arc::make_mut(&mut self.messages)[idx].apply(patch);

        return Ok(());
    }

    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.messages = Arc::new(messages);
    }

    pub fn read(&self) -> Transcript {
        return Transcript::new(Arc::clone(&self.messages));
    }

    pub fn len(&self) -> usize {
        return self.messages.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.messages.is_empty();
    }
}
