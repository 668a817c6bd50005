use std::ops::Deref;
use std::sync::Arc;

use super::Message;
use super::MessageId;

/// Read-only view of the transcript at one point in time. Cheap to clone and
/// never mutated after it is handed out.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transcript(Arc<Vec<Message>>);

impl Transcript {
    pub fn new(messages: Arc<Vec<Message>>) -> Transcript {
        return Transcript(messages);
    }
}

#[cfg(test)]
impl Transcript {
    pub fn get(&self, id: MessageId) -> Option<&Message> {
        return self.0.iter().find(|message| return message.id == id);
    }

    pub fn streaming_count(&self) -> usize {
        return self.0.iter().filter(|message| return message.streaming).count();
    }

    pub fn shares_storage(&self, other: &Transcript) -> bool {
        return Arc::ptr_eq(&self.0, &other.0);
    }
}

impl Deref for Transcript {
    type Target = [Message];

    fn deref(&self) -> &[Message] {
        return &self.0;
    }
}
