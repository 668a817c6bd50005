#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use std::fmt;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use chrono::DateTime;
use chrono::Local;

use super::RouteTag;

pub const WELCOME_TEXT: &str = "Hi! I'm FlipAssist, your AI shoe shopping companion.\n\nI can help you with:\n- Find shoes: search by brand, price, rating, or discount\n- Support FAQs: returns, shipping, payments and more\n- Follow-up questions: ask about results I've shown you\n\nTry a suggestion below or type your own question!";
pub const CLEARED_TEXT: &str = "Chat cleared! Ask me anything.";
pub const EMPTY_RESPONSE_TEXT: &str = "*(empty response)*";
pub const CONNECTION_ERROR_TEXT: &str = "⚠️ Could not connect to the server. Please ensure the FlipAssist API is running and reachable.";

static NEXT_MESSAGE_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

impl MessageId {
    pub fn next() -> MessageId {
        return MessageId(NEXT_MESSAGE_ID.fetch_add(1, Ordering::Relaxed));
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return write!(f, "m{}", self.0);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    pub route_tag: Option<RouteTag>,
    pub streaming: bool,
    pub timestamp: Option<DateTime<Local>>,
}

impl Message {
    pub fn user(text: &str) -> Message {
        return Message {
            id: MessageId::next(),
            role: Role::User,
            content: text.to_string(),
            route_tag: None,
            streaming: false,
            timestamp: Some(Local::now()),
        };
    }

    /// Empty assistant message that receives the streamed answer. Timestamp is
    /// only stamped when it finalizes.
    pub fn placeholder() -> Message {
        return Message {
            id: MessageId::next(),
            role: Role::Assistant,
            content: "".to_string(),
            route_tag: None,
            streaming: true,
            timestamp: None,
        };
    }

    pub fn assistant(text: &str) -> Message {
        return Message {
            id: MessageId::next(),
            role: Role::Assistant,
            content: text.to_string(),
            route_tag: None,
            streaming: false,
            timestamp: Some(Local::now()),
        };
    }

    pub fn welcome() -> Message {
        return Message::assistant(WELCOME_TEXT);
    }

    pub fn cleared() -> Message {
        return Message::assistant(CLEARED_TEXT);
    }

    pub fn author(&self) -> String {
        match self.role {
            Role::User => return "You".to_string(),
            Role::Assistant => {
                if let Some(route_tag) = self.route_tag {
                    if !self.streaming {
                        return format!("FlipAssist · {}", route_tag.label());
                    }
                }
                return "FlipAssist".to_string();
            }
        }
    }

    pub fn is_error(&self) -> bool {
        return self.role == Role::Assistant && self.content == CONNECTION_ERROR_TEXT;
    }

    pub fn display_time(&self) -> Option<String> {
        return self
            .timestamp
            .map(|timestamp| return timestamp.format("%H:%M").to_string());
    }

    pub fn apply(&mut self, patch: MessagePatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if patch.route_tag.is_some() {
            self.route_tag = patch.route_tag;
        }
        if let Some(streaming) = patch.streaming {
            self.streaming = streaming;
        }
        if patch.timestamp.is_some() {
            self.timestamp = patch.timestamp;
        }
    }
}

/// Partial update for the streaming message. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MessagePatch {
    pub content: Option<String>,
    pub route_tag: Option<RouteTag>,
    pub streaming: Option<bool>,
    pub timestamp: Option<DateTime<Local>>,
}

impl MessagePatch {
    pub fn content(snapshot: &str) -> MessagePatch {
        return MessagePatch {
            content: Some(snapshot.to_string()),
            ..MessagePatch::default()
        };
    }

    pub fn finalize(content: &str, route_tag: Option<RouteTag>) -> MessagePatch {
        return MessagePatch {
            content: Some(content.to_string()),
            route_tag,
            streaming: Some(false),
            timestamp: Some(Local::now()),
        };
    }

    pub fn finalizes(&self) -> bool {
        return self.streaming == Some(false);
    }
}
