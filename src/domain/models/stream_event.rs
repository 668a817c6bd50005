use super::MessageId;
use super::RouteTag;
use super::TransportError;

/// Progress of the in-flight request, reported by the worker task to the
/// session controller. Every event names the placeholder it belongs to so
/// late events from an aborted request can be told apart.
#[derive(Clone, Debug, PartialEq)]
pub enum StreamEvent {
    Connected {
        message_id: MessageId,
        route_tag: Option<RouteTag>,
    },
    Snapshot {
        message_id: MessageId,
        content: String,
    },
    Finished {
        message_id: MessageId,
        content: String,
    },
    Failed {
        message_id: MessageId,
        error: TransportError,
    },
}

impl StreamEvent {
    pub fn message_id(&self) -> MessageId {
        match self {
            StreamEvent::Connected { message_id, .. }
            | StreamEvent::Snapshot { message_id, .. }
            | StreamEvent::Finished { message_id, .. }
            | StreamEvent::Failed { message_id, .. } => return *message_id,
        }
    }
}
