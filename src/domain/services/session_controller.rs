#[cfg(test)]
#[path = "session_controller_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::StreamReconciler;
use super::TranscriptStore;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::MessageId;
use crate::domain::models::MessagePatch;
use crate::domain::models::Notification;
use crate::domain::models::RouteTag;
use crate::domain::models::Session;
use crate::domain::models::SessionId;
use crate::domain::models::SessionState;
use crate::domain::models::SharedTransport;
use crate::domain::models::StreamEvent;
use crate::domain::models::Transcript;
use crate::domain::models::TransportError;
use crate::domain::models::CONNECTION_ERROR_TEXT;
use crate::domain::models::EMPTY_RESPONSE_TEXT;

pub const FAILURE_NOTICE: &str = "Unable to reach the API. Is the server running?";
pub const CLEARED_NOTICE: &str = "Chat cleared";

struct InFlight {
    message_id: MessageId,
    route_tag: Option<RouteTag>,
    cancel: CancellationToken,
    worker: JoinHandle<()>,
}

enum Wake {
    Action(Option<Action>),
    Stream(Option<StreamEvent>),
}

fn report(tx: &mpsc::UnboundedSender<StreamEvent>, event: StreamEvent) {
    if tx.send(event).is_err() {
        tracing::debug!("Session controller is gone, dropping stream event");
    }
}

async fn request(
    transport: SharedTransport,
    session_id: SessionId,
    query: String,
    message_id: MessageId,
    cancel: CancellationToken,
    tx: &mpsc::UnboundedSender<StreamEvent>,
) -> Result<String, TransportError> {
    let handle = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(TransportError::Aborted),
        res = transport.submit_query(&query, &session_id) => res?,
    };

    report(
        tx,
        StreamEvent::Connected {
            message_id,
            route_tag: handle.route_tag(),
        },
    );

    return StreamReconciler::new(cancel)
        .consume(handle, |snapshot| {
            report(
                tx,
                StreamEvent::Snapshot {
                    message_id,
                    content: snapshot.to_string(),
                },
            );
        })
        .await;
}

async fn run_request(
    transport: SharedTransport,
    session_id: SessionId,
    query: String,
    message_id: MessageId,
    cancel: CancellationToken,
    tx: mpsc::UnboundedSender<StreamEvent>,
) {
    let res = request(transport, session_id, query, message_id, cancel, &tx).await;
    let event = match res {
        Ok(content) => StreamEvent::Finished {
            message_id,
            content,
        },
        Err(error) => StreamEvent::Failed { message_id, error },
    };

    report(&tx, event);
}

/// Owns the transcript and the single in-flight request. Everything that
/// mutates the transcript runs on the task that owns the controller, the
/// request worker only reports back through `StreamEvent`s.
pub struct SessionController {
    session: Session,
    transport: SharedTransport,
    transcript: TranscriptStore,
    state: SessionState,
    in_flight: Option<InFlight>,
    stream_tx: mpsc::UnboundedSender<StreamEvent>,
    stream_rx: mpsc::UnboundedReceiver<StreamEvent>,
    events: mpsc::UnboundedSender<Event>,
}

impl SessionController {
    pub fn new(
        session: Session,
        transport: SharedTransport,
        events: mpsc::UnboundedSender<Event>,
    ) -> SessionController {
        let (stream_tx, stream_rx) = mpsc::unbounded_channel::<StreamEvent>();

        return SessionController {
            session,
            transport,
            transcript: TranscriptStore::new(vec![Message::welcome()]),
            state: SessionState::Idle,
            in_flight: None,
            stream_tx,
            stream_rx,
            events,
        };
    }

    pub fn state(&self) -> SessionState {
        return self.state;
    }

    pub fn transcript(&self) -> Transcript {
        return self.transcript.read();
    }

    /// Starts a request for `text`. Returns `false` without touching anything
    /// when the text is blank or another request is still in flight.
    pub fn submit(&mut self, text: &str) -> Result<bool> {
        let query = text.trim();
        if query.is_empty() {
            tracing::debug!("Ignoring empty submission");
            return Ok(false);
        }

        if !self.state.is_idle() {
            tracing::debug!(state = %self.state, "Ignoring submission, a request is in flight");
            return Ok(false);
        }

        let placeholder = Message::placeholder();
        let message_id = placeholder.id;
        self.transcript.append(Message::user(query));
        self.transcript.append(placeholder);
        self.publish_transcript()?;
        self.set_state(SessionState::Sending)?;

        let cancel = CancellationToken::new();
        let worker = tokio::spawn(run_request(
            self.transport.clone(),
            self.session.id().clone(),
            query.to_string(),
            message_id,
            cancel.clone(),
            self.stream_tx.clone(),
        ));

        self.in_flight = Some(InFlight {
            message_id,
            route_tag: None,
            cancel,
            worker,
        });

        return Ok(true);
    }

    /// Replaces the transcript with a single greeting. Only allowed while idle.
    pub fn clear(&mut self) -> Result<bool> {
        if !self.state.is_idle() {
            tracing::debug!(state = %self.state, "Ignoring clear, a request is in flight");
            return Ok(false);
        }

        self.transcript.replace_all(vec![Message::cleared()]);
        self.publish_transcript()?;
        self.notify(Notification::success(CLEARED_NOTICE))?;

        return Ok(true);
    }

    /// Cancels the in-flight request. The worker reports the abort as a
    /// failure, which finalizes the pending message.
    pub fn abort(&mut self) -> bool {
        if let Some(in_flight) = &self.in_flight {
            tracing::info!(message_id = %in_flight.message_id, "Aborting chat request");
            in_flight.cancel.cancel();
            return true;
        }

        return false;
    }

    pub fn handle_stream_event(&mut self, event: StreamEvent) -> Result<()> {
        let Some(in_flight) = &mut self.in_flight else {
            tracing::debug!(message_id = %event.message_id(), "Dropping stream event, nothing in flight");
            return Ok(());
        };

        if in_flight.message_id != event.message_id() {
            tracing::debug!(message_id = %event.message_id(), "Dropping stale stream event");
            return Ok(());
        }

        match event {
            StreamEvent::Connected { route_tag, .. } => {
                in_flight.route_tag = route_tag;
                self.set_state(SessionState::Streaming)?;
            }
            StreamEvent::Snapshot {
                message_id,
                content,
            } => {
                self.patch_pending(message_id, MessagePatch::content(&content));
                self.publish_transcript()?;
            }
            StreamEvent::Finished {
                message_id,
                content,
            } => {
                self.finish(message_id, content)?;
            }
            StreamEvent::Failed { message_id, error } => {
                self.fail(message_id, error)?;
            }
        }

        return Ok(());
    }

    /// Waits for and applies the next event of the in-flight request.
    pub async fn step(&mut self) -> Result<()> {
        if let Some(event) = self.stream_rx.recv().await {
            self.handle_stream_event(event)?;
        }

        return Ok(());
    }

    pub async fn drive_until_idle(&mut self) -> Result<()> {
        while self.in_flight.is_some() {
            self.step().await?;
        }

        return Ok(());
    }

    pub async fn start(mut self, rx: &mut mpsc::UnboundedReceiver<Action>) -> Result<()> {
        self.publish_transcript()?;
        self.set_state(SessionState::Idle)?;

        loop {
            let wake = tokio::select! {
                action = rx.recv() => Wake::Action(action),
                event = self.stream_rx.recv() => Wake::Stream(event),
            };

            match wake {
                Wake::Action(Some(action)) => self.handle_action(action)?,
                Wake::Action(None) => return Ok(()),
                Wake::Stream(Some(event)) => self.handle_stream_event(event)?,
                Wake::Stream(None) => {}
            }
        }
    }

    fn handle_action(&mut self, action: Action) -> Result<()> {
        match action {
            Action::Submit(text) => {
                self.submit(&text)?;
            }
            Action::Clear() => {
                self.clear()?;
            }
            Action::Abort() => {
                self.abort();
            }
            Action::HealthCheck() => {
                self.check_health();
            }
        }

        return Ok(());
    }

    fn check_health(&self) {
        let transport = self.transport.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let healthy = match transport.health_check().await {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(error = ?err, "API health check failed");
                    false
                }
            };

            if events.send(Event::HealthChecked(healthy)).is_err() {
                tracing::debug!("Presentation is gone, dropping health check result");
            }
        });
    }

    fn finish(&mut self, message_id: MessageId, content: String) -> Result<()> {
        let route_tag = self.in_flight.take().and_then(|in_flight| {
            return in_flight.route_tag;
        });

        let mut final_content = content;
        if final_content.is_empty() {
            final_content = EMPTY_RESPONSE_TEXT.to_string();
        }

        self.patch_pending(message_id, MessagePatch::finalize(&final_content, route_tag));
        self.publish_transcript()?;
        self.set_state(SessionState::Idle)?;

        return Ok(());
    }

    fn fail(&mut self, message_id: MessageId, error: TransportError) -> Result<()> {
        self.in_flight = None;
        tracing::error!(
            kind = error.kind(),
            error = %error,
            session_id = %self.session.id(),
            "Chat request failed"
        );

        self.set_state(SessionState::Failed)?;
        self.patch_pending(
            message_id,
            MessagePatch::finalize(CONNECTION_ERROR_TEXT, None),
        );
        self.publish_transcript()?;
        self.notify(Notification::error(FAILURE_NOTICE))?;
        self.set_state(SessionState::Idle)?;

        return Ok(());
    }

    fn patch_pending(&mut self, message_id: MessageId, patch: MessagePatch) {
        if let Err(err) = self.transcript.patch(message_id, patch) {
            tracing::error!(error = %err, "Rejected transcript patch");
            if cfg!(debug_assertions) {
                panic!("rejected transcript patch: {err}");
            }
        }
    }

    fn set_state(&mut self, state: SessionState) -> Result<()> {
        tracing::debug!(from = %self.state, to = %state, "Session state");
        self.state = state;
        self.events.send(Event::SessionStateChanged(state))?;

        return Ok(());
    }

    fn publish_transcript(&self) -> Result<()> {
        self.events
            .send(Event::TranscriptUpdated(self.transcript.read()))?;

        return Ok(());
    }

    fn notify(&self, notification: Notification) -> Result<()> {
        self.events.send(Event::Notify(notification))?;

        return Ok(());
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.cancel.cancel();
            in_flight.worker.abort();
        }
    }
}
