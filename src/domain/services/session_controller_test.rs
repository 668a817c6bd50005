use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use super::SessionController;
use super::CLEARED_NOTICE;
use super::FAILURE_NOTICE;
use crate::domain::models::Action;
use crate::domain::models::Event;
use crate::domain::models::MessageId;
use crate::domain::models::Notification;
use crate::domain::models::NotificationLevel;
use crate::domain::models::Role;
use crate::domain::models::RouteTag;
use crate::domain::models::Session;
use crate::domain::models::SessionState;
use crate::domain::models::StreamEvent;
use crate::domain::models::CLEARED_TEXT;
use crate::domain::models::CONNECTION_ERROR_TEXT;
use crate::domain::models::EMPTY_RESPONSE_TEXT;
use crate::infrastructure::transport::scripted::Script;
use crate::infrastructure::transport::scripted::ScriptedTransport;

fn controller(transport: ScriptedTransport) -> (SessionController, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let controller = SessionController::new(Session::new(), Arc::new(transport), tx);

    return (controller, rx);
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = vec![];
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    return events;
}

fn notifications(events: &[Event]) -> Vec<Notification> {
    return events
        .iter()
        .filter_map(|event| match event {
            Event::Notify(notification) => return Some(notification.clone()),
            _ => return None,
        })
        .collect();
}

fn states(events: &[Event]) -> Vec<SessionState> {
    return events
        .iter()
        .filter_map(|event| match event {
            Event::SessionStateChanged(state) => return Some(*state),
            _ => return None,
        })
        .collect();
}

/// Every published `(content, streaming)` pair of one message.
fn published(events: &[Event], message_id: MessageId) -> Vec<(String, bool)> {
    return events
        .iter()
        .filter_map(|event| match event {
            Event::TranscriptUpdated(transcript) => {
                return transcript
                    .get(message_id)
                    .map(|message| return (message.content.to_string(), message.streaming));
            }
            _ => return None,
        })
        .collect();
}

async fn settle(controller: &mut SessionController) -> Result<()> {
    tokio::time::timeout(Duration::from_secs(5), controller.drive_until_idle()).await??;

    return Ok(());
}

#[tokio::test]
async fn it_appends_a_user_message_and_a_streaming_placeholder() -> Result<()> {
    let (mut controller, _rx) = controller(ScriptedTransport::new(vec![Script::Chunks(vec![
        "Sure",
    ])]));

    assert!(controller.submit("  running shoes  ")?);
    assert_eq!(controller.state(), SessionState::Sending);

    let transcript = controller.transcript();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript[1].role, Role::User);
    assert_eq!(transcript[1].content, "running shoes");
    assert_eq!(transcript[2].role, Role::Assistant);
    assert_eq!(transcript[2].content, "");
    assert!(transcript[2].streaming);
    assert_eq!(transcript.streaming_count(), 1);

    settle(&mut controller).await?;
    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(controller.transcript().streaming_count(), 0);

    return Ok(());
}

#[tokio::test]
async fn it_rejects_blank_submissions() -> Result<()> {
    let transport = ScriptedTransport::new(vec![]);
    let requests = transport.requests();
    let (mut controller, mut rx) = controller(transport);

    assert!(!controller.submit("")?);
    assert!(!controller.submit(" \n\t ")?);

    assert_eq!(controller.state(), SessionState::Idle);
    assert_eq!(controller.transcript().len(), 1);
    assert!(drain(&mut rx).is_empty());
    tokio::task::yield_now().await;
    assert!(requests.lock().unwrap().is_empty());

    return Ok(());
}

#[tokio::test]
async fn it_ignores_a_second_submission_while_in_flight() -> Result<()> {
    let transport = ScriptedTransport::new(vec![Script::Hang, Script::Chunks(vec!["late"])]);
    let requests = transport.requests();
    let (mut controller, _rx) = controller(transport);

    assert!(controller.submit("first")?);
    assert!(!controller.submit("second")?);
    tokio::task::yield_now().await;

    let transcript = controller.transcript();
    assert_eq!(transcript.len(), 3);
    assert_eq!(transcript.streaming_count(), 1);
    assert_eq!(requests.lock().unwrap().len(), 1);

    controller.abort();
    settle(&mut controller).await?;

    return Ok(());
}

#[tokio::test]
async fn it_publishes_growing_snapshots() -> Result<()> {
    let (mut controller, mut rx) = controller(ScriptedTransport::new(vec![Script::Chunks(vec![
        "Hel", "lo, ", "world",
    ])]));

    controller.submit("hi")?;
    let placeholder_id = controller.transcript()[2].id;
    settle(&mut controller).await?;

    let events = drain(&mut rx);
    assert_eq!(
        published(&events, placeholder_id),
        vec![
            ("".to_string(), true),
            ("Hel".to_string(), true),
            ("Hello, ".to_string(), true),
            ("Hello, world".to_string(), true),
            ("Hello, world".to_string(), false),
        ]
    );
    assert_eq!(
        states(&events),
        vec![
            SessionState::Sending,
            SessionState::Streaming,
            SessionState::Idle
        ]
    );
    assert!(notifications(&events).is_empty());

    let message = controller.transcript()[2].clone();
    assert!(message.timestamp.is_some());
    assert_eq!(message.route_tag, None);

    return Ok(());
}

#[tokio::test]
async fn it_finalizes_empty_answers_with_a_placeholder_text() -> Result<()> {
    let (mut controller, _rx) = controller(ScriptedTransport::new(vec![Script::Chunks(vec![])]));

    controller.submit("hi")?;
    settle(&mut controller).await?;

    let message = controller.transcript()[2].clone();
    assert_eq!(message.content, EMPTY_RESPONSE_TEXT);
    assert!(!message.streaming);

    return Ok(());
}

#[tokio::test]
async fn it_tags_finished_answers_with_the_route() -> Result<()> {
    let transport = ScriptedTransport::new(vec![Script::Chunks(vec!["Nike Revolution 6"])])
        .with_route_tag(RouteTag::Sql);
    let (mut controller, _rx) = controller(transport);

    controller.submit("nike shoes")?;
    settle(&mut controller).await?;

    let message = controller.transcript()[2].clone();
    assert_eq!(message.route_tag, Some(RouteTag::Sql));
    assert_eq!(message.author(), "FlipAssist · Product Search");

    return Ok(());
}

#[tokio::test]
async fn it_replaces_failed_answers_with_the_error_text() -> Result<()> {
    for script in [
        Script::Unreachable,
        Script::Status(500),
        Script::ChunksThenFailure(vec!["Partial ", "answer"]),
    ] {
        let (mut controller, mut rx) = controller(ScriptedTransport::new(vec![script]));

        controller.submit("hi")?;
        settle(&mut controller).await?;

        let message = controller.transcript()[2].clone();
        assert_eq!(message.content, CONNECTION_ERROR_TEXT);
        assert!(!message.streaming);
        assert_eq!(message.route_tag, None);

        let events = drain(&mut rx);
        assert_eq!(notifications(&events), vec![Notification::error(FAILURE_NOTICE)]);
        assert_eq!(
            states(&events).iter().rev().take(2).collect::<Vec<_>>(),
            vec![&SessionState::Idle, &SessionState::Failed]
        );
        assert_eq!(controller.state(), SessionState::Idle);
    }

    return Ok(());
}

#[tokio::test]
async fn it_aborts_while_sending() -> Result<()> {
    let (mut controller, mut rx) = controller(ScriptedTransport::new(vec![Script::Hang]));

    controller.submit("hi")?;
    assert!(controller.abort());
    settle(&mut controller).await?;

    let message = controller.transcript()[2].clone();
    assert_eq!(message.content, CONNECTION_ERROR_TEXT);
    assert!(!message.streaming);
    assert!(states(&drain(&mut rx)).contains(&SessionState::Failed));

    return Ok(());
}

#[tokio::test]
async fn it_aborts_while_streaming() -> Result<()> {
    let (feed, chunks) = mpsc::unbounded_channel::<Vec<u8>>();
    let (mut controller, _rx) = controller(ScriptedTransport::new(vec![Script::Feed(chunks)]));

    controller.submit("hi")?;
    feed.send(b"Hel".to_vec())?;

    // Connected, then the first snapshot.
    controller.step().await?;
    assert_eq!(controller.state(), SessionState::Streaming);
    controller.step().await?;
    assert_eq!(controller.transcript()[2].content, "Hel");

    assert!(controller.abort());
    settle(&mut controller).await?;

    let message = controller.transcript()[2].clone();
    assert_eq!(message.content, CONNECTION_ERROR_TEXT);
    assert!(!message.streaming);
    assert_eq!(controller.state(), SessionState::Idle);

    return Ok(());
}

#[tokio::test]
async fn it_does_nothing_when_aborting_while_idle() {
    let (mut controller, mut rx) = controller(ScriptedTransport::new(vec![]));

    assert!(!controller.abort());
    assert!(drain(&mut rx).is_empty());
}

#[tokio::test]
async fn it_clears_only_when_idle() -> Result<()> {
    let (mut controller, mut rx) = controller(ScriptedTransport::new(vec![
        Script::Chunks(vec!["one"]),
        Script::Hang,
    ]));

    controller.submit("first")?;
    settle(&mut controller).await?;
    controller.submit("second")?;
    drain(&mut rx);

    assert!(!controller.clear()?);
    assert_eq!(controller.transcript().len(), 5);
    assert!(drain(&mut rx).is_empty());

    controller.abort();
    settle(&mut controller).await?;
    drain(&mut rx);

    assert!(controller.clear()?);
    let transcript = controller.transcript();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript[0].content, CLEARED_TEXT);
    assert_eq!(
        notifications(&drain(&mut rx)),
        vec![Notification::success(CLEARED_NOTICE)]
    );

    return Ok(());
}

#[tokio::test]
async fn it_sends_the_same_session_id_with_every_request() -> Result<()> {
    let session = Session::new();
    let transport = ScriptedTransport::new(vec![
        Script::Chunks(vec!["a"]),
        Script::Chunks(vec!["b"]),
    ]);
    let requests = transport.requests();
    let (tx, _rx) = mpsc::unbounded_channel::<Event>();
    let mut controller = SessionController::new(session.clone(), Arc::new(transport), tx);

    controller.submit("first")?;
    settle(&mut controller).await?;
    controller.submit("second")?;
    settle(&mut controller).await?;

    let requests = requests.lock().unwrap().clone();
    assert_eq!(
        requests,
        vec![
            ("first".to_string(), session.id().clone()),
            ("second".to_string(), session.id().clone()),
        ]
    );

    return Ok(());
}

#[tokio::test]
async fn it_drops_stale_stream_events() -> Result<()> {
    let (mut controller, mut rx) = controller(ScriptedTransport::new(vec![Script::Hang]));
    let before = controller.transcript();

    controller.handle_stream_event(StreamEvent::Snapshot {
        message_id: MessageId::next(),
        content: "ghost".to_string(),
    })?;
    assert!(controller.transcript().shares_storage(&before));

    controller.submit("hi")?;
    drain(&mut rx);
    controller.handle_stream_event(StreamEvent::Snapshot {
        message_id: before[0].id,
        content: "ghost".to_string(),
    })?;
    assert!(drain(&mut rx).is_empty());
    assert_eq!(controller.transcript()[2].content, "");

    controller.abort();
    settle(&mut controller).await?;

    return Ok(());
}

#[tokio::test]
async fn it_shares_transcript_storage_between_reads() {
    let (controller, _rx) = controller(ScriptedTransport::new(vec![]));

    let first = controller.transcript();
    let second = controller.transcript();
    assert!(first.shares_storage(&second));
}

#[tokio::test]
async fn it_serves_actions_until_the_channel_closes() -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let transport = ScriptedTransport::new(vec![Script::Chunks(vec!["Hi ", "there"])]);
    let controller = SessionController::new(Session::new(), Arc::new(transport), event_tx);

    let worker = tokio::spawn(async move {
        return controller.start(&mut action_rx).await;
    });

    action_tx.send(Action::HealthCheck())?;
    action_tx.send(Action::Submit("hello".to_string()))?;

    let mut healthy = None;
    let mut answer = None;
    while healthy.is_none() || answer.is_none() {
        let event = tokio::time::timeout(Duration::from_secs(5), event_rx.recv()).await?;
        match event {
            Some(Event::HealthChecked(res)) => healthy = Some(res),
            Some(Event::TranscriptUpdated(transcript)) => {
                if let Some(last) = transcript.last() {
                    if last.role == Role::Assistant && !last.streaming && transcript.len() == 3 {
                        answer = Some(last.content.to_string());
                    }
                }
            }
            Some(_) => {}
            None => break,
        }
    }

    assert_eq!(healthy, Some(true));
    assert_eq!(answer, Some("Hi there".to_string()));

    drop(action_tx);
    tokio::time::timeout(Duration::from_secs(5), worker).await???;

    return Ok(());
}

#[tokio::test]
async fn it_reports_unhealthy_apis() -> Result<()> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let transport = ScriptedTransport::new(vec![]).unhealthy();
    let controller = SessionController::new(Session::new(), Arc::new(transport), event_tx);

    tokio::spawn(async move {
        return controller.start(&mut action_rx).await;
    });
    action_tx.send(Action::HealthCheck())?;

    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), event_rx.recv()).await?;
        if let Some(Event::HealthChecked(healthy)) = event {
            assert!(!healthy);
            break;
        }
    }

    return Ok(());
}

#[test]
fn it_uses_distinct_notification_levels() {
    assert_eq!(Notification::error(FAILURE_NOTICE).level, NotificationLevel::Error);
    assert_eq!(Notification::success(CLEARED_NOTICE).level, NotificationLevel::Success);
}
