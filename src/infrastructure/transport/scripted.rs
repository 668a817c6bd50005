use std::sync::Arc;
use std::sync::Mutex;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use futures::stream;
use futures::StreamExt;
use tokio::sync::mpsc;

use crate::domain::models::ResponseHandle;
use crate::domain::models::RouteTag;
use crate::domain::models::SessionId;
use crate::domain::models::Transport;
use crate::domain::models::TransportError;

/// How the next request is answered.
pub enum Script {
    Chunks(Vec<&'static str>),
    ChunksThenFailure(Vec<&'static str>),
    Status(u16),
    Unreachable,
    /// Chunks are pushed by the test through the paired sender.
    Feed(mpsc::UnboundedReceiver<Vec<u8>>),
    /// Never answers.
    Hang,
}

/// In-memory transport answering each request with the next queued script.
#[derive(Default)]
pub struct ScriptedTransport {
    scripts: Mutex<Vec<Script>>,
    route_tag: Option<RouteTag>,
    healthy: bool,
    requests: Arc<Mutex<Vec<(String, SessionId)>>>,
}

impl ScriptedTransport {
    pub fn new(scripts: Vec<Script>) -> ScriptedTransport {
        return ScriptedTransport {
            scripts: Mutex::new(scripts),
            healthy: true,
            ..ScriptedTransport::default()
        };
    }

    pub fn with_route_tag(mut self, route_tag: RouteTag) -> ScriptedTransport {
        self.route_tag = Some(route_tag);
        return self;
    }

    pub fn unhealthy(mut self) -> ScriptedTransport {
        self.healthy = false;
        return self;
    }

    /// Shared view of every `(query, session_id)` received so far.
    pub fn requests(&self) -> Arc<Mutex<Vec<(String, SessionId)>>> {
        return self.requests.clone();
    }
}

fn ok_chunks(chunks: Vec<&'static str>) -> Vec<Result<Vec<u8>, TransportError>> {
    return chunks
        .into_iter()
        .map(|chunk| return Ok(chunk.as_bytes().to_vec()))
        .collect();
}

#[async_trait]
impl Transport for ScriptedTransport {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        if !self.healthy {
            bail!("Scripted transport is unhealthy");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn submit_query(
        &self,
        query: &str,
        session_id: &SessionId,
    ) -> Result<ResponseHandle, TransportError> {
        self.requests
            .lock()
            .unwrap()
            .push((query.to_string(), session_id.clone()));

        let script = {
            let mut scripts = self.scripts.lock().unwrap();
            if scripts.is_empty() {
                Script::Unreachable
            } else {
                scripts.remove(0)
            }
        };

        let chunks = match script {
            Script::Chunks(chunks) => stream::iter(ok_chunks(chunks)).boxed(),
            Script::ChunksThenFailure(chunks) => {
                let mut chunks = ok_chunks(chunks);
                chunks.push(Err(TransportError::Read("connection reset".to_string())));
                stream::iter(chunks).boxed()
            }
            Script::Status(status) => return Err(TransportError::Status(status)),
            Script::Unreachable => {
                return Err(TransportError::Connection("connection refused".to_string()))
            }
            Script::Feed(rx) => {
                stream::unfold(rx, |mut rx| async move {
                    let bytes = rx.recv().await?;
                    return Some((Ok::<Vec<u8>, TransportError>(bytes), rx));
                })
                .boxed()
            }
            Script::Hang => return futures::future::pending().await,
        };

        return Ok(ResponseHandle::new(chunks).with_route_tag(self.route_tag));
    }
}
