#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;

use super::RouteTag;
use super::SessionId;

/// Failure kinds of a chat request. Presentation never sees these directly,
/// the controller folds them into the transcript.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("unable to reach the chat API: {0}")]
    Connection(String),
    #[error("chat API responded with status {0}")]
    Status(u16),
    #[error("response stream failed after it started: {0}")]
    Read(String),
    #[error("request was aborted")]
    Aborted,
}

impl TransportError {
    /// Short label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Connection(_) => return "connection",
            TransportError::Status(_) => return "protocol",
            TransportError::Read(_) => return "mid-stream",
            TransportError::Aborted => return "aborted",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ChunkRead {
    Data(Vec<u8>),
    End,
}

/// Body of a successful chat response, consumed one raw chunk at a time.
pub struct ResponseHandle {
    chunks: BoxStream<'static, Result<Vec<u8>, TransportError>>,
    route_tag: Option<RouteTag>,
}

impl ResponseHandle {
    pub fn new(chunks: BoxStream<'static, Result<Vec<u8>, TransportError>>) -> ResponseHandle {
        return ResponseHandle {
            chunks,
            route_tag: None,
        };
    }

    pub fn with_route_tag(mut self, route_tag: Option<RouteTag>) -> ResponseHandle {
        self.route_tag = route_tag;
        return self;
    }

    pub fn route_tag(&self) -> Option<RouteTag> {
        return self.route_tag;
    }

    /// Waits for the next raw chunk. Yields `ChunkRead::End` once the body is
    /// exhausted.
    pub async fn next_chunk(&mut self) -> Result<ChunkRead, TransportError> {
        match self.chunks.next().await {
            Some(Ok(bytes)) => return Ok(ChunkRead::Data(bytes)),
            Some(Err(err)) => return Err(err),
            None => return Ok(ChunkRead::End),
        }
    }
}

#[async_trait]
pub trait Transport {
    /// Used by presentation to display connectivity status.
    async fn health_check(&self) -> Result<()>;

    /// Opens a streaming chat request for `query`. The query must already be
    /// trimmed and non-empty. No retries happen at this layer.
    async fn submit_query(
        &self,
        query: &str,
        session_id: &SessionId,
    ) -> Result<ResponseHandle, TransportError>;
}

pub type SharedTransport = Arc<dyn Transport + Send + Sync>;
