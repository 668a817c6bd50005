#[cfg(test)]
#[path = "http_test.rs"]
mod tests;

use std::fmt;
use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::models::ResponseHandle;
use crate::domain::models::RouteTag;
use crate::domain::models::SessionId;
use crate::domain::models::Transport;
use crate::domain::models::TransportError;

/// Response header naming the route the backend picked for a streamed answer.
pub const ROUTE_HEADER: &str = "x-route";

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct ChatRequest {
    query: String,
    session_id: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub route: String,
    pub response: String,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    pub active: u64,
    pub total_stored: u64,
    pub ttl_minutes: u64,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromaStats {
    pub status: String,
    pub collection: String,
    pub faq_documents: Option<u64>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteStats {
    pub status: String,
    pub product_count: Option<u64>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterStats {
    pub available_routes: Vec<String>,
}

#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminStats {
    pub uptime: String,
    pub uptime_seconds: u64,
    pub sessions: SessionStats,
    pub chromadb: ChromaStats,
    pub sqlite: SqliteStats,
    pub router: RouterStats,
}

fn count_or_dash(count: Option<u64>) -> String {
    return count
        .map(|e| return e.to_string())
        .unwrap_or_else(|| return "-".to_string());
}

impl fmt::Display for AdminStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Uptime:    {}", self.uptime)?;
        writeln!(
            f,
            "Sessions:  {} active, {} stored, {} minute TTL",
            self.sessions.active, self.sessions.total_stored, self.sessions.ttl_minutes
        )?;
        writeln!(
            f,
            "ChromaDB:  {} ({}, {} FAQ documents)",
            self.chromadb.status,
            self.chromadb.collection,
            count_or_dash(self.chromadb.faq_documents)
        )?;
        writeln!(
            f,
            "SQLite:    {} ({} products)",
            self.sqlite.status,
            count_or_dash(self.sqlite.product_count)
        )?;
        return write!(f, "Routes:    {}", self.router.available_routes.join(", "));
    }
}

pub struct HttpTransport {
    url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(url: &str, timeout_ms: u64) -> Result<HttpTransport> {
        let timeout = Duration::from_millis(timeout_ms);
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .build()?;

        return Ok(HttpTransport {
            url: url.trim_end_matches('/').to_string(),
            timeout,
            client,
        });
    }

    /// Non-streaming variant of a chat request.
    pub async fn chat(&self, query: &str, session_id: &SessionId) -> Result<ChatReply> {
        let req = ChatRequest {
            query: query.to_string(),
            session_id: session_id.to_string(),
        };

        let res = self
            .client
            .post(format!("{url}/chat", url = self.url))
            .timeout(self.timeout)
            .json(&req)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Chat request failed");
            bail!("Chat request failed with status {}", res.status().as_u16());
        }

        return Ok(res.json::<ChatReply>().await?);
    }

    pub async fn stats(&self) -> Result<AdminStats> {
        let res = self
            .client
            .get(format!("{url}/admin/stats", url = self.url))
            .timeout(self.timeout)
            .send()
            .await?;

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "Stats request failed");
            bail!("Stats request failed with status {}", res.status().as_u16());
        }

        return Ok(res.json::<AdminStats>().await?);
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        let res = self
            .client
            .get(format!("{url}/health", url = self.url))
            .timeout(self.timeout)
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "FlipAssist API is not running");
                bail!("FlipAssist API is not running");
            }
        };

        if !res.status().is_success() {
            tracing::error!(status = res.status().as_u16(), "FlipAssist API health check failed");
            bail!("FlipAssist API health check failed");
        }

        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn submit_query(
        &self,
        query: &str,
        session_id: &SessionId,
    ) -> Result<ResponseHandle, TransportError> {
        let req = ChatRequest {
            query: query.to_string(),
            session_id: session_id.to_string(),
        };

        let send = self
            .client
            .post(format!("{url}/chat/stream", url = self.url))
            .json(&req)
            .send();

        // Only the wait for headers is bounded, a long answer may keep
        // streaming past the timeout.
        let res = match tokio::time::timeout(self.timeout, send).await {
            Ok(Ok(res)) => res,
            Ok(Err(err)) => {
                tracing::error!(error = ?err, "Failed to reach the chat API");
                return Err(TransportError::Connection(err.to_string()));
            }
            Err(_) => {
                let timeout_ms = self.timeout.as_millis();
                tracing::error!(timeout_ms, "Timed out waiting for the chat API");
                return Err(TransportError::Connection(format!(
                    "no response within {timeout_ms}ms"
                )));
            }
        };

        if !res.status().is_success() {
            tracing::error!(
                status = res.status().as_u16(),
                "Chat stream request was rejected"
            );
            return Err(TransportError::Status(res.status().as_u16()));
        }

        let route_tag = res
            .headers()
            .get(ROUTE_HEADER)
            .and_then(|value| return value.to_str().ok())
            .map(RouteTag::parse);

        let chunks = res
            .bytes_stream()
            .map(|chunk| match chunk {
                Ok(bytes) => return Ok(bytes.to_vec()),
                Err(err) => return Err(TransportError::Read(err.to_string())),
            })
            .boxed();

        return Ok(ResponseHandle::new(chunks).with_route_tag(route_tag));
    }
}
