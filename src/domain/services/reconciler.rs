#[cfg(test)]
#[path = "reconciler_test.rs"]
mod tests;

use tokio_util::sync::CancellationToken;

use super::Utf8Decoder;
use crate::domain::models::ChunkRead;
use crate::domain::models::ResponseHandle;
use crate::domain::models::TransportError;

/// Turns a response body into a growing text snapshot.
pub struct StreamReconciler {
    decoder: Utf8Decoder,
    accumulated: String,
    cancel: CancellationToken,
}

impl StreamReconciler {
    pub fn new(cancel: CancellationToken) -> StreamReconciler {
        return StreamReconciler {
            decoder: Utf8Decoder::default(),
            accumulated: "".to_string(),
            cancel,
        };
    }

    /// Reads `handle` to the end, calling `on_chunk` with the full text
    /// received so far after every chunk. Returns the final text.
    ///
    /// A failed read, or a cancelled token, ends the loop without another
    /// `on_chunk` call.
    pub async fn consume<F>(
        mut self,
        mut handle: ResponseHandle,
        mut on_chunk: F,
    ) -> Result<String, TransportError>
    where
        F: FnMut(&str),
    {
        let mut chunk_count = 0;

        loop {
            let read = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => {
                    tracing::debug!(chunk_count, "Stream aborted");
                    return Err(TransportError::Aborted);
                }
                read = handle.next_chunk() => read,
            };

            match read? {
                ChunkRead::Data(bytes) => {
                    chunk_count += 1;
                    let text = self.decoder.decode(&bytes);
                    self.accumulated.push_str(&text);
                    on_chunk(&self.accumulated);
                }
                ChunkRead::End => break,
            }
        }

        if self.decoder.has_pending() {
            tracing::warn!(chunk_count, "Stream ended inside a multi-byte character");
            self.accumulated.push_str(&self.decoder.finish());
            on_chunk(&self.accumulated);
        }

        tracing::debug!(
            chunk_count,
            length = self.accumulated.len(),
            "Stream finished"
        );

        return Ok(self.accumulated);
    }
}
