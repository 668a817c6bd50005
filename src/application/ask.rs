#[cfg(test)]
#[path = "ask_test.rs"]
mod tests;

use std::io;
use std::io::Write;
use std::process;

use anyhow::bail;
use anyhow::Result;
use owo_colors::OwoColorize;
use tokio::sync::mpsc;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Event;
use crate::domain::models::MessageId;
use crate::domain::models::Role;
use crate::domain::models::Session;
use crate::domain::models::Transcript;
use crate::domain::models::CONNECTION_ERROR_TEXT;
use crate::domain::services::SessionController;
use crate::infrastructure::transport::http::HttpTransport;
use crate::infrastructure::transport::TransportManager;

/// Writes the streamed answer as it grows, only ever printing what was not
/// printed before.
pub struct AnswerPrinter<W: Write> {
    writer: W,
    message_id: Option<MessageId>,
    printed: usize,
}

impl<W: Write> AnswerPrinter<W> {
    pub fn new(writer: W) -> AnswerPrinter<W> {
        return AnswerPrinter {
            writer,
            message_id: None,
            printed: 0,
        };
    }

    pub fn print(&mut self, transcript: &Transcript) -> Result<()> {
        let Some(message) = transcript.last() else {
            return Ok(());
        };
        if message.role != Role::Assistant || message.is_error() {
            return Ok(());
        }

        if self.message_id != Some(message.id) {
            self.message_id = Some(message.id);
            self.printed = 0;
        }

        let Some(delta) = message.content.get(self.printed..) else {
            tracing::warn!(message_id = %message.id, "Answer shrank while streaming");
            return Ok(());
        };
        if delta.is_empty() {
            return Ok(());
        }

        self.writer.write_all(delta.as_bytes())?;
        self.writer.flush()?;
        self.printed = message.content.len();

        return Ok(());
    }

    pub fn finish(mut self) -> Result<W> {
        if self.printed > 0 {
            self.writer.write_all(b"\n")?;
            self.writer.flush()?;
        }

        return Ok(self.writer);
    }
}

fn exit_with_connection_error() {
    eprintln!("{}", CONNECTION_ERROR_TEXT.red());
    process::exit(1);
}

/// Runs one question through the same controller the chat uses and streams
/// the answer to stdout.
pub async fn ask_streaming(query: &str) -> Result<()> {
    let transport = TransportManager::from_config()?;
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let mut controller = SessionController::new(Session::new(), transport, event_tx);

    if !controller.submit(query)? {
        bail!("Nothing to ask, the question is empty");
    }

    let printer = tokio::spawn(async move {
        let mut printer = AnswerPrinter::new(io::stdout());
        while let Some(event) = event_rx.recv().await {
            if let Event::TranscriptUpdated(transcript) = event {
                printer.print(&transcript)?;
            }
        }

        printer.finish()?;
        return Ok::<(), anyhow::Error>(());
    });

    controller.drive_until_idle().await?;
    let transcript = controller.transcript();
    drop(controller);
    printer.await??;

    if transcript.last().map_or(false, |message| return message.is_error()) {
        exit_with_connection_error();
    }

    return Ok(());
}

/// Same as `ask_streaming`, but waits for the whole answer from the
/// non-streaming endpoint.
pub async fn ask_once(query: &str) -> Result<()> {
    let query = query.trim();
    if query.is_empty() {
        bail!("Nothing to ask, the question is empty");
    }

    let timeout = Config::get(ConfigKey::RequestTimeout).parse::<u64>()?;
    let transport = HttpTransport::new(&Config::get(ConfigKey::ApiURL), timeout)?;
    let session = Session::new();

    match transport.chat(query, session.id()).await {
        Ok(reply) => {
            tracing::debug!(route = %reply.route, session_id = %session.id(), "Chat answered");
            println!("{}", reply.response);
        }
        Err(err) => {
            tracing::error!(error = ?err, session_id = %session.id(), "Chat request failed");
            exit_with_connection_error();
        }
    }

    return Ok(());
}
