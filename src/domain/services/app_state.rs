#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use anyhow::Result;
use ratatui::prelude::Rect;
use tokio::sync::mpsc;

use super::BubbleList;
use super::Preferences;
use super::Scroll;
use crate::domain::models::Action;
use crate::domain::models::Notification;
use crate::domain::models::SessionId;
use crate::domain::models::SessionState;
use crate::domain::models::SlashCommand;
use crate::domain::models::Theme;
use crate::domain::models::Transcript;
use crate::domain::models::SUGGESTIONS;

/// Ticks a toast stays on screen.
pub const TOAST_TICKS: u8 = 6;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /clear (/c, /reset) - Clears the conversation. Only works while no answer is streaming.
- /theme (/t) - Switches between the light and dark theme.
- /suggest (/s) [NUMBER] - Asks one of the suggested questions shown on an empty chat.
- /quit /exit (/q) - Exit FlipAssist.
- /help (/h) - Provides this help menu.

HOTKEYS:
- Up arrow - Scroll up
- Down arrow - Scroll down
- CTRL+U - Page up
- CTRL+D - Page down
- CTRL+T - Switch theme
- CTRL+C - Stop waiting for an answer if one is in progress, otherwise exit.
        "#;

    return text.trim().to_string();
}

pub struct Toast {
    pub notification: Notification,
    ticks_left: u8,
}

pub struct AppState {
    pub api_healthy: Option<bool>,
    pub bubble_list: BubbleList,
    pub help_visible: bool,
    pub last_known_height: u16,
    pub last_known_width: u16,
    pub preferences: Preferences,
    pub scroll: Scroll,
    pub session_id: SessionId,
    pub session_state: SessionState,
    pub theme: Theme,
    pub toast: Option<Toast>,
    pub transcript: Transcript,
}

impl AppState {
    pub fn new(session_id: SessionId, theme: Theme, preferences: Preferences) -> AppState {
        return AppState {
            api_healthy: None,
            bubble_list: BubbleList::new(theme),
            help_visible: false,
            last_known_height: 0,
            last_known_width: 0,
            preferences,
            scroll: Scroll::default(),
            session_id,
            session_state: SessionState::Idle,
            theme,
            toast: None,
            transcript: Transcript::default(),
        };
    }

    pub fn set_transcript(&mut self, transcript: Transcript) {
        self.transcript = transcript;
        self.sync_dependants();
        self.scroll.last();
    }

    pub fn set_session_state(&mut self, session_state: SessionState) {
        self.session_state = session_state;
    }

    pub fn is_waiting(&self) -> bool {
        return !self.session_state.is_idle();
    }

    pub fn show_suggestions(&self) -> bool {
        return self.transcript.len() <= 1 && !self.is_waiting();
    }

    pub fn notify(&mut self, notification: Notification) {
        self.toast = Some(Toast {
            notification,
            ticks_left: TOAST_TICKS,
        });
    }

    pub fn tick(&mut self) {
        if let Some(toast) = &mut self.toast {
            toast.ticks_left = toast.ticks_left.saturating_sub(1);
            if toast.ticks_left == 0 {
                self.toast = None;
            }
        }
    }

    /// Switches theme and persists the choice. A failed write only costs the
    /// preference on the next start.
    pub async fn toggle_theme(&mut self) {
        self.theme = self.theme.toggle();
        self.bubble_list.set_theme(self.theme);
        self.sync_dependants();

        if let Err(err) = self.preferences.save_theme(self.theme).await {
            tracing::error!(error = ?err, "Failed to save theme preference");
        }
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    /// Returns `(should_break, should_continue)`. `should_continue` means the
    /// input was a command and must not be sent as a question.
    pub async fn handle_slash_commands(
        &mut self,
        input_str: &str,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<(bool, bool)> {
        let Some(command) = SlashCommand::parse(input_str) else {
            return Ok((false, false));
        };

        if command.is_quit() {
            return Ok((true, false));
        }

        if command.is_clear() {
            if self.is_waiting() {
                self.notify(Notification::info(
                    "Wait for the current answer before clearing the chat",
                ));
            } else {
                tx.send(Action::Clear())?;
            }
            return Ok((false, true));
        }

        if command.is_theme() {
            self.toggle_theme().await;
            return Ok((false, true));
        }

        if command.is_help() {
            self.help_visible = true;
            return Ok((false, true));
        }

        if command.is_suggest() {
            let suggestion = command
                .suggestion_index()
                .and_then(|idx| return SUGGESTIONS.get(idx));

            match suggestion {
                Some(text) => tx.send(Action::Submit(text.to_string()))?,
                None => self.notify(Notification::error(&format!(
                    "Pick a suggestion between 1 and {}",
                    SUGGESTIONS.len()
                ))),
            }
            return Ok((false, true));
        }

        return Ok((false, false));
    }

    fn sync_dependants(&mut self) {
        self.bubble_list
            .set_messages(&self.transcript, self.last_known_width.into());

        let list_length = u16::try_from(self.bubble_list.len()).unwrap_or(u16::MAX);
        self.scroll.set_state(list_length, self.last_known_height);
    }
}
