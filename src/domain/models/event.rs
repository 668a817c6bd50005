use tui_textarea::Input;

use super::Notification;
use super::SessionState;
use super::Transcript;

pub enum Event {
    HealthChecked(bool),
    KeyboardCharInput(Input),
    KeyboardCTRLC(),
    KeyboardCTRLT(),
    KeyboardEnter(),
    KeyboardPaste(String),
    Notify(Notification),
    SessionStateChanged(SessionState),
    TranscriptUpdated(Transcript),
    UIScrollDown(),
    UIScrollUp(),
    UIScrollPageDown(),
    UIScrollPageUp(),
    UITick(),
}
