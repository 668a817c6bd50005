mod action;
mod event;
mod loading;
mod message;
mod notification;
mod route;
mod session;
mod slash_commands;
mod stream_event;
mod suggestion;
mod textarea;
mod theme;
mod transcript;
mod transport;

pub use action::*;
pub use event::*;
pub use loading::*;
pub use message::*;
pub use notification::*;
pub use route::*;
pub use session::*;
pub use slash_commands::*;
pub use stream_event::*;
pub use suggestion::*;
pub use textarea::*;
pub use theme::*;
pub use transcript::*;
pub use transport::*;
