mod app_state;
mod bubble;
mod bubble_list;
mod decoder;
pub mod events;
mod preferences;
mod reconciler;
mod scroll;
mod session_controller;
mod transcript;

pub use app_state::*;
pub use bubble::*;
pub use bubble_list::*;
pub use decoder::*;
pub use preferences::*;
pub use reconciler::*;
pub use scroll::*;
pub use session_controller::*;
pub use transcript::*;
