//! The sandboxed side: session state, the file tree and tabs, and the
//! controller that turns user input into host requests.

pub mod controller;
pub mod file_tree;
pub mod language;
pub mod prompt;
pub mod render;
pub mod session_state;
pub mod toast;
pub mod widget;

pub use controller::{Progress, UiController, UiEvent};
pub use session_state::Session;
