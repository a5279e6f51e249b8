pub mod chrome;
pub mod handlers;
pub mod session;

pub use chrome::{Chrome, ChromeAction, ChromeInput};
pub use session::dispatch;
