pub mod args;
pub mod frontend;
pub mod host;
pub mod ipc;
pub mod protocol;
pub mod server;
pub mod ui;
