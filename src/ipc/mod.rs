//! The boundary between the host and the UI. Everything that crosses it is a
//! [`UiToHost`] or [`HostToUi`] frame; the two sides share no memory.

pub mod client;
pub mod wire;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::protocol::{HostToUi, RequestId, Response, UiToHost};

pub use client::HostClient;

/// Frames buffered per direction before senders wait.
pub const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Error)]
pub enum IpcError {
    #[error("host channel closed")]
    HostClosed,
    #[error("host dropped request {0} without answering")]
    Dropped(RequestId),
    #[error("unexpected response to {request}: {response:?}")]
    UnexpectedResponse {
        request: &'static str,
        response: Response,
    },
    #[error("malformed frame: {0}")]
    Codec(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The UI's half of the boundary.
#[derive(Debug)]
pub struct UiEndpoint {
    pub to_host: mpsc::Sender<UiToHost>,
    pub from_host: mpsc::Receiver<HostToUi>,
}

/// The host's half of the boundary.
#[derive(Debug)]
pub struct HostEndpoint {
    pub from_ui: mpsc::Receiver<UiToHost>,
    pub to_ui: mpsc::Sender<HostToUi>,
}

pub fn channel_pair() -> (UiEndpoint, HostEndpoint) {
    let (to_host, from_ui) = mpsc::channel(CHANNEL_CAPACITY);
    let (to_ui, from_host) = mpsc::channel(CHANNEL_CAPACITY);

    (
        UiEndpoint { to_host, from_host },
        HostEndpoint { from_ui, to_ui },
    )
}
