use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::protocol::{
    DirectoryEntry, HostToUi, Notification, OpOutcome, Request, RequestId, Response, UiToHost,
};

use super::{IpcError, UiEndpoint};

type PendingReplies = Arc<Mutex<HashMap<RequestId, oneshot::Sender<Response>>>>;

/// UI-side handle on the host. Each request gets its own id and waits only
/// for the reply carrying that id, so replies may arrive in any order.
#[derive(Debug)]
pub struct HostClient {
    to_host: mpsc::Sender<UiToHost>,
    pending: PendingReplies,
    next_id: AtomicU64,
}

impl HostClient {
    /// Starts the task that routes host frames: replies go to their waiting
    /// request, notifications go to `notifications`.
    pub fn connect(
        endpoint: UiEndpoint,
        notifications: mpsc::UnboundedSender<Notification>,
    ) -> (Self, JoinHandle<()>) {
        let UiEndpoint {
            to_host,
            mut from_host,
        } = endpoint;
        let pending = PendingReplies::default();

        let routes = pending.clone();
        let demux = tokio::spawn(async move {
            while let Some(frame) = from_host.recv().await {
                match frame {
                    HostToUi::Response { id, response } => {
                        let waiter = routes.lock().ok().and_then(|mut map| map.remove(&id));
                        match waiter {
                            Some(waiter) => {
                                let _ = waiter.send(response);
                            }
                            None => warn!("Reply {} matches no pending request", id),
                        }
                    }
                    HostToUi::Notification { notification } => {
                        if notifications.send(notification).is_err() {
                            debug!("UI inbox closed, dropping notification");
                        }
                    }
                }
            }
            debug!("Host connection closed");
            // Wake every waiter so nobody hangs on a dead host.
            if let Ok(mut map) = routes.lock() {
                map.clear();
            }
        });

        (
            Self {
                to_host,
                pending,
                next_id: AtomicU64::new(1),
            },
            demux,
        )
    }

    pub async fn request(&self, request: Request) -> Result<Response, IpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .map_err(|_| IpcError::HostClosed)?
            .insert(id, tx);

        debug!("request {} {}", id, request.name());
        if self
            .to_host
            .send(UiToHost::Request { id, request })
            .await
            .is_err()
        {
            if let Ok(mut map) = self.pending.lock() {
                map.remove(&id);
            }
            return Err(IpcError::HostClosed);
        }

        rx.await.map_err(|_| IpcError::Dropped(id))
    }

    pub async fn list_directory(&self, path: &Path) -> Result<Vec<DirectoryEntry>, IpcError> {
        match self
            .request(Request::ListDirectory {
                path: path.to_path_buf(),
            })
            .await?
        {
            Response::Entries(entries) => Ok(entries),
            response => Err(IpcError::UnexpectedResponse {
                request: "list-directory",
                response,
            }),
        }
    }

    pub async fn read_file(&self, path: &Path) -> Result<String, IpcError> {
        match self
            .request(Request::ReadFile {
                path: path.to_path_buf(),
            })
            .await?
        {
            Response::Text(text) => Ok(text),
            response => Err(IpcError::UnexpectedResponse {
                request: "read-file",
                response,
            }),
        }
    }

    pub async fn write_file(&self, path: &Path, text: String) -> Result<OpOutcome, IpcError> {
        self.outcome(Request::WriteFile {
            path: path.to_path_buf(),
            text,
        })
        .await
    }

    pub async fn create_file(&self, path: &Path) -> Result<OpOutcome, IpcError> {
        self.outcome(Request::CreateFile {
            path: path.to_path_buf(),
        })
        .await
    }

    pub async fn create_directory(&self, path: &Path) -> Result<OpOutcome, IpcError> {
        self.outcome(Request::CreateDirectory {
            path: path.to_path_buf(),
        })
        .await
    }

    /// Asks the host to pop up the file explorer context menu on `target`.
    pub async fn show_context_menu(&self, target: PathBuf) -> Result<(), IpcError> {
        self.to_host
            .send(UiToHost::ShowContextMenu { target })
            .await
            .map_err(|_| IpcError::HostClosed)
    }

    async fn outcome(&self, request: Request) -> Result<OpOutcome, IpcError> {
        let name = request.name();
        match self.request(request).await? {
            Response::Outcome(outcome) => Ok(outcome),
            response => Err(IpcError::UnexpectedResponse {
                request: name,
                response,
            }),
        }
    }
}
