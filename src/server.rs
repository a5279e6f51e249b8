use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::sync::mpsc;

use crate::host::{Chrome, ChromeAction, ChromeInput, dispatch};
use crate::ipc::{self, HostEndpoint, IpcError, wire};
use crate::protocol::{HostToUi, Notification, UiToHost};

#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Directory reported as opened as soon as the host starts.
    pub initial_dir: Option<PathBuf>,
    /// Print context menus to stdout when they pop up.
    pub echo_menus: bool,
}

/// The privileged side: serves filesystem requests and turns chrome input
/// into notifications for the UI.
pub struct Server {
    pub config: Arc<ServerConfig>,
    chrome: Chrome,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            chrome: Chrome::new(),
        }
    }

    /// Runs until the UI disconnects. Requests are served on their own
    /// tasks, so replies may go out in a different order than requests came.
    /// UI frames already queued are handled before chrome input.
    pub async fn run(
        mut self,
        endpoint: HostEndpoint,
        mut chrome_input: mpsc::Receiver<ChromeInput>,
    ) -> Result<(), IpcError> {
        let HostEndpoint { mut from_ui, to_ui } = endpoint;
        let mut chrome_open = true;
        let mut notified: u64 = 0;

        if let Some(dir) = self.config.initial_dir.clone() {
            if let Some(notification) = self.chrome.handle(ChromeAction::OpenDirectory(dir)).await
            {
                Self::notify(&to_ui, notification).await?;
                notified += 1;
            }
        }

        info!("Host ready");

        loop {
            tokio::select! {
                biased;

                message = from_ui.recv() => match message {
                    Some(UiToHost::Request { id, request }) => {
                        let to_ui = to_ui.clone();
                        tokio::spawn(async move {
                            let response = dispatch(request).await;
                            if to_ui.send(HostToUi::Response { id, response }).await.is_err() {
                                warn!("UI went away before reply {} was delivered", id);
                            }
                        });
                    }
                    Some(UiToHost::ShowContextMenu { target }) => {
                        let items = self.chrome.show_context_menu(target);
                        if self.config.echo_menus {
                            let labels: Vec<String> = items
                                .iter()
                                .map(|item| format!("[{}] {}", item.key(), item.label()))
                                .collect();
                            println!("Context menu: {}", labels.join("  "));
                        }
                    }
                    None => {
                        info!("UI disconnected, host shutting down");
                        break;
                    }
                },
                input = chrome_input.recv(), if chrome_open => match input {
                    Some(ChromeInput { action, handled }) => {
                        if let Some(notification) = self.chrome.handle(action).await {
                            Self::notify(&to_ui, notification).await?;
                            notified += 1;
                        }
                        if let Some(handled) = handled {
                            let _ = handled.send(notified);
                        }
                    }
                    None => chrome_open = false,
                },
            }
        }

        Ok(())
    }

    /// Serves the message contract as JSON lines, for a UI living in another
    /// process. There is no chrome input in this mode.
    pub async fn serve_lines<R, W>(self, reader: R, writer: W) -> Result<(), IpcError>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (ui, host) = ipc::channel_pair();
        let (no_chrome, chrome_input) = mpsc::channel(1);
        drop(no_chrome);

        let reader_task = tokio::spawn(wire::read_frames::<_, UiToHost>(reader, ui.to_host));
        let writer_task = tokio::spawn(wire::write_frames::<_, HostToUi>(writer, ui.from_host));

        self.run(host, chrome_input).await?;

        match reader_task.await {
            Ok(result) => result?,
            Err(e) => warn!("Frame reader task failed: {}", e),
        }
        match writer_task.await {
            Ok(result) => result?,
            Err(e) => warn!("Frame writer task failed: {}", e),
        }
        Ok(())
    }

    async fn notify(
        to_ui: &mpsc::Sender<HostToUi>,
        notification: Notification,
    ) -> Result<(), IpcError> {
        to_ui
            .send(HostToUi::Notification { notification })
            .await
            .map_err(|_| IpcError::HostClosed)
    }
}
