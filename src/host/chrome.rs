use std::path::PathBuf;

use log::{info, warn};
use tokio::fs;
use tokio::sync::oneshot;

use crate::protocol::{MenuCommand, Notification};

pub const CONTEXT_MENU_ITEMS: [MenuCommand; 2] = [MenuCommand::NewFile, MenuCommand::NewDirectory];

/// Input delivered to the native window chrome: menu items, accelerators
/// and the open-directory picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChromeAction {
    OpenDirectory(PathBuf),
    Save,
    ChooseMenuItem(MenuCommand),
    DismissMenu,
}

/// A chrome action as queued to the host. Once the action is handled,
/// `handled` receives the number of notifications the host has sent so far.
#[derive(Debug)]
pub struct ChromeInput {
    pub action: ChromeAction,
    pub handled: Option<oneshot::Sender<u64>>,
}

impl ChromeInput {
    pub fn acknowledged(action: ChromeAction) -> (Self, oneshot::Receiver<u64>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                action,
                handled: Some(tx),
            },
            rx,
        )
    }
}

impl From<ChromeAction> for ChromeInput {
    fn from(action: ChromeAction) -> Self {
        Self {
            action,
            handled: None,
        }
    }
}

/// Native chrome state owned by the host. The only state is the context
/// menu currently popped up and the path it was opened on.
#[derive(Debug, Default)]
pub struct Chrome {
    context_menu: Option<PathBuf>,
}

impl Chrome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_context_menu(&mut self, target: PathBuf) -> &'static [MenuCommand] {
        info!("show-context-menu on {:?}", target);
        self.context_menu = Some(target);
        &CONTEXT_MENU_ITEMS
    }

    pub fn context_menu_target(&self) -> Option<&PathBuf> {
        self.context_menu.as_ref()
    }

    /// Turns a chrome action into the notification the UI should receive,
    /// if any. Any action closes an open context menu.
    pub async fn handle(&mut self, action: ChromeAction) -> Option<Notification> {
        let menu = self.context_menu.take();

        match action {
            ChromeAction::OpenDirectory(path) => Self::open_directory(path).await,
            ChromeAction::Save => Some(Notification::SaveRequested),
            ChromeAction::ChooseMenuItem(command) => match menu {
                Some(target) => {
                    info!("context-menu-command {:?} on {:?}", command, target);
                    Some(Notification::ContextMenuCommand { command, target })
                }
                None => {
                    warn!("Menu item {:?} chosen with no context menu open", command);
                    None
                }
            },
            ChromeAction::DismissMenu => None,
        }
    }

    async fn open_directory(path: PathBuf) -> Option<Notification> {
        match fs::metadata(&path).await {
            Ok(metadata) if metadata.is_dir() => {}
            Ok(_) => {
                warn!("{:?} is not a directory", path);
                return None;
            }
            Err(e) => {
                warn!("Directory {:?} is not accessible: {}", path, e);
                return None;
            }
        }

        match fs::canonicalize(&path).await {
            Ok(canonical) => {
                info!("directory-opened: {:?}", canonical);
                Some(Notification::DirectoryOpened { path: canonical })
            }
            Err(e) => {
                warn!("Failed to canonicalize directory {:?}: {}", path, e);
                None
            }
        }
    }
}
