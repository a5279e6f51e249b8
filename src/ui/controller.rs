use std::path::{Component, Path, PathBuf};
use std::time::Instant;

use log::{debug, info, warn};
use tokio::sync::{mpsc, watch};

use crate::ipc::{HostClient, IpcError};
use crate::protocol::{MenuCommand, Notification, OpOutcome};

use super::file_tree::FileTree;
use super::prompt::Prompter;
use super::render;
use super::session_state::Session;
use super::widget::EditorWidget;

pub const NAME_PROMPT: &str = "Enter a name:";

/// Input coming straight from the UI surface (clicks, keystrokes), as
/// opposed to notifications relayed by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ClickNode(PathBuf),
    RightClickNode(PathBuf),
    RightClickBackground,
    SelectTab(PathBuf),
    CloseTab(PathBuf),
    ReplaceText(String),
    AppendLine(String),
    Render,
}

/// How many events and notifications [`UiController::run`] has finished
/// handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    pub events: u64,
    pub notifications: u64,
}

/// Drives a [`Session`] from user events and host notifications, talking to
/// the host only through its [`HostClient`].
pub struct UiController<W: EditorWidget, P: Prompter> {
    session: Session<W>,
    host: HostClient,
    prompter: P,
    progress: watch::Sender<Progress>,
}

impl<W, P> UiController<W, P>
where
    W: EditorWidget + Send,
    P: Prompter + Send,
{
    pub fn new(session: Session<W>, host: HostClient, prompter: P) -> Self {
        Self {
            session,
            host,
            prompter,
            progress: watch::Sender::new(Progress::default()),
        }
    }

    pub fn session(&self) -> &Session<W> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<W> {
        &mut self.session
    }

    pub fn host(&self) -> &HostClient {
        &self.host
    }

    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    pub fn progress(&self) -> watch::Receiver<Progress> {
        self.progress.subscribe()
    }

    /// Processes events and notifications until the event source closes,
    /// handing a fresh render to `on_render` after each one.
    pub async fn run<F>(
        mut self,
        mut notifications: mpsc::UnboundedReceiver<Notification>,
        mut events: mpsc::UnboundedReceiver<UiEvent>,
        mut on_render: F,
    ) -> Result<(), IpcError>
    where
        F: FnMut(String) + Send,
    {
        let mut host_open = true;

        loop {
            tokio::select! {
                biased;

                notification = notifications.recv(), if host_open => match notification {
                    Some(notification) => {
                        self.handle_notification(notification).await?;
                        self.progress.send_modify(|p| p.notifications += 1);
                    }
                    None => {
                        debug!("Notification stream closed");
                        host_open = false;
                        continue;
                    }
                },
                event = events.recv() => match event {
                    Some(event) => {
                        self.handle_event(event).await?;
                        self.progress.send_modify(|p| p.events += 1);
                    }
                    None => break,
                },
            }

            on_render(self.render());
        }

        info!("UI shutting down");
        self.session.close_all();
        Ok(())
    }

    pub fn render(&mut self) -> String {
        let now = Instant::now();
        self.session.toasts.prune(now);
        render::render(&self.session, now)
    }

    pub async fn handle_notification(&mut self, notification: Notification) -> Result<(), IpcError> {
        debug!("notification {:?}", notification);

        match notification {
            Notification::DirectoryOpened { path } => self.open_directory(path).await,
            Notification::SaveRequested => self.save_active().await,
            Notification::ContextMenuCommand { command, target } => {
                self.create_item(command, &target).await
            }
        }
    }

    pub async fn handle_event(&mut self, event: UiEvent) -> Result<(), IpcError> {
        debug!("event {:?}", event);

        match event {
            UiEvent::ClickNode(path) => {
                let path = self.resolve(&path);
                self.click_node(&path).await
            }
            UiEvent::RightClickNode(path) => {
                let path = self.resolve(&path);
                self.host.show_context_menu(path).await
            }
            UiEvent::RightClickBackground => match self.session.root_path() {
                Some(root) => self.host.show_context_menu(root.to_path_buf()).await,
                None => Ok(()),
            },
            UiEvent::SelectTab(path) => {
                let path = self.resolve(&path);
                if !self.session.activate(&path) {
                    warn!("No tab for {:?}", path);
                }
                Ok(())
            }
            UiEvent::CloseTab(path) => {
                let path = self.resolve(&path);
                if !self.session.close_buffer(&path) {
                    warn!("No tab for {:?}", path);
                }
                Ok(())
            }
            UiEvent::ReplaceText(text) => {
                self.session.set_active_text(text);
                Ok(())
            }
            UiEvent::AppendLine(line) => {
                if let Some((_, mut text)) = self.session.active_text() {
                    if !text.is_empty() && !text.ends_with('\n') {
                        text.push('\n');
                    }
                    text.push_str(&line);
                    text.push('\n');
                    self.session.set_active_text(text);
                }
                Ok(())
            }
            UiEvent::Render => Ok(()),
        }
    }

    /// Lists `path` and shows it as the new tree root.
    pub async fn open_directory(&mut self, path: PathBuf) -> Result<(), IpcError> {
        let entries = self.host.list_directory(&path).await?;
        self.session.set_tree(FileTree::new(path, entries));
        Ok(())
    }

    /// Rebuilds the whole tree from the root, dropping all expansion state.
    pub async fn reload_tree(&mut self) -> Result<(), IpcError> {
        match self.session.root_path().map(Path::to_path_buf) {
            Some(root) => self.open_directory(root).await,
            None => Ok(()),
        }
    }

    pub async fn click_node(&mut self, path: &Path) -> Result<(), IpcError> {
        let is_directory = match self.session.tree().and_then(|t| t.find(path)) {
            Some(node) => node.is_directory,
            None => {
                warn!("{:?} is not in the file tree", path);
                return Ok(());
            }
        };

        if is_directory {
            self.toggle_directory(path).await
        } else {
            self.open_file(path).await
        }
    }

    pub async fn toggle_directory(&mut self, path: &Path) -> Result<(), IpcError> {
        let expanded = self
            .session
            .tree()
            .and_then(|t| t.find(path))
            .is_some_and(|n| n.is_expanded());

        if expanded {
            if let Some(tree) = self.session.tree_mut() {
                tree.collapse(path);
            }
            return Ok(());
        }

        let entries = self.host.list_directory(path).await?;
        if let Some(tree) = self.session.tree_mut() {
            tree.expand(path, entries);
        }
        Ok(())
    }

    /// Activates the buffer for `path`, reading it from the host first if it
    /// is not open yet.
    pub async fn open_file(&mut self, path: &Path) -> Result<(), IpcError> {
        if self.session.activate(path) {
            return Ok(());
        }

        let text = self.host.read_file(path).await?;
        self.session.open_buffer(path, text);
        Ok(())
    }

    /// Writes the active buffer's current text back to its file.
    pub async fn save_active(&mut self) -> Result<(), IpcError> {
        let Some((path, text)) = self.session.active_text() else {
            debug!("Save requested with no active buffer");
            return Ok(());
        };

        let outcome = self.host.write_file(&path, text).await?;
        self.report(outcome, "File saved.");
        Ok(())
    }

    /// Creates a file or folder next to or inside `target`, named by the
    /// user.
    pub async fn create_item(&mut self, command: MenuCommand, target: &Path) -> Result<(), IpcError> {
        let parent = self.parent_for(target);

        let name = match self.prompter.prompt(NAME_PROMPT).await {
            Some(name) if !name.trim().is_empty() => name.trim().to_owned(),
            _ => {
                debug!("{} cancelled", command.key());
                return Ok(());
            }
        };

        let Some(path) = child_path(&parent, &name) else {
            warn!("Refusing to create {:?} outside {:?}", name, parent);
            self.session
                .toasts
                .error(format!("Error: invalid name: {name}"));
            return Ok(());
        };
        let (outcome, done) = match command {
            MenuCommand::NewFile => (self.host.create_file(&path).await?, "File created."),
            MenuCommand::NewDirectory => {
                (self.host.create_directory(&path).await?, "Folder created.")
            }
        };

        let success = outcome.success;
        self.report(outcome, done);
        if success {
            self.reload_tree().await?;
        }
        Ok(())
    }

    /// A directory target is the parent itself; anything else creates next
    /// to it.
    fn parent_for(&self, target: &Path) -> PathBuf {
        let is_directory = self
            .session
            .tree()
            .is_some_and(|t| t.is_directory(target));

        if is_directory {
            target.to_path_buf()
        } else {
            target
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| target.to_path_buf())
        }
    }

    fn report(&mut self, outcome: OpOutcome, success_message: &str) {
        if outcome.success {
            self.session.toasts.info(success_message);
        } else {
            let error = outcome.error.unwrap_or_else(|| "unknown error".to_owned());
            warn!("Operation failed: {}", error);
            self.session.toasts.error(format!("Error: {error}"));
        }
    }

    /// Relative paths typed by the user are taken from the tree root.
    fn resolve(&self, path: &Path) -> PathBuf {
        match self.session.root_path() {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

/// `name` nested under `parent`, or `None` if it is absolute or climbs out.
fn child_path(parent: &Path, name: &str) -> Option<PathBuf> {
    let name = Path::new(name);
    name.components()
        .all(|c| matches!(c, Component::Normal(_)))
        .then(|| parent.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::dispatch;
    use crate::ipc::channel_pair;
    use crate::protocol::{HostToUi, UiToHost};
    use crate::ui::prompt::ScriptedPrompter;
    use crate::ui::toast::Toasts;
    use crate::ui::widget::TextModelStore;

    /// Host that only serves requests and records context menu targets.
    fn connect(
        prompter: ScriptedPrompter,
    ) -> (
        UiController<TextModelStore, ScriptedPrompter>,
        mpsc::UnboundedReceiver<PathBuf>,
    ) {
        let (ui, mut host) = channel_pair();
        let (menus_tx, menus_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Some(frame) = host.from_ui.recv().await {
                match frame {
                    UiToHost::Request { id, request } => {
                        let response = dispatch(request).await;
                        let _ = host.to_ui.send(HostToUi::Response { id, response }).await;
                    }
                    UiToHost::ShowContextMenu { target } => {
                        let _ = menus_tx.send(target);
                    }
                }
            }
        });

        let (notify_tx, _notify_rx) = mpsc::unbounded_channel();
        let (client, _demux) = HostClient::connect(ui, notify_tx);
        let session = Session::new(TextModelStore::new(), Toasts::default());
        (UiController::new(session, client, prompter), menus_rx)
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("A")).unwrap();
        std::fs::write(dir.path().join("b.txt"), "bee").unwrap();
        dir
    }

    #[tokio::test]
    async fn directory_toggle_refetches() {
        let dir = project();
        let root = dir.path().to_path_buf();
        let (mut ui, _menus) = connect(ScriptedPrompter::default());

        ui.open_directory(root.clone()).await.unwrap();
        let a = root.join("A");
        ui.click_node(&a).await.unwrap();
        assert!(ui.session().tree().unwrap().find(&a).unwrap().is_expanded());

        ui.click_node(&a).await.unwrap();
        assert!(!ui.session().tree().unwrap().find(&a).unwrap().is_expanded());

        std::fs::write(a.join("new.rs"), "").unwrap();
        ui.click_node(&a).await.unwrap();
        let children = ui.session().tree().unwrap().find(&a).unwrap().children().unwrap();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].name, "new.rs");
    }

    #[tokio::test]
    async fn new_file_inside_directory_target() {
        let dir = project();
        let root = dir.path().to_path_buf();
        let (mut ui, _menus) = connect(ScriptedPrompter::new([Some("c.md")]));
        ui.open_directory(root.clone()).await.unwrap();

        ui.create_item(MenuCommand::NewFile, &root.join("A"))
            .await
            .unwrap();

        assert!(root.join("A/c.md").is_file());
        assert_eq!(ui.session().toasts.messages(), vec!["File created."]);
        assert_eq!(ui.prompter().asked, vec![NAME_PROMPT.to_owned()]);
    }

    #[tokio::test]
    async fn new_folder_next_to_file_target_reloads_tree() {
        let dir = project();
        let root = dir.path().to_path_buf();
        let (mut ui, _menus) = connect(ScriptedPrompter::new([Some("lib")]));
        ui.open_directory(root.clone()).await.unwrap();
        ui.click_node(&root.join("A")).await.unwrap();

        ui.create_item(MenuCommand::NewDirectory, &root.join("b.txt"))
            .await
            .unwrap();

        assert!(root.join("lib").is_dir());
        let tree = ui.session().tree().unwrap();
        let names: Vec<&str> = tree.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["A", "lib", "b.txt"]);
        // Full reload starts every directory collapsed again.
        assert!(!tree.find(&root.join("A")).unwrap().is_expanded());
    }

    #[tokio::test]
    async fn empty_or_cancelled_name_sends_nothing() {
        let dir = project();
        let root = dir.path().to_path_buf();
        let (mut ui, _menus) = connect(ScriptedPrompter::new([Some("   "), None]));
        ui.open_directory(root.clone()).await.unwrap();

        ui.create_item(MenuCommand::NewFile, &root).await.unwrap();
        ui.create_item(MenuCommand::NewDirectory, &root).await.unwrap();

        assert_eq!(std::fs::read_dir(&root).unwrap().count(), 2);
        assert!(ui.session().toasts.messages().is_empty());
    }

    #[tokio::test]
    async fn failed_creation_shows_the_error() {
        let dir = project();
        let root = dir.path().to_path_buf();
        let (mut ui, _menus) = connect(ScriptedPrompter::new([Some("b.txt")]));
        ui.open_directory(root.clone()).await.unwrap();

        ui.create_item(MenuCommand::NewFile, &root).await.unwrap();

        let messages = ui.session().toasts.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Error: "));
        assert!(messages[0].len() > "Error: ".len());
        assert_eq!(std::fs::read_to_string(root.join("b.txt")).unwrap(), "bee");
    }

    #[tokio::test]
    async fn names_cannot_leave_the_target_folder() {
        let dir = project();
        let elsewhere = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let absolute = elsewhere.path().join("x.txt");
        let (mut ui, _menus) = connect(ScriptedPrompter::new([
            Some(absolute.to_str().unwrap()),
            Some("../y.txt"),
            Some("sub/../z.txt"),
        ]));
        ui.open_directory(root.clone()).await.unwrap();

        for _ in 0..3 {
            ui.create_item(MenuCommand::NewFile, &root.join("A"))
                .await
                .unwrap();
        }

        assert!(!absolute.exists());
        assert!(!root.join("y.txt").exists());
        assert_eq!(std::fs::read_dir(root.join("A")).unwrap().count(), 0);
        let messages = ui.session().toasts.messages();
        assert_eq!(messages.len(), 3);
        assert!(messages.iter().all(|m| m.starts_with("Error: invalid name")));
    }

    #[test]
    fn nested_names_stay_under_the_parent() {
        let parent = Path::new("/proj/src");
        assert_eq!(
            child_path(parent, "ui/mod.rs"),
            Some(PathBuf::from("/proj/src/ui/mod.rs"))
        );
        assert_eq!(child_path(parent, "/etc/passwd"), None);
        assert_eq!(child_path(parent, "./a.rs"), None);
    }

    #[tokio::test]
    async fn right_clicks_send_their_target() {
        let dir = project();
        let root = dir.path().to_path_buf();
        let (mut ui, mut menus) = connect(ScriptedPrompter::default());

        ui.handle_event(UiEvent::RightClickBackground).await.unwrap();
        ui.open_directory(root.clone()).await.unwrap();
        ui.handle_event(UiEvent::RightClickNode(PathBuf::from("A")))
            .await
            .unwrap();
        ui.handle_event(UiEvent::RightClickBackground).await.unwrap();

        assert_eq!(menus.recv().await, Some(root.join("A")));
        assert_eq!(menus.recv().await, Some(root.clone()));
    }

    #[tokio::test]
    async fn save_without_active_buffer_is_a_no_op() {
        let (mut ui, _menus) = connect(ScriptedPrompter::default());
        ui.handle_notification(Notification::SaveRequested)
            .await
            .unwrap();
        assert!(ui.session().toasts.messages().is_empty());
    }

    #[tokio::test]
    async fn failed_save_is_surfaced() {
        let dir = project();
        let root = dir.path().to_path_buf();
        let (mut ui, _menus) = connect(ScriptedPrompter::default());
        ui.open_directory(root.clone()).await.unwrap();
        ui.click_node(&root.join("b.txt")).await.unwrap();
        std::fs::remove_file(root.join("b.txt")).unwrap();
        std::fs::create_dir(root.join("b.txt")).unwrap();

        ui.save_active().await.unwrap();

        let messages = ui.session().toasts.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Error: "));
    }

    #[tokio::test]
    async fn editing_events_change_the_active_buffer() {
        let dir = project();
        let root = dir.path().to_path_buf();
        let (mut ui, _menus) = connect(ScriptedPrompter::default());
        ui.open_directory(root.clone()).await.unwrap();
        ui.handle_event(UiEvent::ClickNode(PathBuf::from("b.txt")))
            .await
            .unwrap();

        ui.handle_event(UiEvent::AppendLine("second".into()))
            .await
            .unwrap();
        assert_eq!(ui.session().active_text().unwrap().1, "bee\nsecond\n");

        ui.handle_event(UiEvent::ReplaceText("fresh".into()))
            .await
            .unwrap();
        assert_eq!(ui.session().active_text().unwrap().1, "fresh");
    }
}
