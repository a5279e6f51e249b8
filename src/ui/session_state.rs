use std::path::{Path, PathBuf};

use log::{debug, info};

use super::file_tree::FileTree;
use super::language::Language;
use super::toast::Toasts;
use super::widget::{BufferHandle, EditorWidget};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenBuffer {
    pub handle: BufferHandle,
    pub language: Language,
}

/// Everything the UI knows about the current editing activity. Owned by a
/// single task; nothing else mutates it.
pub struct Session<W: EditorWidget> {
    widget: W,
    tree: Option<FileTree>,
    /// Insertion order is tab order.
    open_buffers: Vec<(PathBuf, OpenBuffer)>,
    active_buffer: Option<PathBuf>,
    pub toasts: Toasts,
}

impl<W: EditorWidget> Session<W> {
    pub fn new(widget: W, toasts: Toasts) -> Self {
        Self {
            widget,
            tree: None,
            open_buffers: Vec::new(),
            active_buffer: None,
            toasts,
        }
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }

    pub fn root_path(&self) -> Option<&Path> {
        self.tree.as_ref().map(|t| t.root())
    }

    pub fn tree(&self) -> Option<&FileTree> {
        self.tree.as_ref()
    }

    pub fn tree_mut(&mut self) -> Option<&mut FileTree> {
        self.tree.as_mut()
    }

    /// Installs a freshly listed tree, replacing whatever was shown before.
    pub fn set_tree(&mut self, tree: FileTree) {
        info!("tree rooted at {:?}", tree.root());
        self.tree = Some(tree);
    }

    pub fn is_open(&self, path: &Path) -> bool {
        self.position(path).is_some()
    }

    pub fn buffer(&self, path: &Path) -> Option<OpenBuffer> {
        self.position(path).map(|i| self.open_buffers[i].1)
    }

    pub fn tabs(&self) -> impl Iterator<Item = &Path> {
        self.open_buffers.iter().map(|(p, _)| p.as_path())
    }

    pub fn tab_count(&self) -> usize {
        self.open_buffers.len()
    }

    pub fn active_buffer(&self) -> Option<&Path> {
        self.active_buffer.as_deref()
    }

    /// Makes an open buffer the active one. Unknown paths are ignored.
    pub fn activate(&mut self, path: &Path) -> bool {
        if self.is_open(path) {
            self.active_buffer = Some(path.to_path_buf());
            true
        } else {
            false
        }
    }

    /// Creates a buffer for `path` with `text` and activates it. If the path
    /// is already open the existing buffer is activated and `text` is
    /// discarded.
    pub fn open_buffer(&mut self, path: &Path, text: String) -> BufferHandle {
        if let Some(buffer) = self.buffer(path) {
            self.activate(path);
            return buffer.handle;
        }

        let language = Language::from_path(path);
        let handle = self.widget.create_buffer(text, language);
        info!("opened {:?} as {}", path, language);
        self.open_buffers
            .push((path.to_path_buf(), OpenBuffer { handle, language }));
        self.active_buffer = Some(path.to_path_buf());
        handle
    }

    /// Releases the buffer behind a tab. When the active tab closes, the tab
    /// that followed it becomes active, or the one before it if it was last.
    pub fn close_buffer(&mut self, path: &Path) -> bool {
        let Some(index) = self.position(path) else {
            return false;
        };

        let (closed, buffer) = self.open_buffers.remove(index);
        self.widget.dispose(buffer.handle);
        debug!("closed {:?}", closed);

        if self.active_buffer.as_deref() == Some(closed.as_path()) {
            let next = index.min(self.open_buffers.len().saturating_sub(1));
            self.active_buffer = self.open_buffers.get(next).map(|(p, _)| p.clone());
        }
        true
    }

    /// Current text of the active buffer as held by the widget.
    pub fn active_text(&self) -> Option<(PathBuf, String)> {
        let path = self.active_buffer.as_ref()?;
        let buffer = self.buffer(path)?;
        let text = self.widget.get_text(buffer.handle)?;
        Some((path.clone(), text))
    }

    pub fn set_active_text(&mut self, text: String) -> bool {
        let Some(buffer) = self.active_buffer.as_deref().and_then(|p| self.buffer(p)) else {
            return false;
        };
        self.widget.set_text(buffer.handle, text)
    }

    /// Releases every buffer handle.
    pub fn close_all(&mut self) {
        for (_, buffer) in self.open_buffers.drain(..) {
            self.widget.dispose(buffer.handle);
        }
        self.active_buffer = None;
    }

    fn position(&self, path: &Path) -> Option<usize> {
        self.open_buffers.iter().position(|(p, _)| p == path)
    }
}

impl<W: EditorWidget> Drop for Session<W> {
    fn drop(&mut self) {
        self.close_all();
    }
}
