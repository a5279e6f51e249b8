use std::collections::HashMap;

use log::debug;

use super::language::Language;

/// Opaque reference to one text model inside an [`EditorWidget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(u64);

/// The text-editing capability the session drives. It owns the text; the
/// session only ever holds handles.
pub trait EditorWidget {
    fn create_buffer(&mut self, text: String, language: Language) -> BufferHandle;

    fn get_text(&self, handle: BufferHandle) -> Option<String>;

    /// Returns false when the handle is unknown.
    fn set_text(&mut self, handle: BufferHandle, text: String) -> bool;

    fn set_language(&mut self, handle: BufferHandle, language: Language) -> bool;

    fn language(&self, handle: BufferHandle) -> Option<Language>;

    fn dispose(&mut self, handle: BufferHandle);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextModel {
    pub text: String,
    pub language: Language,
}

/// In-memory widget: one [`TextModel`] per live handle.
#[derive(Debug, Default)]
pub struct TextModelStore {
    models: HashMap<BufferHandle, TextModel>,
    next_handle: u64,
}

impl TextModelStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl EditorWidget for TextModelStore {
    fn create_buffer(&mut self, text: String, language: Language) -> BufferHandle {
        self.next_handle += 1;
        let handle = BufferHandle(self.next_handle);
        debug!("create buffer {:?} ({}, {} bytes)", handle, language, text.len());
        self.models.insert(handle, TextModel { text, language });
        handle
    }

    fn get_text(&self, handle: BufferHandle) -> Option<String> {
        self.models.get(&handle).map(|m| m.text.clone())
    }

    fn set_text(&mut self, handle: BufferHandle, text: String) -> bool {
        match self.models.get_mut(&handle) {
            Some(model) => {
                model.text = text;
                true
            }
            None => false,
        }
    }

    fn set_language(&mut self, handle: BufferHandle, language: Language) -> bool {
        match self.models.get_mut(&handle) {
            Some(model) => {
                model.language = language;
                true
            }
            None => false,
        }
    }

    fn language(&self, handle: BufferHandle) -> Option<Language> {
        self.models.get(&handle).map(|m| m.language)
    }

    fn dispose(&mut self, handle: BufferHandle) {
        if self.models.remove(&handle).is_some() {
            debug!("disposed buffer {:?}", handle);
        }
    }
}
