use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub type RequestId = u64;

/// One immediate child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub name: String,
    pub is_directory: bool,
}

impl DirectoryEntry {
    pub fn new(name: impl Into<String>, is_directory: bool) -> Self {
        Self {
            name: name.into(),
            is_directory,
        }
    }
}

/// Result of a write/create operation as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpOutcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OpOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

impl From<std::io::Result<()>> for OpOutcome {
    fn from(result: std::io::Result<()>) -> Self {
        match result {
            Ok(()) => Self::ok(),
            Err(e) => Self::failed(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Request {
    ListDirectory { path: PathBuf },
    ReadFile { path: PathBuf },
    WriteFile { path: PathBuf, text: String },
    CreateFile { path: PathBuf },
    CreateDirectory { path: PathBuf },
}

impl Request {
    pub fn name(&self) -> &'static str {
        match self {
            Request::ListDirectory { .. } => "list-directory",
            Request::ReadFile { .. } => "read-file",
            Request::WriteFile { .. } => "write-file",
            Request::CreateFile { .. } => "create-file",
            Request::CreateDirectory { .. } => "create-directory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Response {
    Entries(Vec<DirectoryEntry>),
    Text(String),
    Outcome(OpOutcome),
}

/// Items of the file explorer context menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MenuCommand {
    NewFile,
    NewDirectory,
}

impl MenuCommand {
    pub fn key(self) -> &'static str {
        match self {
            MenuCommand::NewFile => "new-file",
            MenuCommand::NewDirectory => "new-directory",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuCommand::NewFile => "New File",
            MenuCommand::NewDirectory => "New Folder",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new-file" => Some(MenuCommand::NewFile),
            "new-directory" | "new-folder" => Some(MenuCommand::NewDirectory),
            _ => None,
        }
    }
}

/// Unsolicited host → UI messages, originating from the native chrome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Notification {
    DirectoryOpened {
        path: PathBuf,
    },
    SaveRequested,
    ContextMenuCommand {
        command: MenuCommand,
        target: PathBuf,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum UiToHost {
    Request { id: RequestId, request: Request },
    /// Fire-and-forget; the target comes back inside the chosen command.
    ShowContextMenu { target: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum HostToUi {
    Response { id: RequestId, response: Response },
    Notification { notification: Notification },
}
