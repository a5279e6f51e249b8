use std::io;
use std::path::Path;

use log::{info, warn};
use tokio::fs;

use crate::protocol::{DirectoryEntry, OpOutcome};

/// Immediate entries of `path`, in the order the OS returns them.
pub async fn try_list_directory(path: &Path) -> io::Result<Vec<DirectoryEntry>> {
    let mut read_dir = fs::read_dir(path).await?;
    let mut entries = Vec::new();

    while let Some(entry) = read_dir.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        let is_directory = match entry.file_type().await {
            Ok(file_type) => file_type.is_dir(),
            Err(e) => {
                warn!("Failed to get file type for {}: {}", name, e);
                false
            }
        };
        entries.push(DirectoryEntry { name, is_directory });
    }

    Ok(entries)
}

/// Listing as served on the wire: a failure degrades to an empty listing.
pub async fn handle_list_directory(path: &Path) -> Vec<DirectoryEntry> {
    info!("list-directory: {:?}", path);

    match try_list_directory(path).await {
        Ok(entries) => {
            info!("Listed {} entries in {:?}", entries.len(), path);
            entries
        }
        Err(e) => {
            warn!("Failed to read directory {:?}: {}", path, e);
            Vec::new()
        }
    }
}

/// Creates exactly one directory level.
pub async fn handle_create_directory(path: &Path) -> OpOutcome {
    info!("create-directory: {:?}", path);

    let result = fs::create_dir(path).await;
    if let Err(e) = &result {
        warn!("Failed to create directory {:?}: {}", path, e);
    }
    result.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lists_names_and_kinds() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("A")).unwrap();
        std::fs::write(dir.path().join("b.txt"), "b").unwrap();

        let mut entries = handle_list_directory(dir.path()).await;
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        assert_eq!(
            entries,
            vec![
                DirectoryEntry::new("A", true),
                DirectoryEntry::new("b.txt", false)
            ]
        );
    }

    #[tokio::test]
    async fn missing_directory_lists_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");

        assert!(handle_list_directory(&missing).await.is_empty());
        assert!(try_list_directory(&missing).await.is_err());
    }

    #[tokio::test]
    async fn create_directory_is_not_recursive() {
        let dir = tempfile::tempdir().unwrap();

        let nested = handle_create_directory(&dir.path().join("x/y")).await;
        assert!(!nested.success);
        assert!(!dir.path().join("x").exists());

        let single = handle_create_directory(&dir.path().join("x")).await;
        assert_eq!(single, OpOutcome::ok());

        let again = handle_create_directory(&dir.path().join("x")).await;
        assert!(!again.success);
        assert!(again.error.is_some_and(|e| !e.is_empty()));
    }
}
