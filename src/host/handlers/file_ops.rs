use std::io;
use std::path::Path;

use log::{info, warn};
use tokio::fs::{self, OpenOptions};

use crate::protocol::OpOutcome;

/// Leading text of the content served when a file cannot be read.
pub const PLACEHOLDER_PREFIX: &str = "// Could not load file: ";

/// Reads `path` as text. Invalid UTF-8 sequences are replaced, not refused.
pub async fn try_read_file(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path).await?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// File text as served on the wire: a failure degrades to a placeholder
/// naming the path.
pub async fn handle_read_file(path: &Path) -> String {
    info!("read-file: {:?}", path);

    match try_read_file(path).await {
        Ok(text) => {
            info!("Read {} bytes from {:?}", text.len(), path);
            text
        }
        Err(e) => {
            warn!("Failed to read file {:?}: {}", path, e);
            format!("{}{}", PLACEHOLDER_PREFIX, path.display())
        }
    }
}

/// Unconditional overwrite. Concurrent writers are not coordinated.
pub async fn handle_write_file(path: &Path, text: &str) -> OpOutcome {
    info!("write-file: {:?}, {} bytes", path, text.len());

    let result = fs::write(path, text).await;
    if let Err(e) = &result {
        warn!("Failed to write file {:?}: {}", path, e);
    }
    result.into()
}

/// Creates an empty file, refusing to touch one that already exists.
pub async fn handle_create_file(path: &Path) -> OpOutcome {
    info!("create-file: {:?}", path);

    let result = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await
        .map(|_| ());
    if let Err(e) = &result {
        warn!("Failed to create file {:?}: {}", path, e);
    }
    result.into()
}
