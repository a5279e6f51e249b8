//! JSON-lines framing: one serialized frame per line.

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;

use super::IpcError;

pub fn encode<T: Serialize>(frame: &T) -> Result<String, IpcError> {
    let mut line = serde_json::to_string(frame)?;
    line.push('\n');
    Ok(line)
}

pub fn decode<T: DeserializeOwned>(line: &str) -> Result<T, IpcError> {
    Ok(serde_json::from_str(line.trim_end())?)
}

/// Decodes frames from `reader` into `frames` until EOF or until the
/// receiving side goes away. Malformed lines, including ones that are not
/// UTF-8, are logged and skipped.
pub async fn read_frames<R, T>(mut reader: R, frames: mpsc::Sender<T>) -> Result<(), IpcError>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        if line.trim_ascii().is_empty() {
            continue;
        }

        match serde_json::from_slice(line.trim_ascii_end()) {
            Ok(frame) => {
                if frames.send(frame).await.is_err() {
                    debug!("Frame receiver closed, stop reading");
                    break;
                }
            }
            Err(e) => warn!("Skipping malformed frame: {}", e),
        }
    }

    Ok(())
}

/// Encodes every frame received on `frames` onto `writer`, flushing after
/// each line.
pub async fn write_frames<W, T>(mut writer: W, mut frames: mpsc::Receiver<T>) -> Result<(), IpcError>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    while let Some(frame) = frames.recv().await {
        writer.write_all(encode(&frame)?.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::protocol::{HostToUi, MenuCommand, Notification, Request, UiToHost};
    use tokio::io::BufReader;

    #[test]
    fn frames_are_single_lines() {
        let frame = UiToHost::Request {
            id: 7,
            request: Request::WriteFile {
                path: PathBuf::from("/proj/b.txt"),
                text: "one\ntwo\n".into(),
            },
        };

        let line = encode(&frame).unwrap();
        assert_eq!(line.matches('\n').count(), 1);
        assert_eq!(decode::<UiToHost>(&line).unwrap(), frame);
    }

    #[test]
    fn notification_frame_shape() {
        let frame = HostToUi::Notification {
            notification: Notification::ContextMenuCommand {
                command: MenuCommand::NewDirectory,
                target: PathBuf::from("/proj"),
            },
        };
        let value: serde_json::Value = serde_json::from_str(&encode(&frame).unwrap()).unwrap();

        assert_eq!(value["kind"], "notification");
        assert_eq!(value["notification"]["type"], "context-menu-command");
        assert_eq!(value["notification"]["command"], "new-directory");
    }

    #[tokio::test]
    async fn reader_skips_garbage_lines() {
        let input = "not json\n\n{\"kind\":\"show-context-menu\",\"target\":\"/proj\"}\n";
        let (tx, mut rx) = mpsc::channel(4);

        read_frames::<_, UiToHost>(BufReader::new(input.as_bytes()), tx)
            .await
            .unwrap();

        assert_eq!(
            rx.recv().await,
            Some(UiToHost::ShowContextMenu {
                target: PathBuf::from("/proj")
            })
        );
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn reader_survives_non_utf8_lines() {
        let mut input = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(b"{\"kind\":\"show-context-menu\",\"target\":\"/proj\"}\n");
        let (tx, mut rx) = mpsc::channel(4);

        read_frames::<_, UiToHost>(BufReader::new(input.as_slice()), tx)
            .await
            .unwrap();

        assert_eq!(
            rx.recv().await,
            Some(UiToHost::ShowContextMenu {
                target: PathBuf::from("/proj")
            })
        );
    }

    #[tokio::test]
    async fn writer_emits_one_line_per_frame() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(HostToUi::Notification {
            notification: Notification::SaveRequested,
        })
        .await
        .unwrap();
        drop(tx);

        let mut out = Vec::new();
        write_frames(&mut out, rx).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "{\"kind\":\"notification\",\"notification\":{\"type\":\"save-requested\"}}\n"
        );
    }
}
