use std::fmt::Write;
use std::path::Path;
use std::time::Instant;

use super::session_state::Session;
use super::toast::ToastLevel;
use super::widget::EditorWidget;

pub const WELCOME: &str = "Use `open <dir>` to start working.";

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Text rendering of the explorer, the tab strip, the active buffer and the
/// live notifications.
pub fn render<W: EditorWidget>(session: &Session<W>, now: Instant) -> String {
    let mut out = String::new();
    let active = session.active_buffer();

    match session.tree() {
        Some(tree) => {
            let _ = writeln!(out, "== {} ==", tree.root_name());
            for row in tree.visible_rows() {
                let node = row.node;
                let indent = "  ".repeat(row.depth);
                let line = if node.is_directory {
                    let marker = if node.is_expanded() { '-' } else { '+' };
                    format!("{indent}{marker} {}/", node.name)
                } else if active == Some(node.path.as_path()) {
                    format!("{indent}  {} *", node.name)
                } else {
                    format!("{indent}  {}", node.name)
                };
                let _ = writeln!(out, "{line}");
            }
        }
        None => {
            let _ = writeln!(out, "== no folder opened ==");
        }
    }

    let tabs: Vec<String> = session
        .tabs()
        .map(|path| {
            if active == Some(path) {
                format!("[{}]", file_name(path))
            } else {
                file_name(path)
            }
        })
        .collect();
    let _ = writeln!(out, "Tabs: {}", tabs.join(" "));

    match session.active_buffer().zip(session.active_text()) {
        Some((path, (_, text))) => {
            let language = session
                .buffer(path)
                .map(|b| b.language.id())
                .unwrap_or("plaintext");
            let _ = writeln!(out, "--- {} ({}) ---", path.display(), language);
            for (number, line) in text.lines().enumerate() {
                let _ = writeln!(out, "{:4} | {}", number + 1, line);
            }
        }
        None => {
            let _ = writeln!(out, "--- {} ---", WELCOME);
        }
    }

    for toast in session.toasts.live(now) {
        let mark = match toast.level {
            ToastLevel::Info => '>',
            ToastLevel::Error => '!',
        };
        let _ = writeln!(out, "{mark} {}", toast.message);
    }

    out
}
