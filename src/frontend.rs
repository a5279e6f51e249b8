//! Line-oriented stand-in for the native window. Each input line is either
//! chrome input (menus, accelerators, the folder picker) for the host, or a
//! UI event (clicks, typing) for the session controller.

use std::path::PathBuf;

use anyhow::Result;
use log::{debug, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::{mpsc, watch};

use crate::host::{ChromeAction, ChromeInput};
use crate::protocol::MenuCommand;
use crate::ui::prompt::PromptAnswers;
use crate::ui::{Progress, UiEvent};

pub const HELP: &str = "\
Chrome:  open <dir> | save | new-file | new-directory | dismiss | quit
UI:      click <path> | menu [<path>] | tab <path> | close <path>
Editing: set <text> | append <text> | show
Paths may be relative to the opened folder. In `set`, \\n starts a new line.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Chrome(ChromeAction),
    Ui(UiEvent),
    Help,
    Quit,
    Unknown(String),
}

fn required(arg: &str, command: &str) -> Option<String> {
    if arg.is_empty() {
        warn!("`{}` needs an argument", command);
        None
    } else {
        Some(arg.to_owned())
    }
}

pub fn parse_line(line: &str) -> Option<Input> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let (command, arg) = match line.split_once(char::is_whitespace) {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    let input = match command {
        "open" => Input::Chrome(ChromeAction::OpenDirectory(PathBuf::from(required(
            arg, command,
        )?))),
        "save" | ":w" => Input::Chrome(ChromeAction::Save),
        "dismiss" | "esc" => Input::Chrome(ChromeAction::DismissMenu),
        "click" => Input::Ui(UiEvent::ClickNode(PathBuf::from(required(arg, command)?))),
        "menu" if arg.is_empty() => Input::Ui(UiEvent::RightClickBackground),
        "menu" => Input::Ui(UiEvent::RightClickNode(PathBuf::from(arg))),
        "tab" => Input::Ui(UiEvent::SelectTab(PathBuf::from(required(arg, command)?))),
        "close" => Input::Ui(UiEvent::CloseTab(PathBuf::from(required(arg, command)?))),
        "set" => Input::Ui(UiEvent::ReplaceText(arg.replace("\\n", "\n"))),
        "append" => Input::Ui(UiEvent::AppendLine(arg.to_owned())),
        "show" => Input::Ui(UiEvent::Render),
        "help" | "?" => Input::Help,
        "quit" | "exit" | ":q" => Input::Quit,
        other => match MenuCommand::parse(other) {
            Some(item) => Input::Chrome(ChromeAction::ChooseMenuItem(item)),
            None => Input::Unknown(line.to_owned()),
        },
    };

    Some(input)
}

/// Reads `reader` line by line until EOF or `quit`, routing each line.
/// Each line is fully handled by the host and the UI before the next one is
/// read, unless it opened a name prompt, which then takes the next line.
pub async fn run_terminal<R>(
    reader: R,
    chrome: mpsc::Sender<ChromeInput>,
    events: mpsc::UnboundedSender<UiEvent>,
    mut progress: watch::Receiver<Progress>,
    mut prompt: PromptAnswers,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut events_sent: u64 = 0;
    println!("{HELP}");

    while let Some(line) = lines.next_line().await? {
        if prompt.is_waiting() {
            if !prompt.answer(line) {
                warn!("Prompt answer dropped");
            }
            continue;
        }

        match parse_line(&line) {
            Some(Input::Chrome(action)) => {
                let (input, handled) = ChromeInput::acknowledged(action);
                if chrome.send(input).await.is_err() {
                    debug!("Host gone, stopping input");
                    break;
                }
                let Ok(notified) = handled.await else {
                    debug!("Host gone, stopping input");
                    break;
                };
                settle(&mut progress, &mut prompt, |p| p.notifications >= notified).await;
            }
            Some(Input::Ui(event)) => {
                if events.send(event).is_err() {
                    debug!("UI gone, stopping input");
                    break;
                }
                events_sent += 1;
                settle(&mut progress, &mut prompt, |p| p.events >= events_sent).await;
            }
            Some(Input::Help) => println!("{HELP}"),
            Some(Input::Quit) => break,
            Some(Input::Unknown(line)) => println!("Unknown command: {line} (try `help`)"),
            None => {}
        }
    }

    Ok(())
}

/// Waits until the UI has caught up to `done`, or is asking for a name.
async fn settle<F>(progress: &mut watch::Receiver<Progress>, prompt: &mut PromptAnswers, done: F)
where
    F: FnMut(&Progress) -> bool,
{
    tokio::select! {
        caught_up = progress.wait_for(done) => {
            if caught_up.is_err() {
                debug!("UI stopped reporting progress");
            }
        }
        true = prompt.wait_for_prompt() => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ipc::{self, HostClient};
    use crate::server::{Server, ServerConfig};
    use crate::ui::prompt::ChannelPrompter;
    use crate::ui::toast::Toasts;
    use crate::ui::widget::TextModelStore;
    use crate::ui::{Session, UiController};
    use tokio::io::BufReader;

    #[test]
    fn routes_chrome_and_ui_commands() {
        assert_eq!(
            parse_line("open /tmp/proj"),
            Some(Input::Chrome(ChromeAction::OpenDirectory(PathBuf::from(
                "/tmp/proj"
            ))))
        );
        assert_eq!(parse_line(":w"), Some(Input::Chrome(ChromeAction::Save)));
        assert_eq!(
            parse_line("new-folder"),
            Some(Input::Chrome(ChromeAction::ChooseMenuItem(
                MenuCommand::NewDirectory
            )))
        );
        assert_eq!(
            parse_line("click src/main.rs"),
            Some(Input::Ui(UiEvent::ClickNode(PathBuf::from("src/main.rs"))))
        );
        assert_eq!(
            parse_line("menu"),
            Some(Input::Ui(UiEvent::RightClickBackground))
        );
        assert_eq!(
            parse_line("set a\\nb"),
            Some(Input::Ui(UiEvent::ReplaceText("a\nb".into())))
        );
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("open"), None);
        assert_eq!(
            parse_line("frobnicate"),
            Some(Input::Unknown("frobnicate".into()))
        );
    }

    /// Feeds `script` to a terminal wired to a real host and UI, and waits
    /// for everything to shut down.
    async fn run_script(script: String) {
        let (ui_end, host_end) = ipc::channel_pair();
        let (chrome_tx, chrome_rx) = mpsc::channel(4);
        let host = tokio::spawn(Server::new(ServerConfig::default()).run(host_end, chrome_rx));

        let (notify_tx, notify_rx) = mpsc::unbounded_channel();
        let (client, _demux) = HostClient::connect(ui_end, notify_tx);
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (prompter, answers) = ChannelPrompter::new();
        let controller = UiController::new(
            Session::new(TextModelStore::new(), Toasts::default()),
            client,
            prompter,
        );
        let progress = controller.progress();
        let ui = tokio::spawn(controller.run(notify_rx, events_rx, |_| {}));

        run_terminal(
            BufReader::new(script.as_bytes()),
            chrome_tx,
            events_tx,
            progress,
            answers,
        )
        .await
        .unwrap();

        ui.await.unwrap().unwrap();
        host.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn script_lines_run_in_order_until_quit() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "old\n").unwrap();

        let script = format!(
            "open {}\nclick b.txt\nset new\\n\nsave\nquit\nset never\nsave\n",
            dir.path().display()
        );
        run_script(script).await;

        assert_eq!(
            std::fs::read_to_string(dir.path().join("b.txt")).unwrap(),
            "new\n"
        );
    }

    #[tokio::test]
    async fn name_prompt_takes_the_line_after_the_menu_choice() {
        let dir = tempfile::tempdir().unwrap();

        let script = format!("open {}\nmenu\nnew-file\nc.txt\nquit\n", dir.path().display());
        run_script(script).await;

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec!["c.txt"]);
    }

    #[tokio::test]
    async fn menu_choice_without_popup_reads_on() {
        let dir = tempfile::tempdir().unwrap();

        let script = format!("open {}\nnew-file\nnew-folder\n", dir.path().display());
        run_script(script).await;

        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
