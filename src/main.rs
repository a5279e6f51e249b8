use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use rustedbytes_edit::args::Args;
use rustedbytes_edit::frontend;
use rustedbytes_edit::ipc::{self, HostClient};
use rustedbytes_edit::server::{Server, ServerConfig};
use rustedbytes_edit::ui::prompt::ChannelPrompter;
use rustedbytes_edit::ui::toast::Toasts;
use rustedbytes_edit::ui::widget::TextModelStore;
use rustedbytes_edit::ui::{Session, UiController};
use tokio::io::{BufReader, stdin, stdout};
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::builder().filter_level(args.log_level).init();

    if let Some(root_dir) = &args.root_dir {
        if !root_dir.is_dir() {
            error!("Root directory {:?} is not a directory", root_dir);
            std::process::exit(1);
        }
    }

    let config = ServerConfig {
        initial_dir: args.root_dir.clone(),
        echo_menus: !args.stdio,
    };

    if args.stdio {
        info!("Serving host contract on stdin/stdout");
        Server::new(config)
            .serve_lines(BufReader::new(stdin()), stdout())
            .await
            .context("stdio host failed")?;
        return Ok(());
    }

    let (ui_end, host_end) = ipc::channel_pair();
    let (chrome_tx, chrome_rx) = mpsc::channel(16);
    let host_task = tokio::spawn(Server::new(config).run(host_end, chrome_rx));

    let (notify_tx, notify_rx) = mpsc::unbounded_channel();
    let (client, demux) = HostClient::connect(ui_end, notify_tx);

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (prompter, answers) = ChannelPrompter::new();
    let toasts = Toasts::new(
        Duration::from_millis(args.notification_ms),
        Duration::from_millis(args.error_notification_ms),
    );
    let controller = UiController::new(Session::new(TextModelStore::new(), toasts), client, prompter);
    let progress = controller.progress();
    let ui_task = tokio::spawn(controller.run(notify_rx, events_rx, |screen| println!("{screen}")));

    frontend::run_terminal(
        BufReader::new(stdin()),
        chrome_tx,
        events_tx,
        progress,
        answers,
    )
    .await?;

    ui_task.await.context("UI task panicked")??;
    host_task.await.context("host task panicked")??;
    if let Err(e) = demux.await {
        error!("Host connection task failed: {}", e);
    }

    info!("Bye");
    Ok(())
}
