use std::collections::VecDeque;
use std::future::Future;

use tokio::sync::{mpsc, watch};

/// Asks the user for a line of text. `None` means the prompt was cancelled.
pub trait Prompter {
    fn prompt(&mut self, message: &str) -> impl Future<Output = Option<String>> + Send;
}

/// Answers prompts from a fixed script, then cancels.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Option<String>>,
    pub asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(|a| a.map(Into::into)).collect(),
            asked: Vec::new(),
        }
    }

    pub fn push(&mut self, answer: Option<&str>) {
        self.answers.push_back(answer.map(str::to_owned));
    }
}

impl Prompter for ScriptedPrompter {
    async fn prompt(&mut self, message: &str) -> Option<String> {
        self.asked.push(message.to_owned());
        self.answers.pop_front().flatten()
    }
}

/// Sending side of a [`ChannelPrompter`], held by whoever reads user input.
#[derive(Debug, Clone)]
pub struct PromptAnswers {
    waiting: watch::Receiver<bool>,
    answers: mpsc::UnboundedSender<String>,
}

impl PromptAnswers {
    pub fn is_waiting(&self) -> bool {
        *self.waiting.borrow()
    }

    /// Resolves once a prompt is waiting for an answer. Returns false if the
    /// prompter is gone.
    pub async fn wait_for_prompt(&mut self) -> bool {
        self.waiting.wait_for(|waiting| *waiting).await.is_ok()
    }

    /// Delivers one answer. Returns false once the prompter is gone.
    pub fn answer(&self, line: String) -> bool {
        self.answers.send(line).is_ok()
    }
}

/// Prompts on stdout and waits for the next input line routed to it.
#[derive(Debug)]
pub struct ChannelPrompter {
    waiting: watch::Sender<bool>,
    answers: mpsc::UnboundedReceiver<String>,
}

impl ChannelPrompter {
    pub fn new() -> (Self, PromptAnswers) {
        let (waiting, waiting_rx) = watch::channel(false);
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self { waiting, answers: rx },
            PromptAnswers {
                waiting: waiting_rx,
                answers: tx,
            },
        )
    }
}

impl Prompter for ChannelPrompter {
    async fn prompt(&mut self, message: &str) -> Option<String> {
        println!("{message}");
        self.waiting.send_replace(true);
        let answer = self.answers.recv().await;
        self.waiting.send_replace(false);
        answer
    }
}
