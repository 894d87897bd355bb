//! Sequential chat tasks with carryover

use finsight_core::{Agent, Context, Result};
use finsight_runtime::{ChatResult, Exchange, SummaryMethod};
use std::sync::Arc;
use tracing::info;

/// Append carryover context to a task message
///
/// Returns `message` unchanged when there is nothing to carry over.
///
/// ```
/// use finsight_workflow::with_carryover;
///
/// let msg = with_carryover("Write the report.", &["prices".to_string(), "news".to_string()]);
/// assert_eq!(msg, "Write the report.\nContext: \nprices\nnews");
/// ```
pub fn with_carryover(message: &str, carryover: &[String]) -> String {
    if carryover.is_empty() {
        return message.to_string();
    }
    format!("{message}\nContext: \n{}", carryover.join("\n"))
}

/// One exchange in a sequence
#[derive(Clone)]
pub struct ChatTask {
    label: String,
    sender: Arc<dyn Agent>,
    recipient: Arc<dyn Agent>,
    message: String,
    carryover: Vec<String>,
    accepts_carryover: bool,
    max_turns: usize,
    summary: SummaryMethod,
}

impl ChatTask {
    /// Create a task where `sender` opens with `message`
    pub fn new(
        label: impl Into<String>,
        sender: Arc<dyn Agent>,
        recipient: Arc<dyn Agent>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            sender,
            recipient,
            message: message.into(),
            carryover: Vec::new(),
            accepts_carryover: true,
            max_turns: 1,
            summary: SummaryMethod::LastMessage,
        }
    }

    /// Add the task's own carryover line
    pub fn carryover(mut self, line: impl Into<String>) -> Self {
        self.carryover.push(line.into());
        self
    }

    /// Send the message as is, ignoring earlier summaries
    pub fn without_carryover(mut self) -> Self {
        self.accepts_carryover = false;
        self
    }

    /// Set the turn budget
    pub fn max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set the summary method
    pub fn summary(mut self, summary: SummaryMethod) -> Self {
        self.summary = summary;
        self
    }

    /// Label used in logs and reports
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The recipient agent
    pub fn recipient(&self) -> &Arc<dyn Agent> {
        &self.recipient
    }

    /// The opening message after carryover is applied
    pub fn render_message(&self, previous: &[String]) -> String {
        if !self.accepts_carryover {
            return self.message.clone();
        }
        let carryover: Vec<String> = self
            .carryover
            .iter()
            .chain(previous)
            .cloned()
            .collect();
        with_carryover(&self.message, &carryover)
    }

    /// Run the task given the summaries of earlier tasks
    pub async fn run(&self, previous: &[String], context: &mut Context) -> Result<ChatResult> {
        info!(task = %self.label, recipient = self.recipient.name(), "Running chat task");
        Exchange::new(self.sender.clone(), self.recipient.clone(), self.max_turns)
            .with_summary(self.summary.clone())
            .run(self.render_message(previous), context)
            .await
    }
}

/// Chat tasks run one after another
///
/// Each task sees the summaries of every earlier task as carryover.
#[derive(Clone, Default)]
pub struct ChatSequence {
    tasks: Vec<ChatTask>,
}

impl ChatSequence {
    /// Create an empty sequence
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task
    pub fn add_task(mut self, task: ChatTask) -> Self {
        self.tasks.push(task);
        self
    }

    /// Tasks in execution order
    pub fn tasks(&self) -> &[ChatTask] {
        &self.tasks
    }

    /// Run all tasks, returning one result per task
    pub async fn run(&self, context: &mut Context) -> Result<Vec<ChatResult>> {
        let mut summaries = Vec::with_capacity(self.tasks.len());
        let mut results = Vec::with_capacity(self.tasks.len());

        for task in &self.tasks {
            let result = task.run(&summaries, context).await?;
            summaries.push(result.summary.clone());
            results.push(result);
        }

        Ok(results)
    }
}
