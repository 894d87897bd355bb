//! Bounded two-party chat
//!
//! An [`Exchange`] lets a sender and a recipient take turns until either a
//! termination condition fires or the turn budget is spent. One turn is the
//! sender's message plus the recipient's reply.

use finsight_core::{Agent, ChatMessage, Context, Result, TERMINATE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How the result of an exchange is condensed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryMethod {
    /// The last message, with termination sentinels removed
    LastMessage,
    /// A model-written summary produced with `prompt`
    Reflection {
        /// Instruction appended after the transcript
        prompt: String,
    },
}

impl SummaryMethod {
    /// Reflection summary with the given prompt
    pub fn reflection(prompt: impl Into<String>) -> Self {
        Self::Reflection {
            prompt: prompt.into(),
        }
    }
}

/// Why an exchange stopped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminationReason {
    /// A received message matched the named agent's termination condition
    Sentinel {
        /// Agent whose condition fired
        detected_by: String,
    },
    /// The turn budget was exhausted
    MaxTurns,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sentinel { detected_by } => write!(f, "sentinel ({detected_by})"),
            Self::MaxTurns => write!(f, "max turns"),
        }
    }
}

/// Outcome of an exchange
#[derive(Debug, Clone)]
pub struct ChatResult {
    /// Every message sent, in order
    pub transcript: Vec<ChatMessage>,
    /// Condensed result according to the [`SummaryMethod`]
    pub summary: String,
    /// Why the exchange stopped
    pub termination: TerminationReason,
    /// Number of turns started
    pub turns: usize,
}

impl ChatResult {
    /// Last message of the transcript
    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.transcript.last()
    }
}

/// A bounded conversation between two agents
pub struct Exchange {
    sender: Arc<dyn Agent>,
    recipient: Arc<dyn Agent>,
    max_turns: usize,
    summary: SummaryMethod,
}

impl Exchange {
    /// Create an exchange with a turn budget of `max_turns`
    pub fn new(sender: Arc<dyn Agent>, recipient: Arc<dyn Agent>, max_turns: usize) -> Self {
        Self {
            sender,
            recipient,
            max_turns: max_turns.max(1),
            summary: SummaryMethod::LastMessage,
        }
    }

    /// Set the summary method
    pub fn with_summary(mut self, summary: SummaryMethod) -> Self {
        self.summary = summary;
        self
    }

    /// Run the exchange, starting with `message` from the sender
    pub async fn run(&self, message: String, context: &mut Context) -> Result<ChatResult> {
        let sender = self.sender.as_ref();
        let recipient = self.recipient.as_ref();
        info!(
            sender = sender.name(),
            recipient = recipient.name(),
            max_turns = self.max_turns,
            "Starting exchange"
        );

        let mut transcript = Vec::new();
        let mut outgoing = message;
        let mut turns = 0;

        let termination = loop {
            turns += 1;
            transcript.push(ChatMessage::new(sender.name(), outgoing));
            if recipient.termination().matches(transcript_tail(&transcript)) {
                break detected(recipient);
            }

            let reply = recipient.reply(&transcript, context).await?;
            transcript.push(ChatMessage::new(recipient.name(), reply));
            debug!(turn = turns, "Turn complete");

            if turns >= self.max_turns {
                break TerminationReason::MaxTurns;
            }
            if sender.termination().matches(transcript_tail(&transcript)) {
                break detected(sender);
            }

            outgoing = sender.reply(&transcript, context).await?;
        };

        info!(turns, %termination, "Exchange finished");
        let summary = self.summarize(&transcript).await?;
        Ok(ChatResult {
            transcript,
            summary,
            termination,
            turns,
        })
    }

    async fn summarize(&self, transcript: &[ChatMessage]) -> Result<String> {
        match &self.summary {
            SummaryMethod::LastMessage => Ok(last_message_summary(transcript)),
            SummaryMethod::Reflection { prompt } => {
                if let Some(summary) = self.sender.reflect(transcript, prompt).await? {
                    return Ok(summary);
                }
                if let Some(summary) = self.recipient.reflect(transcript, prompt).await? {
                    return Ok(summary);
                }
                warn!("Neither party can reflect, using the last message as summary");
                Ok(last_message_summary(transcript))
            }
        }
    }
}

fn transcript_tail(transcript: &[ChatMessage]) -> &str {
    transcript.last().map_or("", |m| m.content.as_str())
}

fn detected(agent: &dyn Agent) -> TerminationReason {
    TerminationReason::Sentinel {
        detected_by: agent.name().to_string(),
    }
}

fn last_message_summary(transcript: &[ChatMessage]) -> String {
    transcript
        .last()
        .map(|m| m.content.replace(TERMINATE, "").trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use finsight_core::TerminationCondition;
    use std::sync::Mutex;

    /// Replies from a fixed script and records how often it was asked
    struct Scripted {
        name: &'static str,
        replies: Mutex<Vec<&'static str>>,
        termination: TerminationCondition,
        reflection: Option<&'static str>,
    }

    impl Scripted {
        fn new(name: &'static str, replies: &[&'static str]) -> Self {
            let mut replies = replies.to_vec();
            replies.reverse();
            Self {
                name,
                replies: Mutex::new(replies),
                termination: TerminationCondition::default(),
                reflection: None,
            }
        }

        fn terminating_on(mut self, termination: TerminationCondition) -> Self {
            self.termination = termination;
            self
        }

        fn reflecting(mut self, summary: &'static str) -> Self {
            self.reflection = Some(summary);
            self
        }

        fn remaining(&self) -> usize {
            self.replies.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl Agent for Scripted {
        fn name(&self) -> &str {
            self.name
        }

        async fn reply(&self, _history: &[ChatMessage], _context: &mut Context) -> Result<String> {
            Ok(self.replies.lock().unwrap().pop().unwrap_or("(silence)").to_string())
        }

        fn termination(&self) -> TerminationCondition {
            self.termination.clone()
        }

        async fn reflect(&self, _history: &[ChatMessage], _prompt: &str) -> Result<Option<String>> {
            Ok(self.reflection.map(str::to_string))
        }
    }

    #[tokio::test]
    async fn test_single_turn() {
        let sender = Arc::new(Scripted::new("Critic", &[]));
        let reviewer = Arc::new(Scripted::new("Legal_Reviewer", &["Looks compliant"]));

        let result = Exchange::new(sender, reviewer, 1)
            .run("Review this".to_string(), &mut Context::new())
            .await
            .unwrap();

        assert_eq!(result.turns, 1);
        assert_eq!(result.termination, TerminationReason::MaxTurns);
        assert_eq!(result.transcript.len(), 2);
        assert_eq!(result.summary, "Looks compliant");
    }

    #[tokio::test]
    async fn test_sender_detects_sentinel_in_reply() {
        let proxy = Arc::new(
            Scripted::new("proxy", &["exitcode: 0 (execution succeeded)\nCode output: ok"])
                .terminating_on(TerminationCondition::ends_with_terminate()),
        );
        let assistant = Arc::new(Scripted::new(
            "assistant",
            &["```python\nprint('ok')\n```", "Done.\nTERMINATE"],
        ));

        let result = Exchange::new(proxy.clone(), assistant, 20)
            .run("task".to_string(), &mut Context::new())
            .await
            .unwrap();

        assert_eq!(result.turns, 2);
        assert_eq!(
            result.termination,
            TerminationReason::Sentinel {
                detected_by: "proxy".to_string()
            }
        );
        assert_eq!(result.summary, "Done.");
        assert_eq!(proxy.remaining(), 0);
    }

    #[tokio::test]
    async fn test_recipient_detects_sentinel_before_replying() {
        let sender = Arc::new(Scripted::new("a", &["TERMINATE"]));
        let recipient = Arc::new(Scripted::new("b", &["first", "unused"]));

        let result = Exchange::new(sender, recipient.clone(), 10)
            .run("hello".to_string(), &mut Context::new())
            .await
            .unwrap();

        assert_eq!(
            result.termination,
            TerminationReason::Sentinel {
                detected_by: "b".to_string()
            }
        );
        assert_eq!(result.transcript.len(), 3);
        assert_eq!(recipient.remaining(), 1);
    }

    #[tokio::test]
    async fn test_two_turns_end_on_recipient_message() {
        let critic = Arc::new(Scripted::new("Critic", &["meta review"]));
        let writer = Arc::new(Scripted::new("writer", &["draft", "revised"]));

        let result = Exchange::new(critic, writer, 2)
            .run("write".to_string(), &mut Context::new())
            .await
            .unwrap();

        let senders: Vec<&str> = result.transcript.iter().map(|m| m.sender.as_str()).collect();
        assert_eq!(senders, ["Critic", "writer", "Critic", "writer"]);
        assert_eq!(result.last_message().unwrap().content, "revised");
        assert_eq!(result.termination, TerminationReason::MaxTurns);
    }

    #[tokio::test]
    async fn test_reflection_prefers_sender() {
        let sender = Arc::new(Scripted::new("s", &[]).reflecting("from sender"));
        let recipient = Arc::new(Scripted::new("r", &["x"]).reflecting("from recipient"));

        let result = Exchange::new(sender, recipient, 1)
            .with_summary(SummaryMethod::reflection("summarize"))
            .run("go".to_string(), &mut Context::new())
            .await
            .unwrap();
        assert_eq!(result.summary, "from sender");
    }

    #[tokio::test]
    async fn test_reflection_falls_back_to_recipient() {
        let sender = Arc::new(Scripted::new("s", &[]));
        let recipient = Arc::new(Scripted::new("r", &["x"]).reflecting("from recipient"));

        let result = Exchange::new(sender, recipient, 1)
            .with_summary(SummaryMethod::reflection("summarize"))
            .run("go".to_string(), &mut Context::new())
            .await
            .unwrap();
        assert_eq!(result.summary, "from recipient");
    }

    #[tokio::test]
    async fn test_reflection_without_models_uses_last_message() {
        let sender = Arc::new(Scripted::new("s", &[]));
        let recipient = Arc::new(Scripted::new("r", &["plain"]));

        let result = Exchange::new(sender, recipient, 1)
            .with_summary(SummaryMethod::reflection("summarize"))
            .run("go".to_string(), &mut Context::new())
            .await
            .unwrap();
        assert_eq!(result.summary, "plain");
    }

    #[test]
    fn test_termination_reason_display() {
        let reason = TerminationReason::Sentinel {
            detected_by: "Critic".to_string(),
        };
        assert_eq!(reason.to_string(), "sentinel (Critic)");
        assert_eq!(TerminationReason::MaxTurns.to_string(), "max turns");
    }
}
