//! Agent roles and the registry that builds them

use crate::error::Result;
use crate::prompts::{PromptRegistry, keys};
use finsight_core::{Agent, TerminationCondition};
use finsight_runtime::AgentRuntime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Name of the code-executing user proxy
pub const USER_PROXY_NAME: &str = "User_Proxy_Auto";

/// Every LLM-backed participant of a report run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    FinancialAssistant,
    Researcher,
    Writer,
    Exporter,
    Critic,
    LegalReviewer,
    TextAlignmentReviewer,
    ConsistencyReviewer,
    CompletionReviewer,
    MetaReviewer,
}

impl Role {
    /// All roles, in registry order
    pub const ALL: [Role; 10] = [
        Role::FinancialAssistant,
        Role::Researcher,
        Role::Writer,
        Role::Exporter,
        Role::Critic,
        Role::LegalReviewer,
        Role::TextAlignmentReviewer,
        Role::ConsistencyReviewer,
        Role::CompletionReviewer,
        Role::MetaReviewer,
    ];

    /// Reviewers in consultation order
    pub const REVIEWERS: [Role; 4] = [
        Role::LegalReviewer,
        Role::TextAlignmentReviewer,
        Role::ConsistencyReviewer,
        Role::CompletionReviewer,
    ];

    /// Agent name as it appears in transcripts
    pub fn agent_name(self) -> &'static str {
        match self {
            Role::FinancialAssistant => "Financial_assistant",
            Role::Researcher => "Researcher",
            Role::Writer => "writer",
            Role::Exporter => "Exporter",
            Role::Critic => "Critic",
            Role::LegalReviewer => "Legal_Reviewer",
            Role::TextAlignmentReviewer => "Text_alignment_reviewer",
            Role::ConsistencyReviewer => "Consistency_reviewer",
            Role::CompletionReviewer => "Completion_Reviewer",
            Role::MetaReviewer => "Meta_Reviewer",
        }
    }

    /// System prompt template for this role
    pub fn prompt_key(self) -> &'static str {
        match self {
            Role::FinancialAssistant | Role::Researcher | Role::Exporter => keys::SYSTEM_ASSISTANT,
            Role::Writer => keys::SYSTEM_WRITER,
            Role::Critic => keys::SYSTEM_CRITIC,
            Role::LegalReviewer => keys::SYSTEM_LEGAL_REVIEWER,
            Role::TextAlignmentReviewer => keys::SYSTEM_TEXT_ALIGNMENT_REVIEWER,
            Role::ConsistencyReviewer => keys::SYSTEM_CONSISTENCY_REVIEWER,
            Role::CompletionReviewer => keys::SYSTEM_COMPLETION_REVIEWER,
            Role::MetaReviewer => keys::SYSTEM_META_REVIEWER,
        }
    }

    /// Reflection prompt that condenses this reviewer's answer
    pub fn summary_key(self) -> &'static str {
        match self {
            Role::LegalReviewer => keys::SUMMARY_LEGAL_REVIEW,
            _ => keys::SUMMARY_REVIEW,
        }
    }

    /// Condition under which this role ends an exchange
    pub fn termination(self) -> TerminationCondition {
        match self {
            Role::Critic => TerminationCondition::contains_terminate(),
            _ => TerminationCondition::default(),
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.agent_name())
    }
}

/// One agent per role, sharing the runtime's provider and model settings
pub struct AgentRegistry {
    agents: Vec<Arc<dyn Agent>>,
}

impl AgentRegistry {
    /// Build every role's agent
    pub fn new(runtime: &AgentRuntime, prompts: &PromptRegistry) -> Result<Self> {
        let agents = Role::ALL
            .iter()
            .map(|&role| {
                let system_prompt = prompts.text(role.prompt_key())?;
                let agent = runtime
                    .create_llm_agent(role.agent_name(), system_prompt)
                    .with_termination(role.termination());
                Ok(Arc::new(agent) as Arc<dyn Agent>)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { agents })
    }

    /// Agent for `role`
    pub fn get(&self, role: Role) -> Arc<dyn Agent> {
        self.agents[role.index()].clone()
    }
}
