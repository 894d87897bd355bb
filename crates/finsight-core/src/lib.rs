//! Core abstractions for the finsight report pipeline
//!
//! This crate defines the fundamental traits and types shared by every other
//! crate in the workspace: the conversational [`Agent`] trait, the
//! [`ChatMessage`] transcript entry, typed [`TerminationCondition`]s and the
//! per-run [`Context`].

pub mod agent;
pub mod context;
pub mod error;
pub mod message;
pub mod termination;

pub use agent::Agent;
pub use context::Context;
pub use error::{Error, Result};
pub use message::ChatMessage;
pub use termination::{TERMINATE, TerminationCondition};
