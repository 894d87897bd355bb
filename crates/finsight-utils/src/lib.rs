//! Shared utilities for finsight
//!
//! This crate provides common functionality used across the workspace,
//! including logging setup, environment configuration helpers and lenient
//! parsing of JSON written by language models.

pub mod config;
pub mod json;
pub mod logging;

pub use config::{ConfigError, env_parse, env_var};
pub use json::{extract_json_object, parse_lenient};
pub use logging::{init_tracing, init_tracing_json};
