#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::cast_possible_truncation,
    clippy::doc_markdown,
    clippy::float_cmp,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::must_use_candidate
)]

//! Stateful, scored tool calls for LLM rollout loops.
//!
//! A rollout opens a session with an optional ground-truth target, submits
//! arithmetic expressions through the calculator tool, and collects a
//! shaping reward per call plus a tiered score on demand. Expressions run
//! through a closed arithmetic grammar, so model output is never handed to
//! an interpreter. The crate does no I/O; hosts own config loading and
//! log subscription.

pub mod config;
pub mod expr;
pub mod session;
pub mod tools;

pub use config::{CalculatorConfig, ToolsConfig};
pub use session::{CalcSession, SessionStore, StoreError};
pub use tools::{CalculatorTool, Tool, ToolResponse, ToolSpec};
