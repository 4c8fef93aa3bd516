//! Agent Runtime - optional AI enrichment for sustainability insights
//!
//! This crate wraps the deterministic insight engine from `cirqle-core` with
//! the pieces that talk to an external completion service:
//! - `llm` - the `LlmClient` seam and an OpenAI-compatible implementation
//! - `summary` - the AI summary augmenter and its payload parsing
//! - `chat` - the Eco assistant free-form reply
//! - `runtime` - `InsightRuntime`, which runs aggregate → augment → assemble
//!
//! # Safety Principle
//!
//! The model is strictly a narrator. It NEVER decides scores, metrics, or
//! recommendations. Those are deterministic outputs of the core crate, and
//! every failure on the AI side degrades to an empty AI section.

pub mod chat;
pub mod llm;
pub mod runtime;
pub mod summary;

pub use chat::{EcoAssistant, HistoryTurn};
pub use llm::{ChatMessage, ChatRequest, ChatRole, LlmClient, LlmError, OpenAiChatClient};
pub use runtime::InsightRuntime;
pub use summary::{AugmentFailure, AugmentOutcome, SummaryAugmenter, SummaryContext};
