//! Reasoning backend adapters for billwise.
//!
//! All adapters implement the `billwise_core::Reasoner` trait.
//! `build_from_config` selects and configures one from `AppConfig`.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatReasoner;
pub use router::{KEYLESS, build_from_config, default_base_url, is_keyless, missing_api_key};

/// Instructions prepended to every backend request unless overridden by
/// `agent.system_prompt`. Never stored in the transcript.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You answer questions about Missouri House of Representatives bills. \
Use the available tools to look up bills, their sponsors, status and hearings before answering. \
Cite bill numbers in your answer. If the tools return nothing relevant, say so instead of guessing.";
