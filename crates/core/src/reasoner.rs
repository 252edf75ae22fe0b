//! Reasoner trait: the abstraction over reasoning backends.
//!
//! A Reasoner takes the transcript so far plus the schemas of the available
//! tools and returns exactly one new assistant message, which may request
//! tool calls. It is stateless: everything it needs is in the arguments.
//!
//! Implementations: OpenAI-compatible chat completion endpoints; scripted
//! reasoners in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ReasoningError;
use crate::message::{Message, Role, Transcript};

/// A tool definition sent to the backend so it knows what it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// The core Reasoner trait.
///
/// Implementations must tolerate concurrent calls from independent queries.
/// A failed call must not have produced any message: the loop only appends
/// what `reason` returns in `Ok`.
#[async_trait]
pub trait Reasoner: Send + Sync {
    /// A human-readable name for this backend (e.g., "openai").
    fn name(&self) -> &str;

    /// Produce the next assistant message for `transcript`.
    async fn reason(
        &self,
        transcript: &Transcript,
        tools: &[ToolDefinition],
    ) -> std::result::Result<Message, ReasoningError>;
}

/// Check the input contract every reasoner shares: non-empty, user first.
pub fn validate_transcript(transcript: &Transcript) -> std::result::Result<(), ReasoningError> {
    match transcript.messages().first() {
        None => Err(ReasoningError::InvalidTranscript("transcript is empty".into())),
        Some(first) if first.role() != Role::User => Err(ReasoningError::InvalidTranscript(
            "transcript must start with a user message".into(),
        )),
        Some(_) => Ok(()),
    }
}
