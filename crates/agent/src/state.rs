//! Per-query loop state.

use billwise_core::message::{ToolCallRequest, Transcript};

/// Owned by exactly one query; never shared.
#[derive(Debug)]
pub struct AgentState {
    pub transcript: Transcript,
    /// Reasoning turns taken so far.
    pub turns: u32,
}

impl AgentState {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            transcript: Transcript::new(query),
            turns: 0,
        }
    }
}

/// Where the loop goes next.
#[derive(Debug)]
pub enum Step {
    Reason,
    Route,
    Dispatch(Vec<ToolCallRequest>),
    Done(String),
}
