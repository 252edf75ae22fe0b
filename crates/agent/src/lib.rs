//! The billwise agent: answers one question by alternating between the
//! reasoning backend and the bill lookup tools.
//!
//! 1. **Seed** a transcript with the user's question
//! 2. **Reason**: the backend returns one assistant message
//! 3. **Route**: tool calls go to the dispatcher, plain text is the answer
//! 4. **Dispatch**: tool results are appended and the loop reasons again
//!
//! Each query owns its transcript. The reasoner and tool registry are shared
//! read-only between concurrent queries through [`AgentHandle`].

pub mod dispatcher;
pub mod handle;
pub mod loop_runner;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use dispatcher::ToolDispatcher;
pub use handle::{AgentHandle, SharedAgent};
pub use loop_runner::{AgentLoop, AgentOutcome, LoopSettings};
pub use router::{Route, route};
pub use state::{AgentState, Step};
