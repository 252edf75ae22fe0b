//! Decides whether an assistant message ends the loop.

use billwise_core::message::{Message, ToolCallRequest};

/// What the loop does after a reasoning turn.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// No tool calls: the message content is the final answer.
    Terminate,
    /// Run these tool calls, then reason again.
    Continue(Vec<ToolCallRequest>),
}

/// Route on the tool calls carried by `message`.
pub fn route(message: &Message) -> Route {
    match message.tool_calls() {
        [] => Route::Terminate,
        calls => Route::Continue(calls.to_vec()),
    }
}
