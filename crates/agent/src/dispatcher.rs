//! Runs one batch of tool calls against the registry.
//!
//! Every request produces exactly one [`ToolResult`] with the same call id.
//! Failures of any kind (unknown tool, bad arguments, execution error,
//! timeout) become error results so the reasoner can see them and recover.

use std::sync::Arc;
use std::time::{Duration, Instant};

use billwise_core::error::ToolError;
use billwise_core::message::ToolCallRequest;
use billwise_core::tool::{ToolRegistry, ToolResult};
use futures::future::join_all;
use tracing::{debug, warn};

pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    tool_timeout: Duration,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, tool_timeout: Duration) -> Self {
        Self {
            registry,
            tool_timeout,
        }
    }

    pub fn with_timeout(mut self, tool_timeout: Duration) -> Self {
        self.tool_timeout = tool_timeout;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Execute all calls concurrently and return their results in request order.
    ///
    /// The calls run inside the caller's task, so dropping the returned
    /// future drops every in-flight tool invocation with it.
    pub async fn dispatch(&self, calls: &[ToolCallRequest]) -> Vec<ToolResult> {
        join_all(calls.iter().map(|call| self.invoke(call))).await
    }

    async fn invoke(&self, call: &ToolCallRequest) -> ToolResult {
        let Some(tool) = self.registry.get(&call.name) else {
            warn!(tool = %call.name, call_id = %call.id, "Reasoner requested an unknown tool");
            return ToolResult::error(&call.id, &ToolError::NotFound(call.name.clone()));
        };

        let start = Instant::now();
        let outcome = tokio::time::timeout(self.tool_timeout, tool.execute(call.arguments.clone())).await;
        let duration_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(content)) => {
                debug!(tool = %call.name, call_id = %call.id, duration_ms, "Tool succeeded");
                ToolResult::success(&call.id, content)
            }
            Ok(Err(e)) => {
                warn!(tool = %call.name, call_id = %call.id, error = %e, "Tool execution failed");
                ToolResult::error(&call.id, &e)
            }
            Err(_) => {
                let e = ToolError::Timeout {
                    tool_name: call.name.clone(),
                    timeout_ms: self.tool_timeout.as_millis() as u64,
                };
                warn!(tool = %call.name, call_id = %call.id, error = %e, "Tool timed out");
                ToolResult::error(&call.id, &e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{EchoTool, FailingTool, SlowTool};
    use serde_json::json;

    fn dispatcher() -> ToolDispatcher {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry.register(Arc::new(FailingTool));
        registry.register(Arc::new(SlowTool::new(Duration::from_secs(60))));
        ToolDispatcher::new(Arc::new(registry), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn one_result_per_call_in_request_order() {
        let calls = vec![
            ToolCallRequest::new("a", "echo", json!({"text": "first"})),
            ToolCallRequest::new("b", "echo", json!({"text": "second"})),
            ToolCallRequest::new("c", "echo", json!({"text": "third"})),
        ];
        let results = dispatcher().dispatch(&calls).await;

        let ids: Vec<_> = results.iter().map(|r| r.call_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(results[1].content, "second");
        assert!(results.iter().all(|r| !r.is_error));
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_result() {
        let calls = vec![ToolCallRequest::new("x1", "frobnicate", json!({}))];
        let results = dispatcher().dispatch(&calls).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].call_id, "x1");
        assert!(results[0].is_error);
        assert!(results[0].content.contains("Unknown tool: frobnicate"));
    }

    #[tokio::test]
    async fn failure_does_not_affect_siblings() {
        let calls = vec![
            ToolCallRequest::new("1", "fail", json!({})),
            ToolCallRequest::new("2", "echo", json!({"text": "ok"})),
        ];
        let results = dispatcher().dispatch(&calls).await;

        assert!(results[0].is_error);
        assert!(results[0].content.starts_with("Error: "));
        assert!(!results[1].is_error);
        assert_eq!(results[1].content, "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_tool_times_out() {
        let calls = vec![
            ToolCallRequest::new("s", "slow", json!({})),
            ToolCallRequest::new("e", "echo", json!({"text": "fast"})),
        ];
        let results = dispatcher().dispatch(&calls).await;

        assert!(results[0].is_error);
        assert!(results[0].content.contains("timed out"));
        assert_eq!(results[1].content, "fast");
    }

    #[tokio::test(start_paused = true)]
    async fn sub_second_timeout_reports_milliseconds() {
        let dispatcher = dispatcher().with_timeout(Duration::from_millis(250));
        let results = dispatcher
            .dispatch(&[ToolCallRequest::new("s", "slow", json!({}))])
            .await;

        assert!(results[0].is_error);
        assert!(results[0].content.contains("after 250ms"), "{}", results[0].content);
    }

    #[tokio::test]
    async fn empty_batch_yields_nothing() {
        assert!(dispatcher().dispatch(&[]).await.is_empty());
    }
}
