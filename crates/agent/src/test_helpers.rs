//! Scripted reasoners and tools shared by the agent tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use billwise_core::error::{ReasoningError, ToolError};
use billwise_core::message::{Message, ToolCallRequest, Transcript};
use billwise_core::reasoner::{Reasoner, ToolDefinition};
use billwise_core::tool::Tool;

/// A reasoner that replays a sequence of scripted messages.
///
/// Panics if called more times than there are messages.
pub struct SequentialMockReasoner {
    responses: Vec<Message>,
    call_count: AtomicUsize,
    seen_lengths: Mutex<Vec<usize>>,
}

impl SequentialMockReasoner {
    pub fn new(responses: Vec<Message>) -> Self {
        Self {
            responses,
            call_count: AtomicUsize::new(0),
            seen_lengths: Mutex::new(Vec::new()),
        }
    }

    pub fn single_text(text: &str) -> Self {
        Self::new(vec![Message::assistant(text)])
    }

    /// First requests `tool_calls`, then answers with `answer`.
    pub fn tool_then_answer(tool_calls: Vec<ToolCallRequest>, answer: &str) -> Self {
        Self::new(vec![
            Message::assistant_with_tool_calls("", tool_calls),
            Message::assistant(answer),
        ])
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Transcript length observed on each call.
    pub fn seen_lengths(&self) -> Vec<usize> {
        self.seen_lengths.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Reasoner for SequentialMockReasoner {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    async fn reason(
        &self,
        transcript: &Transcript,
        _tools: &[ToolDefinition],
    ) -> Result<Message, ReasoningError> {
        let index = self.call_count.fetch_add(1, Ordering::SeqCst);
        self.seen_lengths.lock().unwrap().push(transcript.len());

        match self.responses.get(index) {
            Some(message) => Ok(message.clone()),
            None => panic!(
                "SequentialMockReasoner: no more responses (call #{index}, have {})",
                self.responses.len()
            ),
        }
    }
}

/// A reasoner that requests the `echo` tool forever.
#[derive(Default)]
pub struct LoopingReasoner {
    call_count: AtomicUsize,
}

impl LoopingReasoner {
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Reasoner for LoopingReasoner {
    fn name(&self) -> &str {
        "looping"
    }

    async fn reason(
        &self,
        _transcript: &Transcript,
        _tools: &[ToolDefinition],
    ) -> Result<Message, ReasoningError> {
        let n = self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok(Message::assistant_with_tool_calls(
            "",
            vec![make_tool_call(
                format!("call_{n}"),
                "echo",
                serde_json::json!({"text": "again"}),
            )],
        ))
    }
}

/// Fails `failures` times with `error`, then answers "recovered".
pub struct FlakyReasoner {
    failures: usize,
    error: ReasoningError,
    call_count: AtomicUsize,
}

impl FlakyReasoner {
    pub fn new(failures: usize, error: ReasoningError) -> Self {
        Self {
            failures,
            error,
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Reasoner for FlakyReasoner {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn reason(
        &self,
        _transcript: &Transcript,
        _tools: &[ToolDefinition],
    ) -> Result<Message, ReasoningError> {
        let n = self.call_count.fetch_add(1, Ordering::SeqCst);
        if n < self.failures {
            Err(self.error.clone())
        } else {
            Ok(Message::assistant("recovered"))
        }
    }
}

/// Sleeps before answering.
pub struct SlowReasoner {
    delay: Duration,
    call_count: AtomicUsize,
}

impl SlowReasoner {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Reasoner for SlowReasoner {
    fn name(&self) -> &str {
        "slow"
    }

    async fn reason(
        &self,
        _transcript: &Transcript,
        _tools: &[ToolDefinition],
    ) -> Result<Message, ReasoningError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(Message::assistant("too late"))
    }
}

/// Answers with the transcript's query, after yielding so concurrent
/// queries interleave.
pub struct QueryEchoReasoner;

#[async_trait::async_trait]
impl Reasoner for QueryEchoReasoner {
    fn name(&self) -> &str {
        "query_echo"
    }

    async fn reason(
        &self,
        transcript: &Transcript,
        _tools: &[ToolDefinition],
    ) -> Result<Message, ReasoningError> {
        tokio::task::yield_now().await;
        Ok(Message::assistant(format!(
            "answer to: {}",
            transcript.query().unwrap_or_default()
        )))
    }
}

pub fn make_tool_call(
    id: impl Into<String>,
    name: &str,
    arguments: serde_json::Value,
) -> ToolCallRequest {
    ToolCallRequest::new(id, name, arguments)
}

/// Returns its `text` argument.
pub struct EchoTool;

#[async_trait::async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo the text argument"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {"text": {"type": "string"}},
            "required": ["text"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        arguments["text"]
            .as_str()
            .map(String::from)
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'text' argument".into()))
    }
}

/// Always fails.
pub struct FailingTool;

#[async_trait::async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "fail"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<String, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: "fail".into(),
            reason: "backend unavailable".into(),
        })
    }
}

/// Sleeps for `delay` before answering.
pub struct SlowTool {
    delay: Duration,
}

impl SlowTool {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait::async_trait]
impl Tool for SlowTool {
    fn name(&self) -> &str {
        "slow"
    }

    fn description(&self) -> &str {
        "Sleeps before answering"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<String, ToolError> {
        tokio::time::sleep(self.delay).await;
        Ok("finally".into())
    }
}
