//! The reason/act loop.
//!
//! A query seeds a transcript with the user's question and then cycles
//! through explicit steps:
//!
//! 1. **Reason**: ask the reasoner for the next assistant message
//! 2. **Route**: no tool calls means the content is the answer
//! 3. **Dispatch**: run the requested tools and append their results
//!
//! The number of reasoning turns is capped. Hitting the cap is an error that
//! carries the transcript built so far.

use std::sync::Arc;
use std::time::Duration;

use billwise_config::AgentSettings;
use billwise_core::error::{Error, Result};
use billwise_core::message::{Message, Transcript};
use billwise_core::reasoner::{Reasoner, ToolDefinition};
use billwise_core::tool::{ToolRegistry, ToolResult};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::dispatcher::ToolDispatcher;
use crate::router::{Route, route};
use crate::state::{AgentState, Step};

/// Limits applied to every query.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopSettings {
    pub max_turns: u32,
    pub reasoning_timeout: Duration,
    pub tool_timeout: Duration,
    /// Extra attempts after a transient reasoning failure.
    pub reasoning_retries: u32,
    /// Delay before retry `n` is `n * retry_backoff`.
    pub retry_backoff: Duration,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self::from(&AgentSettings::default())
    }
}

impl From<&AgentSettings> for LoopSettings {
    fn from(settings: &AgentSettings) -> Self {
        Self {
            max_turns: settings.max_turns,
            reasoning_timeout: settings.reasoning_timeout(),
            tool_timeout: settings.tool_timeout(),
            reasoning_retries: settings.reasoning_retries,
            retry_backoff: settings.retry_backoff(),
        }
    }
}

/// The result of a query that reached a final answer.
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
    pub answer: String,
    pub transcript: Transcript,
    pub turns: u32,
}

pub struct AgentLoop {
    reasoner: Arc<dyn Reasoner>,
    dispatcher: ToolDispatcher,
    settings: LoopSettings,
}

impl AgentLoop {
    pub fn new(reasoner: Arc<dyn Reasoner>, tools: Arc<ToolRegistry>) -> Self {
        let settings = LoopSettings::default();
        Self {
            reasoner,
            dispatcher: ToolDispatcher::new(tools, settings.tool_timeout),
            settings,
        }
    }

    pub fn with_settings(mut self, settings: LoopSettings) -> Self {
        self.dispatcher = self.dispatcher.with_timeout(settings.tool_timeout);
        self.settings = settings;
        self
    }

    pub fn settings(&self) -> &LoopSettings {
        &self.settings
    }

    pub fn reasoner(&self) -> &Arc<dyn Reasoner> {
        &self.reasoner
    }

    pub fn tools(&self) -> &ToolRegistry {
        self.dispatcher.registry()
    }

    /// Answer `query`, returning the final answer with its transcript.
    pub async fn run(&self, query: &str) -> Result<AgentOutcome> {
        info!(
            reasoner = self.reasoner.name(),
            max_turns = self.settings.max_turns,
            "Processing query"
        );

        let definitions = self.dispatcher.registry().definitions();
        let mut state = AgentState::new(query);
        let mut step = Step::Reason;

        loop {
            step = match step {
                Step::Reason => {
                    if state.turns >= self.settings.max_turns {
                        warn!(
                            max_turns = self.settings.max_turns,
                            messages = state.transcript.len(),
                            "Loop limit reached without a final answer"
                        );
                        return Err(Error::LoopLimitExceeded {
                            max_turns: self.settings.max_turns,
                            transcript: Box::new(state.transcript),
                        });
                    }
                    state.turns += 1;
                    debug!(turn = state.turns, "Reasoning");

                    let message = self.reason(&state.transcript, &definitions).await?;
                    state.transcript = state.transcript.append(message);
                    Step::Route
                }
                Step::Route => {
                    let last = state
                        .transcript
                        .last()
                        .ok_or_else(|| Error::Internal("transcript is empty".into()))?;
                    match route(last) {
                        Route::Terminate => Step::Done(last.content().to_string()),
                        Route::Continue(calls) => Step::Dispatch(calls),
                    }
                }
                Step::Dispatch(calls) => {
                    debug!(
                        turn = state.turns,
                        tools = ?calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                        "Dispatching tool calls"
                    );
                    let results = self.dispatcher.dispatch(&calls).await;
                    state.transcript = state
                        .transcript
                        .extend(results.into_iter().map(ToolResult::into_message));
                    Step::Reason
                }
                Step::Done(answer) => {
                    info!(
                        turns = state.turns,
                        messages = state.transcript.len(),
                        "Query answered"
                    );
                    return Ok(AgentOutcome {
                        answer,
                        transcript: state.transcript,
                        turns: state.turns,
                    });
                }
            };
        }
    }

    /// One reasoning call, retried on transient failures.
    async fn reason(&self, transcript: &Transcript, tools: &[ToolDefinition]) -> Result<Message> {
        let mut attempt = 0;
        loop {
            match self.reason_once(transcript, tools).await {
                Err(e) if attempt < self.settings.reasoning_retries && is_retryable(&e) => {
                    attempt += 1;
                    let delay = retry_delay(&e, self.settings.retry_backoff * attempt);
                    warn!(attempt, error = %e, delay_ms = delay.as_millis() as u64, "Reasoning failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                other => return other,
            }
        }
    }

    async fn reason_once(&self, transcript: &Transcript, tools: &[ToolDefinition]) -> Result<Message> {
        let timeout = self.settings.reasoning_timeout;
        match tokio::time::timeout(timeout, self.reasoner.reason(transcript, tools)).await {
            Ok(Ok(message)) => Ok(message),
            Ok(Err(e)) => Err(Error::Reasoning(e)),
            Err(_) => Err(Error::ReasoningTimeout {
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }
}

fn is_retryable(error: &Error) -> bool {
    match error {
        Error::Reasoning(e) => e.is_transient(),
        Error::ReasoningTimeout { .. } => true,
        _ => false,
    }
}

/// A rate limit's own retry-after wins over a shorter backoff.
fn retry_delay(error: &Error, backoff: Duration) -> Duration {
    match error {
        Error::Reasoning(billwise_core::ReasoningError::RateLimited { retry_after_secs }) => {
            backoff.max(Duration::from_secs(*retry_after_secs))
        }
        _ => backoff,
    }
}
