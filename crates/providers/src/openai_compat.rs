//! OpenAI-compatible reasoner implementation.
//!
//! Works with: OpenAI, OpenRouter, Ollama, vLLM, Together AI, and any
//! endpoint that speaks `/v1/chat/completions` with function calling.

use async_trait::async_trait;
use billwise_core::error::ReasoningError;
use billwise_core::message::{Message, MessageKind, Role, ToolCallRequest, Transcript};
use billwise_core::reasoner::{Reasoner, ToolDefinition, validate_transcript};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, warn};

/// A reasoner backed by an OpenAI-compatible chat completion endpoint.
///
/// Holds one pooled `reqwest::Client`; safe to share across queries.
pub struct OpenAiCompatReasoner {
    name: String,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    system_prompt: Option<String>,
    client: reqwest::Client,
}

impl OpenAiCompatReasoner {
    /// Create a new OpenAI-compatible reasoner.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            });

        Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            temperature: 0.0,
            max_tokens: None,
            system_prompt: None,
            client,
        }
    }

    /// Create an OpenAI reasoner (convenience constructor).
    pub fn openai(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new("openai", "https://api.openai.com/v1", api_key, model)
    }

    /// Create an OpenRouter reasoner (convenience constructor).
    pub fn openrouter(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::new("openrouter", "https://openrouter.ai/api/v1", api_key, model)
    }

    /// Create an Ollama reasoner (convenience constructor).
    pub fn ollama(base_url: Option<&str>, model: impl Into<String>) -> Self {
        Self::new(
            "ollama",
            base_url.unwrap_or("http://localhost:11434/v1"),
            "ollama", // Ollama doesn't need a real key
            model,
        )
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Convert a transcript to OpenAI API format, system prompt first.
    fn to_api_messages(system_prompt: Option<&str>, transcript: &Transcript) -> Vec<ApiMessage> {
        let system = system_prompt.map(|prompt| ApiMessage {
            role: "system".into(),
            content: Some(prompt.to_string()),
            tool_calls: None,
            tool_call_id: None,
        });

        let turns = transcript.iter().map(|m| {
            let role = match m.role() {
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::Tool => "tool",
            };
            match m.kind() {
                MessageKind::WithToolCalls { tool_calls } => ApiMessage {
                    role: role.into(),
                    content: (!m.content().is_empty()).then(|| m.content().to_string()),
                    tool_calls: Some(
                        tool_calls
                            .iter()
                            .map(|tc| ApiToolCall {
                                id: tc.id.clone(),
                                r#type: "function".into(),
                                function: ApiFunction {
                                    name: tc.name.clone(),
                                    arguments: tc.arguments.to_string(),
                                },
                            })
                            .collect(),
                    ),
                    tool_call_id: None,
                },
                MessageKind::ToolResult { call_id, .. } => ApiMessage {
                    role: role.into(),
                    content: Some(m.content().to_string()),
                    tool_calls: None,
                    tool_call_id: Some(call_id.clone()),
                },
                MessageKind::Plain => ApiMessage {
                    role: role.into(),
                    content: Some(m.content().to_string()),
                    tool_calls: None,
                    tool_call_id: None,
                },
            }
        });

        system.into_iter().chain(turns).collect()
    }

    /// Convert tool definitions to OpenAI API format.
    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }

    /// Map a non-200 status to the matching error.
    ///
    /// 429 honours `retry-after` in seconds and falls back to 5.
    fn status_error(status: u16, retry_after: Option<&str>, body: String) -> ReasoningError {
        match status {
            429 => ReasoningError::RateLimited {
                retry_after_secs: retry_after
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(5),
            },
            401 | 403 => ReasoningError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ),
            _ => ReasoningError::ApiError {
                status_code: status,
                message: body,
            },
        }
    }

    /// Turn the first choice of a completion into an assistant message.
    ///
    /// Tool calls must carry a non-empty, unique id and JSON arguments;
    /// anything else is a malformed response.
    fn parse_response(api_response: ApiResponse) -> Result<Message, ReasoningError> {
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ReasoningError::MalformedResponse("No choices in response".into()))?;

        let mut seen = HashSet::new();
        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| {
                if tc.id.is_empty() {
                    return Err(ReasoningError::MalformedResponse(format!(
                        "tool call to '{}' has no id",
                        tc.function.name
                    )));
                }
                if !seen.insert(tc.id.clone()) {
                    return Err(ReasoningError::MalformedResponse(format!(
                        "duplicate tool call id '{}'",
                        tc.id
                    )));
                }
                let arguments = if tc.function.arguments.trim().is_empty() {
                    serde_json::json!({})
                } else {
                    serde_json::from_str(&tc.function.arguments).map_err(|e| {
                        ReasoningError::MalformedResponse(format!(
                            "arguments for '{}' are not valid JSON: {e}",
                            tc.function.name
                        ))
                    })?
                };
                Ok(ToolCallRequest::new(tc.id, tc.function.name, arguments))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Message::assistant_with_tool_calls(
            choice.message.content.unwrap_or_default(),
            tool_calls,
        ))
    }
}

#[async_trait]
impl Reasoner for OpenAiCompatReasoner {
    fn name(&self) -> &str {
        &self.name
    }

    async fn reason(
        &self,
        transcript: &Transcript,
        tools: &[ToolDefinition],
    ) -> Result<Message, ReasoningError> {
        validate_transcript(transcript)?;

        let url = format!("{}/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": Self::to_api_messages(self.system_prompt.as_deref(), transcript),
            "temperature": self.temperature,
            "stream": false,
        });

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(tools));
        }

        debug!(
            backend = %self.name,
            model = %self.model,
            messages = transcript.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ReasoningError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status != 200 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Reasoning backend returned error");
            return Err(Self::status_error(status, retry_after.as_deref(), error_body));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ReasoningError::MalformedResponse(format!("Failed to parse response: {e}")))?;

        Self::parse_response(api_response)
    }
}

// --- OpenAI API types (internal) ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    #[serde(default)]
    id: String,
    #[serde(default = "function_type")]
    r#type: String,
    function: ApiFunction,
}

fn function_type() -> String {
    "function".into()
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Serialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Message, ReasoningError> {
        let resp: ApiResponse = serde_json::from_str(json).unwrap();
        OpenAiCompatReasoner::parse_response(resp)
    }

    #[test]
    fn openrouter_constructor() {
        let reasoner = OpenAiCompatReasoner::openrouter("sk-test", "openai/gpt-4o");
        assert_eq!(reasoner.name(), "openrouter");
        assert!(reasoner.base_url.contains("openrouter.ai"));
        assert_eq!(reasoner.model(), "openai/gpt-4o");
    }

    #[test]
    fn ollama_constructor() {
        let reasoner = OpenAiCompatReasoner::ollama(None, "llama3.1");
        assert_eq!(reasoner.name(), "ollama");
        assert!(reasoner.base_url.contains("localhost:11434"));
    }

    #[test]
    fn trailing_slash_trimmed() {
        let reasoner = OpenAiCompatReasoner::new("x", "http://host/v1/", "k", "m");
        assert_eq!(reasoner.base_url, "http://host/v1");
    }

    #[test]
    fn transcript_conversion_with_system_prompt() {
        let transcript = Transcript::new("Hello");
        let api = OpenAiCompatReasoner::to_api_messages(Some("Be brief"), &transcript);
        assert_eq!(api.len(), 2);
        assert_eq!(api[0].role, "system");
        assert_eq!(api[1].role, "user");

        let api = OpenAiCompatReasoner::to_api_messages(None, &transcript);
        assert_eq!(api.len(), 1);
    }

    #[test]
    fn transcript_conversion_with_tool_round() {
        let transcript = Transcript::new("healthcare bills?")
            .append(Message::assistant_with_tool_calls(
                "",
                vec![ToolCallRequest::new(
                    "call_1",
                    "search_bills",
                    serde_json::json!({"topic": "healthcare"}),
                )],
            ))
            .append(Message::tool_result("call_1", "HB1366", false));

        let api = OpenAiCompatReasoner::to_api_messages(None, &transcript);
        assert_eq!(api.len(), 3);
        assert!(api[1].content.is_none());
        let tc = api[1].tool_calls.as_ref().unwrap();
        assert_eq!(tc[0].function.name, "search_bills");
        assert_eq!(tc[0].function.arguments, r#"{"topic":"healthcare"}"#);
        assert_eq!(api[2].role, "tool");
        assert_eq!(api[2].tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn tool_definition_conversion() {
        let tools = vec![ToolDefinition {
            name: "search_bills".into(),
            description: "Search bills".into(),
            parameters: serde_json::json!({"type": "object"}),
        }];
        let api_tools = OpenAiCompatReasoner::to_api_tools(&tools);
        assert_eq!(api_tools.len(), 1);
        assert_eq!(api_tools[0].function.name, "search_bills");
        assert_eq!(api_tools[0].r#type, "function");
    }

    #[test]
    fn parse_plain_answer() {
        let msg = parse(r#"{"choices":[{"message":{"role":"assistant","content":"No bills match."}}]}"#)
            .unwrap();
        assert_eq!(msg.role(), Role::Assistant);
        assert_eq!(msg.content(), "No bills match.");
        assert_eq!(msg.kind(), &MessageKind::Plain);
    }

    #[test]
    fn parse_tool_calls() {
        let msg = parse(
            r#"{"choices":[{"message":{"role":"assistant","content":null,"tool_calls":[
                {"id":"call_a","type":"function","function":{"name":"search_bills","arguments":"{\"topic\":\"healthcare\",\"year\":2026}"}},
                {"id":"call_b","type":"function","function":{"name":"get_legislator_info","arguments":""}}
            ]}}]}"#,
        )
        .unwrap();
        let calls = msg.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].arguments["year"], 2026);
        assert_eq!(calls[1].arguments, serde_json::json!({}));
        assert_eq!(msg.content(), "");
    }

    #[test]
    fn parse_rejects_bad_arguments() {
        let err = parse(
            r#"{"choices":[{"message":{"role":"assistant","tool_calls":[
                {"id":"call_a","type":"function","function":{"name":"search_bills","arguments":"{topic"}}
            ]}}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ReasoningError::MalformedResponse(_)));
    }

    #[test]
    fn parse_rejects_duplicate_ids() {
        let err = parse(
            r#"{"choices":[{"message":{"role":"assistant","tool_calls":[
                {"id":"x","function":{"name":"a","arguments":"{}"}},
                {"id":"x","function":{"name":"b","arguments":"{}"}}
            ]}}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn parse_rejects_missing_id() {
        let err = parse(
            r#"{"choices":[{"message":{"role":"assistant","tool_calls":[
                {"function":{"name":"a","arguments":"{}"}}
            ]}}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ReasoningError::MalformedResponse(_)));
    }

    #[test]
    fn parse_rejects_empty_choices() {
        assert!(matches!(
            parse(r#"{"choices":[]}"#),
            Err(ReasoningError::MalformedResponse(_))
        ));
    }

    #[test]
    fn rate_limit_honours_retry_after() {
        let err = OpenAiCompatReasoner::status_error(429, Some("12"), String::new());
        assert!(matches!(err, ReasoningError::RateLimited { retry_after_secs: 12 }));
        assert!(err.is_transient());
    }

    #[test]
    fn rate_limit_defaults_to_five_seconds() {
        for header in [None, Some("soon")] {
            let err = OpenAiCompatReasoner::status_error(429, header, String::new());
            assert!(matches!(err, ReasoningError::RateLimited { retry_after_secs: 5 }));
        }
    }

    #[test]
    fn auth_statuses_are_authentication_failures() {
        for status in [401, 403] {
            let err = OpenAiCompatReasoner::status_error(status, None, "denied".into());
            assert!(matches!(err, ReasoningError::AuthenticationFailed(_)));
            assert!(!err.is_transient());
        }
    }

    #[test]
    fn other_statuses_keep_the_body() {
        let err = OpenAiCompatReasoner::status_error(500, None, "upstream exploded".into());
        match err {
            ReasoningError::ApiError {
                status_code,
                message,
            } => {
                assert_eq!(status_code, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        let reasoner = OpenAiCompatReasoner::new("dead", "http://127.0.0.1:9", "k", "m");
        let err = reasoner
            .reason(&Transcript::new("hi"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ReasoningError::Network(_)));
    }
}
