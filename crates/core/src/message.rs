//! Message and Transcript domain types.
//!
//! These are the value objects that flow through the agent loop:
//! the user's query seeds a transcript → the reasoner appends an assistant
//! message → the dispatcher appends one tool message per requested call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a message sender in a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking the question
    User,
    /// The reasoning backend
    Assistant,
    /// Tool execution result
    Tool,
}

/// A request, issued by the reasoner, to invoke a named tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Call ID, unique within the issuing message
    pub id: String,

    /// Name of the tool to invoke
    pub name: String,

    /// Arguments as arbitrary JSON (normally an object)
    #[serde(default)]
    pub arguments: serde_json::Value,
}

impl ToolCallRequest {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: serde_json::Value,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// What a message carries besides its text.
///
/// The discriminant decides routing; there is no "maybe empty" tool call
/// list to probe. `WithToolCalls` is never constructed with an empty list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MessageKind {
    /// Text only.
    Plain,
    /// An assistant turn that asks for one or more tool invocations.
    WithToolCalls { tool_calls: Vec<ToolCallRequest> },
    /// The outcome of exactly one tool call.
    ToolResult {
        call_id: String,
        #[serde(default)]
        is_error: bool,
    },
}

/// A single message in a transcript. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: String,
    role: Role,
    content: String,
    #[serde(flatten)]
    kind: MessageKind,
    timestamp: DateTime<Utc>,
}

impl Message {
    fn build(role: Role, content: String, kind: MessageKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            kind,
            timestamp: Utc::now(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::build(Role::User, content.into(), MessageKind::Plain)
    }

    /// Create a new assistant message with no tool calls.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::build(Role::Assistant, content.into(), MessageKind::Plain)
    }

    /// Create an assistant message requesting tool calls.
    ///
    /// An empty `tool_calls` list produces a plain assistant message.
    pub fn assistant_with_tool_calls(
        content: impl Into<String>,
        tool_calls: Vec<ToolCallRequest>,
    ) -> Self {
        let kind = if tool_calls.is_empty() {
            MessageKind::Plain
        } else {
            MessageKind::WithToolCalls { tool_calls }
        };
        Self::build(Role::Assistant, content.into(), kind)
    }

    /// Create a tool result message answering `call_id`.
    pub fn tool_result(
        call_id: impl Into<String>,
        content: impl Into<String>,
        is_error: bool,
    ) -> Self {
        Self::build(
            Role::Tool,
            content.into(),
            MessageKind::ToolResult {
                call_id: call_id.into(),
                is_error,
            },
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn kind(&self) -> &MessageKind {
        &self.kind
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Tool calls requested by this message (empty unless `WithToolCalls`).
    pub fn tool_calls(&self) -> &[ToolCallRequest] {
        match &self.kind {
            MessageKind::WithToolCalls { tool_calls } => tool_calls,
            _ => &[],
        }
    }

    /// For tool results, the id of the call this message answers.
    pub fn tool_call_id(&self) -> Option<&str> {
        match &self.kind {
            MessageKind::ToolResult { call_id, .. } => Some(call_id),
            _ => None,
        }
    }

    /// Whether this is a tool result carrying an error payload.
    pub fn is_error(&self) -> bool {
        matches!(self.kind, MessageKind::ToolResult { is_error: true, .. })
    }
}

/// Append-only history of one query.
///
/// There is no way to remove or rewrite a message: appending consumes the
/// transcript and hands back the extended one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    /// Seed a transcript with the user's query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(query)],
        }
    }

    /// Return this transcript with `message` appended.
    pub fn append(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// Return this transcript with every message of `messages` appended, in order.
    pub fn extend(mut self, messages: impl IntoIterator<Item = Message>) -> Self {
        self.messages.extend(messages);
        self
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The question that started this transcript.
    pub fn query(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == Role::User)
            .map(Message::content)
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("What bills are about healthcare?");
        assert_eq!(msg.role(), Role::User);
        assert_eq!(msg.content(), "What bills are about healthcare?");
        assert!(msg.tool_calls().is_empty());
        assert_eq!(msg.kind(), &MessageKind::Plain);
    }

    #[test]
    fn empty_tool_call_list_is_plain() {
        let msg = Message::assistant_with_tool_calls("done", vec![]);
        assert_eq!(msg.kind(), &MessageKind::Plain);
    }

    #[test]
    fn tool_calls_are_exposed() {
        let call = ToolCallRequest::new("1", "search_bills", serde_json::json!({"topic": "tax"}));
        let msg = Message::assistant_with_tool_calls("", vec![call.clone()]);
        assert_eq!(msg.tool_calls(), &[call]);
        assert!(msg.tool_call_id().is_none());
    }

    #[test]
    fn tool_result_references_call() {
        let msg = Message::tool_result("call_7", "Unknown tool: frobnicate", true);
        assert_eq!(msg.role(), Role::Tool);
        assert_eq!(msg.tool_call_id(), Some("call_7"));
        assert!(msg.is_error());
        assert!(!Message::tool_result("call_8", "ok", false).is_error());
    }

    #[test]
    fn transcript_appends_in_order() {
        let transcript = Transcript::new("q")
            .append(Message::assistant("a"))
            .extend([
                Message::tool_result("1", "r1", false),
                Message::tool_result("2", "r2", false),
            ]);
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript.query(), Some("q"));
        let ids: Vec<_> = transcript.iter().filter_map(Message::tool_call_id).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(transcript.last().map(Message::content), Some("r2"));
    }

    #[test]
    fn message_kind_serializes_with_discriminant() {
        let msg = Message::assistant_with_tool_calls(
            "",
            vec![ToolCallRequest::new("1", "search_bills", serde_json::json!({}))],
        );
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["kind"], "with_tool_calls");
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["tool_calls"][0]["name"], "search_bills");

        let back: Message = serde_json::from_value(json).unwrap();
        assert_eq!(back.tool_calls().len(), 1);
    }
}
