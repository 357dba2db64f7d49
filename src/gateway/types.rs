use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of generation task dispatched to the reasoning service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Break an argument into atomic claims.
    Decompose,
    /// Generate counterarguments against one claim.
    Attack,
    /// Generate a strengthened restatement of one claim.
    Defend,
    /// Scan the whole claim set for logical fallacies.
    DetectFallacies,
}

impl TaskKind {
    /// Get the task kind as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Decompose => "decompose",
            TaskKind::Attack => "attack",
            TaskKind::Defend => "defend",
            TaskKind::DetectFallacies => "detect_fallacies",
        }
    }
}

impl std::fmt::Display for TaskKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Message in a reasoning service conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role.
    pub role: MessageRole,
    /// Message text.
    pub content: String,
}

/// Message role
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction.
    System,
    /// User turn.
    User,
}

impl Message {
    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Request to run one generation task against the reasoning service.
///
/// Serializes to the pipe-run request body; `kind` is routing metadata for
/// logging and never crosses the wire.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRequest {
    /// Task kind (logging/routing only).
    #[serde(skip)]
    pub kind: TaskKind,
    /// Pipe name (required by the service API).
    pub name: String,
    /// Conversation messages.
    pub messages: Vec<Message>,
    /// Disable streaming; the engine always consumes full completions.
    pub stream: bool,
    /// Sampling temperature override for this call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Prompt variables (e.g. persona tag).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<HashMap<String, String>>,
}

impl TaskRequest {
    /// Create a new task request
    pub fn new(kind: TaskKind, pipe: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            kind,
            name: pipe.into(),
            messages,
            stream: false,
            temperature: None,
            variables: None,
        }
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Add a single prompt variable
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }
}

/// Response from a reasoning service task.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskResponse {
    /// Whether the service reported success.
    pub success: bool,
    /// Raw completion text; structured payloads are extracted from it by the
    /// pipeline stage that issued the call.
    pub completion: String,
    /// Raw model response details, when the service includes them.
    pub raw: Option<RawResponse>,
}

/// Raw model response details
#[derive(Debug, Clone, Deserialize)]
pub struct RawResponse {
    /// Model identifier.
    pub model: Option<String>,
    /// Token usage.
    pub usage: Option<Usage>,
}

/// Token usage information
#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    /// Tokens in the prompt.
    pub prompt_tokens: Option<u32>,
    /// Tokens in the completion.
    pub completion_tokens: Option<u32>,
    /// Total tokens.
    pub total_tokens: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_kind_as_str() {
        assert_eq!(TaskKind::Decompose.as_str(), "decompose");
        assert_eq!(TaskKind::Attack.as_str(), "attack");
        assert_eq!(TaskKind::Defend.as_str(), "defend");
        assert_eq!(TaskKind::DetectFallacies.as_str(), "detect_fallacies");
    }

    #[test]
    fn test_message_creation() {
        let system = Message::system("You are ARGUS");
        let user = Message::user("AI will replace doctors");

        assert_eq!(system.content, "You are ARGUS");
        assert_eq!(user.content, "AI will replace doctors");
    }

    #[test]
    fn test_task_request_builder() {
        let request = TaskRequest::new(
            TaskKind::Attack,
            "claim-attack-v1",
            vec![Message::user("target claim")],
        )
        .with_temperature(0.7)
        .with_variable("persona", "academic");

        assert_eq!(request.kind, TaskKind::Attack);
        assert_eq!(request.name, "claim-attack-v1");
        assert!(!request.stream);
        assert_eq!(request.temperature, Some(0.7));
        assert_eq!(
            request.variables.unwrap().get("persona"),
            Some(&"academic".to_string())
        );
    }

    #[test]
    fn test_task_request_serialization_skips_kind() {
        let request = TaskRequest::new(TaskKind::Decompose, "argument-decompose-v1", vec![]);
        let json = serde_json::to_value(&request).unwrap();

        assert!(json.get("kind").is_none());
        assert_eq!(json["name"], "argument-decompose-v1");
        assert_eq!(json["stream"], false);
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_task_response_deserialization() {
        let response: TaskResponse = serde_json::from_str(
            r#"{"success": true, "completion": "{\"claims\": []}", "raw": {"model": "gpt-4o-mini", "usage": {"total_tokens": 12}}}"#,
        )
        .unwrap();

        assert!(response.success);
        assert_eq!(response.completion, r#"{"claims": []}"#);
        let raw = response.raw.unwrap();
        assert_eq!(raw.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(raw.usage.unwrap().total_tokens, Some(12));
    }
}
