use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Chat roles of the OpenAI-compatible completions wire format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl ChatMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self::text(ChatRole::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text(ChatRole::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(ChatRole::Assistant, text)
    }

    /// Assistant message carrying the tool invocations the engine requested,
    /// echoed back so the engine can see its own request when it resumes.
    pub fn assistant_tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: None,
            tool_calls: Some(calls),
            tool_call_id: None,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Tool,
            content: Some(content.into()),
            tool_calls: None,
            tool_call_id: Some(call_id.into()),
        }
    }

    fn text(role: ChatRole, text: impl Into<String>) -> Self {
        Self { role, content: Some(text.into()), tool_calls: None, tool_call_id: None }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionCall,
}

/// `arguments` is a JSON-encoded string, as the wire format specifies.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionSpec,
}

#[derive(Clone, Debug, Serialize)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn function(name: &'static str, description: &'static str, parameters: Value) -> Self {
        Self { kind: "function", function: FunctionSpec { name, description, parameters } }
    }
}

#[derive(Clone, Debug)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<ToolDefinition>,
}

/// What one engine round produced: either the final answer text or a batch of
/// tool invocations to execute before the engine can continue.
#[derive(Clone, Debug, PartialEq)]
pub enum CompletionOutcome {
    Final(String),
    ToolCalls(Vec<ToolCall>),
}

#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion engine unreachable: {0}")]
    Transport(String),
    #[error("completion request timed out")]
    Timeout,
    #[error("completion engine returned status {0}")]
    Status(u16),
    #[error("completion response is malformed: {0}")]
    Malformed(String),
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionOutcome, CompletionError>;
}

/// Settings for [`OpenAiCompatibleClient`]. Works against api.openai.com and
/// any server speaking the same `/chat/completions` dialect (e.g. Ollama).
#[derive(Clone, Debug)]
pub struct CompletionSettings {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub model: String,
    pub temperature: f64,
    pub timeout: Duration,
}

pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    settings: CompletionSettings,
}

impl OpenAiCompatibleClient {
    pub fn new(settings: CompletionSettings) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|error| CompletionError::Transport(error.to_string()))?;
        Ok(Self { http, settings })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.settings.base_url.trim_end_matches('/'))
    }
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tools: &'a [ToolDefinition],
    temperature: f64,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiChoiceMessage,
}

#[derive(Deserialize)]
struct ApiChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[async_trait]
impl CompletionClient for OpenAiCompatibleClient {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionOutcome, CompletionError> {
        let body = ApiRequest {
            model: &self.settings.model,
            messages: &request.messages,
            tools: &request.tools,
            temperature: self.settings.temperature,
        };

        let mut http_request = self.http.post(self.endpoint()).json(&body);
        if let Some(api_key) = &self.settings.api_key {
            http_request = http_request.bearer_auth(api_key.expose_secret());
        }

        let response = http_request.send().await.map_err(|error| {
            if error.is_timeout() {
                CompletionError::Timeout
            } else {
                CompletionError::Transport(error.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(CompletionError::Status(status.as_u16()));
        }

        let payload: ApiResponse = response
            .json()
            .await
            .map_err(|error| CompletionError::Malformed(error.to_string()))?;

        let Some(choice) = payload.choices.into_iter().next() else {
            return Err(CompletionError::Malformed("response carried no choices".to_string()));
        };

        if let Some(calls) = choice.message.tool_calls.filter(|calls| !calls.is_empty()) {
            return Ok(CompletionOutcome::ToolCalls(calls));
        }

        match choice.message.content {
            Some(text) if !text.trim().is_empty() => Ok(CompletionOutcome::Final(text)),
            _ => Err(CompletionError::Malformed(
                "response carried neither text nor tool calls".to_string(),
            )),
        }
    }
}
