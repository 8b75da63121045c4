//! Chat completions wire types

use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a helpful programming assistant embedded in a code editor. \
Answer as concisely as possible and put code in fenced code blocks.";

/// Configuration for the API-key client
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// API key for authentication
    pub api_key: String,
    /// Base URL (default: https://api.openai.com/v1)
    pub base_url: String,
    /// Model ID (default: gpt-3.5-turbo)
    pub model: String,
    /// System message prepended to every request
    pub system_message: String,
    /// Character budget for replayed conversation history
    pub max_history_chars: usize,
    pub temperature: Option<f32>,
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            system_message: DEFAULT_SYSTEM_MESSAGE.to_string(),
            max_history_chars: 12_000,
            temperature: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut url = base_url.into();
        // Accept the full endpoint URL as well
        if let Some(stripped) = url.trim_end_matches('/').strip_suffix("/chat/completions") {
            url = stripped.to_string();
        }
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = message.into();
        self
    }

    pub fn with_max_history_chars(mut self, chars: usize) -> Self {
        self.max_history_chars = chars;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Chat completion request
#[derive(Debug, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<CompletionMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: String,
}

impl CompletionMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// One `data:` payload of the streamed response
#[derive(Debug, Deserialize)]
pub struct CompletionChunk {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    #[serde(default)]
    pub error: Option<ChunkError>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChunkError {
    pub message: String,
}
