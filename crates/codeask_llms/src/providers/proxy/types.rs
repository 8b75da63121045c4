//! Conversation proxy wire types

use serde::{Deserialize, Serialize};

/// Configuration for the access-token client
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Access token sent as a Bearer credential
    pub access_token: String,
    /// Full conversation endpoint URL
    pub url: String,
    /// Model slug understood by the proxy
    pub model: String,
}

impl ProxyConfig {
    pub const DEFAULT_URL: &'static str = "https://chat.openai.com/backend-api/conversation";

    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            url: Self::DEFAULT_URL.to_string(),
            model: "text-davinci-002-render-sha".to_string(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ConversationRequest {
    pub action: &'static str,
    pub messages: Vec<ProxyMessage>,
    pub model: String,
    pub parent_message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProxyMessage {
    pub id: String,
    pub role: &'static str,
    pub content: ProxyContent,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProxyContent {
    #[serde(default = "text_content_type")]
    pub content_type: String,
    #[serde(default)]
    pub parts: Vec<String>,
}

fn text_content_type() -> String {
    "text".to_string()
}

impl ProxyMessage {
    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: "user",
            content: ProxyContent {
                content_type: text_content_type(),
                parts: vec![text.into()],
            },
        }
    }
}

/// One `data:` payload of the streamed response
#[derive(Debug, Deserialize)]
pub struct ConversationEvent {
    #[serde(default)]
    pub message: Option<EventMessage>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct EventMessage {
    pub id: String,
    #[serde(default)]
    pub author: Option<EventAuthor>,
    pub content: ProxyContent,
}

#[derive(Debug, Deserialize)]
pub struct EventAuthor {
    pub role: String,
}
