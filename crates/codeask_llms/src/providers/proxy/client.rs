//! Access-token client implementation

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest_eventsource::EventSource;
use tracing::info;
use uuid::Uuid;

use super::stream::create_stream;
use super::types::{ConversationRequest, ProxyConfig, ProxyMessage};
use crate::client::{ChatClient, run_with_deadline};
use crate::error::{Error, Result};
use crate::types::{ChatResponse, PartialResponse, SendOptions};

/// Conversation proxy client authenticated with an access token.
///
/// The proxy keeps conversation state server-side; continuation only needs the
/// conversation id and the parent message id.
pub struct ProxyClient {
    config: ProxyConfig,
    client: Client,
}

impl ProxyClient {
    /// Environment variable for access token
    pub const ACCESS_TOKEN_ENV: &'static str = "CODEASK_ACCESS_TOKEN";

    pub fn new(config: ProxyConfig) -> Result<Self> {
        if config.access_token.trim().is_empty() {
            return Err(Error::MissingCredentials("access token".to_string()));
        }

        Ok(Self {
            config,
            client: Client::new(),
        })
    }

    pub fn from_env() -> Result<Self> {
        let token = std::env::var(Self::ACCESS_TOKEN_ENV)
            .map_err(|_| Error::MissingCredentials("access token".to_string()))?;

        Self::new(ProxyConfig::new(token))
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    async fn stream_conversation(
        &self,
        request: ConversationRequest,
        options: &SendOptions,
    ) -> Result<ChatResponse> {
        let user_message_id = request
            .messages
            .first()
            .map(|m| m.id.clone())
            .unwrap_or_default();

        let req_builder = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.access_token)
            .header("Accept", "text/event-stream")
            .json(&request);

        let event_source = EventSource::new(req_builder)
            .map_err(|e| Error::stream_error(format!("Failed to create event source: {}", e)))?;
        let mut stream = create_stream(event_source);

        let mut latest: Option<ChatResponse> = None;
        let mut conversation_id = request.conversation_id.clone();

        while let Some(snapshot) = stream.next().await {
            let snapshot = snapshot?;
            if snapshot.conversation_id.is_some() {
                conversation_id = snapshot.conversation_id;
            }

            let partial = PartialResponse {
                id: snapshot.message_id,
                text: snapshot.text,
                parent_message_id: Some(user_message_id.clone()),
                conversation_id: conversation_id.clone(),
            };
            options.report(partial.clone());
            latest = Some(partial.into());
        }

        latest.ok_or_else(|| Error::stream_error("Proxy closed the stream without a response"))
    }
}

#[async_trait]
impl ChatClient for ProxyClient {
    fn client_id(&self) -> &str {
        "proxy"
    }

    async fn send_message(&self, prompt: &str, options: SendOptions) -> Result<ChatResponse> {
        let (conversation_id, parent_message_id) = match &options.conversation {
            Some(ctx) => (ctx.conversation_id.clone(), ctx.parent_message_id.clone()),
            None => (None, Uuid::new_v4().to_string()),
        };

        let request = ConversationRequest {
            action: "next",
            messages: vec![ProxyMessage::user(Uuid::new_v4().to_string(), prompt)],
            model: self.config.model.clone(),
            parent_message_id,
            conversation_id,
        };

        let response = run_with_deadline(
            self.stream_conversation(request, &options),
            options.timeout,
            &options.abort,
        )
        .await?;

        info!(id = %response.id, chars = response.text.len(), "Proxy conversation turn finished");
        Ok(response)
    }
}
