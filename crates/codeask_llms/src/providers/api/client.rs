//! API-key client implementation

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use reqwest_eventsource::EventSource;
use tracing::{debug, info};
use uuid::Uuid;

use super::stream::create_stream;
use super::types::{ApiConfig, CompletionMessage, CompletionRequest};
use crate::client::{ChatClient, run_with_deadline};
use crate::error::{Error, Result};
use crate::store::{ConversationStore, StoredMessage};
use crate::types::{ChatResponse, PartialResponse, SendOptions};

/// Chat completions client authenticated with an API key.
///
/// The completions endpoint is stateless, so conversation continuity is kept
/// locally: every exchanged message goes into a [`ConversationStore`] and the
/// `parent_message_id` chain is replayed as history on the next request.
pub struct ApiClient {
    config: ApiConfig,
    client: Client,
    store: Arc<ConversationStore>,
}

impl ApiClient {
    /// Environment variable for API key
    pub const API_KEY_ENV: &'static str = "OPENAI_API_KEY";

    pub fn new(config: ApiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::MissingCredentials("api key".to_string()));
        }

        Ok(Self {
            config,
            client: Client::new(),
            store: Arc::new(ConversationStore::new()),
        })
    }

    /// Create client from environment
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var(Self::API_KEY_ENV)
            .map_err(|_| Error::MissingCredentials("api key".to_string()))?;

        Self::new(ApiConfig::new(api_key))
    }

    /// Share a message store, e.g. to keep history across client rebuilds.
    pub fn with_store(mut self, store: Arc<ConversationStore>) -> Self {
        self.store = store;
        self
    }

    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// System message, replayed history, then the new user message.
    fn build_messages(&self, user: &StoredMessage) -> Vec<CompletionMessage> {
        let mut messages = Vec::new();
        if !self.config.system_message.is_empty() {
            messages.push(CompletionMessage::new("system", &self.config.system_message));
        }

        if let Some(parent) = &user.parent_message_id {
            let budget = self
                .config
                .max_history_chars
                .saturating_sub(user.text.chars().count());
            for message in self.store.history(parent, budget) {
                messages.push(CompletionMessage::new(message.role.as_str(), message.text));
            }
        }

        messages.push(CompletionMessage::new("user", &user.text));
        messages
    }

    async fn stream_completion(
        &self,
        request: CompletionRequest,
        user: &StoredMessage,
        options: &SendOptions,
    ) -> Result<ChatResponse> {
        let url = format!("{}/chat/completions", self.config.base_url);
        let req_builder = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request);

        let event_source = EventSource::new(req_builder)
            .map_err(|e| Error::stream_error(format!("Failed to create event source: {}", e)))?;
        let mut stream = create_stream(event_source);

        let mut id: Option<String> = None;
        let mut text = String::new();

        while let Some(delta) = stream.next().await {
            let delta = delta?;
            if id.is_none() {
                id = delta.id;
            }
            text.push_str(&delta.text);

            options.report(PartialResponse {
                id: id.clone().unwrap_or_default(),
                text: text.clone(),
                parent_message_id: Some(user.id.clone()),
                conversation_id: user.conversation_id.clone(),
            });
        }

        Ok(ChatResponse {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            text,
            parent_message_id: Some(user.id.clone()),
            conversation_id: user.conversation_id.clone(),
        })
    }
}

#[async_trait]
impl ChatClient for ApiClient {
    fn client_id(&self) -> &str {
        "api"
    }

    async fn send_message(&self, prompt: &str, options: SendOptions) -> Result<ChatResponse> {
        let conversation_id = options
            .conversation
            .as_ref()
            .and_then(|c| c.conversation_id.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let parent_message_id = options
            .conversation
            .as_ref()
            .map(|c| c.parent_message_id.clone());

        let user = StoredMessage::user(
            Uuid::new_v4().to_string(),
            prompt,
            parent_message_id,
            Some(conversation_id),
        );

        let messages = self.build_messages(&user);
        debug!(
            model = %self.config.model,
            messages = messages.len(),
            "Sending chat completion request"
        );
        let request = CompletionRequest {
            model: self.config.model.clone(),
            messages,
            stream: true,
            temperature: self.config.temperature,
        };

        let response = run_with_deadline(
            self.stream_completion(request, &user, &options),
            options.timeout,
            &options.abort,
        )
        .await?;

        info!(id = %response.id, chars = response.text.len(), "Chat completion finished");

        self.store.insert(StoredMessage::assistant(
            response.id.clone(),
            response.text.clone(),
            Some(user.id.clone()),
            user.conversation_id.clone(),
        ));
        self.store.insert(user);

        Ok(response)
    }

    fn forget_conversations(&self) {
        debug!(messages = self.store.len(), "Clearing conversation store");
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abort::{AbortHandle, AbortSignal};
    use crate::types::ConversationContext;
    use std::sync::Mutex;
    use std::time::Duration;

    fn sse_body(chunks: &[&str]) -> String {
        let mut body = String::new();
        for chunk in chunks {
            body.push_str(&format!(
                "data: {{\"id\":\"chatcmpl-1\",\"choices\":[{{\"index\":0,\"delta\":{{\"content\":\"{}\"}},\"finish_reason\":null}}]}}\n\n",
                chunk
            ));
        }
        body.push_str("data: [DONE]\n\n");
        body
    }

    fn client_for(server: &mockito::Server) -> ApiClient {
        ApiClient::new(ApiConfig::new("test-key").with_base_url(server.url())).unwrap()
    }

    fn options() -> SendOptions {
        SendOptions::new(Duration::from_secs(5), AbortSignal::never())
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = ApiClient::new(ApiConfig::new("  "));
        assert!(matches!(result, Err(Error::MissingCredentials(_))));
    }

    #[test]
    fn test_build_messages_without_history() {
        let client = ApiClient::new(ApiConfig::new("k")).unwrap();
        let user = StoredMessage::user("u1", "hello", None, None);
        let messages = client.build_messages(&user);
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "system");
        assert_eq!(messages[1], CompletionMessage::new("user", "hello"));
    }

    #[test]
    fn test_build_messages_replays_history() {
        let client = ApiClient::new(ApiConfig::new("k").with_system_message("")).unwrap();
        client
            .store()
            .insert(StoredMessage::user("u1", "q1", None, Some("c".into())));
        client
            .store()
            .insert(StoredMessage::assistant("a1", "r1", Some("u1".into()), Some("c".into())));

        let user = StoredMessage::user("u2", "q2", Some("a1".into()), Some("c".into()));
        let messages = client.build_messages(&user);
        let contents: Vec<_> = messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q1", "r1", "q2"]);
        assert_eq!(messages[1].role, "assistant");
    }

    #[tokio::test]
    async fn test_streams_progress_and_returns_final_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(sse_body(&["Hel", "lo"]))
            .create_async()
            .await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = Arc::clone(&seen);
        let client = client_for(&server);
        let response = client
            .send_message(
                "Say hello",
                options().with_progress(Arc::new(move |p: PartialResponse| {
                    seen_clone.lock().unwrap().push(p.text);
                })),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.text, "Hello");
        assert_eq!(response.id, "chatcmpl-1");
        assert!(response.conversation_id.is_some());
        assert_eq!(*seen.lock().unwrap(), vec!["Hel".to_string(), "Hello".to_string()]);
        assert_eq!(client.store().len(), 2);
    }

    #[tokio::test]
    async fn test_continuation_keeps_conversation_id() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(sse_body(&["ok"]))
            .create_async()
            .await;

        let client = client_for(&server);
        let first = client.send_message("one", options()).await.unwrap();
        let second = client
            .send_message("two", options().with_conversation(Some(first.continuation())))
            .await
            .unwrap();

        assert_eq!(second.conversation_id, first.conversation_id);
    }

    #[tokio::test]
    async fn test_history_is_sent_on_continuation() {
        let mut server = mockito::Server::new_async().await;
        let client = client_for(&server);
        client
            .store()
            .insert(StoredMessage::user("u1", "earlier question", None, Some("c1".into())));
        client.store().insert(StoredMessage::assistant(
            "a1",
            "earlier answer",
            Some("u1".into()),
            Some("c1".into()),
        ));

        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::Regex("earlier answer".to_string()))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(sse_body(&["ok"]))
            .create_async()
            .await;

        let ctx = ConversationContext::new(Some("c1".to_string()), "a1");
        let response = client
            .send_message("follow up", options().with_conversation(Some(ctx)))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.conversation_id.as_deref(), Some("c1"));
    }

    #[tokio::test]
    async fn test_store_is_bounded_and_forgettable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(sse_body(&["ok"]))
            .expect_at_least(1)
            .create_async()
            .await;

        let client = client_for(&server).with_store(Arc::new(ConversationStore::with_capacity(8)));
        for i in 0..20 {
            client.send_message(&format!("question {}", i), options()).await.unwrap();
        }
        assert_eq!(client.store().len(), 8);

        client.forget_conversations();
        assert!(client.store().is_empty());
    }

    #[tokio::test]
    async fn test_error_status_is_provider_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"invalid api key"}}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.send_message("hi", options()).await.unwrap_err();
        match err {
            Error::Provider(message) => assert!(message.contains("401")),
            other => panic!("Expected provider error, got {:?}", other),
        }
        assert!(client.store().is_empty());
    }

    #[tokio::test]
    async fn test_pre_aborted_signal_fails_fast() {
        let server = mockito::Server::new_async().await;
        let client = client_for(&server);
        let (handle, signal) = AbortHandle::new();
        handle.abort();

        let err = client
            .send_message("hi", SendOptions::new(Duration::from_secs(5), signal))
            .await
            .unwrap_err();
        assert!(err.is_aborted());
    }
}
