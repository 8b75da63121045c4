use async_trait::async_trait;

use crate::error::Result;
use crate::types::{ChatResponse, SendOptions};

/// A remote chat service.
///
/// Implementations stream partial results through `options.on_progress`,
/// honour `options.timeout` and `options.abort`, and continue the
/// conversation named by `options.conversation` when it is set.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Short identifier used in logs.
    fn client_id(&self) -> &str;

    async fn send_message(&self, prompt: &str, options: SendOptions) -> Result<ChatResponse>;

    /// Drop locally kept conversation history. Called when the session that
    /// could continue those conversations is gone.
    fn forget_conversations(&self) {}
}
