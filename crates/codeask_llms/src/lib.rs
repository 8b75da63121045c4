//! codeask_llms: chat client abstraction with streaming, timeout and abort support.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                 Arc<dyn ChatClient>                  │
//! │   send_message(prompt, SendOptions) -> ChatResponse  │
//! │                          │                           │
//! │            ┌─────────────┴─────────────┐             │
//! │            ▼                           ▼             │
//! │     ┌─────────────┐            ┌──────────────┐      │
//! │     │  ApiClient  │            │ ProxyClient  │      │
//! │     │  (API key)  │            │(access token)│      │
//! │     └─────────────┘            └──────────────┘      │
//! │            │                                         │
//! │            ▼                                         │
//! │   ConversationStore (parent_message_id chain)        │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use codeask_llms::{AbortHandle, ApiClient, ChatClient, SendOptions};
//! use std::time::Duration;
//!
//! # async fn demo() -> codeask_llms::Result<()> {
//! let client = ApiClient::from_env()?;
//! let (_handle, signal) = AbortHandle::new();
//! let response = client
//!     .send_message("Explain lifetimes", SendOptions::new(Duration::from_secs(60), signal))
//!     .await?;
//! println!("{}", response.text);
//! # Ok(())
//! # }
//! ```

pub mod abort;
pub mod client;
pub mod error;
pub mod providers;
pub mod store;
pub mod types;


pub use abort::{AbortHandle, AbortSignal};
pub use client::{ChatClient, run_with_deadline};
pub use error::{Error, Result};
pub use providers::{ApiClient, ProxyClient};
pub use store::{ConversationStore, MessageRole, StoredMessage};
pub use types::{ChatResponse, ConversationContext, PartialResponse, ProgressSink, SendOptions};
