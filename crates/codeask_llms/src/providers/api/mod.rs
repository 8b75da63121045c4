//! API-key client for the chat completions protocol

mod client;
mod stream;
mod types;

pub use client::ApiClient;
pub use types::ApiConfig;
