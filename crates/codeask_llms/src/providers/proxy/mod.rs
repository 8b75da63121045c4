//! Access-token client for the conversation proxy protocol

mod client;
mod stream;
mod types;

pub use client::ProxyClient;
pub use types::ProxyConfig;
