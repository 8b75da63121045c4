pub mod client;
pub mod config;
pub mod controller;
pub mod error;
pub mod host;
pub mod prompt;

pub use client::{client_factory, create_client, ClientFactory};
pub use config::{AuthInfo, AuthMode, RuntimeConfig};
pub use controller::{ControllerEvent, ControllerHandle, SessionController, SessionState, Ticket};
pub use error::{Result, RuntimeError};
pub use host::{collect_context, reindent, DocumentText, EditorHost};
pub use prompt::compose_prompt;
