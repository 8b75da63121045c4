pub mod context;
pub mod error;
pub mod message;
pub mod settings;
pub mod state;

pub use context::{ContextMode, ContextPayload, OpenedFile};
pub use error::CoreError;
pub use message::{
    EventKind, PanelEvent, PanelMessage, PromptRequest, RequestView, ResponseView, WebviewMessage,
};
pub use settings::{Preset, PromptPrefixes, Settings, SettingsPatch};
pub use state::WorkingState;
