//! Runtime configuration for codeask

use std::str::FromStr;

use codeask_core::{ContextMode, Preset, Settings};

/// Which credential the chat client is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    ApiKey,
    AccessToken,
}

impl AuthMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::ApiKey => "api_key",
            AuthMode::AccessToken => "access_token",
        }
    }
}

impl FromStr for AuthMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "api_key" | "apikey" | "api" => Ok(AuthMode::ApiKey),
            "access_token" | "accesstoken" | "token" | "proxy" => Ok(AuthMode::AccessToken),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for AuthMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Credentials for the chat backend. `Debug` never prints the secrets.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthInfo {
    pub mode: AuthMode,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
}

impl AuthInfo {
    pub fn api_key(key: impl Into<String>) -> Self {
        Self {
            mode: AuthMode::ApiKey,
            api_key: Some(key.into()),
            access_token: None,
        }
    }

    pub fn access_token(token: impl Into<String>) -> Self {
        Self {
            mode: AuthMode::AccessToken,
            api_key: None,
            access_token: Some(token.into()),
        }
    }

    /// Non-empty credential for the selected mode.
    pub fn credential(&self) -> Option<&str> {
        let value = match self.mode {
            AuthMode::ApiKey => self.api_key.as_deref(),
            AuthMode::AccessToken => self.access_token.as_deref(),
        };
        value.map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn is_complete(&self) -> bool {
        self.credential().is_some()
    }

    /// Credential with everything but the last four characters hidden.
    pub fn masked_credential(&self) -> String {
        match self.credential() {
            Some(value) => {
                let chars: Vec<char> = value.chars().collect();
                let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
                format!("****{}", tail)
            }
            None => "(not set)".to_string(),
        }
    }
}

impl std::fmt::Debug for AuthInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthInfo")
            .field("mode", &self.mode)
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("access_token", &self.access_token.as_ref().map(|_| "****"))
            .finish()
    }
}

/// Runtime configuration
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    pub auth: AuthInfo,
    /// Chat completions base URL override (API-key mode)
    pub api_base_url: Option<String>,
    /// Conversation endpoint override (access-token mode)
    pub proxy_url: Option<String>,
    /// Model override for either mode
    pub model: Option<String>,
    pub settings: Settings,
}

impl RuntimeConfig {
    pub fn new(auth: AuthInfo) -> Self {
        Self {
            auth,
            ..Default::default()
        }
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn with_proxy_url(mut self, url: impl Into<String>) -> Self {
        self.proxy_url = Some(url.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Values that do not parse keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let flag = |key: &str| var(key).and_then(|v| parse_bool(&v));

        let mut config = Self::default();

        config.auth.api_key = var("CODEASK_API_KEY").or_else(|| var("OPENAI_API_KEY"));
        config.auth.access_token = var("CODEASK_ACCESS_TOKEN");

        if let Some(mode) = var("CODEASK_MODE") {
            if let Ok(mode) = mode.parse::<AuthMode>() {
                config.auth.mode = mode;
            }
        } else if config.auth.api_key.is_none() && config.auth.access_token.is_some() {
            // Only a token configured: use it without requiring CODEASK_MODE
            config.auth.mode = AuthMode::AccessToken;
        }

        config.api_base_url = var("CODEASK_API_BASE_URL");
        config.proxy_url = var("CODEASK_PROXY_URL");
        config.model = var("CODEASK_MODEL");

        let settings = &mut config.settings;
        if let Some(mode) = var("CODEASK_CONTEXT_MODE") {
            if let Ok(mode) = mode.parse::<ContextMode>() {
                settings.default_context_mode = mode;
            }
        }
        if let Some(keep) = flag("CODEASK_KEEP_CONVERSATION") {
            settings.keep_conversation = keep;
        }
        if let Some(secs) = var("CODEASK_TIMEOUT_SECS") {
            if let Ok(secs) = secs.trim().parse::<u64>() {
                settings.timeout_seconds = secs;
            }
        }
        if let Some(enabled) = flag("CODEASK_CODEBLOCK_LANGUAGE_ID") {
            settings.codeblock_with_language_id = enabled;
        }
        if let Some(enabled) = flag("CODEASK_INDENT_ON_INSERTING") {
            settings.indent_on_inserting = enabled;
        }
        if let Some(enabled) = flag("CODEASK_PASTE_ON_CLICK") {
            settings.paste_on_click = enabled;
        }
        for preset in Preset::ALL {
            let key = format!("CODEASK_PROMPT_{}", preset.as_str().to_uppercase());
            if let Some(prefix) = lookup(&key) {
                settings.prompt_prefixes.set(preset, prefix);
            }
        }

        config
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
