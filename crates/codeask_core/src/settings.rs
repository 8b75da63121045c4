//! User settings snapshot and partial updates.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::context::ContextMode;
use crate::error::CoreError;

/// Preset commands that ask with a configured prompt prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    Explain,
    Refactor,
    Optimize,
    FindProblems,
    Documentation,
    Complete,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Explain,
        Preset::Refactor,
        Preset::Optimize,
        Preset::FindProblems,
        Preset::Documentation,
        Preset::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Explain => "explain",
            Preset::Refactor => "refactor",
            Preset::Optimize => "optimize",
            Preset::FindProblems => "find_problems",
            Preset::Documentation => "documentation",
            Preset::Complete => "complete",
        }
    }
}

impl FromStr for Preset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "explain" => Ok(Preset::Explain),
            "refactor" => Ok(Preset::Refactor),
            "optimize" => Ok(Preset::Optimize),
            "find_problems" | "findproblems" => Ok(Preset::FindProblems),
            "documentation" | "docs" => Ok(Preset::Documentation),
            "complete" => Ok(Preset::Complete),
            _ => Err(CoreError::UnknownPreset(s.to_string())),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptPrefixes {
    pub explain: String,
    pub refactor: String,
    pub optimize: String,
    pub find_problems: String,
    pub documentation: String,
    pub complete: String,
}

impl Default for PromptPrefixes {
    fn default() -> Self {
        Self {
            explain: "Explain what this code does: ".to_string(),
            refactor: "Refactor this code and explain what's changed: ".to_string(),
            optimize: "Optimize the following code if there is anything to improve, if not say so: "
                .to_string(),
            find_problems: "Find problems with the following code, fix them and explain what was wrong (Do not change anything else, if there are no problems say so): ".to_string(),
            documentation: "Write documentation for the following code: ".to_string(),
            complete: "Complete the following code: ".to_string(),
        }
    }
}

impl PromptPrefixes {
    pub fn get(&self, preset: Preset) -> &str {
        match preset {
            Preset::Explain => &self.explain,
            Preset::Refactor => &self.refactor,
            Preset::Optimize => &self.optimize,
            Preset::FindProblems => &self.find_problems,
            Preset::Documentation => &self.documentation,
            Preset::Complete => &self.complete,
        }
    }

    pub fn set(&mut self, preset: Preset, prefix: impl Into<String>) {
        let slot = match preset {
            Preset::Explain => &mut self.explain,
            Preset::Refactor => &mut self.refactor,
            Preset::Optimize => &mut self.optimize,
            Preset::FindProblems => &mut self.find_problems,
            Preset::Documentation => &mut self.documentation,
            Preset::Complete => &mut self.complete,
        };
        *slot = prefix.into();
    }
}

/// Settings snapshot. Each dispatch reads a copy, so changes apply from the next request on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub default_context_mode: ContextMode,
    pub keep_conversation: bool,
    pub timeout_seconds: u64,
    /// Tag fenced code blocks with the document's language id
    pub codeblock_with_language_id: bool,
    /// Re-indent inserted code to the insertion line
    pub indent_on_inserting: bool,
    /// Insert code blocks into the editor when the panel asks for it
    pub paste_on_click: bool,
    pub prompt_prefixes: PromptPrefixes,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_context_mode: ContextMode::Selection,
            keep_conversation: true,
            timeout_seconds: 60,
            codeblock_with_language_id: true,
            indent_on_inserting: true,
            paste_on_click: true,
            prompt_prefixes: PromptPrefixes::default(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_context_mode(mut self, mode: ContextMode) -> Self {
        self.default_context_mode = mode;
        self
    }

    pub fn with_keep_conversation(mut self, keep: bool) -> Self {
        self.keep_conversation = keep;
        self
    }

    pub fn with_timeout_seconds(mut self, secs: u64) -> Self {
        self.timeout_seconds = secs;
        self
    }

    pub fn with_codeblock_language_id(mut self, enabled: bool) -> Self {
        self.codeblock_with_language_id = enabled;
        self
    }

    pub fn with_indent_on_inserting(mut self, enabled: bool) -> Self {
        self.indent_on_inserting = enabled;
        self
    }

    pub fn with_paste_on_click(mut self, enabled: bool) -> Self {
        self.paste_on_click = enabled;
        self
    }

    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_seconds.max(1))
    }

    /// Merge the fields set in `patch`.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(mode) = patch.default_context_mode {
            self.default_context_mode = mode;
        }
        if let Some(keep) = patch.keep_conversation {
            self.keep_conversation = keep;
        }
        if let Some(secs) = patch.timeout_seconds {
            self.timeout_seconds = secs;
        }
        if let Some(enabled) = patch.codeblock_with_language_id {
            self.codeblock_with_language_id = enabled;
        }
        if let Some(enabled) = patch.indent_on_inserting {
            self.indent_on_inserting = enabled;
        }
        if let Some(enabled) = patch.paste_on_click {
            self.paste_on_click = enabled;
        }
        if let Some(prefixes) = patch.prompt_prefixes {
            self.prompt_prefixes = prefixes;
        }
    }
}

/// Partial settings update; `None` leaves the current value alone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_context_mode: Option<ContextMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_conversation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codeblock_with_language_id: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indent_on_inserting: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paste_on_click: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_prefixes: Option<PromptPrefixes>,
}
