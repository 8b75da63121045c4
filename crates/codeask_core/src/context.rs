//! Context modes and the editor text attached to a prompt.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Which portion of editor state is attached to a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContextMode {
    None,
    #[default]
    Selection,
    WholeFile,
    AllOpenedFiles,
}

impl ContextMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContextMode::None => "none",
            ContextMode::Selection => "selection",
            ContextMode::WholeFile => "whole_file",
            ContextMode::AllOpenedFiles => "all_opened_files",
        }
    }
}

impl FromStr for ContextMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "none" => Ok(ContextMode::None),
            "selection" => Ok(ContextMode::Selection),
            "whole_file" | "file" => Ok(ContextMode::WholeFile),
            "all_opened_files" | "all_files" => Ok(ContextMode::AllOpenedFiles),
            _ => Err(CoreError::UnknownContextMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for ContextMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One opened document. `content` is `None` when the host could not read it as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenedFile {
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_id: Option<String>,
}

impl OpenedFile {
    pub fn new(file_path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            content: Some(content.into()),
            language_id: None,
        }
    }

    pub fn unreadable(file_path: impl Into<String>) -> Self {
        Self {
            file_path: file_path.into(),
            content: None,
            language_id: None,
        }
    }

    pub fn with_language_id(mut self, language_id: impl Into<String>) -> Self {
        self.language_id = Some(language_id.into());
        self
    }

    /// Textual content worth sending, if any.
    pub fn readable_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.is_empty())
    }
}

/// Editor text already resolved by the host.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextPayload {
    #[default]
    Empty,
    Snippet {
        text: String,
        #[serde(default)]
        language_id: String,
    },
    Files {
        files: Vec<OpenedFile>,
    },
}

impl ContextPayload {
    pub fn snippet(text: impl Into<String>, language_id: impl Into<String>) -> Self {
        ContextPayload::Snippet {
            text: text.into(),
            language_id: language_id.into(),
        }
    }

    pub fn files(files: Vec<OpenedFile>) -> Self {
        ContextPayload::Files { files }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            ContextPayload::Empty => true,
            ContextPayload::Snippet { text, .. } => text.is_empty(),
            ContextPayload::Files { files } => files.iter().all(|f| f.readable_content().is_none()),
        }
    }
}
