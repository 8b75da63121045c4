//! Editor collaborator: context collection and code insertion.

use async_trait::async_trait;

use codeask_core::{ContextMode, ContextPayload, OpenedFile};

use crate::error::Result;

/// Text taken from a document along with its language id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentText {
    pub text: String,
    pub language_id: String,
}

impl DocumentText {
    pub fn new(text: impl Into<String>, language_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            language_id: language_id.into(),
        }
    }
}

/// The editor the controller reads context from and inserts code into.
#[async_trait]
pub trait EditorHost: Send + Sync {
    /// Current selection of the active document, `None` without an active editor.
    async fn selection(&self) -> Result<Option<DocumentText>>;

    async fn active_document(&self) -> Result<Option<DocumentText>>;

    /// Every opened document in tab order.
    async fn open_documents(&self) -> Result<Vec<OpenedFile>>;

    /// Leading whitespace of the line code will be inserted at.
    async fn insertion_indent(&self) -> Result<String>;

    async fn insert_code(&self, code: &str) -> Result<()>;
}

/// Resolve the payload for `mode` from the host.
pub async fn collect_context(host: &dyn EditorHost, mode: ContextMode) -> Result<ContextPayload> {
    let payload = match mode {
        ContextMode::None => ContextPayload::Empty,
        ContextMode::Selection => host
            .selection()
            .await?
            .map(|doc| ContextPayload::snippet(doc.text, doc.language_id))
            .unwrap_or_default(),
        ContextMode::WholeFile => host
            .active_document()
            .await?
            .map(|doc| ContextPayload::snippet(doc.text, doc.language_id))
            .unwrap_or_default(),
        ContextMode::AllOpenedFiles => ContextPayload::files(host.open_documents().await?),
    };
    Ok(payload)
}

/// Indent every line after the first; the first lands at the already indented cursor.
/// Blank lines stay blank.
pub fn reindent(code: &str, indent: &str) -> String {
    if indent.is_empty() {
        return code.to_string();
    }

    code.split('\n')
        .enumerate()
        .map(|(i, line)| {
            if i == 0 || line.trim().is_empty() {
                line.to_string()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RuntimeError;

    struct StaticHost {
        selection: Option<DocumentText>,
        document: Option<DocumentText>,
        files: Vec<OpenedFile>,
    }

    #[async_trait]
    impl EditorHost for StaticHost {
        async fn selection(&self) -> Result<Option<DocumentText>> {
            Ok(self.selection.clone())
        }

        async fn active_document(&self) -> Result<Option<DocumentText>> {
            Ok(self.document.clone())
        }

        async fn open_documents(&self) -> Result<Vec<OpenedFile>> {
            Ok(self.files.clone())
        }

        async fn insertion_indent(&self) -> Result<String> {
            Ok(String::new())
        }

        async fn insert_code(&self, _code: &str) -> Result<()> {
            Err(RuntimeError::host("read-only"))
        }
    }

    fn host() -> StaticHost {
        StaticHost {
            selection: Some(DocumentText::new("let x = 1;", "rust")),
            document: Some(DocumentText::new("fn main() {}\n", "rust")),
            files: vec![OpenedFile::new("a.rs", "a"), OpenedFile::unreadable("b.png")],
        }
    }

    #[tokio::test]
    async fn test_collect_each_mode() {
        let host = host();
        assert_eq!(
            collect_context(&host, ContextMode::None).await.unwrap(),
            ContextPayload::Empty
        );
        assert_eq!(
            collect_context(&host, ContextMode::Selection).await.unwrap(),
            ContextPayload::snippet("let x = 1;", "rust")
        );
        assert_eq!(
            collect_context(&host, ContextMode::WholeFile).await.unwrap(),
            ContextPayload::snippet("fn main() {}\n", "rust")
        );
        match collect_context(&host, ContextMode::AllOpenedFiles).await.unwrap() {
            ContextPayload::Files { files } => assert_eq!(files.len(), 2),
            other => panic!("Expected files payload, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_no_active_editor_gives_empty_payload() {
        let host = StaticHost {
            selection: None,
            document: None,
            files: vec![],
        };
        let payload = collect_context(&host, ContextMode::Selection).await.unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn test_reindent_skips_first_line() {
        assert_eq!(reindent("if x {\n    y();\n}", "    "), "if x {\n        y();\n    }");
    }

    #[test]
    fn test_reindent_keeps_blank_lines() {
        assert_eq!(reindent("a\n\nb\n", "\t"), "a\n\n\tb\n");
    }

    #[test]
    fn test_reindent_without_indent_is_identity() {
        assert_eq!(reindent("a\nb", ""), "a\nb");
    }
}
