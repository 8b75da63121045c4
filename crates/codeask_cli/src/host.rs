//! File-backed editor host.
//!
//! The CLI has no editor, so files stand in for it: an optional active
//! document with an optional line-range selection, plus any number of other
//! opened documents.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use codeask_core::OpenedFile;
use codeask_runtime::{DocumentText, EditorHost, RuntimeError};

use crate::cli::EditorArgs;

/// Selected lines, 1-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl FromStr for LineRange {
    type Err = anyhow::Error;

    /// `A:B` or a single line `A`.
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let (start, end) = match s.split_once(':') {
            Some((start, end)) => (start, end),
            None => (s, s),
        };
        let parse = |v: &str| {
            v.trim()
                .parse::<usize>()
                .map_err(|_| anyhow!("Invalid line range '{}': expected A:B", s))
        };
        let (start, end) = (parse(start)?, parse(end)?);
        if start == 0 || end < start {
            bail!("Invalid line range '{}': lines start at 1 and A must not exceed B", s);
        }
        Ok(Self { start, end })
    }
}

#[derive(Debug, Default)]
pub struct FileHost {
    active: Option<PathBuf>,
    selection: Option<LineRange>,
    opened: Vec<PathBuf>,
}

impl FileHost {
    pub fn new(active: Option<PathBuf>) -> Self {
        Self {
            active,
            ..Default::default()
        }
    }

    pub fn with_selection(mut self, range: LineRange) -> Self {
        self.selection = Some(range);
        self
    }

    pub fn with_opened(mut self, paths: Vec<PathBuf>) -> Self {
        self.opened = paths;
        self
    }

    pub fn from_args(args: EditorArgs) -> anyhow::Result<Self> {
        let mut host = Self::new(args.file).with_opened(args.open);
        if let Some(lines) = args.lines {
            host = host.with_selection(lines.parse()?);
        }
        Ok(host)
    }

    async fn read_active(&self) -> codeask_runtime::Result<Option<(String, &Path)>> {
        match &self.active {
            Some(path) => Ok(Some((tokio::fs::read_to_string(path).await?, path.as_path()))),
            None => Ok(None),
        }
    }
}

/// Zero-based `[from, to)` line indices of `range`, clamped to `line_count`.
fn line_span(range: LineRange, line_count: usize) -> (usize, usize) {
    let from = (range.start - 1).min(line_count);
    let to = range.end.min(line_count);
    (from, to)
}

fn leading_whitespace(line: &str) -> &str {
    &line[..line.len() - line.trim_start().len()]
}

#[async_trait]
impl EditorHost for FileHost {
    /// The selected lines, or the whole document without a range.
    async fn selection(&self) -> codeask_runtime::Result<Option<DocumentText>> {
        let Some((text, path)) = self.read_active().await? else {
            return Ok(None);
        };
        let text = match self.selection {
            Some(range) => {
                let lines: Vec<&str> = text.lines().collect();
                let (from, to) = line_span(range, lines.len());
                lines[from..to].join("\n")
            }
            None => text,
        };
        Ok(Some(DocumentText::new(text, language_id(path))))
    }

    async fn active_document(&self) -> codeask_runtime::Result<Option<DocumentText>> {
        Ok(self
            .read_active()
            .await?
            .map(|(text, path)| DocumentText::new(text, language_id(path))))
    }

    /// Active document first, then the others; a file that is missing or not
    /// UTF-8 is listed without content.
    async fn open_documents(&self) -> codeask_runtime::Result<Vec<OpenedFile>> {
        let mut paths: Vec<&PathBuf> = self.active.iter().collect();
        for path in &self.opened {
            if !paths.contains(&path) {
                paths.push(path);
            }
        }

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let name = path.display().to_string();
            let file = match tokio::fs::read_to_string(path).await {
                Ok(content) => OpenedFile::new(name, content),
                Err(e) => {
                    tracing::debug!(path = %name, error = %e, "Opened file not readable as text");
                    OpenedFile::unreadable(name)
                }
            };
            files.push(file.with_language_id(language_id(path)));
        }
        Ok(files)
    }

    async fn insertion_indent(&self) -> codeask_runtime::Result<String> {
        let (Some(range), Some((text, _))) = (self.selection, self.read_active().await?) else {
            return Ok(String::new());
        };
        Ok(text
            .lines()
            .nth(range.start - 1)
            .map(leading_whitespace)
            .unwrap_or_default()
            .to_string())
    }

    /// Replace the selected lines (keeping the first line's indentation), or
    /// append to the document without a selection.
    async fn insert_code(&self, code: &str) -> codeask_runtime::Result<()> {
        let Some((text, path)) = self.read_active().await? else {
            return Err(RuntimeError::host("No active document to insert into"));
        };

        let updated = match self.selection {
            Some(range) => {
                let mut lines: Vec<String> = text.lines().map(str::to_string).collect();
                let (from, to) = line_span(range, lines.len());
                let indent = lines
                    .get(from)
                    .map(|line| leading_whitespace(line).to_string())
                    .unwrap_or_default();
                let replacement = format!("{}{}", indent, code.trim_end_matches('\n'));
                lines.splice(from..to, replacement.split('\n').map(str::to_string));

                let mut updated = lines.join("\n");
                if text.ends_with('\n') {
                    updated.push('\n');
                }
                updated
            }
            None => {
                let mut updated = text;
                if !updated.is_empty() && !updated.ends_with('\n') {
                    updated.push('\n');
                }
                updated.push_str(code);
                if !code.ends_with('\n') {
                    updated.push('\n');
                }
                updated
            }
        };

        tokio::fs::write(path, updated).await?;
        tracing::info!(path = %path.display(), "Inserted code");
        Ok(())
    }
}

/// Editor language id for a file, from its extension.
pub fn language_id(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "rs" => "rust",
        "ts" | "mts" | "cts" => "typescript",
        "tsx" => "typescriptreact",
        "js" | "mjs" | "cjs" => "javascript",
        "jsx" => "javascriptreact",
        "py" => "python",
        "go" => "go",
        "java" => "java",
        "kt" | "kts" => "kotlin",
        "c" | "h" => "c",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => "cpp",
        "cs" => "csharp",
        "rb" => "ruby",
        "php" => "php",
        "swift" => "swift",
        "sh" | "bash" | "zsh" => "shellscript",
        "json" => "json",
        "yaml" | "yml" => "yaml",
        "toml" => "toml",
        "md" => "markdown",
        "html" | "htm" => "html",
        "css" => "css",
        "sql" => "sql",
        _ => "plaintext",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_line_range_parse() {
        assert_eq!(
            "3:5".parse::<LineRange>().unwrap(),
            LineRange { start: 3, end: 5 }
        );
        assert_eq!(
            "7".parse::<LineRange>().unwrap(),
            LineRange { start: 7, end: 7 }
        );
        assert!("0:2".parse::<LineRange>().is_err());
        assert!("5:3".parse::<LineRange>().is_err());
        assert!("a:b".parse::<LineRange>().is_err());
    }

    #[test]
    fn test_language_id() {
        assert_eq!(language_id(Path::new("src/main.rs")), "rust");
        assert_eq!(language_id(Path::new("App.TSX")), "typescriptreact");
        assert_eq!(language_id(Path::new("Makefile")), "plaintext");
    }

    #[tokio::test]
    async fn test_selection_of_range() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.py", "one\ntwo\nthree\nfour\n");
        let host = FileHost::new(Some(path)).with_selection(LineRange { start: 2, end: 3 });

        let selection = host.selection().await.unwrap().unwrap();
        assert_eq!(selection, DocumentText::new("two\nthree", "python"));
    }

    #[tokio::test]
    async fn test_selection_without_range_is_whole_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.rs", "fn main() {}\n");
        let host = FileHost::new(Some(path));

        let selection = host.selection().await.unwrap().unwrap();
        assert_eq!(selection.text, "fn main() {}\n");
        assert!(FileHost::default().selection().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_range_past_end_is_clamped() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.txt", "one\ntwo\n");
        let host = FileHost::new(Some(path)).with_selection(LineRange { start: 2, end: 40 });

        assert_eq!(host.selection().await.unwrap().unwrap().text, "two");
    }

    #[tokio::test]
    async fn test_open_documents_marks_unreadable() {
        let dir = TempDir::new().unwrap();
        let active = write(&dir, "a.ts", "let a = 1;");
        let other = write(&dir, "b.ts", "let b = 2;");
        let binary = dir.path().join("c.bin");
        fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();
        let missing = dir.path().join("gone.ts");

        let host = FileHost::new(Some(active.clone())).with_opened(vec![
            active.clone(),
            other,
            binary,
            missing,
        ]);
        let files = host.open_documents().await.unwrap();

        assert_eq!(files.len(), 4);
        assert_eq!(files[0].content.as_deref(), Some("let a = 1;"));
        assert_eq!(files[0].language_id.as_deref(), Some("typescript"));
        assert_eq!(files[1].content.as_deref(), Some("let b = 2;"));
        assert!(files[2].content.is_none());
        assert!(files[3].content.is_none());
    }

    #[tokio::test]
    async fn test_insertion_indent_from_first_selected_line() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.rs", "fn f() {\n    let x = 1;\n}\n");
        let host = FileHost::new(Some(path.clone())).with_selection(LineRange { start: 2, end: 2 });

        assert_eq!(host.insertion_indent().await.unwrap(), "    ");
        assert_eq!(FileHost::new(Some(path)).insertion_indent().await.unwrap(), "");
    }

    #[tokio::test]
    async fn test_insert_replaces_selection() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.rs", "fn f() {\n    let x = 1;\n}\n");
        let host = FileHost::new(Some(path.clone())).with_selection(LineRange { start: 2, end: 2 });

        host.insert_code("let y = 2;\n    let z = 3;").await.unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "fn f() {\n    let y = 2;\n    let z = 3;\n}\n"
        );
    }

    #[tokio::test]
    async fn test_insert_appends_without_selection() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "a.rs", "fn f() {}");
        let host = FileHost::new(Some(path.clone()));

        host.insert_code("fn g() {}").await.unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "fn f() {}\nfn g() {}\n");
    }

    #[tokio::test]
    async fn test_insert_without_active_document_fails() {
        let err = FileHost::default().insert_code("x").await.unwrap_err();
        assert!(matches!(err, RuntimeError::Host(_)));
    }
}
