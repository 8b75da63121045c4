//! Prompt composition: task text plus fenced editor context.

use codeask_core::{ContextMode, ContextPayload};

const FENCE: &str = "```";

/// Build the prompt sent to the chat client. Pure; the payload is already resolved.
///
/// Snippets render as the task, a newline and one fenced block. Opened files
/// render one `### <path>` heading plus fenced block per readable file.
pub fn compose_prompt(
    task: Option<&str>,
    mode: ContextMode,
    payload: &ContextPayload,
    codeblock_with_language_id: bool,
) -> String {
    let task = task.unwrap_or_default();

    let mut context = String::new();
    match payload {
        _ if mode == ContextMode::None => {}
        ContextPayload::Empty => {}
        ContextPayload::Snippet { text, language_id } => {
            if !text.is_empty() {
                let tag = codeblock_with_language_id.then_some(language_id.as_str());
                push_code_block(&mut context, text, tag);
            }
        }
        ContextPayload::Files { files } => {
            for file in files {
                let Some(content) = file.readable_content() else {
                    continue;
                };
                context.push_str("### ");
                context.push_str(&file.file_path);
                context.push('\n');

                let tag = file
                    .language_id
                    .as_deref()
                    .filter(|_| codeblock_with_language_id);
                push_code_block(&mut context, content, tag);
            }
        }
    }

    if context.is_empty() {
        return task.to_string();
    }
    format!("{}\n{}", task, context)
}

fn push_code_block(prompt: &mut String, text: &str, language_id: Option<&str>) {
    prompt.push_str(FENCE);
    prompt.push_str(language_id.unwrap_or_default());
    prompt.push('\n');
    prompt.push_str(text);
    if !text.ends_with('\n') {
        prompt.push('\n');
    }
    prompt.push_str(FENCE);
    prompt.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use codeask_core::OpenedFile;

    #[test]
    fn test_selection_with_language_id() {
        let prompt = compose_prompt(
            Some("explain"),
            ContextMode::Selection,
            &ContextPayload::snippet("let x=1;", "typescript"),
            true,
        );
        assert_eq!(prompt, "explain\n```typescript\nlet x=1;\n```\n");
    }

    #[test]
    fn test_selection_without_language_id() {
        let prompt = compose_prompt(
            Some("explain"),
            ContextMode::Selection,
            &ContextPayload::snippet("let x=1;", "typescript"),
            false,
        );
        assert_eq!(prompt, "explain\n```\nlet x=1;\n```\n");
    }

    #[test]
    fn test_trailing_newline_not_doubled() {
        let prompt = compose_prompt(
            Some("fix"),
            ContextMode::WholeFile,
            &ContextPayload::snippet("fn main() {}\n", "rust"),
            true,
        );
        assert_eq!(prompt, "fix\n```rust\nfn main() {}\n```\n");
    }

    #[test]
    fn test_none_mode_returns_task() {
        let prompt = compose_prompt(
            Some("hello"),
            ContextMode::None,
            &ContextPayload::snippet("ignored", "rust"),
            true,
        );
        assert_eq!(prompt, "hello");
    }

    #[test]
    fn test_empty_payload_returns_task() {
        let prompt = compose_prompt(Some("hello"), ContextMode::Selection, &ContextPayload::Empty, true);
        assert_eq!(prompt, "hello");

        let prompt = compose_prompt(
            Some("hello"),
            ContextMode::Selection,
            &ContextPayload::snippet("", "rust"),
            true,
        );
        assert_eq!(prompt, "hello");
    }

    #[test]
    fn test_missing_task_is_empty() {
        assert_eq!(compose_prompt(None, ContextMode::None, &ContextPayload::Empty, true), "");

        let prompt = compose_prompt(
            None,
            ContextMode::Selection,
            &ContextPayload::snippet("x", "rust"),
            true,
        );
        assert_eq!(prompt, "\n```rust\nx\n```\n");
    }

    #[test]
    fn test_all_opened_files_in_order() {
        let payload = ContextPayload::files(vec![
            OpenedFile::new("a.ts", "x").with_language_id("typescript"),
            OpenedFile::new("b.ts", "y").with_language_id("typescript"),
        ]);
        let prompt = compose_prompt(Some("review"), ContextMode::AllOpenedFiles, &payload, true);

        assert_eq!(
            prompt,
            "review\n### a.ts\n```typescript\nx\n```\n### b.ts\n```typescript\ny\n```\n"
        );
        let a = prompt.find("### a.ts").unwrap();
        let b = prompt.find("### b.ts").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_unreadable_files_skipped() {
        let payload = ContextPayload::files(vec![
            OpenedFile::unreadable("image.png"),
            OpenedFile::new("empty.rs", ""),
            OpenedFile::new("main.rs", "fn main() {}"),
        ]);
        let prompt = compose_prompt(Some("t"), ContextMode::AllOpenedFiles, &payload, false);
        assert_eq!(prompt, "t\n### main.rs\n```\nfn main() {}\n```\n");
    }

    #[test]
    fn test_all_files_unreadable_returns_task() {
        let payload = ContextPayload::files(vec![OpenedFile::unreadable("a.bin")]);
        let prompt = compose_prompt(Some("t"), ContextMode::AllOpenedFiles, &payload, true);
        assert_eq!(prompt, "t");
    }

    #[test]
    fn test_file_without_language_id_is_untagged() {
        let payload = ContextPayload::files(vec![OpenedFile::new("notes", "text")]);
        let prompt = compose_prompt(Some("t"), ContextMode::AllOpenedFiles, &payload, true);
        assert_eq!(prompt, "t\n### notes\n```\ntext\n```\n");
    }
}
