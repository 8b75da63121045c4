//! Chat completions streaming support

use std::pin::Pin;

use futures::stream::{Stream, StreamExt};
use reqwest_eventsource::{Event, EventSource};

use super::types::CompletionChunk;
use crate::error::{Error, Result};

/// Text appended by one stream event, with the completion id when present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDelta {
    pub id: Option<String>,
    pub text: String,
}

pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<TextDelta>> + Send>>;

/// Create a stream of text deltas from a chat completions EventSource
pub fn create_stream(mut event_source: EventSource) -> DeltaStream {
    let stream = async_stream::stream! {
        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => {
                    continue;
                }
                Ok(Event::Message(message)) => {
                    if message.data.trim() == "[DONE]" {
                        break;
                    }

                    match serde_json::from_str::<CompletionChunk>(&message.data) {
                        Ok(chunk) => {
                            if let Some(error) = chunk.error {
                                yield Err(Error::provider_error(error.message));
                                break;
                            }
                            if let Some(delta) = process_chunk(chunk) {
                                yield Ok(delta);
                            }
                        }
                        Err(e) => {
                            yield Err(Error::stream_error(format!("Failed to parse event: {}", e)));
                            break;
                        }
                    }
                }
                Err(reqwest_eventsource::Error::StreamEnded) => {
                    break;
                }
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    let error_body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unable to read error body".to_string());
                    yield Err(Error::provider_error(format!(
                        "Chat API error {}: {}",
                        status, error_body
                    )));
                    break;
                }
                Err(e) => {
                    yield Err(Error::stream_error(format!("Stream error: {}", e)));
                    break;
                }
            }
        }

        event_source.close();
    };

    Box::pin(stream)
}

/// Concatenate the content of every choice; `None` when the chunk carries no text.
fn process_chunk(chunk: CompletionChunk) -> Option<TextDelta> {
    let text: String = chunk
        .choices
        .into_iter()
        .filter_map(|choice| choice.delta.content)
        .collect();

    if text.is_empty() {
        return None;
    }

    Some(TextDelta { id: chunk.id, text })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::api::types::{ChunkChoice, ChunkDelta};

    fn chunk(content: Option<&str>) -> CompletionChunk {
        CompletionChunk {
            id: Some("chatcmpl-123".to_string()),
            choices: vec![ChunkChoice {
                delta: ChunkDelta {
                    role: None,
                    content: content.map(str::to_string),
                },
                finish_reason: None,
            }],
            error: None,
        }
    }

    #[test]
    fn test_process_text_delta() {
        let delta = process_chunk(chunk(Some("Hello"))).unwrap();
        assert_eq!(delta.text, "Hello");
        assert_eq!(delta.id.as_deref(), Some("chatcmpl-123"));
    }

    #[test]
    fn test_role_only_chunk_is_skipped() {
        assert!(process_chunk(chunk(None)).is_none());
    }

    #[test]
    fn test_empty_choices_skipped() {
        let chunk = CompletionChunk {
            id: None,
            choices: vec![],
            error: None,
        };
        assert!(process_chunk(chunk).is_none());
    }
}
