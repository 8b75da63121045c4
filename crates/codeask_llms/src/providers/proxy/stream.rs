//! Conversation proxy streaming support

use std::pin::Pin;

use futures::stream::{Stream, StreamExt};
use reqwest_eventsource::{Event, EventSource};

use super::types::ConversationEvent;
use crate::error::{Error, Result};

/// Full assistant text as of one stream event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub message_id: String,
    pub conversation_id: Option<String>,
    pub text: String,
}

pub type SnapshotStream = Pin<Box<dyn Stream<Item = Result<Snapshot>> + Send>>;

/// Create a stream of assistant snapshots from a proxy EventSource.
///
/// Payloads that are not conversation events (keep-alives, moderation notices)
/// are skipped rather than failing the request.
pub fn create_stream(mut event_source: EventSource) -> SnapshotStream {
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

                    let parsed = match serde_json::from_str::<ConversationEvent>(&message.data) {
                        Ok(parsed) => parsed,
                        Err(e) => {
                            tracing::debug!(error = %e, "Skipping unparseable proxy event");
                            continue;
                        }
                    };

                    if let Some(error) = parsed.error.as_ref().filter(|e| !e.is_null()) {
                        yield Err(Error::provider_error(format!("Proxy error: {}", error)));
                        break;
                    }

                    if let Some(snapshot) = process_event(parsed) {
                        yield Ok(snapshot);
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
                        "Proxy API error {}: {}",
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

fn process_event(event: ConversationEvent) -> Option<Snapshot> {
    let message = event.message?;
    if let Some(author) = &message.author {
        if author.role != "assistant" {
            return None;
        }
    }

    let text = message.content.parts.into_iter().next()?;
    Some(Snapshot {
        message_id: message.id,
        conversation_id: event.conversation_id,
        text,
    })
}
