//! Request task: runs one chat call and reports back through the inbox.

use std::sync::Arc;
use std::time::{Duration, Instant};

use codeask_llms::{AbortSignal, ChatClient, ConversationContext, PartialResponse, SendOptions};
use codeask_observability::{record_duration, request_span};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, Instrument};

use super::event::ControllerEvent;
use super::state::Ticket;

pub(crate) struct Dispatch {
    pub client: Arc<dyn ChatClient>,
    pub prompt: String,
    pub ticket: Ticket,
    pub timeout: Duration,
    pub abort: AbortSignal,
    pub conversation: Option<ConversationContext>,
}

impl Dispatch {
    /// Spawn the request. The task holds its own inbox sender until it has
    /// posted `Finished`, so the controller outlives every request it started.
    pub fn spawn(self, events: mpsc::UnboundedSender<ControllerEvent>) -> JoinHandle<()> {
        let ticket = self.ticket;
        let span = request_span!(self.client.client_id(), ticket.sequence);

        let progress_events = events.clone();
        let options = SendOptions::new(self.timeout, self.abort)
            .with_conversation(self.conversation)
            .with_progress(Arc::new(move |partial: PartialResponse| {
                let _ = progress_events.send(ControllerEvent::Progress { ticket, partial });
            }));

        let client = self.client;
        let prompt = self.prompt;

        tokio::spawn(
            async move {
                let start = Instant::now();
                let result = client.send_message(&prompt, options).await;
                record_duration("chat.duration_ms", start.elapsed());
                debug!(ok = result.is_ok(), "Chat request ended");

                let _ = events.send(ControllerEvent::Finished { ticket, result });
            }
            .instrument(span),
        )
    }
}
