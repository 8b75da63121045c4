//! Session controller.
//!
//! The controller is an actor: it owns the session, the request state and the
//! chat client, and processes its inbox one event at a time. Request tasks
//! never touch controller state; they post `Progress` and `Finished` events
//! tagged with the [`Ticket`] captured at dispatch, and anything whose ticket
//! no longer matches the live request is dropped.
//!
//! Split into focused submodules:
//! - **event**: inbox events and the cloneable handle
//! - **state**: request state, tickets and conversation bookkeeping
//! - **dispatch**: the spawned request task

mod dispatch;
mod event;
mod state;

pub use event::{ControllerEvent, ControllerHandle};
pub use state::{SessionState, Ticket};

use std::sync::Arc;

use codeask_core::{
    ContextMode, ContextPayload, PanelMessage, Preset, Settings, SettingsPatch, WebviewMessage,
    WorkingState,
};
use codeask_llms::{AbortHandle, ChatClient, ChatResponse, ConversationContext, PartialResponse};
use codeask_observability::{record_error, session_span};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::client::ClientFactory;
use crate::config::AuthInfo;
use crate::error::{Result, RuntimeError};
use crate::host::{self, EditorHost};
use crate::prompt::compose_prompt;

use dispatch::Dispatch;
use state::Session;

/// Single-flight, supersede-on-ask controller between the panel and the chat client.
pub struct SessionController {
    settings: Settings,
    auth: AuthInfo,
    factory: ClientFactory,
    client: Option<Arc<dyn ChatClient>>,
    host: Arc<dyn EditorHost>,
    /// Messages for the panel
    ui_tx: mpsc::Sender<PanelMessage>,
    inbox: mpsc::UnboundedReceiver<ControllerEvent>,
    /// Weak so that dropping every handle ends `run` once requests have finished
    events: mpsc::WeakUnboundedSender<ControllerEvent>,
    session: Option<Session>,
    /// Bumped whenever the session is dropped
    generation: u64,
    state: SessionState,
}

impl SessionController {
    /// Create a controller and the handle that feeds its inbox.
    ///
    /// The chat client is built eagerly from `auth`; failure is not fatal,
    /// the next ask tries again and reports missing authentication.
    pub fn new(
        settings: Settings,
        auth: AuthInfo,
        factory: ClientFactory,
        host: Arc<dyn EditorHost>,
        ui_tx: mpsc::Sender<PanelMessage>,
    ) -> (Self, ControllerHandle) {
        let (tx, inbox) = mpsc::unbounded_channel();
        let client = match factory(&auth) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(mode = %auth.mode, error = %e, "Chat client not available yet");
                None
            }
        };

        let controller = Self {
            settings,
            auth,
            factory,
            client,
            host,
            ui_tx,
            inbox,
            events: tx.downgrade(),
            session: None,
            generation: 0,
            state: SessionState::Idle,
        };

        (controller, ControllerHandle::new(tx))
    }

    /// Process events until shutdown or until every handle and request task is gone.
    pub async fn run(mut self) {
        info!("Session controller started");
        while self.step().await {}
        self.stop();
        info!("Session controller stopped");
    }

    /// Process one inbox event. Returns `false` once the controller should stop.
    pub async fn step(&mut self) -> bool {
        match self.inbox.recv().await {
            Some(ControllerEvent::Shutdown) | None => false,
            Some(event) => {
                self.handle(event).await;
                true
            }
        }
    }

    pub async fn handle(&mut self, event: ControllerEvent) {
        match event {
            ControllerEvent::Webview(message) => self.handle_webview(message).await,
            ControllerEvent::Ask { task, mode, reply } => {
                let result = self.ask(task.as_deref(), mode).await;
                respond(reply, result);
            }
            ControllerEvent::AskWithContext {
                task,
                mode,
                payload,
                reply,
            } => {
                let result = self.ask_with_context(task.as_deref(), mode, payload).await;
                respond(reply, result);
            }
            ControllerEvent::AskPreset { preset, reply } => {
                let result = self.ask_preset(preset).await;
                respond(reply, result);
            }
            ControllerEvent::Abort => self.abort().await,
            ControllerEvent::ResetConversation => {
                self.reset_conversation().await;
            }
            ControllerEvent::InsertCode(code) => {
                let _ = self.insert_code(&code).await;
            }
            ControllerEvent::SetAuthInfo(auth) => self.set_auth_info(auth).await,
            ControllerEvent::UpdateSettings(patch) => self.update_settings(patch),
            ControllerEvent::WebviewLoaded => self.webview_loaded().await,
            ControllerEvent::Progress { ticket, partial } => self.on_progress(ticket, partial).await,
            ControllerEvent::Finished { ticket, result } => self.on_finished(ticket, result).await,
            ControllerEvent::Shutdown => self.stop(),
        }
    }

    async fn handle_webview(&mut self, message: WebviewMessage) {
        match message {
            WebviewMessage::SendPrompt(request) => {
                // Failures are already reported to the panel
                let _ = self.ask(Some(&request.task), request.context).await;
            }
            WebviewMessage::Abort => self.abort().await,
            WebviewMessage::ResetConversation => {
                self.reset_conversation().await;
            }
            WebviewMessage::CodeSelected(code) => {
                let _ = self.insert_code(&code).await;
            }
            WebviewMessage::WebviewLoaded => self.webview_loaded().await,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn working_state(&self) -> WorkingState {
        self.state.working_state()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Sequence number of the latest dispatched request, 0 without a session.
    pub fn message_sequence(&self) -> u64 {
        self.session.as_ref().map_or(0, |s| s.message_sequence)
    }

    /// Continuation for the next dispatch, if any.
    pub fn conversation(&self) -> Option<&ConversationContext> {
        self.session.as_ref().and_then(|s| s.conversation.as_ref())
    }

    /// Collect context for `mode` (default mode when `None`) and ask.
    pub async fn ask(&mut self, task: Option<&str>, mode: Option<ContextMode>) -> Result<u64> {
        let mode = mode.unwrap_or(self.settings.default_context_mode);
        let payload = match host::collect_context(self.host.as_ref(), mode).await {
            Ok(payload) => payload,
            Err(e) => {
                record_error(&e);
                self.emit(PanelMessage::error(e.to_string())).await;
                return Err(e);
            }
        };
        self.ask_with_context(task, mode, payload).await
    }

    /// Ask with the configured prefix of `preset` as the task.
    pub async fn ask_preset(&mut self, preset: Preset) -> Result<u64> {
        let task = self.settings.prompt_prefixes.get(preset).to_string();
        self.ask(Some(&task), None).await
    }

    /// Compose the prompt and dispatch it, superseding any live request.
    ///
    /// Returns the request's sequence number.
    pub async fn ask_with_context(
        &mut self,
        task: Option<&str>,
        mode: ContextMode,
        payload: ContextPayload,
    ) -> Result<u64> {
        let client = match self.authenticated_client() {
            Ok(client) => client,
            Err(e) => {
                warn!(mode = %self.auth.mode, "Ask refused: not authenticated");
                self.emit(PanelMessage::error(e.to_string())).await;
                return Err(e);
            }
        };
        let Some(events) = self.events.upgrade() else {
            return Err(RuntimeError::Closed);
        };

        let task = task.unwrap_or_default();
        let prompt = compose_prompt(
            Some(task),
            mode,
            &payload,
            self.settings.codeblock_with_language_id,
        );

        let session = self.session.get_or_insert_with(Session::default);
        session.message_sequence += 1;
        let ticket = Ticket {
            generation: self.generation,
            sequence: session.message_sequence,
        };
        let conversation = if self.settings.keep_conversation {
            session.conversation.clone()
        } else {
            None
        };

        let (abort, signal) = AbortHandle::new();
        // A superseded request keeps running; dropping its handle only
        // forgets it, and its callbacks no longer match the live ticket.
        let previous = std::mem::replace(&mut self.state, SessionState::Asking { ticket, abort });

        session_span!(ticket.sequence, "dispatch").in_scope(|| {
            if let SessionState::Asking { ticket: previous, .. } = &previous {
                info!(superseded = previous.sequence, "Superseding in-flight request");
            }
            info!(
                mode = %mode,
                continues = conversation.is_some(),
                prompt_chars = prompt.len(),
                "Dispatching request"
            );
        });
        drop(previous);

        self.emit(PanelMessage::task(task)).await;
        self.emit(PanelMessage::request(ticket.sequence, task, prompt.clone()))
            .await;
        self.emit(PanelMessage::working_state(WorkingState::Asking))
            .await;

        Dispatch {
            client,
            prompt,
            ticket,
            timeout: self.settings.timeout(),
            abort: signal,
            conversation,
        }
        .spawn(events);

        Ok(ticket.sequence)
    }

    /// Cancel the live request, if any, and force the panel back to idle.
    pub async fn abort(&mut self) {
        if let SessionState::Asking { ticket, abort } = std::mem::take(&mut self.state) {
            abort.abort();
            info!(sequence = ticket.sequence, "Request aborted");
        }
        self.emit(PanelMessage::working_state(WorkingState::Idle))
            .await;
        self.emit(PanelMessage::aborted("Request aborted")).await;
    }

    /// Drop the session. Refused while a request is in flight.
    ///
    /// Returns whether the session was reset.
    pub async fn reset_conversation(&mut self) -> bool {
        if self.state.is_asking() {
            warn!("Refusing to reset the conversation while a request is in flight");
            return false;
        }

        self.drop_session();
        info!("Conversation reset");
        self.emit(PanelMessage::ClearResponses).await;
        self.emit(PanelMessage::conversation_id(None)).await;
        self.emit(PanelMessage::task("")).await;
        true
    }

    /// Insert a code block from the panel into the editor.
    pub async fn insert_code(&mut self, code: &str) -> Result<()> {
        if !self.settings.paste_on_click {
            debug!("Ignoring code selection: paste on click is off");
            return Ok(());
        }

        let result = self.insert_into_host(code).await;
        if let Err(e) = &result {
            record_error(e);
            self.emit(PanelMessage::error(e.to_string())).await;
        }
        result
    }

    async fn insert_into_host(&self, code: &str) -> Result<()> {
        let code = if self.settings.indent_on_inserting {
            let indent = self.host.insertion_indent().await?;
            host::reindent(code, &indent)
        } else {
            code.to_string()
        };
        self.host.insert_code(&code).await
    }

    /// Switch credentials: abort any live request, rebuild the client and drop the session.
    pub async fn set_auth_info(&mut self, auth: AuthInfo) {
        if let SessionState::Asking { ticket, abort } = std::mem::take(&mut self.state) {
            abort.abort();
            info!(sequence = ticket.sequence, "Request aborted by credential change");
            self.emit(PanelMessage::working_state(WorkingState::Idle))
                .await;
        }

        self.drop_session();
        self.client = match (self.factory)(&auth) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!(mode = %auth.mode, error = %e, "Chat client not available");
                None
            }
        };
        self.auth = auth;
        self.emit(PanelMessage::conversation_id(None)).await;
    }

    /// Merge a settings patch; applies from the next dispatch on.
    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.settings.apply(patch);
        if !self.settings.keep_conversation {
            if let Some(session) = self.session.as_mut() {
                session.conversation = None;
            }
        }
        debug!(settings = ?self.settings, "Settings updated");
    }

    /// Resend state a freshly loaded panel needs.
    pub async fn webview_loaded(&mut self) {
        let conversation_id = self.conversation().and_then(|c| c.conversation_id.clone());
        self.emit(PanelMessage::working_state(self.working_state()))
            .await;
        self.emit(PanelMessage::conversation_id(conversation_id))
            .await;
    }

    async fn on_progress(&mut self, ticket: Ticket, partial: PartialResponse) {
        if !self.state.is_current(ticket) {
            debug!(sequence = ticket.sequence, "Dropping stale partial response");
            return;
        }
        self.emit(PanelMessage::partial(ticket.sequence, partial.id, partial.text))
            .await;
    }

    async fn on_finished(
        &mut self,
        ticket: Ticket,
        result: std::result::Result<ChatResponse, codeask_llms::Error>,
    ) {
        if !self.state.is_current(ticket) {
            debug!(sequence = ticket.sequence, "Dropping stale completion");
            return;
        }

        let span = session_span!(ticket.sequence, "finish");
        self.state = SessionState::Idle;

        match result {
            Ok(response) => {
                let keep = self.settings.keep_conversation;
                let conversation = keep.then(|| response.continuation());
                let conversation_id = conversation.as_ref().and_then(|c| c.conversation_id.clone());
                if let Some(session) = self.session.as_mut() {
                    session.conversation = conversation;
                }

                span.in_scope(|| {
                    info!(id = %response.id, chars = response.text.len(), "Request completed");
                });
                self.emit(PanelMessage::response(ticket.sequence, response.id, response.text))
                    .await;
                self.emit(PanelMessage::conversation_id(conversation_id))
                    .await;
            }
            Err(e) => {
                let err = RuntimeError::from(e);
                span.in_scope(|| record_error(&err));
                self.emit(PanelMessage::error(err.to_string())).await;
            }
        }

        self.emit(PanelMessage::working_state(WorkingState::Idle))
            .await;
    }

    /// Current client, rebuilt once from the auth info when missing.
    fn authenticated_client(&mut self) -> Result<Arc<dyn ChatClient>> {
        if let Some(client) = &self.client {
            return Ok(Arc::clone(client));
        }

        let client = (self.factory)(&self.auth).map_err(|e| match e {
            RuntimeError::AuthenticationMissing(mode) => RuntimeError::AuthenticationMissing(mode),
            other => {
                debug!(error = %other, "Chat client rebuild failed");
                RuntimeError::AuthenticationMissing(self.auth.mode)
            }
        })?;
        self.client = Some(Arc::clone(&client));
        Ok(client)
    }

    fn drop_session(&mut self) {
        self.session = None;
        self.generation += 1;
        if let Some(client) = &self.client {
            client.forget_conversations();
        }
    }

    fn stop(&mut self) {
        if let SessionState::Asking { abort, .. } = std::mem::take(&mut self.state) {
            abort.abort();
        }
    }

    async fn emit(&self, message: PanelMessage) {
        let _ = self.ui_tx.send(message).await;
    }
}

fn respond(reply: Option<tokio::sync::oneshot::Sender<Result<u64>>>, result: Result<u64>) {
    if let Some(reply) = reply {
        let _ = reply.send(result);
    }
}
