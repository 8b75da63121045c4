#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use codeask_core::{OpenedFile, PanelMessage, Settings};
use codeask_llms::{
    run_with_deadline, AbortSignal, ChatClient, ChatResponse, ConversationContext, PartialResponse,
    SendOptions,
};
use codeask_runtime::{
    AuthInfo, ClientFactory, ControllerHandle, DocumentText, EditorHost, RuntimeError,
    SessionController,
};
use tokio::sync::{mpsc, oneshot};

/// What one `send_message` call does.
pub struct Script {
    pub gate: Option<oneshot::Receiver<()>>,
    pub partials: Vec<String>,
    pub outcome: Result<ChatResponse, codeask_llms::Error>,
}

impl Script {
    pub fn reply(response: ChatResponse) -> Self {
        Self {
            gate: None,
            partials: Vec::new(),
            outcome: Ok(response),
        }
    }

    pub fn fail(error: codeask_llms::Error) -> Self {
        Self {
            gate: None,
            partials: Vec::new(),
            outcome: Err(error),
        }
    }

    pub fn with_partials(mut self, partials: &[&str]) -> Self {
        self.partials = partials.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Hold the call until the returned sender fires (or is dropped).
    pub fn gated(mut self) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        self.gate = Some(rx);
        (self, tx)
    }
}

/// A recorded `send_message` call.
pub struct Call {
    pub prompt: String,
    pub conversation: Option<ConversationContext>,
    pub abort: AbortSignal,
}

#[derive(Default)]
pub struct ScriptedClient {
    scripts: Mutex<VecDeque<Script>>,
    calls: Mutex<Vec<Call>>,
    forgotten: AtomicUsize,
}

impl ScriptedClient {
    pub fn push(&self, script: Script) {
        self.scripts.lock().unwrap().push_back(script);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn prompt(&self, index: usize) -> String {
        self.calls.lock().unwrap()[index].prompt.clone()
    }

    pub fn conversation(&self, index: usize) -> Option<ConversationContext> {
        self.calls.lock().unwrap()[index].conversation.clone()
    }

    pub fn was_aborted(&self, index: usize) -> bool {
        self.calls.lock().unwrap()[index].abort.is_aborted()
    }

    /// How often the controller asked the client to drop its history.
    pub fn forget_count(&self) -> usize {
        self.forgotten.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    fn client_id(&self) -> &str {
        "scripted"
    }

    async fn send_message(
        &self,
        prompt: &str,
        options: SendOptions,
    ) -> codeask_llms::Result<ChatResponse> {
        self.calls.lock().unwrap().push(Call {
            prompt: prompt.to_string(),
            conversation: options.conversation.clone(),
            abort: options.abort.clone(),
        });
        let script = self.scripts.lock().unwrap().pop_front();
        let Some(script) = script else {
            return Err(codeask_llms::Error::stream_error("no script left"));
        };

        let sink = options.on_progress.clone();
        let work = async move {
            if let Some(gate) = script.gate {
                let _ = gate.await;
            }
            for text in script.partials {
                if let Some(sink) = &sink {
                    sink(PartialResponse {
                        id: "partial".to_string(),
                        text,
                        parent_message_id: None,
                        conversation_id: None,
                    });
                }
            }
            script.outcome
        };

        run_with_deadline(work, options.timeout, &options.abort).await
    }

    fn forget_conversations(&self) {
        self.forgotten.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn response(id: &str, text: &str, conversation_id: &str) -> ChatResponse {
    ChatResponse {
        id: id.to_string(),
        text: text.to_string(),
        parent_message_id: None,
        conversation_id: Some(conversation_id.to_string()),
    }
}

#[derive(Default)]
pub struct FakeHost {
    pub selection: Mutex<Option<DocumentText>>,
    pub files: Mutex<Vec<OpenedFile>>,
    pub indent: Mutex<String>,
    pub inserted: Mutex<Vec<String>>,
    pub read_only: bool,
}

impl FakeHost {
    pub fn with_selection(text: &str, language_id: &str) -> Self {
        let host = Self::default();
        *host.selection.lock().unwrap() = Some(DocumentText::new(text, language_id));
        host
    }
}

#[async_trait]
impl EditorHost for FakeHost {
    async fn selection(&self) -> codeask_runtime::Result<Option<DocumentText>> {
        Ok(self.selection.lock().unwrap().clone())
    }

    async fn active_document(&self) -> codeask_runtime::Result<Option<DocumentText>> {
        Ok(self.selection.lock().unwrap().clone())
    }

    async fn open_documents(&self) -> codeask_runtime::Result<Vec<OpenedFile>> {
        Ok(self.files.lock().unwrap().clone())
    }

    async fn insertion_indent(&self) -> codeask_runtime::Result<String> {
        Ok(self.indent.lock().unwrap().clone())
    }

    async fn insert_code(&self, code: &str) -> codeask_runtime::Result<()> {
        if self.read_only {
            return Err(RuntimeError::host("document is read-only"));
        }
        self.inserted.lock().unwrap().push(code.to_string());
        Ok(())
    }
}

pub fn factory_for(client: Arc<ScriptedClient>) -> ClientFactory {
    Arc::new(move |_auth: &AuthInfo| Ok(Arc::clone(&client) as Arc<dyn ChatClient>))
}

pub struct Harness {
    pub controller: SessionController,
    pub handle: ControllerHandle,
    pub ui: mpsc::Receiver<PanelMessage>,
    pub client: Arc<ScriptedClient>,
    pub host: Arc<FakeHost>,
}

impl Harness {
    pub fn new(settings: Settings) -> Self {
        Self::with_host(settings, FakeHost::default())
    }

    pub fn with_host(settings: Settings, host: FakeHost) -> Self {
        let client = Arc::new(ScriptedClient::default());
        let host = Arc::new(host);
        let (ui_tx, ui) = mpsc::channel(1024);
        let (controller, handle) = SessionController::new(
            settings,
            AuthInfo::api_key("sk-test"),
            factory_for(Arc::clone(&client)),
            Arc::clone(&host) as Arc<dyn EditorHost>,
            ui_tx,
        );

        Self {
            controller,
            handle,
            ui,
            client,
            host,
        }
    }

    /// Process exactly `n` inbox events.
    pub async fn step(&mut self, n: usize) {
        for _ in 0..n {
            let running = tokio::time::timeout(Duration::from_secs(30), self.controller.step())
                .await
                .expect("timed out waiting for a controller event");
            assert!(running, "controller stopped unexpectedly");
        }
    }

    pub fn drain_ui(&mut self) -> Vec<PanelMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = self.ui.try_recv() {
            messages.push(message);
        }
        messages
    }
}
