//! Orquestador de la conversación.
//! Se encarga de:
//! - Mantener un `PipelineRunner` y el `SessionContext` de una sesión.
//! - Traducir cada mensaje del usuario en `start`, `submit_input` o `advance`.
//! - Armar la respuesta con los mensajes de todos los steps que corrieron en el
//!   turno (leídos de la traza del runner), el prompt pendiente y la nota de
//!   cierre.
//! - Registrar cada intercambio en `chat_history`.
use std::sync::Arc;

use crispr_core::{PipelineRunner, Router, RunEvent, RunEventKind, RunnerStatus, SessionContext, StepOutcome};
use log::{debug, info};

use crate::config::AppConfig;
use crate::errors::CoreError;
use crate::workflow::registry::build_router;

const SEPARATOR: &str = "\n\n---\n\n";
pub const COMPLETION_NOTE: &str = "**Workflow complete.** You can export the session or start a new session.";
pub const FINISHED_REPLY: &str = "Workflow complete. Start a new session to begin another experiment.";

/// Respuesta de un turno.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub status: RunnerStatus,
    /// Eventos emitidos por el runner durante el turno.
    pub events: Vec<RunEvent>,
}

pub struct ConversationManager {
    router: Arc<Router<SessionContext>>,
    runner: PipelineRunner<SessionContext>,
    ctx: SessionContext,
    entry_workflow: String,
    started: bool,
}

impl ConversationManager {
    pub fn new(router: Arc<Router<SessionContext>>, entry_workflow: impl Into<String>) -> Self {
        Self { runner: PipelineRunner::new(router.clone()),
               router,
               ctx: SessionContext::new(),
               entry_workflow: entry_workflow.into(),
               started: false }
    }

    /// Manager con el router por defecto y la secuencia de entrada configurada.
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(build_router(), config.entry_workflow.clone())
    }

    /// Arranca la secuencia de entrada sin consumir input y devuelve lo que
    /// haya que mostrar antes del primer mensaje (normalmente el prompt del
    /// primer step). Si la sesión ya arrancó no hace nada.
    pub fn greeting(&mut self) -> Result<Reply, CoreError> {
        if self.started {
            return Ok(Reply { text: String::new(),
                              status: self.runner.status(),
                              events: Vec::new() });
        }
        let mark = self.runner.event_count();
        let outcome = self.start_entry()?;
        let (text, events) = self.compose(mark, &outcome);
        Ok(Reply { text,
                   status: self.runner.status(),
                   events })
    }

    /// Procesa un mensaje del usuario y devuelve la respuesta del turno.
    ///
    /// Si la llamada al runner falla, el runner queda como estaba y el mensaje
    /// no se registra en el historial; el usuario puede reintentarlo.
    pub fn handle_message(&mut self, message: &str) -> Result<Reply, CoreError> {
        if self.started && self.runner.is_done() {
            return Ok(self.record(message, FINISHED_REPLY.to_string(), Vec::new()));
        }

        let mark = self.runner.event_count();
        let outcome = if !self.started {
            let outcome = self.start_entry()?;
            // El primer mensaje es la respuesta al primer step que pide input.
            if self.runner.is_waiting_for_input() {
                self.runner.submit_input(&mut self.ctx, message)?
            } else {
                outcome
            }
        } else if self.runner.is_waiting_for_input() {
            self.runner.submit_input(&mut self.ctx, message)?
        } else {
            self.runner.advance(&mut self.ctx)?
        };

        let (text, events) = self.compose(mark, &outcome);
        debug!("turn produced {} events", events.len());
        Ok(self.record(message, text, events))
    }

    fn start_entry(&mut self) -> Result<StepOutcome, CoreError> {
        let outcome = self.runner.start(&self.entry_workflow, &mut self.ctx)?;
        self.started = true;
        info!("session {} started workflow={}", self.ctx.session_id, self.entry_workflow);
        Ok(outcome)
    }

    /// Texto del turno a partir de los eventos posteriores a `mark`.
    fn compose(&self, mark: usize, outcome: &StepOutcome) -> (String, Vec<RunEvent>) {
        let events = self.runner.events_since(mark);
        let mut parts: Vec<String> = events.iter()
                                           .filter_map(|e| match &e.kind {
                                               RunEventKind::StepFinished { message, .. } if !message.is_empty() => {
                                                   Some(message.clone())
                                               }
                                               _ => None,
                                           })
                                           .collect();
        // Pausa ante un step nuevo: su prompt todavía no se mostró.
        let pending_prompt = match events.last().map(|e| &e.kind) {
            Some(RunEventKind::InputRequested { prompt, .. }) => Some(prompt.as_str()),
            _ => None,
        };
        if parts.is_empty() && pending_prompt.is_none() && !outcome.message.is_empty() {
            parts.push(outcome.message.clone());
        }

        let mut sections = vec![parts.join("\n\n")];
        sections.extend(pending_prompt.filter(|p| !p.is_empty()).map(str::to_string));
        if self.runner.is_done() {
            sections.push(COMPLETION_NOTE.to_string());
            info!("session {} completed workflow={}", self.ctx.session_id, self.runner.active_sequence_name());
        }
        let text = sections.into_iter().filter(|s| !s.is_empty()).collect::<Vec<_>>().join(SEPARATOR);
        (text, events)
    }

    fn record(&mut self, message: &str, text: String, events: Vec<RunEvent>) -> Reply {
        self.ctx.chat_history.push((message.to_string(), text.clone()));
        Reply { text,
                status: self.runner.status(),
                events }
    }

    /// Descarta la sesión actual y empieza una nueva con el mismo router.
    pub fn reset(&mut self) {
        self.runner = PipelineRunner::new(self.router.clone());
        self.ctx = SessionContext::new();
        self.started = false;
    }

    /// Sesión serializada en JSON legible.
    pub fn export_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string_pretty(&self.ctx.to_json()?)?)
    }

    pub fn context(&self) -> &SessionContext {
        &self.ctx
    }

    pub fn runner(&self) -> &PipelineRunner<SessionContext> {
        &self.runner
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}
