//! `PipelineRunner`: recorre la secuencia activa paso a paso.
//!
//! El runner mantiene un cursor sobre la lista de steps activa y decide el
//! siguiente movimiento según el `OutcomeKind` de cada step:
//!
//! - `Continue`: ejecuta el siguiente step en la misma llamada.
//! - `WaitForInput`: se detiene y devuelve el control al host.
//! - `Done`: cierra la secuencia si es el último step; si no, sigue.
//! - `Branch`: cambia a otra secuencia del router desde su posición 0.
//!
//! La única suspensión ocurre ante un step con `needs_input()`: el runner
//! devuelve su prompt sin ejecutarlo y lo ejecuta recién en `submit_input`.
//! Las re-entradas por branch y las cadenas de `Continue` se resuelven con un
//! bucle (trampolín), sin recursión.
//!
//! Uso típico:
//!
//! ```ignore
//! let mut runner = PipelineRunner::new(router);
//! let mut out = runner.start("knockout", &mut ctx)?;
//! while !runner.is_done() {
//!     out = if runner.is_waiting_for_input() {
//!         runner.submit_input(&mut ctx, &read_line()?)?
//!     } else {
//!         runner.advance(&mut ctx)?
//!     };
//! }
//! ```
use std::sync::Arc;

use log::{debug, info, warn};
use uuid::Uuid;

use crate::constants::COMPLETION_MESSAGE;
use crate::errors::RunnerError;
use crate::event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
use crate::model::SharedContext;
use crate::router::{Router, Sequence};
use crate::step::{OutcomeKind, RunnerStatus, Step, StepOutcome};

/// Próximo movimiento del trampolín.
enum Next {
    Start(String),
    RunCurrent,
    Handle(StepOutcome),
    Yield(StepOutcome),
}

/// Copia del estado previo a una llamada pública, para restaurarlo si falla.
struct Snapshot<C> {
    sequence: Option<Arc<Sequence<C>>>,
    active: String,
    cursor: usize,
    done: bool,
    waiting: bool,
    workflow: String,
}

pub struct PipelineRunner<C, E = InMemoryEventStore>
    where E: EventStore
{
    router: Arc<Router<C>>,
    event_store: E,
    run_id: Uuid,
    sequence: Option<Arc<Sequence<C>>>,
    active: String,
    cursor: usize,
    done: bool,
    waiting: bool,
}

impl<C: SharedContext> PipelineRunner<C> {
    /// Runner con traza en memoria.
    #[inline]
    pub fn new(router: Arc<Router<C>>) -> Self {
        Self::with_event_store(router, InMemoryEventStore::default())
    }
}

impl<C, E> PipelineRunner<C, E>
    where C: SharedContext,
          E: EventStore
{
    pub fn with_event_store(router: Arc<Router<C>>, event_store: E) -> Self {
        Self { router,
               event_store,
               run_id: Uuid::new_v4(),
               sequence: None,
               active: String::new(),
               cursor: 0,
               done: false,
               waiting: false }
    }

    // ------------------------------------------------------------------
    // Operaciones del host
    // ------------------------------------------------------------------

    /// Activa la secuencia `name` y la ejecuta hasta la primera pausa, el final
    /// o un branch que a su vez llegue a alguno de esos puntos.
    pub fn start(&mut self, name: &str, ctx: &mut C) -> Result<StepOutcome, RunnerError> {
        let snapshot = self.snapshot(ctx);
        let result = self.drive(ctx, Next::Start(name.to_string()));
        self.settle("start", snapshot, ctx, result)
    }

    /// Avanza al siguiente step y lo ejecuta.
    ///
    /// Errores de protocolo, sin tocar estado ni traza:
    /// - `"not started"`: todavía no hubo `start`.
    /// - `"awaiting input"`: el step actual espera `submit_input`.
    /// - `"already done"`: la secuencia terminó.
    pub fn advance(&mut self, ctx: &mut C) -> Result<StepOutcome, RunnerError> {
        if self.done {
            return Err(RunnerError::ProtocolViolation("already done"));
        }
        if self.waiting {
            return Err(RunnerError::ProtocolViolation("awaiting input"));
        }
        if self.sequence.is_none() {
            return Err(RunnerError::ProtocolViolation("not started"));
        }

        let snapshot = self.snapshot(ctx);
        let result = self.step_forward(ctx);
        self.settle("advance", snapshot, ctx, result)
    }

    /// Entrega `input` al step en espera y continúa desde su outcome.
    pub fn submit_input(&mut self, ctx: &mut C, input: &str) -> Result<StepOutcome, RunnerError> {
        if !self.waiting {
            return Err(RunnerError::ProtocolViolation("not waiting for input"));
        }

        let snapshot = self.snapshot(ctx);
        let result = self.resume_with_input(ctx, input);
        self.settle("submit_input", snapshot, ctx, result)
    }

    // ------------------------------------------------------------------
    // Accesores
    // ------------------------------------------------------------------

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_waiting_for_input(&self) -> bool {
        self.waiting
    }

    pub fn status(&self) -> RunnerStatus {
        if self.done {
            RunnerStatus::Done
        } else if self.waiting {
            RunnerStatus::WaitingForInput
        } else if self.sequence.is_some() {
            RunnerStatus::Ready
        } else {
            RunnerStatus::Idle
        }
    }

    /// Step bajo el cursor; `None` si terminó o el cursor quedó fuera de rango.
    pub fn current_step(&self) -> Option<&dyn Step<C>> {
        if self.done {
            return None;
        }
        self.sequence
            .as_ref()
            .and_then(|seq| seq.get(self.cursor))
            .map(|step| &**step)
    }

    /// Nombre de la secuencia activa tal como se pidió (vacío antes de `start`).
    pub fn active_sequence_name(&self) -> &str {
        &self.active
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total_steps(&self) -> usize {
        self.sequence.as_ref().map_or(0, |seq| seq.len())
    }

    pub fn router(&self) -> &Arc<Router<C>> {
        &self.router
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn event_store(&self) -> &E {
        &self.event_store
    }

    /// Traza completa de este runner.
    pub fn events(&self) -> Vec<RunEvent> {
        self.event_store.list(self.run_id)
    }

    /// Cantidad de eventos en la traza, sin copiarla.
    pub fn event_count(&self) -> usize {
        self.event_store.count(self.run_id)
    }

    /// Eventos a partir de la posición `from` (un valor previo de `event_count`).
    pub fn events_since(&self, from: usize) -> Vec<RunEvent> {
        self.event_store.list_from(self.run_id, from)
    }

    // ------------------------------------------------------------------
    // Internos
    // ------------------------------------------------------------------

    fn step_forward(&mut self, ctx: &mut C) -> Result<StepOutcome, RunnerError> {
        self.cursor += 1;
        if self.cursor >= self.total_steps() {
            return Ok(self.finish(StepOutcome::done(COMPLETION_MESSAGE)));
        }
        self.drive(ctx, Next::RunCurrent)
    }

    fn resume_with_input(&mut self, ctx: &mut C, input: &str) -> Result<StepOutcome, RunnerError> {
        self.waiting = false;
        let step = self.step_at_cursor()
                       .ok_or(RunnerError::ProtocolViolation("no step under cursor"))?;
        info!("User input received for step: {}", step.name());
        self.record(RunEventKind::InputProvided { index: self.cursor,
                                                  step: step.name().to_string() });
        let outcome = self.execute(&*step, ctx, Some(input))?;
        self.drive(ctx, Next::Handle(outcome))
    }

    /// Trampolín: resuelve starts, ejecuciones y outcomes hasta que alguno
    /// devuelve el control al host.
    fn drive(&mut self, ctx: &mut C, mut next: Next) -> Result<StepOutcome, RunnerError> {
        loop {
            next = match next {
                Next::Yield(outcome) => return Ok(outcome),
                Next::Start(name) => {
                    self.enter(&name, ctx)?;
                    Next::RunCurrent
                }
                Next::RunCurrent => self.run_current(ctx)?,
                Next::Handle(outcome) => self.handle_outcome(outcome)?,
            };
        }
    }

    fn enter(&mut self, name: &str, ctx: &mut C) -> Result<(), RunnerError> {
        let sequence = self.router.get(name)?;
        info!("Pipeline started: sequence={}, steps={}", name, sequence.len());
        self.record(RunEventKind::RunStarted { sequence: name.to_string(),
                                               definition_hash: sequence.definition_hash().to_string(),
                                               step_count: sequence.len() });
        self.sequence = Some(sequence);
        self.active = name.to_string();
        self.cursor = 0;
        self.done = false;
        self.waiting = false;
        ctx.set_workflow(name);
        Ok(())
    }

    fn run_current(&mut self, ctx: &mut C) -> Result<Next, RunnerError> {
        let Some(step) = self.step_at_cursor() else {
            // secuencia vacía
            return Ok(Next::Yield(self.finish(StepOutcome::done(COMPLETION_MESSAGE))));
        };
        info!("Executing step {}/{}: {}", self.cursor + 1, self.total_steps(), step.name());

        if step.needs_input() {
            self.waiting = true;
            self.record(RunEventKind::InputRequested { index: self.cursor,
                                                       step: step.name().to_string(),
                                                       prompt: step.prompt().to_string() });
            return Ok(Next::Yield(StepOutcome::wait_for_input(step.prompt())));
        }

        let outcome = self.execute(&*step, ctx, None)?;
        Ok(Next::Handle(outcome))
    }

    fn execute(&mut self, step: &dyn Step<C>, ctx: &mut C, input: Option<&str>) -> Result<StepOutcome, RunnerError> {
        self.record(RunEventKind::StepStarted { index: self.cursor,
                                                step: step.name().to_string() });
        let outcome = step.execute(ctx, input).map_err(RunnerError::Step)?;
        debug!("step {} -> {}", step.name(), outcome.kind.label());
        self.record(RunEventKind::StepFinished { index: self.cursor,
                                                 step: step.name().to_string(),
                                                 outcome: outcome.kind.label().to_string(),
                                                 message: outcome.message.clone() });
        Ok(outcome)
    }

    fn handle_outcome(&mut self, outcome: StepOutcome) -> Result<Next, RunnerError> {
        match outcome.kind.clone() {
            OutcomeKind::Done => {
                if self.cursor + 1 >= self.total_steps() {
                    return Ok(Next::Yield(self.finish(outcome)));
                }
                // Done de un step intermedio: sólo ese step terminó.
                self.cursor += 1;
                Ok(Next::RunCurrent)
            }
            OutcomeKind::Branch(target) => {
                if target.is_empty() {
                    let step = self.step_at_cursor()
                                   .map(|s| s.name().to_string())
                                   .unwrap_or_default();
                    return Err(RunnerError::MalformedOutcome { step });
                }
                info!("Branching to sequence: {}", target);
                self.record(RunEventKind::Branched { from: self.active.clone(),
                                                     to: target.clone(),
                                                     index: self.cursor });
                Ok(Next::Start(target))
            }
            OutcomeKind::WaitForInput => {
                self.waiting = true;
                Ok(Next::Yield(outcome))
            }
            OutcomeKind::Continue => {
                self.cursor += 1;
                if self.cursor >= self.total_steps() {
                    return Ok(Next::Yield(self.finish(outcome.into_done())));
                }
                Ok(Next::RunCurrent)
            }
        }
    }

    fn finish(&mut self, outcome: StepOutcome) -> StepOutcome {
        self.done = true;
        info!("Pipeline done: sequence={}", self.active);
        self.record(RunEventKind::RunCompleted { sequence: self.active.clone() });
        outcome
    }

    fn step_at_cursor(&self) -> Option<Arc<dyn Step<C>>> {
        self.sequence.as_ref()?.get(self.cursor).cloned()
    }

    fn record(&mut self, kind: RunEventKind) {
        self.event_store.append_kind(self.run_id, kind);
    }

    fn snapshot(&self, ctx: &C) -> Snapshot<C> {
        Snapshot { sequence: self.sequence.clone(),
                   active: self.active.clone(),
                   cursor: self.cursor,
                   done: self.done,
                   waiting: self.waiting,
                   workflow: ctx.workflow().to_string() }
    }

    /// Si la llamada falló, deja el runner (y la identidad de workflow del
    /// contexto) exactamente como estaban antes de ella.
    fn settle(&mut self,
              operation: &str,
              snapshot: Snapshot<C>,
              ctx: &mut C,
              result: Result<StepOutcome, RunnerError>)
              -> Result<StepOutcome, RunnerError> {
        if let Err(err) = &result {
            warn!("{operation} failed, restoring runner state: {err}");
            self.sequence = snapshot.sequence;
            self.active = snapshot.active;
            self.cursor = snapshot.cursor;
            self.done = snapshot.done;
            self.waiting = snapshot.waiting;
            ctx.set_workflow(&snapshot.workflow);
            self.record(RunEventKind::CallFailed { operation: operation.to_string(),
                                                   error: err.to_string() });
        }
        result
    }
}

impl<C, E: EventStore> std::fmt::Debug for PipelineRunner<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineRunner")
         .field("run_id", &self.run_id)
         .field("active", &self.active)
         .field("cursor", &self.cursor)
         .field("done", &self.done)
         .field("waiting", &self.waiting)
         .finish()
    }
}
