//! Tipos de evento del runner y estructura `RunEvent`.
//!
//! Rol en el flujo:
//! - Cada transición del `PipelineRunner` emite un evento a un `EventStore`
//!   append-only, identificado por el `run_id` del runner.
//! - La traza es sólo observación: el runner nunca la relee para decidir su
//!   próximo movimiento.
//! - El host la usa para auditar y para recoger los mensajes de todos los steps
//!   encadenados dentro de una misma llamada.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RunEventKind {
    /// Se activó una secuencia (por `start` o por un branch).
    RunStarted {
        sequence: String,
        definition_hash: String,
        step_count: usize,
    },
    /// Un step comenzó su ejecución. No implica éxito.
    StepStarted { index: usize, step: String },
    /// El runner se detuvo ante un step que pide input; el step aún no corrió.
    InputRequested {
        index: usize,
        step: String,
        prompt: String,
    },
    /// El host entregó input para el step en espera.
    InputProvided { index: usize, step: String },
    /// Un step devolvió un outcome.
    StepFinished {
        index: usize,
        step: String,
        outcome: String,
        message: String,
    },
    /// Redirección hacia otra secuencia.
    Branched { from: String, to: String, index: usize },
    /// La secuencia activa terminó.
    RunCompleted { sequence: String },
    /// Una operación pública falló; el estado del runner fue restaurado.
    CallFailed { operation: String, error: String },
}

impl RunEventKind {
    /// Letra compacta para inspeccionar secuencias de eventos en tests.
    pub fn code(&self) -> &'static str {
        match self {
            RunEventKind::RunStarted { .. } => "I",
            RunEventKind::StepStarted { .. } => "S",
            RunEventKind::InputRequested { .. } => "U",
            RunEventKind::InputProvided { .. } => "V",
            RunEventKind::StepFinished { .. } => "F",
            RunEventKind::Branched { .. } => "B",
            RunEventKind::RunCompleted { .. } => "C",
            RunEventKind::CallFailed { .. } => "X",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    pub seq: u64, // asignado por el store (orden append)
    pub run_id: Uuid,
    pub kind: RunEventKind,
    pub ts: DateTime<Utc>,
}
