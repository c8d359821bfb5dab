//! Errores del runner.
//!
//! Sólo cubren el control de flujo: los errores de dominio de cada step viajan
//! sin modificar dentro de `RunnerError::Step`.

use thiserror::Error;

use crate::step::StepError;

#[derive(Debug, Error)]
pub enum RunnerError {
    /// El host llamó a `advance`/`submit_input` en un estado ilegal.
    #[error("protocol violation: {0}")]
    ProtocolViolation(&'static str),
    /// Nombre de secuencia sin registro en el router.
    #[error("unknown workflow '{requested}'. Available: {}", .available.join(", "))]
    UnknownWorkflow { requested: String, available: Vec<String> },
    /// Un step devolvió `Branch` sin destino.
    #[error("step '{step}' returned a branch outcome without target")]
    MalformedOutcome { step: String },
    /// Error propio del step, propagado tal cual.
    #[error(transparent)]
    Step(StepError),
}

impl RunnerError {
    /// `true` para los errores que indican un bug del llamador.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, RunnerError::ProtocolViolation(_))
    }
}
