//! Definiciones relacionadas a Steps.
//!
//! Un Step es una etapa de dominio dentro de una secuencia: puede ejecutarse
//! sin intervención o pedir input externo antes de correr. Este módulo define:
//! - `Step`: interfaz que implementa cada etapa concreta.
//! - `StepOutcome` / `OutcomeKind`: la señal que decide el siguiente movimiento
//!   del runner.
//! - `RunnerStatus`: estado observable del runner.

pub mod definition;
mod outcome;
mod status;

pub use definition::{Step, StepError};
pub use outcome::{OutcomeKind, StepOutcome};
pub use status::RunnerStatus;
