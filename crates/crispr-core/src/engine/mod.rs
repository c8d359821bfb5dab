//! Engine module: el `PipelineRunner`, intérprete con estado que recorre las
//! secuencias del router.

mod runner;

pub use runner::PipelineRunner;

pub use crate::event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use crate::router::{Router, Sequence};
pub use crate::step::{OutcomeKind, RunnerStatus, StepOutcome};
