//! crispr-core: intérprete de secuencias de steps para conversaciones
//! multi-turno.
//!
//! Un `Router` asocia nombres de secuencia a listas ordenadas de `Step`s; un
//! `PipelineRunner` recorre la secuencia activa, se detiene cuando un step pide
//! input y salta a otra secuencia cuando un step devuelve `Branch`. El runner no
//! hace I/O: todo efecto externo vive dentro de los steps.
pub mod constants;
pub mod engine;
pub mod errors;
pub mod event;
pub mod model;
pub mod router;
pub mod step;

pub use engine::PipelineRunner;
pub use errors::RunnerError;
pub use event::{EventStore, InMemoryEventStore, RunEvent, RunEventKind};
pub use model::{DeliveryInfo, GuideRna, PrimerPair, SessionContext, SharedContext};
pub use router::{Router, RouterBuilder, Sequence};
pub use step::{OutcomeKind, RunnerStatus, Step, StepError, StepOutcome};
