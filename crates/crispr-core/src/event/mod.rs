//! Traza append-only de las transiciones del runner y trait `EventStore`.

mod store;
mod types;

pub use store::{EventStore, InMemoryEventStore};
pub use types::{RunEvent, RunEventKind};
