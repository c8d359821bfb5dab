use chrono::Utc;
use std::collections::HashMap;
use uuid::Uuid;

use super::{RunEvent, RunEventKind};

/// Destino de la traza del runner. El runner sólo agrega; nunca borra ni
/// reescribe eventos.
pub trait EventStore {
    /// Asigna `seq` (por run) y timestamp, guarda y devuelve el evento.
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> RunEvent;
    /// Eventos del run en orden de llegada; vacío si el run no existe.
    fn list(&self, run_id: Uuid) -> Vec<RunEvent>;

    /// Cantidad de eventos del run.
    fn count(&self, run_id: Uuid) -> usize {
        self.list(run_id).len()
    }

    /// Eventos del run desde la posición `from`; vacío si `from` pasa del final.
    fn list_from(&self, run_id: Uuid, from: usize) -> Vec<RunEvent> {
        self.list(run_id).into_iter().skip(from).collect()
    }
}

#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    pub inner: HashMap<Uuid, Vec<RunEvent>>,
}

impl EventStore for InMemoryEventStore {
    fn append_kind(&mut self, run_id: Uuid, kind: RunEventKind) -> RunEvent {
        let events = self.inner.entry(run_id).or_default();
        let ev = RunEvent { seq: events.len() as u64,
                            run_id,
                            kind,
                            ts: Utc::now() };
        events.push(ev.clone());
        ev
    }

    fn list(&self, run_id: Uuid) -> Vec<RunEvent> {
        self.inner.get(&run_id).cloned().unwrap_or_default()
    }

    fn count(&self, run_id: Uuid) -> usize {
        self.inner.get(&run_id).map_or(0, Vec::len)
    }

    fn list_from(&self, run_id: Uuid, from: usize) -> Vec<RunEvent> {
        self.inner
            .get(&run_id)
            .and_then(|events| events.get(from..))
            .map(<[RunEvent]>::to_vec)
            .unwrap_or_default()
    }
}
