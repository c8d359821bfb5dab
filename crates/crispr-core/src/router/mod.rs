//! Router: mapa de nombre de secuencia (sin distinguir mayúsculas) a la lista
//! ordenada de steps.
//!
//! Se llena una vez (`register` o `RouterBuilder`) y después se comparte en un
//! `Arc` con los runners; ninguna operación del runner lo modifica.

mod builder;
mod sequence;

pub use builder::RouterBuilder;
pub use sequence::{build_sequence, Sequence};

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::errors::RunnerError;
use crate::step::Step;

pub struct Router<C> {
    routes: BTreeMap<String, Arc<Sequence<C>>>,
}

impl<C> Router<C> {
    pub fn new() -> Self {
        Self { routes: BTreeMap::new() }
    }

    /// Builder fluido para registrar varias secuencias.
    #[inline]
    pub fn builder() -> RouterBuilder<C> {
        RouterBuilder::new()
    }

    /// Registra `steps` bajo `name` en minúsculas. Un registro previo con el
    /// mismo nombre se reemplaza por completo.
    pub fn register(&mut self, name: &str, steps: Vec<Arc<dyn Step<C>>>) {
        let sequence = build_sequence(name, steps);
        debug!("register sequence={} steps={} hash={}", sequence.name(), sequence.len(), sequence.definition_hash());
        self.routes.insert(sequence.name().to_string(), Arc::new(sequence));
    }

    /// Secuencia registrada bajo `name`, o `UnknownWorkflow` con todos los
    /// nombres disponibles.
    pub fn get(&self, name: &str) -> Result<Arc<Sequence<C>>, RunnerError> {
        self.routes
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| RunnerError::UnknownWorkflow { requested: name.to_string(),
                                                          available: self.modalities() })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.routes.contains_key(&name.to_lowercase())
    }

    /// Nombres registrados, ordenados.
    pub fn modalities(&self) -> Vec<String> {
        self.routes.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<C> Default for Router<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> std::fmt::Debug for Router<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router").field("routes", &self.routes).finish()
    }
}
