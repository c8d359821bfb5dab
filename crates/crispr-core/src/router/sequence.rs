//! Definición inmutable de una secuencia registrada.
use std::sync::Arc;

use serde_json::json;

use crate::constants::ENGINE_VERSION;
use crate::step::Step;

/// Lista ordenada de steps bajo un nombre normalizado, con un hash de su
/// definición (nombres de steps + versión del engine) para la traza.
pub struct Sequence<C> {
    name: String,
    steps: Vec<Arc<dyn Step<C>>>,
    definition_hash: String,
}

impl<C> Sequence<C> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Arc<dyn Step<C>>] {
        &self.steps
    }

    pub fn get(&self, index: usize) -> Option<&Arc<dyn Step<C>>> {
        self.steps.get(index)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn definition_hash(&self) -> &str {
        &self.definition_hash
    }

    /// Nombres de los steps en orden.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }
}

impl<C> std::fmt::Debug for Sequence<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence")
         .field("name", &self.name)
         .field("steps", &self.step_names())
         .field("definition_hash", &self.definition_hash)
         .finish()
    }
}

/// Construye una `Sequence` normalizando el nombre y calculando su hash.
pub fn build_sequence<C>(name: &str, steps: Vec<Arc<dyn Step<C>>>) -> Sequence<C> {
    let name = name.to_lowercase();
    let step_names: Vec<&str> = steps.iter().map(|s| s.name()).collect();
    // `serde_json::Map` ordena las claves: la serialización compacta ya es canónica.
    let definition = json!({
        "engine_version": ENGINE_VERSION,
        "sequence": name,
        "steps": step_names,
    });
    let definition_hash = blake3::hash(definition.to_string().as_bytes()).to_hex().to_string();
    Sequence { name,
               steps,
               definition_hash }
}
