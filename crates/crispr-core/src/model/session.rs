//! Estado tipado de una sesión CRISPR.
//!
//! `SessionContext` acumula todo lo que producen los steps durante una
//! conversación. Se serializa a JSON plano (`to_json`) y se reconstruye con
//! `from_json`, que ignora claves desconocidas y rellena las ausentes con sus
//! valores por defecto.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::SharedContext;

/// Candidato de guide RNA.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuideRna {
    pub sequence: String,
    pub target_site: String,
    pub pam: String,
    pub strand: String,
    pub score: f64,
    pub off_target_score: f64,
    /// Origen del candidato, p.ej. "crispor" o "manual".
    pub source: String,
    pub metadata: Map<String, Value>,
}

/// Resultado de la selección de método de delivery.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryInfo {
    /// lipofection, electroporation, lentiviral, AAV, LNP
    pub method: String,
    /// plasmid, RNP, mRNA
    pub format: String,
    pub product: String,
    pub reasoning: String,
    pub alternatives: String,
}

/// Par de primers de validación.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrimerPair {
    pub forward: String,
    pub reverse: String,
    pub product_size: u32,
    pub tm_forward: f64,
    pub tm_reverse: f64,
    /// "specific", "non-specific", "pending" o "error".
    pub blast_status: String,
}

/// Estado mutable de la sesión, compartido por todos los steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionContext {
    pub session_id: String,

    // Parámetros del experimento
    pub target_gene: String,
    pub species: String,
    /// knockout, base_editing, prime_editing, activation, repression, ...
    pub modality: String,
    pub cas_system: String,

    pub guides: Vec<GuideRna>,
    /// -1 mientras no haya selección.
    pub selected_guide_index: i64,

    // Base editing
    pub base_editor: String,
    pub target_base_change: String,

    // Prime editing
    pub prime_editor: String,
    pub pegrna_extension: String,
    pub nick_guide: String,

    // Activación / represión
    pub effector_system: String,
    pub target_region: String,

    pub delivery: DeliveryInfo,

    pub primers: Vec<PrimerPair>,
    pub validation_strategy: String,

    pub off_target_results: Vec<Value>,

    pub troubleshoot_issue: String,
    pub troubleshoot_recommendations: Vec<String>,

    /// Pares (mensaje del usuario, respuesta).
    pub chat_history: Vec<(String, String)>,

    /// Escape hatch para estado específico de un workflow.
    pub extra: Map<String, Value>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::with_session_id(new_session_id())
    }
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_id(session_id: impl Into<String>) -> Self {
        Self { session_id: session_id.into(),
               target_gene: String::new(),
               species: String::new(),
               modality: String::new(),
               cas_system: String::new(),
               guides: Vec::new(),
               selected_guide_index: -1,
               base_editor: String::new(),
               target_base_change: String::new(),
               prime_editor: String::new(),
               pegrna_extension: String::new(),
               nick_guide: String::new(),
               effector_system: String::new(),
               target_region: String::new(),
               delivery: DeliveryInfo::default(),
               primers: Vec::new(),
               validation_strategy: String::new(),
               off_target_results: Vec::new(),
               troubleshoot_issue: String::new(),
               troubleshoot_recommendations: Vec::new(),
               chat_history: Vec::new(),
               extra: Map::new() }
    }

    /// Guide seleccionado, si el índice apunta a un candidato existente.
    pub fn selected_guide(&self) -> Option<&GuideRna> {
        usize::try_from(self.selected_guide_index).ok()
                                                  .and_then(|i| self.guides.get(i))
    }

    /// Serializa a un objeto JSON plano (para persistencia del host).
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Reconstruye desde JSON. Claves desconocidas se ignoran.
    pub fn from_json(value: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

impl SharedContext for SessionContext {
    fn workflow(&self) -> &str {
        &self.modality
    }

    fn set_workflow(&mut self, name: &str) {
        self.modality = name.to_string();
    }
}

/// Id corto de sesión: 12 caracteres hex.
fn new_session_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(12);
    id
}
