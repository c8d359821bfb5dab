use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Señal devuelta por un step.
///
/// `Done` tiene doble sentido: desde el último step cierra la secuencia; desde
/// cualquier otro sólo indica que ese step terminó y el runner sigue con el
/// siguiente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Avanza automáticamente al siguiente step.
    Continue,
    /// Pausa y devuelve el control al host.
    WaitForInput,
    /// Fin del step (o de la secuencia si es el último).
    Done,
    /// Descarta la secuencia activa y arranca la secuencia nombrada.
    Branch(String),
}

impl OutcomeKind {
    /// Etiqueta corta usada en logs y eventos.
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeKind::Continue => "continue",
            OutcomeKind::WaitForInput => "wait_for_input",
            OutcomeKind::Done => "done",
            OutcomeKind::Branch(_) => "branch",
        }
    }
}

/// Resultado de ejecutar un step: señal + mensaje para el usuario + payload
/// auxiliar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub kind: OutcomeKind,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl StepOutcome {
    pub fn new(kind: OutcomeKind, message: impl Into<String>) -> Self {
        Self { kind,
               message: message.into(),
               data: Map::new() }
    }

    pub fn continue_with(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Continue, message)
    }

    pub fn wait_for_input(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::WaitForInput, message)
    }

    pub fn done(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Done, message)
    }

    pub fn branch(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Branch(target.into()), message)
    }

    /// Añade una entrada al payload `data`.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Destino del branch, si lo hay.
    pub fn branch_target(&self) -> Option<&str> {
        match &self.kind {
            OutcomeKind::Branch(target) => Some(target),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.kind == OutcomeKind::Done
    }

    pub fn is_waiting(&self) -> bool {
        self.kind == OutcomeKind::WaitForInput
    }

    /// Re-etiqueta el outcome como `Done` conservando mensaje y data.
    pub(crate) fn into_done(mut self) -> Self {
        self.kind = OutcomeKind::Done;
        self
    }
}
