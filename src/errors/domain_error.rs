use thiserror::Error;

/// Errores de los steps de dominio. Viajan dentro de `RunnerError::Step` y el
/// host puede recuperarlos con `downcast_ref`.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validación fallida: {0}")]
    Validation(String),
    #[error("Dato requerido ausente: {0}")]
    MissingData(String),
}
