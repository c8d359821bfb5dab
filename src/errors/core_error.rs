use crispr_core::RunnerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Error en IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error de configuración: {0}")]
    Config(String),
    #[error(transparent)]
    Runner(#[from] RunnerError),
    #[error("Error de serialización: {0}")]
    Serialization(#[from] serde_json::Error),
}
