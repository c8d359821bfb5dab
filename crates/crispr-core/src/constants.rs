//! Constantes del intérprete de pipelines.
//!
//! `ENGINE_VERSION` participa en el `definition_hash` de cada secuencia: un
//! cambio de versión invalida los hashes aunque los pasos registrados sean los
//! mismos.

/// Versión lógica del runner. Mantener estable mientras no haya cambios
/// incompatibles en la semántica de los outcomes.
pub const ENGINE_VERSION: &str = "R1.0";

/// Mensaje del outcome terminal genérico que produce `advance` (o una
/// secuencia vacía) al quedarse sin pasos.
pub const COMPLETION_MESSAGE: &str = "Pipeline complete.";
