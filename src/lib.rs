//! crisprflow
//!
//! Este crate actúa como la capa de aplicación sobre `crispr-core`:
//! - Expone `errors` para errores de aplicación y de dominio.
//! - Expone `config` con la configuración cargada desde el entorno.
//! - Expone `modality` (menú de workflows) y `workflow` (steps concretos,
//!   router y `ConversationManager`).
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod config;
pub mod errors;
pub mod modality;
pub mod workflow;

pub use errors::{CoreError, DomainError};
pub use workflow::{build_router, ConversationManager, Reply};
