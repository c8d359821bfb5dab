//! Workflows de dominio y el orquestador de conversación que los ejecuta.
pub mod activation;
pub mod base_editing;
pub mod delivery;
pub mod knockout;
pub mod manager;
pub mod off_target;
mod parsing;
pub mod prime_editing;
pub mod registry;
pub mod triage;
pub mod troubleshoot;

pub use manager::{ConversationManager, Reply};
pub use registry::build_router;
