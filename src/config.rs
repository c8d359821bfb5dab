//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable (`CONFIG`).
//!
//! Claves reconocidas:
//! - `CRISPRFLOW_ENTRY_WORKFLOW`: secuencia con la que arranca cada sesión
//!   (por defecto `triage`).
//! - `CRISPRFLOW_LOG`: filtro de logging cuando `RUST_LOG` no está definido
//!   (por defecto `info`).
//! - `CRISPRFLOW_TRACE_EVENTS`: si es verdadero, el CLI imprime la traza del
//!   runner después de cada turno.
use std::env;

use log::warn;
use once_cell::sync::Lazy;

use crate::errors::CoreError;

pub const ENTRY_WORKFLOW_KEY: &str = "CRISPRFLOW_ENTRY_WORKFLOW";
pub const LOG_KEY: &str = "CRISPRFLOW_LOG";
pub const TRACE_EVENTS_KEY: &str = "CRISPRFLOW_TRACE_EVENTS";

/// Configuración global de la aplicación.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Secuencia inicial de cada conversación.
    pub entry_workflow: String,
    /// Directiva de `EnvFilter` por defecto.
    pub log_filter: String,
    /// Mostrar la traza de eventos por turno.
    pub trace_events: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self { entry_workflow: "triage".to_string(),
               log_filter: "info".to_string(),
               trace_events: false }
    }
}

impl AppConfig {
    /// Lee la configuración del entorno del proceso.
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración a partir de una función de búsqueda; los tests
    /// la usan para no tocar el entorno global.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CoreError>
        where F: Fn(&str) -> Option<String>
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let entry_workflow = non_empty(ENTRY_WORKFLOW_KEY).map(|v| v.to_lowercase())
                                                          .unwrap_or(defaults.entry_workflow);
        let log_filter = non_empty(LOG_KEY).unwrap_or(defaults.log_filter);
        let trace_events = match non_empty(TRACE_EVENTS_KEY) {
            Some(raw) => parse_bool(TRACE_EVENTS_KEY, &raw)?,
            None => defaults.trace_events,
        };

        Ok(Self { entry_workflow,
                  log_filter,
                  trace_events })
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, CoreError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CoreError::Config(format!("{key}={other}"))),
    }
}

/// Carga `.env` (si existe) y lee la configuración.
pub fn load() -> Result<AppConfig, CoreError> {
    dotenvy::dotenv().ok();
    AppConfig::from_env()
}

/// Instancia global perezosa de configuración, evaluada una sola vez. Un valor
/// inválido no aborta el proceso: se registra y se usan los valores por defecto.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(|| {
    load().unwrap_or_else(|err| {
              warn!("invalid configuration, using defaults: {err}");
              AppConfig::default()
          })
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.entry_workflow, "triage");
    }

    #[test]
    fn reads_every_key() {
        let cfg = AppConfig::from_lookup(lookup_from(&[(ENTRY_WORKFLOW_KEY, " Knockout "),
                                                       (LOG_KEY, "crispr_core=debug"),
                                                       (TRACE_EVENTS_KEY, "YES")])).unwrap();
        assert_eq!(cfg.entry_workflow, "knockout");
        assert_eq!(cfg.log_filter, "crispr_core=debug");
        assert!(cfg.trace_events);
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = AppConfig::from_lookup(lookup_from(&[(ENTRY_WORKFLOW_KEY, "  "), (TRACE_EVENTS_KEY, "")])).unwrap();
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn invalid_bool_is_a_config_error() {
        let err = AppConfig::from_lookup(lookup_from(&[(TRACE_EVENTS_KEY, "maybe")])).unwrap_err();
        assert!(matches!(err, CoreError::Config(ref msg) if msg == "CRISPRFLOW_TRACE_EVENTS=maybe"));
    }
}
