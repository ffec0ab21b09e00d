//! Configuración del motor desde variables de entorno.
//! Sólo afecta al detalle de los logs, nunca a la ejecución.
//!
//! - `STORYFLOW_LOG_BINDINGS`: incluir valores (no sólo nombres) al loguear
//!   continuaciones.
//! - `STORYFLOW_LOG_HISTORY`: loguear el historial renderizado cuando una
//!   invocación termina en fallo.

use std::env;

use dotenvy::dotenv;
use once_cell::sync::Lazy;

pub const LOG_BINDINGS_VAR: &str = "STORYFLOW_LOG_BINDINGS";
pub const LOG_HISTORY_VAR: &str = "STORYFLOW_LOG_HISTORY";

// Carga perezosa del archivo .env una sola vez.
static DOTENV_LOADED: Lazy<()> = Lazy::new(|| {
    let _ = dotenv(); // ignora error si no existe .env
});

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub log_bindings: bool,
    pub log_history: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        Lazy::force(&DOTENV_LOADED);
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Construye la configuración a partir de cualquier fuente clave/valor.
    /// Valores no reconocidos cuentan como `false`.
    pub fn from_lookup<F>(lookup: F) -> Self
        where F: Fn(&str) -> Option<String>
    {
        let flag = |key: &str| lookup(key).map(|v| parse_flag(&v)).unwrap_or(false);
        Self { log_bindings: flag(LOG_BINDINGS_VAR),
               log_history: flag(LOG_HISTORY_VAR) }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

/// Configuración global, leída una sola vez.
pub fn settings() -> &'static Settings {
    &SETTINGS
}

/// Forzar carga temprana de .env desde aplicaciones externas si se desea.
pub fn init_dotenv() {
    Lazy::force(&DOTENV_LOADED);
}
