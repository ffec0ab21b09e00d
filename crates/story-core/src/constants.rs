//! Constantes del motor de historias.
//!
//! `ENGINE_VERSION` forma parte del input del fingerprint de cada `Plan`: un
//! cambio de versión invalida los fingerprints aunque la definición de la
//! historia no cambie. Mantener estable mientras no haya cambios
//! incompatibles en la forma de aplanar planes.

/// Versión lógica del motor.
pub const ENGINE_VERSION: &str = "S1.0";

/// Unidad de indentación para renderizar planes e historiales.
pub const INDENT: &str = "  ";

/// Línea que ocupa el lugar de un sub-story sin pasos.
pub const EMPTY_STORY: &str = "<empty>";
