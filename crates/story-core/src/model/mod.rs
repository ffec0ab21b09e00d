//! Modelos de una invocación (nombres, argumentos, contexto, historial)

pub mod arguments;
pub mod context;
pub mod history;
pub mod name;

pub use arguments::Arguments;
pub(crate) use context::repr;
pub use context::{Binding, Context, Provenance};
pub use history::{History, HistoryEntry};
pub use name::QualifiedName;
