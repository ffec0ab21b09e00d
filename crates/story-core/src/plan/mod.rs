//! Plan lineal de una historia: construcción, entradas y representación.

pub mod builder;
pub mod entry;
pub mod render;

pub(crate) use builder::Definition;
pub use builder::{Owner, StoryBuilder};
pub use entry::{Beginning, Ending, EntryKind, Plan, PlanEntry};
pub use render::render;
