//! Motor de ejecución: máquina de estados, runners y resultados.

pub mod core;
pub mod runner;
pub mod story;
pub mod summary;

pub use core::{Finished, Terminal};
pub use runner::{execute, Call, Run, Runner};
pub use story::Story;
pub use summary::Summary;
