pub mod definition;
pub mod outcome;
pub mod status;

pub use definition::{Step, StepDefinition};
pub use outcome::Outcome;
pub use status::StepStatus;
