//! story-core: motor de ejecución de historias.
//!
//! Una historia es una secuencia ordenada de pasos que comparten un contexto
//! de sólo-añadir y pueden terminarla antes con éxito, fallo o error. Las
//! historias pueden embeber otras (sub-stories); al definirlas se aplanan en
//! un único `Plan` lineal y se valida la composición de sus protocolos de
//! fallo.
pub mod config;
pub mod constants;
pub mod engine;
pub mod errors;
pub mod hashing;
pub mod model;
pub mod plan;
pub mod protocol;
pub mod step;

pub use engine::{Call, Run, Runner, Story, Summary};
pub use errors::{ContextError, FailureError, ProtocolError, StepError, StoryError};
pub use model::{Arguments, Context, History, QualifiedName};
pub use plan::{Owner, Plan, StoryBuilder};
pub use protocol::{FailureProtocol, Reason};
pub use step::{Outcome, StepDefinition, StepStatus};

// `failure_enum!` se exporta en la raíz vía #[macro_export].
