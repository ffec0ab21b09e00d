//! Errores del motor de historias.
//!
//! Los textos de `ProtocolError` son contrato con los consumidores
//! existentes: no cambiarlos sin cambiar también sus tests.

use thiserror::Error;

use crate::model::QualifiedName;
use crate::protocol::{listing, quoted, Reason};

/// Error arbitrario devuelto por el cuerpo de un paso. El motor lo propaga
/// tal cual, sin envolverlo en otro mensaje.
pub type StepError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Violación del protocolo de fallos, en ejecución o al definir una historia.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Failure({reason}) failure reason is not allowed by current protocol.\n\nAvailable failures are: {}\n\nFunction returned value: {origin}",
            listing(.available))]
    WrongReason {
        reason: Reason,
        available: Vec<Reason>,
        origin: QualifiedName,
    },
    #[error("Failure() can not be used in a story with failure protocol.\n\nAvailable failures are: {}\n\nFunction returned value: {origin}\n\nUse one of them as Failure() argument.",
            listing(.available))]
    NullReason { available: Vec<Reason>, origin: QualifiedName },
    #[error("Failure({reason}) can not be used in a story without failure protocol.\n\nFunction returned value: {origin}\n\nUse 'failures' story method to define failure protocol.")]
    UnexpectedReason { reason: Reason, origin: QualifiedName },
    #[error("'failed_because' method got argument mismatching failure protocol: {reason}\n\nAvailable failures are: {}\n\nStory returned result: {origin}",
            listing(.available))]
    QueryMismatch {
        reason: Reason,
        available: Vec<Reason>,
        origin: QualifiedName,
    },
    #[error("'failed_because' method can not be used with story defined without failure protocol.\n\nStory returned result: {origin}\n\nUse 'failures' story method to define failure protocol.")]
    QueryWithoutProtocol { reason: Reason, origin: QualifiedName },
    #[error("{substory} substory failure protocol is incompatible with {story} story.\n\nAvailable failures are: {}\n\nSubstory failures not in the story protocol: {}",
            listing(.available), listing(.unexpected))]
    IncompatibleSubstory {
        story: QualifiedName,
        substory: QualifiedName,
        available: Vec<Reason>,
        unexpected: Vec<Reason>,
    },
    #[error("{substory} substory defines failure protocol, but {story} story does not.\n\nSubstory failures are: {}\n\nUse 'failures' story method to define failure protocol.",
            listing(.declared))]
    SubstoryProtocolWithoutParent {
        story: QualifiedName,
        substory: QualifiedName,
        declared: Vec<Reason>,
    },
}

impl ProtocolError {
    /// Razón que provocó el error (None para `Failure()` sin razón y para
    /// los errores de composición).
    pub fn reason(&self) -> Option<&Reason> {
        match self {
            ProtocolError::WrongReason { reason, .. }
            | ProtocolError::UnexpectedReason { reason, .. }
            | ProtocolError::QueryMismatch { reason, .. }
            | ProtocolError::QueryWithoutProtocol { reason, .. } => Some(reason),
            ProtocolError::NullReason { .. }
            | ProtocolError::IncompatibleSubstory { .. }
            | ProtocolError::SubstoryProtocolWithoutParent { .. } => None,
        }
    }

    /// Razones disponibles en el protocolo contra el que se validó.
    pub fn available(&self) -> &[Reason] {
        match self {
            ProtocolError::WrongReason { available, .. }
            | ProtocolError::NullReason { available, .. }
            | ProtocolError::QueryMismatch { available, .. }
            | ProtocolError::IncompatibleSubstory { available, .. } => available,
            ProtocolError::UnexpectedReason { .. }
            | ProtocolError::QueryWithoutProtocol { .. }
            | ProtocolError::SubstoryProtocolWithoutParent { .. } => &[],
        }
    }

    /// Paso (o historia, para consultas y composición) al que apunta el
    /// diagnóstico.
    pub fn origin(&self) -> &QualifiedName {
        match self {
            ProtocolError::WrongReason { origin, .. }
            | ProtocolError::NullReason { origin, .. }
            | ProtocolError::UnexpectedReason { origin, .. }
            | ProtocolError::QueryMismatch { origin, .. }
            | ProtocolError::QueryWithoutProtocol { origin, .. } => origin,
            ProtocolError::IncompatibleSubstory { substory, .. }
            | ProtocolError::SubstoryProtocolWithoutParent { substory, .. } => substory,
        }
    }

    /// El error se detectó al definir la historia, no al ejecutarla.
    pub fn is_definition_error(&self) -> bool {
        matches!(self,
                 ProtocolError::IncompatibleSubstory { .. } | ProtocolError::SubstoryProtocolWithoutParent { .. })
    }
}

/// Un paso intentó re-asignar variables ya presentes en el contexto.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("These variables are already present in the context: {}\n\nFunction returned value: {origin}\n\nUse different names for the new context variables.",
        quoted_names(.names))]
pub struct ContextError {
    pub names: Vec<String>,
    pub origin: QualifiedName,
}

fn quoted_names(names: &[String]) -> String {
    names.iter().map(|n| quoted(n)).collect::<Vec<_>>().join(", ")
}

/// Resultado negativo esperado de la estrategia `call`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("FailureError({})", optional_reason(.reason))]
pub struct FailureError {
    pub reason: Option<Reason>,
}

impl FailureError {
    pub fn new(reason: Option<Reason>) -> Self {
        Self { reason }
    }
}

fn optional_reason(reason: &Option<Reason>) -> String {
    reason.as_ref().map(Reason::to_string).unwrap_or_default()
}

/// Error de una invocación (`call` o `run`).
#[derive(Debug, Error)]
pub enum StoryError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
    #[error(transparent)]
    Failure(#[from] FailureError),
    #[error(transparent)]
    Context(#[from] ContextError),
    /// Error propio del cuerpo de un paso, sin modificar.
    #[error(transparent)]
    Step(StepError),
}

impl StoryError {
    pub fn as_protocol(&self) -> Option<&ProtocolError> {
        match self {
            StoryError::Protocol(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_failure(&self) -> Option<&FailureError> {
        match self {
            StoryError::Failure(e) => Some(e),
            _ => None,
        }
    }

    /// Devuelve el error original del paso, o `self` si no lo es.
    pub fn into_step_error(self) -> Result<StepError, Self> {
        match self {
            StoryError::Step(e) => Ok(e),
            other => Err(other),
        }
    }
}
