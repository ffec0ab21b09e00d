use std::fmt;

use serde_json::Value;
use uuid::Uuid;

use super::core::{Finished, Terminal};
use crate::errors::{FailureError, ProtocolError};
use crate::model::{Context, History, QualifiedName};
use crate::protocol::{validate_query, FailureProtocol, Reason};

/// Resultado de `Story::run`: clasifica la invocación como éxito o fallo.
#[derive(Debug, Clone)]
pub struct Summary {
    story: QualifiedName,
    protocol: FailureProtocol,
    terminal: Terminal,
    context: Context,
    history: History,
    run_id: Uuid,
}

impl Summary {
    pub(crate) fn new(story: QualifiedName, protocol: FailureProtocol, finished: Finished) -> Self {
        Self { story,
               protocol,
               terminal: finished.terminal,
               context: finished.context,
               history: finished.history,
               run_id: finished.run_id }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.terminal, Terminal::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        matches!(self.terminal, Terminal::Failure { .. })
    }

    /// Valor de éxito, si lo hay.
    pub fn value(&self) -> Option<&Value> {
        match &self.terminal {
            Terminal::Success(value) => value.as_ref(),
            Terminal::Failure { .. } => None,
        }
    }

    /// Razón del fallo (None en éxito y en fallos sin razón).
    pub fn failure_reason(&self) -> Option<&Reason> {
        match &self.terminal {
            Terminal::Failure { reason, .. } => reason.as_ref(),
            Terminal::Success(_) => None,
        }
    }

    /// Compara la razón del fallo con `reason`, que debe pertenecer al
    /// protocolo de la historia, aunque el resultado sea un éxito.
    pub fn failed_because(&self, reason: impl Into<Reason>) -> Result<bool, ProtocolError> {
        let reason = reason.into();
        validate_query(&self.protocol, &reason, &self.story)?;
        Ok(self.failure_reason() == Some(&reason))
    }

    /// El fallo lo produjo un paso con ese nombre (`name` u `Owner.name`).
    pub fn failed_on(&self, step: &str) -> bool {
        match &self.terminal {
            Terminal::Failure { step: origin, .. } => origin.name == step || origin.to_string() == step,
            Terminal::Success(_) => false,
        }
    }

    pub fn story(&self) -> &QualifiedName {
        &self.story
    }

    pub fn protocol(&self) -> &FailureProtocol {
        &self.protocol
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Convierte el resultado en la salida de `call`: el valor en éxito, o
    /// `FailureError` en fallo.
    pub fn into_value(self) -> Result<Option<Value>, FailureError> {
        match self.terminal {
            Terminal::Success(value) => Ok(value),
            Terminal::Failure { reason, .. } => Err(FailureError::new(reason)),
        }
    }
}

/// Igualdad por historia, protocolo, desenlace, contexto y pasos ejecutados;
/// nunca por identificador de invocación ni marcas de tiempo.
impl PartialEq for Summary {
    fn eq(&self, other: &Self) -> bool {
        self.story == other.story
        && self.protocol == other.protocol
        && self.terminal == other.terminal
        && self.context == other.context
        && self.history.same_steps(&other.history)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.terminal {
            Terminal::Success(_) => f.write_str("Success()"),
            Terminal::Failure { reason: Some(reason), .. } => write!(f, "Failure({reason})"),
            Terminal::Failure { reason: None, .. } => f.write_str("Failure()"),
        }
    }
}
