use indexmap::IndexMap;
use serde_json::Value;

use crate::protocol::Reason;

/// Lo que devuelve el cuerpo de un paso.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Continuar con el siguiente paso añadiendo estos bindings al contexto.
    Continue(IndexMap<String, Value>),
    /// Terminar la historia con éxito.
    Success(Option<Value>),
    /// Terminar la historia con un fallo, con o sin razón.
    Failure(Option<Reason>),
    /// Abandonar el sub-story en curso y seguir con la historia que lo contiene.
    Skip,
}

impl Outcome {
    /// Continuación sin nuevos bindings.
    pub fn next() -> Self {
        Outcome::Continue(IndexMap::new())
    }

    /// Continuación con un único binding.
    pub fn bind(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::next_with([(name, value)])
    }

    pub fn next_with<I, K, V>(bindings: I) -> Self
        where I: IntoIterator<Item = (K, V)>,
              K: Into<String>,
              V: Into<Value>
    {
        Outcome::Continue(bindings.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    /// Éxito sin valor.
    pub fn done() -> Self {
        Outcome::Success(None)
    }

    pub fn success(value: impl Into<Value>) -> Self {
        Outcome::Success(Some(value.into()))
    }

    pub fn failure(reason: impl Into<Reason>) -> Self {
        Outcome::Failure(Some(reason.into()))
    }

    /// Fallo sin razón (sólo válido en historias sin protocolo).
    pub fn fail() -> Self {
        Outcome::Failure(None)
    }

    pub fn skip() -> Self {
        Outcome::Skip
    }
}
