//! Protocolo de fallos.
//!
//! Un protocolo es el conjunto cerrado y ordenado de razones con las que una
//! historia puede fallar. Puede estar ausente (la historia sólo puede fallar
//! sin razón) o declarado como lista de tokens o enumeración tipada; ambas
//! formas son equivalentes para el motor.
//!
//! Las tres validaciones del motor viven aquí:
//! - `validate_reason`: al ejecutar, contra la señal de fallo de un paso.
//! - `validate_composition`: al definir, para cada sub-story embebido.
//! - `validate_query`: al consultar `Summary::failed_because`.

pub mod macros;
mod reason;

use std::sync::Arc;

use indexmap::IndexSet;
use serde::Serialize;

use crate::errors::ProtocolError;
use crate::model::QualifiedName;

pub use reason::Reason;
pub(crate) use reason::{listing, quoted};

/// Protocolo de fallos de una historia (o del alcance de un sub-story).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureProtocol {
    #[default]
    Absent,
    Declared(Arc<IndexSet<Reason>>),
}

impl FailureProtocol {
    pub fn absent() -> Self {
        FailureProtocol::Absent
    }

    /// Protocolo a partir de tokens o razones. Los duplicados se descartan
    /// conservando el primer orden de aparición; una lista vacía equivale a
    /// no declarar protocolo.
    pub fn list<I, R>(reasons: I) -> Self
        where I: IntoIterator<Item = R>,
              R: Into<Reason>
    {
        let set: IndexSet<Reason> = reasons.into_iter().map(Into::into).collect();
        if set.is_empty() {
            FailureProtocol::Absent
        } else {
            FailureProtocol::Declared(Arc::new(set))
        }
    }

    /// Enumeración sin tipo Rust asociado: los valores se numeran desde 1 en
    /// orden de declaración.
    pub fn enumeration<I, S>(enumeration: &str, members: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Self::list(members.into_iter()
                          .enumerate()
                          .map(|(i, name)| Reason::member(enumeration, name, i as i64 + 1)))
    }

    pub fn is_declared(&self) -> bool {
        matches!(self, FailureProtocol::Declared(_))
    }

    pub fn contains(&self, reason: &Reason) -> bool {
        match self {
            FailureProtocol::Absent => false,
            FailureProtocol::Declared(set) => set.contains(reason),
        }
    }

    /// Busca una razón por nombre simbólico (`protocol.get("foo")`).
    pub fn get(&self, name: &str) -> Option<&Reason> {
        self.reasons().find(|r| r.name() == name)
    }

    pub fn reasons(&self) -> impl Iterator<Item = &Reason> {
        let set = match self {
            FailureProtocol::Absent => None,
            FailureProtocol::Declared(set) => Some(set.iter()),
        };
        set.into_iter().flatten()
    }

    /// Razones disponibles en orden de declaración (vacío si está ausente).
    pub fn available(&self) -> Vec<Reason> {
        self.reasons().cloned().collect()
    }

    pub fn len(&self) -> usize {
        match self {
            FailureProtocol::Absent => 0,
            FailureProtocol::Declared(set) => set.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Todas las razones de `self` están en `other`.
    pub fn is_subset_of(&self, other: &FailureProtocol) -> bool {
        self.reasons().all(|r| other.contains(r))
    }
}

impl<R: Into<Reason>, const N: usize> From<[R; N]> for FailureProtocol {
    fn from(reasons: [R; N]) -> Self {
        Self::list(reasons)
    }
}

impl<R: Into<Reason>> From<Vec<R>> for FailureProtocol {
    fn from(reasons: Vec<R>) -> Self {
        Self::list(reasons)
    }
}

/// Valida la señal de fallo producida por el paso `origin`.
///
/// Sin razón sólo es válido sin protocolo; con razón sólo es válido si el
/// protocolo está declarado y la contiene.
pub fn validate_reason(protocol: &FailureProtocol,
                       reason: Option<&Reason>,
                       origin: &QualifiedName)
                       -> Result<(), ProtocolError> {
    match (protocol, reason) {
        (FailureProtocol::Absent, None) => Ok(()),
        (FailureProtocol::Absent, Some(reason)) => Err(ProtocolError::UnexpectedReason { reason: reason.clone(),
                                                                                          origin: origin.clone() }),
        (FailureProtocol::Declared(_), None) => Err(ProtocolError::NullReason { available: protocol.available(),
                                                                                origin: origin.clone() }),
        (FailureProtocol::Declared(set), Some(reason)) if set.contains(reason) => Ok(()),
        (FailureProtocol::Declared(_), Some(reason)) => Err(ProtocolError::WrongReason { reason: reason.clone(),
                                                                                          available: protocol.available(),
                                                                                          origin: origin.clone() }),
    }
}

/// Valida, al definir `story`, que el protocolo del sub-story embebido sea
/// compatible: un sub-story sin protocolo siempre lo es (se expande al del
/// padre); uno declarado exige que el padre declare un superconjunto.
pub fn validate_composition(parent: &FailureProtocol,
                            story: &QualifiedName,
                            child: &FailureProtocol,
                            substory: &QualifiedName)
                            -> Result<(), ProtocolError> {
    match (parent, child) {
        (_, FailureProtocol::Absent) => Ok(()),
        (FailureProtocol::Absent, FailureProtocol::Declared(_)) => {
            Err(ProtocolError::SubstoryProtocolWithoutParent { story: story.clone(),
                                                               substory: substory.clone(),
                                                               declared: child.available() })
        }
        (FailureProtocol::Declared(_), FailureProtocol::Declared(_)) if child.is_subset_of(parent) => Ok(()),
        (FailureProtocol::Declared(_), FailureProtocol::Declared(_)) => {
            let unexpected = child.reasons().filter(|r| !parent.contains(r)).cloned().collect();
            Err(ProtocolError::IncompatibleSubstory { story: story.clone(),
                                                      substory: substory.clone(),
                                                      available: parent.available(),
                                                      unexpected })
        }
    }
}

/// Valida el argumento de `failed_because` contra el protocolo de la historia
/// que produjo el resultado.
pub fn validate_query(protocol: &FailureProtocol, reason: &Reason, origin: &QualifiedName) -> Result<(), ProtocolError> {
    match protocol {
        FailureProtocol::Absent => Err(ProtocolError::QueryWithoutProtocol { reason: reason.clone(),
                                                                              origin: origin.clone() }),
        FailureProtocol::Declared(set) if set.contains(reason) => Ok(()),
        FailureProtocol::Declared(_) => Err(ProtocolError::QueryMismatch { reason: reason.clone(),
                                                                           available: protocol.available(),
                                                                           origin: origin.clone() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> QualifiedName {
        QualifiedName::new("Simple", "two")
    }

    #[test]
    fn list_keeps_order_and_drops_duplicates() {
        let p = FailureProtocol::list(["foo", "bar", "foo", "baz"]);
        assert_eq!(p.available(), vec![Reason::from("foo"), Reason::from("bar"), Reason::from("baz")]);
    }

    #[test]
    fn empty_list_is_absent() {
        assert_eq!(FailureProtocol::list(Vec::<&str>::new()), FailureProtocol::Absent);
    }

    #[test]
    fn enumeration_numbers_members_from_one() {
        let p = FailureProtocol::enumeration("Errors", ["foo", "bar"]);
        assert_eq!(p.get("bar"), Some(&Reason::member("Errors", "bar", 2)));
        assert_eq!(p.get("quiz"), None);
    }

    #[test]
    fn reason_rules() {
        let declared = FailureProtocol::from(["foo", "bar"]);
        assert!(validate_reason(&declared, Some(&"foo".into()), &origin()).is_ok());
        assert!(validate_reason(&FailureProtocol::Absent, None, &origin()).is_ok());

        let err = validate_reason(&declared, Some(&"quiz".into()), &origin()).unwrap_err();
        assert!(matches!(err, ProtocolError::WrongReason { .. }));
        assert_eq!(err.available(), &[Reason::from("foo"), Reason::from("bar")]);
        assert_eq!(err.origin(), &origin());

        let err = validate_reason(&declared, None, &origin()).unwrap_err();
        assert!(matches!(err, ProtocolError::NullReason { .. }));
        assert_eq!(err.reason(), None);

        let err = validate_reason(&FailureProtocol::Absent, Some(&"foo".into()), &origin()).unwrap_err();
        assert!(matches!(err, ProtocolError::UnexpectedReason { .. }));
        assert!(err.available().is_empty());
    }

    #[test]
    fn composition_rules() {
        let parent_name = QualifiedName::new("Parent", "a");
        let child_name = QualifiedName::new("Child", "x");
        let parent = FailureProtocol::from(["foo", "bar", "baz"]);

        let subset = FailureProtocol::from(["bar", "foo"]);
        assert!(validate_composition(&parent, &parent_name, &subset, &child_name).is_ok());
        assert!(validate_composition(&parent, &parent_name, &FailureProtocol::Absent, &child_name).is_ok());
        assert!(validate_composition(&FailureProtocol::Absent, &parent_name, &FailureProtocol::Absent, &child_name).is_ok());

        let err = validate_composition(&parent, &parent_name, &FailureProtocol::from(["foo", "quiz"]), &child_name).unwrap_err();
        match err {
            ProtocolError::IncompatibleSubstory { unexpected, .. } => assert_eq!(unexpected, vec![Reason::from("quiz")]),
            other => panic!("unexpected error: {other:?}"),
        }

        let err = validate_composition(&FailureProtocol::Absent, &parent_name, &subset, &child_name).unwrap_err();
        assert!(matches!(err, ProtocolError::SubstoryProtocolWithoutParent { .. }));
    }

    #[test]
    fn enumeration_and_tokens_are_not_compatible() {
        let parent = FailureProtocol::enumeration("Errors", ["foo"]);
        let child = FailureProtocol::from(["foo"]);
        let err = validate_composition(&parent,
                                       &QualifiedName::new("P", "a"),
                                       &child,
                                       &QualifiedName::new("C", "x"));
        assert!(err.is_err());
    }

    #[test]
    fn query_rules() {
        let declared = FailureProtocol::from(["foo"]);
        let story = QualifiedName::new("Simple", "x");
        assert!(validate_query(&declared, &"foo".into(), &story).is_ok());
        assert!(matches!(validate_query(&declared, &"bar".into(), &story),
                         Err(ProtocolError::QueryMismatch { .. })));
        assert!(matches!(validate_query(&FailureProtocol::Absent, &"foo".into(), &story),
                         Err(ProtocolError::QueryWithoutProtocol { .. })));
    }
}
