//! Entradas del plan lineal.

use crate::model::QualifiedName;
use crate::protocol::FailureProtocol;
use crate::step::Step;

/// Inicio del tramo de un sub-story.
#[derive(Debug, Clone, PartialEq)]
pub struct Beginning {
    pub story: QualifiedName,
    /// Etiqueta usada al representar el plan.
    pub label: String,
    /// Índice de la marca de fin correspondiente.
    pub end: usize,
}

/// Fin del tramo de un sub-story.
#[derive(Debug, Clone, PartialEq)]
pub struct Ending {
    pub story: QualifiedName,
    /// El sub-story no declara ningún miembro.
    pub is_empty: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryKind {
    Step(Step),
    Begin(Beginning),
    End(Ending),
}

/// Entrada del plan con el protocolo activo en ese punto.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanEntry {
    pub kind: EntryKind,
    pub protocol: FailureProtocol,
    /// Número de tramos abiertos que contienen la entrada. Las marcas tienen
    /// la profundidad de la historia que las contiene.
    pub depth: usize,
}

impl PlanEntry {
    pub fn is_marker(&self) -> bool {
        !matches!(self.kind, EntryKind::Step(_))
    }

    pub fn step(&self) -> Option<&Step> {
        match &self.kind {
            EntryKind::Step(step) => Some(step),
            _ => None,
        }
    }
}

/// Plan lineal de una historia. Se construye una vez al definirla y se
/// reutiliza, sólo lectura, en cada invocación.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    pub(crate) story: QualifiedName,
    pub(crate) protocol: FailureProtocol,
    pub(crate) entries: Vec<PlanEntry>,
    pub(crate) fingerprint: String,
}

impl Plan {
    pub fn story(&self) -> &QualifiedName {
        &self.story
    }

    /// Protocolo declarado por la historia raíz.
    pub fn protocol(&self) -> &FailureProtocol {
        &self.protocol
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hash blake3 de la estructura del plan.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn steps(&self) -> impl Iterator<Item = &Step> {
        self.entries.iter().filter_map(PlanEntry::step)
    }

    /// Protocolo efectivo del primer sub-story con ese nombre (`Owner.name`
    /// o sólo `name`). Un sub-story sin protocolo propio reporta el de la
    /// historia que lo contiene.
    pub fn substory_protocol(&self, name: &str) -> Option<&FailureProtocol> {
        self.entries.iter().find_map(|entry| match &entry.kind {
                                         EntryKind::Begin(b) if b.story.to_string() == name || b.story.name == name => {
                                             Some(&entry.protocol)
                                         }
                                         _ => None,
                                     })
    }
}
