//! Builder de historias.
//!
//! Acumula los miembros de una historia (pasos propios y sub-stories ya
//! construidos) y, en `build`, valida la composición de protocolos y aplana
//! el árbol en un único `Plan` lineal.
//!
//! ```ignore
//! let child = Story::define("Child", "x").step("one", |_| Ok(Outcome::next())).build()?;
//! let parent = Story::define("Parent", "a").failures(["foo"])
//!                                          .step("before", |_| Ok(Outcome::next()))
//!                                          .substory(&child)
//!                                          .build()?;
//! ```
//!
//! Herencia e inyección son el mismo camino: `inherit` sólo cambia el dueño
//! de los miembros heredados antes de embeberlos.

use std::sync::Arc;

use log::{debug, warn};
use serde_json::{json, Value};

use super::entry::{Beginning, Ending, EntryKind, Plan, PlanEntry};
use crate::constants::ENGINE_VERSION;
use crate::engine::Story;
use crate::errors::{ProtocolError, StepError};
use crate::hashing::hash_value;
use crate::model::{Context, QualifiedName};
use crate::protocol::{validate_composition, FailureProtocol};
use crate::step::{Outcome, Step, StepDefinition};

/// Miembro declarado de una historia.
#[derive(Debug, Clone)]
pub(crate) enum Member {
    Step(Step),
    Substory(Story),
}

/// Definición construida: miembros declarados más el plan aplanado.
#[derive(Debug)]
pub(crate) struct Definition {
    pub(crate) name: QualifiedName,
    pub(crate) protocol: FailureProtocol,
    pub(crate) members: Vec<Member>,
    pub(crate) plan: Plan,
}

#[derive(Debug, Clone)]
pub struct StoryBuilder {
    name: QualifiedName,
    protocol: FailureProtocol,
    members: Vec<Member>,
}

impl StoryBuilder {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self { name: QualifiedName::new(owner, name),
               protocol: FailureProtocol::Absent,
               members: Vec::new() }
    }

    /// Declara el protocolo de fallos de la historia.
    pub fn failures(mut self, protocol: impl Into<FailureProtocol>) -> Self {
        self.protocol = protocol.into();
        self
    }

    /// Añade un paso cuyo cuerpo es una función o closure.
    pub fn step<F>(self, name: impl Into<String>, body: F) -> Self
        where F: Fn(&Context) -> Result<Outcome, StepError> + Send + Sync + 'static
    {
        self.step_definition(name, body)
    }

    /// Añade un paso con cualquier implementación de `StepDefinition`.
    pub fn step_definition<S>(mut self, name: impl Into<String>, body: S) -> Self
        where S: StepDefinition + 'static
    {
        let step = Step::new(QualifiedName::new(self.name.owner.clone(), name), Arc::new(body));
        self.members.push(Member::Step(step));
        self
    }

    /// Embebe una historia por referencia: sus pasos conservan su dueño.
    pub fn substory(mut self, story: &Story) -> Self {
        self.members.push(Member::Substory(story.clone()));
        self
    }

    /// Embebe una historia como heredada: ella y todo lo que posee pasan a
    /// pertenecer al dueño de esta historia.
    pub fn inherit(mut self, story: &Story) -> Result<Self, ProtocolError> {
        let inherited = reowned(story, &self.name.owner)?;
        self.members.push(Member::Substory(inherited));
        Ok(self)
    }

    /// Valida la composición y construye el plan.
    ///
    /// Los errores de composición se detectan aquí, nunca al invocar.
    pub fn build(self) -> Result<Story, ProtocolError> {
        for member in &self.members {
            if let Member::Substory(sub) = member {
                validate_composition(&self.protocol, &self.name, sub.protocol(), sub.name()).map_err(|e| {
                    warn!("story {} rejects substory {}: incompatible failure protocols", self.name, sub.name());
                    e
                })?;
            }
        }

        let mut entries = Vec::new();
        flatten(&self.members, &self.name.owner, &self.protocol, 0, &mut entries);
        let fingerprint = hash_value(&fingerprint_json(&self.name, &self.protocol, &entries));
        debug!("story {} built: {} entries, {} steps, fingerprint {}",
               self.name,
               entries.len(),
               entries.iter().filter(|e| !e.is_marker()).count(),
               fingerprint);

        let plan = Plan { story: self.name.clone(),
                          protocol: self.protocol.clone(),
                          entries,
                          fingerprint };
        Ok(Story::from_definition(Definition { name: self.name,
                                               protocol: self.protocol,
                                               members: self.members,
                                               plan }))
    }
}

/// Atajo para declarar varias historias de un mismo dueño con un protocolo
/// común.
#[derive(Debug, Clone)]
pub struct Owner {
    name: String,
    protocol: FailureProtocol,
}

impl Owner {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(),
               protocol: FailureProtocol::Absent }
    }

    /// Protocolo aplicado a todas las historias definidas con `story`.
    pub fn failures(mut self, protocol: impl Into<FailureProtocol>) -> Self {
        self.protocol = protocol.into();
        self
    }

    pub fn story(&self, name: impl Into<String>) -> StoryBuilder {
        StoryBuilder::new(self.name.clone(), name).failures(self.protocol.clone())
    }
}

fn reowned(story: &Story, owner: &str) -> Result<Story, ProtocolError> {
    let definition = story.definition();
    let previous = &definition.name.owner;
    let mut members = Vec::with_capacity(definition.members.len());
    for member in &definition.members {
        members.push(match member {
                         Member::Step(step) if step.name().owner == *previous => Member::Step(step.reowned(owner)),
                         Member::Substory(sub) if sub.name().owner == *previous => Member::Substory(reowned(sub, owner)?),
                         other => other.clone(),
                     });
    }
    StoryBuilder { name: QualifiedName::new(owner, definition.name.name.clone()),
                   protocol: definition.protocol.clone(),
                   members }.build()
}

/// Aplana recursivamente los miembros. `protocol` es el protocolo efectivo
/// del tramo: el declarado por la historia, o el heredado del padre si no
/// declara ninguno.
fn flatten(members: &[Member], owner: &str, protocol: &FailureProtocol, depth: usize, out: &mut Vec<PlanEntry>) {
    for member in members {
        match member {
            Member::Step(step) => out.push(PlanEntry { kind: EntryKind::Step(step.clone()),
                                                       protocol: protocol.clone(),
                                                       depth }),
            Member::Substory(sub) => {
                let definition = sub.definition();
                let effective = if definition.protocol.is_declared() {
                    definition.protocol.clone()
                } else {
                    protocol.clone()
                };
                let label = if definition.name.owner == owner {
                    definition.name.name.clone()
                } else {
                    format!("{} ({})", definition.name.name, definition.name)
                };

                let begin = out.len();
                out.push(PlanEntry { kind: EntryKind::Begin(Beginning { story: definition.name.clone(),
                                                                        label,
                                                                        end: begin }),
                                     protocol: effective.clone(),
                                     depth });
                flatten(&definition.members, &definition.name.owner, &effective, depth + 1, out);
                let end = out.len();
                out.push(PlanEntry { kind: EntryKind::End(Ending { story: definition.name.clone(),
                                                                   is_empty: definition.members.is_empty() }),
                                     protocol: effective,
                                     depth });
                if let EntryKind::Begin(beginning) = &mut out[begin].kind {
                    beginning.end = end;
                }
            }
        }
    }
}

fn protocol_json(protocol: &FailureProtocol) -> Value {
    if protocol.is_declared() {
        Value::Array(protocol.reasons().map(|r| Value::String(r.to_string())).collect())
    } else {
        Value::Null
    }
}

fn fingerprint_json(story: &QualifiedName, protocol: &FailureProtocol, entries: &[PlanEntry]) -> Value {
    let entries: Vec<Value> = entries.iter()
                                     .map(|entry| {
                                         let mut value = match &entry.kind {
                                             EntryKind::Step(step) => json!({ "kind": "step", "name": step.name().to_string() }),
                                             EntryKind::Begin(b) => {
                                                 json!({ "kind": "begin", "story": b.story.to_string(), "label": b.label, "end": b.end })
                                             }
                                             EntryKind::End(e) => {
                                                 json!({ "kind": "end", "story": e.story.to_string(), "is_empty": e.is_empty })
                                             }
                                         };
                                         value["depth"] = json!(entry.depth);
                                         value["protocol"] = protocol_json(&entry.protocol);
                                         value
                                     })
                                     .collect();
    json!({
        "engine_version": ENGINE_VERSION,
        "story": story.to_string(),
        "protocol": protocol_json(protocol),
        "entries": entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::Reason;

    fn noop(_: &Context) -> Result<Outcome, StepError> {
        Ok(Outcome::next())
    }

    #[test]
    fn leaf_plan_has_no_markers() {
        let story = StoryBuilder::new("Simple", "x").step("one", noop).step("two", noop).build().unwrap();
        assert!(story.plan().entries().iter().all(|e| !e.is_marker()));
        assert_eq!(story.plan().len(), 2);
    }

    #[test]
    fn substory_is_bracketed_and_end_is_patched() {
        let child = StoryBuilder::new("Child", "x").step("one", noop).build().unwrap();
        let parent = StoryBuilder::new("Parent", "a").step("before", noop)
                                                     .substory(&child)
                                                     .step("after", noop)
                                                     .build()
                                                     .unwrap();
        let entries = parent.plan().entries();
        assert_eq!(entries.len(), 5);
        match &entries[1].kind {
            EntryKind::Begin(b) => {
                assert_eq!(b.end, 3);
                assert_eq!(b.label, "x (Child.x)");
            }
            other => panic!("expected begin marker, got {other:?}"),
        }
        assert!(matches!(&entries[3].kind, EntryKind::End(e) if !e.is_empty));
        assert_eq!(entries[2].depth, 1);
        assert_eq!(entries[3].depth, 0);
    }

    #[test]
    fn protocol_less_substory_expands_to_parent_protocol() {
        let child = StoryBuilder::new("Child", "x").step("one", noop).build().unwrap();
        let parent = StoryBuilder::new("Parent", "a").failures(["foo", "bar"]).substory(&child).build().unwrap();
        assert_eq!(parent.plan().substory_protocol("Child.x"), Some(parent.protocol()));
        assert!(parent.plan().entries().iter().all(|e| e.protocol.contains(&Reason::from("foo"))));
    }

    #[test]
    fn declared_substory_keeps_its_protocol() {
        let child = StoryBuilder::new("Child", "x").failures(["foo"]).step("one", noop).build().unwrap();
        let parent = StoryBuilder::new("Parent", "a").failures(["foo", "bar"]).substory(&child).build().unwrap();
        assert_eq!(parent.plan().substory_protocol("x"), Some(&FailureProtocol::from(["foo"])));
    }

    #[test]
    fn incompatible_substory_fails_at_definition() {
        let child = StoryBuilder::new("Child", "x").failures(["quiz"]).step("one", noop).build().unwrap();
        let err = StoryBuilder::new("Parent", "a").failures(["foo"]).substory(&child).build().unwrap_err();
        assert!(matches!(err, ProtocolError::IncompatibleSubstory { .. }));
    }

    #[test]
    fn inherit_reowns_steps() {
        let base = StoryBuilder::new("Base", "x").step("one", noop).build().unwrap();
        let derived = StoryBuilder::new("Derived", "a").inherit(&base).unwrap().build().unwrap();
        let names: Vec<String> = derived.plan().steps().map(|s| s.name().to_string()).collect();
        assert_eq!(names, vec!["Derived.one"]);
        match &derived.plan().entries()[0].kind {
            EntryKind::Begin(b) => assert_eq!(b.label, "x"),
            other => panic!("expected begin marker, got {other:?}"),
        }
    }

    #[test]
    fn empty_substory_is_flagged() {
        let empty = StoryBuilder::new("Child", "e").build().unwrap();
        let parent = StoryBuilder::new("Parent", "a").substory(&empty).build().unwrap();
        assert!(matches!(&parent.plan().entries()[1].kind, EntryKind::End(e) if e.is_empty));
    }

    #[test]
    fn owner_shares_protocol() {
        let owner = Owner::new("Shared").failures(["foo"]);
        let story = owner.story("x").step("one", noop).build().unwrap();
        assert_eq!(story.protocol(), &FailureProtocol::from(["foo"]));
        assert_eq!(story.name(), &QualifiedName::new("Shared", "x"));
    }
}
