//! Máquina de estados que recorre un `Plan`.
//!
//! Un único cursor avanza sobre las entradas del plan. El estado de una
//! invocación es (cursor, contexto, historial, pila de tramos abiertos); la
//! cima de la pila es el protocolo contra el que se valida cada fallo.

use log::{debug, trace, warn};
use serde_json::Value;
use uuid::Uuid;

use crate::config::Settings;
use crate::errors::StoryError;
use crate::model::{repr, Arguments, Context, History, QualifiedName};
use crate::plan::{EntryKind, Plan};
use crate::protocol::{validate_reason, FailureProtocol, Reason};
use crate::step::{Outcome, Step, StepStatus};

/// Estado terminal esperado de una invocación.
#[derive(Debug, Clone, PartialEq)]
pub enum Terminal {
    Success(Option<Value>),
    Failure {
        reason: Option<Reason>,
        /// Paso que produjo el fallo.
        step: QualifiedName,
    },
}

/// Invocación terminada: lo que los runners convierten en su salida.
#[derive(Debug)]
pub struct Finished {
    pub terminal: Terminal,
    pub context: Context,
    pub history: History,
    pub run_id: Uuid,
}

/// Tramo abierto. La raíz no tiene marca de fin.
#[derive(Debug)]
struct Scope {
    protocol: FailureProtocol,
    end: Option<usize>,
}

enum Advance {
    Next,
    Done(Terminal),
}

pub(crate) struct Execution<'a> {
    plan: &'a Plan,
    settings: &'a Settings,
    context: Context,
    history: History,
    scopes: Vec<Scope>,
    cursor: usize,
    last_value: Option<Value>,
    run_id: Uuid,
}

impl<'a> Execution<'a> {
    pub(crate) fn new(plan: &'a Plan, settings: &'a Settings, arguments: Arguments) -> Self {
        let root = Scope { protocol: plan.protocol().clone(),
                           end: None };
        Self { plan,
               settings,
               context: Context::from_arguments(arguments),
               history: History::new(plan.story().clone()),
               scopes: vec![root],
               cursor: 0,
               last_value: None,
               run_id: Uuid::new_v4() }
    }

    /// Ejecuta el plan hasta un estado terminal o un error.
    pub(crate) fn run_to_completion(mut self) -> Result<Finished, StoryError> {
        debug!("[{}] story {} started (fingerprint {}, arguments: {:?})",
               self.run_id,
               self.plan.story(),
               self.plan.fingerprint(),
               self.context.names().collect::<Vec<_>>());
        loop {
            match self.next()? {
                Advance::Next => continue,
                Advance::Done(terminal) => {
                    self.log_terminal(&terminal);
                    return Ok(Finished { terminal,
                                         context: self.context,
                                         history: self.history,
                                         run_id: self.run_id });
                }
            }
        }
    }

    /// Procesa la entrada bajo el cursor.
    fn next(&mut self) -> Result<Advance, StoryError> {
        let plan = self.plan;
        let Some(entry) = plan.entries().get(self.cursor) else {
            // Plan agotado sin señal terminal.
            return Ok(Advance::Done(Terminal::Success(self.last_value.take())));
        };

        match &entry.kind {
            EntryKind::Begin(beginning) => {
                trace!("[{}] entering {} (depth {})", self.run_id, beginning.story, entry.depth + 1);
                self.scopes.push(Scope { protocol: entry.protocol.clone(),
                                         end: Some(beginning.end) });
                self.cursor += 1;
                Ok(Advance::Next)
            }
            EntryKind::End(ending) => {
                trace!("[{}] leaving {}{}",
                       self.run_id,
                       ending.story,
                       if ending.is_empty { " (empty)" } else { "" });
                if self.scopes.len() > 1 {
                    self.scopes.pop();
                }
                self.cursor += 1;
                Ok(Advance::Next)
            }
            EntryKind::Step(step) => self.call_step(step, entry.depth),
        }
    }

    fn call_step(&mut self, step: &Step, depth: usize) -> Result<Advance, StoryError> {
        let name = step.name();
        self.history.before_call(name, depth);

        let outcome = match step.run(&self.context) {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!("[{}] step {} returned an error: {}", self.run_id, name, e);
                self.finish_step(name, StepStatus::Errored, Some(e.to_string()));
                return Err(StoryError::Step(e));
            }
        };

        match outcome {
            Outcome::Continue(values) => {
                if self.settings.log_bindings {
                    debug!("[{}] step {} continued with {:?}", self.run_id, name, values);
                } else {
                    debug!("[{}] step {} continued with {:?}", self.run_id, name, values.keys().collect::<Vec<_>>());
                }
                let last = values.values().last().cloned();
                if let Err(e) = self.context.bind_all(values, name) {
                    warn!("[{}] step {} tried to rebind {:?}", self.run_id, name, e.names);
                    self.finish_step(name, StepStatus::Errored, None);
                    return Err(e.into());
                }
                if last.is_some() {
                    self.last_value = last;
                }
                self.finish_step(name, StepStatus::Continued, None);
                self.cursor += 1;
                Ok(Advance::Next)
            }
            Outcome::Success(value) => {
                self.finish_step(name, StepStatus::Succeeded, value.as_ref().map(repr));
                Ok(Advance::Done(Terminal::Success(value)))
            }
            Outcome::Failure(reason) => {
                if let Err(e) = validate_reason(self.active_protocol(), reason.as_ref(), name) {
                    warn!("[{}] step {} violated the failure protocol", self.run_id, name);
                    self.finish_step(name, StepStatus::Errored, None);
                    return Err(e.into());
                }
                self.finish_step(name, StepStatus::Failed, None);
                Ok(Advance::Done(Terminal::Failure { reason,
                                                     step: name.clone() }))
            }
            Outcome::Skip => {
                self.finish_step(name, StepStatus::Skipped, None);
                match self.scopes.last().and_then(|s| s.end) {
                    Some(end) => {
                        debug!("[{}] step {} skipped the rest of its substory", self.run_id, name);
                        self.cursor = end;
                        Ok(Advance::Next)
                    }
                    None => Ok(Advance::Done(Terminal::Success(None))),
                }
            }
        }
    }

    fn finish_step(&mut self, step: &QualifiedName, status: StepStatus, note: Option<String>) {
        trace!("[{}] step {} {}", self.run_id, step, status.as_str());
        self.history.finish(status, note);
    }

    fn active_protocol(&self) -> &FailureProtocol {
        self.scopes.last().map(|s| &s.protocol).unwrap_or(self.plan.protocol())
    }

    fn log_terminal(&self, terminal: &Terminal) {
        match terminal {
            Terminal::Success(_) => debug!("[{}] story {} succeeded", self.run_id, self.plan.story()),
            Terminal::Failure { reason, step } => {
                debug!("[{}] story {} failed on {} (reason: {})",
                       self.run_id,
                       self.plan.story(),
                       step,
                       reason.as_ref().map(Reason::to_string).unwrap_or_else(|| "none".into()));
                if self.settings.log_history {
                    debug!("[{}] history:\n{}", self.run_id, self.history);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::StepError;
    use crate::plan::StoryBuilder;
    use serde_json::json;

    fn noop(_: &Context) -> Result<Outcome, StepError> {
        Ok(Outcome::next())
    }

    fn run(plan: &Plan, arguments: Arguments) -> Result<Finished, StoryError> {
        Execution::new(plan, &Settings::default(), arguments).run_to_completion()
    }

    #[test]
    fn exhausted_plan_returns_last_bound_value() {
        let story = StoryBuilder::new("Simple", "x").step("one", |_| Ok(Outcome::bind("a", 1)))
                                                    .step("two", |_| Ok(Outcome::next_with([("b", 2), ("c", 3)])))
                                                    .step("three", noop)
                                                    .build()
                                                    .unwrap();
        let finished = run(story.plan(), Arguments::new()).unwrap();
        assert_eq!(finished.terminal, Terminal::Success(Some(json!(3))));
        assert_eq!(finished.context.len(), 3);
        assert_eq!(finished.history.len(), 3);
    }

    #[test]
    fn empty_plan_succeeds_without_value() {
        let story = StoryBuilder::new("Simple", "empty").build().unwrap();
        let finished = run(story.plan(), Arguments::new().with("a", 1)).unwrap();
        assert_eq!(finished.terminal, Terminal::Success(None));
    }

    #[test]
    fn failure_is_validated_against_innermost_scope() {
        let child = StoryBuilder::new("Child", "x").failures(["foo"])
                                                   .step("one", |_| Ok(Outcome::failure("bar")))
                                                   .build()
                                                   .unwrap();
        let parent = StoryBuilder::new("Parent", "a").failures(["foo", "bar"]).substory(&child).build().unwrap();
        let err = run(parent.plan(), Arguments::new()).unwrap_err();
        let protocol_error = err.as_protocol().expect("protocol error");
        assert_eq!(protocol_error.available(), &[Reason::from("foo")]);
        assert_eq!(protocol_error.origin(), &QualifiedName::new("Child", "one"));
    }

    #[test]
    fn skip_leaves_innermost_substory() {
        let child = StoryBuilder::new("Child", "x").step("one", |_| Ok(Outcome::skip()))
                                                   .step("two", |_| Ok(Outcome::bind("never", true)))
                                                   .build()
                                                   .unwrap();
        let parent = StoryBuilder::new("Parent", "a").substory(&child)
                                                     .step("after", |_| Ok(Outcome::bind("after", true)))
                                                     .build()
                                                     .unwrap();
        let finished = run(parent.plan(), Arguments::new()).unwrap();
        assert!(!finished.context.contains("never"));
        assert!(finished.context.contains("after"));
        assert_eq!(finished.history.entries()[0].status, StepStatus::Skipped);
    }

    #[test]
    fn skip_at_top_level_ends_with_success() {
        let story = StoryBuilder::new("Simple", "x").step("one", |_| Ok(Outcome::skip()))
                                                    .step("two", |_| Ok(Outcome::success(1)))
                                                    .build()
                                                    .unwrap();
        let finished = run(story.plan(), Arguments::new()).unwrap();
        assert_eq!(finished.terminal, Terminal::Success(None));
        assert_eq!(finished.history.len(), 1);
    }

    #[test]
    fn step_errors_are_recorded_and_propagated() {
        let story = StoryBuilder::new("Simple", "x").step("one", |_| Err("boom".into())).build().unwrap();
        let err = run(story.plan(), Arguments::new()).unwrap_err();
        assert!(matches!(err, StoryError::Step(_)));
    }
}
