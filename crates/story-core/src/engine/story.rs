use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::runner::{execute, Call, Run, Runner};
use super::Summary;
use crate::config::{self, Settings};
use crate::errors::StoryError;
use crate::model::{Arguments, QualifiedName};
use crate::plan::{render, Definition, Plan, StoryBuilder};
use crate::protocol::FailureProtocol;

/// Historia construida. Barata de clonar y compartible entre hilos; cada
/// invocación crea su propio contexto e historial.
#[derive(Debug, Clone)]
pub struct Story {
    inner: Arc<Definition>,
    settings: Option<Arc<Settings>>,
}

impl Story {
    /// Empieza la definición de la historia `owner.name`.
    pub fn define(owner: impl Into<String>, name: impl Into<String>) -> StoryBuilder {
        StoryBuilder::new(owner, name)
    }

    pub(crate) fn from_definition(definition: Definition) -> Self {
        Self { inner: Arc::new(definition),
               settings: None }
    }

    pub(crate) fn definition(&self) -> &Definition {
        &self.inner
    }

    pub fn name(&self) -> &QualifiedName {
        &self.inner.name
    }

    /// Protocolo de fallos declarado.
    pub fn protocol(&self) -> &FailureProtocol {
        &self.inner.protocol
    }

    pub fn plan(&self) -> &Plan {
        &self.inner.plan
    }

    pub fn fingerprint(&self) -> &str {
        self.inner.plan.fingerprint()
    }

    /// Protocolo efectivo de un sub-story embebido.
    pub fn substory_protocol(&self, name: &str) -> Option<&FailureProtocol> {
        self.inner.plan.substory_protocol(name)
    }

    /// Configuración propia para esta historia en lugar de la global.
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(Arc::new(settings));
        self
    }

    pub fn settings(&self) -> &Settings {
        self.settings.as_deref().unwrap_or_else(|| config::settings())
    }

    /// Estrategia que lanza: `Ok(valor)` en éxito y
    /// `Err(StoryError::Failure(..))` en fallo.
    pub fn call(&self, arguments: impl Into<Arguments>) -> Result<Option<Value>, StoryError> {
        execute(self, arguments.into(), &Call)
    }

    /// Estrategia de objeto resultado.
    pub fn run(&self, arguments: impl Into<Arguments>) -> Result<Summary, StoryError> {
        execute(self, arguments.into(), &Run)
    }

    pub fn execute<R: Runner>(&self, arguments: impl Into<Arguments>, runner: &R) -> Result<R::Output, StoryError> {
        execute(self, arguments.into(), runner)
    }
}

impl fmt::Display for Story {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self.plan()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Outcome;

    #[test]
    fn settings_fall_back_to_global_until_overridden() {
        let story = Story::define("Simple", "x").step("one", |_| Ok(Outcome::bind("a", 1))).build().unwrap();
        assert!(std::ptr::eq(story.settings(), config::settings()));
        assert_eq!(story.call(Arguments::new()).unwrap(), Some(serde_json::json!(1)));

        let own = Settings { log_bindings: true,
                             log_history: true };
        let story = story.with_settings(own.clone());
        assert_eq!(story.settings(), &own);
        assert!(story.run(Arguments::new()).unwrap().is_success());
    }
}
