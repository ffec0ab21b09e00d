use std::fmt;
use std::sync::Arc;

use super::Outcome;
use crate::errors::StepError;
use crate::model::{Context, QualifiedName};

/// Trait que define el cuerpo de un paso.
///
/// Recibe el contexto visible en ese punto del plan y no puede modificarlo:
/// los nuevos bindings se devuelven en `Outcome::Continue`.
pub trait StepDefinition: Send + Sync {
    fn run(&self, ctx: &Context) -> Result<Outcome, StepError>;
}

impl<F> StepDefinition for F where F: Fn(&Context) -> Result<Outcome, StepError> + Send + Sync
{
    fn run(&self, ctx: &Context) -> Result<Outcome, StepError> {
        self(ctx)
    }
}

/// Paso con nombre, tal como queda en el plan.
#[derive(Clone)]
pub struct Step {
    name: QualifiedName,
    body: Arc<dyn StepDefinition>,
}

impl Step {
    pub fn new(name: QualifiedName, body: Arc<dyn StepDefinition>) -> Self {
        Self { name, body }
    }

    pub fn name(&self) -> &QualifiedName {
        &self.name
    }

    pub fn run(&self, ctx: &Context) -> Result<Outcome, StepError> {
        self.body.run(ctx)
    }

    /// Mismo cuerpo bajo otro dueño (herencia).
    pub(crate) fn reowned(&self, owner: &str) -> Self {
        Self { name: QualifiedName::new(owner, self.name.name.clone()),
               body: Arc::clone(&self.body) }
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Dos pasos son iguales si tienen el mismo nombre cualificado.
impl PartialEq for Step {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}
