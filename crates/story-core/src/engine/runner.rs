//! Estrategias de ejecución sobre un mismo plan.
//!
//! Ambas recorren el plan con `Execution`; sólo difieren en cómo entregan los
//! dos desenlaces esperados. Cualquier otro error se propaga sin cambios.

use log::debug;
use serde_json::Value;

use super::core::{Execution, Finished, Terminal};
use super::{Story, Summary};
use crate::errors::{FailureError, StoryError};
use crate::model::Arguments;

pub trait Runner {
    type Output;

    fn finish(&self, story: &Story, finished: Finished) -> Result<Self::Output, StoryError>;
}

/// Estrategia que lanza: el valor en éxito, `FailureError` en fallo.
#[derive(Debug, Clone, Copy, Default)]
pub struct Call;

impl Runner for Call {
    type Output = Option<Value>;

    fn finish(&self, _story: &Story, finished: Finished) -> Result<Self::Output, StoryError> {
        match finished.terminal {
            Terminal::Success(value) => Ok(value),
            Terminal::Failure { reason, .. } => Err(FailureError::new(reason).into()),
        }
    }
}

/// Estrategia de objeto resultado: ambos desenlaces se devuelven en un
/// `Summary`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Run;

impl Runner for Run {
    type Output = Summary;

    fn finish(&self, story: &Story, finished: Finished) -> Result<Self::Output, StoryError> {
        Ok(Summary::new(story.name().clone(), story.protocol().clone(), finished))
    }
}

/// Crea contexto e historial nuevos y recorre el plan de `story` con
/// `runner`.
pub fn execute<R: Runner>(story: &Story, arguments: Arguments, runner: &R) -> Result<R::Output, StoryError> {
    let finished = Execution::new(story.plan(), story.settings(), arguments).run_to_completion()?;
    debug!("[{}] story {} finished after {} steps", finished.run_id, story.name(), finished.history.len());
    runner.finish(story, finished)
}
