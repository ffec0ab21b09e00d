//! Historial de pasos ejecutados en una invocación.
//!
//! Sólo se usa para diagnóstico; el motor nunca lo consulta para decidir.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::QualifiedName;
use crate::constants::INDENT;
use crate::step::StepStatus;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub step: QualifiedName,
    /// Profundidad de anidamiento (0 para los pasos de la historia raíz).
    pub depth: usize,
    pub status: StepStatus,
    /// Detalle del estado final (valor devuelto o mensaje de error).
    pub note: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct History {
    story: QualifiedName,
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn new(story: QualifiedName) -> Self {
        Self { story,
               entries: Vec::new() }
    }

    /// Registra el inicio de un paso.
    pub(crate) fn before_call(&mut self, step: &QualifiedName, depth: usize) {
        self.entries.push(HistoryEntry { step: step.clone(),
                                         depth,
                                         status: StepStatus::Running,
                                         note: None,
                                         started_at: Utc::now(),
                                         finished_at: None });
    }

    /// Cierra el último paso registrado.
    pub(crate) fn finish(&mut self, status: StepStatus, note: Option<String>) {
        if let Some(entry) = self.entries.last_mut() {
            entry.status = status;
            entry.note = note;
            entry.finished_at = Some(Utc::now());
        }
    }

    pub fn story(&self) -> &QualifiedName {
        &self.story
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Pares (historia, paso) en orden de ejecución.
    pub fn steps(&self) -> impl Iterator<Item = &QualifiedName> {
        self.entries.iter().map(|e| &e.step)
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Igualdad estructural: mismos pasos con mismos estados, sin comparar
    /// marcas de tiempo.
    pub(crate) fn same_steps(&self, other: &History) -> bool {
        self.story == other.story
        && self.entries.len() == other.entries.len()
        && self.entries
               .iter()
               .zip(&other.entries)
               .all(|(a, b)| a.step == b.step && a.depth == b.depth && a.status == b.status && a.note == b.note)
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.story)?;
        for entry in &self.entries {
            let indent = INDENT.repeat(entry.depth + 1);
            write!(f, "\n{indent}{}", entry.step.name)?;
            match (entry.status, &entry.note) {
                (StepStatus::Succeeded, Some(note)) => write!(f, " (returned: {note})")?,
                (StepStatus::Failed, _) => f.write_str(" (failed)")?,
                (StepStatus::Skipped, _) => f.write_str(" (skipped)")?,
                (StepStatus::Errored, Some(note)) => write!(f, " (errored: {note})")?,
                (StepStatus::Errored, None) => f.write_str(" (errored)")?,
                _ => {}
            }
        }
        Ok(())
    }
}
