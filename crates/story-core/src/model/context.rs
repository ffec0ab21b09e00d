//! Contexto de ejecución: bindings ordenados y de sólo-añadir.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use super::{Arguments, QualifiedName};
use crate::errors::ContextError;
use crate::protocol::quoted;

/// Procedencia de un binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    /// Argumento de la invocación.
    Argument,
    /// Asignado por la continuación de un paso.
    Step(QualifiedName),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Binding {
    pub value: Value,
    pub provenance: Provenance,
}

/// Contexto entregado a cada paso.
///
/// Un nombre, una vez asignado, no se sobreescribe ni se elimina durante la
/// invocación. Cada `call`/`run` crea el suyo a partir de los argumentos.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Context {
    bindings: IndexMap<String, Binding>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_arguments(arguments: Arguments) -> Self {
        let bindings = arguments.into_iter()
                                .map(|(name, value)| {
                                    (name,
                                     Binding { value,
                                               provenance: Provenance::Argument })
                                })
                                .collect();
        Self { bindings }
    }

    /// Añade un binding producido por el paso `origin`.
    pub fn bind(&mut self, name: impl Into<String>, value: Value, origin: &QualifiedName) -> Result<(), ContextError> {
        let name = name.into();
        if self.bindings.contains_key(&name) {
            return Err(ContextError { names: vec![name],
                                      origin: origin.clone() });
        }
        self.bindings.insert(name,
                             Binding { value,
                                       provenance: Provenance::Step(origin.clone()) });
        Ok(())
    }

    /// Añade todos los bindings de una continuación, o ninguno si alguno de
    /// los nombres ya existe.
    pub fn bind_all(&mut self, values: IndexMap<String, Value>, origin: &QualifiedName) -> Result<(), ContextError> {
        let clashes: Vec<String> = values.keys().filter(|k| self.bindings.contains_key(*k)).cloned().collect();
        if !clashes.is_empty() {
            return Err(ContextError { names: clashes,
                                      origin: origin.clone() });
        }
        for (name, value) in values {
            self.bindings.insert(name,
                                 Binding { value,
                                           provenance: Provenance::Step(origin.clone()) });
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name).map(|b| &b.value)
    }

    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Copia de los valores visibles para el siguiente paso.
    pub fn snapshot(&self) -> IndexMap<String, Value> {
        self.bindings.iter().map(|(k, b)| (k.clone(), b.value.clone())).collect()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Binding)> {
        self.bindings.iter().map(|(k, b)| (k.as_str(), b))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Context:")?;
        if self.bindings.is_empty() {
            return f.write_str("()");
        }
        for (name, binding) in &self.bindings {
            write!(f, "\n    {name} = {}", repr(&binding.value))?;
            match &binding.provenance {
                Provenance::Argument => f.write_str("  # Story argument")?,
                Provenance::Step(origin) => write!(f, "  # Set by {origin}")?,
            }
        }
        Ok(())
    }
}

/// Representación de un valor en los textos de diagnóstico: las cadenas se
/// entrecomillan, el resto se muestra como JSON compacto.
pub(crate) fn repr(value: &Value) -> String {
    match value {
        Value::String(s) => quoted(s),
        other => other.to_string(),
    }
}
