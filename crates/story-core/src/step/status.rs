use serde::Serialize;

/// Estado de un paso dentro del historial de una invocación.
///
/// Las transiciones válidas son:
/// - `Running` -> `Continued`
/// - `Running` -> `Succeeded` | `Failed` | `Skipped`
/// - `Running` -> `Errored`
///
/// Un paso que no sale de `Running` indica que la invocación se interrumpió
/// dentro de su cuerpo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    /// El cuerpo del paso está en ejecución.
    Running,
    /// El paso devolvió una continuación.
    Continued,
    /// El paso terminó la historia con éxito.
    Succeeded,
    /// El paso terminó la historia con un fallo válido.
    Failed,
    /// El paso abandonó el sub-story en curso.
    Skipped,
    /// El paso devolvió un error o violó el protocolo o el contexto.
    Errored,
}

impl StepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::Running => "running",
            StepStatus::Continued => "continued",
            StepStatus::Succeeded => "succeeded",
            StepStatus::Failed => "failed",
            StepStatus::Skipped => "skipped",
            StepStatus::Errored => "errored",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_match_serialized_names() {
        for status in [StepStatus::Running,
                       StepStatus::Continued,
                       StepStatus::Succeeded,
                       StepStatus::Failed,
                       StepStatus::Skipped,
                       StepStatus::Errored]
        {
            let serialized = serde_json::to_value(status).unwrap();
            assert_eq!(serialized, serde_json::Value::from(status.as_str()));
        }
    }
}
