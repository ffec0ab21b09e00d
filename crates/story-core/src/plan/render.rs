//! Representación textual de un plan.

use super::entry::{EntryKind, Plan};
use crate::constants::{EMPTY_STORY, INDENT};

/// Representa el plan como árbol indentado: la historia raíz en la primera
/// línea y, debajo, pasos y sub-stories con un nivel más por cada tramo.
pub fn render(plan: &Plan) -> String {
    let mut lines = vec![plan.story().to_string()];
    if plan.is_empty() {
        lines.push(format!("{INDENT}{EMPTY_STORY}"));
    }
    for entry in plan.entries() {
        let indent = INDENT.repeat(entry.depth + 1);
        match &entry.kind {
            EntryKind::Step(step) => lines.push(format!("{indent}{}", step.name().name)),
            EntryKind::Begin(beginning) => lines.push(format!("{indent}{}", beginning.label)),
            EntryKind::End(ending) if ending.is_empty => lines.push(format!("{indent}{INDENT}{EMPTY_STORY}")),
            EntryKind::End(_) => {}
        }
    }
    lines.join("\n")
}
