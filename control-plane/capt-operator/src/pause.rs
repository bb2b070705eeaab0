//! Pause gate: a pure predicate over the owner's and the child's
//! annotation sets. No I/O, total over absent inputs.

use std::collections::BTreeMap;

/// Annotation suspending reconciliation for an object (and, when set on
/// an owner, all of its children). Any value other than `"false"`
/// counts as paused.
pub const PAUSED_ANNOTATION: &str = "capt.io/paused";

pub fn is_paused(
    owner_annotations: Option<&BTreeMap<String, String>>,
    child_annotations: Option<&BTreeMap<String, String>>,
) -> bool {
    has_pause_directive(owner_annotations)
        || has_pause_directive(child_annotations)
}

fn has_pause_directive(
    annotations: Option<&BTreeMap<String, String>>,
) -> bool {
    annotations
        .and_then(|set| set.get(PAUSED_ANNOTATION))
        .map(|value| value != "false")
        .unwrap_or(false)
}
