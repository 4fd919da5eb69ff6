//! The step envelope shared by every family.

use serde::{Deserialize, Serialize};

use crate::{Pointer, Pointers};

/// One discrete state transition.
///
/// `kind` is a family's closed tag enum and is flattened into the envelope,
/// so a step serializes as `{"type": "...", <kind fields>, "lines": [...],
/// "explanation": "...", "pointers": {...}}`. The envelope fields are
/// narration only and never influence reconstruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step<K> {
    #[serde(flatten)]
    pub kind: K,
    /// Pseudocode line references.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<u32>,
    /// Narration shown alongside the step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Pointers::is_empty")]
    pub pointers: Pointers,
}

impl<K> Step<K> {
    /// A bare step with no narration.
    pub fn new(kind: K) -> Self {
        Self {
            kind,
            lines: Vec::new(),
            explanation: None,
            pointers: Pointers::new(),
        }
    }

    /// Attach pseudocode line references.
    pub fn lines(mut self, lines: impl IntoIterator<Item = u32>) -> Self {
        self.lines = lines.into_iter().collect();
        self
    }

    /// Attach narration.
    pub fn explain(mut self, text: impl Into<String>) -> Self {
        self.explanation = Some(text.into());
        self
    }

    /// Bind a named pointer.
    pub fn pointer(mut self, name: impl Into<String>, pointer: impl Into<Pointer>) -> Self {
        self.pointers.insert(name.into(), pointer.into());
        self
    }

    /// The narration, or an empty string.
    pub fn explanation(&self) -> &str {
        self.explanation.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Id;

    #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "type", rename_all = "kebab-case")]
    enum Kind {
        Swap { a: Id, b: Id },
        Done,
    }

    #[test]
    fn envelope_flattens_kind() {
        let step = Step::new(Kind::Swap { a: Id(1), b: Id(2) })
            .lines([3, 4])
            .explain("swap them")
            .pointer("i", Id(1));

        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains(r#""type":"swap""#));
        assert!(json.contains(r#""a":1"#));
        assert!(json.contains(r#""lines":[3,4]"#));
        assert!(json.contains(r#""i":1"#));

        let parsed: Step<Kind> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, step);
    }

    #[test]
    fn bare_step_omits_narration() {
        let json = serde_json::to_string(&Step::new(Kind::Done)).unwrap();
        assert_eq!(json, r#"{"type":"done"}"#);
        assert_eq!(Step::new(Kind::Done).explanation(), "");
    }
}
