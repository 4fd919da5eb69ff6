//! Named logical pointers attached to a step.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Id;

/// A logical pointer binding.
///
/// Serialized untagged: a scalar id is a number, an id set is an array and an
/// annotated binding is an object with `ids` and `value`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pointer {
    /// Points at a single entity.
    Scalar(Id),
    /// Points at several entities at once (a window, a path).
    IdSet(Vec<Id>),
    /// Points at entities and carries a value computed over them.
    Annotated { ids: Vec<Id>, value: i64 },
}

impl Pointer {
    /// Every id this pointer refers to.
    pub fn ids(&self) -> Vec<Id> {
        match self {
            Pointer::Scalar(id) => vec![*id],
            Pointer::IdSet(ids) | Pointer::Annotated { ids, .. } => ids.clone(),
        }
    }
}

impl From<Id> for Pointer {
    fn from(id: Id) -> Self {
        Pointer::Scalar(id)
    }
}

impl From<Vec<Id>> for Pointer {
    fn from(ids: Vec<Id>) -> Self {
        Pointer::IdSet(ids)
    }
}

/// Pointer name to binding, ordered by name so serialization is stable.
pub type Pointers = BTreeMap<String, Pointer>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_shapes() {
        assert_eq!(serde_json::to_string(&Pointer::Scalar(Id(3))).unwrap(), "3");
        assert_eq!(
            serde_json::to_string(&Pointer::IdSet(vec![Id(1), Id(2)])).unwrap(),
            "[1,2]"
        );
        let annotated = Pointer::Annotated {
            ids: vec![Id(1)],
            value: 9,
        };
        let json = serde_json::to_string(&annotated).unwrap();
        assert_eq!(json, r#"{"ids":[1],"value":9}"#);
        let parsed: Pointer = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, annotated);
    }

    #[test]
    fn ids_flatten_every_variant() {
        assert_eq!(Pointer::Scalar(Id(4)).ids(), vec![Id(4)]);
        assert_eq!(
            Pointer::Annotated {
                ids: vec![Id(1), Id(2)],
                value: 0
            }
            .ids(),
            vec![Id(1), Id(2)]
        );
    }
}
