//! Stable entity identifiers.
//!
//! Every entity that appears in a step log (array block, list node, interval,
//! graph node, call-tree node) is addressed by an [`Id`]. Ids supplied by the
//! caller must stay below 2^63; the top bit is reserved for ids derived from
//! other ids, so replaying a log never confuses a synthesized entity with an
//! input one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Bit set on every id produced by [`Id::derive`].
pub const DERIVED_BIT: u64 = 1 << 63;

/// A stable integer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id(pub u64);

impl Id {
    /// Create from a raw value.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw value.
    #[inline]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Whether this id was synthesized by [`Id::derive`].
    #[inline]
    pub const fn is_derived(&self) -> bool {
        self.0 & DERIVED_BIT != 0
    }

    /// Derive a deterministic id for an entity built from `sources`.
    ///
    /// The same tag and source ids always give the same id, across runs and
    /// across machines. Used for merged and gap intervals.
    pub fn derive(tag: &str, sources: &[Id]) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(tag.as_bytes());
        hasher.update(b":");
        for source in sources {
            hasher.update(&source.0.to_le_bytes());
        }
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        Self(u64::from_le_bytes(bytes) | DERIVED_BIT)
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Id> for u64 {
    fn from(value: Id) -> Self {
        value.0
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Hands out fresh ids for a single generator invocation.
///
/// Each invocation owns its allocator, so two generators running side by
/// side never hand out colliding node ids.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    /// Allocator whose first id is 0.
    pub fn new() -> Self {
        Self { next: 0 }
    }

    /// Allocator whose first id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Take the next id.
    pub fn next_id(&mut self) -> Id {
        let id = Id(self.next);
        self.next += 1;
        id
    }

    /// Number of ids handed out so far (relative to zero).
    pub fn allocated(&self) -> u64 {
        self.next
    }
}
