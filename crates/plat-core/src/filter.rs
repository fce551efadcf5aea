//! Entity kind selection for readers and parsers.

use crate::kind::ItemKind;
use std::ops::BitOr;

/// Selects which entity kinds a parser materializes.
///
/// Entities whose kind is not in the filter are skipped during parsing
/// without being built, which is much cheaper than building and then
/// discarding them. Non-entity kinds are never filtered; they travel
/// with their enclosing entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntityFilter {
    bits: u8,
}

impl EntityFilter {
    /// Select nodes.
    pub const NODES: EntityFilter = EntityFilter { bits: 1 << 0 };
    /// Select ways.
    pub const WAYS: EntityFilter = EntityFilter { bits: 1 << 1 };
    /// Select relations.
    pub const RELATIONS: EntityFilter = EntityFilter { bits: 1 << 2 };
    /// Select changesets.
    pub const CHANGESETS: EntityFilter = EntityFilter { bits: 1 << 3 };
    /// Select areas.
    pub const AREAS: EntityFilter = EntityFilter { bits: 1 << 4 };

    /// The filter that selects nothing.
    pub const fn empty() -> Self {
        Self { bits: 0 }
    }

    /// The filter that selects every entity kind.
    pub const fn all() -> Self {
        Self { bits: 0b1_1111 }
    }

    /// The union of two filters, usable in const contexts.
    pub const fn with(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Add the kinds of `other` to this filter.
    pub fn insert(&mut self, other: Self) {
        self.bits |= other.bits;
    }

    /// Whether entities of `kind` pass the filter.
    ///
    /// Always `false` for non-entity kinds.
    pub fn contains(&self, kind: ItemKind) -> bool {
        self.bits & Self::bit_for(kind) != 0
    }

    /// Whether no kind passes the filter.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    const fn bit_for(kind: ItemKind) -> u8 {
        match kind {
            ItemKind::Node => 1 << 0,
            ItemKind::Way => 1 << 1,
            ItemKind::Relation => 1 << 2,
            ItemKind::Changeset => 1 << 3,
            ItemKind::Area => 1 << 4,
            _ => 0,
        }
    }
}

impl Default for EntityFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl BitOr for EntityFilter {
    type Output = EntityFilter;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}
