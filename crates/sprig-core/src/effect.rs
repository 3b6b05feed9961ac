//! Effect tags
//!
//! An effect tag records the host-tree action a fiber needs at commit.
//! It is decided once, when the fiber's parent is reconciled.

use std::fmt;

/// Host-tree action required for a fiber
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum EffectTag {
    /// Nothing to do (the root, or a fiber after commit)
    #[default]
    None,
    /// Insert the fiber's host node under its host parent
    Placement,
    /// Diff attributes against the alternate
    Update,
    /// Remove the fiber's host node(s); fiber comes from the previous tree
    Deletion,
}

impl EffectTag {
    /// Does this tag cause a host mutation at commit?
    pub fn is_effect(self) -> bool {
        self != EffectTag::None
    }
}

impl fmt::Display for EffectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EffectTag::None => "none",
            EffectTag::Placement => "placement",
            EffectTag::Update => "update",
            EffectTag::Deletion => "deletion",
        };
        f.write_str(s)
    }
}
