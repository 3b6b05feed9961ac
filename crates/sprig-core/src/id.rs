//! Identity types for the fiber graph
//!
//! Fibers live in a per-cycle arena, so a `FiberId` is only meaningful
//! together with the `Generation` of the tree that allocated it.

use std::fmt;

/// Index of a fiber inside one fiber tree's arena
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct FiberId(pub u32);

impl FiberId {
    /// The synthetic root fiber always occupies slot zero
    pub const ROOT: FiberId = FiberId(0);

    #[inline]
    pub fn new(index: u32) -> Self {
        FiberId(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub fn is_root(self) -> bool {
        self == Self::ROOT
    }
}

impl fmt::Debug for FiberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fiber({})", self.0)
    }
}

impl fmt::Display for FiberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Render cycle generation - one per fiber tree
///
/// A work-in-progress tree records the generation of the tree its
/// alternates point into; a mismatch means the alternate is stale.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(pub u64);

impl Generation {
    pub const ZERO: Generation = Generation(0);

    #[inline]
    pub fn new(value: u64) -> Self {
        Generation(value)
    }

    #[inline]
    pub fn next(self) -> Self {
        Generation(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Gen({})", self.0)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
