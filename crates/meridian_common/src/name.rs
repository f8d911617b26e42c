//! Interned names for pins, ports, and clocks.
//!
//! Timing analysis compares endpoint identities constantly (deterministic
//! tie-breaking in path-end comparators, exception applicability lookups), so
//! names are interned once and compared as `u32` keys.

use lasso::ThreadedRodeo;
use serde::{Deserialize, Serialize};

/// An interned name of a design object: a pin, a port, or a clock.
///
/// Names are `u32` indices into a [`NameTable`], giving O(1) equality and
/// O(1) cloning. The raw index is stable for the lifetime of the table, which
/// makes it usable as a deterministic structural tie-breaker.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub struct Name(u32);

impl Name {
    /// Creates a `Name` from a raw `u32` index.
    ///
    /// Primarily intended for deserialization and testing; in normal use
    /// names come from [`NameTable::intern`].
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw `u32` index of this name.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

// SAFETY: `Name` wraps a `u32`, which always fits in a `usize` on the
// platforms we support. `try_from_usize` rejects values that don't fit.
unsafe impl lasso::Key for Name {
    fn into_usize(self) -> usize {
        self.0 as usize
    }

    fn try_from_usize(int: usize) -> Option<Self> {
        u32::try_from(int).ok().map(Name)
    }
}

/// Thread-safe string interner for design-object names.
///
/// Backed by [`lasso::ThreadedRodeo`] so that parallel path-search workers can
/// intern endpoint names concurrently while sharing one table.
pub struct NameTable {
    rodeo: ThreadedRodeo<Name>,
}

impl NameTable {
    /// Creates a new empty name table.
    pub fn new() -> Self {
        Self {
            rodeo: ThreadedRodeo::new(),
        }
    }

    /// Interns a string, returning its [`Name`]. Re-interning an existing
    /// string returns the existing name without allocating.
    pub fn intern(&self, s: &str) -> Name {
        self.rodeo.get_or_intern(s)
    }

    /// Resolves a [`Name`] back to its string value.
    ///
    /// # Panics
    ///
    /// Panics if the `Name` was not created by this table.
    pub fn resolve(&self, name: Name) -> &str {
        self.rodeo.resolve(&name)
    }

    /// Returns the name for a string if it was already interned.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.rodeo.get(s)
    }

    /// Returns the number of distinct names interned so far.
    pub fn len(&self) -> usize {
        self.rodeo.len()
    }

    /// Returns `true` if no names have been interned.
    pub fn is_empty(&self) -> bool {
        self.rodeo.is_empty()
    }
}

impl Default for NameTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_resolve_roundtrip() {
        let table = NameTable::new();
        let n = table.intern("reg_a/D");
        assert_eq!(table.resolve(n), "reg_a/D");
    }

    #[test]
    fn intern_is_deduplicating() {
        let table = NameTable::new();
        let a = table.intern("clk");
        let b = table.intern("clk");
        assert_eq!(a, b);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn distinct_strings_distinct_names() {
        let table = NameTable::new();
        let a = table.intern("ff0/D");
        let b = table.intern("ff1/D");
        assert_ne!(a, b);
    }

    #[test]
    fn get_without_interning() {
        let table = NameTable::new();
        assert!(table.get("missing").is_none());
        let n = table.intern("present");
        assert_eq!(table.get("present"), Some(n));
    }

    #[test]
    fn name_ordering_is_raw_index_order() {
        let table = NameTable::new();
        let a = table.intern("first");
        let b = table.intern("second");
        assert!(a < b);
        assert!(a.as_raw() < b.as_raw());
    }

    #[test]
    fn name_serde_roundtrip() {
        let n = Name::from_raw(17);
        let json = serde_json::to_string(&n).unwrap();
        let restored: Name = serde_json::from_str(&json).unwrap();
        assert_eq!(n, restored);
    }

    #[test]
    fn empty_table() {
        let table = NameTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
    }
}
