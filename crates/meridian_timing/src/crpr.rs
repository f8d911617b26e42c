//! Common-path pessimism removal and the memo cell that caches it.
//!
//! Launch and capture clock paths usually share a physical clock-tree prefix.
//! Analyzing the launch side late and the capture side early double-counts
//! the shared prefix's corner spread; the CRPR value is exactly that
//! double-counted spread, found by walking both hop lists from the clock
//! root to the deepest shared pin.
//!
//! The walk is bounded but not free, and derived quantities (slack, required
//! time) read the value repeatedly, so each path end caches it in a
//! [`Memoized`] cell: computed at most once, then immutable.

use crate::path::Path;
use std::sync::OnceLock;

/// A lazily-computed, write-once value.
///
/// Distinguishes "not yet computed" from any computed value at the type
/// level. Forcing is idempotent: concurrent forcing races recompute the same
/// pure function and converge on one stored value, after which reads are
/// lock-free. There is deliberately no invalidation.
#[derive(Debug, Default)]
pub struct Memoized<T> {
    cell: OnceLock<T>,
}

impl<T> Memoized<T> {
    /// Creates an unset memo.
    pub fn new() -> Self {
        Self {
            cell: OnceLock::new(),
        }
    }

    /// Creates a memo pre-seeded with an already-computed value.
    pub fn with_value(value: T) -> Self {
        let cell = OnceLock::new();
        let _ = cell.set(value);
        Self { cell }
    }

    /// Returns the value, computing and storing it on first use.
    pub fn force(&self, compute: impl FnOnce() -> T) -> &T {
        self.cell.get_or_init(compute)
    }

    /// Returns the value if it has been computed.
    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    /// Returns `true` once the value has been computed.
    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T: Clone> Clone for Memoized<T> {
    fn clone(&self) -> Self {
        match self.cell.get() {
            Some(value) => Self::with_value(value.clone()),
            None => Self::new(),
        }
    }
}

/// Walks the clock-tree prefixes of a data path's launch clock and a capture
/// clock path, returning the pessimism shared by both.
///
/// The deepest hop present in both lists (matched by pin, from the root)
/// bounds the shared tree; the removable pessimism is the smaller of the two
/// paths' accumulated corner spreads there, clamped non-negative. Paths with
/// no shared prefix, ideal clocks, and unclocked paths all yield zero.
pub fn find_crpr(path: &Path, clk_path: &Path) -> f64 {
    let mut deepest: Option<f64> = None;
    for (a, b) in path.clk_hops.iter().zip(clk_path.clk_hops.iter()) {
        if a.pin != b.pin {
            break;
        }
        let spread_a = a.late_ns - a.early_ns;
        let spread_b = b.late_ns - b.early_ns;
        deepest = Some(spread_a.min(spread_b));
    }
    deepest.map_or(0.0, |spread| spread.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::RiseFall;
    use crate::path::ClockTreeHop;
    use meridian_common::{MinMax, NameTable};

    fn path_with_hops(table: &NameTable, hops: Vec<ClockTreeHop>) -> Path {
        Path::new(table.intern("ff/D"), RiseFall::Rise, MinMax::Max, 0.0).with_clk_hops(hops)
    }

    #[test]
    fn memo_starts_unset() {
        let memo: Memoized<f64> = Memoized::new();
        assert!(!memo.is_set());
        assert_eq!(memo.get(), None);
    }

    #[test]
    fn memo_forces_exactly_once() {
        let memo = Memoized::new();
        let mut calls = 0;
        let first: f64 = *memo.force(|| {
            calls += 1;
            1.5
        });
        let second = *memo.force(|| {
            // A second force must not recompute.
            unreachable!("memo recomputed")
        });
        assert_eq!(calls, 1);
        assert_eq!(first.to_bits(), second.to_bits());
        assert!(memo.is_set());
    }

    #[test]
    fn memo_clone_carries_value() {
        let memo = Memoized::with_value(2.5);
        let copy = memo.clone();
        assert_eq!(copy.get(), Some(&2.5));
        let unset: Memoized<f64> = Memoized::new();
        assert!(!unset.clone().is_set());
    }

    #[test]
    fn crpr_zero_without_shared_prefix() {
        let table = NameTable::new();
        let a = path_with_hops(&table, vec![ClockTreeHop::new(table.intern("x"), 0.0, 0.5)]);
        let b = path_with_hops(&table, vec![ClockTreeHop::new(table.intern("y"), 0.0, 0.5)]);
        assert_eq!(find_crpr(&a, &b), 0.0);
    }

    #[test]
    fn crpr_zero_for_ideal_clocks() {
        let table = NameTable::new();
        let a = path_with_hops(&table, vec![]);
        let b = path_with_hops(&table, vec![]);
        assert_eq!(find_crpr(&a, &b), 0.0);
    }

    #[test]
    fn crpr_uses_deepest_common_hop() {
        let table = NameTable::new();
        let root = table.intern("clkbuf0/Y");
        let mid = table.intern("clkbuf1/Y");
        let a = path_with_hops(
            &table,
            vec![
                ClockTreeHop::new(root, 0.1, 0.3),
                ClockTreeHop::new(mid, 0.4, 0.9),
                ClockTreeHop::new(table.intern("leaf_a"), 0.6, 1.4),
            ],
        );
        let b = path_with_hops(
            &table,
            vec![
                ClockTreeHop::new(root, 0.1, 0.3),
                ClockTreeHop::new(mid, 0.4, 0.8),
                ClockTreeHop::new(table.intern("leaf_b"), 0.7, 1.2),
            ],
        );
        // Shared prefix ends at `mid`: min(0.9-0.4, 0.8-0.4) = 0.4.
        assert!((find_crpr(&a, &b) - 0.4).abs() < 1e-12);
    }

    #[test]
    fn crpr_is_symmetric() {
        let table = NameTable::new();
        let root = table.intern("root");
        let a = path_with_hops(&table, vec![ClockTreeHop::new(root, 0.2, 0.7)]);
        let b = path_with_hops(&table, vec![ClockTreeHop::new(root, 0.1, 0.9)]);
        assert_eq!(find_crpr(&a, &b), find_crpr(&b, &a));
        assert!((find_crpr(&a, &b) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn crpr_clamped_non_negative() {
        let table = NameTable::new();
        let root = table.intern("root");
        // Degenerate data with late < early still yields zero, not negative.
        let a = path_with_hops(&table, vec![ClockTreeHop::new(root, 0.9, 0.2)]);
        let b = path_with_hops(&table, vec![ClockTreeHop::new(root, 0.1, 0.8)]);
        assert_eq!(find_crpr(&a, &b), 0.0);
    }
}
