//! Realized timing paths, as handed over by the path search.
//!
//! A [`Path`] is a finished product: the search has already walked the graph,
//! picked the worst arc at every hop, and summed the arrival. Path ends only
//! read it — endpoint identity, arrival, analysis side, the launch clock
//! decomposition, and the clock-tree prefix needed for pessimism removal.

use crate::check::RiseFall;
use crate::clock::ClockEdgeRef;
use meridian_common::{MinMax, Name};
use serde::{Deserialize, Serialize};

/// One node of the clock-tree prefix a path's clock traversed, with the
/// accumulated early and late arrival at that node.
///
/// Two paths whose hop lists share a prefix share that much physical clock
/// tree; the last shared hop bounds how much pessimism can be removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockTreeHop {
    /// The clock-tree pin this hop arrived at.
    pub pin: Name,
    /// Accumulated early (fast-corner) arrival at this pin, in nanoseconds.
    pub early_ns: f64,
    /// Accumulated late (slow-corner) arrival at this pin, in nanoseconds.
    pub late_ns: f64,
}

impl ClockTreeHop {
    /// Creates a hop with the given accumulated early/late arrivals.
    pub fn new(pin: Name, early_ns: f64, late_ns: f64) -> Self {
        Self {
            pin,
            early_ns,
            late_ns,
        }
    }
}

/// A realized timing path terminating at one endpoint.
///
/// Arrivals are absolute within the launch cycle: the launch edge's nominal
/// time plus clock insertion, clock latency, and data delay. For a clock
/// path (a capture path), the "endpoint" is the register clock pin and the
/// arrival is the captured edge's arrival there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Path {
    /// The endpoint pin of this path.
    pub pin: Name,
    /// The transition sense at the endpoint.
    pub transition: RiseFall,
    /// The analysis side this path was searched on.
    pub min_max: MinMax,
    /// Arrival time at the endpoint, in nanoseconds.
    pub arrival_ns: f64,
    /// The clock edge that launched (or, for a clock path, propagated along)
    /// this path. `None` for unclocked paths.
    pub clk_edge: Option<ClockEdgeRef>,
    /// Defined insertion-delay portion of the clock arrival, in nanoseconds.
    pub clk_insertion_ns: f64,
    /// Propagated clock-tree latency portion of the clock arrival, in
    /// nanoseconds.
    pub clk_latency_ns: f64,
    /// Clock-tree prefix from the clock definition root, for common-path
    /// pessimism removal. Empty for ideal clocks and unclocked paths.
    pub clk_hops: Vec<ClockTreeHop>,
}

impl Path {
    /// Creates an unclocked path.
    pub fn new(pin: Name, transition: RiseFall, min_max: MinMax, arrival_ns: f64) -> Self {
        Self {
            pin,
            transition,
            min_max,
            arrival_ns,
            clk_edge: None,
            clk_insertion_ns: 0.0,
            clk_latency_ns: 0.0,
            clk_hops: Vec::new(),
        }
    }

    /// Attaches the launch-clock decomposition to this path.
    pub fn with_clock(mut self, edge: ClockEdgeRef, insertion_ns: f64, latency_ns: f64) -> Self {
        self.clk_edge = Some(edge);
        self.clk_insertion_ns = insertion_ns;
        self.clk_latency_ns = latency_ns;
        self
    }

    /// Attaches the clock-tree prefix used for pessimism removal.
    pub fn with_clk_hops(mut self, hops: Vec<ClockTreeHop>) -> Self {
        self.clk_hops = hops;
        self
    }

    /// Total clock-tree delay of this path's clock: insertion plus latency.
    pub fn clk_delay_ns(&self) -> f64 {
        self.clk_insertion_ns + self.clk_latency_ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::ClockId;
    use meridian_common::NameTable;

    fn edge_ref() -> ClockEdgeRef {
        ClockEdgeRef {
            clock: ClockId::from_raw(0),
            rf: RiseFall::Rise,
        }
    }

    #[test]
    fn unclocked_path_defaults() {
        let table = NameTable::new();
        let p = Path::new(table.intern("out"), RiseFall::Fall, MinMax::Max, 3.2);
        assert!(p.clk_edge.is_none());
        assert_eq!(p.clk_delay_ns(), 0.0);
        assert!(p.clk_hops.is_empty());
    }

    #[test]
    fn clocked_path_decomposition() {
        let table = NameTable::new();
        let p = Path::new(table.intern("ff/D"), RiseFall::Rise, MinMax::Max, 4.0)
            .with_clock(edge_ref(), 0.5, 1.25);
        assert_eq!(p.clk_edge, Some(edge_ref()));
        assert_eq!(p.clk_delay_ns(), 1.75);
    }

    #[test]
    fn clone_is_deep_for_hops() {
        let table = NameTable::new();
        let original = Path::new(table.intern("ff/D"), RiseFall::Rise, MinMax::Max, 4.0)
            .with_clk_hops(vec![ClockTreeHop::new(table.intern("buf/Y"), 1.0, 1.5)]);
        let mut copy = original.clone();
        copy.arrival_ns = 9.0;
        copy.clk_hops[0].late_ns = 2.0;
        assert_eq!(original.arrival_ns, 4.0);
        assert_eq!(original.clk_hops[0].late_ns, 1.5);
    }

    #[test]
    fn path_serde_roundtrip() {
        let table = NameTable::new();
        let p = Path::new(table.intern("ff/D"), RiseFall::Rise, MinMax::Min, 0.8)
            .with_clock(edge_ref(), 0.1, 0.2)
            .with_clk_hops(vec![ClockTreeHop::new(table.intern("root"), 0.0, 0.0)]);
        let json = serde_json::to_string(&p).unwrap();
        let restored: Path = serde_json::from_str(&json).unwrap();
        assert_eq!(p, restored);
    }
}
