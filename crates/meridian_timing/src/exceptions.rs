//! Timing exception objects consumed by path-end classification.
//!
//! These are the resolved forms handed over by the exception database:
//! multicycle paths, min/max path delays, output delays, and data-to-data
//! checks. Applicability and precedence between overlapping exceptions is the
//! database's problem; a path end only ever sees the single governing
//! exception (or none), referenced by id.

use crate::check::GenericRole;
use crate::clock::{ClockEdge, ClockEdgeRef};
use crate::ids::{DataCheckId, McpId, OutputDelayId, PathDelayId};
use meridian_common::{Delay, MinMax, Name};
use serde::{Deserialize, Serialize};

/// Which check directions a multicycle-path exception applies to.
///
/// A plain `set_multicycle_path N` is a setup multiplier (hold follows it
/// through the mirror rule), so the database resolves it to `Setup`. `Both`
/// is the explicit `-setup -hold` combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppliesTo {
    /// Governs setup accounting (`-setup`, or no flag).
    Setup,
    /// Governs hold accounting (`-hold`).
    Hold,
    /// Governs both directions explicitly.
    Both,
}

impl AppliesTo {
    /// Returns `true` if this exception governs checks of the given
    /// direction.
    pub fn includes(self, role: GenericRole) -> bool {
        match self {
            AppliesTo::Setup => role == GenericRole::Setup,
            AppliesTo::Hold => role == GenericRole::Hold,
            AppliesTo::Both => true,
        }
    }
}

/// Which clock's period the multicycle multiplier is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClockBasis {
    /// Multiplier counts launch-clock periods (`-start`).
    Start,
    /// Multiplier counts capture-clock periods (`-end`).
    End,
}

/// A multicycle-path exception: the governed paths get `multiplier` clock
/// cycles instead of one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiCyclePath {
    /// The unique ID of this exception.
    pub id: McpId,
    /// Number of clock cycles allowed for data propagation.
    pub multiplier: u32,
    /// Which check directions this exception governs.
    pub applies_to: AppliesTo,
    /// Which clock's period the multiplier is counted in. The SDC defaults
    /// are end-clock for setup multipliers and start-clock for hold
    /// multipliers; the database resolves the flags into this field.
    pub basis: ClockBasis,
    /// Precedence weight assigned by the exception database; higher wins.
    pub priority: u32,
}

impl MultiCyclePath {
    /// Period, in nanoseconds, of the clock the multiplier counts.
    ///
    /// Falls back to the capture clock when the basis clock's edge is not
    /// available (an unclocked launch point).
    pub fn basis_period(&self, src_edge: Option<ClockEdge>, tgt_edge: ClockEdge) -> f64 {
        match self.basis {
            ClockBasis::Start => src_edge.map_or(tgt_edge.period_ns, |e| e.period_ns),
            ClockBasis::End => tgt_edge.period_ns,
        }
    }
}

/// A min/max path-delay exception (`set_min_delay`/`set_max_delay`): an
/// explicit delay budget that replaces the clock-derived requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathDelayException {
    /// The unique ID of this exception.
    pub id: PathDelayId,
    /// The delay budget in nanoseconds.
    pub delay_ns: f64,
    /// Whether this is a max-delay (`Max`) or min-delay (`Min`) budget.
    pub min_max: MinMax,
    /// `-ignore_clock_latency`: launch-clock latency is excluded from the
    /// measured delay.
    pub ignore_clk_latency: bool,
    /// Precedence weight assigned by the exception database; higher wins.
    pub priority: u32,
}

/// An output-delay exception (`set_output_delay`): external delay between an
/// output port and the downstream capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDelayException {
    /// The unique ID of this exception.
    pub id: OutputDelayId,
    /// The constrained output port.
    pub port: Name,
    /// The reference clock edge, used as the capture edge when the endpoint
    /// has no propagated reference-pin clock path.
    pub reference_clock: Option<ClockEdgeRef>,
    /// The external delay per corner, in nanoseconds.
    pub delay: Delay,
    /// Precedence weight assigned by the exception database; higher wins.
    pub priority: u32,
}

impl OutputDelayException {
    /// The margin contribution of this output delay for the given analysis
    /// side: the late value on the max side, the negated early value on the
    /// min side (so the generic setup-subtract/hold-add margin application
    /// tightens the check in both directions).
    pub fn margin(&self, min_max: MinMax) -> f64 {
        match min_max {
            MinMax::Max => self.delay.late(),
            MinMax::Min => -self.delay.early(),
        }
    }
}

/// A data-to-data check exception (`set_data_check`): the endpoint is
/// constrained against another data signal instead of a clock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataCheckException {
    /// The unique ID of this exception.
    pub id: DataCheckId,
    /// The related pin the endpoint is checked against.
    pub from_pin: Name,
    /// The constrained endpoint pin.
    pub to_pin: Name,
    /// Setup-direction setback in nanoseconds, if constrained.
    pub setup_margin_ns: Option<f64>,
    /// Hold-direction setback in nanoseconds, if constrained.
    pub hold_margin_ns: Option<f64>,
    /// Precedence weight assigned by the exception database; higher wins.
    pub priority: u32,
}

impl DataCheckException {
    /// The setback for the given check direction; zero when that direction
    /// is unconstrained.
    pub fn margin(&self, role: GenericRole) -> f64 {
        match role {
            GenericRole::Setup => self.setup_margin_ns.unwrap_or(0.0),
            GenericRole::Hold => self.hold_margin_ns.unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::RiseFall;
    use crate::clock::Clock;
    use crate::ids::ClockId;
    use meridian_common::NameTable;

    #[test]
    fn applies_to_includes() {
        assert!(AppliesTo::Both.includes(GenericRole::Setup));
        assert!(AppliesTo::Both.includes(GenericRole::Hold));
        assert!(AppliesTo::Setup.includes(GenericRole::Setup));
        assert!(!AppliesTo::Setup.includes(GenericRole::Hold));
        assert!(AppliesTo::Hold.includes(GenericRole::Hold));
        assert!(!AppliesTo::Hold.includes(GenericRole::Setup));
    }

    #[test]
    fn mcp_basis_period() {
        let table = NameTable::new();
        let src = Clock::new(ClockId::from_raw(0), table.intern("a"), 4.0);
        let tgt = Clock::new(ClockId::from_raw(1), table.intern("b"), 10.0);
        let mcp = MultiCyclePath {
            id: McpId::from_raw(0),
            multiplier: 2,
            applies_to: AppliesTo::Setup,
            basis: ClockBasis::End,
            priority: 0,
        };
        let s = Some(src.edge(RiseFall::Rise));
        let t = tgt.edge(RiseFall::Rise);
        assert_eq!(mcp.basis_period(s, t), 10.0);
        let start_based = MultiCyclePath {
            basis: ClockBasis::Start,
            ..mcp
        };
        assert_eq!(start_based.basis_period(s, t), 4.0);
        // No launch edge: falls back to the capture clock.
        assert_eq!(start_based.basis_period(None, t), 10.0);
    }

    #[test]
    fn output_delay_margin_signs() {
        let table = NameTable::new();
        let od = OutputDelayException {
            id: OutputDelayId::from_raw(0),
            port: table.intern("dout"),
            reference_clock: None,
            delay: Delay::new(0.5, 1.0, 2.0),
            priority: 0,
        };
        assert_eq!(od.margin(MinMax::Max), 2.0);
        assert_eq!(od.margin(MinMax::Min), -0.5);
    }

    #[test]
    fn data_check_margin_defaults_to_zero() {
        let table = NameTable::new();
        let dc = DataCheckException {
            id: DataCheckId::from_raw(0),
            from_pin: table.intern("a"),
            to_pin: table.intern("b"),
            setup_margin_ns: Some(0.7),
            hold_margin_ns: None,
            priority: 0,
        };
        assert_eq!(dc.margin(GenericRole::Setup), 0.7);
        assert_eq!(dc.margin(GenericRole::Hold), 0.0);
    }

    #[test]
    fn exceptions_serde_roundtrip() {
        let pd = PathDelayException {
            id: PathDelayId::from_raw(4),
            delay_ns: 6.0,
            min_max: MinMax::Max,
            ignore_clk_latency: true,
            priority: 3,
        };
        let json = serde_json::to_string(&pd).unwrap();
        let restored: PathDelayException = serde_json::from_str(&json).unwrap();
        assert_eq!(pd, restored);
    }
}
