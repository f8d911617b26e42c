//! The read-only analysis context a path end computes against.
//!
//! [`AnalysisContext`] owns the long-lived tables every path end borrows
//! into by id: clock definitions, check arcs, and the resolved exception
//! objects. It also carries the analysis knobs (active corner, CRPR enable)
//! and the cross-clock settings that do not belong to any single object
//! (inter-clock uncertainty, latch borrow limits, the resolved
//! multicycle-path answers per endpoint).
//!
//! The context is populated once by the surrounding tool, validated, and
//! then shared immutably across however many path ends the search produces.

use crate::check::{GenericRole, TimingArc};
use crate::clock::{Clock, ClockEdge, ClockEdgeRef};
use crate::exceptions::{
    DataCheckException, MultiCyclePath, OutputDelayException, PathDelayException,
};
use crate::ids::{ArcId, ClockId, DataCheckId, McpId, OutputDelayId, PathDelayId};
use meridian_common::{Corner, InternalError, MeridianResult, Name};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Analysis knobs consumed by path-end math.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// The corner used when a single value is needed from a corner triple
    /// (check margins, defined insertion delays).
    pub corner: Corner,
    /// Whether common-path pessimism removal is applied. When disabled,
    /// `crpr()` is zero everywhere and memos are never forced.
    pub crpr_enabled: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            corner: Corner::Max,
            crpr_enabled: true,
        }
    }
}

/// Clock, arc, and exception tables plus analysis options.
#[derive(Debug, Default)]
pub struct AnalysisContext {
    /// Analysis knobs.
    pub options: AnalysisOptions,
    clocks: Vec<Clock>,
    arcs: Vec<TimingArc>,
    mcps: Vec<MultiCyclePath>,
    path_delays: Vec<PathDelayException>,
    output_delays: Vec<OutputDelayException>,
    data_checks: Vec<DataCheckException>,
    inter_clk_uncertainty: HashMap<(ClockId, ClockId, GenericRole), f64>,
    resolved_mcps: HashMap<(Name, GenericRole), McpId>,
    borrow_limits_pin: HashMap<Name, f64>,
    borrow_limits_clock: HashMap<ClockId, f64>,
}

impl AnalysisContext {
    /// Creates an empty context with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a clock definition with a default waveform and returns its id.
    /// Waveform, insertion, and uncertainty are applied via [`clock_mut`](Self::clock_mut)
    /// while the context is being populated.
    pub fn add_clock(&mut self, name: Name, period_ns: f64) -> ClockId {
        let id = ClockId::from_raw(self.clocks.len() as u32);
        self.clocks.push(Clock::new(id, name, period_ns));
        id
    }

    /// Returns the clock with the given id.
    pub fn clock(&self, id: ClockId) -> &Clock {
        &self.clocks[id.as_raw() as usize]
    }

    /// Mutable access to a clock, for constraint application while the
    /// context is still being populated.
    pub fn clock_mut(&mut self, id: ClockId) -> &mut Clock {
        &mut self.clocks[id.as_raw() as usize]
    }

    /// Resolves a clock-edge reference into the edge value.
    pub fn edge(&self, edge: ClockEdgeRef) -> ClockEdge {
        self.clock(edge.clock).edge(edge.rf)
    }

    /// Adds a timing-check arc and returns its id.
    pub fn add_arc(&mut self, mut arc: TimingArc) -> ArcId {
        let id = ArcId::from_raw(self.arcs.len() as u32);
        arc.id = id;
        self.arcs.push(arc);
        id
    }

    /// Returns the check arc with the given id.
    pub fn arc(&self, id: ArcId) -> &TimingArc {
        &self.arcs[id.as_raw() as usize]
    }

    /// Adds a multicycle-path exception and returns its id.
    pub fn add_mcp(&mut self, mut mcp: MultiCyclePath) -> McpId {
        let id = McpId::from_raw(self.mcps.len() as u32);
        mcp.id = id;
        self.mcps.push(mcp);
        id
    }

    /// Returns the multicycle-path exception with the given id.
    pub fn mcp(&self, id: McpId) -> &MultiCyclePath {
        &self.mcps[id.as_raw() as usize]
    }

    /// Adds a path-delay exception and returns its id.
    pub fn add_path_delay(&mut self, mut pd: PathDelayException) -> PathDelayId {
        let id = PathDelayId::from_raw(self.path_delays.len() as u32);
        pd.id = id;
        self.path_delays.push(pd);
        id
    }

    /// Returns the path-delay exception with the given id.
    pub fn path_delay(&self, id: PathDelayId) -> &PathDelayException {
        &self.path_delays[id.as_raw() as usize]
    }

    /// Adds an output-delay exception and returns its id.
    pub fn add_output_delay(&mut self, mut od: OutputDelayException) -> OutputDelayId {
        let id = OutputDelayId::from_raw(self.output_delays.len() as u32);
        od.id = id;
        self.output_delays.push(od);
        id
    }

    /// Returns the output-delay exception with the given id.
    pub fn output_delay(&self, id: OutputDelayId) -> &OutputDelayException {
        &self.output_delays[id.as_raw() as usize]
    }

    /// Adds a data-check exception and returns its id.
    pub fn add_data_check(&mut self, mut dc: DataCheckException) -> DataCheckId {
        let id = DataCheckId::from_raw(self.data_checks.len() as u32);
        dc.id = id;
        self.data_checks.push(dc);
        id
    }

    /// Returns the data-check exception with the given id.
    pub fn data_check(&self, id: DataCheckId) -> &DataCheckException {
        &self.data_checks[id.as_raw() as usize]
    }

    /// Sets the inter-clock uncertainty between two distinct clocks for one
    /// check direction.
    pub fn set_inter_clk_uncertainty(
        &mut self,
        src: ClockId,
        tgt: ClockId,
        role: GenericRole,
        uncertainty_ns: f64,
    ) {
        self.inter_clk_uncertainty
            .insert((src, tgt, role), uncertainty_ns);
    }

    /// Inter-clock uncertainty between two clocks for one check direction.
    /// `None` means no inter-clock uncertainty is configured, which is
    /// distinct from an explicit zero.
    pub fn inter_clk_uncertainty(
        &self,
        src: ClockId,
        tgt: ClockId,
        role: GenericRole,
    ) -> Option<f64> {
        self.inter_clk_uncertainty.get(&(src, tgt, role)).copied()
    }

    /// Records the exception database's resolved multicycle-path answer for
    /// an endpoint and check direction.
    pub fn set_resolved_mcp(&mut self, endpoint: Name, role: GenericRole, mcp: McpId) {
        self.resolved_mcps.insert((endpoint, role), mcp);
    }

    /// The governing multicycle-path exception for an endpoint and check
    /// direction, as resolved by the exception database.
    pub fn multicycle_path_for(&self, endpoint: Name, role: GenericRole) -> Option<&MultiCyclePath> {
        self.resolved_mcps
            .get(&(endpoint, role))
            .map(|id| self.mcp(*id))
    }

    /// Sets an explicit latch borrow limit on a pin (`set_max_time_borrow`
    /// on a pin). Pin scope wins over clock scope.
    pub fn set_borrow_limit_pin(&mut self, pin: Name, limit_ns: f64) {
        self.borrow_limits_pin.insert(pin, limit_ns);
    }

    /// Sets an explicit latch borrow limit on every latch clocked by the
    /// given clock.
    pub fn set_borrow_limit_clock(&mut self, clock: ClockId, limit_ns: f64) {
        self.borrow_limits_clock.insert(clock, limit_ns);
    }

    /// The explicit borrow limit governing a latch endpoint, if any: the pin
    /// scope wins, then the enable clock scope.
    pub fn borrow_limit(&self, pin: Name, enable_clock: Option<ClockId>) -> Option<f64> {
        self.borrow_limits_pin.get(&pin).copied().or_else(|| {
            enable_clock.and_then(|clk| self.borrow_limits_clock.get(&clk).copied())
        })
    }

    /// Checks cross-table referential integrity.
    ///
    /// Every id stored inside an exception or lookup table must resolve, and
    /// every clock must have a positive period with its waveform inside the
    /// period. Callers run this once after populating the context; path ends
    /// assume a validated context and never re-check.
    pub fn validate(&self) -> MeridianResult<()> {
        for clock in &self.clocks {
            if clock.period_ns <= 0.0 {
                return Err(InternalError::new(format!(
                    "clock id {} has non-positive period {}",
                    clock.id.as_raw(),
                    clock.period_ns
                )));
            }
            if let Some((rise, fall)) = clock.waveform {
                if !(0.0..clock.period_ns).contains(&rise) || !(0.0..clock.period_ns).contains(&fall)
                {
                    return Err(InternalError::new(format!(
                        "clock id {} waveform ({rise}, {fall}) outside period {}",
                        clock.id.as_raw(),
                        clock.period_ns
                    )));
                }
            }
        }
        for od in &self.output_delays {
            if let Some(edge) = od.reference_clock {
                self.check_clock_id(edge.clock, "output delay reference clock")?;
            }
        }
        for (src, tgt, _) in self.inter_clk_uncertainty.keys() {
            self.check_clock_id(*src, "inter-clock uncertainty source")?;
            self.check_clock_id(*tgt, "inter-clock uncertainty target")?;
        }
        for mcp_id in self.resolved_mcps.values() {
            if mcp_id.as_raw() as usize >= self.mcps.len() {
                return Err(InternalError::new(format!(
                    "resolved multicycle path references unknown exception id {}",
                    mcp_id.as_raw()
                )));
            }
        }
        for clk in self.borrow_limits_clock.keys() {
            self.check_clock_id(*clk, "borrow limit clock")?;
        }
        for dc in &self.data_checks {
            if dc.setup_margin_ns.is_none() && dc.hold_margin_ns.is_none() {
                return Err(InternalError::new(format!(
                    "data check id {} constrains neither direction",
                    dc.id.as_raw()
                )));
            }
        }
        Ok(())
    }

    fn check_clock_id(&self, id: ClockId, what: &str) -> MeridianResult<()> {
        if id.as_raw() as usize >= self.clocks.len() {
            return Err(InternalError::new(format!(
                "{what} references unknown clock id {}",
                id.as_raw()
            )));
        }
        Ok(())
    }
}
