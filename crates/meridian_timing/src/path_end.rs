//! Path-end taxonomy: classification of a timing path's terminating
//! constraint and the derived required-time/margin/slack contract.
//!
//! A path end wraps exactly one realized [`Path`] and the references that
//! bind it to its constraint: a capture clock path, a check arc, an
//! exception. The variant set is closed — seven kinds, three shared layers —
//! so comparator and report logic can match exhaustively:
//!
//! - [`PathEnd::Unconstrained`] — no constraint; infinite slack.
//! - [`PathEnd::Check`] — register setup/hold (and recovery/removal).
//! - [`PathEnd::LatchCheck`] — level-sensitive latch with time borrowing.
//! - [`PathEnd::OutputDelay`] — output port against an external delay.
//! - [`PathEnd::GatedClock`] — clock-gate enable check.
//! - [`PathEnd::DataCheck`] — data-to-data setback, no implicit clock cycle.
//! - [`PathEnd::PathDelay`] — explicit min/max delay budget.
//!
//! Every accessor is a pure function of the bound inputs plus the analysis
//! context; the only mutable state is the per-instance CRPR memo.

use crate::check::{GenericRole, RiseFall, TimingRole};
use crate::clock::{cycle_accting, ClockEdge, CycleAccting};
use crate::context::AnalysisContext;
use crate::crpr::{find_crpr, Memoized};
use crate::exceptions::MultiCyclePath;
use crate::ids::{ArcId, DataCheckId, EdgeId, McpId, OutputDelayId, PathDelayId};
use crate::latch;
use crate::path::Path;
use meridian_common::{EarlyLate, MinMax, Name};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The seven-way classification of a path end's terminating constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PathEndType {
    /// No constraint terminates the path.
    Unconstrained,
    /// A register setup/hold (or recovery/removal) check.
    Check,
    /// A data-to-data check.
    DataCheck,
    /// A level-sensitive latch check with borrowing.
    LatchCheck,
    /// An output-delay constraint at a port.
    OutputDelay,
    /// A clock-gating check at a gate enable.
    GatedClock,
    /// An explicit min/max path-delay exception.
    PathDelay,
}

impl PathEndType {
    /// The report name of this type.
    pub fn name(self) -> &'static str {
        match self {
            PathEndType::Unconstrained => "unconstrained",
            PathEndType::Check => "check",
            PathEndType::DataCheck => "data check",
            PathEndType::LatchCheck => "latch check",
            PathEndType::OutputDelay => "output delay",
            PathEndType::GatedClock => "gated clock",
            PathEndType::PathDelay => "path delay",
        }
    }
}

/// State shared by every clock-constrained variant: the data path, the
/// capture clock path, and the CRPR memo.
#[derive(Debug, Clone)]
pub struct ClkBase {
    /// The constrained data path.
    pub path: Path,
    /// The path of the edge that captures/qualifies the data path.
    pub clk_path: Path,
    crpr: Memoized<f64>,
}

impl ClkBase {
    fn new(path: Path, clk_path: Path, precomputed_crpr: Option<f64>) -> Self {
        Self {
            path,
            clk_path,
            crpr: match precomputed_crpr {
                Some(value) => Memoized::with_value(value),
                None => Memoized::new(),
            },
        }
    }

    /// Raw memoized pessimism between the data path's launch clock and the
    /// capture clock path. Zero when CRPR is disabled; the memo is only
    /// forced when CRPR is active.
    fn crpr(&self, ctx: &AnalysisContext) -> f64 {
        if !ctx.options.crpr_enabled {
            return 0.0;
        }
        *self.crpr.force(|| find_crpr(&self.path, &self.clk_path))
    }
}

/// Clock-constrained state plus the multicycle-path exception binding shared
/// by the check-like variants.
#[derive(Debug, Clone)]
pub struct McpBase {
    /// The clock-constrained layer.
    pub clk: ClkBase,
    /// The governing multicycle-path exception, if any. `None` means the
    /// default single-cycle accounting.
    pub mcp: Option<McpId>,
}

/// Payload of [`PathEnd::Unconstrained`].
#[derive(Debug, Clone)]
pub struct UnconstrainedEnd {
    /// The unconstrained path.
    pub path: Path,
}

/// Payload of [`PathEnd::Check`].
#[derive(Debug, Clone)]
pub struct CheckEnd {
    /// Clock- and MCP-constrained layers.
    pub base: McpBase,
    /// The cell-model check arc at the endpoint.
    pub check_arc: ArcId,
    /// The graph edge carrying the check arc.
    pub check_edge: EdgeId,
}

/// Payload of [`PathEnd::LatchCheck`]. The capture "clock path" of the base
/// is the latch enable (open) edge; `disable_path` is the close edge.
#[derive(Debug, Clone)]
pub struct LatchEnd {
    /// The underlying check structure (base clock path = latch enable).
    pub check: CheckEnd,
    /// The latch disable (close) edge path.
    pub disable_path: Path,
    /// A governing path-delay exception, if one applies.
    pub path_delay: Option<PathDelayId>,
    /// Cached launch-clock arrival, for ignore-clock-latency accounting.
    pub src_clk_arrival_ns: f64,
}

/// Payload of [`PathEnd::OutputDelay`].
#[derive(Debug, Clone)]
pub struct OutputDelayEnd {
    /// Clock- and MCP-constrained layers.
    pub base: McpBase,
    /// The output-delay exception at the port.
    pub output_delay: OutputDelayId,
}

/// Payload of [`PathEnd::GatedClock`]. The margin and role are fixed when
/// the path end is built, not re-derived per query.
#[derive(Debug, Clone)]
pub struct GatedClockEnd {
    /// Clock- and MCP-constrained layers.
    pub base: McpBase,
    /// The gating check's role, bound at construction.
    pub check_role: TimingRole,
    /// The gating check's precomputed margin, bound at construction.
    pub margin_ns: f64,
}

/// Payload of [`PathEnd::DataCheck`]. The base clock path is the clock
/// launching the related signal; `data_clk_path` is the related signal's own
/// path, whose arrival acts as the capture reference.
#[derive(Debug, Clone)]
pub struct DataCheckEnd {
    /// Clock- and MCP-constrained layers.
    pub base: McpBase,
    /// The data-check exception.
    pub check: DataCheckId,
    /// The related signal's path (the "data clock").
    pub data_clk_path: Path,
}

/// Payload of [`PathEnd::PathDelay`]. The clock path is optional: a min/max
/// delay may terminate at an unclocked pin, at a timing check, or at an
/// output port with an output delay.
#[derive(Debug, Clone)]
pub struct PathDelayEnd {
    /// The constrained path.
    pub path: Path,
    /// The capture clock path, when the delay ends at a timing check.
    pub clk_path: Option<Path>,
    crpr: Memoized<f64>,
    /// The governing path-delay exception.
    pub path_delay: PathDelayId,
    /// The check arc, when the delay ends at a timing check.
    pub check_arc: Option<ArcId>,
    /// The graph edge carrying the check arc.
    pub check_edge: Option<EdgeId>,
    /// The output delay, when the delay ends at a constrained output port.
    pub output_delay: Option<OutputDelayId>,
    /// Cached launch-clock arrival, for ignore-clock-latency accounting.
    pub src_clk_arrival_ns: f64,
}

/// A search endpoint bound to its terminating constraint.
#[derive(Debug, Clone)]
pub enum PathEnd {
    /// No constraint terminates the path.
    Unconstrained(UnconstrainedEnd),
    /// A register setup/hold (or recovery/removal) check.
    Check(CheckEnd),
    /// A level-sensitive latch check with borrowing.
    LatchCheck(LatchEnd),
    /// An output-delay constraint at a port.
    OutputDelay(OutputDelayEnd),
    /// A clock-gating check at a gate enable.
    GatedClock(GatedClockEnd),
    /// A data-to-data check.
    DataCheck(DataCheckEnd),
    /// An explicit min/max path-delay exception.
    PathDelay(PathDelayEnd),
}

/// Resolves the launch-clock arrival of a path: the launch edge's nominal
/// time plus the path's clock insertion and latency. Zero for unclocked
/// paths.
pub fn find_src_clk_arrival(path: &Path, ctx: &AnalysisContext) -> f64 {
    match path.clk_edge {
        Some(edge) => ctx.edge(edge).time_ns + path.clk_delay_ns(),
        None => 0.0,
    }
}

impl PathEnd {
    /// Builds an unconstrained path end.
    pub fn unconstrained(path: Path) -> Self {
        PathEnd::Unconstrained(UnconstrainedEnd { path })
    }

    /// Builds a path end constrained by a timing check. A precomputed CRPR
    /// value may be supplied; otherwise it is computed lazily on first use.
    pub fn check(
        path: Path,
        check_arc: ArcId,
        check_edge: EdgeId,
        clk_path: Path,
        mcp: Option<McpId>,
        precomputed_crpr: Option<f64>,
    ) -> Self {
        PathEnd::Check(CheckEnd {
            base: McpBase {
                clk: ClkBase::new(path, clk_path, precomputed_crpr),
                mcp,
            },
            check_arc,
            check_edge,
        })
    }

    /// Builds a latch check. The `clk_path` is the latch enable (open) edge
    /// and `disable_path` is the close edge. The launch-clock arrival is
    /// resolved and cached here for ignore-clock-latency accounting.
    #[allow(clippy::too_many_arguments)]
    pub fn latch_check(
        path: Path,
        check_arc: ArcId,
        check_edge: EdgeId,
        clk_path: Path,
        disable_path: Path,
        mcp: Option<McpId>,
        path_delay: Option<PathDelayId>,
        precomputed_crpr: Option<f64>,
        ctx: &AnalysisContext,
    ) -> Self {
        let src_clk_arrival_ns = find_src_clk_arrival(&path, ctx);
        PathEnd::LatchCheck(LatchEnd {
            check: CheckEnd {
                base: McpBase {
                    clk: ClkBase::new(path, clk_path, precomputed_crpr),
                    mcp,
                },
                check_arc,
                check_edge,
            },
            disable_path,
            path_delay,
            src_clk_arrival_ns,
        })
    }

    /// Builds a path end constrained by an output delay. The `clk_path` is
    /// the capture (or reference-pin) clock path.
    pub fn output_delay(
        output_delay: OutputDelayId,
        path: Path,
        clk_path: Path,
        mcp: Option<McpId>,
        precomputed_crpr: Option<f64>,
    ) -> Self {
        PathEnd::OutputDelay(OutputDelayEnd {
            base: McpBase {
                clk: ClkBase::new(path, clk_path, precomputed_crpr),
                mcp,
            },
            output_delay,
        })
    }

    /// Builds a clock-gating check. The margin is a single precomputed
    /// arc-delay value fixed here, not recomputed per query.
    pub fn gated_clock(
        gating_ref: Path,
        clk_path: Path,
        check_role: TimingRole,
        mcp: Option<McpId>,
        margin_ns: f64,
        precomputed_crpr: Option<f64>,
    ) -> Self {
        PathEnd::GatedClock(GatedClockEnd {
            base: McpBase {
                clk: ClkBase::new(gating_ref, clk_path, precomputed_crpr),
                mcp,
            },
            check_role,
            margin_ns,
        })
    }

    /// Builds a data-to-data check. `data_clk_path` is the related signal's
    /// path; `clk_path` is the clock path launching that signal.
    pub fn data_check(
        check: DataCheckId,
        data_path: Path,
        data_clk_path: Path,
        clk_path: Path,
        mcp: Option<McpId>,
        precomputed_crpr: Option<f64>,
    ) -> Self {
        PathEnd::DataCheck(DataCheckEnd {
            base: McpBase {
                clk: ClkBase::new(data_path, clk_path, precomputed_crpr),
                mcp,
            },
            check,
            data_clk_path,
        })
    }

    /// Builds a path end governed by a min/max delay exception. All three
    /// forms use this constructor: vanilla (no clock, no check), delay to a
    /// timing check (`clk_path` + `check_arc`), and delay to a constrained
    /// output (`output_delay`).
    #[allow(clippy::too_many_arguments)]
    pub fn path_delay_end(
        path_delay: PathDelayId,
        path: Path,
        clk_path: Option<Path>,
        check_arc: Option<ArcId>,
        check_edge: Option<EdgeId>,
        output_delay: Option<OutputDelayId>,
        precomputed_crpr: Option<f64>,
        ctx: &AnalysisContext,
    ) -> Self {
        let src_clk_arrival_ns = find_src_clk_arrival(&path, ctx);
        PathEnd::PathDelay(PathDelayEnd {
            path,
            clk_path,
            crpr: match precomputed_crpr {
                Some(value) => Memoized::with_value(value),
                None => Memoized::new(),
            },
            path_delay,
            check_arc,
            check_edge,
            output_delay,
            src_clk_arrival_ns,
        })
    }

    // ---------------------------------------------------------------
    // Structure accessors.

    /// The constrained path.
    pub fn path(&self) -> &Path {
        match self {
            PathEnd::Unconstrained(e) => &e.path,
            PathEnd::Check(e) => &e.base.clk.path,
            PathEnd::LatchCheck(e) => &e.check.base.clk.path,
            PathEnd::OutputDelay(e) => &e.base.clk.path,
            PathEnd::GatedClock(e) => &e.base.clk.path,
            PathEnd::DataCheck(e) => &e.base.clk.path,
            PathEnd::PathDelay(e) => &e.path,
        }
    }

    /// Replaces the constrained path. The CRPR memo is not touched: the
    /// cache is only valid once the owning path's data is final, and callers
    /// replacing paths before that point have never forced it.
    pub fn set_path(&mut self, path: Path) {
        match self {
            PathEnd::Unconstrained(e) => e.path = path,
            PathEnd::Check(e) => e.base.clk.path = path,
            PathEnd::LatchCheck(e) => e.check.base.clk.path = path,
            PathEnd::OutputDelay(e) => e.base.clk.path = path,
            PathEnd::GatedClock(e) => e.base.clk.path = path,
            PathEnd::DataCheck(e) => e.base.clk.path = path,
            PathEnd::PathDelay(e) => e.path = path,
        }
    }

    /// The endpoint pin.
    pub fn pin(&self) -> Name {
        self.path().pin
    }

    /// The transition sense at the endpoint.
    pub fn transition(&self) -> RiseFall {
        self.path().transition
    }

    /// The analysis side of the constrained path.
    pub fn min_max(&self) -> MinMax {
        self.path().min_max
    }

    /// The type tag of this path end.
    pub fn type_of(&self) -> PathEndType {
        match self {
            PathEnd::Unconstrained(_) => PathEndType::Unconstrained,
            PathEnd::Check(_) => PathEndType::Check,
            PathEnd::LatchCheck(_) => PathEndType::LatchCheck,
            PathEnd::OutputDelay(_) => PathEndType::OutputDelay,
            PathEnd::GatedClock(_) => PathEndType::GatedClock,
            PathEnd::DataCheck(_) => PathEndType::DataCheck,
            PathEnd::PathDelay(_) => PathEndType::PathDelay,
        }
    }

    /// The report name of this path end's type.
    pub fn type_name(&self) -> &'static str {
        self.type_of().name()
    }

    /// Is this an unconstrained path end?
    pub fn is_unconstrained(&self) -> bool {
        matches!(self, PathEnd::Unconstrained(_))
    }

    /// Is this a register check path end?
    pub fn is_check(&self) -> bool {
        matches!(self, PathEnd::Check(_))
    }

    /// Is this a latch check path end?
    pub fn is_latch_check(&self) -> bool {
        matches!(self, PathEnd::LatchCheck(_))
    }

    /// Is this an output-delay path end?
    pub fn is_output_delay(&self) -> bool {
        matches!(self, PathEnd::OutputDelay(_))
    }

    /// Is this a gated-clock path end?
    pub fn is_gated_clock(&self) -> bool {
        matches!(self, PathEnd::GatedClock(_))
    }

    /// Is this a data-check path end?
    pub fn is_data_check(&self) -> bool {
        matches!(self, PathEnd::DataCheck(_))
    }

    /// Is this a path-delay path end?
    pub fn is_path_delay(&self) -> bool {
        matches!(self, PathEnd::PathDelay(_))
    }

    fn clk_base(&self) -> Option<&ClkBase> {
        match self {
            PathEnd::Check(e) => Some(&e.base.clk),
            PathEnd::LatchCheck(e) => Some(&e.check.base.clk),
            PathEnd::OutputDelay(e) => Some(&e.base.clk),
            PathEnd::GatedClock(e) => Some(&e.base.clk),
            PathEnd::DataCheck(e) => Some(&e.base.clk),
            _ => None,
        }
    }

    fn mcp_base(&self) -> Option<&McpBase> {
        match self {
            PathEnd::Check(e) => Some(&e.base),
            PathEnd::LatchCheck(e) => Some(&e.check.base),
            PathEnd::OutputDelay(e) => Some(&e.base),
            PathEnd::GatedClock(e) => Some(&e.base),
            PathEnd::DataCheck(e) => Some(&e.base),
            _ => None,
        }
    }

    /// The capture clock path, when one exists.
    pub fn target_clk_path(&self) -> Option<&Path> {
        match self {
            PathEnd::PathDelay(e) => e.clk_path.as_ref(),
            _ => self.clk_base().map(|b| &b.clk_path),
        }
    }

    /// The related data path of a data check.
    pub fn data_clk_path(&self) -> Option<&Path> {
        match self {
            PathEnd::DataCheck(e) => Some(&e.data_clk_path),
            _ => None,
        }
    }

    /// The latch disable (close) edge path of a latch check.
    pub fn latch_disable(&self) -> Option<&Path> {
        match self {
            PathEnd::LatchCheck(e) => Some(&e.disable_path),
            _ => None,
        }
    }

    /// The check arc at the endpoint, when one exists.
    pub fn check_arc(&self) -> Option<ArcId> {
        match self {
            PathEnd::Check(e) => Some(e.check_arc),
            PathEnd::LatchCheck(e) => Some(e.check.check_arc),
            PathEnd::PathDelay(e) => e.check_arc,
            _ => None,
        }
    }

    /// The governing multicycle-path exception, when one is bound.
    pub fn multi_cycle_path(&self) -> Option<McpId> {
        self.mcp_base().and_then(|b| b.mcp)
    }

    /// The governing path-delay exception, when one exists.
    pub fn path_delay(&self) -> Option<PathDelayId> {
        match self {
            PathEnd::LatchCheck(e) => e.path_delay,
            PathEnd::PathDelay(e) => Some(e.path_delay),
            _ => None,
        }
    }

    /// Does a path-delay end terminate at a constrained output?
    pub fn has_output_delay(&self) -> bool {
        matches!(self, PathEnd::PathDelay(e) if e.output_delay.is_some())
    }

    /// True when the governing margin comes from a user delay budget or
    /// output delay rather than an intrinsic cell check arc.
    pub fn path_delay_margin_is_external(&self) -> bool {
        matches!(self, PathEnd::PathDelay(e) if e.check_arc.is_none())
    }

    /// Default cycle count for setup accounting: one for ordinary checks,
    /// zero for data checks (no implicit clock cycle).
    pub fn setup_default_cycles(&self) -> u32 {
        match self {
            PathEnd::DataCheck(_) => 0,
            _ => 1,
        }
    }

    // ---------------------------------------------------------------
    // Clock relationships.

    /// The launch clock edge of the constrained path.
    pub fn source_clk_edge(&self, ctx: &AnalysisContext) -> Option<ClockEdge> {
        self.path().clk_edge.map(|e| ctx.edge(e))
    }

    /// The capture clock edge.
    pub fn target_clk_edge(&self, ctx: &AnalysisContext) -> Option<ClockEdge> {
        match self {
            PathEnd::OutputDelay(e) => e
                .base
                .clk
                .clk_path
                .clk_edge
                .or(ctx.output_delay(e.output_delay).reference_clock)
                .map(|r| ctx.edge(r)),
            _ => self
                .target_clk_path()
                .and_then(|p| p.clk_edge)
                .map(|r| ctx.edge(r)),
        }
    }

    /// The capture clock, when one exists.
    pub fn target_clk<'a>(&self, ctx: &'a AnalysisContext) -> Option<&'a crate::clock::Clock> {
        self.target_clk_edge(ctx).map(|e| ctx.clock(e.clock))
    }

    /// The capture clock's id, when one exists.
    pub fn target_clk_id(&self, ctx: &AnalysisContext) -> Option<crate::ids::ClockId> {
        self.target_clk_edge(ctx).map(|e| e.clock)
    }

    /// The transition sense of the capture clock at the endpoint.
    pub fn target_clk_end_trans(&self, ctx: &AnalysisContext) -> Option<RiseFall> {
        match self.target_clk_path() {
            Some(p) => Some(p.transition),
            None => self.target_clk_edge(ctx).map(|e| e.rf),
        }
    }

    /// True when a governing path-delay exception excludes launch-clock
    /// latency from the measured delay.
    pub fn ignore_clk_latency(&self, ctx: &AnalysisContext) -> bool {
        match self.path_delay() {
            Some(id) => ctx.path_delay(id).ignore_clk_latency,
            None => false,
        }
    }

    fn accting(&self, ctx: &AnalysisContext) -> Option<CycleAccting> {
        let src = self.source_clk_edge(ctx)?;
        let tgt = self.target_clk_edge(ctx)?;
        Some(cycle_accting(src, tgt))
    }

    // ---------------------------------------------------------------
    // Source clock quantities.

    /// Propagated launch clock-tree latency; zero under ignore-clock-latency.
    pub fn source_clk_latency(&self, ctx: &AnalysisContext) -> f64 {
        if self.ignore_clk_latency(ctx) {
            0.0
        } else {
            self.path().clk_latency_ns
        }
    }

    /// Defined launch clock insertion delay; zero under
    /// ignore-clock-latency.
    pub fn source_clk_insertion_delay(&self, ctx: &AnalysisContext) -> f64 {
        if self.ignore_clk_latency(ctx) {
            0.0
        } else {
            self.path().clk_insertion_ns
        }
    }

    fn source_clk_delay(&self, ctx: &AnalysisContext) -> f64 {
        self.source_clk_insertion_delay(ctx) + self.source_clk_latency(ctx)
    }

    /// Time offset for the path start so the path begins in the source cycle
    /// its governing edge pairing expects.
    pub fn source_clk_offset(&self, ctx: &AnalysisContext) -> f64 {
        match self {
            PathEnd::Unconstrained(_) => 0.0,
            PathEnd::PathDelay(e) => path_delay_src_clk_offset(
                ctx.path_delay(e.path_delay).ignore_clk_latency,
                e.src_clk_arrival_ns,
            ),
            PathEnd::LatchCheck(e) if self.ignore_clk_latency(ctx) => {
                path_delay_src_clk_offset(true, e.src_clk_arrival_ns)
            }
            _ => match (self.accting(ctx), self.check_generic_role(ctx)) {
                (Some(acct), Some(role)) => acct.source_time_offset(role),
                _ => 0.0,
            },
        }
    }

    // ---------------------------------------------------------------
    // Arrival.

    /// Arrival at the endpoint, in the normalized launch-occurrence frame.
    pub fn data_arrival_time(&self, _ctx: &AnalysisContext) -> f64 {
        self.path().arrival_ns
    }

    /// Arrival advanced by the source clock offset, for reporting in the
    /// absolute frame.
    pub fn data_arrival_time_offset(&self, ctx: &AnalysisContext) -> f64 {
        self.data_arrival_time(ctx) + self.source_clk_offset(ctx)
    }

    // ---------------------------------------------------------------
    // Check role and margin.

    /// The specific kind of check constraining this path end.
    pub fn check_role(&self, ctx: &AnalysisContext) -> Option<TimingRole> {
        match self {
            PathEnd::Unconstrained(_) => None,
            PathEnd::Check(e) => Some(ctx.arc(e.check_arc).role),
            PathEnd::LatchCheck(e) => Some(ctx.arc(e.check.check_arc).role),
            PathEnd::OutputDelay(_) => Some(match self.min_max() {
                MinMax::Max => TimingRole::OutputSetup,
                MinMax::Min => TimingRole::OutputHold,
            }),
            PathEnd::GatedClock(e) => Some(e.check_role),
            PathEnd::DataCheck(_) => Some(match self.min_max() {
                MinMax::Max => TimingRole::DataSetup,
                MinMax::Min => TimingRole::DataHold,
            }),
            PathEnd::PathDelay(e) => Some(match e.check_arc {
                Some(arc) => ctx.arc(arc).role,
                None => match self.min_max() {
                    MinMax::Max => TimingRole::Setup,
                    MinMax::Min => TimingRole::Hold,
                },
            }),
        }
    }

    /// The generic setup/hold direction of the constraining check.
    pub fn check_generic_role(&self, ctx: &AnalysisContext) -> Option<GenericRole> {
        self.check_role(ctx).map(TimingRole::generic)
    }

    /// The slack-contributing margin of the constraining check.
    pub fn margin(&self, ctx: &AnalysisContext) -> f64 {
        let corner = ctx.options.corner;
        match self {
            PathEnd::Unconstrained(_) => 0.0,
            PathEnd::Check(e) => {
                ctx.arc(e.check_arc).margin_at(corner) + self.macro_clk_tree_delay(ctx)
            }
            PathEnd::LatchCheck(e) => {
                ctx.arc(e.check.check_arc).margin_at(corner) + self.macro_clk_tree_delay(ctx)
            }
            PathEnd::OutputDelay(e) => ctx.output_delay(e.output_delay).margin(self.min_max()),
            PathEnd::GatedClock(e) => e.margin_ns,
            PathEnd::DataCheck(e) => {
                let role = self.check_generic_role(ctx).unwrap_or(GenericRole::Setup);
                ctx.data_check(e.check).margin(role)
            }
            PathEnd::PathDelay(e) => match (e.check_arc, e.output_delay) {
                (Some(arc), _) => ctx.arc(arc).margin_at(corner),
                (None, Some(od)) => ctx.output_delay(od).margin(self.min_max()),
                (None, None) => 0.0,
            },
        }
    }

    /// Extra clock-tree delay inside a timing-macro abstraction, folded into
    /// the check margin. Zero for endpoints outside macros.
    pub fn macro_clk_tree_delay(&self, ctx: &AnalysisContext) -> f64 {
        match self.check_arc() {
            Some(arc) if !self.is_path_delay() => ctx.arc(arc).macro_clk_tree_delay_ns,
            _ => 0.0,
        }
    }

    // ---------------------------------------------------------------
    // Target clock quantities.

    /// Multicycle-path adjustment folded into the capture-time offset:
    /// additional whole periods granted (setup) or capture-edge displacement
    /// (hold).
    pub fn target_clk_mcp_adjustment(&self, ctx: &AnalysisContext) -> f64 {
        let Some(base) = self.mcp_base() else {
            return 0.0;
        };
        let Some(tgt) = self.target_clk_edge(ctx) else {
            return 0.0;
        };
        let src = self.source_clk_edge(ctx);
        match self.check_generic_role(ctx) {
            Some(GenericRole::Setup) => {
                let mcp = base.mcp.map(|id| ctx.mcp(id));
                check_setup_mcp_adjustment(src, tgt, mcp, self.setup_default_cycles())
            }
            Some(GenericRole::Hold) => {
                let (setup_mcp, hold_mcp) = self.find_hold_mcps(ctx);
                check_hold_mcp_adjustment(src, tgt, setup_mcp, hold_mcp)
            }
            None => 0.0,
        }
    }

    /// Resolves the governing multicycle-path exceptions separately for
    /// setup and for hold, as hold accounting needs both: an explicit hold
    /// MCP displaces the capture edge directly, while a lone setup MCP
    /// mirrors onto hold minus one cycle.
    fn find_hold_mcps<'a>(
        &self,
        ctx: &'a AnalysisContext,
    ) -> (Option<&'a MultiCyclePath>, Option<&'a MultiCyclePath>) {
        let Some(base) = self.mcp_base() else {
            return (None, None);
        };
        let pin = self.pin();
        match base.mcp.map(|id| ctx.mcp(id)) {
            Some(mcp) if mcp.applies_to.includes(GenericRole::Hold) => {
                let setup_mcp = if mcp.applies_to.includes(GenericRole::Setup) {
                    Some(mcp)
                } else {
                    ctx.multicycle_path_for(pin, GenericRole::Setup)
                        .filter(|m| m.applies_to.includes(GenericRole::Setup))
                };
                (setup_mcp, Some(mcp))
            }
            Some(mcp) => {
                let hold_mcp = ctx
                    .multicycle_path_for(pin, GenericRole::Hold)
                    .filter(|m| m.applies_to.includes(GenericRole::Hold));
                (Some(mcp), hold_mcp)
            }
            None => (None, None),
        }
    }

    /// Capture-time offset: the cycle-accounting offset for the check
    /// direction plus the multicycle adjustment. Zero for path delays (the
    /// budget replaces clock-derived accounting).
    pub fn target_clk_offset(&self, ctx: &AnalysisContext) -> f64 {
        match self {
            PathEnd::Unconstrained(_) | PathEnd::PathDelay(_) => 0.0,
            _ => match (self.accting(ctx), self.check_generic_role(ctx)) {
                (Some(acct), Some(role)) => {
                    acct.target_time_offset(role) + self.target_clk_mcp_adjustment(ctx)
                }
                _ => 0.0,
            },
        }
    }

    /// Capture edge time with cycle accounting, in the normalized frame.
    pub fn target_clk_time(&self, ctx: &AnalysisContext) -> f64 {
        match self.target_clk_edge(ctx) {
            Some(edge) => edge.time_ns + self.target_clk_offset(ctx),
            None => 0.0,
        }
    }

    fn target_clk_delay_split(&self, ctx: &AnalysisContext) -> (f64, f64) {
        let role = self
            .check_generic_role(ctx)
            .unwrap_or(match self.min_max() {
                MinMax::Max => GenericRole::Setup,
                MinMax::Min => GenericRole::Hold,
            });
        check_tgt_clk_delay(self.target_clk_path(), self.target_clk_edge(ctx), role, ctx)
    }

    /// Total capture clock-tree delay: insertion plus latency.
    pub fn target_clk_delay(&self, ctx: &AnalysisContext) -> f64 {
        let (insertion, latency) = self.target_clk_delay_split(ctx);
        insertion + latency
    }

    /// Defined insertion-delay portion of the capture clock-tree delay.
    pub fn target_clk_insertion_delay(&self, ctx: &AnalysisContext) -> f64 {
        self.target_clk_delay_split(ctx).0
    }

    /// Capture clock arrival: edge time with accounting plus tree delay.
    pub fn target_clk_arrival(&self, ctx: &AnalysisContext) -> f64 {
        self.target_clk_time(ctx) + self.target_clk_delay(ctx)
    }

    /// Width of the capture clock phase opened at a latch enable. Zero for
    /// non-latch path ends.
    pub fn target_clk_width(&self, ctx: &AnalysisContext) -> f64 {
        match self.target_clk_edge(ctx) {
            Some(edge) if self.is_latch_check() => ctx.clock(edge.clock).pulse_width(edge.rf),
            _ => 0.0,
        }
    }

    // ---------------------------------------------------------------
    // Uncertainty.

    /// The capture clock's own uncertainty for the check direction. Does not
    /// include inter-clock uncertainty.
    pub fn target_non_inter_clk_uncertainty(&self, ctx: &AnalysisContext) -> f64 {
        match (self.target_clk_edge(ctx), self.check_generic_role(ctx)) {
            (Some(edge), Some(role)) => check_tgt_clk_uncertainty(edge, role, ctx),
            _ => 0.0,
        }
    }

    /// Inter-clock uncertainty between launch and capture clocks. `None`
    /// when the clocks are the same or no inter-clock uncertainty is
    /// configured; an explicit zero is a distinct state.
    pub fn inter_clk_uncertainty(&self, ctx: &AnalysisContext) -> Option<f64> {
        let src = self.source_clk_edge(ctx)?;
        let tgt = self.target_clk_edge(ctx)?;
        let role = self.check_generic_role(ctx)?;
        check_inter_clk_uncertainty(src, tgt, role, ctx)
    }

    /// Total capture clock uncertainty: the per-clock value plus inter-clock
    /// uncertainty, folded in exactly once here.
    pub fn target_clk_uncertainty(&self, ctx: &AnalysisContext) -> f64 {
        self.target_non_inter_clk_uncertainty(ctx)
            + self.inter_clk_uncertainty(ctx).unwrap_or(0.0)
    }

    fn signed_uncertainty(&self, ctx: &AnalysisContext) -> f64 {
        match (self.target_clk_edge(ctx), self.check_generic_role(ctx)) {
            (Some(tgt), Some(role)) => {
                check_clk_uncertainty(self.source_clk_edge(ctx), tgt, role, ctx)
            }
            _ => 0.0,
        }
    }

    // ---------------------------------------------------------------
    // CRPR.

    /// The raw memoized common-path pessimism between launch and capture
    /// clock trees. Computed at most once per instance; zero when CRPR is
    /// disabled or no capture clock path exists.
    pub fn crpr(&self, ctx: &AnalysisContext) -> f64 {
        match self {
            PathEnd::Unconstrained(_) => 0.0,
            PathEnd::PathDelay(e) => {
                if !ctx.options.crpr_enabled || self.ignore_clk_latency(ctx) {
                    return 0.0;
                }
                match &e.clk_path {
                    Some(clk_path) => *e.crpr.force(|| find_crpr(&e.path, clk_path)),
                    None => 0.0,
                }
            }
            _ => self
                .clk_base()
                .map_or(0.0, |base| base.crpr(ctx)),
        }
    }

    /// The pessimism correction signed with respect to the check type:
    /// positive for setup-generic checks, negative for hold-generic checks.
    /// Added to the no-CRPR required time; both signs improve slack.
    pub fn check_crpr(&self, ctx: &AnalysisContext) -> f64 {
        let crpr = self.crpr(ctx);
        match self.check_generic_role(ctx) {
            Some(GenericRole::Setup) => crpr,
            Some(GenericRole::Hold) => -crpr,
            None => 0.0,
        }
    }

    // ---------------------------------------------------------------
    // Required time, slack.

    fn required_time_no_crpr(&self, ctx: &AnalysisContext) -> f64 {
        match self {
            PathEnd::Unconstrained(_) => self.min_max().unconstrained_required(),
            PathEnd::LatchCheck(_) => match latch::latch_required_with(self, ctx, false) {
                Some(req) => req.required_ns,
                None => self.min_max().unconstrained_required(),
            },
            PathEnd::PathDelay(_) => self.path_delay_required(ctx, false),
            PathEnd::DataCheck(e) => {
                let arrival = e.data_clk_path.arrival_ns
                    + self.target_clk_mcp_adjustment(ctx)
                    + self.signed_uncertainty(ctx);
                self.apply_margin(arrival, ctx)
            }
            _ => {
                let tgt_arrival = self.target_clk_arrival(ctx) + self.signed_uncertainty(ctx);
                self.apply_margin(tgt_arrival, ctx)
            }
        }
    }

    fn apply_margin(&self, base: f64, ctx: &AnalysisContext) -> f64 {
        let margin = self.margin(ctx);
        match self.check_generic_role(ctx) {
            Some(GenericRole::Setup) | None => base - margin,
            Some(GenericRole::Hold) => base + margin,
        }
    }

    fn path_delay_required(&self, ctx: &AnalysisContext, with_crpr: bool) -> f64 {
        let PathEnd::PathDelay(e) = self else {
            return self.min_max().unconstrained_required();
        };
        let pd = ctx.path_delay(e.path_delay);
        if pd.ignore_clk_latency {
            self.apply_margin(e.src_clk_arrival_ns + pd.delay_ns, ctx)
        } else {
            let base = self.apply_margin(pd.delay_ns + self.target_clk_delay(ctx), ctx);
            if with_crpr {
                base + self.check_crpr(ctx)
            } else {
                base
            }
        }
    }

    /// The time the arrival must satisfy for the constraint to be met,
    /// including the check margin and the CRPR correction.
    pub fn required_time(&self, ctx: &AnalysisContext) -> f64 {
        match self {
            PathEnd::Unconstrained(_) => self.min_max().unconstrained_required(),
            PathEnd::LatchCheck(_) => match latch::latch_required_with(self, ctx, true) {
                Some(req) => req.required_ns,
                None => self.min_max().unconstrained_required(),
            },
            PathEnd::PathDelay(_) => self.path_delay_required(ctx, true),
            _ => self.required_time_no_crpr(ctx) + self.check_crpr(ctx),
        }
    }

    /// Required time advanced by the source clock offset, for reporting in
    /// the absolute frame.
    pub fn required_time_offset(&self, ctx: &AnalysisContext) -> f64 {
        self.required_time(ctx) + self.source_clk_offset(ctx)
    }

    /// Slack: positive means the constraint is met. `required - arrival` on
    /// the max side, mirrored on the min side.
    pub fn slack(&self, ctx: &AnalysisContext) -> f64 {
        self.min_max()
            .slack(self.required_time(ctx), self.data_arrival_time(ctx))
    }

    /// Slack computed as if CRPR were zero, for pessimism-free diagnostic
    /// views.
    pub fn slack_no_crpr(&self, ctx: &AnalysisContext) -> f64 {
        self.min_max()
            .slack(self.required_time_no_crpr(ctx), self.data_arrival_time(ctx))
    }

    /// Time borrowed from the next clock phase by a latch check. Zero for
    /// every other variant.
    pub fn borrow(&self, ctx: &AnalysisContext) -> f64 {
        match latch::latch_required_with(self, ctx, true) {
            Some(req) => req.borrow_ns,
            None => 0.0,
        }
    }

    /// Skew between launch and capture clock-tree delays with the common
    /// pessimism removed. Zero for variants without both trees.
    pub fn clk_skew(&self, ctx: &AnalysisContext) -> f64 {
        match self {
            PathEnd::Check(_) | PathEnd::LatchCheck(_) => {
                self.source_clk_delay(ctx) - self.target_clk_delay(ctx) - self.crpr(ctx)
            }
            _ => 0.0,
        }
    }

    // ---------------------------------------------------------------
    // Exception comparison.

    fn exception_key(&self, ctx: &AnalysisContext) -> Option<(u32, u32)> {
        match self {
            PathEnd::Unconstrained(_) => None,
            PathEnd::LatchCheck(e) => match e.path_delay {
                Some(id) => Some((ctx.path_delay(id).priority, id.as_raw())),
                None => self
                    .multi_cycle_path()
                    .map(|id| (ctx.mcp(id).priority, id.as_raw())),
            },
            PathEnd::PathDelay(e) => {
                Some((ctx.path_delay(e.path_delay).priority, e.path_delay.as_raw()))
            }
            _ => self
                .multi_cycle_path()
                .map(|id| (ctx.mcp(id).priority, id.as_raw())),
        }
    }

    /// Secondary comparator over the exceptions governing two path ends,
    /// used to order ends that are otherwise tied: governed ends sort before
    /// ungoverned ones, higher-priority exceptions first, exception id as
    /// the final structural tie-breaker.
    pub fn except_path_cmp(&self, other: &PathEnd, ctx: &AnalysisContext) -> Ordering {
        let a = self.exception_key(ctx);
        let b = other.exception_key(ctx);
        match (a, b) {
            (None, None) => Ordering::Equal,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some((pa, ia)), Some((pb, ib))) => pb.cmp(&pa).then(ia.cmp(&ib)),
        }
    }
}

// -------------------------------------------------------------------
// Free helpers shared by multiple variants and used externally.

/// Early/late selection for the capture clock tree: setup checks capture on
/// the early tree, hold checks on the late tree.
pub fn tgt_clk_early_late(role: GenericRole) -> EarlyLate {
    match role {
        GenericRole::Setup => MinMax::Min,
        GenericRole::Hold => MinMax::Max,
    }
}

/// Decomposes the capture clock path's delay into defined insertion delay
/// and propagated tree latency. With no propagated clock path, the clock is
/// ideal: insertion comes from the clock definition and latency is zero.
pub fn check_tgt_clk_delay(
    clk_path: Option<&Path>,
    tgt_clk_edge: Option<ClockEdge>,
    role: GenericRole,
    ctx: &AnalysisContext,
) -> (f64, f64) {
    match tgt_clk_edge {
        Some(edge) => {
            let insertion = tgt_clk_early_late(role).select(ctx.clock(edge.clock).insertion);
            match clk_path {
                Some(path) => {
                    let latency = path.arrival_ns - edge.time_ns - insertion;
                    (insertion, latency)
                }
                None => (insertion, 0.0),
            }
        }
        None => (0.0, 0.0),
    }
}

/// Composed clock uncertainty signed for the check direction: negative for
/// setup-generic checks (the required time shrinks), positive for
/// hold-generic checks (it grows). Inter-clock uncertainty is folded in
/// exactly once here; callers must not add it anywhere else.
pub fn check_clk_uncertainty(
    src_clk_edge: Option<ClockEdge>,
    tgt_clk_edge: ClockEdge,
    role: GenericRole,
    ctx: &AnalysisContext,
) -> f64 {
    let non_inter = check_tgt_clk_uncertainty(tgt_clk_edge, role, ctx);
    let inter = src_clk_edge
        .and_then(|src| check_inter_clk_uncertainty(src, tgt_clk_edge, role, ctx))
        .unwrap_or(0.0);
    let uncertainty = non_inter + inter;
    match role {
        GenericRole::Setup => -uncertainty,
        GenericRole::Hold => uncertainty,
    }
}

/// Per-clock uncertainty of the capture clock for the check direction,
/// without inter-clock uncertainty.
pub fn check_tgt_clk_uncertainty(
    tgt_clk_edge: ClockEdge,
    role: GenericRole,
    ctx: &AnalysisContext,
) -> f64 {
    ctx.clock(tgt_clk_edge.clock)
        .uncertainty(role)
        .unwrap_or(0.0)
}

/// Inter-clock uncertainty, applicable only between distinct launch and
/// capture clocks. `None` means not configured, distinct from zero.
pub fn check_inter_clk_uncertainty(
    src_clk_edge: ClockEdge,
    tgt_clk_edge: ClockEdge,
    role: GenericRole,
    ctx: &AnalysisContext,
) -> Option<f64> {
    if src_clk_edge.clock == tgt_clk_edge.clock {
        return None;
    }
    ctx.inter_clk_uncertainty(src_clk_edge.clock, tgt_clk_edge.clock, role)
}

/// Converts a setup multicycle multiplier into additional whole clock
/// periods on top of the default accounting: `(N - default_cycles)` periods
/// of the basis clock. No exception means no adjustment.
pub fn check_setup_mcp_adjustment(
    src_clk_edge: Option<ClockEdge>,
    tgt_clk_edge: ClockEdge,
    mcp: Option<&MultiCyclePath>,
    default_cycles: u32,
) -> f64 {
    match mcp {
        Some(mcp) if mcp.applies_to.includes(GenericRole::Setup) => {
            let period = mcp.basis_period(src_clk_edge, tgt_clk_edge);
            (mcp.multiplier as f64 - default_cycles as f64) * period
        }
        _ => 0.0,
    }
}

/// Hold capture-edge displacement from the governing setup and hold
/// multicycle exceptions: `(setup_mult - 1 - hold_mult)` basis periods.
///
/// The asymmetric default is deliberate and load-bearing: with no explicit
/// hold exception, hold mirrors the setup exception minus one cycle
/// (`hold_mult` stays 0); an explicit hold exception pulls the edge back by
/// its own multiplier.
pub fn check_hold_mcp_adjustment(
    src_clk_edge: Option<ClockEdge>,
    tgt_clk_edge: ClockEdge,
    setup_mcp: Option<&MultiCyclePath>,
    hold_mcp: Option<&MultiCyclePath>,
) -> f64 {
    if setup_mcp.is_none() && hold_mcp.is_none() {
        return 0.0;
    }
    let setup_part = match setup_mcp {
        Some(mcp) => {
            (mcp.multiplier as f64 - 1.0) * mcp.basis_period(src_clk_edge, tgt_clk_edge)
        }
        None => 0.0,
    };
    let hold_part = match hold_mcp {
        Some(mcp) => mcp.multiplier as f64 * mcp.basis_period(src_clk_edge, tgt_clk_edge),
        None => 0.0,
    };
    setup_part - hold_part
}

/// Source-arrival offset for a path-delay end: under ignore-clock-latency
/// the launch clock arrival is backed out of the measured delay.
pub fn path_delay_src_clk_offset(ignore_clk_latency: bool, src_clk_arrival_ns: f64) -> f64 {
    if ignore_clk_latency {
        -src_clk_arrival_ns
    } else {
        0.0
    }
}
