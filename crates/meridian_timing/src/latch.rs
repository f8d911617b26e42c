//! Level-sensitive latch time borrowing.
//!
//! A latch is transparent from its enable (open) edge to its disable (close)
//! edge. Data arriving while the latch is open is not late — it borrows time
//! from the following phase, up to a limit. The borrow, the effective
//! required time, the borrow-adjusted arrival, and the time handed back to
//! the launching logic are all derived from one computation and are returned
//! together so they can never disagree.

use crate::check::GenericRole;
use crate::context::AnalysisContext;
use crate::crpr::find_crpr;
use crate::path_end::{check_tgt_clk_delay, PathEnd};

/// The ingredients of a latch borrow decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatchBorrowInfo {
    /// Nominal enable pulse width from the clock waveform, in nanoseconds.
    pub nom_pulse_width_ns: f64,
    /// Open-edge clock-tree delay (insertion plus latency), in nanoseconds.
    pub open_latency_ns: f64,
    /// Open-edge minus close-edge clock-tree delay, in nanoseconds.
    pub latency_diff_ns: f64,
    /// Clock uncertainty at the open edge, in nanoseconds.
    pub open_uncertainty_ns: f64,
    /// Pessimism correction between the data path and the open edge.
    pub open_crpr_ns: f64,
    /// Open-edge minus close-edge pessimism correction.
    pub crpr_diff_ns: f64,
    /// The borrow limit, in nanoseconds.
    pub max_borrow_ns: f64,
    /// True when the limit is an explicit max-borrow constraint rather than
    /// derived from the pulse width.
    pub borrow_limit_exists: bool,
}

/// The mutually-derived results of a latch required-time computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatchRequired {
    /// The effective required time, in the normalized frame.
    pub required_ns: f64,
    /// Time borrowed from the next phase; zero when data beats the open
    /// edge.
    pub borrow_ns: f64,
    /// Data arrival with the borrow backed out.
    pub adjusted_data_arrival_ns: f64,
    /// Time handed back to the launching logic: the borrow plus the open
    /// edge's uncertainty and pessimism margins.
    pub time_given_to_startpoint_ns: f64,
}

impl PathEnd {
    /// The borrow ingredients of a latch check; `None` for every other
    /// variant.
    pub fn latch_borrow_info(&self, ctx: &AnalysisContext) -> Option<LatchBorrowInfo> {
        borrow_info_with(self, ctx, true)
    }

    /// The borrow decision of a latch check; `None` for every other
    /// variant.
    pub fn latch_required(&self, ctx: &AnalysisContext) -> Option<LatchRequired> {
        latch_required_with(self, ctx, true)
    }
}

pub(crate) fn latch_required_with(
    end: &PathEnd,
    ctx: &AnalysisContext,
    with_crpr: bool,
) -> Option<LatchRequired> {
    let info = borrow_info_with(end, ctx, with_crpr)?;

    // Open-edge arrival as the no-borrow required time, normalized frame.
    let open_arrival = end.target_clk_time(ctx) + info.open_latency_ns
        - info.open_uncertainty_ns
        + info.open_crpr_ns;

    let src_offset = end.source_clk_offset(ctx);
    let data_arrival = end.path().arrival_ns + src_offset;

    let raw_borrow = data_arrival - open_arrival;
    let (borrow_ns, time_given) = if raw_borrow > 0.0 {
        let borrow = raw_borrow.min(info.max_borrow_ns);
        (
            borrow,
            borrow + info.open_uncertainty_ns + info.open_crpr_ns,
        )
    } else {
        (0.0, 0.0)
    };

    Some(LatchRequired {
        required_ns: open_arrival + borrow_ns - src_offset,
        borrow_ns,
        adjusted_data_arrival_ns: end.path().arrival_ns - borrow_ns,
        time_given_to_startpoint_ns: time_given,
    })
}

pub(crate) fn borrow_info_with(
    end: &PathEnd,
    ctx: &AnalysisContext,
    with_crpr: bool,
) -> Option<LatchBorrowInfo> {
    let PathEnd::LatchCheck(latch) = end else {
        return None;
    };
    let enable_path = &latch.check.base.clk.clk_path;
    let enable_edge = end.target_clk_edge(ctx);
    let ignore = end.ignore_clk_latency(ctx);

    let nom_pulse_width_ns =
        enable_edge.map_or(0.0, |e| ctx.clock(e.clock).pulse_width(e.rf));

    let (open_latency_ns, latency_diff_ns) = if ignore {
        (0.0, 0.0)
    } else {
        let (open_ins, open_lat) =
            check_tgt_clk_delay(Some(enable_path), enable_edge, GenericRole::Setup, ctx);
        let disable_edge = latch.disable_path.clk_edge.map(|e| ctx.edge(e));
        let (close_ins, close_lat) = check_tgt_clk_delay(
            Some(&latch.disable_path),
            disable_edge,
            GenericRole::Setup,
            ctx,
        );
        let open = open_ins + open_lat;
        (open, open - (close_ins + close_lat))
    };

    let open_uncertainty_ns = end.target_clk_uncertainty(ctx);

    let crpr_active = with_crpr && ctx.options.crpr_enabled && !ignore;
    let open_crpr_ns = if crpr_active { end.crpr(ctx) } else { 0.0 };
    let close_crpr_ns = if crpr_active {
        find_crpr(end.path(), &latch.disable_path)
    } else {
        0.0
    };
    let crpr_diff_ns = open_crpr_ns - close_crpr_ns;

    let margin = end.margin(ctx);
    let enable_clock = enable_edge.map(|e| e.clock);
    let (max_borrow_ns, borrow_limit_exists) = match ctx.borrow_limit(end.pin(), enable_clock) {
        Some(limit) => (limit, true),
        None => (
            nom_pulse_width_ns - latency_diff_ns - margin - crpr_diff_ns,
            false,
        ),
    };

    Some(LatchBorrowInfo {
        nom_pulse_width_ns,
        open_latency_ns,
        latency_diff_ns,
        open_uncertainty_ns,
        open_crpr_ns,
        crpr_diff_ns,
        max_borrow_ns,
        borrow_limit_exists,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{RiseFall, TimingArc, TimingRole};
    use crate::clock::ClockEdgeRef;
    use crate::context::AnalysisContext;
    use crate::ids::{ArcId, ClockId, EdgeId};
    use crate::path::{ClockTreeHop, Path};
    use meridian_common::{Delay, MinMax, NameTable};

    struct Fixture {
        table: NameTable,
        ctx: AnalysisContext,
        clk: ClockId,
    }

    // Period 10, default waveform: enable opens at each rise, closes at the
    // fall 5 ns later. A launch at rise 0 meets the open edge at 10.
    fn fixture() -> Fixture {
        let table = NameTable::new();
        let mut ctx = AnalysisContext::new();
        let clk = ctx.add_clock(table.intern("clk"), 10.0);
        Fixture { table, ctx, clk }
    }

    fn latch_end(f: &mut Fixture, arrival_ns: f64) -> PathEnd {
        latch_end_with_hops(f, arrival_ns, None)
    }

    fn latch_end_with_hops(f: &mut Fixture, arrival_ns: f64, shared_hop: Option<f64>) -> PathEnd {
        let arc = f.ctx.add_arc(TimingArc::new(
            ArcId::from_raw(0),
            TimingRole::Setup,
            Delay::uniform(0.5),
        ));
        let rise = ClockEdgeRef {
            clock: f.clk,
            rf: RiseFall::Rise,
        };
        let fall = ClockEdgeRef {
            clock: f.clk,
            rf: RiseFall::Fall,
        };
        let hops = |spread: f64| {
            vec![ClockTreeHop::new(
                f.table.intern("clkbuf/Y"),
                0.0,
                spread,
            )]
        };
        let mut path = Path::new(f.table.intern("lat/D"), RiseFall::Rise, MinMax::Max, arrival_ns)
            .with_clock(rise, 0.0, 0.0);
        let mut enable = Path::new(f.table.intern("lat/EN"), RiseFall::Rise, MinMax::Min, 0.0)
            .with_clock(rise, 0.0, 0.0);
        let disable = Path::new(f.table.intern("lat/EN"), RiseFall::Fall, MinMax::Min, 5.0)
            .with_clock(fall, 0.0, 0.0);
        if let Some(spread) = shared_hop {
            path = path.with_clk_hops(hops(spread));
            enable = enable.with_clk_hops(hops(spread));
        }
        PathEnd::latch_check(
            path,
            arc,
            EdgeId::from_raw(0),
            enable,
            disable,
            None,
            None,
            None,
            &f.ctx,
        )
    }

    #[test]
    fn data_before_open_edge_does_not_borrow() {
        let mut f = fixture();
        let end = latch_end(&mut f, 8.0);
        let req = end.latch_required(&f.ctx).unwrap();
        assert_eq!(req.borrow_ns, 0.0);
        assert_eq!(req.required_ns, 10.0);
        assert_eq!(req.adjusted_data_arrival_ns, 8.0);
        assert_eq!(req.time_given_to_startpoint_ns, 0.0);
        assert_eq!(end.slack(&f.ctx), 2.0);
    }

    #[test]
    fn borrow_within_limit_gives_zero_slack() {
        let mut f = fixture();
        let end = latch_end(&mut f, 12.0);
        let req = end.latch_required(&f.ctx).unwrap();
        assert_eq!(req.borrow_ns, 2.0);
        assert_eq!(req.required_ns, 12.0);
        // Conservation: adjusted arrival is the original minus the borrow.
        assert_eq!(req.adjusted_data_arrival_ns, 10.0);
        assert_eq!(req.time_given_to_startpoint_ns, 2.0);
        assert_eq!(end.slack(&f.ctx), 0.0);
        assert_eq!(end.borrow(&f.ctx), 2.0);
    }

    #[test]
    fn borrow_clamps_at_derived_limit() {
        let mut f = fixture();
        let end = latch_end(&mut f, 20.0);
        let info = end.latch_borrow_info(&f.ctx).unwrap();
        // Pulse width 5 minus the 0.5 margin.
        assert_eq!(info.nom_pulse_width_ns, 5.0);
        assert_eq!(info.max_borrow_ns, 4.5);
        assert!(!info.borrow_limit_exists);
        let req = end.latch_required(&f.ctx).unwrap();
        assert_eq!(req.borrow_ns, 4.5);
        assert_eq!(req.required_ns, 14.5);
        assert_eq!(end.slack(&f.ctx), -5.5);
    }

    #[test]
    fn explicit_borrow_limit_wins() {
        let mut f = fixture();
        let pin = f.table.intern("lat/D");
        f.ctx.set_borrow_limit_pin(pin, 1.0);
        let end = latch_end(&mut f, 12.0);
        let info = end.latch_borrow_info(&f.ctx).unwrap();
        assert_eq!(info.max_borrow_ns, 1.0);
        assert!(info.borrow_limit_exists);
        let req = end.latch_required(&f.ctx).unwrap();
        assert_eq!(req.borrow_ns, 1.0);
        assert_eq!(req.required_ns, 11.0);
        assert_eq!(end.slack(&f.ctx), -1.0);
    }

    #[test]
    fn clock_scoped_borrow_limit_applies() {
        let mut f = fixture();
        let clk = f.clk;
        f.ctx.set_borrow_limit_clock(clk, 0.25);
        let end = latch_end(&mut f, 12.0);
        let info = end.latch_borrow_info(&f.ctx).unwrap();
        assert_eq!(info.max_borrow_ns, 0.25);
        assert!(info.borrow_limit_exists);
    }

    #[test]
    fn open_crpr_is_excluded_from_no_crpr_slack() {
        let mut f = fixture();
        let end = latch_end_with_hops(&mut f, 8.0, Some(0.2));
        // With CRPR the open-edge required moves out by the shared spread.
        let req = end.latch_required(&f.ctx).unwrap();
        assert!((req.required_ns - 10.2).abs() < 1e-12);
        assert!((end.slack(&f.ctx) - 2.2).abs() < 1e-12);
        assert!((end.slack_no_crpr(&f.ctx) - 2.0).abs() < 1e-12);
        // Borrow is zero either way; conservation is unaffected by CRPR.
        assert_eq!(req.borrow_ns, 0.0);
        assert_eq!(req.adjusted_data_arrival_ns, 8.0);
    }

    #[test]
    fn borrowing_charges_uncertainty_to_startpoint() {
        let mut f = fixture();
        let clk = f.clk;
        f.ctx.clock_mut(clk).uncertainty_setup_ns = Some(0.3);
        let end = latch_end(&mut f, 12.0);
        let req = end.latch_required(&f.ctx).unwrap();
        // Open arrival moves in to 9.7; borrow grows accordingly.
        assert!((req.borrow_ns - 2.3).abs() < 1e-12);
        assert!((req.time_given_to_startpoint_ns - 2.6).abs() < 1e-12);
        assert!((end.slack(&f.ctx) - 0.0).abs() < 1e-12);
    }

    #[test]
    fn latch_identity_and_width() {
        let mut f = fixture();
        let end = latch_end(&mut f, 8.0);
        assert!(end.is_latch_check());
        assert!(!end.is_check());
        assert_eq!(end.type_name(), "latch check");
        assert_eq!(end.target_clk_width(&f.ctx), 5.0);
        assert!(end.latch_disable().is_some());
        assert!(end.latch_borrow_info(&f.ctx).is_some());
        // Non-latch variants return the not-applicable sentinel.
        let plain = PathEnd::unconstrained(Path::new(
            f.table.intern("x"),
            RiseFall::Rise,
            MinMax::Max,
            0.0,
        ));
        assert!(plain.latch_borrow_info(&f.ctx).is_none());
        assert!(plain.latch_required(&f.ctx).is_none());
    }
}
