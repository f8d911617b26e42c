//! Total orders over path ends for worst-first reporting and selection.
//!
//! Three policies, each a three-way comparison plus a boolean functor that
//! agrees with it: full ordering (slack, then arrival, then structural
//! identity), slack alone, and slack without CRPR. Floats compare under
//! total ordering so the infinite slack of unconstrained ends sorts
//! deterministically, and exact ties in the full ordering break on the
//! endpoint's structural identity and governing exception — never on
//! addresses.

use crate::context::AnalysisContext;
use crate::path_end::PathEnd;
use meridian_common::MinMax;
use std::cmp::Ordering;

/// Three-way comparison on slack alone: worst (most negative) first.
pub fn cmp_slack(a: &PathEnd, b: &PathEnd, ctx: &AnalysisContext) -> Ordering {
    a.slack(ctx).total_cmp(&b.slack(ctx))
}

/// Three-way comparison on slack computed without CRPR: worst first.
pub fn cmp_no_crpr(a: &PathEnd, b: &PathEnd, ctx: &AnalysisContext) -> Ordering {
    a.slack_no_crpr(ctx).total_cmp(&b.slack_no_crpr(ctx))
}

/// Three-way comparison on offset arrival: worse first, which is the later
/// arrival on the max side and the earlier one on the min side.
pub fn cmp_arrival(a: &PathEnd, b: &PathEnd, ctx: &AnalysisContext) -> Ordering {
    let aa = a.data_arrival_time_offset(ctx);
    let bb = b.data_arrival_time_offset(ctx);
    match a.min_max() {
        MinMax::Max => bb.total_cmp(&aa),
        MinMax::Min => aa.total_cmp(&bb),
    }
}

/// The full total order: slack, then arrival, then endpoint pin and
/// transition, then the governing-exception comparator, then the type tag.
pub fn cmp(a: &PathEnd, b: &PathEnd, ctx: &AnalysisContext) -> Ordering {
    cmp_slack(a, b, ctx)
        .then_with(|| cmp_arrival(a, b, ctx))
        .then_with(|| a.pin().cmp(&b.pin()))
        .then_with(|| a.transition().cmp(&b.transition()))
        .then_with(|| a.except_path_cmp(b, ctx))
        .then_with(|| a.type_of().cmp(&b.type_of()))
}

/// Full-order functor: slack, then arrival, then structural identity, so
/// unconstrained ends still sort sensibly against constrained ones.
pub struct PathEndLess<'a> {
    ctx: &'a AnalysisContext,
}

impl<'a> PathEndLess<'a> {
    /// Creates the functor over the given context.
    pub fn new(ctx: &'a AnalysisContext) -> Self {
        Self { ctx }
    }

    /// Does `a` order strictly before `b`?
    pub fn less(&self, a: &PathEnd, b: &PathEnd) -> bool {
        cmp(a, b, self.ctx) == Ordering::Less
    }
}

/// Slack-only functor.
pub struct PathEndSlackLess<'a> {
    ctx: &'a AnalysisContext,
}

impl<'a> PathEndSlackLess<'a> {
    /// Creates the functor over the given context.
    pub fn new(ctx: &'a AnalysisContext) -> Self {
        Self { ctx }
    }

    /// Does `a` have strictly worse slack than `b`?
    pub fn less(&self, a: &PathEnd, b: &PathEnd) -> bool {
        cmp_slack(a, b, self.ctx) == Ordering::Less
    }
}

/// Slack-without-CRPR functor, for pessimism-free reporting views.
pub struct PathEndNoCrprLess<'a> {
    ctx: &'a AnalysisContext,
}

impl<'a> PathEndNoCrprLess<'a> {
    /// Creates the functor over the given context.
    pub fn new(ctx: &'a AnalysisContext) -> Self {
        Self { ctx }
    }

    /// Does `a` have strictly worse no-CRPR slack than `b`?
    pub fn less(&self, a: &PathEnd, b: &PathEnd) -> bool {
        cmp_no_crpr(a, b, self.ctx) == Ordering::Less
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::{RiseFall, TimingArc, TimingRole};
    use crate::clock::ClockEdgeRef;
    use crate::ids::{ArcId, ClockId, EdgeId};
    use crate::path::{ClockTreeHop, Path};
    use meridian_common::{Delay, NameTable};

    struct Fixture {
        table: NameTable,
        ctx: AnalysisContext,
        clk: ClockId,
    }

    fn fixture() -> Fixture {
        let table = NameTable::new();
        let mut ctx = AnalysisContext::new();
        let clk = ctx.add_clock(table.intern("clk"), 10.0);
        Fixture { table, ctx, clk }
    }

    fn check_end(f: &mut Fixture, pin: &str, arrival_ns: f64) -> PathEnd {
        check_end_with_crpr(f, pin, arrival_ns, None)
    }

    fn check_end_with_crpr(
        f: &mut Fixture,
        pin: &str,
        arrival_ns: f64,
        shared_spread: Option<f64>,
    ) -> PathEnd {
        let arc = f.ctx.add_arc(TimingArc::new(
            ArcId::from_raw(0),
            TimingRole::Setup,
            Delay::uniform(1.0),
        ));
        let rise = ClockEdgeRef {
            clock: f.clk,
            rf: RiseFall::Rise,
        };
        let mut path = Path::new(f.table.intern(pin), RiseFall::Rise, MinMax::Max, arrival_ns)
            .with_clock(rise, 0.0, 0.0);
        let mut clk_path = Path::new(f.table.intern("reg/CLK"), RiseFall::Rise, MinMax::Min, 0.0)
            .with_clock(rise, 0.0, 0.0);
        if let Some(spread) = shared_spread {
            let hop = vec![ClockTreeHop::new(f.table.intern("clkbuf/Y"), 0.0, spread)];
            path = path.with_clk_hops(hop.clone());
            clk_path = clk_path.with_clk_hops(hop);
        }
        PathEnd::check(path, arc, EdgeId::from_raw(0), clk_path, None, None)
    }

    #[test]
    fn slack_order_is_total_over_three_ends() {
        let mut f = fixture();
        let worst = check_end(&mut f, "a/D", 11.0); // slack -2
        let mid = check_end(&mut f, "b/D", 6.0); // slack 3
        let best = PathEnd::unconstrained(Path::new(
            f.table.intern("c/D"),
            RiseFall::Rise,
            MinMax::Max,
            1.0,
        )); // slack +inf
        let ends = [&worst, &mid, &best];
        for a in ends {
            for b in ends {
                let ab = cmp_slack(a, b, &f.ctx);
                let ba = cmp_slack(b, a, &f.ctx);
                // Antisymmetry.
                assert_eq!(ab, ba.reverse());
            }
        }
        // Transitivity along the known chain.
        assert_eq!(cmp_slack(&worst, &mid, &f.ctx), Ordering::Less);
        assert_eq!(cmp_slack(&mid, &best, &f.ctx), Ordering::Less);
        assert_eq!(cmp_slack(&worst, &best, &f.ctx), Ordering::Less);
    }

    #[test]
    fn unconstrained_sorts_last() {
        let mut f = fixture();
        let constrained = check_end(&mut f, "a/D", 6.0);
        let unconstrained = PathEnd::unconstrained(Path::new(
            f.table.intern("b/D"),
            RiseFall::Rise,
            MinMax::Max,
            1.0,
        ));
        assert_eq!(cmp(&constrained, &unconstrained, &f.ctx), Ordering::Less);
        let less = PathEndLess::new(&f.ctx);
        assert!(less.less(&constrained, &unconstrained));
        assert!(!less.less(&unconstrained, &constrained));
    }

    #[test]
    fn functors_agree_with_three_way_cmps() {
        let mut f = fixture();
        let a = check_end(&mut f, "a/D", 11.0);
        let b = check_end(&mut f, "b/D", 6.0);
        let less = PathEndLess::new(&f.ctx);
        let slack_less = PathEndSlackLess::new(&f.ctx);
        let no_crpr_less = PathEndNoCrprLess::new(&f.ctx);
        assert_eq!(less.less(&a, &b), cmp(&a, &b, &f.ctx) == Ordering::Less);
        assert_eq!(
            slack_less.less(&a, &b),
            cmp_slack(&a, &b, &f.ctx) == Ordering::Less
        );
        assert_eq!(
            no_crpr_less.less(&a, &b),
            cmp_no_crpr(&a, &b, &f.ctx) == Ordering::Less
        );
    }

    #[test]
    fn slack_ties_break_on_structure_not_addresses() {
        let mut f = fixture();
        let a = check_end(&mut f, "a/D", 6.0);
        let b = check_end(&mut f, "b/D", 6.0);
        assert_eq!(cmp_slack(&a, &b, &f.ctx), Ordering::Equal);
        // Same slack and arrival: the pin id decides, in both directions.
        assert_eq!(cmp(&a, &b, &f.ctx), Ordering::Less);
        assert_eq!(cmp(&b, &a, &f.ctx), Ordering::Greater);
        // Clones compare equal under the full order.
        assert_eq!(cmp(&a, &a.clone(), &f.ctx), Ordering::Equal);
    }

    #[test]
    fn arrival_orders_worse_first_on_max_side() {
        let mut f = fixture();
        let near = check_end(&mut f, "a/D", 6.0);
        let mut far = check_end(&mut f, "a/D", 6.0);
        far.set_path(
            Path::new(f.table.intern("a/D"), RiseFall::Rise, MinMax::Max, 7.0).with_clock(
                ClockEdgeRef {
                    clock: f.clk,
                    rf: RiseFall::Rise,
                },
                0.0,
                0.0,
            ),
        );
        // Max side: the later arrival is worse and orders first.
        assert_eq!(cmp_arrival(&far, &near, &f.ctx), Ordering::Less);
        assert_eq!(cmp_arrival(&near, &far, &f.ctx), Ordering::Greater);
    }

    #[test]
    fn no_crpr_order_ignores_pessimism_removal() {
        let mut f = fixture();
        // Same arrival; one end gains 0.4 of slack from CRPR.
        let plain = check_end(&mut f, "a/D", 6.0);
        let with_crpr = check_end_with_crpr(&mut f, "b/D", 6.0, Some(0.4));
        assert_eq!(cmp_slack(&plain, &with_crpr, &f.ctx), Ordering::Less);
        assert_eq!(cmp_no_crpr(&plain, &with_crpr, &f.ctx), Ordering::Equal);
    }

    #[test]
    fn sort_by_full_cmp_is_worst_first() {
        let mut f = fixture();
        let mut ends = vec![
            PathEnd::unconstrained(Path::new(
                f.table.intern("u"),
                RiseFall::Rise,
                MinMax::Max,
                0.0,
            )),
            check_end(&mut f, "a/D", 6.0),
            check_end(&mut f, "b/D", 11.0),
        ];
        ends.sort_by(|a, b| cmp(a, b, &f.ctx));
        let slacks: Vec<f64> = ends.iter().map(|e| e.slack(&f.ctx)).collect();
        assert_eq!(slacks[0], -2.0);
        assert_eq!(slacks[1], 3.0);
        assert_eq!(slacks[2], f64::INFINITY);
    }
}
