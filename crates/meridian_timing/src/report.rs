//! Report emission: field bundles handed to an external formatter.
//!
//! Formatting itself lives outside this crate. A path end's `report_short`
//! and `report_full` build complete field bundles from the public accessors
//! and hand them to a caller-supplied [`PathEndReporter`], so the formatter
//! never reaches back into internal state.

use crate::check::{RiseFall, TimingRole};
use crate::context::AnalysisContext;
use crate::ids::{ClockId, McpId, PathDelayId};
use crate::path_end::{PathEnd, PathEndType};
use meridian_common::{MinMax, Name};

/// The headline fields of a path end, enough for a one-line report entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathEndSummary {
    /// The path end's type tag.
    pub type_of: PathEndType,
    /// The report name of the type.
    pub type_name: &'static str,
    /// The endpoint pin.
    pub endpoint: Name,
    /// The transition sense at the endpoint.
    pub transition: RiseFall,
    /// The analysis side.
    pub min_max: MinMax,
    /// Arrival at the endpoint, normalized frame.
    pub data_arrival_ns: f64,
    /// Required time, normalized frame.
    pub required_ns: f64,
    /// Slack, met-positive.
    pub slack_ns: f64,
    /// The capture clock, when one exists.
    pub target_clock: Option<ClockId>,
}

/// Every remaining field a full path report renders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathEndDetail {
    /// The constraining check's margin.
    pub margin_ns: f64,
    /// The constraining check's role, when one exists.
    pub check_role: Option<TimingRole>,
    /// True when the margin is a user budget rather than a cell check arc.
    pub margin_is_external: bool,
    /// Source clock offset into the absolute frame.
    pub source_clk_offset_ns: f64,
    /// Launch clock-tree latency.
    pub source_clk_latency_ns: f64,
    /// Launch clock insertion delay.
    pub source_clk_insertion_ns: f64,
    /// Arrival in the absolute frame.
    pub data_arrival_offset_ns: f64,
    /// Required time in the absolute frame.
    pub required_offset_ns: f64,
    /// Capture edge time with cycle accounting.
    pub target_clk_time_ns: f64,
    /// Capture-time offset (cycle accounting plus MCP adjustment).
    pub target_clk_offset_ns: f64,
    /// Capture clock-tree delay.
    pub target_clk_delay_ns: f64,
    /// Capture clock insertion delay.
    pub target_clk_insertion_ns: f64,
    /// Composed capture clock uncertainty.
    pub target_clk_uncertainty_ns: f64,
    /// Multicycle adjustment folded into the capture offset.
    pub target_clk_mcp_adjustment_ns: f64,
    /// Raw common-path pessimism.
    pub crpr_ns: f64,
    /// Pessimism correction signed for the check type.
    pub check_crpr_ns: f64,
    /// Slack with CRPR forced to zero.
    pub slack_no_crpr_ns: f64,
    /// Latch borrow; zero for non-latch ends.
    pub borrow_ns: f64,
    /// Latch time handed back to the launching logic.
    pub time_given_to_startpoint_ns: f64,
    /// Launch/capture clock skew with pessimism removed.
    pub clk_skew_ns: f64,
    /// The governing multicycle-path exception, if any.
    pub multi_cycle_path: Option<McpId>,
    /// The governing path-delay exception, if any.
    pub path_delay: Option<PathDelayId>,
}

/// An external formatter receiving complete field bundles.
pub trait PathEndReporter {
    /// Renders the one-line form of a path end.
    fn report_short(&mut self, summary: &PathEndSummary);

    /// Renders the full form of a path end.
    fn report_full(&mut self, summary: &PathEndSummary, detail: &PathEndDetail);
}

impl PathEnd {
    /// Builds the headline field bundle for reporting.
    pub fn summary(&self, ctx: &AnalysisContext) -> PathEndSummary {
        PathEndSummary {
            type_of: self.type_of(),
            type_name: self.type_name(),
            endpoint: self.pin(),
            transition: self.transition(),
            min_max: self.min_max(),
            data_arrival_ns: self.data_arrival_time(ctx),
            required_ns: self.required_time(ctx),
            slack_ns: self.slack(ctx),
            target_clock: self.target_clk_id(ctx),
        }
    }

    /// Builds the full field bundle for reporting.
    pub fn detail(&self, ctx: &AnalysisContext) -> PathEndDetail {
        let latch = self.latch_required(ctx);
        PathEndDetail {
            margin_ns: self.margin(ctx),
            check_role: self.check_role(ctx),
            margin_is_external: self.path_delay_margin_is_external(),
            source_clk_offset_ns: self.source_clk_offset(ctx),
            source_clk_latency_ns: self.source_clk_latency(ctx),
            source_clk_insertion_ns: self.source_clk_insertion_delay(ctx),
            data_arrival_offset_ns: self.data_arrival_time_offset(ctx),
            required_offset_ns: self.required_time_offset(ctx),
            target_clk_time_ns: self.target_clk_time(ctx),
            target_clk_offset_ns: self.target_clk_offset(ctx),
            target_clk_delay_ns: self.target_clk_delay(ctx),
            target_clk_insertion_ns: self.target_clk_insertion_delay(ctx),
            target_clk_uncertainty_ns: self.target_clk_uncertainty(ctx),
            target_clk_mcp_adjustment_ns: self.target_clk_mcp_adjustment(ctx),
            crpr_ns: self.crpr(ctx),
            check_crpr_ns: self.check_crpr(ctx),
            slack_no_crpr_ns: self.slack_no_crpr(ctx),
            borrow_ns: latch.map_or(0.0, |l| l.borrow_ns),
            time_given_to_startpoint_ns: latch.map_or(0.0, |l| l.time_given_to_startpoint_ns),
            clk_skew_ns: self.clk_skew(ctx),
            multi_cycle_path: self.multi_cycle_path(),
            path_delay: self.path_delay(),
        }
    }

    /// Emits the one-line form through an external formatter.
    pub fn report_short(&self, ctx: &AnalysisContext, reporter: &mut dyn PathEndReporter) {
        reporter.report_short(&self.summary(ctx));
    }

    /// Emits the full form through an external formatter.
    pub fn report_full(&self, ctx: &AnalysisContext, reporter: &mut dyn PathEndReporter) {
        reporter.report_full(&self.summary(ctx), &self.detail(ctx));
    }
}
