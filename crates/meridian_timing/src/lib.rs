//! Path-end constraint modeling for the Meridian static timing analyzer.
//!
//! Given a computed timing path, this crate classifies the constraint that
//! terminates it — register setup/hold check, latch borrow, output delay,
//! gated-clock check, data-to-data check, explicit min/max delay exception,
//! or none — and computes the quantities that decide timing closure:
//! required time, margin, slack, common-path pessimism removal (CRPR),
//! multicycle-path cycle adjustment, clock uncertainty composition, and
//! latch borrowing.
//!
//! # Usage
//!
//! ```ignore
//! use meridian_timing::{AnalysisContext, PathEnd, order};
//!
//! // Populate and validate the context (clocks, arcs, exceptions).
//! let mut ctx = AnalysisContext::new();
//! let clk = ctx.add_clock(names.intern("clk"), 10.0);
//! ctx.validate()?;
//!
//! // One path end per discovered endpoint, built by the path search.
//! let end = PathEnd::check(path, arc, edge, clk_path, None, None);
//! println!("slack: {:.3} ns", end.slack(&ctx));
//!
//! // Worst-first selection across a design.
//! ends.sort_by(|a, b| order::cmp(a, b, &ctx));
//! ```
//!
//! # Architecture
//!
//! - [`clock`] — clock definitions, edges, and launch/capture cycle accounting
//! - [`check`] — timing-check roles and cell-model check arcs
//! - [`exceptions`] — multicycle, path-delay, output-delay, data-check objects
//! - [`path`] — realized timing paths handed over by the search
//! - [`context`] — the read-only tables and options path ends compute against
//! - [`crpr`] — common-path pessimism removal and its memo cell
//! - [`path_end`] — the seven-variant taxonomy and required/slack contract
//! - [`latch`] — level-sensitive latch time borrowing
//! - [`order`] — worst-first total orders over path ends
//! - [`report`] — field bundles handed to external report formatters

#![warn(missing_docs)]

pub mod check;
pub mod clock;
pub mod context;
pub mod crpr;
pub mod exceptions;
pub mod ids;
pub mod latch;
pub mod order;
pub mod path;
pub mod path_end;
pub mod report;

pub use check::{GenericRole, RiseFall, TimingArc, TimingRole};
pub use clock::{cycle_accting, Clock, ClockEdge, ClockEdgeRef, CycleAccting};
pub use context::{AnalysisContext, AnalysisOptions};
pub use crpr::{find_crpr, Memoized};
pub use exceptions::{
    AppliesTo, ClockBasis, DataCheckException, MultiCyclePath, OutputDelayException,
    PathDelayException,
};
pub use ids::{ArcId, ClockId, DataCheckId, EdgeId, McpId, OutputDelayId, PathDelayId};
pub use latch::{LatchBorrowInfo, LatchRequired};
pub use order::{PathEndLess, PathEndNoCrprLess, PathEndSlackLess};
pub use path::{ClockTreeHop, Path};
pub use path_end::{PathEnd, PathEndType};
pub use report::{PathEndDetail, PathEndReporter, PathEndSummary};
