//! Opaque ID newtypes for timing-model entities.
//!
//! Path ends never own clocks, timing arcs, or exceptions; they hold these
//! `u32` ids into the [`AnalysisContext`](crate::context::AnalysisContext)
//! tables, which outlive every path end. Owned data (the realized paths) is
//! held by value instead, so the owned/borrowed distinction is visible in the
//! types.

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` index.
            pub fn from_raw(index: u32) -> Self {
                Self(index)
            }

            /// Returns the raw `u32` index.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }
    };
}

define_id!(
    /// Opaque, copyable ID for a clock definition.
    ClockId
);

define_id!(
    /// Opaque, copyable ID for a timing-check arc in the cell model.
    ArcId
);

define_id!(
    /// Opaque, copyable ID for a timing-graph edge carrying a check arc.
    ///
    /// The graph itself is out of scope here; the id is carried through so
    /// report formatters can refer back to the graph edge a check came from.
    EdgeId
);

define_id!(
    /// Opaque, copyable ID for a multicycle-path exception.
    McpId
);

define_id!(
    /// Opaque, copyable ID for a min/max path-delay exception.
    PathDelayId
);

define_id!(
    /// Opaque, copyable ID for an output-delay exception.
    OutputDelayId
);

define_id!(
    /// Opaque, copyable ID for a data-to-data check exception.
    DataCheckId
);
