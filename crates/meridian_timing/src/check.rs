//! Timing-check roles and check arcs from the cell model.
//!
//! A check arc is the cell-library view of a constraint at an endpoint: a
//! setup or hold time at a register data pin, a recovery/removal time at an
//! async control pin. Path-end formulas only consume the arc's margin at the
//! active corner and its role; arc selection itself happens upstream.

use crate::ids::ArcId;
use meridian_common::{Corner, Delay};
use serde::{Deserialize, Serialize};

/// The sense of a signal transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiseFall {
    /// A low-to-high transition.
    Rise,
    /// A high-to-low transition.
    Fall,
}

impl RiseFall {
    /// Returns the opposite transition sense.
    pub fn opposite(self) -> Self {
        match self {
            RiseFall::Rise => RiseFall::Fall,
            RiseFall::Fall => RiseFall::Rise,
        }
    }

    /// Short lowercase name, as used in reports.
    pub fn name(self) -> &'static str {
        match self {
            RiseFall::Rise => "rise",
            RiseFall::Fall => "fall",
        }
    }
}

/// The generic direction of a timing check: does it bound late arrivals
/// (setup-like) or early arrivals (hold-like)?
///
/// Every concrete [`TimingRole`] folds to one of these; all required-time and
/// CRPR sign decisions depend only on the generic role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GenericRole {
    /// Late-arrival bound: data must arrive before the check edge.
    Setup,
    /// Early-arrival bound: data must arrive after the check edge.
    Hold,
}

/// The specific kind of timing check constraining a path end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimingRole {
    /// Register setup check.
    Setup,
    /// Register hold check.
    Hold,
    /// Recovery check at an async control pin (setup-like).
    Recovery,
    /// Removal check at an async control pin (hold-like).
    Removal,
    /// Setup-like check of an output port against its output delay.
    OutputSetup,
    /// Hold-like check of an output port against its output delay.
    OutputHold,
    /// Setup-like check of a clock-gate enable.
    GatedClockSetup,
    /// Hold-like check of a clock-gate enable.
    GatedClockHold,
    /// Setup-like data-to-data check.
    DataSetup,
    /// Hold-like data-to-data check.
    DataHold,
}

impl TimingRole {
    /// Folds this role to its generic setup/hold direction.
    pub fn generic(self) -> GenericRole {
        match self {
            TimingRole::Setup
            | TimingRole::Recovery
            | TimingRole::OutputSetup
            | TimingRole::GatedClockSetup
            | TimingRole::DataSetup => GenericRole::Setup,
            TimingRole::Hold
            | TimingRole::Removal
            | TimingRole::OutputHold
            | TimingRole::GatedClockHold
            | TimingRole::DataHold => GenericRole::Hold,
        }
    }

    /// Human-readable role name, as used in reports.
    pub fn name(self) -> &'static str {
        match self {
            TimingRole::Setup => "setup",
            TimingRole::Hold => "hold",
            TimingRole::Recovery => "recovery",
            TimingRole::Removal => "removal",
            TimingRole::OutputSetup => "output setup",
            TimingRole::OutputHold => "output hold",
            TimingRole::GatedClockSetup => "clock gating setup",
            TimingRole::GatedClockHold => "clock gating hold",
            TimingRole::DataSetup => "data setup",
            TimingRole::DataHold => "data hold",
        }
    }
}

/// A timing-check arc from the cell model.
///
/// Carries the check margin characterized per corner and, for endpoints
/// inside a timing-macro abstraction, the extra clock-tree delay the macro
/// model folds into the check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingArc {
    /// The unique ID of this arc.
    pub id: ArcId,
    /// The kind of check this arc models.
    pub role: TimingRole,
    /// The check margin (setup/hold limit) per corner, in nanoseconds.
    pub margin: Delay,
    /// Extra clock-tree delay inside a macro abstraction, in nanoseconds.
    /// Zero for ordinary cells.
    pub macro_clk_tree_delay_ns: f64,
}

impl TimingArc {
    /// Creates an arc with no macro clock-tree delay.
    pub fn new(id: ArcId, role: TimingRole, margin: Delay) -> Self {
        Self {
            id,
            role,
            margin,
            macro_clk_tree_delay_ns: 0.0,
        }
    }

    /// Returns the check margin at the given analysis corner.
    pub fn margin_at(&self, corner: Corner) -> f64 {
        self.margin.at(corner)
    }
}
