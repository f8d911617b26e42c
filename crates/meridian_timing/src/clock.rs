//! Clock definitions, clock edges, and launch/capture cycle accounting.
//!
//! A [`Clock`] is the constraint-side view of a clock domain: period,
//! waveform, defined source insertion delay, and per-clock uncertainty. The
//! [`CycleAccting`] half of this module answers the question every clocked
//! check starts from: given a launch edge and a capture edge, which pair of
//! edge occurrences governs the check, and what time offsets does that pair
//! impose on the source arrival and the capture-edge time?

use crate::check::{GenericRole, RiseFall};
use crate::ids::ClockId;
use meridian_common::{Delay, Name};
use serde::{Deserialize, Serialize};

/// Edge-occurrence pairing is searched over at most this many source-clock
/// cycles of the common hyperperiod. Commensurable clock pairs in real
/// designs resolve in a handful of cycles; pairs that exceed the cap fall
/// back to the default single-cycle relation so the walk stays bounded.
const MAX_ACCTING_CYCLES: u64 = 1024;

/// Comparison guard for edge-time arithmetic, well below the femtosecond
/// resolution the hyperperiod search quantizes to.
const EDGE_TIME_EPS: f64 = 1e-6;

/// A clock definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clock {
    /// The unique ID of this clock.
    pub id: ClockId,
    /// The name of the clock domain.
    pub name: Name,
    /// Clock period in nanoseconds.
    pub period_ns: f64,
    /// Optional waveform specification: (rise_time_ns, fall_time_ns) within
    /// the period. If `None`, defaults to 50% duty cycle: (0, period/2).
    pub waveform: Option<(f64, f64)>,
    /// Defined source insertion delay per corner (`set_clock_latency -source`).
    pub insertion: Delay,
    /// Explicit setup uncertainty, if one was configured. `None` is distinct
    /// from an explicit zero.
    pub uncertainty_setup_ns: Option<f64>,
    /// Explicit hold uncertainty, if one was configured.
    pub uncertainty_hold_ns: Option<f64>,
}

impl Clock {
    /// Creates a clock with the given period, default waveform, no insertion
    /// delay, and no uncertainty.
    pub fn new(id: ClockId, name: Name, period_ns: f64) -> Self {
        Self {
            id,
            name,
            period_ns,
            waveform: None,
            insertion: Delay::ZERO,
            uncertainty_setup_ns: None,
            uncertainty_hold_ns: None,
        }
    }

    /// Time of the rising edge within the period.
    pub fn rise_time(&self) -> f64 {
        self.waveform.map_or(0.0, |(rise, _)| rise)
    }

    /// Time of the falling edge within the period.
    pub fn fall_time(&self) -> f64 {
        self.waveform.map_or(self.period_ns / 2.0, |(_, fall)| fall)
    }

    /// Returns the edge of this clock with the given transition sense.
    pub fn edge(&self, rf: RiseFall) -> ClockEdge {
        let time_ns = match rf {
            RiseFall::Rise => self.rise_time(),
            RiseFall::Fall => self.fall_time(),
        };
        ClockEdge {
            clock: self.id,
            rf,
            time_ns,
            period_ns: self.period_ns,
        }
    }

    /// Width of the clock phase opened by the given edge: the high pulse for
    /// a rising edge, the low pulse for a falling edge.
    pub fn pulse_width(&self, open_rf: RiseFall) -> f64 {
        let rise = self.rise_time();
        let fall = self.fall_time();
        let high = if fall > rise {
            fall - rise
        } else {
            self.period_ns - rise + fall
        };
        match open_rf {
            RiseFall::Rise => high,
            RiseFall::Fall => self.period_ns - high,
        }
    }

    /// Explicit per-clock uncertainty for the given check direction, if one
    /// was configured.
    pub fn uncertainty(&self, role: GenericRole) -> Option<f64> {
        match role {
            GenericRole::Setup => self.uncertainty_setup_ns,
            GenericRole::Hold => self.uncertainty_hold_ns,
        }
    }
}

/// A lightweight reference to one edge of a clock in the analysis context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClockEdgeRef {
    /// The referenced clock.
    pub clock: ClockId,
    /// Which edge of that clock.
    pub rf: RiseFall,
}

/// A resolved clock edge: its clock, transition sense, nominal time within
/// the period, and the period itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClockEdge {
    /// The clock this edge belongs to.
    pub clock: ClockId,
    /// The transition sense of this edge.
    pub rf: RiseFall,
    /// Nominal edge time within the period, in nanoseconds.
    pub time_ns: f64,
    /// Period of the owning clock, in nanoseconds.
    pub period_ns: f64,
}

impl ClockEdge {
    /// Returns the non-owning reference form of this edge.
    pub fn as_ref(&self) -> ClockEdgeRef {
        ClockEdgeRef {
            clock: self.clock,
            rf: self.rf,
        }
    }
}

/// The governing launch/capture edge pairing between a source clock edge and
/// a target clock edge.
///
/// Offsets are expressed so that path arrivals stay in the launch-occurrence
/// frame: `src_offset_ns` is added to a source arrival only for reporting in
/// the absolute frame, while `target_time_offset` is already normalized to
/// the launch occurrence and is added directly to the nominal capture-edge
/// time to obtain the capture time a required-time formula uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleAccting {
    /// Offset of the governing launch occurrence from the nominal source
    /// edge, in nanoseconds.
    pub src_offset_ns: f64,
    /// Normalized capture-time offset for setup-generic checks.
    pub tgt_offset_setup_ns: f64,
    /// Normalized capture-time offset for hold-generic checks: the setup
    /// capture edge moved one capture period earlier.
    pub tgt_offset_hold_ns: f64,
}

impl CycleAccting {
    /// Source-arrival offset into the absolute frame. The same launch
    /// occurrence governs both check directions.
    pub fn source_time_offset(&self, _role: GenericRole) -> f64 {
        self.src_offset_ns
    }

    /// Normalized capture-time offset for the given check direction.
    pub fn target_time_offset(&self, role: GenericRole) -> f64 {
        match role {
            GenericRole::Setup => self.tgt_offset_setup_ns,
            GenericRole::Hold => self.tgt_offset_hold_ns,
        }
    }
}

/// Finds the governing edge pairing between `src_edge` (launch) and
/// `tgt_edge` (capture).
///
/// The setup pairing is the tightest one: over the common hyperperiod, the
/// launch occurrence whose next strictly-later capture occurrence is closest.
/// Ties keep the earliest launch occurrence, so results are deterministic.
/// The hold pairing is the setup pairing shifted one capture period earlier.
pub fn cycle_accting(src_edge: ClockEdge, tgt_edge: ClockEdge) -> CycleAccting {
    let ps = src_edge.period_ns;
    let pt = tgt_edge.period_ns;
    let n_src = hyperperiod_src_cycles(ps, pt);

    let mut best: Option<(f64, f64, f64)> = None; // (separation, src occurrence, tgt occurrence)
    for i in 0..n_src {
        let s = src_edge.time_ns + i as f64 * ps;
        let t = next_occurrence_after(tgt_edge.time_ns, pt, s);
        let sep = t - s;
        let better = match best {
            None => true,
            Some((best_sep, _, _)) => sep < best_sep - EDGE_TIME_EPS,
        };
        if better {
            best = Some((sep, s, t));
        }
    }
    // n_src >= 1 always, so best is set.
    let (_, s, t) = best.unwrap_or((pt, src_edge.time_ns, src_edge.time_ns + pt));

    let src_offset_ns = s - src_edge.time_ns;
    // Normalize the capture time back into the launch-occurrence frame.
    let tgt_offset_setup_ns = (t - src_offset_ns) - tgt_edge.time_ns;
    CycleAccting {
        src_offset_ns,
        tgt_offset_setup_ns,
        tgt_offset_hold_ns: tgt_offset_setup_ns - pt,
    }
}

/// Number of source-clock cycles to scan: the common hyperperiod measured in
/// source periods, computed on femtosecond integers, capped at
/// [`MAX_ACCTING_CYCLES`].
fn hyperperiod_src_cycles(src_period_ns: f64, tgt_period_ns: f64) -> u64 {
    let ps = (src_period_ns * 1e6).round() as u64;
    let pt = (tgt_period_ns * 1e6).round() as u64;
    if ps == 0 || pt == 0 {
        return 1;
    }
    let cycles = pt / gcd(ps, pt);
    if cycles == 0 || cycles > MAX_ACCTING_CYCLES {
        1
    } else {
        cycles
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// First occurrence of a periodic edge strictly after time `after`.
fn next_occurrence_after(edge_time_ns: f64, period_ns: f64, after: f64) -> f64 {
    if period_ns <= 0.0 {
        return edge_time_ns;
    }
    let k = ((after - edge_time_ns) / period_ns).floor() as i64 + 1;
    let mut t = edge_time_ns + k as f64 * period_ns;
    // Guard against landing on `after` itself through rounding.
    while t <= after + EDGE_TIME_EPS {
        t += period_ns;
    }
    while t - period_ns > after + EDGE_TIME_EPS {
        t -= period_ns;
    }
    t
}
