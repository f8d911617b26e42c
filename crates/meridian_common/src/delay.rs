//! Corner-indexed delay values and early/late analysis selection.
//!
//! Every characterized delay in Meridian carries its fast, nominal, and slow
//! corner values. Timing math then selects a single number either by the
//! context's active [`Corner`] (check margins, defined insertion delays) or by
//! an early/late pairing ([`MinMax`]) when setup and hold checks need opposite
//! extremes of the same quantity.

use serde::{Deserialize, Serialize};

/// A delay characterized at the fast, nominal, and slow corners, in
/// nanoseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Delay {
    /// Minimum delay in nanoseconds (fast corner).
    pub min_ns: f64,
    /// Typical delay in nanoseconds (nominal corner).
    pub typ_ns: f64,
    /// Maximum delay in nanoseconds (slow corner).
    pub max_ns: f64,
}

impl Delay {
    /// A zero delay (no propagation time).
    pub const ZERO: Self = Self {
        min_ns: 0.0,
        typ_ns: 0.0,
        max_ns: 0.0,
    };

    /// Creates a new delay with the given min/typ/max values.
    pub fn new(min_ns: f64, typ_ns: f64, max_ns: f64) -> Self {
        Self {
            min_ns,
            typ_ns,
            max_ns,
        }
    }

    /// Creates a delay with the same value at all three corners.
    pub fn uniform(value_ns: f64) -> Self {
        Self::new(value_ns, value_ns, value_ns)
    }

    /// Returns the value at the given analysis corner.
    pub fn at(&self, corner: Corner) -> f64 {
        match corner {
            Corner::Min => self.min_ns,
            Corner::Typ => self.typ_ns,
            Corner::Max => self.max_ns,
        }
    }

    /// Returns the early (fast-corner) value.
    pub fn early(&self) -> f64 {
        self.min_ns
    }

    /// Returns the late (slow-corner) value.
    pub fn late(&self) -> f64 {
        self.max_ns
    }
}

impl Default for Delay {
    fn default() -> Self {
        Self::ZERO
    }
}

/// The analysis corner used when a single value is needed from a [`Delay`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    /// Fast corner (minimum delays).
    Min,
    /// Nominal corner (typical delays).
    Typ,
    /// Slow corner (maximum delays).
    Max,
}

/// The min/max analysis side of a timing path.
///
/// A max path carries late arrivals and feeds setup-style checks; a min path
/// carries early arrivals and feeds hold-style checks. The side also fixes the
/// sign convention of slack: positive slack always means the constraint is
/// met.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MinMax {
    /// Early/minimum analysis side.
    Min,
    /// Late/maximum analysis side.
    Max,
}

/// Early/late corner selection. Synonym for [`MinMax`]: early pairs with
/// `Min`, late with `Max`.
pub type EarlyLate = MinMax;

impl MinMax {
    /// Returns the opposite analysis side.
    pub fn opposite(self) -> Self {
        match self {
            MinMax::Min => MinMax::Max,
            MinMax::Max => MinMax::Min,
        }
    }

    /// Selects the early or late value of a [`Delay`] for this side.
    pub fn select(self, delay: Delay) -> f64 {
        match self {
            MinMax::Min => delay.early(),
            MinMax::Max => delay.late(),
        }
    }

    /// The required-time sentinel for an endpoint with no constraint on this
    /// side: `+inf` for max paths, `-inf` for min paths, so slack is `+inf`
    /// either way.
    pub fn unconstrained_required(self) -> f64 {
        match self {
            MinMax::Min => f64::NEG_INFINITY,
            MinMax::Max => f64::INFINITY,
        }
    }

    /// Slack in the met-positive convention: `required - arrival` on the max
    /// side, `arrival - required` on the min side.
    pub fn slack(self, required_ns: f64, arrival_ns: f64) -> f64 {
        match self {
            MinMax::Min => arrival_ns - required_ns,
            MinMax::Max => required_ns - arrival_ns,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_corner_selection() {
        let d = Delay::new(0.5, 1.0, 2.0);
        assert_eq!(d.at(Corner::Min), 0.5);
        assert_eq!(d.at(Corner::Typ), 1.0);
        assert_eq!(d.at(Corner::Max), 2.0);
        assert_eq!(d.early(), 0.5);
        assert_eq!(d.late(), 2.0);
    }

    #[test]
    fn delay_uniform() {
        let d = Delay::uniform(1.5);
        assert_eq!(d.min_ns, 1.5);
        assert_eq!(d.typ_ns, 1.5);
        assert_eq!(d.max_ns, 1.5);
    }

    #[test]
    fn delay_default_is_zero() {
        assert_eq!(Delay::default(), Delay::ZERO);
    }

    #[test]
    fn min_max_opposite() {
        assert_eq!(MinMax::Min.opposite(), MinMax::Max);
        assert_eq!(MinMax::Max.opposite(), MinMax::Min);
    }

    #[test]
    fn min_max_select() {
        let d = Delay::new(0.2, 0.5, 0.9);
        assert_eq!(MinMax::Min.select(d), 0.2);
        assert_eq!(MinMax::Max.select(d), 0.9);
    }

    #[test]
    fn unconstrained_required_sentinels() {
        assert_eq!(MinMax::Max.unconstrained_required(), f64::INFINITY);
        assert_eq!(MinMax::Min.unconstrained_required(), f64::NEG_INFINITY);
    }

    #[test]
    fn slack_sign_convention() {
        // Max side: required 9, arrival 4 -> slack +5 (met).
        assert_eq!(MinMax::Max.slack(9.0, 4.0), 5.0);
        // Min side: required 1, arrival 0.4 -> slack -0.6 (violated).
        assert!((MinMax::Min.slack(1.0, 0.4) + 0.6).abs() < 1e-12);
    }

    #[test]
    fn slack_of_unconstrained_is_infinite() {
        for mm in [MinMax::Min, MinMax::Max] {
            let slack = mm.slack(mm.unconstrained_required(), 3.0);
            assert_eq!(slack, f64::INFINITY);
        }
    }

    #[test]
    fn delay_serde_roundtrip() {
        let d = Delay::new(0.1, 0.2, 0.3);
        let json = serde_json::to_string(&d).unwrap();
        let restored: Delay = serde_json::from_str(&json).unwrap();
        assert_eq!(d, restored);
    }
}
