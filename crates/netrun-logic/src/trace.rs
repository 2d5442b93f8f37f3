//! Exposure tiers, alert multipliers, and trace level arithmetic.
//!
//! The trace level is a 0-100 scalar of accumulated detection risk.
//! Crossing fixed thresholds moves the player into discrete exposure
//! tiers, which feed a strength multiplier back into every defense layer
//! the player subsequently faces.

use serde::{Deserialize, Serialize};

use crate::constants::{alert, exposure, DECAY_PER_HOUR, TRACE_MAX, TRACE_MIN};

/// Discrete risk bracket derived from the trace level.
///
/// Ordered: a later variant is always a worse position for the player.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ExposureTier {
    /// Trace < 50: nobody is looking for you yet.
    #[default]
    Covert,
    /// Trace >= 50: flagged in corporate watchlists.
    Flagged,
    /// Trace >= 75: actively hunted by countermeasure teams.
    Hunted,
    /// Trace = 100: identity burned. Terminal consequence hook fires.
    Burned,
}

impl ExposureTier {
    /// Derive the tier from a trace level. Always the highest threshold
    /// at or below the level.
    pub fn from_level(level: f32) -> Self {
        if level >= exposure::BURNED {
            Self::Burned
        } else if level >= exposure::HUNTED {
            Self::Hunted
        } else if level >= exposure::FLAGGED {
            Self::Flagged
        } else {
            Self::Covert
        }
    }

    /// Multiplier applied to every defense layer's base strength while the
    /// player is in this tier. Monotone non-decreasing across tiers.
    pub fn alert_multiplier(self) -> f32 {
        match self {
            Self::Covert => alert::COVERT,
            Self::Flagged => alert::FLAGGED,
            Self::Hunted => alert::HUNTED,
            Self::Burned => alert::BURNED,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Covert => "Covert",
            Self::Flagged => "Flagged",
            Self::Hunted => "Hunted",
            Self::Burned => "Burned",
        }
    }
}

/// Clamp a trace level into the legal [0, 100] range.
pub fn clamp_level(level: f32) -> f32 {
    level.clamp(TRACE_MIN, TRACE_MAX)
}

/// Passive trace reduction for an idle period, as a positive amount.
pub fn decay_amount(idle_hours: f64) -> f32 {
    if idle_hours <= 0.0 {
        return 0.0;
    }
    idle_hours as f32 * DECAY_PER_HOUR
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_thresholds() {
        assert_eq!(ExposureTier::from_level(0.0), ExposureTier::Covert);
        assert_eq!(ExposureTier::from_level(49.9), ExposureTier::Covert);
        assert_eq!(ExposureTier::from_level(50.0), ExposureTier::Flagged);
        assert_eq!(ExposureTier::from_level(74.9), ExposureTier::Flagged);
        assert_eq!(ExposureTier::from_level(75.0), ExposureTier::Hunted);
        assert_eq!(ExposureTier::from_level(99.9), ExposureTier::Hunted);
        assert_eq!(ExposureTier::from_level(100.0), ExposureTier::Burned);
    }

    #[test]
    fn tier_ordering_matches_severity() {
        assert!(ExposureTier::Covert < ExposureTier::Flagged);
        assert!(ExposureTier::Flagged < ExposureTier::Hunted);
        assert!(ExposureTier::Hunted < ExposureTier::Burned);
    }

    #[test]
    fn multiplier_monotone_in_tier() {
        let tiers = [
            ExposureTier::Covert,
            ExposureTier::Flagged,
            ExposureTier::Hunted,
            ExposureTier::Burned,
        ];
        for pair in tiers.windows(2) {
            assert!(pair[0].alert_multiplier() < pair[1].alert_multiplier());
        }
        assert!((ExposureTier::Covert.alert_multiplier() - 1.0).abs() < f32::EPSILON);
        assert!((ExposureTier::Burned.alert_multiplier() - 1.5).abs() < f32::EPSILON);
    }

    #[test]
    fn clamp_bounds() {
        assert!((clamp_level(-1000.0) - 0.0).abs() < f32::EPSILON);
        assert!((clamp_level(1000.0) - 100.0).abs() < f32::EPSILON);
        assert!((clamp_level(42.5) - 42.5).abs() < f32::EPSILON);
    }

    #[test]
    fn decay_scales_with_hours() {
        assert!((decay_amount(1.0) - 2.0).abs() < f32::EPSILON);
        assert!((decay_amount(3.5) - 7.0).abs() < f32::EPSILON);
        assert!(decay_amount(0.0).abs() < f32::EPSILON);
        assert!(decay_amount(-2.0).abs() < f32::EPSILON);
    }
}
