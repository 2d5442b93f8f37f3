//! Defense layers and the intrusion success probability formula.
//!
//! A target carries an ordered list of defense layers. Each intrusion
//! stage resolves against one layer: the layer's base strength is scaled
//! by the player's alert multiplier, reduced by applicable tool effects,
//! and fed through a monotone decreasing probability curve.

use serde::{Deserialize, Serialize};

/// The kinds of defense layer a target can mount, in the order they are
/// encountered during an intrusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefenseKind {
    /// Perimeter filtering, resolved by the scan stage.
    Firewall,
    /// Watches for active exploitation, resolved by the exploit stage.
    IntrusionDetection,
    /// Protects data at rest, resolved by the download stage.
    Encryption,
}

impl DefenseKind {
    /// Layer order as encountered by an attempt, front to back.
    pub fn ordered() -> [DefenseKind; 3] {
        [
            Self::Firewall,
            Self::IntrusionDetection,
            Self::Encryption,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Firewall => "Firewall",
            Self::IntrusionDetection => "Intrusion Detection",
            Self::Encryption => "Encryption",
        }
    }
}

/// One resistance component of a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefenseLayer {
    pub kind: DefenseKind,
    /// Base strength, drawn from the tier-scaled range at generation time.
    pub strength: u32,
}

/// Inclusive strength range for a difficulty tier.
pub fn strength_range(tier: u8) -> (u32, u32) {
    let tier = tier as u32;
    (tier * 6, tier * 10)
}

/// Effective strength of a layer against a specific player: base strength
/// scaled up by alertness, reduced by tool effects, floored at zero.
pub fn effective_strength(base: u32, alert_multiplier: f32, tool_reduction: f32) -> f32 {
    (base as f32 * alert_multiplier - tool_reduction).max(0.0)
}

/// Probability that one resolution step beats a layer of the given
/// effective strength.
///
/// `p = clamp(1 - effective / 120, 0.05, 1.0)`
///
/// Monotone decreasing in effective strength. p reaches 1.0 only when the
/// effective strength has been ground down to zero, so a fully-tooled run
/// is deterministic while any residual defense leaves residual risk.
pub fn success_probability(effective: f32) -> f32 {
    (1.0 - effective / 120.0).clamp(0.05, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strength_range_scales_with_tier() {
        assert_eq!(strength_range(1), (6, 10));
        assert_eq!(strength_range(5), (30, 50));
        assert_eq!(strength_range(10), (60, 100));
    }

    #[test]
    fn effective_strength_floors_at_zero() {
        assert!((effective_strength(10, 1.0, 50.0) - 0.0).abs() < f32::EPSILON);
        assert!((effective_strength(10, 1.0, 4.0) - 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn effective_strength_grows_with_alertness() {
        let covert = effective_strength(40, 1.0, 0.0);
        let flagged = effective_strength(40, 1.1, 0.0);
        let burned = effective_strength(40, 1.5, 0.0);
        assert!(covert < flagged);
        assert!(flagged < burned);
        assert!((burned - 60.0).abs() < f32::EPSILON);
    }

    #[test]
    fn probability_monotone_decreasing() {
        let mut last = success_probability(0.0);
        for strength in 1..200 {
            let p = success_probability(strength as f32);
            assert!(p <= last, "p rose between {} and {}", strength - 1, strength);
            last = p;
        }
    }

    #[test]
    fn probability_bounds() {
        assert!((success_probability(0.0) - 1.0).abs() < f32::EPSILON);
        assert!((success_probability(60.0) - 0.5).abs() < f32::EPSILON);
        assert!((success_probability(400.0) - 0.05).abs() < f32::EPSILON);
    }
}
