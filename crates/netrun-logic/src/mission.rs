//! Mission specs and eligibility checks.
//!
//! The mission ledger (an external collaborator) hands the core a
//! `MissionSpec` per assignment: which target to generate, at what tier,
//! under which seed, and what the player must already be to take the job.

use serde::{Deserialize, Serialize};

use crate::constants::TRACE_MAX;
use crate::factions::{FactionId, Standing};

/// Everything the core needs to know about a mission assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionSpec {
    pub mission_id: String,
    /// Target system identifier; keys the deterministic generation stream.
    pub target_id: String,
    /// Difficulty tier, 1..=MAX_TIER.
    pub tier: u8,
    /// Campaign seed for this assignment.
    pub seed: u64,
    pub faction: FactionId,
    pub credit_reward: u32,
    /// Minimum standing with the issuing faction.
    pub required_standing: Standing,
}

/// Whether a player may accept a mission.
///
/// Two gates: standing with the issuing faction, and the burned-identity
/// lockout. At trace 100 no faction that demands Friendly or better will
/// touch a known actor.
pub fn eligible(required: Standing, standing: Standing, trace_level: f32) -> bool {
    if trace_level >= TRACE_MAX && required >= Standing::Friendly {
        return false;
    }
    standing >= required
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standing_gate() {
        assert!(eligible(Standing::Neutral, Standing::Neutral, 0.0));
        assert!(eligible(Standing::Neutral, Standing::TrustedAlly, 0.0));
        assert!(!eligible(Standing::Friendly, Standing::Neutral, 0.0));
        assert!(!eligible(Standing::TrustedAlly, Standing::Friendly, 0.0));
    }

    #[test]
    fn burned_identity_blocks_trusted_work() {
        // At trace 100, anything requiring Friendly or better is off the table
        assert!(!eligible(Standing::Friendly, Standing::TrustedAlly, 100.0));
        assert!(!eligible(Standing::TrustedAlly, Standing::TrustedAlly, 100.0));
        // Low-trust work is still available
        assert!(eligible(Standing::Neutral, Standing::Friendly, 100.0));
        assert!(eligible(Standing::Hostile, Standing::Neutral, 100.0));
    }

    #[test]
    fn lockout_only_at_the_cap() {
        assert!(eligible(Standing::Friendly, Standing::Friendly, 99.9));
        assert!(!eligible(Standing::Friendly, Standing::Friendly, 100.0));
    }
}
