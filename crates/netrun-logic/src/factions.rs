//! Faction roster and reputation standings.
//!
//! Reputation is a per-faction signed scalar, bucketed into ordered
//! standing labels. Mission outcomes move reputation; standings gate
//! mission eligibility.

use serde::{Deserialize, Serialize};

use crate::constants::reputation;

/// The three powers contesting the city.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FactionId {
    /// A coalition of megacorporations controlling the city.
    Corporate,
    /// A network of independent hackers and activists.
    Underground,
    /// The official city administration and law enforcement.
    Government,
}

impl FactionId {
    pub fn all() -> [FactionId; 3] {
        [Self::Corporate, Self::Underground, Self::Government]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Corporate => "Corporate Alliance",
            Self::Underground => "Underground Network",
            Self::Government => "City Government",
        }
    }
}

/// Ordered standing labels: a later variant is always a better relation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Standing {
    /// Reputation below -50.
    Hostile,
    /// Reputation -50..0.
    Unfriendly,
    /// Reputation 0..50.
    Neutral,
    /// Reputation 50..100.
    Friendly,
    /// Reputation 100 and above.
    TrustedAlly,
}

impl Standing {
    pub fn from_reputation(reputation: i32) -> Self {
        if reputation >= 100 {
            Self::TrustedAlly
        } else if reputation >= 50 {
            Self::Friendly
        } else if reputation >= 0 {
            Self::Neutral
        } else if reputation >= -50 {
            Self::Unfriendly
        } else {
            Self::Hostile
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Hostile => "Hostile",
            Self::Unfriendly => "Unfriendly",
            Self::Neutral => "Neutral",
            Self::Friendly => "Friendly",
            Self::TrustedAlly => "Trusted Ally",
        }
    }
}

/// Reputation delta for a resolved mission.
pub fn mission_reputation_delta(success: bool) -> i32 {
    if success {
        reputation::MISSION_SUCCESS
    } else {
        reputation::MISSION_FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standing_buckets() {
        assert_eq!(Standing::from_reputation(-100), Standing::Hostile);
        assert_eq!(Standing::from_reputation(-51), Standing::Hostile);
        assert_eq!(Standing::from_reputation(-50), Standing::Unfriendly);
        assert_eq!(Standing::from_reputation(-1), Standing::Unfriendly);
        assert_eq!(Standing::from_reputation(0), Standing::Neutral);
        assert_eq!(Standing::from_reputation(49), Standing::Neutral);
        assert_eq!(Standing::from_reputation(50), Standing::Friendly);
        assert_eq!(Standing::from_reputation(99), Standing::Friendly);
        assert_eq!(Standing::from_reputation(100), Standing::TrustedAlly);
    }

    #[test]
    fn standing_ordering() {
        assert!(Standing::Hostile < Standing::Unfriendly);
        assert!(Standing::Unfriendly < Standing::Neutral);
        assert!(Standing::Neutral < Standing::Friendly);
        assert!(Standing::Friendly < Standing::TrustedAlly);
    }

    #[test]
    fn mission_deltas() {
        assert_eq!(mission_reputation_delta(true), 10);
        assert_eq!(mission_reputation_delta(false), -5);
    }
}
