//! Per-player faction reputation book.
//!
//! Same event-sourced discipline as the trace state: an append-only
//! history with idempotent application, plus materialized per-faction
//! records.

use serde::{Deserialize, Serialize};

use netrun_logic::factions::{FactionId, Standing};

/// Why a reputation change happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReputationCause {
    MissionSuccess,
    MissionFailure,
    /// Narrative or administrative adjustment from the external ledger.
    Adjustment,
}

/// One entry in the reputation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReputationEvent {
    /// Engine-wide unique id; the idempotence key.
    pub id: u64,
    /// Simulation time in hours.
    pub at: f64,
    pub faction: FactionId,
    pub delta: i32,
    pub cause: ReputationCause,
}

/// Materialized standing with one faction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionRecord {
    pub reputation: i32,
    pub missions_completed: u32,
    pub missions_failed: u32,
}

/// A player's relations with every faction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactionBook {
    pub corporate: FactionRecord,
    pub underground: FactionRecord,
    pub government: FactionRecord,
    pub history: Vec<ReputationEvent>,
}

impl FactionBook {
    pub fn record(&self, faction: FactionId) -> &FactionRecord {
        match faction {
            FactionId::Corporate => &self.corporate,
            FactionId::Underground => &self.underground,
            FactionId::Government => &self.government,
        }
    }

    fn record_mut(&mut self, faction: FactionId) -> &mut FactionRecord {
        match faction {
            FactionId::Corporate => &mut self.corporate,
            FactionId::Underground => &mut self.underground,
            FactionId::Government => &mut self.government,
        }
    }

    pub fn standing(&self, faction: FactionId) -> Standing {
        Standing::from_reputation(self.record(faction).reputation)
    }

    /// Apply one event. Returns false (and changes nothing) if the event
    /// id has already been applied.
    pub fn apply_event(&mut self, event: ReputationEvent) -> bool {
        if self.history.iter().any(|e| e.id == event.id) {
            return false;
        }
        let record = self.record_mut(event.faction);
        record.reputation += event.delta;
        match event.cause {
            ReputationCause::MissionSuccess => record.missions_completed += 1,
            ReputationCause::MissionFailure => record.missions_failed += 1,
            ReputationCause::Adjustment => {}
        }
        self.history.push(event);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: u64, faction: FactionId, delta: i32, cause: ReputationCause) -> ReputationEvent {
        ReputationEvent {
            id,
            at: 0.0,
            faction,
            delta,
            cause,
        }
    }

    #[test]
    fn records_isolated_per_faction() {
        let mut book = FactionBook::default();
        book.apply_event(event(1, FactionId::Underground, 10, ReputationCause::MissionSuccess));
        book.apply_event(event(2, FactionId::Corporate, -5, ReputationCause::MissionFailure));

        assert_eq!(book.record(FactionId::Underground).reputation, 10);
        assert_eq!(book.record(FactionId::Underground).missions_completed, 1);
        assert_eq!(book.record(FactionId::Corporate).reputation, -5);
        assert_eq!(book.record(FactionId::Corporate).missions_failed, 1);
        assert_eq!(book.record(FactionId::Government), &FactionRecord::default());
    }

    #[test]
    fn standing_derives_from_reputation() {
        let mut book = FactionBook::default();
        assert_eq!(book.standing(FactionId::Underground), Standing::Neutral);
        for id in 0..5 {
            book.apply_event(event(id, FactionId::Underground, 10, ReputationCause::MissionSuccess));
        }
        assert_eq!(book.standing(FactionId::Underground), Standing::Friendly);
    }

    #[test]
    fn replayed_event_id_is_a_noop() {
        let mut book = FactionBook::default();
        assert!(book.apply_event(event(1, FactionId::Government, 10, ReputationCause::MissionSuccess)));
        let snapshot = book.clone();
        assert!(!book.apply_event(event(1, FactionId::Government, 10, ReputationCause::MissionSuccess)));
        assert_eq!(book, snapshot);
    }
}
