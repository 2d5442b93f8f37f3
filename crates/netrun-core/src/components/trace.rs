//! The per-player trace state: level, exposure tier, append-only log.
//!
//! Every mutation goes through [`TraceState::apply_event`], which is
//! idempotent by event id - the at-least-once delivery of the persistence
//! layer can replay records without double-applying them.

use serde::{Deserialize, Serialize};

use netrun_logic::trace::{clamp_level, ExposureTier};

use crate::intrusion::Stage;

/// Why a trace delta happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TraceCause {
    StageSuccess(Stage),
    StageFailure(Stage),
    Abort,
    /// Passive reduction over idle time.
    Decay,
    /// Explicit one-time reduction (e.g. a purchased cloak effect).
    CloakPurchase,
}

/// One entry in the append-only trace log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    /// Engine-wide unique id; the idempotence key.
    pub id: u64,
    /// Simulation time in hours.
    pub at: f64,
    pub delta: f32,
    pub cause: TraceCause,
}

/// Accumulated detection risk for one player. Lives as long as the
/// player; every intrusion action and mission resolution feeds it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraceState {
    /// Current level, always within [0, 100].
    pub level: f32,
    /// Always the highest threshold at or below `level`.
    pub exposure: ExposureTier,
    pub events: Vec<TraceEvent>,
}

impl TraceState {
    /// Apply one event. Returns false (and changes nothing) if the event
    /// id has already been applied.
    pub fn apply_event(&mut self, event: TraceEvent) -> bool {
        if self.events.iter().any(|e| e.id == event.id) {
            return false;
        }
        self.level = clamp_level(self.level + event.delta);
        self.exposure = ExposureTier::from_level(self.level);
        self.events.push(event);
        true
    }

    pub fn is_burned(&self) -> bool {
        self.exposure == ExposureTier::Burned
    }

    /// Most recent events, newest last.
    pub fn recent_events(&self, limit: usize) -> &[TraceEvent] {
        let start = self.events.len().saturating_sub(limit);
        &self.events[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: u64, delta: f32) -> TraceEvent {
        TraceEvent {
            id,
            at: 0.0,
            delta,
            cause: TraceCause::StageSuccess(Stage::Scanning),
        }
    }

    #[test]
    fn level_clamped_under_extreme_deltas() {
        let mut state = TraceState::default();
        state.apply_event(event(1, 1000.0));
        assert!((state.level - 100.0).abs() < f32::EPSILON);
        assert_eq!(state.exposure, ExposureTier::Burned);

        state.apply_event(event(2, -1000.0));
        assert!((state.level - 0.0).abs() < f32::EPSILON);
        assert_eq!(state.exposure, ExposureTier::Covert);
    }

    #[test]
    fn replayed_event_id_is_a_noop() {
        let mut state = TraceState::default();
        assert!(state.apply_event(event(7, 30.0)));
        let snapshot = state.clone();

        assert!(!state.apply_event(event(7, 30.0)));
        assert_eq!(state, snapshot);
        assert_eq!(state.events.len(), 1);
    }

    #[test]
    fn exposure_tracks_level() {
        let mut state = TraceState::default();
        state.apply_event(event(1, 49.0));
        assert_eq!(state.exposure, ExposureTier::Covert);
        state.apply_event(event(2, 1.0));
        assert_eq!(state.exposure, ExposureTier::Flagged);
        state.apply_event(event(3, 25.0));
        assert_eq!(state.exposure, ExposureTier::Hunted);
        state.apply_event(event(4, 25.0));
        assert!(state.is_burned());
        state.apply_event(event(5, -60.0));
        assert_eq!(state.exposure, ExposureTier::Covert);
    }

    #[test]
    fn recent_events_window() {
        let mut state = TraceState::default();
        for id in 0..10 {
            state.apply_event(event(id, 1.0));
        }
        let recent = state.recent_events(3);
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[2].id, 9);
        assert_eq!(state.recent_events(100).len(), 10);
    }
}
