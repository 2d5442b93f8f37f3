//! Collaborator seams: the mission/faction ledger and the event sink.
//!
//! The core never formats user-facing text and never blocks on I/O; it
//! hands structured records across these traits. Delivery to the sink is
//! at-least-once - every record carries a unique event id and downstream
//! application is idempotent, so retried appends are harmless.

use serde::{Deserialize, Serialize};

use crate::components::faction::ReputationEvent;
use crate::components::trace::TraceEvent;
use crate::error::PersistenceError;
use crate::intrusion::AttemptOutcome;

/// Final report handed to the mission ledger, exactly once per attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptReport {
    pub attempt_id: u64,
    pub player_id: String,
    pub target_id: String,
    pub outcome: AttemptOutcome,
    /// Trace accumulated over the whole attempt.
    pub trace_delta: f32,
    /// Objective data, present only for successful attempts.
    pub objective_payload: Option<String>,
}

/// The mission/faction ledger's listening side. Reacts to attempt
/// completion and to the burned-identity consequence; the core only
/// reports, it never decides narrative outcomes.
pub trait OutcomeLedger {
    fn report_outcome(&mut self, report: &AttemptReport);
    /// Fired once each time a player's trace crosses into 100.
    fn full_exposure(&mut self, player_id: &str);
}

/// One record of the append-only state log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LogRecord {
    Trace(TraceEvent),
    Reputation(ReputationEvent),
}

/// Persistence collaborator. Appends are written ahead of in-memory
/// application, so a crash mid-write never leaves state the log cannot
/// reproduce.
pub trait EventSink {
    fn append(&mut self, player_id: &str, record: &LogRecord) -> Result<(), PersistenceError>;
}

/// In-memory ledger for tests and the headless harness.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    pub reports: Vec<AttemptReport>,
    pub exposures: Vec<String>,
}

impl OutcomeLedger for MemoryLedger {
    fn report_outcome(&mut self, report: &AttemptReport) {
        self.reports.push(report.clone());
    }

    fn full_exposure(&mut self, player_id: &str) {
        self.exposures.push(player_id.to_string());
    }
}

/// In-memory sink for tests and the headless harness. Can be told to
/// fail the next N appends to exercise the retry path.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<(String, LogRecord)>,
    pub fail_next: u32,
}

impl EventSink for MemorySink {
    fn append(&mut self, player_id: &str, record: &LogRecord) -> Result<(), PersistenceError> {
        if self.fail_next > 0 {
            self.fail_next -= 1;
            return Err(PersistenceError::WriteFailed {
                player: player_id.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        self.records.push((player_id.to_string(), record.clone()));
        Ok(())
    }
}

impl MemorySink {
    /// Trace events recorded for one player, in append order.
    pub fn trace_events(&self, player_id: &str) -> Vec<TraceEvent> {
        self.records
            .iter()
            .filter(|(p, _)| p == player_id)
            .filter_map(|(_, r)| match r {
                LogRecord::Trace(e) => Some(e.clone()),
                LogRecord::Reputation(_) => None,
            })
            .collect()
    }

    /// Reputation events recorded for one player, in append order.
    pub fn reputation_events(&self, player_id: &str) -> Vec<ReputationEvent> {
        self.records
            .iter()
            .filter(|(p, _)| p == player_id)
            .filter_map(|(_, r)| match r {
                LogRecord::Reputation(e) => Some(e.clone()),
                LogRecord::Trace(_) => None,
            })
            .collect()
    }
}
