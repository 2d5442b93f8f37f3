//! Error taxonomy for the core engine.

use thiserror::Error;

use crate::intrusion::Stage;

/// Target generation failures. Non-retryable: a bad tier is a
/// configuration error on the mission ledger's side.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum GenerationError {
    #[error("difficulty tier {tier} outside supported range 1..={max_tier}")]
    TierOutOfRange { tier: u8, max_tier: u8 },
}

/// Failures from the persistence collaborator.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The event sink rejected an append. The engine retries once with
    /// the same record; idempotent application by event id makes the
    /// retry safe.
    #[error("event log append failed for player {player}: {reason}")]
    WriteFailed { player: String, reason: String },
    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] bincode::Error),
    #[error("unsupported save version {0}")]
    UnsupportedVersion(u32),
}

/// Engine-level failures.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Exactly one attempt per player at a time.
    #[error("an intrusion attempt is already in progress for this player")]
    AttemptInProgress,
    #[error("no intrusion attempt is active for this player")]
    NoActiveAttempt,
    /// A stage action was requested from a terminal or mismatched stage.
    /// Impossible if callers respect the state machine.
    #[error("no stage action available from the {0:?} stage")]
    InvalidTransition(Stage),
    #[error("entity is not a registered player")]
    UnknownPlayer,
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}
