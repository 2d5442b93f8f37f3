//! NetRun Core - Intrusion Simulation Engine
//!
//! The core of a terminal-driven narrative game in which a player runs
//! simulated intrusions against procedurally generated corporate systems,
//! accumulating detection risk (trace) and faction reputation.
//!
//! # Architecture
//!
//! Player state lives in a `hecs` ECS world: each player is an entity
//! carrying `PlayerProfile`, `TraceState`, `FactionBook`, and
//! `ToolInventory` components. An in-progress intrusion is a transient
//! `IntrusionSession` component attached for the duration of one attempt.
//!
//! - **generation**: deterministic seeded target generation (filesystem
//!   tree plus defense profile)
//! - **intrusion**: the staged attempt state machine
//! - **components**: persistent per-player state
//! - **systems**: per-tick logic (trace decay)
//! - **ledger / persistence**: collaborator seams and save/replay
//!
//! # Example
//!
//! ```rust,no_run
//! use netrun_core::prelude::*;
//! use netrun_core::ledger::{MemoryLedger, MemorySink};
//! use netrun_logic::factions::{FactionId, Standing};
//! use netrun_logic::mission::MissionSpec;
//!
//! let mut engine = GameEngine::new(MemoryLedger::default(), MemorySink::default());
//! let player = engine.spawn_player("p1", "ghostwire");
//!
//! let spec = MissionSpec {
//!     mission_id: "m-001".into(),
//!     target_id: "neuronet".into(),
//!     tier: 1,
//!     seed: 42,
//!     faction: FactionId::Underground,
//!     credit_reward: 1000,
//!     required_standing: Standing::Neutral,
//! };
//!
//! engine.begin_attempt(player, &spec).unwrap();
//! while let Ok(report) = engine.step_attempt(player) {
//!     if report.next_stage.is_terminal() {
//!         break;
//!     }
//! }
//! ```

pub mod components;
pub mod engine;
pub mod error;
pub mod generation;
pub mod intrusion;
pub mod ledger;
pub mod persistence;
pub mod systems;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::GameEngine;
    pub use crate::error::{EngineError, GenerationError, PersistenceError};
    pub use crate::generation::{generate, Target};
    pub use crate::intrusion::{AttemptOutcome, Stage, StageReport};
}
