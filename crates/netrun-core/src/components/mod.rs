//! Per-player components: profile, inventory, trace state, faction book.

pub mod faction;
pub mod player;
pub mod trace;

pub use faction::{FactionBook, FactionRecord, ReputationCause, ReputationEvent};
pub use player::{PlayerProfile, ToolInventory};
pub use trace::{TraceCause, TraceEvent, TraceState};
