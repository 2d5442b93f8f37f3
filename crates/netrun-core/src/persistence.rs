//! Save/load for the engine's durable state, plus event-log replay.
//!
//! Uses bincode for binary snapshots. Player components are serialized
//! individually as optionals and reconstructed on load. In-progress
//! intrusion sessions are deliberately not persisted: an attempt that
//! spans a save is abandoned, which is the fiction-friendly outcome of
//! pulling the plug mid-run.
//!
//! Replay is the recovery path for a torn snapshot: the append-only
//! trace and reputation logs rebuild the materialized state from
//! nothing, and duplicate record ids fall out via the same idempotent
//! application the live engine uses.

use hecs::World;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::components::faction::{FactionBook, ReputationEvent};
use crate::components::player::{PlayerProfile, ToolInventory};
use crate::components::trace::{TraceEvent, TraceState};
use crate::engine::GameEngine;
use crate::error::PersistenceError;
use crate::ledger::{EventSink, OutcomeLedger};

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the engine's durable state
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    /// Simulation time in hours
    pub sim_time: f64,
    /// Next engine-wide event id
    pub next_event_id: u64,
    /// Next attempt id
    pub next_attempt_id: u64,
    /// All player entities with their components
    pub players: Vec<PlayerRecord>,
}

/// All persistent components for one player, serialized as optionals
#[derive(Serialize, Deserialize, Default)]
pub struct PlayerRecord {
    pub profile: Option<PlayerProfile>,
    pub trace: Option<TraceState>,
    pub factions: Option<FactionBook>,
    pub inventory: Option<ToolInventory>,
}

/// Extract all player entities from a world into serializable form
fn serialize_players(world: &World) -> Vec<PlayerRecord> {
    let mut players = Vec::new();

    for entity in world.iter() {
        let mut record = PlayerRecord::default();

        if let Some(c) = entity.get::<&PlayerProfile>() {
            record.profile = Some((*c).clone());
        }
        if let Some(c) = entity.get::<&TraceState>() {
            record.trace = Some((*c).clone());
        }
        if let Some(c) = entity.get::<&FactionBook>() {
            record.factions = Some((*c).clone());
        }
        if let Some(c) = entity.get::<&ToolInventory>() {
            record.inventory = Some((*c).clone());
        }

        players.push(record);
    }

    players
}

/// Rebuild player entities from serialized records
fn deserialize_players(world: &mut World, players: Vec<PlayerRecord>) {
    for record in players {
        let entity = world.spawn(());
        if let Some(c) = record.profile {
            let _ = world.insert_one(entity, c);
        }
        if let Some(c) = record.trace {
            let _ = world.insert_one(entity, c);
        }
        if let Some(c) = record.factions {
            let _ = world.insert_one(entity, c);
        }
        if let Some(c) = record.inventory {
            let _ = world.insert_one(entity, c);
        }
    }
}

/// Save an engine's durable state to a writer
pub fn save_to<W, L, S>(writer: W, engine: &GameEngine<L, S>) -> Result<(), PersistenceError>
where
    W: Write,
    L: OutcomeLedger,
    S: EventSink,
{
    let save_data = SaveData {
        version: SAVE_VERSION,
        sim_time: engine.sim_time,
        next_event_id: engine.next_event_id,
        next_attempt_id: engine.next_attempt_id,
        players: serialize_players(&engine.world),
    };
    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load an engine from a reader, attaching fresh collaborators
pub fn load_from<R, L, S>(reader: R, ledger: L, sink: S) -> Result<GameEngine<L, S>, PersistenceError>
where
    R: Read,
    L: OutcomeLedger,
    S: EventSink,
{
    let save_data: SaveData = bincode::deserialize_from(reader)?;
    if save_data.version != SAVE_VERSION {
        return Err(PersistenceError::UnsupportedVersion(save_data.version));
    }

    let mut engine = GameEngine::new(ledger, sink);
    engine.sim_time = save_data.sim_time;
    engine.next_event_id = save_data.next_event_id;
    engine.next_attempt_id = save_data.next_attempt_id;
    deserialize_players(&mut engine.world, save_data.players);
    Ok(engine)
}

/// Rebuild trace state from its append-only log. Duplicate ids (from
/// at-least-once delivery) apply once.
pub fn replay_trace(events: &[TraceEvent]) -> TraceState {
    let mut state = TraceState::default();
    for event in events {
        state.apply_event(event.clone());
    }
    state
}

/// Rebuild a faction book from its reputation log.
pub fn replay_reputation(events: &[ReputationEvent]) -> FactionBook {
    let mut book = FactionBook::default();
    for event in events {
        book.apply_event(event.clone());
    }
    book
}
