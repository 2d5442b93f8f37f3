//! Game engine - owns the player world and drives intrusion sessions.
//!
//! One engine per game process. Every mutating call takes `&mut self`,
//! which is the single-writer-per-player discipline: there is no way to
//! run two resolutions against the same player concurrently. The engine
//! never blocks on I/O; the event sink and outcome ledger are the only
//! hand-off points.

use hecs::{Entity, World};
use log::{debug, info, warn};

use netrun_logic::factions::mission_reputation_delta;
use netrun_logic::mission::{self, MissionSpec};
use netrun_logic::tools::Tool;

use crate::components::faction::{FactionBook, ReputationCause, ReputationEvent};
use crate::components::player::{PlayerProfile, ToolInventory};
use crate::components::trace::{TraceCause, TraceEvent, TraceState};
use crate::error::{EngineError, PersistenceError};
use crate::generation::rng::derive_attempt_stream;
use crate::generation::target::generate;
use crate::intrusion::{IntrusionAttempt, IntrusionSession, StageReport};
use crate::ledger::{AttemptReport, EventSink, LogRecord, OutcomeLedger};
use crate::systems::decay;

/// The core engine. Generic over its collaborators so tests and the
/// harness can use in-memory implementations and inspect them afterward.
pub struct GameEngine<L: OutcomeLedger, S: EventSink> {
    /// ECS world containing player entities
    pub world: World,
    /// Simulation time in hours since start
    pub sim_time: f64,
    /// Mission/faction ledger collaborator
    pub ledger: L,
    /// Append-only persistence collaborator
    pub sink: S,
    pub(crate) next_event_id: u64,
    pub(crate) next_attempt_id: u64,
}

impl<L: OutcomeLedger, S: EventSink> GameEngine<L, S> {
    pub fn new(ledger: L, sink: S) -> Self {
        Self {
            world: World::new(),
            sim_time: 0.0,
            ledger,
            sink,
            next_event_id: 0,
            next_attempt_id: 0,
        }
    }

    /// Create a player entity with fresh trace, faction, and inventory
    /// state.
    pub fn spawn_player(&mut self, player_id: &str, handle: &str) -> Entity {
        debug!("spawning player {player_id} ({handle})");
        self.world.spawn((
            PlayerProfile::new(player_id, handle),
            TraceState::default(),
            FactionBook::default(),
            ToolInventory::default(),
        ))
    }

    pub fn add_tool(&mut self, player: Entity, tool: Tool) -> Result<(), EngineError> {
        let mut inventory = self
            .world
            .get::<&mut ToolInventory>(player)
            .map_err(|_| EngineError::UnknownPlayer)?;
        inventory.add(tool);
        Ok(())
    }

    pub fn trace_level(&self, player: Entity) -> Result<f32, EngineError> {
        Ok(self
            .world
            .get::<&TraceState>(player)
            .map_err(|_| EngineError::UnknownPlayer)?
            .level)
    }

    pub fn attempt_in_progress(&self, player: Entity) -> bool {
        self.world.get::<&IntrusionSession>(player).is_ok()
    }

    /// Whether the player's standing and trace allow taking a mission.
    pub fn can_accept(&self, player: Entity, spec: &MissionSpec) -> Result<bool, EngineError> {
        let trace_level = self.trace_level(player)?;
        let standing = self
            .world
            .get::<&FactionBook>(player)
            .map_err(|_| EngineError::UnknownPlayer)?
            .standing(spec.faction);
        Ok(mission::eligible(spec.required_standing, standing, trace_level))
    }

    /// Generate the mission's target and start an attempt against it.
    ///
    /// Exactly one attempt per player: fails with `AttemptInProgress`
    /// while a session is attached, leaving the running session intact.
    pub fn begin_attempt(&mut self, player: Entity, spec: &MissionSpec) -> Result<(), EngineError> {
        let player_id = self.player_id(player)?;
        if self.attempt_in_progress(player) {
            return Err(EngineError::AttemptInProgress);
        }

        let target = generate(&spec.target_id, spec.tier, spec.seed)?;
        let attempt_id = self.next_attempt_id;
        self.next_attempt_id += 1;

        let mut attempt = IntrusionAttempt::new(attempt_id, target.id.clone(), self.sim_time);
        attempt.start()?;
        let dice = derive_attempt_stream(spec.seed, &spec.target_id, spec.tier);

        info!(
            "player {player_id} begins attempt {attempt_id} against {} (tier {})",
            spec.target_id, spec.tier
        );
        self.world
            .insert_one(player, IntrusionSession { target, attempt, dice })
            .map_err(|_| EngineError::UnknownPlayer)?;
        Ok(())
    }

    /// Run one resolution step of the active attempt.
    ///
    /// Consumes used tools, logs and applies the trace delta, and on a
    /// terminal transition reports the outcome and discards the session.
    pub fn step_attempt(&mut self, player: Entity) -> Result<StageReport, EngineError> {
        let player_id = self.player_id(player)?;
        let exposure = self
            .world
            .get::<&TraceState>(player)
            .map_err(|_| EngineError::UnknownPlayer)?
            .exposure;
        let tools: Vec<Tool> = self
            .world
            .get::<&ToolInventory>(player)
            .map(|inventory| inventory.tools.clone())
            .unwrap_or_default();

        let report = {
            let mut session = self
                .world
                .get::<&mut IntrusionSession>(player)
                .map_err(|_| EngineError::NoActiveAttempt)?;
            let session = &mut *session;
            session
                .attempt
                .step(&session.target, &tools, exposure, &mut session.dice)?
        };

        if let Some(tool_stage) = report.stage.tool_stage() {
            if let Ok(mut inventory) = self.world.get::<&mut ToolInventory>(player) {
                let burned = inventory.consume_used(tool_stage);
                if burned > 0 {
                    debug!("player {player_id} consumed {burned} tool(s) on {tool_stage:?}");
                }
            }
        }

        let cause = if report.succeeded {
            TraceCause::StageSuccess(report.stage)
        } else {
            TraceCause::StageFailure(report.stage)
        };
        // A terminal stage always detaches the session and reports the
        // outcome, even when the trace append failed; the unlogged delta
        // stays unapplied.
        let trace_result = self.apply_trace(player, &player_id, report.trace_delta, cause);
        if report.next_stage.is_terminal() {
            self.finish_attempt(player, &player_id)?;
        }
        trace_result?;
        Ok(report)
    }

    /// Abort the active attempt: partial trace penalty, terminal report.
    pub fn abort_attempt(&mut self, player: Entity) -> Result<StageReport, EngineError> {
        let player_id = self.player_id(player)?;
        let report = {
            let mut session = self
                .world
                .get::<&mut IntrusionSession>(player)
                .map_err(|_| EngineError::NoActiveAttempt)?;
            session.attempt.abort()?
        };
        let trace_result =
            self.apply_trace(player, &player_id, report.trace_delta, TraceCause::Abort);
        self.finish_attempt(player, &player_id)?;
        trace_result?;
        Ok(report)
    }

    /// Record a mission resolution: reputation shift with the issuing
    /// faction, credit reward on success.
    pub fn resolve_mission(
        &mut self,
        player: Entity,
        spec: &MissionSpec,
        success: bool,
    ) -> Result<(), EngineError> {
        let player_id = self.player_id(player)?;
        let event = ReputationEvent {
            id: self.allocate_event_id(),
            at: self.sim_time,
            faction: spec.faction,
            delta: mission_reputation_delta(success),
            cause: if success {
                ReputationCause::MissionSuccess
            } else {
                ReputationCause::MissionFailure
            },
        };
        self.append_with_retry(&player_id, &LogRecord::Reputation(event.clone()))?;
        {
            let mut book = self
                .world
                .get::<&mut FactionBook>(player)
                .map_err(|_| EngineError::UnknownPlayer)?;
            book.apply_event(event);
        }
        if success {
            if let Ok(mut profile) = self.world.get::<&mut PlayerProfile>(player) {
                profile.credits += spec.credit_reward;
            }
        }
        info!(
            "mission {} resolved for {player_id}: {}",
            spec.mission_id,
            if success { "success" } else { "failure" }
        );
        Ok(())
    }

    /// Apply a trace delta through the logged, idempotent path.
    ///
    /// This is the only mutation route for trace levels: the event is
    /// appended to the sink before the in-memory state changes, so a
    /// crash mid-write never produces state the log cannot reproduce.
    pub fn apply_trace_delta(
        &mut self,
        player: Entity,
        delta: f32,
        cause: TraceCause,
    ) -> Result<(), EngineError> {
        let player_id = self.player_id(player)?;
        self.apply_trace(player, &player_id, delta, cause)
    }

    /// One-time trace reduction, e.g. a purchased cloak effect.
    pub fn reduce_trace(&mut self, player: Entity, amount: f32) -> Result<(), EngineError> {
        self.apply_trace_delta(player, -amount.abs(), TraceCause::CloakPurchase)
    }

    /// Advance simulation time and apply trace decay to idle players.
    pub fn tick(&mut self, delta_hours: f64) -> Result<(), EngineError> {
        self.sim_time += delta_hours;
        for (entity, delta) in decay::pending_decay(&self.world, delta_hours) {
            match self.player_id(entity) {
                Ok(player_id) => {
                    self.apply_trace(entity, &player_id, delta, TraceCause::Decay)?
                }
                // Trace state on a non-player entity; nothing to log against
                Err(_) => continue,
            }
        }
        Ok(())
    }

    fn player_id(&self, player: Entity) -> Result<String, EngineError> {
        Ok(self
            .world
            .get::<&PlayerProfile>(player)
            .map_err(|_| EngineError::UnknownPlayer)?
            .player_id
            .clone())
    }

    fn allocate_event_id(&mut self) -> u64 {
        let id = self.next_event_id;
        self.next_event_id += 1;
        id
    }

    fn append_with_retry(
        &mut self,
        player_id: &str,
        record: &LogRecord,
    ) -> Result<(), PersistenceError> {
        if let Err(first) = self.sink.append(player_id, record) {
            warn!("event log append failed for {player_id}, retrying: {first}");
            self.sink.append(player_id, record)?;
        }
        Ok(())
    }

    fn apply_trace(
        &mut self,
        player: Entity,
        player_id: &str,
        delta: f32,
        cause: TraceCause,
    ) -> Result<(), EngineError> {
        let event = TraceEvent {
            id: self.allocate_event_id(),
            at: self.sim_time,
            delta,
            cause,
        };
        self.append_with_retry(player_id, &LogRecord::Trace(event.clone()))?;

        let newly_burned = {
            let mut trace = self
                .world
                .get::<&mut TraceState>(player)
                .map_err(|_| EngineError::UnknownPlayer)?;
            let was_burned = trace.is_burned();
            let applied = trace.apply_event(event);
            applied && !was_burned && trace.is_burned()
        };
        if newly_burned {
            warn!("player {player_id} is fully exposed");
            self.ledger.full_exposure(player_id);
        }
        Ok(())
    }

    fn finish_attempt(&mut self, player: Entity, player_id: &str) -> Result<(), EngineError> {
        let session = self
            .world
            .remove_one::<IntrusionSession>(player)
            .map_err(|_| EngineError::NoActiveAttempt)?;
        let outcome = session
            .attempt
            .outcome()
            .ok_or(EngineError::InvalidTransition(session.attempt.stage))?;

        let report = AttemptReport {
            attempt_id: session.attempt.attempt_id,
            player_id: player_id.to_string(),
            target_id: session.attempt.target_id.clone(),
            outcome,
            trace_delta: session.attempt.trace_accumulated,
            objective_payload: session.attempt.objective_payload.clone(),
        };
        info!(
            "attempt {} against {} resolved: {:?}",
            report.attempt_id, report.target_id, outcome
        );
        self.ledger.report_outcome(&report);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intrusion::{AttemptOutcome, Stage};
    use crate::ledger::{MemoryLedger, MemorySink};
    use netrun_logic::factions::{FactionId, Standing};
    use netrun_logic::tools::ToolStage;

    fn test_engine() -> GameEngine<MemoryLedger, MemorySink> {
        GameEngine::new(MemoryLedger::default(), MemorySink::default())
    }

    fn spec(tier: u8, required: Standing) -> MissionSpec {
        MissionSpec {
            mission_id: "m-001".to_string(),
            target_id: "neuronet".to_string(),
            tier,
            seed: 42,
            faction: FactionId::Underground,
            credit_reward: 1000,
            required_standing: required,
        }
    }

    fn heavy_loadout(engine: &mut GameEngine<MemoryLedger, MemorySink>, player: Entity) {
        for (id, stage) in [
            ("s", ToolStage::Scan),
            ("e", ToolStage::Exploit),
            ("d", ToolStage::Download),
        ] {
            engine
                .add_tool(player, Tool::new(id, id, stage, 1000.0, false))
                .unwrap();
        }
    }

    #[test]
    fn single_attempt_invariant() {
        let mut engine = test_engine();
        let player = engine.spawn_player("p1", "ghostwire");
        engine.begin_attempt(player, &spec(1, Standing::Neutral)).unwrap();

        let err = engine.begin_attempt(player, &spec(1, Standing::Neutral));
        assert!(matches!(err, Err(EngineError::AttemptInProgress)));

        // The running session is untouched
        let session = engine.world.get::<&IntrusionSession>(player).unwrap();
        assert_eq!(session.attempt.stage, Stage::Scanning);
        assert_eq!(session.attempt.attempt_id, 0);
    }

    #[test]
    fn full_run_reports_exactly_once() {
        let mut engine = test_engine();
        let player = engine.spawn_player("p1", "ghostwire");
        heavy_loadout(&mut engine, player);
        engine.begin_attempt(player, &spec(1, Standing::Neutral)).unwrap();

        // Full tool coverage: three certain successes
        for expected in [Stage::Scanning, Stage::Exploiting, Stage::Downloading] {
            let report = engine.step_attempt(player).unwrap();
            assert_eq!(report.stage, expected);
            assert!(report.succeeded);
        }

        assert!(!engine.attempt_in_progress(player));
        assert_eq!(engine.ledger.reports.len(), 1);
        let report = &engine.ledger.reports[0];
        assert_eq!(report.outcome, AttemptOutcome::Success);
        assert_eq!(report.player_id, "p1");
        assert!((report.trace_delta - 30.0).abs() < f32::EPSILON);
        assert!(report
            .objective_payload
            .as_deref()
            .unwrap()
            .starts_with("objective://neuronet/"));

        // Global trace took the three stage deltas
        assert!((engine.trace_level(player).unwrap() - 30.0).abs() < f32::EPSILON);

        // Stepping without a session is NoActiveAttempt
        assert!(matches!(
            engine.step_attempt(player),
            Err(EngineError::NoActiveAttempt)
        ));
    }

    #[test]
    fn trace_events_logged_before_applied() {
        let mut engine = test_engine();
        let player = engine.spawn_player("p1", "ghostwire");
        heavy_loadout(&mut engine, player);
        engine.begin_attempt(player, &spec(1, Standing::Neutral)).unwrap();
        while engine.attempt_in_progress(player) {
            engine.step_attempt(player).unwrap();
        }

        let logged = engine.sink.trace_events("p1");
        let applied = &engine.world.get::<&TraceState>(player).unwrap().events;
        assert_eq!(logged.len(), applied.len());
        for (log, state) in logged.iter().zip(applied.iter()) {
            assert_eq!(log, state);
        }
    }

    #[test]
    fn abort_reports_aborted() {
        let mut engine = test_engine();
        let player = engine.spawn_player("p1", "ghostwire");
        heavy_loadout(&mut engine, player);
        engine.begin_attempt(player, &spec(1, Standing::Neutral)).unwrap();
        engine.step_attempt(player).unwrap();

        let report = engine.abort_attempt(player).unwrap();
        assert_eq!(report.next_stage, Stage::Aborted);
        assert!(!engine.attempt_in_progress(player));
        assert_eq!(engine.ledger.reports.len(), 1);
        assert_eq!(engine.ledger.reports[0].outcome, AttemptOutcome::Aborted);
        // scan delta 5 + abort penalty 3
        assert!((engine.trace_level(player).unwrap() - 8.0).abs() < f32::EPSILON);

        assert!(matches!(
            engine.abort_attempt(player),
            Err(EngineError::NoActiveAttempt)
        ));
    }

    #[test]
    fn sink_failure_retried_then_surfaced() {
        let mut engine = test_engine();
        let player = engine.spawn_player("p1", "ghostwire");

        // One injected failure: the retry lands the record
        engine.sink.fail_next = 1;
        engine
            .apply_trace_delta(player, 10.0, TraceCause::CloakPurchase)
            .unwrap();
        assert_eq!(engine.sink.trace_events("p1").len(), 1);
        assert!((engine.trace_level(player).unwrap() - 10.0).abs() < f32::EPSILON);

        // Two failures exhaust the retry; the error surfaces and the
        // unlogged delta is not applied
        engine.sink.fail_next = 2;
        let err = engine.apply_trace_delta(player, 10.0, TraceCause::CloakPurchase);
        assert!(matches!(err, Err(EngineError::Persistence(_))));
        assert!((engine.trace_level(player).unwrap() - 10.0).abs() < f32::EPSILON);
    }

    #[test]
    fn terminal_step_sink_failure_still_reports_outcome() {
        let mut engine = test_engine();
        let player = engine.spawn_player("p1", "ghostwire");
        heavy_loadout(&mut engine, player);
        engine.begin_attempt(player, &spec(1, Standing::Neutral)).unwrap();
        engine.step_attempt(player).unwrap();
        engine.step_attempt(player).unwrap();

        // Both the append and its retry fail on the terminal download step
        engine.sink.fail_next = 2;
        let err = engine.step_attempt(player);
        assert!(matches!(err, Err(EngineError::Persistence(_))));

        // The session is gone and the outcome was still reported once
        assert!(!engine.attempt_in_progress(player));
        assert_eq!(engine.ledger.reports.len(), 1);
        assert_eq!(engine.ledger.reports[0].outcome, AttemptOutcome::Success);

        // Only the two logged steps reached the trace state
        assert!((engine.trace_level(player).unwrap() - 15.0).abs() < f32::EPSILON);

        // The player is free to start over
        engine.begin_attempt(player, &spec(1, Standing::Neutral)).unwrap();
    }

    #[test]
    fn abort_sink_failure_still_discards_session() {
        let mut engine = test_engine();
        let player = engine.spawn_player("p1", "ghostwire");
        heavy_loadout(&mut engine, player);
        engine.begin_attempt(player, &spec(1, Standing::Neutral)).unwrap();
        engine.step_attempt(player).unwrap();

        engine.sink.fail_next = 2;
        let err = engine.abort_attempt(player);
        assert!(matches!(err, Err(EngineError::Persistence(_))));

        assert!(!engine.attempt_in_progress(player));
        assert_eq!(engine.ledger.reports.len(), 1);
        assert_eq!(engine.ledger.reports[0].outcome, AttemptOutcome::Aborted);
        // The unlogged abort penalty was not applied
        assert!((engine.trace_level(player).unwrap() - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn full_exposure_hook_fires_once_per_crossing() {
        let mut engine = test_engine();
        let player = engine.spawn_player("p1", "ghostwire");

        engine
            .apply_trace_delta(player, 120.0, TraceCause::StageFailure(Stage::Scanning))
            .unwrap();
        assert_eq!(engine.ledger.exposures, vec!["p1".to_string()]);

        // Still burned: no duplicate hook
        engine
            .apply_trace_delta(player, 5.0, TraceCause::StageFailure(Stage::Scanning))
            .unwrap();
        assert_eq!(engine.ledger.exposures.len(), 1);

        // Recover, then cross again
        engine.reduce_trace(player, 40.0).unwrap();
        engine
            .apply_trace_delta(player, 100.0, TraceCause::StageFailure(Stage::Scanning))
            .unwrap();
        assert_eq!(engine.ledger.exposures.len(), 2);
    }

    #[test]
    fn burned_player_blocked_from_trusted_work() {
        let mut engine = test_engine();
        let player = engine.spawn_player("p1", "ghostwire");

        // Five successes: Underground reputation 50 = Friendly
        for _ in 0..5 {
            engine
                .resolve_mission(player, &spec(1, Standing::Neutral), true)
                .unwrap();
        }
        let friendly_job = spec(3, Standing::Friendly);
        assert!(engine.can_accept(player, &friendly_job).unwrap());

        engine
            .apply_trace_delta(player, 100.0, TraceCause::StageFailure(Stage::Downloading))
            .unwrap();
        assert!(!engine.can_accept(player, &friendly_job).unwrap());

        // Low-trust work remains open
        assert!(engine.can_accept(player, &spec(1, Standing::Neutral)).unwrap());
    }

    #[test]
    fn mission_resolution_moves_reputation_and_credits() {
        let mut engine = test_engine();
        let player = engine.spawn_player("p1", "ghostwire");

        engine.resolve_mission(player, &spec(1, Standing::Neutral), true).unwrap();
        engine.resolve_mission(player, &spec(1, Standing::Neutral), false).unwrap();

        let book = engine.world.get::<&FactionBook>(player).unwrap();
        assert_eq!(book.underground.reputation, 5);
        assert_eq!(book.underground.missions_completed, 1);
        assert_eq!(book.underground.missions_failed, 1);
        drop(book);

        let profile = engine.world.get::<&PlayerProfile>(player).unwrap();
        assert_eq!(profile.credits, 1000);
        drop(profile);

        assert_eq!(engine.sink.reputation_events("p1").len(), 2);
    }

    #[test]
    fn decay_tick_lowers_trace_through_the_log() {
        let mut engine = test_engine();
        let player = engine.spawn_player("p1", "ghostwire");
        engine
            .apply_trace_delta(player, 30.0, TraceCause::StageSuccess(Stage::Downloading))
            .unwrap();

        engine.tick(2.0).unwrap();
        assert!((engine.trace_level(player).unwrap() - 26.0).abs() < f32::EPSILON);
        assert!((engine.sim_time - 2.0).abs() < f64::EPSILON);

        let events = engine.sink.trace_events("p1");
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].cause, TraceCause::Decay);
        assert!((events[1].delta + 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn generation_error_propagates_from_begin() {
        let mut engine = test_engine();
        let player = engine.spawn_player("p1", "ghostwire");
        let mut bad = spec(1, Standing::Neutral);
        bad.tier = 0;
        assert!(matches!(
            engine.begin_attempt(player, &bad),
            Err(EngineError::Generation(_))
        ));
        assert!(!engine.attempt_in_progress(player));
    }
}
