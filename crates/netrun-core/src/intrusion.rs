//! The intrusion attempt state machine.
//!
//! One attempt runs `Idle -> Scanning -> Exploiting -> Downloading` and
//! ends in `Success`, `Failed`, or `Aborted`. Each active stage resolves
//! against one defense layer of the target; the player's exposure tier
//! scales the layer up, stage-bound tools grind it down, and a single
//! uniform retry policy governs failure:
//!
//! **Retry policy.** A failed stage costs double its trace delta and
//! leaves the machine in the same stage; one retry per stage is allowed.
//! A second failure of the same stage costs double again and ends the
//! attempt in `Failed`. There is no per-call override.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use netrun_logic::constants::trace_deltas;
use netrun_logic::defense::{effective_strength, success_probability};
use netrun_logic::tools::{cloak_reduction, stage_reduction, Tool, ToolStage};
use netrun_logic::trace::ExposureTier;

use crate::error::EngineError;
use crate::generation::target::Target;

/// Attempt stages. `Idle` is the only initial stage; `Success`, `Failed`,
/// and `Aborted` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Idle,
    Scanning,
    Exploiting,
    Downloading,
    Success,
    Failed,
    Aborted,
}

impl Stage {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed | Self::Aborted)
    }

    /// Stages that perform a resolution step.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Scanning | Self::Exploiting | Self::Downloading)
    }

    /// Stage entered after a successful resolution.
    fn on_success(self) -> Stage {
        match self {
            Self::Scanning => Self::Exploiting,
            Self::Exploiting => Self::Downloading,
            Self::Downloading => Self::Success,
            other => other,
        }
    }

    /// Which tool binding applies to this stage.
    pub fn tool_stage(self) -> Option<ToolStage> {
        match self {
            Self::Scanning => Some(ToolStage::Scan),
            Self::Exploiting => Some(ToolStage::Exploit),
            Self::Downloading => Some(ToolStage::Download),
            _ => None,
        }
    }

    /// Index of the defense layer this stage resolves against.
    fn layer_index(self) -> Option<usize> {
        match self {
            Self::Scanning => Some(0),
            Self::Exploiting => Some(1),
            Self::Downloading => Some(2),
            _ => None,
        }
    }

    /// Trace gained by a successful resolution of this stage.
    fn trace_delta(self) -> f32 {
        match self {
            Self::Scanning => trace_deltas::SCAN,
            Self::Exploiting => trace_deltas::EXPLOIT,
            Self::Downloading => trace_deltas::DOWNLOAD,
            _ => 0.0,
        }
    }
}

/// How an attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptOutcome {
    Success,
    Failed,
    Aborted,
}

/// Outcome of one resolution step (or an abort).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    /// The stage that was resolved.
    pub stage: Stage,
    pub succeeded: bool,
    /// Success probability the step was sampled against (0 for aborts).
    pub probability: f32,
    /// The uniform roll drawn (0 for aborts).
    pub roll: f32,
    /// Trace applied to the player by this step, after cloak reduction.
    pub trace_delta: f32,
    pub next_stage: Stage,
    /// True when the stage failed but may be retried.
    pub retry_available: bool,
    /// Objective payload, present only on download success.
    pub objective_payload: Option<String>,
}

/// One run of the state machine against one generated target.
/// Owned by the session driving it; destroyed on completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntrusionAttempt {
    pub attempt_id: u64,
    pub target_id: String,
    pub stage: Stage,
    /// Trace accumulated by this attempt alone.
    pub trace_accumulated: f32,
    pub started_at: f64,
    pub stage_log: Vec<StageReport>,
    /// Objective data collected on download success.
    pub objective_payload: Option<String>,
    failures_this_stage: u8,
}

impl IntrusionAttempt {
    pub fn new(attempt_id: u64, target_id: impl Into<String>, started_at: f64) -> Self {
        Self {
            attempt_id,
            target_id: target_id.into(),
            stage: Stage::Idle,
            trace_accumulated: 0.0,
            started_at,
            stage_log: Vec::new(),
            objective_payload: None,
            failures_this_stage: 0,
        }
    }

    /// `Idle -> Scanning`. Resets the per-attempt accumulator.
    pub fn start(&mut self) -> Result<(), EngineError> {
        if self.stage != Stage::Idle {
            return Err(EngineError::InvalidTransition(self.stage));
        }
        self.stage = Stage::Scanning;
        self.trace_accumulated = 0.0;
        Ok(())
    }

    /// One resolution step, drawing the roll from the attempt's dice.
    pub fn step(
        &mut self,
        target: &Target,
        tools: &[Tool],
        exposure: ExposureTier,
        dice: &mut ChaCha8Rng,
    ) -> Result<StageReport, EngineError> {
        let roll = dice.gen::<f32>();
        self.step_with_roll(target, tools, exposure, roll)
    }

    /// Resolution with an injected roll; the unit-testable core of `step`.
    fn step_with_roll(
        &mut self,
        target: &Target,
        tools: &[Tool],
        exposure: ExposureTier,
        roll: f32,
    ) -> Result<StageReport, EngineError> {
        let stage = self.stage;
        let (layer_index, tool_stage) = match (stage.layer_index(), stage.tool_stage()) {
            (Some(l), Some(t)) => (l, t),
            _ => return Err(EngineError::InvalidTransition(stage)),
        };

        let layer = &target.defenses[layer_index];
        let reduction = stage_reduction(tools, tool_stage);
        let effective = effective_strength(layer.strength, exposure.alert_multiplier(), reduction);
        let probability = success_probability(effective);
        let succeeded = roll < probability;

        let cloak = cloak_reduction(tools);
        let (trace_delta, next_stage, retry_available) = if succeeded {
            self.failures_this_stage = 0;
            let delta = (stage.trace_delta() - cloak).max(0.0);
            (delta, stage.on_success(), false)
        } else {
            self.failures_this_stage += 1;
            let delta =
                (stage.trace_delta() * trace_deltas::FAILURE_MULTIPLIER - cloak).max(0.0);
            if self.failures_this_stage > 1 {
                (delta, Stage::Failed, false)
            } else {
                (delta, stage, true)
            }
        };

        if succeeded && stage == Stage::Downloading {
            self.objective_payload = target.objective_payload();
        }

        self.trace_accumulated += trace_delta;
        self.stage = next_stage;

        let report = StageReport {
            stage,
            succeeded,
            probability,
            roll,
            trace_delta,
            next_stage,
            retry_available,
            objective_payload: self.objective_payload.clone().filter(|_| succeeded),
        };
        self.stage_log.push(report.clone());
        Ok(report)
    }

    /// Bail out of an active stage: a detected-but-incomplete attempt.
    /// Costs a flat partial penalty, below any failed stage.
    pub fn abort(&mut self) -> Result<StageReport, EngineError> {
        let stage = self.stage;
        if !stage.is_active() {
            return Err(EngineError::InvalidTransition(stage));
        }
        self.trace_accumulated += trace_deltas::ABORT;
        self.stage = Stage::Aborted;

        let report = StageReport {
            stage,
            succeeded: false,
            probability: 0.0,
            roll: 0.0,
            trace_delta: trace_deltas::ABORT,
            next_stage: Stage::Aborted,
            retry_available: false,
            objective_payload: None,
        };
        self.stage_log.push(report.clone());
        Ok(report)
    }

    pub fn outcome(&self) -> Option<AttemptOutcome> {
        match self.stage {
            Stage::Success => Some(AttemptOutcome::Success),
            Stage::Failed => Some(AttemptOutcome::Failed),
            Stage::Aborted => Some(AttemptOutcome::Aborted),
            _ => None,
        }
    }
}

/// The transient per-player session driving one attempt: the generated
/// target, the attempt state, and the attempt's dice stream. Attached to
/// the player entity while the attempt runs.
pub struct IntrusionSession {
    pub target: Target,
    pub attempt: IntrusionAttempt,
    pub dice: ChaCha8Rng,
}
