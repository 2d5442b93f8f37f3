//! Policy constants for trace, exposure, decay, and reputation tuning.
//!
//! Simple scalar constants with no engine dependency. Both the core engine
//! and the native simtest use these, so there is exactly one place where a
//! tuning change happens.

/// Trace added to a player per resolved intrusion stage.
///
/// Scan < exploit < download: the deeper into a system an action reaches,
/// the more detectable it is.
pub mod trace_deltas {
    /// Successful scan stage.
    pub const SCAN: f32 = 5.0;
    /// Successful exploit stage.
    pub const EXPLOIT: f32 = 10.0;
    /// Successful download stage.
    pub const DOWNLOAD: f32 = 15.0;
    /// Flat penalty for aborting an attempt from any active stage.
    /// Deliberately below the cheapest doubled failure cost.
    pub const ABORT: f32 = 3.0;
    /// A failed stage costs its delta times this multiplier.
    pub const FAILURE_MULTIPLIER: f32 = 2.0;
}

/// Exposure tier thresholds on the 0-100 trace scale.
pub mod exposure {
    pub const FLAGGED: f32 = 50.0;
    pub const HUNTED: f32 = 75.0;
    pub const BURNED: f32 = 100.0;
}

/// Alert multipliers applied to every defense layer's base strength,
/// keyed by the player's exposure tier. Known actors face harder systems.
pub mod alert {
    pub const COVERT: f32 = 1.0;
    pub const FLAGGED: f32 = 1.1;
    pub const HUNTED: f32 = 1.25;
    pub const BURNED: f32 = 1.5;
}

/// Trace points shed per idle hour. Decay is the only passive downward
/// driver; everything else that lowers trace is an explicit logged event.
pub const DECAY_PER_HOUR: f32 = 2.0;

/// Bounds of the trace scale.
pub const TRACE_MIN: f32 = 0.0;
pub const TRACE_MAX: f32 = 100.0;

/// Highest supported target difficulty tier.
pub const MAX_TIER: u8 = 10;

/// Reputation change on mission resolution.
pub mod reputation {
    pub const MISSION_SUCCESS: i32 = 10;
    pub const MISSION_FAILURE: i32 = -5;
}
