//! Trace decay - the passive cooldown of detection risk over idle time.

use hecs::{Entity, World};

use netrun_logic::trace::decay_amount;

use crate::components::trace::TraceState;

/// Collect the (negative) decay delta each player should receive for an
/// idle period. Players already at zero are skipped. The engine turns
/// each entry into a logged trace event so decay follows the same
/// write-ahead path as every other mutation.
pub fn pending_decay(world: &World, idle_hours: f64) -> Vec<(Entity, f32)> {
    let amount = decay_amount(idle_hours);
    if amount <= 0.0 {
        return Vec::new();
    }

    world
        .query::<&TraceState>()
        .iter()
        .filter(|(_, trace)| trace.level > 0.0)
        .map(|(entity, trace)| (entity, -amount.min(trace.level)))
        .collect()
}
