//! Per-tick systems over the player world.

pub mod decay;
