//! Procedural target generation.
//!
//! Everything a target is (filesystem shape, defense strengths, loot
//! placement) derives from one deterministic stream keyed by
//! `(seed, target_id, tier)`, so a target can be regenerated bit-for-bit
//! across save/reload.

pub mod names;
pub mod rng;
pub mod target;

pub use target::{generate, FileNode, Target};
