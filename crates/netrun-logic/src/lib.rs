//! Pure intrusion-game logic for NetRun.
//!
//! This crate contains all game rules that are independent of any engine,
//! database, or runtime. Functions take plain data and return results,
//! making them unit-testable and portable across the headless simtest
//! harness, the core engine, and any future frontend.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | Trace deltas, exposure thresholds, decay and reputation policy |
//! | [`defense`] | Defense layer kinds, tier-scaled strengths, success probability |
//! | [`factions`] | Faction roster, reputation standings, mission outcome deltas |
//! | [`mission`] | Mission specs and eligibility checks (standing + trace lockout) |
//! | [`tools`] | Intrusion tool stages, effect magnitudes, builtin catalog |
//! | [`trace`] | Exposure tiers, alert multipliers, level clamping and decay |

pub mod constants;
pub mod defense;
pub mod factions;
pub mod mission;
pub mod tools;
pub mod trace;
