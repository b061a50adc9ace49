//! Mayor - a job scheduler for a colony of autonomous workers
//!
//! Every cycle the Mayor reads a world snapshot, turns what the colony's
//! businesses want done into prioritized jobs, matches idle workers to those
//! jobs (lending workers between jobs when one needs what another provides),
//! emits the resulting actions and persists who works on what.

pub mod boss;
pub mod business;
pub mod error;
pub mod executive;
pub mod id;
pub mod job;
pub mod mayor;
pub mod movement;
pub mod storage;
pub mod worker;
pub mod world;

pub use error::{MayorError, Result};
pub use mayor::{CycleReport, Mayor, SchedulerPolicy};
