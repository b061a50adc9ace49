//! Stuck detection for worker movement.
//!
//! Every approach attempt compares the worker's position with the one recorded
//! on the previous attempt:
//! - unchanged: stuck counter +1, stall score +1
//! - moved: stuck counter reset, stall score decays (floored at 0)
//!
//! A worker with a low stuck counter moves cheaply, ignoring other workers and
//! reusing its cached path. Once the counter reaches `stuck_ticks` it moves
//! conservatively around other workers with a shrinking reuse budget. A stall
//! score above `stall_threshold` forces a full path recompute.
//!
//! The memory lives in [`crate::worker::WorkerMemory`] and is persisted, so
//! tracking carries across cycles.

use serde::{Deserialize, Serialize};

use crate::world::Position;

/// Default path reuse for free-moving workers.
pub const DEFAULT_REUSE_PATH: u32 = 20;
/// Reuse budget ceiling once stuck; decreases by one per stuck tick.
pub const STUCK_REUSE_PATH: u32 = 5;
/// Consecutive non-displacement ticks before switching to careful movement.
pub const STUCK_TICKS: u32 = 2;
/// Stall score above which the path is recomputed from scratch.
pub const STALL_THRESHOLD: f64 = 3.0;
/// Stall score recovered per tick of real movement.
pub const STALL_DECAY: f64 = 0.2;

/// Movement tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementPolicy {
    pub default_reuse_path: u32,
    pub stuck_reuse_path: u32,
    pub stuck_ticks: u32,
    pub stall_threshold: f64,
    pub stall_decay: f64,
}

impl Default for MovementPolicy {
    fn default() -> Self {
        Self {
            default_reuse_path: DEFAULT_REUSE_PATH,
            stuck_reuse_path: STUCK_REUSE_PATH,
            stuck_ticks: STUCK_TICKS,
            stall_threshold: STALL_THRESHOLD,
            stall_decay: STALL_DECAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveState {
    FreeMoving,
    Stuck,
    Stalled,
}

/// Per-worker tracking persisted across cycles
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementMemory {
    pub last_pos: Option<Position>,
    pub stuck: u32,
    pub stall: f64,
}

impl MovementMemory {
    /// Record the worker's current position
    pub fn observe(&mut self, pos: &Position, policy: &MovementPolicy) {
        if self.last_pos.as_ref() == Some(pos) {
            self.stuck += 1;
            self.stall += 1.0;
        } else {
            self.stuck = 0;
            self.stall = (self.stall - policy.stall_decay).max(0.0);
            self.last_pos = Some(pos.clone());
        }
    }

    pub fn state(&self, policy: &MovementPolicy) -> MoveState {
        if self.stall > policy.stall_threshold {
            MoveState::Stalled
        } else if self.stuck >= policy.stuck_ticks {
            MoveState::Stuck
        } else {
            MoveState::FreeMoving
        }
    }
}

/// A movement request for the action boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveRequest {
    pub target: Position,
    pub range: u32,
    /// Ticks a cached path may be reused before recomputing
    pub reuse_path: u32,
    /// Whether other workers are treated as passable
    pub ignore_creeps: bool,
}

/// Advance the state machine for one approach attempt and build the request
pub fn approach(
    worker: &str,
    memory: &mut MovementMemory,
    current: &Position,
    target: &Position,
    range: u32,
    policy: &MovementPolicy,
) -> MoveRequest {
    memory.observe(current, policy);

    let stalled = memory.state(policy) == MoveState::Stalled;
    if stalled {
        log::warn!(
            "Worker {} stalled (score {:.1}), recomputing path to {:?}",
            worker,
            memory.stall,
            target
        );
    }

    let (ignore_creeps, reuse_path) = if memory.stuck < policy.stuck_ticks {
        (true, policy.default_reuse_path)
    } else {
        (false, policy.stuck_reuse_path.saturating_sub(memory.stuck))
    };

    MoveRequest {
        target: target.clone(),
        range,
        reuse_path: if stalled { 0 } else { reuse_path },
        ignore_creeps,
    }
}
