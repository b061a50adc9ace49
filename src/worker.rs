//! Worker agents
//!
//! A worker is observed through two halves: the live [`WorkerState`] from the
//! world snapshot, and the [`WorkerMemory`] the scheduler persists alongside it
//! (job tags, business tag, movement tracking). The scheduler never owns a
//! worker's lifetime; memories of workers that vanished are simply dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::JobId;
use crate::movement::MovementMemory;
use crate::world::capability;
use crate::world::{Position, WorldSnapshot};

/// Energy one CARRY part can hold.
pub const CARRY_CAPACITY: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyPart {
    Work,
    Carry,
    Move,
    Attack,
    Claim,
}

impl BodyPart {
    /// Spawn cost of one part
    pub fn cost(&self) -> u32 {
        match self {
            BodyPart::Work => 100,
            BodyPart::Carry => 50,
            BodyPart::Move => 50,
            BodyPart::Attack => 80,
            BodyPart::Claim => 600,
        }
    }
}

/// Active part counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Body {
    pub work: u32,
    pub carry: u32,
    #[serde(rename = "move")]
    pub moves: u32,
    pub attack: u32,
    pub claim: u32,
}

impl Body {
    pub fn count(&self, part: BodyPart) -> u32 {
        match part {
            BodyPart::Work => self.work,
            BodyPart::Carry => self.carry,
            BodyPart::Move => self.moves,
            BodyPart::Attack => self.attack,
            BodyPart::Claim => self.claim,
        }
    }

    /// Build a body from a part list
    pub fn from_parts(parts: &[BodyPart]) -> Self {
        let mut body = Body::default();
        for part in parts {
            match part {
                BodyPart::Work => body.work += 1,
                BodyPart::Carry => body.carry += 1,
                BodyPart::Move => body.moves += 1,
                BodyPart::Attack => body.attack += 1,
                BodyPart::Claim => body.claim += 1,
            }
        }
        body
    }
}

/// Live worker data from the world snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerState {
    pub id: String,
    pub pos: Position,
    #[serde(default)]
    pub body: Body,
    /// Energy currently carried
    #[serde(default)]
    pub carried: u32,
    #[serde(default)]
    pub spawning: bool,
    #[serde(default)]
    pub ticks_to_live: Option<u32>,
    /// Business the worker was spawned for, set by the spawner
    #[serde(default)]
    pub business: Option<String>,
}

/// Scheduler-owned state persisted per worker
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerMemory {
    pub id: String,
    /// Job of the Boss currently employing this worker
    pub job: Option<JobId>,
    /// Last job this worker finished
    pub last_job: Option<JobId>,
    pub business: Option<String>,
    pub movement: MovementMemory,
}

impl WorkerMemory {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Worker {
    pub state: WorkerState,
    pub memory: WorkerMemory,
}

impl Worker {
    pub fn new(state: WorkerState, memory: WorkerMemory) -> Self {
        Self { state, memory }
    }

    pub fn id(&self) -> &str {
        &self.state.id
    }

    pub fn pos(&self) -> &Position {
        &self.state.pos
    }

    pub fn is_employed(&self) -> bool {
        capability::is_employed(self)
    }

    /// Mark employed by the Boss of `job`
    pub fn employ(&mut self, job: &JobId) {
        self.memory.job = Some(job.clone());
    }

    /// Clear employment, remembering the job as finished
    pub fn release(&mut self, finished: &JobId) {
        self.memory.job = None;
        self.memory.last_job = Some(finished.clone());
    }
}

/// All live workers for one cycle, keyed and iterated by id
#[derive(Debug, Clone, Default)]
pub struct Roster {
    workers: BTreeMap<String, Worker>,
}

impl Roster {
    /// Join the snapshot's workers with persisted memories.
    ///
    /// Memories without a live worker are dropped; live workers without a
    /// memory start from a blank one.
    pub fn from_world(world: &WorldSnapshot, memories: Vec<WorkerMemory>) -> Self {
        let mut by_id: BTreeMap<String, WorkerMemory> =
            memories.into_iter().map(|m| (m.id.clone(), m)).collect();

        let workers = world
            .workers
            .iter()
            .map(|state| {
                let memory = by_id
                    .remove(&state.id)
                    .unwrap_or_else(|| WorkerMemory::new(state.id.clone()));
                (state.id.clone(), Worker::new(state.clone(), memory))
            })
            .collect();

        if !by_id.is_empty() {
            log::debug!("Dropping memory of {} vanished workers", by_id.len());
        }

        Self { workers }
    }

    pub fn get(&self, id: &str) -> Option<&Worker> {
        self.workers.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Worker> {
        self.workers.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.workers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Worker> {
        self.workers.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Worker> {
        self.workers.values_mut()
    }

    /// Resolve ids to workers, skipping ids that are not live
    pub fn resolve<'a>(&'a self, ids: &[String]) -> Vec<&'a Worker> {
        ids.iter().filter_map(|id| self.workers.get(id)).collect()
    }

    /// Ids of workers with no job that have finished spawning, in id order
    pub fn unemployed(&self) -> Vec<String> {
        self.workers
            .values()
            .filter(|w| !w.is_employed() && !w.state.spawning)
            .map(|w| w.id().to_string())
            .collect()
    }

    /// Workers tagged with a business
    pub fn employees_of(&self, business: &str) -> Vec<&Worker> {
        self.workers
            .values()
            .filter(|w| w.memory.business.as_deref() == Some(business))
            .collect()
    }

    /// Memories to persist, in id order
    pub fn memories(&self) -> Vec<WorkerMemory> {
        self.workers.values().map(|w| w.memory.clone()).collect()
    }
}
