//! Energy logistics: harvesting, picking up from depots, unloading into
//! consumers.

use super::priority::{PRIORITY_HARVEST, PRIORITY_PICKUP, unload_priority};
use super::{Job, JobContract, Prerequisite, REFILL_TICKS, Step, ratio, throughput, travel_ticks};
use crate::id::{JobId, JobKind};
use crate::worker::{BodyPart, Worker};
use crate::world::action::Action;
use crate::world::capability;
use crate::world::{Position, Source, Structure, WorldSnapshot};

/// Energy one WORK part harvests per tick.
const HARVEST_POWER: u32 = 2;
/// Ticks between source regenerations.
const REGEN_TICKS: u32 = 300;

/// Mine energy from a source
#[derive(Debug, Clone, PartialEq)]
pub struct Harvest {
    pub source: Source,
}

impl Harvest {
    pub fn new(source: &Source) -> Self {
        Self { source: source.clone() }
    }

    pub fn rehydrate(id: &JobId, world: &WorldSnapshot) -> Option<Job> {
        world.source(&id.target).map(|s| Job::Harvest(Harvest::new(s)))
    }
}

impl JobContract for Harvest {
    fn id(&self) -> JobId {
        JobId::new(JobKind::Harvest, &self.source.id)
    }

    fn site(&self) -> &Position {
        &self.source.pos
    }

    fn base_priority(&self) -> f64 {
        PRIORITY_HARVEST
    }

    /// Enough WORK parts to drain the source before it regenerates
    fn is_satisfied(&self, workers: &[&Worker]) -> bool {
        let work: u32 = workers
            .iter()
            .map(|w| capability::active_parts(&w.state, BodyPart::Work))
            .sum();
        work * HARVEST_POWER * REGEN_TICKS >= self.source.energy_capacity
    }

    fn efficiency(&self, worker: &Worker) -> f64 {
        let work = capability::active_parts(&worker.state, BodyPart::Work);
        if work == 0 {
            return 0.0;
        }
        let amount = if capability::capacity(&worker.state) > 0 {
            capability::free_capacity(&worker.state).min(self.source.energy)
        } else {
            self.source.energy
        };
        let work_ticks = amount as f64 / (work * HARVEST_POWER) as f64;
        throughput(amount as f64, travel_ticks(worker, self.site(), 1), work_ticks)
    }

    fn completion(&self, worker: Option<&Worker>) -> f64 {
        match worker {
            None => 1.0 - ratio(self.source.energy, self.source.energy_capacity),
            Some(w) if capability::capacity(&w.state) == 0 => 0.0,
            Some(w) => capability::fill_ratio(&w.state),
        }
    }

    fn work(&self, _worker: &Worker) -> Vec<Step> {
        vec![Step::Act {
            action: Action::Harvest {
                target: self.source.id.clone(),
            },
            target: self.source.pos.clone(),
            range: 1,
        }]
    }
}

/// Withdraw energy from a container or storage
#[derive(Debug, Clone, PartialEq)]
pub struct Pickup {
    pub structure: Structure,
}

impl Pickup {
    pub fn new(structure: &Structure) -> Self {
        Self {
            structure: structure.clone(),
        }
    }

    pub fn rehydrate(id: &JobId, world: &WorldSnapshot) -> Option<Job> {
        world
            .structure(&id.target)
            .filter(|s| s.store.is_some())
            .map(|s| Job::Pickup(Pickup::new(s)))
    }

    fn stored(&self) -> u32 {
        capability::stored_energy(&self.structure)
    }
}

impl JobContract for Pickup {
    fn id(&self) -> JobId {
        JobId::new(JobKind::Pickup, &self.structure.id)
    }

    fn site(&self) -> &Position {
        &self.structure.pos
    }

    fn base_priority(&self) -> f64 {
        PRIORITY_PICKUP
    }

    fn is_satisfied(&self, workers: &[&Worker]) -> bool {
        let room: u32 = workers.iter().map(|w| capability::free_capacity(&w.state)).sum();
        room >= self.stored()
    }

    fn efficiency(&self, worker: &Worker) -> f64 {
        let capacity = capability::capacity(&worker.state);
        if capacity == 0 {
            return 0.0;
        }
        let amount = capacity.min(self.stored());
        // a partly loaded worker has to drop off first
        let work_ticks = 1.0 + capability::fill_ratio(&worker.state) * REFILL_TICKS;
        throughput(amount as f64, travel_ticks(worker, self.site(), 1), work_ticks)
    }

    fn completion(&self, worker: Option<&Worker>) -> f64 {
        match worker {
            None => match self.structure.store {
                Some(store) if store.capacity > 0 => 1.0 - ratio(store.energy, store.capacity),
                _ => 1.0,
            },
            Some(w) if capability::capacity(&w.state) == 0 => 1.0,
            Some(w) => capability::fill_ratio(&w.state),
        }
    }

    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::FreeCapacity
    }

    fn work(&self, _worker: &Worker) -> Vec<Step> {
        vec![Step::Act {
            action: Action::Withdraw {
                target: self.structure.id.clone(),
            },
            target: self.structure.pos.clone(),
            range: 1,
        }]
    }
}

/// Deliver energy into a spawn, extension, tower or depot
#[derive(Debug, Clone, PartialEq)]
pub struct Unload {
    pub structure: Structure,
}

impl Unload {
    pub fn new(structure: &Structure) -> Self {
        Self {
            structure: structure.clone(),
        }
    }

    pub fn rehydrate(id: &JobId, world: &WorldSnapshot) -> Option<Job> {
        world
            .structure(&id.target)
            .filter(|s| s.mine && s.store.is_some())
            .map(|s| Job::Unload(Unload::new(s)))
    }

    fn free_space(&self) -> u32 {
        capability::free_space(&self.structure)
    }
}

impl JobContract for Unload {
    fn id(&self) -> JobId {
        JobId::new(JobKind::Unload, &self.structure.id)
    }

    fn site(&self) -> &Position {
        &self.structure.pos
    }

    fn base_priority(&self) -> f64 {
        unload_priority(self.structure.kind)
    }

    fn is_satisfied(&self, workers: &[&Worker]) -> bool {
        let load: u32 = workers.iter().map(|w| capability::planned_load(&w.state)).sum();
        load >= self.free_space()
    }

    fn efficiency(&self, worker: &Worker) -> f64 {
        let capacity = capability::capacity(&worker.state);
        if capacity == 0 {
            return 0.0;
        }
        let amount = capacity.min(self.free_space());
        let work_ticks = 1.0 + (1.0 - capability::fill_ratio(&worker.state)) * REFILL_TICKS;
        throughput(amount as f64, travel_ticks(worker, self.site(), 1), work_ticks)
    }

    fn completion(&self, worker: Option<&Worker>) -> f64 {
        match worker {
            None => match self.structure.store {
                Some(store) => ratio(store.energy, store.capacity),
                None => 1.0,
            },
            Some(w) if capability::capacity(&w.state) == 0 => 1.0,
            Some(w) => 1.0 - capability::fill_ratio(&w.state),
        }
    }

    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::Energy
    }

    fn work(&self, _worker: &Worker) -> Vec<Step> {
        vec![Step::Act {
            action: Action::Transfer {
                target: self.structure.id.clone(),
            },
            target: self.structure.pos.clone(),
            range: 1,
        }]
    }
}
