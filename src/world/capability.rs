//! Capability queries over world entities.
//!
//! Plain functions taking the entity as a parameter; entity types stay pure
//! data.

use crate::worker::{BodyPart, CARRY_CAPACITY, Worker, WorkerState};
use crate::world::Structure;

/// Total energy a worker can carry
pub fn capacity(worker: &WorkerState) -> u32 {
    worker.body.carry * CARRY_CAPACITY
}

/// Room left in a worker's store
pub fn free_capacity(worker: &WorkerState) -> u32 {
    capacity(worker).saturating_sub(worker.carried)
}

/// Fraction of a worker's store in use, 0.0 for workers that cannot carry
pub fn fill_ratio(worker: &WorkerState) -> f64 {
    let capacity = capacity(worker);
    if capacity == 0 {
        return 0.0;
    }
    (worker.carried.min(capacity) as f64) / (capacity as f64)
}

/// Energy a worker will bring to an energy-consuming job: what it carries,
/// or a full load if it still has to fetch one.
pub fn planned_load(worker: &WorkerState) -> u32 {
    if worker.carried > 0 { worker.carried } else { capacity(worker) }
}

pub fn active_parts(worker: &WorkerState, part: BodyPart) -> u32 {
    worker.body.count(part)
}

pub fn stored_energy(structure: &Structure) -> u32 {
    structure.store.map(|s| s.energy).unwrap_or(0)
}

/// Room left in a structure's store, 0 for structures without one
pub fn free_space(structure: &Structure) -> u32 {
    structure
        .store
        .map(|s| s.capacity.saturating_sub(s.energy))
        .unwrap_or(0)
}

pub fn is_employed(worker: &Worker) -> bool {
    worker.memory.job.is_some()
}
