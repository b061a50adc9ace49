//! Assignment persistence.
//!
//! The Mayor persists two things between cycles: the Bosses of each colony
//! (job id, owner, direct workers and subcontractors) and every worker's
//! scheduler memory. Both go through [`AssignmentStore`]; [`JsonlStore`]
//! keeps them on disk, [`MemoryStore`] keeps them for the life of the process.

mod jsonl;
mod records;

use std::collections::BTreeMap;

use crate::error::Result;
use crate::worker::WorkerMemory;

pub use jsonl::JsonlStore;
pub use records::{BossRecord, ColonyRecord, SubcontractRecord};

/// Read/write access to persisted assignments
pub trait AssignmentStore {
    /// Stored colony record, if any
    fn colony(&self, colony: &str) -> Result<Option<ColonyRecord>>;

    /// Every stored colony, ordered by id
    fn colonies(&self) -> Result<Vec<ColonyRecord>>;

    /// Replace a colony's Bosses
    fn save_colony(&mut self, colony: &str, tick: u64, bosses: &[BossRecord]) -> Result<()>;

    /// Forget a colony's Bosses; returns whether anything was stored
    fn clear_colony(&mut self, colony: &str) -> Result<bool>;

    fn load_workers(&self) -> Result<Vec<WorkerMemory>>;

    /// Replace all worker memories
    fn save_workers(&mut self, memories: &[WorkerMemory]) -> Result<()>;

    /// Replace a colony's Bosses and all worker memories together. On error
    /// neither is changed.
    fn save_cycle(&mut self, colony: &str, tick: u64, bosses: &[BossRecord], memories: &[WorkerMemory]) -> Result<()>;

    /// A colony's Bosses, empty when nothing was stored
    fn load_colony(&self, colony: &str) -> Result<Vec<BossRecord>> {
        Ok(self.colony(colony)?.map(|c| c.bosses).unwrap_or_default())
    }
}

/// In-process store, used by tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    colonies: BTreeMap<String, ColonyRecord>,
    workers: Vec<WorkerMemory>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AssignmentStore for MemoryStore {
    fn colony(&self, colony: &str) -> Result<Option<ColonyRecord>> {
        Ok(self.colonies.get(colony).cloned())
    }

    fn colonies(&self) -> Result<Vec<ColonyRecord>> {
        Ok(self.colonies.values().cloned().collect())
    }

    fn save_colony(&mut self, colony: &str, tick: u64, bosses: &[BossRecord]) -> Result<()> {
        self.colonies
            .insert(colony.to_string(), ColonyRecord::new(colony, tick, bosses.to_vec()));
        Ok(())
    }

    fn clear_colony(&mut self, colony: &str) -> Result<bool> {
        Ok(self.colonies.remove(colony).is_some())
    }

    fn load_workers(&self) -> Result<Vec<WorkerMemory>> {
        Ok(self.workers.clone())
    }

    fn save_workers(&mut self, memories: &[WorkerMemory]) -> Result<()> {
        self.workers = memories.to_vec();
        Ok(())
    }

    fn save_cycle(&mut self, colony: &str, tick: u64, bosses: &[BossRecord], memories: &[WorkerMemory]) -> Result<()> {
        self.save_colony(colony, tick, bosses)?;
        self.save_workers(memories)
    }
}
