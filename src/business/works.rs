//! Contract-only businesses: construction and repair, defense, recycling.

use super::Business;
use crate::job::{Attack, Build, Dismantle, Job, Recycle, Repair};
use crate::worker::Worker;
use crate::world::{StructureKind, WorldSnapshot};

/// Builds construction sites and repairs damaged structures
#[derive(Debug, Clone)]
pub struct Architecture {
    id: String,
    colony: String,
    wall_goal: u32,
}

impl Architecture {
    pub fn new(colony: &str, wall_goal: u32) -> Self {
        Self {
            id: format!("architecture-{}", colony),
            colony: colony.to_string(),
            wall_goal,
        }
    }
}

impl Business for Architecture {
    fn id(&self) -> &str {
        &self.id
    }

    fn permanent_jobs(&self, _world: &WorldSnapshot) -> Vec<Job> {
        Vec::new()
    }

    fn contract_jobs(&self, world: &WorldSnapshot, _employees: &[&Worker]) -> Vec<Job> {
        let Some(room) = world.room(&self.colony) else {
            return Vec::new();
        };

        let builds = room.construction_sites.iter().map(|s| Job::Build(Build::new(s)));

        let repairs = room.structures.iter().filter(|s| s.mine).filter_map(|s| {
            // walls and ramparts have huge hit pools; only repair them to a goal
            let repair = match s.kind {
                StructureKind::Wall | StructureKind::Rampart => Repair::new(s, self.wall_goal),
                _ => Repair::full(s),
            };
            (s.hits < repair.goal.min(s.hits_max)).then_some(Job::Repair(repair))
        });

        builds.chain(repairs).collect()
    }
}

/// Attacks hostiles and tears down hostile structures in the colony
#[derive(Debug, Clone)]
pub struct Defense {
    id: String,
    colony: String,
}

impl Defense {
    pub fn new(colony: &str) -> Self {
        Self {
            id: format!("defense-{}", colony),
            colony: colony.to_string(),
        }
    }
}

impl Business for Defense {
    fn id(&self) -> &str {
        &self.id
    }

    fn permanent_jobs(&self, _world: &WorldSnapshot) -> Vec<Job> {
        Vec::new()
    }

    fn contract_jobs(&self, world: &WorldSnapshot, _employees: &[&Worker]) -> Vec<Job> {
        let Some(room) = world.room(&self.colony) else {
            return Vec::new();
        };
        let attacks = room.hostiles.iter().map(|h| Job::Attack(Attack::new(h)));
        let dismantles = room
            .structures
            .iter()
            .filter(|s| !s.mine)
            .map(|s| Job::Dismantle(Dismantle::new(s)));
        attacks.chain(dismantles).collect()
    }
}

/// Recycles workers about to expire
#[derive(Debug, Clone)]
pub struct Upkeep {
    id: String,
    colony: String,
    ttl_threshold: u32,
}

impl Upkeep {
    pub fn new(colony: &str, ttl_threshold: u32) -> Self {
        Self {
            id: format!("upkeep-{}", colony),
            colony: colony.to_string(),
            ttl_threshold,
        }
    }
}

impl Business for Upkeep {
    fn id(&self) -> &str {
        &self.id
    }

    fn permanent_jobs(&self, _world: &WorldSnapshot) -> Vec<Job> {
        Vec::new()
    }

    fn contract_jobs(&self, world: &WorldSnapshot, _employees: &[&Worker]) -> Vec<Job> {
        let dying = world
            .workers
            .iter()
            .any(|w| w.ticks_to_live.is_some_and(|ttl| ttl < self.ttl_threshold));
        if !dying {
            return Vec::new();
        }
        world
            .spawns_in(&self.colony)
            .first()
            .map(|spawn| vec![Job::Recycle(Recycle::new(spawn, self.ttl_threshold))])
            .unwrap_or_default()
    }
}
