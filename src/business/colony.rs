//! The home room economy: mining, upgrading, and keeping spawns fed.

use super::{Business, scaled_body};
use crate::job::{Harvest, Job, Pickup, Sign, Unload, Upgrade};
use crate::worker::{BodyPart, Worker};
use crate::world::capability;
use crate::world::WorldSnapshot;

/// WORK parts that fully drain one source.
const WORK_PER_SOURCE: u32 = 5;

/// Harvests every source in the colony and offers full depots for pickup
#[derive(Debug, Clone)]
pub struct Mining {
    id: String,
    colony: String,
}

impl Mining {
    pub fn new(colony: &str) -> Self {
        Self {
            id: format!("mining-{}", colony),
            colony: colony.to_string(),
        }
    }
}

impl Business for Mining {
    fn id(&self) -> &str {
        &self.id
    }

    fn permanent_jobs(&self, world: &WorldSnapshot) -> Vec<Job> {
        world
            .room(&self.colony)
            .map(|room| room.sources.iter().map(|s| Job::Harvest(Harvest::new(s))).collect())
            .unwrap_or_default()
    }

    fn contract_jobs(&self, world: &WorldSnapshot, _employees: &[&Worker]) -> Vec<Job> {
        world
            .room(&self.colony)
            .map(|room| {
                room.structures
                    .iter()
                    .filter(|s| s.mine && s.kind.is_depot() && capability::stored_energy(s) > 0)
                    .map(|s| Job::Pickup(Pickup::new(s)))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn needs_employee(&self, world: &WorldSnapshot, employees: &[&Worker]) -> bool {
        let sources = world.room(&self.colony).map(|r| r.sources.len()).unwrap_or(0) as u32;
        let work: u32 = employees
            .iter()
            .map(|w| capability::active_parts(&w.state, BodyPart::Work))
            .sum();
        work < sources * WORK_PER_SOURCE
    }

    fn employee_body(&self, world: &WorldSnapshot, _employees: &[&Worker]) -> Vec<BodyPart> {
        scaled_body(
            &[BodyPart::Work, BodyPart::Work, BodyPart::Carry, BodyPart::Move],
            world.spawn_energy(&self.colony),
            3,
        )
    }
}

/// Upgrades the colony controller and keeps it signed
#[derive(Debug, Clone)]
pub struct Upgrading {
    id: String,
    colony: String,
}

impl Upgrading {
    pub fn new(colony: &str) -> Self {
        Self {
            id: format!("upgrading-{}", colony),
            colony: colony.to_string(),
        }
    }
}

impl Business for Upgrading {
    fn id(&self) -> &str {
        &self.id
    }

    fn permanent_jobs(&self, world: &WorldSnapshot) -> Vec<Job> {
        world
            .room(&self.colony)
            .and_then(|room| room.controller.as_ref())
            .filter(|c| c.is_mine())
            .map(|c| vec![Job::Upgrade(Upgrade::new(c))])
            .unwrap_or_default()
    }

    fn contract_jobs(&self, world: &WorldSnapshot, _employees: &[&Worker]) -> Vec<Job> {
        world
            .room(&self.colony)
            .and_then(|room| room.controller.as_ref())
            .filter(|c| c.is_mine() && !Sign::is_signed(c))
            .map(|c| vec![Job::Sign(Sign::new(c))])
            .unwrap_or_default()
    }

    fn needs_employee(&self, world: &WorldSnapshot, employees: &[&Worker]) -> bool {
        employees.is_empty() && !self.permanent_jobs(world).is_empty()
    }

    fn employee_body(&self, world: &WorldSnapshot, _employees: &[&Worker]) -> Vec<BodyPart> {
        scaled_body(
            &[BodyPart::Work, BodyPart::Carry, BodyPart::Move],
            world.spawn_energy(&self.colony),
            4,
        )
    }
}

/// Delivers energy to spawns, extensions and towers
#[derive(Debug, Clone)]
pub struct Cloning {
    id: String,
    colony: String,
}

impl Cloning {
    pub fn new(colony: &str) -> Self {
        Self {
            id: format!("cloning-{}", colony),
            colony: colony.to_string(),
        }
    }
}

impl Business for Cloning {
    fn id(&self) -> &str {
        &self.id
    }

    fn permanent_jobs(&self, _world: &WorldSnapshot) -> Vec<Job> {
        Vec::new()
    }

    fn contract_jobs(&self, world: &WorldSnapshot, _employees: &[&Worker]) -> Vec<Job> {
        world
            .room(&self.colony)
            .map(|room| {
                room.structures
                    .iter()
                    .filter(|s| s.mine && s.kind.is_consumer() && capability::free_space(s) > 0)
                    .map(|s| Job::Unload(Unload::new(s)))
                    .collect()
            })
            .unwrap_or_default()
    }
}
