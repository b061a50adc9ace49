//! Jobs that spend energy on structures: build, repair, upgrade, and the
//! reverse, dismantle.

use super::priority::{PRIORITY_BUILD, PRIORITY_DISMANTLE, PRIORITY_UPGRADE, repair_priority};
use super::{Job, JobContract, Prerequisite, REFILL_TICKS, Step, ratio, throughput, travel_ticks};
use crate::id::{JobId, JobKind};
use crate::worker::{BodyPart, Worker, WorkerState};
use crate::world::action::Action;
use crate::world::capability;
use crate::world::{ConstructionSite, Controller, Position, Structure, WorldSnapshot};

/// Build progress per WORK part per tick.
const BUILD_POWER: u32 = 5;
/// Hits restored per unit of energy.
const REPAIR_HITS_PER_ENERGY: u32 = 100;
/// Hits removed per WORK part per tick.
const DISMANTLE_POWER: u32 = 50;
/// Horizon over which a dismantling crew should finish.
const DISMANTLE_TICKS: u32 = 100;
/// Working range for build, repair and upgrade.
const WORK_RANGE: u32 = 3;

/// Time to go fetch energy before starting
fn refill(worker: &WorkerState) -> f64 {
    (1.0 - capability::fill_ratio(worker)) * REFILL_TICKS
}

/// How spent an energy-consuming worker is
fn spent(worker: &WorkerState) -> f64 {
    if capability::capacity(worker) == 0 {
        1.0
    } else {
        1.0 - capability::fill_ratio(worker)
    }
}

/// WORK parts, or `None` for workers that cannot carry energy to spend
fn working_parts(worker: &WorkerState) -> Option<u32> {
    let work = capability::active_parts(worker, BodyPart::Work);
    if work == 0 || capability::capacity(worker) == 0 {
        None
    } else {
        Some(work)
    }
}

/// Construct a structure from a construction site
#[derive(Debug, Clone, PartialEq)]
pub struct Build {
    pub site: ConstructionSite,
}

impl Build {
    pub fn new(site: &ConstructionSite) -> Self {
        Self { site: site.clone() }
    }

    pub fn rehydrate(id: &JobId, world: &WorldSnapshot) -> Option<Job> {
        world.construction_site(&id.target).map(|s| Job::Build(Build::new(s)))
    }

    fn remaining(&self) -> u32 {
        self.site.progress_total.saturating_sub(self.site.progress)
    }
}

impl JobContract for Build {
    fn id(&self) -> JobId {
        JobId::new(JobKind::Build, &self.site.id)
    }

    fn site(&self) -> &Position {
        &self.site.pos
    }

    fn base_priority(&self) -> f64 {
        PRIORITY_BUILD
    }

    fn is_satisfied(&self, workers: &[&Worker]) -> bool {
        let load: u32 = workers.iter().map(|w| capability::planned_load(&w.state)).sum();
        load >= self.remaining()
    }

    fn efficiency(&self, worker: &Worker) -> f64 {
        let Some(work) = working_parts(&worker.state) else {
            return 0.0;
        };
        let amount = capability::planned_load(&worker.state).min(self.remaining());
        let work_ticks = amount as f64 / (work * BUILD_POWER) as f64 + refill(&worker.state);
        throughput(amount as f64, travel_ticks(worker, self.site(), WORK_RANGE), work_ticks)
    }

    fn completion(&self, worker: Option<&Worker>) -> f64 {
        match worker {
            None => ratio(self.site.progress, self.site.progress_total),
            Some(w) => spent(&w.state),
        }
    }

    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::Energy
    }

    fn work(&self, _worker: &Worker) -> Vec<Step> {
        vec![Step::Act {
            action: Action::Build {
                target: self.site.id.clone(),
            },
            target: self.site.pos.clone(),
            range: WORK_RANGE,
        }]
    }
}

/// Restore a structure's hits up to a goal
#[derive(Debug, Clone, PartialEq)]
pub struct Repair {
    pub structure: Structure,
    pub goal: u32,
}

impl Repair {
    pub fn new(structure: &Structure, goal: u32) -> Self {
        Self {
            structure: structure.clone(),
            goal,
        }
    }

    /// Repair to full hits
    pub fn full(structure: &Structure) -> Self {
        Self::new(structure, structure.hits_max)
    }

    pub fn rehydrate(id: &JobId, world: &WorldSnapshot) -> Option<Job> {
        let goal = id.param?;
        world
            .structure(&id.target)
            .filter(|s| s.mine)
            .map(|s| Job::Repair(Repair::new(s, goal)))
    }

    fn target_hits(&self) -> u32 {
        self.goal.min(self.structure.hits_max)
    }

    fn remaining(&self) -> u32 {
        self.target_hits().saturating_sub(self.structure.hits)
    }
}

impl JobContract for Repair {
    fn id(&self) -> JobId {
        JobId::with_param(JobKind::Repair, &self.structure.id, self.goal)
    }

    fn site(&self) -> &Position {
        &self.structure.pos
    }

    fn base_priority(&self) -> f64 {
        repair_priority(self.structure.hits, self.structure.hits_max)
    }

    fn is_satisfied(&self, workers: &[&Worker]) -> bool {
        let load: u32 = workers.iter().map(|w| capability::planned_load(&w.state)).sum();
        load.saturating_mul(REPAIR_HITS_PER_ENERGY) >= self.remaining()
    }

    fn efficiency(&self, worker: &Worker) -> f64 {
        let Some(work) = working_parts(&worker.state) else {
            return 0.0;
        };
        let needed = self.remaining().div_ceil(REPAIR_HITS_PER_ENERGY);
        let amount = capability::planned_load(&worker.state).min(needed);
        let work_ticks = amount as f64 / work as f64 + refill(&worker.state);
        throughput(amount as f64, travel_ticks(worker, self.site(), WORK_RANGE), work_ticks)
    }

    fn completion(&self, worker: Option<&Worker>) -> f64 {
        match worker {
            None => ratio(self.structure.hits, self.target_hits()),
            Some(w) => spent(&w.state),
        }
    }

    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::Energy
    }

    fn work(&self, _worker: &Worker) -> Vec<Step> {
        vec![Step::Act {
            action: Action::Repair {
                target: self.structure.id.clone(),
            },
            target: self.structure.pos.clone(),
            range: WORK_RANGE,
        }]
    }
}

/// Upgrade an owned controller; there is always more to do
#[derive(Debug, Clone, PartialEq)]
pub struct Upgrade {
    pub controller: Controller,
}

impl Upgrade {
    pub fn new(controller: &Controller) -> Self {
        Self {
            controller: controller.clone(),
        }
    }

    pub fn rehydrate(id: &JobId, world: &WorldSnapshot) -> Option<Job> {
        world
            .controller(&id.target)
            .filter(|c| c.is_mine())
            .map(|c| Job::Upgrade(Upgrade::new(c)))
    }
}

impl JobContract for Upgrade {
    fn id(&self) -> JobId {
        JobId::new(JobKind::Upgrade, &self.controller.id)
    }

    fn site(&self) -> &Position {
        &self.controller.pos
    }

    fn base_priority(&self) -> f64 {
        PRIORITY_UPGRADE
    }

    fn is_satisfied(&self, _workers: &[&Worker]) -> bool {
        false
    }

    fn efficiency(&self, worker: &Worker) -> f64 {
        let Some(work) = working_parts(&worker.state) else {
            return 0.0;
        };
        let amount = capability::planned_load(&worker.state);
        let work_ticks = amount as f64 / work as f64 + refill(&worker.state);
        throughput(amount as f64, travel_ticks(worker, self.site(), WORK_RANGE), work_ticks)
    }

    fn completion(&self, worker: Option<&Worker>) -> f64 {
        match worker {
            None => 0.0,
            Some(w) => spent(&w.state),
        }
    }

    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::Energy
    }

    fn work(&self, _worker: &Worker) -> Vec<Step> {
        vec![Step::Act {
            action: Action::Upgrade {
                target: self.controller.id.clone(),
            },
            target: self.controller.pos.clone(),
            range: WORK_RANGE,
        }]
    }
}

/// Tear down a structure that is not ours
#[derive(Debug, Clone, PartialEq)]
pub struct Dismantle {
    pub structure: Structure,
}

impl Dismantle {
    pub fn new(structure: &Structure) -> Self {
        Self {
            structure: structure.clone(),
        }
    }

    pub fn rehydrate(id: &JobId, world: &WorldSnapshot) -> Option<Job> {
        world
            .structure(&id.target)
            .filter(|s| !s.mine)
            .map(|s| Job::Dismantle(Dismantle::new(s)))
    }
}

impl JobContract for Dismantle {
    fn id(&self) -> JobId {
        JobId::new(JobKind::Dismantle, &self.structure.id)
    }

    fn site(&self) -> &Position {
        &self.structure.pos
    }

    fn base_priority(&self) -> f64 {
        PRIORITY_DISMANTLE
    }

    fn is_satisfied(&self, workers: &[&Worker]) -> bool {
        let work: u32 = workers
            .iter()
            .map(|w| capability::active_parts(&w.state, BodyPart::Work))
            .sum();
        work * DISMANTLE_POWER * DISMANTLE_TICKS >= self.structure.hits
    }

    fn efficiency(&self, worker: &Worker) -> f64 {
        let work = capability::active_parts(&worker.state, BodyPart::Work);
        if work == 0 {
            return 0.0;
        }
        let amount = self.structure.hits as f64;
        let work_ticks = amount / (work * DISMANTLE_POWER) as f64;
        throughput(amount, travel_ticks(worker, self.site(), 1), work_ticks)
    }

    fn completion(&self, worker: Option<&Worker>) -> f64 {
        match worker {
            None => 1.0 - ratio(self.structure.hits, self.structure.hits_max),
            Some(w) => capability::fill_ratio(&w.state),
        }
    }

    fn work(&self, _worker: &Worker) -> Vec<Step> {
        vec![Step::Act {
            action: Action::Dismantle {
                target: self.structure.id.clone(),
            },
            target: self.structure.pos.clone(),
            range: 1,
        }]
    }
}
