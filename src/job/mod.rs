//! Jobs: units of work with priority, satisfaction and efficiency semantics.
//!
//! Every job kind implements [`JobContract`]. [`Job`] is the closed set of
//! variants; it forwards the contract to the wrapped variant.
//!
//! Jobs are constructed fresh every cycle from the world snapshot. Only a
//! job's [`JobId`] is persisted; [`rehydrate`] rebuilds the live job through
//! a per-kind constructor table, returning `None` when the target is gone.

mod construction;
mod defense;
mod logistics;
mod priority;
mod territory;
mod upkeep;

pub use construction::{Build, Dismantle, Repair, Upgrade};
pub use defense::Attack;
pub use logistics::{Harvest, Pickup, Unload};
pub use priority::{
    PRIORITY_ATTACK, PRIORITY_BUILD, PRIORITY_CLAIM, PRIORITY_DISMANTLE, PRIORITY_HARVEST, PRIORITY_PICKUP,
    PRIORITY_RECYCLE, PRIORITY_REPAIR, PRIORITY_REPAIR_CRITICAL, PRIORITY_RESERVE, PRIORITY_SCOUT, PRIORITY_SIGN,
    PRIORITY_UNLOAD_DEPOT, PRIORITY_UNLOAD_SPAWN, PRIORITY_UNLOAD_TOWER, PRIORITY_UPGRADE, base_priority,
};
pub use territory::{Claim, Reserve, SIGN_TEXT, Scout, Sign};
pub use upkeep::Recycle;

use crate::id::{JobId, JobKind};
use crate::worker::{Worker, WorkerState};
use crate::world::action::Action;
use crate::world::capability;
use crate::world::{Position, WorldSnapshot};

/// Ticks a worker is assumed to need to fill or empty a whole store
/// before it can start on a job.
pub const REFILL_TICKS: f64 = 25.0;

/// One thing a worker should do this cycle
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Perform an action; approach `target` to within `range` if the
    /// boundary reports the worker is too far away
    Act { action: Action, target: Position, range: u32 },
    /// Move toward `target` with no action on arrival
    Approach { target: Position, range: u32 },
}

/// Condition a worker must meet before it can work a job directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prerequisite {
    None,
    /// Worker must carry energy
    Energy,
    /// Worker must have room in its store
    FreeCapacity,
}

impl Prerequisite {
    pub fn is_met(&self, worker: &WorkerState) -> bool {
        match self {
            Prerequisite::None => true,
            Prerequisite::Energy => worker.carried > 0,
            Prerequisite::FreeCapacity => capability::free_capacity(worker) > 0,
        }
    }
}

/// The contract every job kind exposes
pub trait JobContract {
    fn id(&self) -> JobId;

    /// Where the work happens
    fn site(&self) -> &Position;

    fn base_priority(&self) -> f64;

    /// Base priority, diminished by the number of workers already on the job
    fn priority(&self, workers: Option<usize>) -> f64 {
        let base = self.base_priority();
        match workers {
            Some(count) => base / (count as f64 + 1.0),
            None => base,
        }
    }

    /// Whether the given workers cover the job's remaining need
    fn is_satisfied(&self, workers: &[&Worker]) -> bool;

    /// Estimated value per tick of assigning this worker; 0.0 means the
    /// worker must not be assigned
    fn efficiency(&self, worker: &Worker) -> f64;

    /// Fraction done in [0, 1]: job-wide without a worker, or how spent a
    /// particular worker is relative to the job
    fn completion(&self, worker: Option<&Worker>) -> f64;

    fn prerequisite(&self) -> Prerequisite {
        Prerequisite::None
    }

    /// Steps for one cycle
    fn work(&self, worker: &Worker) -> Vec<Step>;
}

/// Every job variant
#[derive(Debug, Clone, PartialEq)]
pub enum Job {
    Harvest(Harvest),
    Pickup(Pickup),
    Unload(Unload),
    Build(Build),
    Repair(Repair),
    Upgrade(Upgrade),
    Dismantle(Dismantle),
    Attack(Attack),
    Claim(Claim),
    Reserve(Reserve),
    Scout(Scout),
    Sign(Sign),
    Recycle(Recycle),
}

macro_rules! dispatch {
    ($self:ident, $job:ident => $body:expr) => {
        match $self {
            Job::Harvest($job) => $body,
            Job::Pickup($job) => $body,
            Job::Unload($job) => $body,
            Job::Build($job) => $body,
            Job::Repair($job) => $body,
            Job::Upgrade($job) => $body,
            Job::Dismantle($job) => $body,
            Job::Attack($job) => $body,
            Job::Claim($job) => $body,
            Job::Reserve($job) => $body,
            Job::Scout($job) => $body,
            Job::Sign($job) => $body,
            Job::Recycle($job) => $body,
        }
    };
}

impl JobContract for Job {
    fn id(&self) -> JobId {
        dispatch!(self, job => job.id())
    }

    fn site(&self) -> &Position {
        dispatch!(self, job => job.site())
    }

    fn base_priority(&self) -> f64 {
        dispatch!(self, job => job.base_priority())
    }

    fn priority(&self, workers: Option<usize>) -> f64 {
        dispatch!(self, job => job.priority(workers))
    }

    /// Never satisfied without staff, even when nothing is left to do
    fn is_satisfied(&self, workers: &[&Worker]) -> bool {
        if workers.is_empty() {
            return false;
        }
        dispatch!(self, job => job.is_satisfied(workers))
    }

    fn efficiency(&self, worker: &Worker) -> f64 {
        let value = dispatch!(self, job => job.efficiency(worker));
        if value.is_finite() && value > 0.0 { value } else { 0.0 }
    }

    fn completion(&self, worker: Option<&Worker>) -> f64 {
        let value = dispatch!(self, job => job.completion(worker));
        if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
    }

    fn prerequisite(&self) -> Prerequisite {
        dispatch!(self, job => job.prerequisite())
    }

    fn work(&self, worker: &Worker) -> Vec<Step> {
        dispatch!(self, job => job.work(worker))
    }
}

impl Job {
    pub fn kind(&self) -> JobKind {
        match self {
            Job::Harvest(_) => JobKind::Harvest,
            Job::Pickup(_) => JobKind::Pickup,
            Job::Unload(_) => JobKind::Unload,
            Job::Build(_) => JobKind::Build,
            Job::Repair(_) => JobKind::Repair,
            Job::Upgrade(_) => JobKind::Upgrade,
            Job::Dismantle(_) => JobKind::Dismantle,
            Job::Attack(_) => JobKind::Attack,
            Job::Claim(_) => JobKind::Claim,
            Job::Reserve(_) => JobKind::Reserve,
            Job::Scout(_) => JobKind::Scout,
            Job::Sign(_) => JobKind::Sign,
            Job::Recycle(_) => JobKind::Recycle,
        }
    }

    /// Whether working this job brings `worker` to meet `prerequisite`
    pub fn fulfills(&self, prerequisite: Prerequisite, worker: &WorkerState) -> bool {
        match prerequisite {
            Prerequisite::None => false,
            Prerequisite::Energy => match self {
                Job::Pickup(_) => true,
                Job::Harvest(_) => capability::capacity(worker) > 0,
                _ => false,
            },
            Prerequisite::FreeCapacity => matches!(self, Job::Unload(_)),
        }
    }
}

type Rehydrate = fn(&JobId, &WorldSnapshot) -> Option<Job>;

/// Constructor per job kind, used to rebuild persisted jobs
const FACTORY: [(JobKind, Rehydrate); 13] = [
    (JobKind::Harvest, Harvest::rehydrate),
    (JobKind::Pickup, Pickup::rehydrate),
    (JobKind::Unload, Unload::rehydrate),
    (JobKind::Build, Build::rehydrate),
    (JobKind::Repair, Repair::rehydrate),
    (JobKind::Upgrade, Upgrade::rehydrate),
    (JobKind::Dismantle, Dismantle::rehydrate),
    (JobKind::Attack, Attack::rehydrate),
    (JobKind::Claim, Claim::rehydrate),
    (JobKind::Reserve, Reserve::rehydrate),
    (JobKind::Scout, Scout::rehydrate),
    (JobKind::Sign, Sign::rehydrate),
    (JobKind::Recycle, Recycle::rehydrate),
];

/// Rebuild a live job from its persisted id, or `None` if its target is gone
pub fn rehydrate(id: &JobId, world: &WorldSnapshot) -> Option<Job> {
    FACTORY
        .iter()
        .find(|(kind, _)| *kind == id.kind)
        .and_then(|(_, build)| build(id, world))
}

/// Value per tick of `amount` units of work that take `work_ticks` to do
/// after `travel` ticks of walking.
pub(crate) fn throughput(amount: f64, travel: u32, work_ticks: f64) -> f64 {
    if amount <= 0.0 || !amount.is_finite() || !work_ticks.is_finite() {
        return 0.0;
    }
    let ticks = (travel as f64 + work_ticks).max(1.0);
    amount / ticks
}

/// Ticks spent walking to within `range` of `site`
pub(crate) fn travel_ticks(worker: &Worker, site: &Position, range: u32) -> u32 {
    worker.pos().range_to(site).saturating_sub(range)
}

/// `part / whole` clamped to [0, 1]; an empty whole counts as complete
pub(crate) fn ratio(part: u32, whole: u32) -> f64 {
    if whole == 0 {
        return 1.0;
    }
    (part.min(whole) as f64) / (whole as f64)
}


#[cfg(test)]
mod tests {
    use super::fixtures::generalist;
    use super::*;
    use crate::world::{ConstructionSite, Hostile, RoomSnapshot, Source, Store, Structure, StructureKind};

    fn structure(kind: StructureKind, hits: u32, energy: u32, capacity: u32) -> Structure {
        Structure {
            id: "s1".to_string(),
            pos: Position::new("W1N1", 5, 5),
            kind,
            hits,
            hits_max: 1000,
            store: Some(Store { energy, capacity }),
            mine: true,
        }
    }

    fn world_with_source() -> WorldSnapshot {
        WorldSnapshot {
            tick: 1,
            rooms: vec![RoomSnapshot {
                name: "W1N1".to_string(),
                sources: vec![Source {
                    id: "src1".to_string(),
                    pos: Position::new("W1N1", 10, 10),
                    energy: 3000,
                    energy_capacity: 3000,
                }],
                ..Default::default()
            }],
            workers: vec![],
        }
    }

    #[test]
    fn test_rehydrate_resolves_live_target() {
        let world = world_with_source();
        let job = rehydrate(&JobId::new(JobKind::Harvest, "src1"), &world).unwrap();
        assert_eq!(job.kind(), JobKind::Harvest);
        assert_eq!(job.id().encode(), "harvest-src1");
    }

    #[test]
    fn test_rehydrate_missing_target_is_none() {
        let world = world_with_source();
        assert!(rehydrate(&JobId::new(JobKind::Harvest, "gone"), &world).is_none());
        assert!(rehydrate(&JobId::new(JobKind::Pickup, "src1"), &world).is_none());
    }

    #[test]
    fn test_factory_covers_every_kind() {
        for kind in JobKind::ALL {
            assert!(FACTORY.iter().any(|(k, _)| *k == kind), "missing {}", kind);
        }
    }

    #[test]
    fn test_priority_diminishes_with_workers() {
        let world = world_with_source();
        let job = rehydrate(&JobId::new(JobKind::Harvest, "src1"), &world).unwrap();
        let base = job.priority(None);
        assert_eq!(job.priority(Some(0)), base);
        assert_eq!(job.priority(Some(1)), base / 2.0);
        assert_eq!(job.priority(Some(3)), base / 4.0);
    }

    #[test]
    fn test_prerequisite_checks() {
        let empty = generalist("a", 1, 1, 0);
        let full = generalist("b", 1, 1, 100);
        assert!(Prerequisite::None.is_met(&empty.state));
        assert!(!Prerequisite::Energy.is_met(&empty.state));
        assert!(Prerequisite::Energy.is_met(&full.state));
        assert!(Prerequisite::FreeCapacity.is_met(&empty.state));
        assert!(!Prerequisite::FreeCapacity.is_met(&full.state));
    }

    #[test]
    fn test_no_staff_is_never_satisfied() {
        let full_spawn = structure(StructureKind::Spawn, 1000, 300, 300);
        let empty_box = structure(StructureKind::Container, 1000, 0, 2000);
        let wreck = structure(StructureKind::Wall, 0, 0, 0);
        let done = ConstructionSite {
            id: "cs1".to_string(),
            pos: Position::new("W1N1", 5, 5),
            progress: 100,
            progress_total: 100,
        };
        let dead = Hostile {
            id: "h1".to_string(),
            pos: Position::new("W1N1", 5, 5),
            hits: 0,
            hits_max: 100,
        };

        let jobs = [
            Job::Unload(Unload::new(&full_spawn)),
            Job::Pickup(Pickup::new(&empty_box)),
            Job::Build(Build::new(&done)),
            Job::Repair(Repair::new(&structure(StructureKind::Road, 1000, 0, 0), 1000)),
            Job::Dismantle(Dismantle::new(&wreck)),
            Job::Attack(Attack::new(&dead)),
        ];
        for job in &jobs {
            assert!(!job.is_satisfied(&[]), "{} satisfied with no staff", job.id());
        }

        let worker = generalist("w1", 5, 5, 50);
        assert!(jobs[0].is_satisfied(&[&worker]));
        assert!(jobs[1].is_satisfied(&[&worker]));
    }

    #[test]
    fn test_throughput_guards() {
        assert_eq!(throughput(0.0, 5, 1.0), 0.0);
        assert_eq!(throughput(f64::NAN, 5, 1.0), 0.0);
        assert_eq!(throughput(10.0, 0, 0.0), 10.0);
        assert_eq!(throughput(10.0, 4, 1.0), 2.0);
    }

    #[test]
    fn test_ratio_edges() {
        assert_eq!(ratio(5, 0), 1.0);
        assert_eq!(ratio(50, 100), 0.5);
        assert_eq!(ratio(200, 100), 1.0);
    }
}
