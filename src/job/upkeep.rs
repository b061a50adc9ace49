use super::priority::PRIORITY_RECYCLE;
use super::{Job, JobContract, Step, throughput, travel_ticks};
use crate::id::{JobId, JobKind};
use crate::worker::Worker;
use crate::world::action::Action;
use crate::world::{Position, Structure, StructureKind, WorldSnapshot};

/// Send workers near the end of their life back to a spawn to be recycled
#[derive(Debug, Clone, PartialEq)]
pub struct Recycle {
    pub spawn: Structure,
    /// Workers with fewer ticks to live than this qualify
    pub ttl_threshold: u32,
}

impl Recycle {
    pub fn new(spawn: &Structure, ttl_threshold: u32) -> Self {
        Self {
            spawn: spawn.clone(),
            ttl_threshold,
        }
    }

    pub fn rehydrate(id: &JobId, world: &WorldSnapshot) -> Option<Job> {
        let threshold = id.param?;
        world
            .structure(&id.target)
            .filter(|s| s.mine && s.kind == StructureKind::Spawn)
            .map(|s| Job::Recycle(Recycle::new(s, threshold)))
    }

    fn qualifies(&self, worker: &Worker) -> bool {
        worker.state.ticks_to_live.is_some_and(|ttl| ttl < self.ttl_threshold)
    }
}

impl JobContract for Recycle {
    fn id(&self) -> JobId {
        JobId::with_param(JobKind::Recycle, &self.spawn.id, self.ttl_threshold)
    }

    fn site(&self) -> &Position {
        &self.spawn.pos
    }

    fn base_priority(&self) -> f64 {
        PRIORITY_RECYCLE
    }

    fn is_satisfied(&self, _workers: &[&Worker]) -> bool {
        false
    }

    fn efficiency(&self, worker: &Worker) -> f64 {
        if !self.qualifies(worker) {
            return 0.0;
        }
        throughput(1.0, travel_ticks(worker, self.site(), 1), 1.0)
    }

    fn completion(&self, _worker: Option<&Worker>) -> f64 {
        0.0
    }

    fn work(&self, _worker: &Worker) -> Vec<Step> {
        vec![Step::Act {
            action: Action::Recycle {
                spawn: self.spawn.id.clone(),
            },
            target: self.spawn.pos.clone(),
            range: 1,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::generalist;
    use super::*;
    use crate::world::Store;

    fn spawn() -> Structure {
        Structure {
            id: "spawn1".to_string(),
            pos: Position::new("W1N1", 15, 15),
            kind: StructureKind::Spawn,
            hits: 5000,
            hits_max: 5000,
            store: Some(Store {
                energy: 300,
                capacity: 300,
            }),
            mine: true,
        }
    }

    #[test]
    fn test_recycle_only_dying_workers() {
        let job = Recycle::new(&spawn(), 50);
        let young = generalist("young", 14, 14, 0);
        let mut old = generalist("old", 14, 14, 0);
        old.state.ticks_to_live = Some(20);

        assert_eq!(job.efficiency(&young), 0.0);
        assert!(job.efficiency(&old) > 0.0);
    }

    #[test]
    fn test_recycle_never_satisfied_or_complete() {
        let job = Recycle::new(&spawn(), 50);
        let mut old = generalist("old", 14, 14, 0);
        old.state.ticks_to_live = Some(1);
        assert!(!job.is_satisfied(&[&old]));
        assert_eq!(job.completion(None), 0.0);
    }

    #[test]
    fn test_recycle_id_carries_threshold() {
        let job = Recycle::new(&spawn(), 50);
        assert_eq!(job.id().encode(), "recycle-spawn1-50");
    }
}
