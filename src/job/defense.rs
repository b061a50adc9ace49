use super::priority::PRIORITY_ATTACK;
use super::{Job, JobContract, Step, ratio, throughput, travel_ticks};
use crate::id::{JobId, JobKind};
use crate::worker::{BodyPart, Worker};
use crate::world::action::Action;
use crate::world::capability;
use crate::world::{Hostile, Position, WorldSnapshot};

/// Damage per ATTACK part per tick.
const ATTACK_POWER: u32 = 30;
/// Ticks an attacking squad should need to finish a hostile.
const ATTACK_TICKS: u32 = 10;

/// Engage a hostile unit in melee
#[derive(Debug, Clone, PartialEq)]
pub struct Attack {
    pub hostile: Hostile,
}

impl Attack {
    pub fn new(hostile: &Hostile) -> Self {
        Self {
            hostile: hostile.clone(),
        }
    }

    pub fn rehydrate(id: &JobId, world: &WorldSnapshot) -> Option<Job> {
        world.hostile(&id.target).map(|h| Job::Attack(Attack::new(h)))
    }
}

impl JobContract for Attack {
    fn id(&self) -> JobId {
        JobId::new(JobKind::Attack, &self.hostile.id)
    }

    fn site(&self) -> &Position {
        &self.hostile.pos
    }

    fn base_priority(&self) -> f64 {
        PRIORITY_ATTACK
    }

    fn is_satisfied(&self, workers: &[&Worker]) -> bool {
        let attack: u32 = workers
            .iter()
            .map(|w| capability::active_parts(&w.state, BodyPart::Attack))
            .sum();
        attack * ATTACK_POWER * ATTACK_TICKS >= self.hostile.hits
    }

    fn efficiency(&self, worker: &Worker) -> f64 {
        let attack = capability::active_parts(&worker.state, BodyPart::Attack);
        if attack == 0 {
            return 0.0;
        }
        let amount = self.hostile.hits as f64;
        let work_ticks = amount / (attack * ATTACK_POWER) as f64;
        throughput(amount, travel_ticks(worker, self.site(), 1), work_ticks)
    }

    fn completion(&self, worker: Option<&Worker>) -> f64 {
        match worker {
            None => 1.0 - ratio(self.hostile.hits, self.hostile.hits_max),
            Some(_) => 0.0,
        }
    }

    fn work(&self, _worker: &Worker) -> Vec<Step> {
        vec![Step::Act {
            action: Action::Attack {
                target: self.hostile.id.clone(),
            },
            target: self.hostile.pos.clone(),
            range: 1,
        }]
    }
}
