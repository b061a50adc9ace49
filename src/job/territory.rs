//! Room control: claiming, reserving, scouting and signing controllers.

use super::priority::{PRIORITY_CLAIM, PRIORITY_RESERVE, PRIORITY_SCOUT, PRIORITY_SIGN};
use super::{Job, JobContract, Step, ratio, throughput, travel_ticks};
use crate::id::{JobId, JobKind};
use crate::worker::{BodyPart, Worker};
use crate::world::action::Action;
use crate::world::capability;
use crate::world::{Controller, Position, WorldSnapshot};

/// Text written on every controller we sign.
pub const SIGN_TEXT: &str = "Territory of a self-governing colony. Please keep out.";

/// Reservation ticks counted as a finished reservation.
const RESERVATION_GOAL: u32 = 5000;
/// Distance from a room's center at which a scout counts as arrived.
const SCOUT_RANGE: u32 = 20;

/// Value of a one-off job that only needs the worker to show up
fn arrival(worker: &Worker, site: &Position, range: u32, part: BodyPart) -> f64 {
    if capability::active_parts(&worker.state, part) == 0 {
        return 0.0;
    }
    throughput(1.0, travel_ticks(worker, site, range), 1.0)
}

/// Claim a controller for the colony
#[derive(Debug, Clone, PartialEq)]
pub struct Claim {
    pub controller: Controller,
}

impl Claim {
    pub fn new(controller: &Controller) -> Self {
        Self {
            controller: controller.clone(),
        }
    }

    pub fn rehydrate(id: &JobId, world: &WorldSnapshot) -> Option<Job> {
        world.controller(&id.target).map(|c| Job::Claim(Claim::new(c)))
    }
}

impl JobContract for Claim {
    fn id(&self) -> JobId {
        JobId::new(JobKind::Claim, &self.controller.id)
    }

    fn site(&self) -> &Position {
        &self.controller.pos
    }

    fn base_priority(&self) -> f64 {
        PRIORITY_CLAIM
    }

    fn is_satisfied(&self, workers: &[&Worker]) -> bool {
        !workers.is_empty()
    }

    fn efficiency(&self, worker: &Worker) -> f64 {
        arrival(worker, self.site(), 1, BodyPart::Claim)
    }

    fn completion(&self, worker: Option<&Worker>) -> f64 {
        match worker {
            None if self.controller.is_mine() => 1.0,
            _ => 0.0,
        }
    }

    fn work(&self, _worker: &Worker) -> Vec<Step> {
        vec![Step::Act {
            action: Action::Claim {
                target: self.controller.id.clone(),
            },
            target: self.controller.pos.clone(),
            range: 1,
        }]
    }
}

/// Keep a remote controller reserved
#[derive(Debug, Clone, PartialEq)]
pub struct Reserve {
    pub controller: Controller,
}

impl Reserve {
    pub fn new(controller: &Controller) -> Self {
        Self {
            controller: controller.clone(),
        }
    }

    pub fn rehydrate(id: &JobId, world: &WorldSnapshot) -> Option<Job> {
        world
            .controller(&id.target)
            .filter(|c| !c.is_mine())
            .map(|c| Job::Reserve(Reserve::new(c)))
    }
}

impl JobContract for Reserve {
    fn id(&self) -> JobId {
        JobId::new(JobKind::Reserve, &self.controller.id)
    }

    fn site(&self) -> &Position {
        &self.controller.pos
    }

    fn base_priority(&self) -> f64 {
        PRIORITY_RESERVE
    }

    fn is_satisfied(&self, workers: &[&Worker]) -> bool {
        !workers.is_empty()
    }

    fn efficiency(&self, worker: &Worker) -> f64 {
        arrival(worker, self.site(), 1, BodyPart::Claim)
    }

    fn completion(&self, worker: Option<&Worker>) -> f64 {
        match worker {
            None => ratio(self.controller.reservation, RESERVATION_GOAL),
            Some(_) => 0.0,
        }
    }

    fn work(&self, _worker: &Worker) -> Vec<Step> {
        vec![Step::Act {
            action: Action::Reserve {
                target: self.controller.id.clone(),
            },
            target: self.controller.pos.clone(),
            range: 1,
        }]
    }
}

/// Bring a room into view
#[derive(Debug, Clone, PartialEq)]
pub struct Scout {
    pub room: String,
    pub visible: bool,
    center: Position,
}

impl Scout {
    pub fn new(room: &str, visible: bool) -> Self {
        Self {
            room: room.to_string(),
            visible,
            center: Position::room_center(room),
        }
    }

    /// Rooms need no live entity; a scout job always rebuilds
    pub fn rehydrate(id: &JobId, world: &WorldSnapshot) -> Option<Job> {
        Some(Job::Scout(Scout::new(&id.target, world.is_visible(&id.target))))
    }
}

impl JobContract for Scout {
    fn id(&self) -> JobId {
        JobId::new(JobKind::Scout, &self.room)
    }

    fn site(&self) -> &Position {
        &self.center
    }

    fn base_priority(&self) -> f64 {
        PRIORITY_SCOUT
    }

    fn is_satisfied(&self, workers: &[&Worker]) -> bool {
        !workers.is_empty()
    }

    fn efficiency(&self, worker: &Worker) -> f64 {
        arrival(worker, self.site(), SCOUT_RANGE, BodyPart::Move)
    }

    fn completion(&self, worker: Option<&Worker>) -> f64 {
        let done = match worker {
            None => self.visible,
            Some(w) => w.pos().room == self.room,
        };
        if done { 1.0 } else { 0.0 }
    }

    fn work(&self, worker: &Worker) -> Vec<Step> {
        if worker.pos().room == self.room {
            return Vec::new();
        }
        vec![Step::Approach {
            target: self.center.clone(),
            range: SCOUT_RANGE,
        }]
    }
}

/// Write the colony's sign on a controller
#[derive(Debug, Clone, PartialEq)]
pub struct Sign {
    pub controller: Controller,
    pub text: String,
}

impl Sign {
    pub fn new(controller: &Controller) -> Self {
        Self {
            controller: controller.clone(),
            text: SIGN_TEXT.to_string(),
        }
    }

    pub fn rehydrate(id: &JobId, world: &WorldSnapshot) -> Option<Job> {
        world.controller(&id.target).map(|c| Job::Sign(Sign::new(c)))
    }

    /// Whether the controller already carries our sign
    pub fn is_signed(controller: &Controller) -> bool {
        controller.sign.as_deref() == Some(SIGN_TEXT)
    }
}

impl JobContract for Sign {
    fn id(&self) -> JobId {
        JobId::new(JobKind::Sign, &self.controller.id)
    }

    fn site(&self) -> &Position {
        &self.controller.pos
    }

    fn base_priority(&self) -> f64 {
        PRIORITY_SIGN
    }

    fn is_satisfied(&self, workers: &[&Worker]) -> bool {
        !workers.is_empty()
    }

    fn efficiency(&self, worker: &Worker) -> f64 {
        arrival(worker, self.site(), 1, BodyPart::Move)
    }

    fn completion(&self, worker: Option<&Worker>) -> f64 {
        match worker {
            None if self.controller.sign.as_deref() == Some(self.text.as_str()) => 1.0,
            _ => 0.0,
        }
    }

    fn work(&self, _worker: &Worker) -> Vec<Step> {
        vec![Step::Act {
            action: Action::Sign {
                target: self.controller.id.clone(),
                text: self.text.clone(),
            },
            target: self.controller.pos.clone(),
            range: 1,
        }]
    }
}
