use super::{Business, TerritorySettings};
use crate::job::{Claim, Job, Reserve, Scout, Sign};
use crate::worker::{BodyPart, Worker};
use crate::world::capability;
use crate::world::{Controller, WorldSnapshot};

/// Expands into remote rooms: claims, reservations and scouting
#[derive(Debug, Clone)]
pub struct Territory {
    id: String,
    colony: String,
    settings: TerritorySettings,
}

impl Territory {
    pub fn new(colony: &str, settings: TerritorySettings) -> Self {
        Self {
            id: format!("territory-{}", colony),
            colony: colony.to_string(),
            settings,
        }
    }

    /// Controller of a room we can currently see
    fn controller<'a>(&self, world: &'a WorldSnapshot, room: &str) -> Option<&'a Controller> {
        world
            .room(room)
            .filter(|r| r.visible)
            .and_then(|r| r.controller.as_ref())
    }

    /// Rooms still needing a claim or reservation
    fn open_targets(&self, world: &WorldSnapshot) -> usize {
        let claims = self
            .settings
            .claim
            .iter()
            .filter(|room| !self.controller(world, room).is_some_and(|c| c.is_mine()));
        claims.count() + self.settings.reserve.len()
    }
}

impl Business for Territory {
    fn id(&self) -> &str {
        &self.id
    }

    fn permanent_jobs(&self, world: &WorldSnapshot) -> Vec<Job> {
        let mut jobs = Vec::new();

        for room in &self.settings.claim {
            match self.controller(world, room) {
                Some(c) if c.is_mine() => {
                    if !Sign::is_signed(c) {
                        jobs.push(Job::Sign(Sign::new(c)));
                    }
                }
                Some(c) => jobs.push(Job::Claim(Claim::new(c))),
                None => jobs.push(Job::Scout(Scout::new(room, false))),
            }
        }

        for room in &self.settings.reserve {
            match self.controller(world, room) {
                Some(c) if !c.is_mine() => jobs.push(Job::Reserve(Reserve::new(c))),
                Some(_) => {}
                None => jobs.push(Job::Scout(Scout::new(room, false))),
            }
        }

        for room in &self.settings.scout {
            if !world.is_visible(room) {
                jobs.push(Job::Scout(Scout::new(room, false)));
            }
        }

        jobs
    }

    fn contract_jobs(&self, _world: &WorldSnapshot, _employees: &[&Worker]) -> Vec<Job> {
        Vec::new()
    }

    fn needs_employee(&self, world: &WorldSnapshot, employees: &[&Worker]) -> bool {
        let claimers = employees
            .iter()
            .filter(|w| capability::active_parts(&w.state, BodyPart::Claim) > 0)
            .count();
        claimers < self.open_targets(world) || (employees.is_empty() && !self.settings.scout.is_empty())
    }

    fn employee_body(&self, world: &WorldSnapshot, _employees: &[&Worker]) -> Vec<BodyPart> {
        if self.open_targets(world) > 0 {
            vec![BodyPart::Claim, BodyPart::Move]
        } else {
            log::trace!("Territory of {} only needs scouts", self.colony);
            vec![BodyPart::Move]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobContract;
    use crate::job::SIGN_TEXT;
    use crate::job::fixtures::worker_at;
    use crate::worker::Body;
    use crate::world::{Ownership, Position, RoomSnapshot};

    fn remote(name: &str, owner: Option<Ownership>, sign: Option<&str>) -> RoomSnapshot {
        RoomSnapshot {
            name: name.to_string(),
            controller: Some(Controller {
                id: format!("ctrl-{}", name),
                pos: Position::new(name, 20, 20),
                level: 0,
                owner,
                reservation: 0,
                sign: sign.map(String::from),
            }),
            ..Default::default()
        }
    }

    fn settings() -> TerritorySettings {
        TerritorySettings {
            claim: vec!["W2N1".to_string(), "W3N1".to_string()],
            reserve: vec!["W1N2".to_string()],
            scout: vec!["W5N5".to_string()],
        }
    }

    fn ids(jobs: &[Job]) -> Vec<String> {
        jobs.iter().map(|j| j.id().encode()).collect()
    }

    #[test]
    fn test_unseen_rooms_get_scouted() {
        let world = WorldSnapshot::default();
        let jobs = Territory::new("W1N1", settings()).permanent_jobs(&world);
        assert_eq!(ids(&jobs), vec!["scout-W2N1", "scout-W3N1", "scout-W1N2", "scout-W5N5"]);
    }

    #[test]
    fn test_visible_rooms_get_claimed_reserved_signed() {
        let world = WorldSnapshot {
            tick: 1,
            rooms: vec![
                remote("W2N1", None, None),
                remote("W3N1", Some(Ownership::Mine), None),
                remote("W1N2", None, None),
                remote("W5N5", None, None),
            ],
            workers: vec![],
        };
        let jobs = Territory::new("W1N1", settings()).permanent_jobs(&world);
        assert_eq!(
            ids(&jobs),
            vec!["claim-ctrl-W2N1", "sign-ctrl-W3N1", "reserve-ctrl-W1N2"]
        );
    }

    #[test]
    fn test_signed_owned_room_needs_nothing() {
        let world = WorldSnapshot {
            tick: 1,
            rooms: vec![remote("W2N1", Some(Ownership::Mine), Some(SIGN_TEXT))],
            workers: vec![],
        };
        let territory = Territory::new(
            "W1N1",
            TerritorySettings {
                claim: vec!["W2N1".to_string()],
                ..Default::default()
            },
        );
        assert!(territory.permanent_jobs(&world).is_empty());
        assert!(!territory.needs_employee(&world, &[]));
    }

    #[test]
    fn test_hires_claimers_per_open_target() {
        let world = WorldSnapshot::default();
        let territory = Territory::new("W1N1", settings());
        let claimer = worker_at(
            "c",
            1,
            1,
            Body {
                claim: 1,
                moves: 1,
                ..Default::default()
            },
            0,
        );
        assert!(territory.needs_employee(&world, &[&claimer]));
        assert_eq!(territory.employee_body(&world, &[]), vec![BodyPart::Claim, BodyPart::Move]);
    }
}
