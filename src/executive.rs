//! Executive: one business with its employees.
//!
//! Executives are rebuilt every cycle. Employee membership lives on the
//! workers themselves (their business tag), so nothing here is persisted.

use serde::Serialize;

use crate::business::Business;
use crate::job::Job;
use crate::worker::{Body, BodyPart, Roster, Worker};
use crate::world::WorldSnapshot;

/// A request for the spawner to create a new employee
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpawnRequest {
    pub business: String,
    pub body: Vec<BodyPart>,
}

impl SpawnRequest {
    pub fn cost(&self) -> u32 {
        self.body.iter().map(|p| p.cost()).sum()
    }

    pub fn body_counts(&self) -> Body {
        Body::from_parts(&self.body)
    }
}

pub struct Executive<'a> {
    business: &'a dyn Business,
    employees: Vec<String>,
}

impl<'a> Executive<'a> {
    /// Group a business with the workers tagged as its employees
    pub fn new(business: &'a dyn Business, roster: &Roster) -> Self {
        let employees = roster
            .employees_of(business.id())
            .into_iter()
            .map(|w| w.id().to_string())
            .collect();
        Self { business, employees }
    }

    pub fn id(&self) -> &str {
        self.business.id()
    }

    pub fn employees(&self) -> &[String] {
        &self.employees
    }

    /// Tag a worker as this business's employee
    pub fn assign_employee(&mut self, worker: &mut Worker) {
        if let Some(previous) = &worker.memory.business
            && previous != self.id()
        {
            log::warn!("Moving {} from {} to {}", worker.id(), previous, self.id());
        }
        log::info!("Hired {} into {}", worker.id(), self.id());
        worker.memory.business = Some(self.id().to_string());
        if !self.employees.iter().any(|e| e == worker.id()) {
            self.employees.push(worker.id().to_string());
        }
    }

    pub fn permanent_jobs(&self, world: &WorldSnapshot) -> Vec<Job> {
        self.business.permanent_jobs(world)
    }

    pub fn contract_jobs(&self, world: &WorldSnapshot, roster: &Roster) -> Vec<Job> {
        self.business.contract_jobs(world, &roster.resolve(&self.employees))
    }

    /// A spawn request if the business wants another employee
    pub fn spawn_request(&self, world: &WorldSnapshot, roster: &Roster) -> Option<SpawnRequest> {
        let employees = roster.resolve(&self.employees);
        if !self.business.needs_employee(world, &employees) {
            return None;
        }
        let body = self.business.employee_body(world, &employees);
        if body.is_empty() {
            log::warn!("{} needs an employee but named no body", self.id());
            return None;
        }
        Some(SpawnRequest {
            business: self.id().to_string(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::Mining;
    use crate::job::fixtures::generalist;
    use crate::job::JobContract;
    use crate::world::{Position, RoomSnapshot, Source};

    fn world() -> WorldSnapshot {
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

    fn roster(workers: Vec<Worker>) -> Roster {
        let snapshot = WorldSnapshot {
            workers: workers.iter().map(|w| w.state.clone()).collect(),
            ..world()
        };
        Roster::from_world(&snapshot, workers.into_iter().map(|w| w.memory).collect())
    }

    #[test]
    fn test_employees_from_business_tag() {
        let mut hired = generalist("a", 1, 1, 0);
        hired.memory.business = Some("mining-W1N1".to_string());
        let roster = roster(vec![hired, generalist("b", 1, 1, 0)]);
        let mining = Mining::new("W1N1");

        let executive = Executive::new(&mining, &roster);
        assert_eq!(executive.employees(), &["a".to_string()]);
    }

    #[test]
    fn test_assign_employee_tags_worker() {
        let mut roster = roster(vec![generalist("a", 1, 1, 0)]);
        let mining = Mining::new("W1N1");
        let mut executive = Executive::new(&mining, &roster);

        executive.assign_employee(roster.get_mut("a").unwrap());
        executive.assign_employee(roster.get_mut("a").unwrap());

        assert_eq!(executive.employees().len(), 1);
        assert_eq!(roster.get("a").unwrap().memory.business.as_deref(), Some("mining-W1N1"));
    }

    #[test]
    fn test_spawn_request_when_short_staffed() {
        let roster = roster(vec![]);
        let mining = Mining::new("W1N1");
        let executive = Executive::new(&mining, &roster);

        let request = executive.spawn_request(&world(), &roster).unwrap();
        assert_eq!(request.business, "mining-W1N1");
        assert!(request.body_counts().work > 0);
        assert!(request.cost() > 0);
    }

    #[test]
    fn test_permanent_jobs_from_business() {
        let roster = roster(vec![]);
        let mining = Mining::new("W1N1");
        let executive = Executive::new(&mining, &roster);

        let jobs: Vec<String> = executive.permanent_jobs(&world()).iter().map(|j| j.id().encode()).collect();
        assert_eq!(jobs, vec!["harvest-src1".to_string()]);
    }
}
