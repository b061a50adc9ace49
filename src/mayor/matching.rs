//! Greedy, priority-ordered matching of unemployed workers to Bosses.
//!
//! Bosses are visited in priority order. Each takes its best-rated eligible
//! worker until it is satisfied or runs out of candidates. A Boss below the
//! urgent threshold first checks whether a Boss still to be visited wants the
//! worker more, and passes on it if so. A Boss with no eligible worker tries to
//! subcontract one that fails its prerequisite through a Boss whose job would
//! fix that.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use crate::boss::Boss;
use crate::id::JobId;
use crate::job::{Job, JobContract};
use crate::mayor::policy::SchedulerPolicy;
use crate::worker::{Roster, Worker};

/// Rating of a worker for a job; lower is better.
///
/// `None` excludes the worker: it just finished a job at the same target,
/// which would have it bounce between picking up from and dropping into the
/// same structure.
pub fn rating(job: &Job, worker: &Worker) -> Option<u32> {
    let id = job.id();
    if worker
        .memory
        .last_job
        .as_ref()
        .is_some_and(|last| last.target == id.target)
    {
        return None;
    }
    Some(worker.pos().range_to(job.site()))
}

/// Whether the Boss could take the worker directly right now
pub fn can_take(boss: &Boss, worker: &Worker) -> bool {
    boss.can_employ(worker)
        && boss.job.prerequisite().is_met(&worker.state)
        && boss.job.efficiency(worker) > 0.0
        && rating(&boss.job, worker).is_some()
}

/// Whether the worker is suitable except for the job's prerequisite
fn could_take(boss: &Boss, worker: &Worker) -> bool {
    boss.can_employ(worker)
        && !boss.job.prerequisite().is_met(&worker.state)
        && boss.job.efficiency(worker) > 0.0
        && rating(&boss.job, worker).is_some()
}

/// Candidates ordered best first: rating, then worker id
fn ranked<'a>(boss: &Boss, pool: impl Iterator<Item = &'a Worker>) -> Vec<(u32, &'a Worker)> {
    let mut ranked: Vec<(u32, &Worker)> = pool
        .filter_map(|w| rating(&boss.job, w).map(|r| (r, w)))
        .collect();
    ranked.sort_by(|(ra, a), (rb, b)| ra.cmp(rb).then_with(|| a.id().cmp(b.id())));
    ranked
}

/// Best worker the Boss can take directly
fn best_candidate(boss: &Boss, unemployed: &[String], roster: &Roster, passed: &BTreeSet<String>) -> Option<String> {
    let pool = roster
        .resolve(unemployed)
        .into_iter()
        .filter(|w| !passed.contains(w.id()) && can_take(boss, w));
    ranked(boss, pool).first().map(|(_, w)| w.id().to_string())
}

/// A Boss not yet visited that wants this worker more than `bosses[current]`
pub fn better_boss(bosses: &[Boss], current: usize, worker: &Worker, roster: &Roster) -> Option<usize> {
    let here = &bosses[current];
    let here_priority = here.priority();
    let here_rating = rating(&here.job, worker)?;

    bosses
        .iter()
        .enumerate()
        .skip(current + 1)
        .find(|(_, other)| {
            if !can_take(other, worker) || !other.needs_workers(roster) {
                return false;
            }
            let Some(other_rating) = rating(&other.job, worker) else {
                return false;
            };
            match other.priority().total_cmp(&here_priority) {
                Ordering::Greater => true,
                Ordering::Equal => other_rating < here_rating,
                Ordering::Less => false,
            }
        })
        .map(|(index, _)| index)
}

/// A Boss that can take the worker directly and whose job brings it to meet
/// `bosses[borrower]`'s prerequisite. Closest site first, then job id.
pub fn find_lender(bosses: &[Boss], borrower: usize, worker: &Worker, roster: &Roster) -> Option<usize> {
    let prerequisite = bosses[borrower].job.prerequisite();

    bosses
        .iter()
        .enumerate()
        .filter(|(index, lender)| {
            *index != borrower
                && !lender.has_worker(worker.id())
                && lender.job.fulfills(prerequisite, &worker.state)
                && can_take(lender, worker)
                && !lender.is_saturated(roster)
        })
        .map(|(index, lender)| (worker.pos().range_to(lender.job.site()), lender.job_id(), index))
        .min_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, _, index)| index)
}

/// Outcome of one matching pass
#[derive(Debug, Default)]
pub struct Matching {
    /// (worker, job)
    pub assigned: Vec<(String, JobId)>,
    /// (worker, lender job, borrower job)
    pub subcontracted: Vec<(String, JobId, JobId)>,
    /// Workers nobody took
    pub idle: Vec<String>,
}

/// Match the roster's unemployed workers against `bosses`, which must
/// already be in priority order
pub fn assign(bosses: &mut [Boss], roster: &mut Roster, policy: &SchedulerPolicy) -> Matching {
    let mut unemployed = roster.unemployed();
    let mut matching = Matching::default();

    for current in 0..bosses.len() {
        let urgent = policy.is_urgent(bosses[current].job.priority(None));
        let mut passed = BTreeSet::new();

        while !unemployed.is_empty() && bosses[current].needs_workers(roster) {
            if let Some(worker_id) = best_candidate(&bosses[current], &unemployed, roster, &passed) {
                if !urgent
                    && let Some(worker) = roster.get(&worker_id)
                    && let Some(better) = better_boss(bosses, current, worker, roster)
                {
                    tracing::debug!(
                        worker = %worker_id,
                        job = %bosses[current].job_id(),
                        better = %bosses[better].job_id(),
                        "Passing on worker"
                    );
                    passed.insert(worker_id);
                    continue;
                }

                let assigned = match roster.get_mut(&worker_id) {
                    Some(worker) => bosses[current].assign_worker(worker),
                    None => false,
                };
                if assigned {
                    tracing::debug!(
                        worker = %worker_id,
                        job = %bosses[current].job_id(),
                        priority = bosses[current].priority(),
                        "Assigned"
                    );
                    unemployed.retain(|w| w != &worker_id);
                    matching.assigned.push((worker_id, bosses[current].job_id()));
                } else {
                    passed.insert(worker_id);
                }
                continue;
            }

            if let Some((worker_id, lender)) = subcontract(bosses, current, &unemployed, roster, &passed) {
                let lender_job = bosses[lender].job.clone();
                let Some(worker) = roster.get_mut(&worker_id) else {
                    passed.insert(worker_id);
                    continue;
                };
                if !bosses[lender].assign_worker(worker) {
                    passed.insert(worker_id);
                    continue;
                }
                bosses[current].assign_subcontract(lender_job, worker);
                bosses[lender].lent.push(worker_id.clone());
                tracing::debug!(
                    worker = %worker_id,
                    lender = %bosses[lender].job_id(),
                    borrower = %bosses[current].job_id(),
                    "Subcontracted"
                );
                unemployed.retain(|w| w != &worker_id);
                matching
                    .subcontracted
                    .push((worker_id, bosses[lender].job_id(), bosses[current].job_id()));
                continue;
            }

            tracing::debug!(job = %bosses[current].job_id(), "No eligible worker");
            break;
        }
    }

    matching.idle = unemployed;
    matching
}

/// Best worker failing the Boss's prerequisite that some other Boss can
/// prepare, with that lender
fn subcontract(
    bosses: &[Boss],
    borrower: usize,
    unemployed: &[String],
    roster: &Roster,
    passed: &BTreeSet<String>,
) -> Option<(String, usize)> {
    let boss = &bosses[borrower];
    let pool = roster
        .resolve(unemployed)
        .into_iter()
        .filter(|w| !passed.contains(w.id()) && could_take(boss, w));

    ranked(boss, pool)
        .into_iter()
        .find_map(|(_, worker)| find_lender(bosses, borrower, worker, roster).map(|l| (worker.id().to_string(), l)))
}

/// Sort Bosses by descending priority, ties by job id
pub fn sort_bosses(bosses: &mut [Boss]) {
    bosses.sort_by(|a, b| {
        b.priority()
            .total_cmp(&a.priority())
            .then_with(|| a.job_id().cmp(&b.job_id()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::JobKind;
    use crate::job::fixtures::generalist;
    use crate::job::{Harvest, Pickup, Unload, Upgrade};
    use crate::world::{Controller, Ownership, Position, Source, Store, Structure, StructureKind, WorldSnapshot};

    fn roster_of(workers: Vec<Worker>) -> Roster {
        let world = WorldSnapshot {
            tick: 1,
            rooms: vec![],
            workers: workers.iter().map(|w| w.state.clone()).collect(),
        };
        Roster::from_world(&world, workers.into_iter().map(|w| w.memory).collect())
    }

    fn source(id: &str, x: i32) -> Job {
        Job::Harvest(Harvest::new(&Source {
            id: id.to_string(),
            pos: Position::new("W1N1", x, 10),
            energy: 3000,
            energy_capacity: 3000,
        }))
    }

    fn store(id: &str, kind: StructureKind, x: i32, energy: u32, capacity: u32) -> Structure {
        Structure {
            id: id.to_string(),
            pos: Position::new("W1N1", x, 20),
            kind,
            hits: 1000,
            hits_max: 1000,
            store: Some(Store { energy, capacity }),
            mine: true,
        }
    }

    fn upgrade() -> Job {
        Job::Upgrade(Upgrade::new(&Controller {
            id: "ctrl1".to_string(),
            pos: Position::new("W1N1", 30, 30),
            level: 2,
            owner: Some(Ownership::Mine),
            reservation: 0,
            sign: None,
        }))
    }

    #[test]
    fn test_rating_prefers_closer() {
        let job = source("src1", 10);
        let near = generalist("near", 11, 11, 0);
        let far = generalist("far", 40, 40, 0);
        assert!(rating(&job, &near) < rating(&job, &far));
    }

    #[test]
    fn test_rating_excludes_same_target_as_last_job() {
        let container = store("box1", StructureKind::Container, 20, 1000, 2000);
        let pickup = Job::Pickup(Pickup::new(&container));
        let mut worker = generalist("w", 20, 21, 100);
        worker.memory.last_job = Some(JobId::new(JobKind::Unload, "box1"));
        assert_eq!(rating(&pickup, &worker), None);

        let unload = Job::Unload(Unload::new(&container));
        worker.memory.last_job = Some(JobId::new(JobKind::Pickup, "box1"));
        assert_eq!(rating(&unload, &worker), None);
    }

    #[test]
    fn test_sort_by_priority_then_id() {
        let mut bosses = vec![
            Boss::new(upgrade(), None),
            Boss::new(source("src2", 30), None),
            Boss::new(source("src1", 10), None),
        ];
        sort_bosses(&mut bosses);
        let ids: Vec<String> = bosses.iter().map(|b| b.job_id().encode()).collect();
        assert_eq!(ids, vec!["harvest-src1", "harvest-src2", "upgrade-ctrl1"]);
    }

    #[test]
    fn test_equal_priority_defers_to_closer_boss() {
        let mut roster = roster_of(vec![generalist("w", 40, 11, 0)]);
        let mut bosses = vec![Boss::new(source("src1", 10), None), Boss::new(source("src2", 40), None)];
        sort_bosses(&mut bosses);

        let matching = assign(&mut bosses, &mut roster, &SchedulerPolicy::default());
        assert_eq!(matching.assigned.len(), 1);
        assert_eq!(matching.assigned[0].1.encode(), "harvest-src2");
        assert!(bosses[0].workers.is_empty());
    }

    #[test]
    fn test_urgent_boss_skips_cross_check() {
        let spawn = store("spawn1", StructureKind::Spawn, 10, 0, 300);
        let ext = store("ext1", StructureKind::Extension, 40, 0, 50);
        let bosses = || {
            let mut bosses = vec![
                Boss::new(Job::Unload(Unload::new(&spawn)), None),
                Boss::new(Job::Unload(Unload::new(&ext)), None),
            ];
            sort_bosses(&mut bosses);
            bosses
        };

        // the extension sorts first and is urgent, so it keeps a worker
        // standing next to the spawn
        let mut urgent = bosses();
        assert_eq!(urgent[0].job_id().encode(), "unload-ext1");
        let mut roster = roster_of(vec![generalist("w", 10, 21, 100)]);
        let matching = assign(&mut urgent, &mut roster, &SchedulerPolicy::default());
        assert_eq!(matching.assigned[0].1.encode(), "unload-ext1");

        let policy = SchedulerPolicy {
            urgent_priority: 100.0,
            ..Default::default()
        };
        let mut relaxed = bosses();
        let mut roster = roster_of(vec![generalist("w", 10, 21, 100)]);
        let matching = assign(&mut relaxed, &mut roster, &policy);
        assert_eq!(matching.assigned[0].1.encode(), "unload-spawn1");
    }

    #[test]
    fn test_subcontract_through_pickup() {
        let spawn = store("spawn1", StructureKind::Spawn, 10, 0, 300);
        let container = store("box1", StructureKind::Container, 20, 1000, 2000);
        let mut roster = roster_of(vec![generalist("w", 12, 20, 0)]);
        let mut bosses = vec![
            Boss::new(Job::Unload(Unload::new(&spawn)), None),
            Boss::new(Job::Pickup(Pickup::new(&container)), None),
        ];
        sort_bosses(&mut bosses);

        let matching = assign(&mut bosses, &mut roster, &SchedulerPolicy::default());
        assert!(matching.assigned.is_empty());
        assert_eq!(matching.subcontracted.len(), 1);
        let (worker, lender, borrower) = &matching.subcontracted[0];
        assert_eq!(worker, "w");
        assert_eq!(lender.encode(), "pickup-box1");
        assert_eq!(borrower.encode(), "unload-spawn1");

        assert!(bosses[0].has_subcontractor("w"));
        assert!(bosses[1].has_worker("w"));
        assert_eq!(bosses[1].lent, vec!["w".to_string()]);
        assert_eq!(
            roster.get("w").unwrap().memory.job.as_ref().map(|j| j.encode()),
            Some("pickup-box1".to_string())
        );
    }

    #[test]
    fn test_no_lender_leaves_worker_idle() {
        let spawn = store("spawn1", StructureKind::Spawn, 10, 0, 300);
        let mut roster = roster_of(vec![generalist("w", 12, 20, 0)]);
        let mut bosses = vec![Boss::new(Job::Unload(Unload::new(&spawn)), None)];

        let matching = assign(&mut bosses, &mut roster, &SchedulerPolicy::default());
        assert!(matching.assigned.is_empty());
        assert!(matching.subcontracted.is_empty());
        assert_eq!(matching.idle, vec!["w".to_string()]);
    }

    #[test]
    fn test_each_worker_claimed_once() {
        let mut roster = roster_of((0..6).map(|i| generalist(&format!("w{}", i), 5 + i, 12, 50)).collect());
        let mut bosses = vec![
            Boss::new(source("src1", 10), None),
            Boss::new(source("src2", 30), None),
            Boss::new(upgrade(), None),
        ];
        sort_bosses(&mut bosses);
        let matching = assign(&mut bosses, &mut roster, &SchedulerPolicy::default());

        let mut seen = BTreeSet::new();
        for boss in &bosses {
            for worker in &boss.workers {
                assert!(seen.insert(worker.clone()), "{} claimed twice", worker);
            }
        }
        assert_eq!(seen.len() + matching.idle.len(), 6);
    }
}
