//! The Mayor: one colony's scheduling cycle.
//!
//! Each call to [`Mayor::run_cycle`] takes a fresh world snapshot and:
//!
//! 1. Loads the persisted Bosses and worker memories, dropping anything that
//!    no longer resolves
//! 2. Onboards newly spawned workers into their business
//! 3. Collects permanent and contract jobs and creates Bosses for new ones
//! 4. Promotes finished subcontractors and releases spent workers
//! 5. Matches unemployed workers to Bosses in priority order
//! 6. Retires vacant and completed Bosses
//! 7. Runs every employed worker's job through the action sink
//! 8. Persists Bosses and memories, once, at the end

mod matching;
mod policy;
mod report;

use std::collections::BTreeSet;

use crate::boss::Boss;
use crate::business::Business;
use crate::error::{MayorError, Result};
use crate::executive::Executive;
use crate::id::JobId;
use crate::job::{self, Job, JobContract, Step};
use crate::movement;
use crate::storage::{AssignmentStore, BossRecord};
use crate::worker::Roster;
use crate::world::WorldSnapshot;
use crate::world::action::{Action, ActionSink, Disposition};

pub use matching::{better_boss, can_take, find_lender, rating, sort_bosses};
pub use policy::{SchedulerPolicy, URGENT_PRIORITY};
pub use report::{ActionRecord, Assignment, BossSummary, CycleReport, Subcontract};

/// Scheduler for one colony
#[derive(Debug, Clone)]
pub struct Mayor {
    colony: String,
    policy: SchedulerPolicy,
}

impl Mayor {
    pub fn new(colony: impl Into<String>, policy: SchedulerPolicy) -> Self {
        Self {
            colony: colony.into(),
            policy,
        }
    }

    pub fn colony(&self) -> &str {
        &self.colony
    }

    pub fn policy(&self) -> &SchedulerPolicy {
        &self.policy
    }

    /// Run one full scheduling cycle.
    ///
    /// Only storage failures and a colony missing from the snapshot are
    /// errors; everything else is logged and recovered within the cycle.
    pub fn run_cycle<S: AssignmentStore + ?Sized>(
        &self,
        world: &WorldSnapshot,
        businesses: &[Box<dyn Business>],
        store: &mut S,
        sink: &mut dyn ActionSink,
    ) -> Result<CycleReport> {
        if world.room(&self.colony).is_none() {
            return Err(MayorError::UnknownColony(self.colony.clone()));
        }

        let mut report = CycleReport::new(&self.colony, world.tick);
        let records = store.load_colony(&self.colony)?;
        let mut roster = Roster::from_world(world, store.load_workers()?);
        log::debug!(
            "Cycle {} for {}: {} persisted bosses, {} workers",
            world.tick,
            self.colony,
            records.len(),
            roster.len()
        );

        let mut bosses = self.load_bosses(world, &records, &mut roster, &mut report);
        sync_employment(&bosses, &mut roster);

        let mut executives: Vec<Executive> = businesses
            .iter()
            .map(|b| Executive::new(b.as_ref(), &roster))
            .collect();
        onboard(&mut executives, &mut roster);

        merge_jobs(&mut bosses, collect_jobs(&executives, world, &roster));

        self.promote(&mut bosses, &mut roster, &mut report);
        for boss in bosses.iter_mut() {
            let job_id = boss.job_id().encode();
            for worker in boss.release_finished(&mut roster) {
                log::debug!("Released {} from {}", worker, job_id);
                report.released.push(Assignment::new(worker, job_id.clone()));
            }
        }
        report.stale += rebuild_lent(&mut bosses);

        matching::sort_bosses(&mut bosses);
        let matched = matching::assign(&mut bosses, &mut roster, &self.policy);
        report.assigned = matched
            .assigned
            .into_iter()
            .map(|(worker, job)| Assignment::new(worker, job.encode()))
            .collect();
        report.subcontracted = matched
            .subcontracted
            .into_iter()
            .map(|(worker, lender, borrower)| Subcontract {
                worker,
                lender: lender.encode(),
                borrower: borrower.encode(),
            })
            .collect();
        report.idle = matched.idle;

        self.retire(&mut bosses, &mut roster, &mut report);
        self.execute(&bosses, &mut roster, sink, &mut report);

        let records: Vec<BossRecord> = bosses.iter().map(Boss::to_record).collect();
        store.save_cycle(&self.colony, world.tick, &records, &roster.memories())?;

        report.spawn_requests = executives
            .iter()
            .filter_map(|e| e.spawn_request(world, &roster))
            .collect();
        report.bosses = bosses
            .iter()
            .map(|b| BossSummary {
                job: b.job_id().encode(),
                owner: b.owner.clone(),
                priority: b.priority(),
                workers: b.workers.clone(),
                subcontractors: b.subcontractors.iter().map(|(_, w)| w.clone()).collect(),
            })
            .collect();

        log::info!("{}", report.summary());
        Ok(report)
    }

    /// Rebuild Bosses from their records. Records whose job no longer
    /// resolves are dropped and their workers released.
    fn load_bosses(
        &self,
        world: &WorldSnapshot,
        records: &[BossRecord],
        roster: &mut Roster,
        report: &mut CycleReport,
    ) -> Vec<Boss> {
        let mut bosses: Vec<Boss> = Vec::new();
        let mut direct = BTreeSet::new();
        let mut lent = BTreeSet::new();

        for record in records {
            let job_id = match JobId::parse(&record.job_id) {
                Ok(id) => id,
                Err(e) => {
                    log::warn!("Skipping boss record in {}: {}", self.colony, e);
                    report.stale += 1;
                    continue;
                }
            };
            if bosses.iter().any(|b| b.job_id() == job_id) {
                log::warn!("Duplicate boss record for {} in {}", job_id, self.colony);
                report.stale += 1;
                continue;
            }
            let Some(job) = job::rehydrate(&job_id, world) else {
                log::debug!("Dropping boss for {}: target is gone", job_id);
                report.stale += 1;
                for worker_id in &record.worker_ids {
                    if let Some(worker) = roster.get_mut(worker_id)
                        && worker.memory.job.as_ref() == Some(&job_id)
                    {
                        worker.release(&job_id);
                        report.released.push(Assignment::new(worker_id.clone(), job_id.encode()));
                    }
                }
                continue;
            };

            let mut boss = Boss::new(job, record.owner.clone());
            for worker_id in &record.worker_ids {
                if !roster.contains(worker_id) {
                    log::debug!("Worker {} of {} is gone", worker_id, job_id);
                } else if !direct.insert(worker_id.clone()) {
                    log::warn!("Worker {} persisted under two bosses; keeping the first", worker_id);
                } else {
                    boss.workers.push(worker_id.clone());
                }
            }

            for sub in &record.subcontractors {
                let job = JobId::parse(&sub.job_id)
                    .ok()
                    .and_then(|id| job::rehydrate(&id, world));
                match job {
                    Some(job) if roster.contains(&sub.worker_id) && lent.insert(sub.worker_id.clone()) => {
                        boss.subcontractors.push((job, sub.worker_id.clone()));
                    }
                    _ => {
                        log::debug!("Dropping subcontract of {} via {} on {}", sub.worker_id, sub.job_id, job_id);
                        report.stale += 1;
                    }
                }
            }

            bosses.push(boss);
        }

        bosses
    }

    /// Move subcontractors whose borrowed job is done onto their borrower
    fn promote(&self, bosses: &mut [Boss], roster: &mut Roster, report: &mut CycleReport) {
        for index in 0..bosses.len() {
            let promoted = bosses[index].reassign_subcontractors(roster);
            if promoted.is_empty() {
                continue;
            }
            let job_id = bosses[index].job_id();
            for (worker, origin) in promoted {
                for other in bosses.iter_mut().filter(|b| b.job_id() != job_id) {
                    other.drop_worker(&worker);
                }
                log::debug!("{} done with {}, now working {}", worker, origin, job_id);
                report.promoted.push(Assignment::new(worker, job_id.encode()));
            }
        }
    }

    /// Drop Bosses with no workers or whose job is complete
    fn retire(&self, bosses: &mut Vec<Boss>, roster: &mut Roster, report: &mut CycleReport) {
        let mut kept = Vec::with_capacity(bosses.len());
        for mut boss in bosses.drain(..) {
            if boss.total_workers() > 0 && !boss.is_complete() {
                kept.push(boss);
                continue;
            }
            let job_id = boss.job_id().encode();
            log::debug!("Retiring {}", job_id);
            for worker in boss.release_all(roster) {
                if !report.idle.contains(&worker) {
                    report.idle.push(worker.clone());
                }
                report.released.push(Assignment::new(worker, job_id.clone()));
            }
            report.retired.push(job_id);
        }
        *bosses = kept;
    }

    /// Run each employed worker's job once: direct workers in Boss order,
    /// then subcontractors not already covered
    fn execute(&self, bosses: &[Boss], roster: &mut Roster, sink: &mut dyn ActionSink, report: &mut CycleReport) {
        let mut executed = BTreeSet::new();

        for boss in bosses {
            for worker in &boss.workers {
                if executed.insert(worker.clone()) {
                    self.work(&boss.job, worker, roster, sink, report);
                }
            }
        }

        for boss in bosses {
            for (job, worker) in &boss.subcontractors {
                let employed = roster
                    .get(worker)
                    .is_some_and(|w| w.memory.job.as_ref() == Some(&job.id()));
                if employed && executed.insert(worker.clone()) {
                    self.work(job, worker, roster, sink, report);
                }
            }
        }
    }

    fn work(&self, job: &Job, worker_id: &str, roster: &mut Roster, sink: &mut dyn ActionSink, report: &mut CycleReport) {
        let Some(worker) = roster.get_mut(worker_id) else {
            return;
        };

        for step in job.work(worker) {
            match step {
                Step::Act { action, target, range } => {
                    let result = sink.perform(worker_id, &action);
                    report.actions.push(ActionRecord {
                        worker: worker_id.to_string(),
                        action: action.clone(),
                        result,
                    });
                    match result.disposition() {
                        Disposition::Done => {}
                        Disposition::Approach => {
                            let request = movement::approach(
                                worker_id,
                                &mut worker.memory.movement,
                                &worker.state.pos,
                                &target,
                                range,
                                &self.policy.movement,
                            );
                            self.perform_move(worker_id, request, sink, report);
                        }
                        Disposition::Retry => {
                            log::debug!("{} got {} on {}, retrying next cycle", worker_id, result, action.name());
                        }
                        Disposition::Informational => {
                            log::info!("{} got {} on {} for {}", worker_id, result, action.name(), job.id());
                        }
                    }
                }
                Step::Approach { target, range } => {
                    let request = movement::approach(
                        worker_id,
                        &mut worker.memory.movement,
                        &worker.state.pos,
                        &target,
                        range,
                        &self.policy.movement,
                    );
                    self.perform_move(worker_id, request, sink, report);
                }
            }
        }
    }

    fn perform_move(
        &self,
        worker_id: &str,
        request: movement::MoveRequest,
        sink: &mut dyn ActionSink,
        report: &mut CycleReport,
    ) {
        let action = Action::Move(request);
        let result = sink.perform(worker_id, &action);
        if result.disposition() != Disposition::Done {
            log::debug!("{} could not move: {}", worker_id, result);
        }
        report.actions.push(ActionRecord {
            worker: worker_id.to_string(),
            action,
            result,
        });
    }
}

/// Point every worker's job tag at the Boss holding it directly
fn sync_employment(bosses: &[Boss], roster: &mut Roster) {
    for worker in roster.iter_mut() {
        let holder = bosses.iter().find(|b| b.has_worker(worker.id())).map(Boss::job_id);
        match holder {
            Some(job_id) if worker.memory.job.as_ref() != Some(&job_id) => worker.employ(&job_id),
            Some(_) => {}
            None => {
                if let Some(stale) = worker.memory.job.take() {
                    log::debug!("{} was tagged with {} but no boss holds it", worker.id(), stale);
                }
            }
        }
    }
}

/// Hand freshly spawned workers to the business they were spawned for
fn onboard(executives: &mut [Executive], roster: &mut Roster) {
    let newcomers: Vec<(String, String)> = roster
        .iter()
        .filter(|w| w.memory.business.is_none())
        .filter_map(|w| w.state.business.clone().map(|b| (w.id().to_string(), b)))
        .collect();

    for (worker_id, business) in newcomers {
        let Some(executive) = executives.iter_mut().find(|e| e.id() == business) else {
            log::warn!("{} was spawned for unknown business {}", worker_id, business);
            continue;
        };
        if let Some(worker) = roster.get_mut(&worker_id) {
            executive.assign_employee(worker);
        }
    }
}

/// Permanent jobs of every business, then contract jobs, first occurrence
/// of each job id wins
fn collect_jobs(executives: &[Executive], world: &WorldSnapshot, roster: &Roster) -> Vec<(Job, Option<String>)> {
    let mut seen = BTreeSet::new();
    let mut jobs = Vec::new();

    for executive in executives {
        for job in executive.permanent_jobs(world) {
            if seen.insert(job.id()) {
                jobs.push((job, Some(executive.id().to_string())));
            }
        }
    }
    for executive in executives {
        for job in executive.contract_jobs(world, roster) {
            if seen.insert(job.id()) {
                jobs.push((job, None));
            }
        }
    }

    jobs
}

/// Refresh existing Bosses with this cycle's jobs and create the rest
fn merge_jobs(bosses: &mut Vec<Boss>, jobs: Vec<(Job, Option<String>)>) {
    for (job, owner) in jobs {
        let job_id = job.id();
        match bosses.iter_mut().find(|b| b.job_id() == job_id) {
            Some(boss) => {
                boss.job = job;
                boss.owner = owner;
            }
            None => {
                log::debug!("New boss for {}", job_id);
                bosses.push(Boss::new(job, owner));
            }
        }
    }
}

/// Recompute which direct workers each Boss has lent out. Subcontracts whose
/// worker is no longer working the lender's job are dropped; returns how
/// many.
fn rebuild_lent(bosses: &mut [Boss]) -> usize {
    let holders: Vec<(JobId, Vec<String>)> = bosses.iter().map(|b| (b.job_id(), b.workers.clone())).collect();
    let holds = |job: &JobId, worker: &str| {
        holders
            .iter()
            .any(|(id, workers)| id == job && workers.iter().any(|w| w == worker))
    };

    let mut broken = 0;
    let mut lent: Vec<(JobId, String)> = Vec::new();
    for boss in bosses.iter_mut() {
        let before = boss.subcontractors.len();
        boss.subcontractors.retain(|(job, worker)| holds(&job.id(), worker));
        broken += before - boss.subcontractors.len();
        lent.extend(boss.subcontractors.iter().map(|(job, worker)| (job.id(), worker.clone())));
    }

    for boss in bosses.iter_mut() {
        let job_id = boss.job_id();
        boss.lent = lent
            .iter()
            .filter(|(lender, _)| *lender == job_id)
            .map(|(_, worker)| worker.clone())
            .collect();
    }

    if broken > 0 {
        log::debug!("Dropped {} broken subcontracts", broken);
    }
    broken
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::business::Mining;
    use crate::job::fixtures::generalist;
    use crate::job::{Harvest, Pickup, Unload};
    use crate::storage::{MemoryStore, SubcontractRecord};
    use crate::world::action::{RecordingSink, ResultCode};
    use crate::world::{Position, RoomSnapshot, Source, Store, Structure, StructureKind};

    fn source() -> Source {
        Source {
            id: "src1".to_string(),
            pos: Position::new("W1N1", 10, 10),
            energy: 3000,
            energy_capacity: 3000,
        }
    }

    fn structure(id: &str, kind: StructureKind, x: i32, energy: u32, capacity: u32) -> Structure {
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

    fn world(workers: &[(&str, i32, i32, u32)]) -> WorldSnapshot {
        WorldSnapshot {
            tick: 100,
            rooms: vec![RoomSnapshot {
                name: "W1N1".to_string(),
                sources: vec![source()],
                structures: vec![
                    structure("spawn1", StructureKind::Spawn, 10, 0, 300),
                    structure("box1", StructureKind::Container, 20, 1000, 2000),
                ],
                ..Default::default()
            }],
            workers: workers
                .iter()
                .map(|(id, x, y, carried)| generalist(id, *x, *y, *carried).state)
                .collect(),
        }
    }

    fn mayor() -> Mayor {
        Mayor::new("W1N1", SchedulerPolicy::default())
    }

    #[test]
    fn test_unknown_colony_is_an_error() {
        let mut store = MemoryStore::new();
        let result = Mayor::new("W9N9", SchedulerPolicy::default()).run_cycle(
            &world(&[]),
            &[],
            &mut store,
            &mut RecordingSink::new(),
        );
        assert!(matches!(result, Err(MayorError::UnknownColony(room)) if room == "W9N9"));
    }

    #[test]
    fn test_stale_records_are_dropped() {
        let mut store = MemoryStore::new();
        let mut gone = BossRecord::new("harvest-src9");
        gone.worker_ids.push("w1".to_string());
        store
            .save_colony("W1N1", 99, &[BossRecord::new("nonsense"), gone])
            .unwrap();
        let mut memory = crate::worker::WorkerMemory::new("w1");
        memory.job = Some(JobId::parse("harvest-src9").unwrap());
        store.save_workers(&[memory]).unwrap();

        let report = mayor()
            .run_cycle(&world(&[("w1", 11, 11, 0)]), &[], &mut store, &mut RecordingSink::new())
            .unwrap();

        assert_eq!(report.stale, 2);
        assert_eq!(report.released, vec![Assignment::new("w1", "harvest-src9")]);
        assert!(store.load_colony("W1N1").unwrap().is_empty());
        let memories = store.load_workers().unwrap();
        assert_eq!(memories[0].job, None);
        assert_eq!(memories[0].last_job, Some(JobId::parse("harvest-src9").unwrap()));
    }

    #[test]
    fn test_permanent_job_only_takes_employees() {
        let businesses: Vec<Box<dyn Business>> = vec![Box::new(Mining::new("W1N1"))];
        let mut store = MemoryStore::new();
        let report = mayor()
            .run_cycle(&world(&[("w1", 11, 11, 0)]), &businesses, &mut store, &mut RecordingSink::new())
            .unwrap();
        assert_eq!(report.assignment_of("w1"), Some("pickup-box1"));

        let mut hired = world(&[("w2", 11, 11, 0)]);
        hired.workers[0].business = Some("mining-W1N1".to_string());
        let mut store = MemoryStore::new();
        let report = mayor()
            .run_cycle(&hired, &businesses, &mut store, &mut RecordingSink::new())
            .unwrap();
        assert_eq!(report.assignment_of("w2"), Some("harvest-src1"));
        assert_eq!(
            store.load_workers().unwrap()[0].business.as_deref(),
            Some("mining-W1N1")
        );
    }

    #[test]
    fn test_not_in_range_moves_worker() {
        let businesses: Vec<Box<dyn Business>> = vec![Box::new(Mining::new("W1N1"))];
        let mut hired = world(&[("w1", 30, 30, 0)]);
        hired.workers[0].business = Some("mining-W1N1".to_string());
        let mut store = MemoryStore::new();
        let mut sink = RecordingSink::new().respond("w1", "harvest", ResultCode::NotInRange);

        mayor().run_cycle(&hired, &businesses, &mut store, &mut sink).unwrap();

        let actions = sink.actions_of("w1");
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].name(), "harvest");
        match actions[1] {
            Action::Move(request) => {
                assert_eq!(request.target, source().pos);
                assert_eq!(request.range, 1);
                assert!(request.ignore_creeps);
            }
            other => panic!("expected a move, got {:?}", other),
        }
        let memory = &store.load_workers().unwrap()[0];
        assert_eq!(memory.movement.last_pos, Some(Position::new("W1N1", 30, 30)));
    }

    #[test]
    fn test_rebuild_lent_drops_broken_pairs() {
        let spawn = structure("spawn1", StructureKind::Spawn, 10, 0, 300);
        let container = structure("box1", StructureKind::Container, 20, 1000, 2000);
        let pickup = Job::Pickup(Pickup::new(&container));

        let mut lender = Boss::new(pickup.clone(), None);
        lender.workers.push("w1".to_string());
        let mut borrower = Boss::new(Job::Unload(Unload::new(&spawn)), None);
        borrower.subcontractors.push((pickup.clone(), "w1".to_string()));
        borrower.subcontractors.push((pickup, "w2".to_string()));
        let mut bosses = vec![borrower, lender];

        assert_eq!(rebuild_lent(&mut bosses), 1);
        assert_eq!(bosses[0].subcontractors.len(), 1);
        assert_eq!(bosses[1].lent, vec!["w1".to_string()]);
    }

    #[test]
    fn test_duplicate_workers_keep_first_boss() {
        let mut store = MemoryStore::new();
        let mut first = BossRecord::new("harvest-src1");
        first.worker_ids.push("w1".to_string());
        let mut second = BossRecord::new("pickup-box1");
        second.worker_ids.push("w1".to_string());
        second.subcontractors.push(SubcontractRecord {
            job_id: "pickup-box1".to_string(),
            worker_id: "ghost".to_string(),
        });
        store.save_colony("W1N1", 99, &[first, second]).unwrap();

        let mut roster = Roster::from_world(&world(&[("w1", 11, 11, 0)]), vec![]);
        let mut report = CycleReport::new("W1N1", 100);
        let records = store.load_colony("W1N1").unwrap();
        let bosses = mayor().load_bosses(&world(&[("w1", 11, 11, 0)]), &records, &mut roster, &mut report);

        assert_eq!(bosses.len(), 2);
        assert_eq!(bosses[0].workers, vec!["w1".to_string()]);
        assert!(bosses[1].workers.is_empty());
        assert!(bosses[1].subcontractors.is_empty());
        assert_eq!(report.stale, 1);

        let harvest = Job::Harvest(Harvest::new(&source()));
        assert_eq!(bosses[0].job, harvest);
    }
}
