//! Boss: the live assignment state of one job.
//!
//! A Boss holds its job, the workers assigned to it directly, and
//! subcontractors: workers whose direct assignment is another Boss's job (the
//! one that brings them to meet this job's prerequisite) and who move over
//! once that job is done from their point of view.

use crate::id::JobId;
use crate::job::{Job, JobContract};
use crate::storage::{BossRecord, SubcontractRecord};
use crate::worker::{Roster, Worker};

#[derive(Debug, Clone)]
pub struct Boss {
    pub job: Job,
    /// Business whose permanent job this is; only its employees qualify
    pub owner: Option<String>,
    /// Direct workers, in assignment order
    pub workers: Vec<String>,
    /// (job worked for the Boss of origin, worker) pairs
    pub subcontractors: Vec<(Job, String)>,
    /// Direct workers currently lent out as subcontractors elsewhere
    pub lent: Vec<String>,
}

impl Boss {
    pub fn new(job: Job, owner: Option<String>) -> Self {
        Self {
            job,
            owner,
            workers: Vec::new(),
            subcontractors: Vec::new(),
            lent: Vec::new(),
        }
    }

    pub fn job_id(&self) -> JobId {
        self.job.id()
    }

    /// Direct and subcontracted workers that are still alive
    pub fn staff<'a>(&self, roster: &'a Roster) -> Vec<&'a Worker> {
        let mut staff = roster.resolve(&self.workers);
        staff.extend(
            self.subcontractors
                .iter()
                .filter_map(|(_, id)| roster.get(id))
                .filter(|w| !self.workers.iter().any(|d| d == w.id())),
        );
        staff
    }

    /// Whether the job's need is still open with the current staff
    pub fn needs_workers(&self, roster: &Roster) -> bool {
        !self.job.is_satisfied(&self.staff(roster))
    }

    /// Whether the job is already covered counting workers lent out as well
    pub fn is_saturated(&self, roster: &Roster) -> bool {
        let mut load = self.staff(roster);
        for id in &self.lent {
            if let Some(worker) = roster.get(id)
                && !load.iter().any(|w| w.id() == worker.id())
            {
                load.push(worker);
            }
        }
        self.job.is_satisfied(&load)
    }

    /// Job priority scaled by direct staff, so jobs already in progress keep
    /// their hold on workers
    pub fn priority(&self) -> f64 {
        self.job.priority(None) * self.workers.len().max(1) as f64
    }

    pub fn has_worker(&self, id: &str) -> bool {
        self.workers.iter().any(|w| w == id)
    }

    pub fn has_subcontractor(&self, id: &str) -> bool {
        self.subcontractors.iter().any(|(_, w)| w == id)
    }

    pub fn total_workers(&self) -> usize {
        self.workers.len() + self.subcontractors.len()
    }

    /// Whether a permanent job's owner accepts this worker
    pub fn can_employ(&self, worker: &Worker) -> bool {
        match &self.owner {
            Some(owner) => worker.memory.business.as_deref() == Some(owner.as_str()),
            None => true,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.job.completion(None) >= 1.0
    }

    /// Add a direct worker and tag it with this job. Returns `false` without
    /// changing anything if the worker is already here.
    pub fn assign_worker(&mut self, worker: &mut Worker) -> bool {
        if self.has_worker(worker.id()) {
            log::error!("Worker {} is already assigned to {}", worker.id(), self.job_id());
            return false;
        }
        let job_id = self.job_id();
        log::debug!("Assigning {} to {}", worker.id(), job_id);
        self.workers.push(worker.id().to_string());
        worker.employ(&job_id);
        true
    }

    /// Record `worker` as lent to this Boss while it works `job` directly
    pub fn assign_subcontract(&mut self, job: Job, worker: &Worker) -> bool {
        if self.has_subcontractor(worker.id()) || self.has_worker(worker.id()) {
            log::error!("Worker {} is already working for {}", worker.id(), self.job_id());
            return false;
        }
        log::debug!("Subcontracting {} to {} via {}", worker.id(), self.job_id(), job.id());
        self.subcontractors.push((job, worker.id().to_string()));
        true
    }

    /// Promote subcontractors that are done with their borrowed job.
    ///
    /// Returns `(worker, job of origin)` for each promotion so the caller can
    /// take the worker off its Boss of origin. Pairs whose worker vanished are
    /// dropped.
    pub fn reassign_subcontractors(&mut self, roster: &mut Roster) -> Vec<(String, JobId)> {
        let job_id = self.job_id();
        let mut promoted = Vec::new();
        let mut kept = Vec::new();

        for (job, worker_id) in self.subcontractors.drain(..) {
            let Some(worker) = roster.get_mut(&worker_id) else {
                log::debug!("Subcontractor {} of {} is gone", worker_id, job_id);
                continue;
            };
            if job.completion(Some(&*worker)) >= 1.0 {
                log::debug!("Promoting {} from {} to {}", worker_id, job.id(), job_id);
                worker.employ(&job_id);
                if !self.workers.contains(&worker_id) {
                    self.workers.push(worker_id.clone());
                }
                promoted.push((worker_id, job.id()));
            } else {
                kept.push((job, worker_id));
            }
        }

        self.subcontractors = kept;
        promoted
    }

    /// Take a direct worker off this Boss without touching its memory
    pub fn drop_worker(&mut self, id: &str) -> bool {
        let before = self.workers.len();
        self.workers.retain(|w| w != id);
        self.lent.retain(|w| w != id);
        self.workers.len() != before
    }

    /// Release direct workers that are spent relative to this job
    pub fn release_finished(&mut self, roster: &mut Roster) -> Vec<String> {
        let job_id = self.job_id();
        let finished: Vec<String> = self
            .workers
            .iter()
            .filter(|id| {
                roster
                    .get(id)
                    .is_some_and(|w| self.job.completion(Some(w)) >= 1.0)
            })
            .cloned()
            .collect();

        for id in &finished {
            if let Some(worker) = roster.get_mut(id) {
                worker.release(&job_id);
            }
            self.drop_worker(id);
        }
        finished
    }

    /// Release every direct worker, used when the Boss is retired
    pub fn release_all(&mut self, roster: &mut Roster) -> Vec<String> {
        let job_id = self.job_id();
        let released: Vec<String> = self.workers.drain(..).collect();
        for id in &released {
            if let Some(worker) = roster.get_mut(id)
                && worker.memory.job.as_ref() == Some(&job_id)
            {
                worker.release(&job_id);
            }
        }
        self.lent.clear();
        self.subcontractors.clear();
        released
    }

    pub fn to_record(&self) -> BossRecord {
        BossRecord {
            job_id: self.job_id().encode(),
            owner: self.owner.clone(),
            worker_ids: self.workers.clone(),
            subcontractors: self
                .subcontractors
                .iter()
                .map(|(job, worker)| SubcontractRecord {
                    job_id: job.id().encode(),
                    worker_id: worker.clone(),
                })
                .collect(),
        }
    }
}
