//! What one scheduling cycle did.

use serde::Serialize;

use crate::executive::SpawnRequest;
use crate::world::action::{Action, ResultCode};

/// A surviving Boss at the end of the cycle
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BossSummary {
    pub job: String,
    pub owner: Option<String>,
    pub priority: f64,
    pub workers: Vec<String>,
    pub subcontractors: Vec<String>,
}

/// A worker and the job it moved onto or off of
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    pub worker: String,
    pub job: String,
}

impl Assignment {
    pub fn new(worker: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            worker: worker.into(),
            job: job.into(),
        }
    }
}

/// A worker lent to `borrower` while it works `lender`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subcontract {
    pub worker: String,
    pub lender: String,
    pub borrower: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRecord {
    pub worker: String,
    pub action: Action,
    pub result: ResultCode,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CycleReport {
    pub colony: String,
    pub tick: u64,
    /// Bosses persisted for the next cycle, in priority order
    pub bosses: Vec<BossSummary>,
    pub assigned: Vec<Assignment>,
    pub subcontracted: Vec<Subcontract>,
    pub promoted: Vec<Assignment>,
    pub released: Vec<Assignment>,
    /// Job ids of Bosses dropped at the end of the cycle
    pub retired: Vec<String>,
    /// Persisted Bosses or subcontracts that no longer resolve
    pub stale: usize,
    /// Workers left without a job
    pub idle: Vec<String>,
    pub spawn_requests: Vec<SpawnRequest>,
    pub actions: Vec<ActionRecord>,
}

impl CycleReport {
    pub fn new(colony: &str, tick: u64) -> Self {
        Self {
            colony: colony.to_string(),
            tick,
            ..Default::default()
        }
    }

    /// Job a worker was directly assigned to this cycle, if any
    pub fn assignment_of(&self, worker: &str) -> Option<&str> {
        self.assigned
            .iter()
            .find(|a| a.worker == worker)
            .map(|a| a.job.as_str())
    }

    /// Boss summary for a job, if it survived the cycle
    pub fn boss(&self, job: &str) -> Option<&BossSummary> {
        self.bosses.iter().find(|b| b.job == job)
    }

    /// One-line summary for the log
    pub fn summary(&self) -> String {
        format!(
            "{} tick {}: {} bosses, {} assigned, {} subcontracted, {} promoted, {} released, {} retired, {} stale, {} idle, {} spawn requests",
            self.colony,
            self.tick,
            self.bosses.len(),
            self.assigned.len(),
            self.subcontracted.len(),
            self.promoted.len(),
            self.released.len(),
            self.retired.len(),
            self.stale,
            self.idle.len(),
            self.spawn_requests.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report_is_empty() {
        let report = CycleReport::new("W1N1", 12);
        assert_eq!(report.tick, 12);
        assert!(report.bosses.is_empty());
        assert_eq!(report.stale, 0);
    }

    #[test]
    fn test_assignment_lookup() {
        let mut report = CycleReport::new("W1N1", 1);
        report.assigned.push(Assignment::new("w1", "harvest-src1"));
        assert_eq!(report.assignment_of("w1"), Some("harvest-src1"));
        assert_eq!(report.assignment_of("w2"), None);
    }

    #[test]
    fn test_summary_mentions_counts() {
        let mut report = CycleReport::new("W1N1", 5);
        report.idle.push("w9".to_string());
        let summary = report.summary();
        assert!(summary.starts_with("W1N1 tick 5"));
        assert!(summary.contains("1 idle"));
    }
}
