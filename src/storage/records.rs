//! Persisted assignment records.
//!
//! Jobs are referenced only by their encoded id; the live job is rebuilt from
//! the world snapshot every cycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A worker lent to a Boss, working `job_id` for its Boss of origin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubcontractRecord {
    pub job_id: String,
    pub worker_id: String,
}

/// One Boss: its job, direct workers and subcontractors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BossRecord {
    pub job_id: String,

    /// Business owning the job when it is permanent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,

    #[serde(default)]
    pub worker_ids: Vec<String>,

    #[serde(default)]
    pub subcontractors: Vec<SubcontractRecord>,
}

impl BossRecord {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            owner: None,
            worker_ids: Vec::new(),
            subcontractors: Vec::new(),
        }
    }
}

/// All Bosses of one colony, in priority order, as of one cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColonyRecord {
    /// Colony room name
    pub id: String,

    /// World tick of the cycle that wrote this record
    pub tick: u64,

    pub saved_at: DateTime<Utc>,

    #[serde(default)]
    pub bosses: Vec<BossRecord>,
}

impl ColonyRecord {
    pub fn new(id: impl Into<String>, tick: u64, bosses: Vec<BossRecord>) -> Self {
        Self {
            id: id.into(),
            tick,
            saved_at: Utc::now(),
            bosses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boss_record_uses_camel_case() {
        let mut record = BossRecord::new("unload-spawn1");
        record.worker_ids.push("w1".to_string());
        record.subcontractors.push(SubcontractRecord {
            job_id: "pickup-box1".to_string(),
            worker_id: "w2".to_string(),
        });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["jobId"], "unload-spawn1");
        assert_eq!(json["workerIds"][0], "w1");
        assert_eq!(json["subcontractors"][0]["workerId"], "w2");
        assert!(json.get("owner").is_none());
    }

    #[test]
    fn test_boss_record_tolerates_missing_lists() {
        let record: BossRecord = serde_json::from_str(r#"{"jobId": "upgrade-ctrl1"}"#).unwrap();
        assert!(record.worker_ids.is_empty());
        assert!(record.subcontractors.is_empty());
    }

    #[test]
    fn test_colony_record_keeps_order() {
        let colony = ColonyRecord::new(
            "W1N1",
            42,
            vec![BossRecord::new("harvest-src1"), BossRecord::new("upgrade-ctrl1")],
        );
        let line = serde_json::to_string(&colony).unwrap();
        let back: ColonyRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(back.tick, 42);
        assert_eq!(back.bosses[1].job_id, "upgrade-ctrl1");
        assert!(line.contains("savedAt"));
    }
}
