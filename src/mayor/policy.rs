use serde::{Deserialize, Serialize};

use crate::business::RECYCLE_TTL;
use crate::movement::MovementPolicy;

/// Job priority at or above which a Boss takes its best worker without
/// checking whether another Boss wants it more.
pub const URGENT_PRIORITY: f64 = 8.0;

/// Tunable constants of the scheduling cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerPolicy {
    pub urgent_priority: f64,
    /// Ticks-to-live below which workers are sent to be recycled
    pub recycle_ttl: u32,
    #[serde(flatten)]
    pub movement: MovementPolicy,
}

impl Default for SchedulerPolicy {
    fn default() -> Self {
        Self {
            urgent_priority: URGENT_PRIORITY,
            recycle_ttl: RECYCLE_TTL,
            movement: MovementPolicy::default(),
        }
    }
}

impl SchedulerPolicy {
    pub fn is_urgent(&self, priority: f64) -> bool {
        priority >= self.urgent_priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::{STALL_THRESHOLD, STUCK_TICKS};

    #[test]
    fn test_defaults() {
        let policy = SchedulerPolicy::default();
        assert_eq!(policy.urgent_priority, 8.0);
        assert_eq!(policy.recycle_ttl, 50);
        assert_eq!(policy.movement.stuck_ticks, STUCK_TICKS);
        assert_eq!(policy.movement.stall_threshold, STALL_THRESHOLD);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let policy: SchedulerPolicy = serde_yaml::from_str("urgent_priority: 9.5\nstuck_ticks: 4\n").unwrap();
        assert_eq!(policy.urgent_priority, 9.5);
        assert_eq!(policy.movement.stuck_ticks, 4);
        assert_eq!(policy.movement.default_reuse_path, 20);
        assert_eq!(policy.recycle_ttl, 50);
    }

    #[test]
    fn test_is_urgent() {
        let policy = SchedulerPolicy::default();
        assert!(policy.is_urgent(8.0));
        assert!(policy.is_urgent(10.0));
        assert!(!policy.is_urgent(7.9));
    }
}
