//! Business policies: what work a colony needs.
//!
//! A business looks at the world snapshot and produces jobs. Permanent jobs
//! belong to the business and are staffed only by its employees; contract
//! jobs are open to any worker. The scheduler treats every method as a pure
//! function of the snapshot.
//!
//! The policies here are rules of thumb. They decide which jobs exist, never
//! who does them.

mod colony;
mod territory;
mod works;

pub use colony::{Cloning, Mining, Upgrading};
pub use territory::Territory;
pub use works::{Architecture, Defense, Upkeep};

use serde::{Deserialize, Serialize};

use crate::job::Job;
use crate::worker::{BodyPart, Worker};
use crate::world::WorldSnapshot;

/// Default goal for wall and rampart repairs.
pub const WALL_GOAL: u32 = 100_000;
/// Default ticks-to-live below which workers are recycled.
pub const RECYCLE_TTL: u32 = 50;

pub trait Business {
    /// Stable id; employees carry it as their business tag
    fn id(&self) -> &str;

    /// Jobs owned by this business
    fn permanent_jobs(&self, world: &WorldSnapshot) -> Vec<Job>;

    /// Transient jobs any qualified worker may take
    fn contract_jobs(&self, world: &WorldSnapshot, employees: &[&Worker]) -> Vec<Job>;

    fn needs_employee(&self, _world: &WorldSnapshot, _employees: &[&Worker]) -> bool {
        false
    }

    /// Body to spawn for a new employee
    fn employee_body(&self, _world: &WorldSnapshot, _employees: &[&Worker]) -> Vec<BodyPart> {
        Vec::new()
    }
}

/// Remote rooms the territory business works
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerritorySettings {
    pub claim: Vec<String>,
    pub reserve: Vec<String>,
    pub scout: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairSettings {
    pub wall_goal: u32,
}

impl Default for RepairSettings {
    fn default() -> Self {
        Self { wall_goal: WALL_GOAL }
    }
}

/// Everything the reference businesses are tuned by
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessSettings {
    pub territory: TerritorySettings,
    pub repair: RepairSettings,
    pub recycle_ttl: u32,
}

impl Default for BusinessSettings {
    fn default() -> Self {
        Self {
            territory: TerritorySettings::default(),
            repair: RepairSettings::default(),
            recycle_ttl: RECYCLE_TTL,
        }
    }
}

/// The reference businesses of one colony
pub fn discover(world: &WorldSnapshot, colony: &str, settings: &BusinessSettings) -> Vec<Box<dyn Business>> {
    let mut businesses: Vec<Box<dyn Business>> = vec![
        Box::new(Defense::new(colony)),
        Box::new(Cloning::new(colony)),
        Box::new(Mining::new(colony)),
        Box::new(Architecture::new(colony, settings.repair.wall_goal)),
        Box::new(Upgrading::new(colony)),
        Box::new(Upkeep::new(colony, settings.recycle_ttl)),
    ];

    let territory = &settings.territory;
    if !(territory.claim.is_empty() && territory.reserve.is_empty() && territory.scout.is_empty()) {
        businesses.push(Box::new(Territory::new(colony, territory.clone())));
    }

    log::debug!(
        "Discovered {} businesses for {} at tick {}",
        businesses.len(),
        colony,
        world.tick
    );
    businesses
}

/// Repeat `pattern` as often as `budget` allows, up to `max_repeats` times,
/// never less than once
pub(crate) fn scaled_body(pattern: &[BodyPart], budget: u32, max_repeats: u32) -> Vec<BodyPart> {
    let unit: u32 = pattern.iter().map(|p| p.cost()).sum();
    let repeats = if unit == 0 { 1 } else { (budget / unit).clamp(1, max_repeats.max(1)) };
    pattern
        .iter()
        .copied()
        .cycle()
        .take(pattern.len() * repeats as usize)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_body_fits_budget() {
        let body = scaled_body(&[BodyPart::Work, BodyPart::Carry, BodyPart::Move], 550, 5);
        assert_eq!(body.len(), 6);
        assert_eq!(body.iter().map(|p| p.cost()).sum::<u32>(), 400);
    }

    #[test]
    fn test_scaled_body_minimum_one_copy() {
        let body = scaled_body(&[BodyPart::Claim, BodyPart::Move], 100, 2);
        assert_eq!(body, vec![BodyPart::Claim, BodyPart::Move]);
    }

    #[test]
    fn test_scaled_body_capped() {
        let body = scaled_body(&[BodyPart::Move], 10_000, 3);
        assert_eq!(body.len(), 3);
    }

    #[test]
    fn test_discover_adds_territory_only_when_configured() {
        let world = WorldSnapshot::default();
        let plain = discover(&world, "W1N1", &BusinessSettings::default());
        assert!(plain.iter().all(|b| !b.id().starts_with("territory")));

        let settings = BusinessSettings {
            territory: TerritorySettings {
                scout: vec!["W2N1".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let with = discover(&world, "W1N1", &settings);
        assert!(with.iter().any(|b| b.id() == "territory-W1N1"));
    }

    #[test]
    fn test_business_ids_unique() {
        let settings = BusinessSettings {
            territory: TerritorySettings {
                claim: vec!["W2N1".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        let businesses = discover(&WorldSnapshot::default(), "W1N1", &settings);
        let mut ids: Vec<&str> = businesses.iter().map(|b| b.id()).collect();
        let count = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }
}
