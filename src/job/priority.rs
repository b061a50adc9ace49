//! Base priorities by job kind.
//!
//! Higher = more important = staffed first. Kinds whose priority depends on
//! the target (unload, repair) have one constant per case.

use crate::id::JobKind;
use crate::world::StructureKind;

/// Hostile units in a colony room.
pub const PRIORITY_ATTACK: f64 = 10.0;
/// Refilling spawns and extensions keeps new workers coming.
pub const PRIORITY_UNLOAD_SPAWN: f64 = 8.0;
pub const PRIORITY_UNLOAD_TOWER: f64 = 7.0;
pub const PRIORITY_UNLOAD_DEPOT: f64 = 2.0;
/// A structure below a tenth of its hits.
pub const PRIORITY_REPAIR_CRITICAL: f64 = 9.0;
pub const PRIORITY_CLAIM: f64 = 7.0;
pub const PRIORITY_HARVEST: f64 = 6.0;
pub const PRIORITY_BUILD: f64 = 5.0;
pub const PRIORITY_PICKUP: f64 = 4.0;
pub const PRIORITY_REPAIR: f64 = 3.0;
pub const PRIORITY_RESERVE: f64 = 3.0;
pub const PRIORITY_UPGRADE: f64 = 2.0;
pub const PRIORITY_DISMANTLE: f64 = 2.0;
pub const PRIORITY_RECYCLE: f64 = 1.5;
pub const PRIORITY_SCOUT: f64 = 1.0;
pub const PRIORITY_SIGN: f64 = 1.0;

/// Base priority for a job kind in its default case
pub fn base_priority(kind: JobKind) -> f64 {
    match kind {
        JobKind::Attack => PRIORITY_ATTACK,
        JobKind::Unload => PRIORITY_UNLOAD_DEPOT,
        JobKind::Claim => PRIORITY_CLAIM,
        JobKind::Harvest => PRIORITY_HARVEST,
        JobKind::Build => PRIORITY_BUILD,
        JobKind::Pickup => PRIORITY_PICKUP,
        JobKind::Repair => PRIORITY_REPAIR,
        JobKind::Reserve => PRIORITY_RESERVE,
        JobKind::Upgrade => PRIORITY_UPGRADE,
        JobKind::Dismantle => PRIORITY_DISMANTLE,
        JobKind::Recycle => PRIORITY_RECYCLE,
        JobKind::Scout => PRIORITY_SCOUT,
        JobKind::Sign => PRIORITY_SIGN,
    }
}

/// Unload priority by receiving structure
pub fn unload_priority(kind: StructureKind) -> f64 {
    match kind {
        StructureKind::Spawn | StructureKind::Extension => PRIORITY_UNLOAD_SPAWN,
        StructureKind::Tower => PRIORITY_UNLOAD_TOWER,
        _ => PRIORITY_UNLOAD_DEPOT,
    }
}

/// Repair priority, raised for structures close to destruction
pub fn repair_priority(hits: u32, hits_max: u32) -> f64 {
    if hits_max > 0 && hits.saturating_mul(10) < hits_max {
        PRIORITY_REPAIR_CRITICAL
    } else {
        PRIORITY_REPAIR
    }
}
