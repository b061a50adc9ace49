//! Read-only world snapshot
//!
//! The external tick boundary hands the scheduler one consistent snapshot per
//! cycle. Every component that needs world state receives a `&WorldSnapshot`
//! explicitly; nothing in the crate caches entities across cycles.

pub mod action;
pub mod capability;

use serde::{Deserialize, Serialize};

use crate::worker::WorkerState;

/// Range charged for any move that crosses a room boundary.
pub const INTER_ROOM_RANGE: u32 = 50;

/// Width and height of a room in tiles.
pub const ROOM_SIZE: i32 = 50;

/// A tile inside a named room
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub room: String,
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(room: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            room: room.into(),
            x,
            y,
        }
    }

    /// Center tile of a room, used for room-scoped targets
    pub fn room_center(room: impl Into<String>) -> Self {
        Self::new(room, ROOM_SIZE / 2, ROOM_SIZE / 2)
    }

    /// Chebyshev range within a room, flat [`INTER_ROOM_RANGE`] across rooms
    pub fn range_to(&self, other: &Position) -> u32 {
        if self.room != other.room {
            return INTER_ROOM_RANGE;
        }
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.max(dy)
    }

    pub fn in_range_to(&self, other: &Position, range: u32) -> bool {
        self.room == other.room && self.range_to(other) <= range
    }
}

/// An energy source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub pos: Position,
    pub energy: u32,
    pub energy_capacity: u32,
}

/// Energy held by a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Store {
    pub energy: u32,
    pub capacity: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Spawn,
    Extension,
    Tower,
    Container,
    Storage,
    Link,
    Road,
    Wall,
    Rampart,
}

impl StructureKind {
    /// Structures that consume energy delivered to them
    pub fn is_consumer(&self) -> bool {
        matches!(self, StructureKind::Spawn | StructureKind::Extension | StructureKind::Tower)
    }

    /// Structures that hold energy for later pickup
    pub fn is_depot(&self) -> bool {
        matches!(self, StructureKind::Container | StructureKind::Storage | StructureKind::Link)
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub id: String,
    pub pos: Position,
    pub kind: StructureKind,
    pub hits: u32,
    pub hits_max: u32,
    #[serde(default)]
    pub store: Option<Store>,
    /// False for structures owned by someone else
    #[serde(default = "default_true")]
    pub mine: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ownership {
    Mine,
    Foreign,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Controller {
    pub id: String,
    pub pos: Position,
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub owner: Option<Ownership>,
    /// Remaining reservation ticks held by us
    #[serde(default)]
    pub reservation: u32,
    #[serde(default)]
    pub sign: Option<String>,
}

impl Controller {
    pub fn is_mine(&self) -> bool {
        self.owner == Some(Ownership::Mine)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionSite {
    pub id: String,
    pub pos: Position,
    pub progress: u32,
    pub progress_total: u32,
}

/// A hostile mobile unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hostile {
    pub id: String,
    pub pos: Position,
    pub hits: u32,
    pub hits_max: u32,
}

/// Everything observed in one room this tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomSnapshot {
    pub name: String,
    pub visible: bool,
    pub controller: Option<Controller>,
    pub sources: Vec<Source>,
    pub structures: Vec<Structure>,
    pub construction_sites: Vec<ConstructionSite>,
    pub hostiles: Vec<Hostile>,
}

impl Default for RoomSnapshot {
    fn default() -> Self {
        Self {
            name: String::new(),
            visible: true,
            controller: None,
            sources: Vec::new(),
            structures: Vec::new(),
            construction_sites: Vec::new(),
            hostiles: Vec::new(),
        }
    }
}

/// A consistent view of the world for one scheduling cycle
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub rooms: Vec<RoomSnapshot>,
    pub workers: Vec<WorkerState>,
}

impl WorldSnapshot {
    pub fn room(&self, name: &str) -> Option<&RoomSnapshot> {
        self.rooms.iter().find(|r| r.name == name)
    }

    /// Whether a room is currently observed
    pub fn is_visible(&self, name: &str) -> bool {
        self.room(name).map(|r| r.visible).unwrap_or(false)
    }

    pub fn source(&self, id: &str) -> Option<&Source> {
        self.rooms.iter().flat_map(|r| r.sources.iter()).find(|s| s.id == id)
    }

    pub fn structure(&self, id: &str) -> Option<&Structure> {
        self.rooms.iter().flat_map(|r| r.structures.iter()).find(|s| s.id == id)
    }

    pub fn controller(&self, id: &str) -> Option<&Controller> {
        self.rooms
            .iter()
            .filter_map(|r| r.controller.as_ref())
            .find(|c| c.id == id)
    }

    pub fn construction_site(&self, id: &str) -> Option<&ConstructionSite> {
        self.rooms
            .iter()
            .flat_map(|r| r.construction_sites.iter())
            .find(|s| s.id == id)
    }

    pub fn hostile(&self, id: &str) -> Option<&Hostile> {
        self.rooms.iter().flat_map(|r| r.hostiles.iter()).find(|h| h.id == id)
    }

    pub fn worker(&self, id: &str) -> Option<&WorkerState> {
        self.workers.iter().find(|w| w.id == id)
    }

    /// Own spawns in a room
    pub fn spawns_in(&self, room: &str) -> Vec<&Structure> {
        self.room(room)
            .map(|r| {
                r.structures
                    .iter()
                    .filter(|s| s.mine && s.kind == StructureKind::Spawn)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Energy available for spawning in a room (spawns + extensions)
    pub fn spawn_energy(&self, room: &str) -> u32 {
        self.room(room)
            .map(|r| {
                r.structures
                    .iter()
                    .filter(|s| s.mine && matches!(s.kind, StructureKind::Spawn | StructureKind::Extension))
                    .map(capability::stored_energy)
                    .sum()
            })
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with_spawn() -> RoomSnapshot {
        RoomSnapshot {
            name: "W1N1".to_string(),
            visible: true,
            structures: vec![
                Structure {
                    id: "spawn1".to_string(),
                    pos: Position::new("W1N1", 20, 20),
                    kind: StructureKind::Spawn,
                    hits: 5000,
                    hits_max: 5000,
                    store: Some(Store {
                        energy: 200,
                        capacity: 300,
                    }),
                    mine: true,
                },
                Structure {
                    id: "ext1".to_string(),
                    pos: Position::new("W1N1", 21, 20),
                    kind: StructureKind::Extension,
                    hits: 1000,
                    hits_max: 1000,
                    store: Some(Store {
                        energy: 50,
                        capacity: 50,
                    }),
                    mine: true,
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_range_same_room() {
        let a = Position::new("W1N1", 10, 10);
        let b = Position::new("W1N1", 13, 8);
        assert_eq!(a.range_to(&b), 3);
        assert_eq!(b.range_to(&a), 3);
    }

    #[test]
    fn test_range_across_rooms() {
        let a = Position::new("W1N1", 10, 10);
        let b = Position::new("W2N1", 10, 10);
        assert_eq!(a.range_to(&b), INTER_ROOM_RANGE);
        assert!(!a.in_range_to(&b, 100));
    }

    #[test]
    fn test_range_at_coordinate_extremes() {
        let a = Position::new("W1N1", i32::MIN, 0);
        let b = Position::new("W1N1", i32::MAX, 0);
        assert_eq!(a.range_to(&b), u32::MAX);
    }

    #[test]
    fn test_lookup_by_id() {
        let world = WorldSnapshot {
            tick: 1,
            rooms: vec![room_with_spawn()],
            workers: vec![],
        };
        assert!(world.structure("spawn1").is_some());
        assert!(world.structure("missing").is_none());
        assert!(world.source("spawn1").is_none());
    }

    #[test]
    fn test_spawn_energy_sums_spawns_and_extensions() {
        let world = WorldSnapshot {
            tick: 1,
            rooms: vec![room_with_spawn()],
            workers: vec![],
        };
        assert_eq!(world.spawn_energy("W1N1"), 250);
        assert_eq!(world.spawn_energy("W5N5"), 0);
        assert_eq!(world.spawns_in("W1N1").len(), 1);
    }

    #[test]
    fn test_snapshot_deserializes_with_defaults() {
        let json = r#"{"tick": 7, "rooms": [{"name": "W1N1"}]}"#;
        let world: WorldSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(world.tick, 7);
        assert!(world.is_visible("W1N1"));
        assert!(!world.is_visible("W2N2"));
        assert!(world.workers.is_empty());
    }
}
