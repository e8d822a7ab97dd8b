use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::coord::{Direction, Position};
use crate::error::{CoreError, CoreResult};
use crate::room::{Monster, Room, RoomType};

/// Which way a staircase leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StairDirection {
    /// One level up (`z - 1`).
    Up,
    /// One level deeper (`z + 1`).
    Down,
}

impl std::fmt::Display for StairDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
        }
    }
}

/// The multi-level dungeon. Owns every room, indexed `levels[z][y][x]`.
///
/// Topology is fixed at construction: every level is a `size` × `size`
/// grid, and consecutive levels are joined by exactly one staircase.
/// Level `z` has its stairs-down room at [`Dungeon::stair_position`]`(z)`
/// and level `z + 1` has its stairs-up room at the same coordinate. The
/// stair corner alternates between `(size-1, size-1)` on even levels and
/// `(0, 0)` on odd levels so a middle level never needs one room to be
/// both up and down. On the deepest level that corner is the boss room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dungeon {
    size: usize,
    num_levels: usize,
    levels: Vec<Vec<Vec<Room>>>,
}

impl Dungeon {
    /// Build the bare topology: all rooms empty, stairs and the boss room in
    /// place. Occupants are added by [`crate::generate`].
    pub fn with_stairs(size: usize, num_levels: usize) -> CoreResult<Self> {
        if size < 2 {
            return Err(CoreError::InvalidConfig(format!(
                "dungeon size must be at least 2, got {size}"
            )));
        }
        if num_levels == 0 {
            return Err(CoreError::InvalidConfig(
                "dungeon needs at least one level".to_string(),
            ));
        }

        let levels = (0..num_levels)
            .map(|z| {
                (0..size)
                    .map(|y| {
                        (0..size)
                            .map(|x| Room::new(Position::new(x, y, z), RoomType::Empty))
                            .collect()
                    })
                    .collect()
            })
            .collect();

        let mut dungeon = Self {
            size,
            num_levels,
            levels,
        };

        for z in 0..num_levels {
            let corner = dungeon.stair_position(z);
            let down_type = if z + 1 == num_levels {
                RoomType::Boss
            } else {
                RoomType::StairsDown
            };
            *dungeon.room_at_mut(corner) = Room::new(corner, down_type);
            if z + 1 < num_levels {
                let below = Position::new(corner.x, corner.y, z + 1);
                *dungeon.room_at_mut(below) = Room::new(below, RoomType::StairsUp);
            }
        }

        Ok(dungeon)
    }

    /// Grid width and height.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of levels.
    pub fn num_levels(&self) -> usize {
        self.num_levels
    }

    /// Returns true if `position` addresses a room of this dungeon.
    pub fn contains(&self, position: Position) -> bool {
        position.z < self.num_levels && position.x < self.size && position.y < self.size
    }

    fn check(&self, position: Position) -> CoreResult<()> {
        if self.contains(position) {
            Ok(())
        } else {
            Err(CoreError::OutOfBounds {
                position,
                size: self.size,
                num_levels: self.num_levels,
            })
        }
    }

    // Callers must have bounds-checked `position`.
    fn room_at_mut(&mut self, position: Position) -> &mut Room {
        &mut self.levels[position.z][position.y][position.x]
    }

    /// Get the room at `position`, or an out-of-bounds error.
    pub fn get_room(&self, position: Position) -> CoreResult<&Room> {
        self.check(position)?;
        Ok(&self.levels[position.z][position.y][position.x])
    }

    /// Get the room at `position` mutably, or an out-of-bounds error.
    pub fn get_room_mut(&mut self, position: Position) -> CoreResult<&mut Room> {
        self.check(position)?;
        Ok(self.room_at_mut(position))
    }

    /// The directions whose neighbouring room is inside the grid. Edges do
    /// not wrap around.
    pub fn get_exits(&self, position: Position) -> CoreResult<BTreeSet<Direction>> {
        self.check(position)?;
        Ok(Direction::ALL
            .into_iter()
            .filter(|d| self.neighbor(position, *d).is_some())
            .collect())
    }

    /// The in-bounds neighbour of `position` in `direction`.
    pub fn neighbor(&self, position: Position, direction: Direction) -> Option<Position> {
        position.step(direction).filter(|p| self.contains(*p))
    }

    /// The stair corner of level `z`: the stairs-down room, or the boss
    /// room on the deepest level.
    pub fn stair_position(&self, z: usize) -> Position {
        if z % 2 == 0 {
            Position::new(self.size - 1, self.size - 1, z)
        } else {
            Position::new(0, 0, z)
        }
    }

    /// The stairs-down room of level `z`, or `None` on the deepest level.
    pub fn stairs_down(&self, z: usize) -> Option<Position> {
        (z + 1 < self.num_levels).then(|| self.stair_position(z))
    }

    /// The stairs-up room of level `z`, or `None` on the top level.
    pub fn stairs_up(&self, z: usize) -> Option<Position> {
        if z == 0 || z >= self.num_levels {
            return None;
        }
        let above = self.stair_position(z - 1);
        Some(Position::new(above.x, above.y, z))
    }

    /// The single boss room.
    pub fn boss_position(&self) -> Position {
        self.stair_position(self.num_levels - 1)
    }

    /// The boss, while it lives.
    pub fn boss(&self) -> Option<&Monster> {
        self.get_room(self.boss_position())
            .ok()
            .and_then(|room| room.monster.as_ref())
    }

    /// Iterate over every room, level by level, row by row.
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.levels.iter().flatten().flatten()
    }

    /// Iterate over every room mutably.
    pub fn rooms_mut(&mut self) -> impl Iterator<Item = &mut Room> {
        self.levels.iter_mut().flatten().flatten()
    }

    /// Iterate over the rooms of one level.
    pub fn level(&self, z: usize) -> impl Iterator<Item = &Room> {
        self.levels.get(z).into_iter().flatten().flatten()
    }

    /// Verify the structural invariants: grid shape, room coordinates, the
    /// stair pairing between consecutive levels, a single boss room, and
    /// occupant consistency in every room.
    ///
    /// A freshly generated dungeon always passes; this guards deserialized
    /// state.
    pub fn validate(&self) -> CoreResult<()> {
        let corrupt = |msg: String| -> CoreResult<()> { Err(CoreError::StateCorruption(msg)) };

        if self.size < 2 || self.num_levels == 0 {
            return corrupt(format!(
                "bad dimensions: size {} with {} levels",
                self.size, self.num_levels
            ));
        }
        if self.levels.len() != self.num_levels
            || self
                .levels
                .iter()
                .any(|grid| grid.len() != self.size || grid.iter().any(|row| row.len() != self.size))
        {
            return corrupt("grid shape does not match size and num_levels".to_string());
        }

        for (z, grid) in self.levels.iter().enumerate() {
            for (y, row) in grid.iter().enumerate() {
                for (x, room) in row.iter().enumerate() {
                    let expected = Position::new(x, y, z);
                    if room.position != expected {
                        return corrupt(format!(
                            "room at {expected} claims position {}",
                            room.position
                        ));
                    }
                    if !room.is_consistent() {
                        return corrupt(format!("room {expected} has inconsistent occupants"));
                    }
                }
            }
        }

        let mut boss_rooms = 0;
        for room in self.rooms() {
            let p = room.position;
            let expected = if Some(p) == self.stairs_down(p.z) {
                RoomType::StairsDown
            } else if Some(p) == self.stairs_up(p.z) {
                RoomType::StairsUp
            } else if p == self.boss_position() {
                RoomType::Boss
            } else {
                if matches!(
                    room.room_type,
                    RoomType::StairsDown | RoomType::StairsUp | RoomType::Boss
                ) {
                    return corrupt(format!("unexpected {} room at {p}", room.room_type));
                }
                continue;
            };
            if room.room_type != expected {
                return corrupt(format!(
                    "room {p} should be {expected}, found {}",
                    room.room_type
                ));
            }
            if expected == RoomType::Boss {
                boss_rooms += 1;
            }
        }
        if boss_rooms != 1 {
            return corrupt(format!("expected one boss room, found {boss_rooms}"));
        }

        Ok(())
    }
}
