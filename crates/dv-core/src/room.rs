use serde::{Deserialize, Serialize};

use crate::coord::Position;
use crate::dungeon::StairDirection;
use crate::item::Item;

/// What a room was generated as. The type never changes during a run;
/// only the occupant slots do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomType {
    /// Nothing of note.
    Empty,
    /// Guarded by a regular monster.
    Monster,
    /// Holds loose items.
    Item,
    /// Contains an environmental hazard.
    Hazard,
    /// Occupied by a non-player character.
    Npc,
    /// Leads one level deeper.
    StairsDown,
    /// Leads one level up.
    StairsUp,
    /// The single boss lair on the deepest level.
    Boss,
}

impl RoomType {
    /// The stair direction offered by this room type, if any.
    pub fn stair_direction(self) -> Option<StairDirection> {
        match self {
            Self::StairsDown => Some(StairDirection::Down),
            Self::StairsUp => Some(StairDirection::Up),
            _ => None,
        }
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Empty => "empty",
            Self::Monster => "monster",
            Self::Item => "item",
            Self::Hazard => "hazard",
            Self::Npc => "npc",
            Self::StairsDown => "stairs down",
            Self::StairsUp => "stairs up",
            Self::Boss => "boss",
        };
        f.write_str(s)
    }
}

/// A hostile creature occupying a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    /// Display name, matched case-insensitively against action targets.
    pub name: String,
    /// Current hit points.
    pub hp: u32,
    /// Hit points at full health.
    pub max_hp: u32,
    /// Damage dealt on a hit.
    pub attack: u32,
    /// Damage absorbed per hit.
    pub defense: u32,
    /// Set when a nearby blunder has put the monster on guard.
    #[serde(default)]
    pub alerted: bool,
    /// The boss variant; only ever placed in the boss room.
    #[serde(default)]
    pub is_boss: bool,
}

impl Monster {
    /// Create a regular monster at full health.
    pub fn new(name: impl Into<String>, hp: u32, attack: u32, defense: u32) -> Self {
        Self {
            name: name.into(),
            hp,
            max_hp: hp,
            attack,
            defense,
            alerted: false,
            is_boss: false,
        }
    }

    /// Mark this monster as the boss variant.
    pub fn into_boss(mut self) -> Self {
        self.is_boss = true;
        self
    }

    /// Returns true once hit points reach zero.
    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }
}

/// A non-player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Npc {
    /// Unique within a dungeon.
    pub id: String,
    /// Display name, matched case-insensitively against action targets.
    pub name: String,
    /// Role such as "merchant" or "hostage".
    pub role: String,
}

/// A single room of the dungeon grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Where the room sits.
    pub position: Position,
    /// What the room was generated as.
    #[serde(rename = "type")]
    pub room_type: RoomType,
    /// At most one monster.
    #[serde(default)]
    pub monster: Option<Monster>,
    /// At most one NPC.
    #[serde(default)]
    pub npc: Option<Npc>,
    /// Loose items lying in the room.
    #[serde(default)]
    pub items: Vec<Item>,
    /// At most one environmental hazard.
    #[serde(default)]
    pub hazard: Option<String>,
    /// Set once the hazard has sprung; it never springs twice.
    #[serde(default)]
    pub hazard_triggered: bool,
    /// Named fixtures that can be interacted with (an altar, a chest).
    #[serde(default)]
    pub features: Vec<String>,
    /// Narrative description; empty until generated.
    #[serde(default)]
    pub description: String,
    /// True only for the deepest level's boss room.
    #[serde(default)]
    pub is_boss_room: bool,
    /// Whether the player has entered this room.
    #[serde(default)]
    pub visited: bool,
}

impl Room {
    /// Create an unoccupied room of the given type.
    pub fn new(position: Position, room_type: RoomType) -> Self {
        Self {
            position,
            room_type,
            monster: None,
            npc: None,
            items: Vec::new(),
            hazard: None,
            hazard_triggered: false,
            features: Vec::new(),
            description: String::new(),
            is_boss_room: room_type == RoomType::Boss,
            visited: false,
        }
    }

    /// The hazard waiting to spring on the next entry, if any.
    pub fn armed_hazard(&self) -> Option<&str> {
        self.hazard
            .as_deref()
            .filter(|_| !self.hazard_triggered)
    }

    /// Returns true for stairs in either direction.
    pub fn is_stairs(&self) -> bool {
        self.room_type.stair_direction().is_some()
    }

    /// Names of everything an action can target here: the monster, the NPC,
    /// loose items, the hazard, and fixtures.
    pub fn target_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        if let Some(m) = &self.monster {
            names.push(m.name.as_str());
        }
        if let Some(n) = &self.npc {
            names.push(n.name.as_str());
        }
        names.extend(self.items.iter().map(|i| i.name.as_str()));
        if let Some(h) = &self.hazard {
            names.push(h.as_str());
        }
        names.extend(self.features.iter().map(String::as_str));
        names
    }

    /// Returns true if `target` names something present in the room
    /// (case-insensitive, surrounding whitespace ignored).
    pub fn has_target(&self, target: &str) -> bool {
        let wanted = target.trim().to_lowercase();
        self.target_names()
            .iter()
            .any(|name| name.to_lowercase() == wanted)
    }

    /// Returns true if `target` names the monster in this room.
    pub fn monster_named(&self, target: &str) -> bool {
        self.monster
            .as_ref()
            .is_some_and(|m| m.name.to_lowercase() == target.trim().to_lowercase())
    }

    /// Index of the loose item named `target`, if present.
    pub fn item_index(&self, target: &str) -> Option<usize> {
        self.items.iter().position(|i| i.is_named(target))
    }

    /// Remove and return the loose item named `target`.
    pub fn take_item(&mut self, target: &str) -> Option<Item> {
        let idx = self.item_index(target)?;
        Some(self.items.remove(idx))
    }

    /// Check that the occupant slots agree with the room type.
    ///
    /// Monsters only live in monster or boss rooms, the boss only in the
    /// boss room, NPCs only in NPC rooms, hazards only in hazard rooms, and
    /// loose items only where something could have left them.
    pub fn is_consistent(&self) -> bool {
        let monster_ok = match &self.monster {
            None => true,
            Some(m) if m.is_boss => self.room_type == RoomType::Boss,
            Some(_) => self.room_type == RoomType::Monster,
        };
        let npc_ok = self.npc.is_none() || self.room_type == RoomType::Npc;
        let hazard_ok = self.hazard.is_none() || self.room_type == RoomType::Hazard;
        let items_ok = self.items.is_empty()
            || matches!(
                self.room_type,
                RoomType::Item | RoomType::Monster | RoomType::Boss
            );
        let boss_flag_ok = self.is_boss_room == (self.room_type == RoomType::Boss);
        monster_ok && npc_ok && hazard_ok && items_ok && boss_flag_ok
    }
}
