//! Randomized dungeon generation.
//!
//! Topology (grids, stairs, boss room) is structural and comes from
//! [`Dungeon::with_stairs`]; this module only rolls occupants. The boss is
//! placed in the boss room and nowhere else.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::coord::Position;
use crate::dungeon::Dungeon;
use crate::error::{CoreError, CoreResult};
use crate::item::{Capability, Item, ItemKind};
use crate::room::{Monster, Npc, RoomType};

/// Dungeon dimensions and occupant spawn chances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DungeonConfig {
    /// Grid width and height (at least 2).
    pub size: usize,
    /// Number of levels (at least 1).
    pub num_levels: usize,
    /// Chance that a free room holds a monster.
    pub monster_chance: f64,
    /// Chance that a free room holds loose items.
    pub item_chance: f64,
    /// Chance that a free room holds an NPC.
    pub npc_chance: f64,
    /// Chance that a free room holds a hazard.
    pub hazard_chance: f64,
    /// Chance that any room has an interactable fixture.
    pub feature_chance: f64,
}

impl Default for DungeonConfig {
    fn default() -> Self {
        Self {
            size: 6,
            num_levels: 3,
            monster_chance: 0.25,
            item_chance: 0.15,
            npc_chance: 0.1,
            hazard_chance: 0.1,
            feature_chance: 0.3,
        }
    }
}

impl DungeonConfig {
    /// Set the grid size.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Set the number of levels.
    pub fn with_levels(mut self, num_levels: usize) -> Self {
        self.num_levels = num_levels;
        self
    }

    /// Check dimensions and probabilities.
    pub fn validate(&self) -> CoreResult<()> {
        let chances = [
            ("monster_chance", self.monster_chance),
            ("item_chance", self.item_chance),
            ("npc_chance", self.npc_chance),
            ("hazard_chance", self.hazard_chance),
            ("feature_chance", self.feature_chance),
        ];
        for (name, p) in chances {
            if !(0.0..=1.0).contains(&p) {
                return Err(CoreError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {p}"
                )));
            }
        }
        let occupied = self.monster_chance + self.item_chance + self.npc_chance + self.hazard_chance;
        if occupied > 1.0 {
            return Err(CoreError::InvalidConfig(format!(
                "room spawn chances add up to {occupied}, more than 1"
            )));
        }
        if self.size < 2 {
            return Err(CoreError::InvalidConfig(format!(
                "dungeon size must be at least 2, got {}",
                self.size
            )));
        }
        if self.num_levels == 0 {
            return Err(CoreError::InvalidConfig(
                "dungeon needs at least one level".to_string(),
            ));
        }
        Ok(())
    }
}

struct MonsterTemplate {
    name: &'static str,
    hp: u32,
    attack: u32,
    defense: u32,
}

const MONSTERS: &[MonsterTemplate] = &[
    MonsterTemplate { name: "Shadow Rat", hp: 10, attack: 3, defense: 1 },
    MonsterTemplate { name: "Skeleton Warden", hp: 20, attack: 5, defense: 3 },
    MonsterTemplate { name: "Dark Acolyte", hp: 15, attack: 7, defense: 1 },
    MonsterTemplate { name: "Iron Ooze", hp: 30, attack: 4, defense: 5 },
];

const BOSS: MonsterTemplate = MonsterTemplate {
    name: "Orc Chieftain",
    hp: 60,
    attack: 9,
    defense: 4,
};

const NPCS: &[(&str, &str, &str)] = &[
    ("merchant", "Wandering Merchant", "merchant"),
    ("scholar", "Lost Scholar", "scholar"),
    ("hermit", "Old Hermit", "hermit"),
];

const HAZARDS: &[&str] = &["Spike Trap", "Poison Mist", "Collapsing Floor", "Flooded Pit"];

const FEATURES: &[&str] = &["Chest", "Altar", "Statue", "Bookshelf", "Well", "Lever"];

fn loot_table() -> Vec<Item> {
    vec![
        Item::new("healing_potion", "Healing Potion", ItemKind::Consumable)
            .with_heal(15)
            .with_description("A red draught that knits flesh."),
        Item::new("rope", "Rope", ItemKind::Material),
        Item::new("torch", "Torch", ItemKind::Material),
        Item::new("iron_dagger", "Iron Dagger", ItemKind::Weapon).with_attack(2),
        Item::new("levitation_ring", "Levitation Ring", ItemKind::Ring)
            .with_capability(Capability::Fly),
        Item::new("ethereal_cloak", "Ethereal Cloak", ItemKind::Armor)
            .with_defense(1)
            .with_capability(Capability::PhaseThrough),
        Item::new("warp_stone", "Warp Stone", ItemKind::Ring)
            .with_capability(Capability::Teleport),
    ]
}

/// Map a uniform roll onto the cumulative spawn chances.
fn pick_occupant(config: &DungeonConfig, roll: f64) -> Option<RoomType> {
    let bands = [
        (config.monster_chance, RoomType::Monster),
        (config.item_chance, RoomType::Item),
        (config.npc_chance, RoomType::Npc),
        (config.hazard_chance, RoomType::Hazard),
    ];
    let mut upper = 0.0;
    for (chance, kind) in bands {
        upper += chance;
        if roll < upper {
            return Some(kind);
        }
    }
    None
}

/// Generate a dungeon and populate it from `rng`.
///
/// The same config and RNG state always produce the same dungeon.
pub fn generate<R: Rng + ?Sized>(config: &DungeonConfig, rng: &mut R) -> CoreResult<Dungeon> {
    config.validate()?;
    let mut dungeon = Dungeon::with_stairs(config.size, config.num_levels)?;
    let loot = loot_table();
    let mut npc_serial = 0usize;

    for room in dungeon.rooms_mut() {
        if room.position == Position::origin() {
            continue;
        }

        if room.room_type == RoomType::Boss {
            room.monster = Some(
                Monster::new(BOSS.name, BOSS.hp, BOSS.attack, BOSS.defense).into_boss(),
            );
            continue;
        }

        if room.room_type == RoomType::Empty {
            match pick_occupant(config, rng.random()) {
                Some(RoomType::Monster) => {
                    let t = &MONSTERS[rng.random_range(0..MONSTERS.len())];
                    room.room_type = RoomType::Monster;
                    room.monster = Some(Monster::new(t.name, t.hp, t.attack, t.defense));
                }
                Some(RoomType::Item) => {
                    let count = rng.random_range(1..=2);
                    room.room_type = RoomType::Item;
                    room.items.extend(loot.choose_multiple(rng, count).cloned());
                }
                Some(RoomType::Npc) => {
                    let (prefix, name, role) = NPCS[rng.random_range(0..NPCS.len())];
                    npc_serial += 1;
                    room.room_type = RoomType::Npc;
                    room.npc = Some(Npc {
                        id: format!("{prefix}_{npc_serial}"),
                        name: name.to_string(),
                        role: role.to_string(),
                    });
                }
                Some(RoomType::Hazard) => {
                    room.room_type = RoomType::Hazard;
                    room.hazard = HAZARDS.choose(rng).map(|h| (*h).to_string());
                }
                _ => {}
            }
        }

        if rng.random_bool(config.feature_chance) {
            room.features
                .extend(FEATURES.choose(rng).map(|f| (*f).to_string()));
        }
    }

    tracing::debug!(
        size = config.size,
        levels = config.num_levels,
        monsters = dungeon.rooms().filter(|r| r.monster.is_some()).count(),
        "generated dungeon"
    );

    Ok(dungeon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn default_config_is_valid() {
        assert!(DungeonConfig::default().validate().is_ok());
    }

    #[test]
    fn chances_must_fit() {
        let cfg = DungeonConfig {
            monster_chance: 0.8,
            item_chance: 0.5,
            ..DungeonConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(CoreError::InvalidConfig(_))));

        let cfg = DungeonConfig {
            hazard_chance: -0.1,
            ..DungeonConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn same_seed_same_dungeon() {
        let cfg = DungeonConfig::default();
        let a = generate(&cfg, &mut StdRng::seed_from_u64(7)).unwrap();
        let b = generate(&cfg, &mut StdRng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn boss_only_in_boss_room() {
        for seed in 0..20 {
            let cfg = DungeonConfig::default().with_levels(4).with_size(5);
            let d = generate(&cfg, &mut StdRng::seed_from_u64(seed)).unwrap();
            let bosses: Vec<_> = d
                .rooms()
                .filter(|r| r.monster.as_ref().is_some_and(|m| m.is_boss))
                .collect();
            assert_eq!(bosses.len(), 1);
            assert_eq!(bosses[0].position, d.boss_position());
            assert!(d.validate().is_ok(), "seed {seed} produced an invalid dungeon");
        }
    }

    #[test]
    fn start_room_stays_empty() {
        let cfg = DungeonConfig {
            monster_chance: 1.0,
            item_chance: 0.0,
            npc_chance: 0.0,
            hazard_chance: 0.0,
            ..DungeonConfig::default()
        };
        let d = generate(&cfg, &mut StdRng::seed_from_u64(1)).unwrap();
        let start = d.get_room(Position::origin()).unwrap();
        assert_eq!(start.room_type, RoomType::Empty);
        assert!(start.monster.is_none());
    }

    #[test]
    fn stairs_never_hold_monsters() {
        let cfg = DungeonConfig {
            monster_chance: 1.0,
            item_chance: 0.0,
            npc_chance: 0.0,
            hazard_chance: 0.0,
            ..DungeonConfig::default()
        };
        let d = generate(&cfg, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(d.rooms().filter(|r| r.is_stairs()).all(|r| r.monster.is_none()));
    }
}
