//! The player character: attributes, health, inventory, equipment, and quests.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::coord::Position;
use crate::item::{Capability, EquipSlot, Item, ItemId};
use crate::quest::QuestLog;

/// The five core attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// Raw physical power.
    Strength,
    /// Agility and reflexes.
    Dexterity,
    /// Perception and intuition.
    Wisdom,
    /// Reasoning and learning.
    Intelligence,
    /// Toughness; drives maximum HP.
    Vitality,
}

impl Attribute {
    /// All attributes in canonical order.
    pub const ALL: [Attribute; 5] = [
        Self::Strength,
        Self::Dexterity,
        Self::Wisdom,
        Self::Intelligence,
        Self::Vitality,
    ];

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Dexterity => "dexterity",
            Self::Wisdom => "wisdom",
            Self::Intelligence => "intelligence",
            Self::Vitality => "vitality",
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Attribute scores. 10 is average and carries a modifier of 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Strength score.
    pub strength: u32,
    /// Dexterity score.
    pub dexterity: u32,
    /// Wisdom score.
    pub wisdom: u32,
    /// Intelligence score.
    pub intelligence: u32,
    /// Vitality score.
    pub vitality: u32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            strength: 10,
            dexterity: 10,
            wisdom: 10,
            intelligence: 10,
            vitality: 10,
        }
    }
}

impl Attributes {
    /// Score for one attribute.
    pub fn score(&self, attribute: Attribute) -> u32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Dexterity => self.dexterity,
            Attribute::Wisdom => self.wisdom,
            Attribute::Intelligence => self.intelligence,
            Attribute::Vitality => self.vitality,
        }
    }

    /// Set one attribute's score.
    pub fn set(&mut self, attribute: Attribute, score: u32) {
        let slot = match attribute {
            Attribute::Strength => &mut self.strength,
            Attribute::Dexterity => &mut self.dexterity,
            Attribute::Wisdom => &mut self.wisdom,
            Attribute::Intelligence => &mut self.intelligence,
            Attribute::Vitality => &mut self.vitality,
        };
        *slot = score;
    }

    /// Builder form of [`Attributes::set`].
    pub fn with(mut self, attribute: Attribute, score: u32) -> Self {
        self.set(attribute, score);
        self
    }

    /// Modifier for one attribute: `(score - 10) / 2`, rounded down.
    pub fn modifier(&self, attribute: Attribute) -> i32 {
        let score = i64::from(self.score(attribute));
        // Scores are small; the clamp only guards absurd hand-edited saves.
        (score - 10).div_euclid(2).clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
    }
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Character name.
    pub name: String,
    /// Attribute scores.
    pub attributes: Attributes,
    hp: u32,
    max_hp: u32,
    /// Character level, starting at 1.
    pub level: u32,
    /// XP toward the next level.
    pub xp: u64,
    /// Gold carried.
    pub gold: u64,
    /// Current room.
    pub position: Position,
    inventory: BTreeMap<ItemId, u32>,
    catalogue: BTreeMap<ItemId, Item>,
    equipment: BTreeMap<EquipSlot, Item>,
    /// Active and finished quests.
    pub quests: QuestLog,
}

impl Player {
    /// Base HP before vitality is added.
    pub const BASE_HP: u32 = 10;

    /// Create a level-1 player at the dungeon entrance with full health.
    pub fn new(name: impl Into<String>, attributes: Attributes) -> Self {
        let max_hp = Self::BASE_HP + attributes.vitality * 2;
        Self {
            name: name.into(),
            attributes,
            hp: max_hp,
            max_hp,
            level: 1,
            xp: 0,
            gold: 0,
            position: Position::origin(),
            inventory: BTreeMap::new(),
            catalogue: BTreeMap::new(),
            equipment: BTreeMap::new(),
            quests: QuestLog::new(),
        }
    }

    /// Current hit points.
    pub fn hp(&self) -> u32 {
        self.hp
    }

    /// Maximum hit points.
    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    /// Returns true once HP has reached zero.
    pub fn is_dead(&self) -> bool {
        self.hp == 0
    }

    /// Lose up to `amount` HP. Returns the HP actually lost.
    pub fn damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.hp);
        self.hp -= lost;
        lost
    }

    /// Regain up to `amount` HP, never exceeding the maximum. Returns the HP actually gained.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.max_hp - self.hp);
        self.hp += gained;
        gained
    }

    /// Raise maximum HP and restore to full.
    pub fn raise_max_hp(&mut self, amount: u32) {
        self.max_hp = self.max_hp.saturating_add(amount);
        self.hp = self.max_hp;
    }

    /// XP required to leave the current level.
    pub fn xp_to_next(&self, xp_per_level: u64) -> u64 {
        let level = u64::from(self.level);
        xp_per_level.saturating_mul(level * level)
    }

    /// Add XP and take every level-up it pays for. Returns the number of levels gained.
    pub fn gain_xp(&mut self, amount: u64, xp_per_level: u64, hp_per_level: u32) -> u32 {
        self.xp = self.xp.saturating_add(amount);
        let mut gained = 0;
        // A zero curve would loop forever.
        if xp_per_level == 0 {
            return 0;
        }
        while self.xp >= self.xp_to_next(xp_per_level) {
            self.xp -= self.xp_to_next(xp_per_level);
            self.level += 1;
            self.raise_max_hp(hp_per_level);
            gained += 1;
        }
        gained
    }

    /// Quantity of an item in the pack.
    pub fn item_count(&self, id: &ItemId) -> u32 {
        self.inventory.get(id).copied().unwrap_or(0)
    }

    /// Returns true if at least one of the item is in the pack.
    pub fn has_item(&self, id: &ItemId) -> bool {
        self.item_count(id) > 0
    }

    /// Put `quantity` copies of `item` into the pack.
    pub fn add_item(&mut self, item: Item, quantity: u32) {
        if quantity == 0 {
            return;
        }
        *self.inventory.entry(item.id.clone()).or_insert(0) += quantity;
        self.catalogue.entry(item.id.clone()).or_insert(item);
    }

    /// Take `quantity` copies out of the pack.
    ///
    /// Returns false, leaving the pack untouched, if fewer are carried.
    pub fn remove_item(&mut self, id: &ItemId, quantity: u32) -> bool {
        let held = self.item_count(id);
        if held < quantity {
            return false;
        }
        if held == quantity {
            self.inventory.remove(id);
            if !self.equipment.values().any(|e| &e.id == id) {
                self.catalogue.remove(id);
            }
        } else {
            self.inventory.insert(id.clone(), held - quantity);
        }
        true
    }

    /// Item ids and quantities in the pack.
    pub fn inventory(&self) -> impl Iterator<Item = (&ItemId, u32)> {
        self.inventory.iter().map(|(id, qty)| (id, *qty))
    }

    /// Full item record for a carried or equipped item.
    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.catalogue.get(id)
    }

    /// Find a carried item by display name or id.
    pub fn find_item(&self, name: &str) -> Option<&Item> {
        let wanted = name.trim();
        self.inventory
            .keys()
            .filter_map(|id| self.catalogue.get(id))
            .find(|item| item.is_named(wanted) || item.id.as_str().eq_ignore_ascii_case(wanted))
    }

    /// Move an item from the pack into its equipment slot.
    ///
    /// Whatever occupied the slot returns to the pack. Returns the slot used,
    /// or `None` if the item is not carried or cannot be equipped.
    pub fn equip(&mut self, id: &ItemId) -> Option<EquipSlot> {
        let item = self.catalogue.get(id)?.clone();
        let slot = item.kind.slot()?;
        if !self.remove_item(id, 1) {
            return None;
        }
        self.catalogue.insert(id.clone(), item.clone());
        if let Some(previous) = self.equipment.insert(slot, item) {
            self.add_item(previous, 1);
        }
        Some(slot)
    }

    /// Move an equipped item back into the pack.
    pub fn unequip(&mut self, slot: EquipSlot) -> Option<&Item> {
        let item = self.equipment.remove(&slot)?;
        let id = item.id.clone();
        self.add_item(item, 1);
        self.catalogue.get(&id)
    }

    /// Equipped items by slot.
    pub fn equipment(&self) -> impl Iterator<Item = (EquipSlot, &Item)> {
        self.equipment.iter().map(|(slot, item)| (*slot, item))
    }

    /// Returns true if an equipped item grants `capability`.
    ///
    /// Carried but unequipped items never count.
    pub fn has_capability(&self, capability: Capability) -> bool {
        self.equipment.values().any(|item| item.grants(capability))
    }

    /// Every capability granted by equipped items.
    pub fn capabilities(&self) -> BTreeSet<Capability> {
        self.equipment
            .values()
            .flat_map(|item| item.capabilities.iter().copied())
            .collect()
    }

    /// Sum of equipped attack bonuses.
    pub fn attack_bonus(&self) -> i32 {
        self.equipment.values().map(|item| item.attack).sum()
    }

    /// Sum of equipped defense bonuses.
    pub fn defense_bonus(&self) -> i32 {
        self.equipment.values().map(|item| item.defense).sum()
    }

    /// Check the numeric invariants a loaded save must satisfy.
    pub fn is_consistent(&self) -> bool {
        self.hp <= self.max_hp
            && self.level >= 1
            && self.inventory.values().all(|qty| *qty > 0)
            && self.inventory.keys().all(|id| self.catalogue.contains_key(id))
            && self.equipment.iter().all(|(slot, item)| item.kind.slot() == Some(*slot))
    }
}
