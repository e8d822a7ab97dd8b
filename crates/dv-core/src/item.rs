use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Stable identifier of an item kind, used as the inventory key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    /// Create an identifier from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// What an item is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Held in the weapon slot.
    Weapon,
    /// Worn in the armor slot.
    Armor,
    /// Worn in the ring slot.
    Ring,
    /// Worn in the head slot.
    Head,
    /// Used up when applied (potions, scrolls).
    Consumable,
    /// Opens something.
    Key,
    /// Crafting or ritual component.
    Material,
}

impl ItemKind {
    /// The equipment slot this kind occupies, if it can be equipped at all.
    pub fn slot(self) -> Option<EquipSlot> {
        match self {
            Self::Weapon => Some(EquipSlot::Weapon),
            Self::Armor => Some(EquipSlot::Armor),
            Self::Ring => Some(EquipSlot::Ring),
            Self::Head => Some(EquipSlot::Head),
            Self::Consumable | Self::Key | Self::Material => None,
        }
    }
}

/// An equipment slot on the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipSlot {
    /// Main hand.
    Weapon,
    /// Body.
    Armor,
    /// Finger.
    Ring,
    /// Head.
    Head,
}

impl std::fmt::Display for EquipSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Ring => "ring",
            Self::Head => "head",
        };
        f.write_str(s)
    }
}

/// A capability flag that lifts one physics restriction while the granting
/// item is equipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Instant relocation.
    Teleport,
    /// Flight.
    Fly,
    /// Passing through solid matter.
    PhaseThrough,
    /// Altering the flow of time.
    TimeTravel,
    /// Calling creatures into being.
    Summon,
    /// Raising the dead.
    Resurrect,
    /// Knowing everything.
    Omniscience,
    /// Being unharmable.
    Invincibility,
}

impl Capability {
    /// Every capability, in the order the forbidden-method scan checks them.
    pub const ALL: [Capability; 8] = [
        Self::Teleport,
        Self::Fly,
        Self::PhaseThrough,
        Self::TimeTravel,
        Self::Summon,
        Self::Resurrect,
        Self::Omniscience,
        Self::Invincibility,
    ];

    /// The forbidden-method keyword this capability unlocks.
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Teleport => "teleport",
            Self::Fly => "fly",
            Self::PhaseThrough => "phase_through",
            Self::TimeTravel => "time_travel",
            Self::Summon => "summon",
            Self::Resurrect => "resurrect",
            Self::Omniscience => "omniscience",
            Self::Invincibility => "invincibility",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// An item definition. Inventories store quantities by [`ItemId`]; the
/// definition travels with the item when it is picked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Inventory key.
    pub id: ItemId,
    /// Display name, matched case-insensitively against action targets.
    pub name: String,
    /// Flavour text.
    #[serde(default)]
    pub description: String,
    /// What the item is for.
    pub kind: ItemKind,
    /// Damage bonus while equipped.
    #[serde(default)]
    pub attack: i32,
    /// Damage reduction while equipped.
    #[serde(default)]
    pub defense: i32,
    /// HP restored when used (consumables).
    #[serde(default)]
    pub heal: u32,
    /// Capabilities granted while equipped.
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
}

impl Item {
    /// Create a plain item with no bonuses.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: ItemId::new(id),
            name: name.into(),
            description: String::new(),
            kind,
            attack: 0,
            defense: 0,
            heal: 0,
            capabilities: BTreeSet::new(),
        }
    }

    /// Add a capability granted while this item is equipped.
    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }

    /// Set the HP restored on use.
    pub fn with_heal(mut self, heal: u32) -> Self {
        self.heal = heal;
        self
    }

    /// Set the attack bonus.
    pub fn with_attack(mut self, attack: i32) -> Self {
        self.attack = attack;
        self
    }

    /// Set the defense bonus.
    pub fn with_defense(mut self, defense: i32) -> Self {
        self.defense = defense;
        self
    }

    /// Set the flavour text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns true if the item grants the given capability.
    pub fn grants(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.trim().to_lowercase()
    }
}
