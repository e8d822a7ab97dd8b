//! Atomic application of an impact recipe.
//!
//! Application happens on a draft: a copy of the player plus copies of only
//! the rooms the recipe touches. Every effect runs against the draft and
//! records what it did. Only when the whole recipe has run is the draft
//! written back, so the live state sees all of the deltas or none of them.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use dv_core::{Dungeon, ItemId, ObjectiveKind, Player, Position, Room};
use serde::{Deserialize, Serialize};

use super::{Effect, ImpactTable, Progression};
use crate::check::Classification;
use crate::intent::ActionIntent;
use crate::validate::RejectionReason;

/// A concrete change that was applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "delta", rename_all = "snake_case")]
pub enum AppliedDelta {
    /// XP gained.
    XpGained {
        /// Amount gained.
        amount: u64,
    },
    /// The player reached a new level.
    LevelUp {
        /// The new level.
        level: u32,
        /// Max HP after the level-up.
        max_hp: u32,
    },
    /// Gold gained.
    GoldGained {
        /// Amount gained.
        amount: u64,
    },
    /// A monster took damage and survived.
    MonsterDamaged {
        /// Monster name.
        name: String,
        /// Damage dealt.
        damage: u32,
        /// HP left.
        remaining_hp: u32,
    },
    /// A monster was slain and removed from its room.
    MonsterDefeated {
        /// Monster name.
        name: String,
        /// Where it fell.
        position: Position,
        /// Whether it was the boss.
        boss: bool,
    },
    /// A loose item moved into the pack.
    ItemAcquired {
        /// Item id.
        id: ItemId,
        /// Item name.
        name: String,
    },
    /// HP restored.
    HpRestored {
        /// HP gained.
        amount: u32,
    },
    /// HP lost.
    HpLost {
        /// HP lost.
        amount: u32,
    },
    /// A claimed component was spent.
    ComponentConsumed {
        /// Item id.
        id: ItemId,
    },
    /// A carried item was lost.
    ItemLost {
        /// Item id.
        id: ItemId,
    },
    /// An objective advanced.
    QuestProgress {
        /// The quest.
        quest_id: String,
        /// Objective kind.
        kind: ObjectiveKind,
        /// Objective target.
        target: String,
    },
    /// A quest completed and paid out.
    QuestCompleted {
        /// The quest.
        quest_id: String,
        /// XP paid.
        xp: u64,
        /// Gold paid.
        gold: u64,
    },
    /// Monsters were put on guard.
    MonstersAlerted {
        /// How many monsters changed state.
        count: usize,
    },
}

/// Everything one application did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImpactReport {
    /// The classification whose recipe ran.
    pub classification: Classification,
    /// Applied changes, in order.
    pub deltas: Vec<AppliedDelta>,
}

impl ImpactReport {
    /// Returns true if the boss fell during this application.
    pub fn boss_defeated(&self) -> bool {
        self.deltas
            .iter()
            .any(|d| matches!(d, AppliedDelta::MonsterDefeated { boss: true, .. }))
    }

    /// Net HP change for the player.
    pub fn hp_change(&self) -> i64 {
        self.deltas
            .iter()
            .map(|d| match d {
                AppliedDelta::HpRestored { amount } => i64::from(*amount),
                AppliedDelta::HpLost { amount } => -i64::from(*amount),
                _ => 0,
            })
            .sum()
    }
}

struct Draft<'a> {
    player: Player,
    dungeon: &'a Dungeon,
    rooms: BTreeMap<Position, Room>,
    progression: Progression,
    deltas: Vec<AppliedDelta>,
}

impl Draft<'_> {
    fn room(&mut self, position: Position) -> Option<&mut Room> {
        match self.rooms.entry(position) {
            Entry::Occupied(e) => Some(e.into_mut()),
            Entry::Vacant(e) => {
                let room = self.dungeon.get_room(position).ok()?.clone();
                Some(e.insert(room))
            }
        }
    }

    fn grant_xp(&mut self, amount: u64) {
        if amount == 0 {
            return;
        }
        self.deltas.push(AppliedDelta::XpGained { amount });
        let before = self.player.level;
        let gained = self.player.gain_xp(
            amount,
            self.progression.xp_per_level,
            self.progression.hp_per_level,
        );
        for step in 1..=gained {
            self.deltas.push(AppliedDelta::LevelUp {
                level: before + step,
                max_hp: self.player.max_hp(),
            });
        }
    }

    fn advance_quests(&mut self, kind: ObjectiveKind, target: &str) {
        for quest_id in self.player.quests.advance(kind, target) {
            self.deltas.push(AppliedDelta::QuestProgress {
                quest_id,
                kind,
                target: target.to_string(),
            });
        }
        for reward in self.player.quests.claim_rewards() {
            self.player.gold = self.player.gold.saturating_add(reward.gold);
            self.deltas.push(AppliedDelta::QuestCompleted {
                quest_id: reward.quest_id,
                xp: reward.xp,
                gold: reward.gold,
            });
            self.grant_xp(reward.xp);
        }
    }

    fn damage_target(&mut self, target: &str, amount: u32) {
        let position = self.player.position;
        let bonus = i64::from(self.player.attack_bonus());
        let Some(room) = self.room(position) else {
            return;
        };
        if !room.monster_named(target) {
            return;
        }
        let Some(monster) = room.monster.as_mut() else {
            return;
        };
        let raw = i64::from(amount) + bonus - i64::from(monster.defense);
        let damage = u32::try_from(raw.max(1)).unwrap_or(u32::MAX);
        monster.hp = monster.hp.saturating_sub(damage);
        let name = monster.name.clone();

        if !monster.is_defeated() {
            let remaining_hp = monster.hp;
            self.deltas.push(AppliedDelta::MonsterDamaged {
                name,
                damage,
                remaining_hp,
            });
            return;
        }

        let boss = monster.is_boss;
        let bounty = u64::from(monster.max_hp) + u64::from(monster.attack);
        room.monster = None;
        self.deltas.push(AppliedDelta::MonsterDamaged {
            name: name.clone(),
            damage,
            remaining_hp: 0,
        });
        self.deltas.push(AppliedDelta::MonsterDefeated {
            name: name.clone(),
            position,
            boss,
        });
        self.grant_xp(bounty);
        self.advance_quests(ObjectiveKind::Kill, &name);
    }

    fn acquire_target(&mut self, target: &str) {
        let position = self.player.position;
        let Some(item) = self.room(position).and_then(|room| room.take_item(target)) else {
            return;
        };
        let name = item.name.clone();
        self.deltas.push(AppliedDelta::ItemAcquired {
            id: item.id.clone(),
            name: name.clone(),
        });
        self.player.add_item(item, 1);
        self.advance_quests(ObjectiveKind::Collect, &name);
    }

    fn consume(&mut self, components: &[ItemId]) {
        for id in components {
            let heal = self.player.item(id).map_or(0, |item| item.heal);
            if self.player.remove_item(id, 1) {
                self.deltas.push(AppliedDelta::ComponentConsumed { id: id.clone() });
                self.restore(heal);
            }
        }
    }

    fn restore(&mut self, amount: u32) {
        let gained = self.player.heal(amount);
        if gained > 0 {
            self.deltas.push(AppliedDelta::HpRestored { amount: gained });
        }
    }

    fn lose_item(&mut self) {
        let Some(id) = self.player.inventory().next().map(|(id, _)| id.clone()) else {
            return;
        };
        if self.player.remove_item(&id, 1) {
            self.deltas.push(AppliedDelta::ItemLost { id });
        }
    }

    fn alert_monsters(&mut self) {
        let position = self.player.position;
        let mut nearby = vec![position];
        nearby.extend(
            dv_core::Direction::ALL
                .into_iter()
                .filter_map(|d| self.dungeon.neighbor(position, d)),
        );
        let mut count = 0;
        for pos in nearby {
            let calm = self
                .room(pos)
                .and_then(|r| r.monster.as_mut())
                .filter(|m| !m.alerted);
            if let Some(monster) = calm {
                monster.alerted = true;
                count += 1;
            }
        }
        if count > 0 {
            self.deltas.push(AppliedDelta::MonstersAlerted { count });
        }
    }
}

/// Resolve claimed components against the pack.
///
/// Each claim may be an item id or display name. Claims that resolve to the
/// same item must be covered by the carried quantity.
fn resolve_components(intent: &ActionIntent, player: &Player) -> Result<Vec<ItemId>, RejectionReason> {
    let mut needed: BTreeMap<ItemId, u32> = BTreeMap::new();
    let mut ids = Vec::new();
    for claim in &intent.components_used {
        let item = player
            .find_item(claim)
            .ok_or(RejectionReason::InconsistentComponents)?;
        let count = needed.entry(item.id.clone()).or_insert(0);
        *count += 1;
        if player.item_count(&item.id) < *count {
            return Err(RejectionReason::InconsistentComponents);
        }
        ids.push(item.id.clone());
    }
    Ok(ids)
}

/// Apply the recipe for `(intent.action_type, classification)`.
///
/// Component claims are checked first, for every classification. On any
/// inconsistency nothing changes and `INCONSISTENT_COMPONENTS` is returned.
pub fn apply_impact(
    table: &ImpactTable,
    progression: &Progression,
    intent: &ActionIntent,
    classification: Classification,
    player: &mut Player,
    dungeon: &mut Dungeon,
) -> Result<ImpactReport, RejectionReason> {
    let components = resolve_components(intent, player).inspect_err(|_| {
        tracing::debug!(claims = ?intent.components_used, "component claim does not match inventory");
    })?;

    let recipe = table.recipe(intent.action_type, classification);
    let target = intent.target.as_deref();
    let mut draft = Draft {
        player: player.clone(),
        dungeon: &*dungeon,
        rooms: BTreeMap::new(),
        progression: *progression,
        deltas: Vec::new(),
    };

    for effect in recipe {
        match *effect {
            Effect::GrantXp { amount } => draft.grant_xp(amount),
            Effect::GrantGold { amount } => {
                if amount > 0 {
                    draft.player.gold = draft.player.gold.saturating_add(amount);
                    draft.deltas.push(AppliedDelta::GoldGained { amount });
                }
            }
            Effect::DamageTarget { amount } => {
                if let Some(t) = target {
                    draft.damage_target(t, amount);
                }
            }
            Effect::AcquireTarget => {
                if let Some(t) = target {
                    draft.acquire_target(t);
                }
            }
            Effect::RestoreHp { amount } => draft.restore(amount),
            Effect::AdvanceQuest { kind } => {
                if let Some(t) = target {
                    draft.advance_quests(kind, t);
                }
            }
            Effect::ConsumeComponents => draft.consume(&components),
            Effect::LoseHp { amount } => {
                let lost = draft.player.damage(amount);
                if lost > 0 {
                    draft.deltas.push(AppliedDelta::HpLost { amount: lost });
                }
            }
            Effect::LoseItem => draft.lose_item(),
            Effect::AlertMonsters => draft.alert_monsters(),
        }
    }

    let Draft {
        player: next_player,
        rooms,
        deltas,
        ..
    } = draft;

    *player = next_player;
    for (position, room) in rooms {
        if let Ok(slot) = dungeon.get_room_mut(position) {
            *slot = room;
        }
    }

    tracing::debug!(
        action = %intent.action_type,
        %classification,
        deltas = deltas.len(),
        "applied impact"
    );

    Ok(ImpactReport {
        classification,
        deltas,
    })
}
