//! The reward/penalty table that turns a classified check into state changes.
//!
//! [`ImpactTable`] has one [`OutcomeRecipes`] per action type, and each of
//! those has one recipe per [`Classification`]. Lookups are exhaustive
//! matches, so adding an action type or classification will not compile
//! until the table covers it. Magnitudes are data and load from JSON.

pub mod apply;

pub use apply::{AppliedDelta, ImpactReport, apply_impact};

use dv_core::ObjectiveKind;
use serde::{Deserialize, Serialize};

use crate::check::Classification;
use crate::error::{MechError, MechResult};
use crate::intent::ActionType;

/// One state change in a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    /// Award XP.
    GrantXp {
        /// XP awarded.
        amount: u64,
    },
    /// Award gold.
    GrantGold {
        /// Gold awarded.
        amount: u64,
    },
    /// Hurt the targeted monster. Equipped attack bonuses add to `amount`,
    /// the monster's defense subtracts, and at least 1 damage always lands.
    DamageTarget {
        /// Base damage.
        amount: u32,
    },
    /// Pick up the targeted loose item.
    AcquireTarget,
    /// Heal the player.
    RestoreHp {
        /// HP restored.
        amount: u32,
    },
    /// Count the deed against quest objectives naming the target.
    AdvanceQuest {
        /// Objective kind the deed counts as.
        kind: ObjectiveKind,
    },
    /// Spend every claimed component. Consumables heal by their `heal` value.
    ConsumeComponents,
    /// Hurt the player.
    LoseHp {
        /// HP lost.
        amount: u32,
    },
    /// Drop one carried item.
    LoseItem,
    /// Put monsters in this room and adjacent rooms on guard.
    AlertMonsters,
}

impl Effect {
    /// Returns true for effects that only ever harm the player.
    pub fn is_penalty(self) -> bool {
        matches!(self, Self::LoseHp { .. } | Self::LoseItem | Self::AlertMonsters)
    }
}

/// The recipes for one action type, one per classification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutcomeRecipes {
    /// Applied on a critical success.
    pub critical_success: Vec<Effect>,
    /// Applied on a success.
    pub success: Vec<Effect>,
    /// Applied on a failure. Must stay empty.
    pub failure: Vec<Effect>,
    /// Applied on a critical failure. Penalties only.
    pub critical_failure: Vec<Effect>,
}

impl OutcomeRecipes {
    /// The recipe for a classification.
    pub fn for_classification(&self, classification: Classification) -> &[Effect] {
        match classification {
            Classification::CriticalSuccess => &self.critical_success,
            Classification::Success => &self.success,
            Classification::Failure => &self.failure,
            Classification::CriticalFailure => &self.critical_failure,
        }
    }

    fn check(&self, action: ActionType) -> MechResult<()> {
        if !self.failure.is_empty() {
            return Err(MechError::InvalidTable(format!(
                "{action}: a plain failure must not change state"
            )));
        }
        if let Some(e) = self.critical_failure.iter().find(|e| !e.is_penalty()) {
            return Err(MechError::InvalidTable(format!(
                "{action}: critical failure may only carry penalties, found {e:?}"
            )));
        }
        let mut successes = self.success.iter().chain(&self.critical_success);
        if let Some(e) = successes.find(|e| e.is_penalty()) {
            return Err(MechError::InvalidTable(format!(
                "{action}: success recipes may not carry penalties, found {e:?}"
            )));
        }
        Ok(())
    }
}

/// The complete `action type x classification` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactTable {
    /// Recipes for `physical_attack`.
    pub physical_attack: OutcomeRecipes,
    /// Recipes for `use_item`.
    pub use_item: OutcomeRecipes,
    /// Recipes for `move`.
    #[serde(rename = "move")]
    pub movement: OutcomeRecipes,
    /// Recipes for `interact_object`.
    pub interact_object: OutcomeRecipes,
    /// Recipes for `social`.
    pub social: OutcomeRecipes,
    /// Recipes for `environment_action`.
    pub environment_action: OutcomeRecipes,
    /// Recipes for `attempt_magic`.
    pub attempt_magic: OutcomeRecipes,
}

fn recipes(
    critical_success: Vec<Effect>,
    success: Vec<Effect>,
    critical_failure: Vec<Effect>,
) -> OutcomeRecipes {
    OutcomeRecipes {
        critical_success,
        success,
        failure: Vec::new(),
        critical_failure,
    }
}

impl Default for ImpactTable {
    fn default() -> Self {
        use Effect::*;
        Self {
            physical_attack: recipes(
                vec![DamageTarget { amount: 12 }, GrantXp { amount: 20 }, ConsumeComponents],
                vec![DamageTarget { amount: 6 }, GrantXp { amount: 10 }, ConsumeComponents],
                vec![LoseHp { amount: 4 }, AlertMonsters],
            ),
            use_item: recipes(
                vec![
                    ConsumeComponents,
                    RestoreHp { amount: 5 },
                    AdvanceQuest { kind: ObjectiveKind::Interact },
                    GrantXp { amount: 10 },
                ],
                vec![
                    ConsumeComponents,
                    AdvanceQuest { kind: ObjectiveKind::Interact },
                    GrantXp { amount: 5 },
                ],
                vec![LoseItem, LoseHp { amount: 2 }],
            ),
            movement: recipes(
                vec![AdvanceQuest { kind: ObjectiveKind::Reach }, GrantXp { amount: 10 }, ConsumeComponents],
                vec![AdvanceQuest { kind: ObjectiveKind::Reach }, GrantXp { amount: 5 }, ConsumeComponents],
                vec![LoseHp { amount: 3 }],
            ),
            interact_object: recipes(
                vec![
                    AcquireTarget,
                    AdvanceQuest { kind: ObjectiveKind::Interact },
                    GrantGold { amount: 10 },
                    GrantXp { amount: 15 },
                    ConsumeComponents,
                ],
                vec![
                    AcquireTarget,
                    AdvanceQuest { kind: ObjectiveKind::Interact },
                    GrantXp { amount: 8 },
                    ConsumeComponents,
                ],
                vec![LoseHp { amount: 3 }, AlertMonsters],
            ),
            social: recipes(
                vec![
                    AdvanceQuest { kind: ObjectiveKind::Rescue },
                    GrantGold { amount: 5 },
                    GrantXp { amount: 15 },
                    ConsumeComponents,
                ],
                vec![AdvanceQuest { kind: ObjectiveKind::Rescue }, GrantXp { amount: 8 }, ConsumeComponents],
                vec![AlertMonsters],
            ),
            environment_action: recipes(
                vec![AcquireTarget, GrantXp { amount: 12 }, ConsumeComponents],
                vec![AcquireTarget, GrantXp { amount: 6 }, ConsumeComponents],
                vec![LoseHp { amount: 4 }],
            ),
            attempt_magic: recipes(
                vec![DamageTarget { amount: 14 }, GrantXp { amount: 25 }, ConsumeComponents],
                vec![DamageTarget { amount: 7 }, GrantXp { amount: 12 }, ConsumeComponents],
                vec![LoseHp { amount: 6 }, LoseItem],
            ),
        }
    }
}

impl ImpactTable {
    /// Recipes for an action type.
    pub fn recipes(&self, action: ActionType) -> &OutcomeRecipes {
        match action {
            ActionType::PhysicalAttack => &self.physical_attack,
            ActionType::UseItem => &self.use_item,
            ActionType::Move => &self.movement,
            ActionType::InteractObject => &self.interact_object,
            ActionType::Social => &self.social,
            ActionType::EnvironmentAction => &self.environment_action,
            ActionType::AttemptMagic => &self.attempt_magic,
        }
    }

    /// The recipe for one cell of the table.
    pub fn recipe(&self, action: ActionType, classification: Classification) -> &[Effect] {
        self.recipes(action).for_classification(classification)
    }

    /// Check that every cell respects its bucket: failures are empty,
    /// critical failures only penalize, successes never penalize.
    pub fn validate(&self) -> MechResult<()> {
        ActionType::ALL
            .into_iter()
            .try_for_each(|action| self.recipes(action).check(action))
    }
}

/// XP curve and level-up rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Progression {
    /// Leaving level `n` costs `xp_per_level * n^2` XP.
    pub xp_per_level: u64,
    /// Max HP gained per level.
    pub hp_per_level: u32,
}

impl Default for Progression {
    fn default() -> Self {
        Self {
            xp_per_level: 100,
            hp_per_level: 5,
        }
    }
}

impl Progression {
    /// Reject curves that could never level up.
    pub fn validate(&self) -> MechResult<()> {
        if self.xp_per_level == 0 {
            return Err(MechError::InvalidTable(
                "xp_per_level must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
