//! Harm the dungeon deals back.
//!
//! A hazard springs once, when the player first walks into its room: a save
//! against [`ThreatRules::hazard_difficulty`] avoids it, a failed save costs
//! a damage roll. A monster strikes after a resolved action in its room when
//! it is on guard or was the target of a hostile action, rolling against the
//! player's dodge target.

use dv_core::{Attribute, Monster, Player};
use serde::{Deserialize, Serialize};

use crate::check::CHECK_DIE;
use crate::dice::{Die, RollSource};
use crate::error::{MechError, MechResult};
use crate::intent::{ActionIntent, ActionType};

/// The die behind hazard and monster damage.
pub const DAMAGE_DIE: Die = Die::D6;

/// Hazard names that are dodged rather than noticed.
const DODGED: &[&str] = &["trap", "pit", "floor", "blade", "boulder"];

/// Numbers for hazards and monster strikes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatRules {
    /// Target of the save against a hazard.
    pub hazard_difficulty: u32,
    /// Added to the damage die when a hazard save fails.
    pub hazard_damage: u32,
    /// Dodge target against monster strikes, before the DEX modifier.
    pub dodge_base: u32,
    /// Whether a calm monster strikes back when attacked.
    pub retaliate_when_targeted: bool,
}

impl Default for ThreatRules {
    fn default() -> Self {
        Self {
            hazard_difficulty: 12,
            hazard_damage: 2,
            dodge_base: 10,
            retaliate_when_targeted: true,
        }
    }
}

impl ThreatRules {
    /// Reject targets a d20 check could never make sense of.
    pub fn validate(&self) -> MechResult<()> {
        for (name, value) in [
            ("hazard_difficulty", self.hazard_difficulty),
            ("dodge_base", self.dodge_base),
        ] {
            if !(1..=30).contains(&value) {
                return Err(MechError::InvalidTable(format!(
                    "{name} must be between 1 and 30, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// What happened when a hazard sprang.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardOutcome {
    /// The hazard's name.
    pub hazard: String,
    /// Attribute the save used.
    pub attribute: Attribute,
    /// Raw die result.
    pub roll_value: u32,
    /// Modifier of the save attribute.
    pub attribute_modifier: i32,
    /// `roll_value + attribute_modifier`.
    pub total: i32,
    /// Target of the save.
    pub difficulty: u32,
    /// Whether the save succeeded.
    pub avoided: bool,
    /// HP actually lost.
    pub damage: u32,
}

/// What happened when a monster struck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrikeOutcome {
    /// The monster's name.
    pub monster: String,
    /// Raw die result.
    pub roll_value: u32,
    /// `(attack - 10) / 2`, rounded down.
    pub attack_modifier: i32,
    /// `roll_value + attack_modifier`.
    pub total: i32,
    /// The player's dodge target.
    pub dodge: u32,
    /// Whether the strike landed.
    pub hit: bool,
    /// HP actually lost.
    pub damage: u32,
}

/// DEX for hazards that must be dodged, WIS for ones that must be noticed.
pub fn hazard_attribute(hazard: &str) -> Attribute {
    let lower = hazard.to_lowercase();
    if DODGED.iter().any(|k| lower.contains(k)) {
        Attribute::Dexterity
    } else {
        Attribute::Wisdom
    }
}

/// Whether `monster` strikes back after `intent` was resolved in its room.
pub fn provokes(monster: &Monster, intent: &ActionIntent, rules: &ThreatRules) -> bool {
    if monster.is_defeated() {
        return false;
    }
    if monster.alerted {
        return true;
    }
    let hostile = matches!(
        intent.action_type,
        ActionType::PhysicalAttack | ActionType::AttemptMagic
    );
    rules.retaliate_when_targeted
        && hostile
        && intent
            .target
            .as_deref()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case(&monster.name))
}

/// Roll the save against a hazard and apply the damage on a failure.
pub fn spring_hazard<R: RollSource + ?Sized>(
    hazard: &str,
    player: &mut Player,
    rules: &ThreatRules,
    rolls: &mut R,
) -> HazardOutcome {
    let attribute = hazard_attribute(hazard);
    let attribute_modifier = player.attributes.modifier(attribute);
    let roll_value = rolls.roll(CHECK_DIE);
    let total = roll_value as i32 + attribute_modifier;
    let avoided = total >= rules.hazard_difficulty as i32;
    let damage = if avoided {
        0
    } else {
        let raw = rolls.roll(DAMAGE_DIE).saturating_add(rules.hazard_damage);
        player.damage(raw)
    };
    tracing::debug!(hazard, %attribute, roll_value, total, avoided, damage, "hazard sprang");
    HazardOutcome {
        hazard: hazard.to_string(),
        attribute,
        roll_value,
        attribute_modifier,
        total,
        difficulty: rules.hazard_difficulty,
        avoided,
        damage,
    }
}

/// Roll a monster's strike against the player and apply the damage on a hit.
///
/// A hit deals the damage die plus the monster's attack, less the player's
/// equipped defense, and always at least 1.
pub fn monster_strike<R: RollSource + ?Sized>(
    monster: &Monster,
    player: &mut Player,
    rules: &ThreatRules,
    rolls: &mut R,
) -> StrikeOutcome {
    let attack_modifier = (i64::from(monster.attack) - 10).div_euclid(2) as i32;
    let dodge_raw = i64::from(rules.dodge_base) + i64::from(player.attributes.modifier(Attribute::Dexterity));
    let dodge = u32::try_from(dodge_raw.max(1)).unwrap_or(u32::MAX);
    let roll_value = rolls.roll(CHECK_DIE);
    let total = roll_value as i32 + attack_modifier;
    let hit = i64::from(total) >= i64::from(dodge);
    let damage = if hit {
        let raw = i64::from(rolls.roll(DAMAGE_DIE)) + i64::from(monster.attack)
            - i64::from(player.defense_bonus());
        player.damage(u32::try_from(raw.max(1)).unwrap_or(u32::MAX))
    } else {
        0
    };
    tracing::debug!(monster = %monster.name, roll_value, total, dodge, hit, damage, "monster struck");
    StrikeOutcome {
        monster: monster.name.clone(),
        roll_value,
        attack_modifier,
        total,
        dodge,
        hit,
        damage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::FixedRolls;
    use dv_core::{Attributes, Item, ItemKind};

    fn player() -> Player {
        Player::new("Ayla", Attributes::default())
    }

    #[test]
    fn traps_are_dodged_and_mists_are_noticed() {
        assert_eq!(hazard_attribute("Spike Trap"), Attribute::Dexterity);
        assert_eq!(hazard_attribute("Flooded Pit"), Attribute::Dexterity);
        assert_eq!(hazard_attribute("Poison Mist"), Attribute::Wisdom);
    }

    #[test]
    fn failed_save_costs_hp() {
        let mut p = player();
        let hp = p.hp();
        let mut rolls = FixedRolls::new([3, 4]);
        let outcome = spring_hazard("Spike Trap", &mut p, &ThreatRules::default(), &mut rolls);
        assert!(!outcome.avoided);
        assert_eq!(outcome.total, 3);
        assert_eq!(outcome.damage, 6);
        assert_eq!(p.hp(), hp - 6);
        assert_eq!(rolls.remaining(), 0);
    }

    #[test]
    fn made_save_costs_nothing_and_skips_the_damage_roll() {
        let mut p = player();
        let hp = p.hp();
        let mut rolls = FixedRolls::new([12, 6]);
        let outcome = spring_hazard("Poison Mist", &mut p, &ThreatRules::default(), &mut rolls);
        assert!(outcome.avoided);
        assert_eq!(outcome.damage, 0);
        assert_eq!(p.hp(), hp);
        assert_eq!(rolls.remaining(), 1);
    }

    #[test]
    fn hazard_can_kill() {
        let mut p = player();
        let max = p.max_hp();
        p.damage(max - 1);
        let outcome = spring_hazard("Spike Trap", &mut p, &ThreatRules::default(), &mut FixedRolls::new([1, 1]));
        assert_eq!(outcome.damage, 1);
        assert!(p.is_dead());
    }

    #[test]
    fn strike_hits_through_armor_for_at_least_one() {
        let mut p = player();
        let plate = Item::new("plate", "Plate", ItemKind::Armor).with_defense(20);
        p.add_item(plate.clone(), 1);
        p.equip(&plate.id);
        let hp = p.hp();
        let rat = Monster::new("Shadow Rat", 10, 3, 1);
        let outcome = monster_strike(&rat, &mut p, &ThreatRules::default(), &mut FixedRolls::new([20, 6]));
        assert_eq!(outcome.attack_modifier, -4);
        assert_eq!(outcome.dodge, 10);
        assert!(outcome.hit);
        assert_eq!(outcome.damage, 1);
        assert_eq!(p.hp(), hp - 1);
    }

    #[test]
    fn missed_strike_costs_nothing() {
        let mut p = player();
        let hp = p.hp();
        let rat = Monster::new("Shadow Rat", 10, 3, 1);
        let outcome = monster_strike(&rat, &mut p, &ThreatRules::default(), &mut FixedRolls::new([13]));
        assert!(!outcome.hit);
        assert_eq!(p.hp(), hp);
    }

    #[test]
    fn alerted_or_attacked_monsters_are_provoked() {
        let rules = ThreatRules::default();
        let mut rat = Monster::new("Shadow Rat", 10, 3, 1);
        let talk = ActionIntent::new(ActionType::Social, 0.8).with_target("Shadow Rat");
        let stab = ActionIntent::new(ActionType::PhysicalAttack, 0.8).with_target("shadow rat");
        assert!(!provokes(&rat, &talk, &rules));
        assert!(provokes(&rat, &stab, &rules));

        let calm = ThreatRules {
            retaliate_when_targeted: false,
            ..rules
        };
        assert!(!provokes(&rat, &stab, &calm));

        rat.alerted = true;
        assert!(provokes(&rat, &talk, &calm));
        rat.hp = 0;
        assert!(!provokes(&rat, &talk, &rules));
    }

    #[test]
    fn out_of_range_targets_are_rejected() {
        let rules = ThreatRules {
            dodge_base: 0,
            ..ThreatRules::default()
        };
        assert!(rules.validate().is_err());
        assert!(ThreatRules::default().validate().is_ok());
    }
}
