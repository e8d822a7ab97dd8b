//! Rolling a check and classifying the result.

use dv_core::{Attribute, Player};
use serde::{Deserialize, Serialize};

use crate::attribute::select_attribute;
use crate::dice::{Die, RollSource};
use crate::difficulty::difficulty_for;
use crate::intent::ActionIntent;

/// The die every check rolls.
pub const CHECK_DIE: Die = Die::D20;

/// Outcome bucket of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Beat the target by 10 or more.
    CriticalSuccess,
    /// Met or beat the target.
    Success,
    /// Missed the target by less than 10.
    Failure,
    /// Missed the target by 10 or more.
    CriticalFailure,
}

impl Classification {
    /// Bucket a total against a difficulty.
    pub fn classify(total: i32, difficulty: u32) -> Self {
        let d = i64::from(difficulty);
        let t = i64::from(total);
        if t >= d + 10 {
            Self::CriticalSuccess
        } else if t >= d {
            Self::Success
        } else if t <= d - 10 {
            Self::CriticalFailure
        } else {
            Self::Failure
        }
    }

    /// Returns true for either success bucket.
    pub fn is_success(self) -> bool {
        matches!(self, Self::CriticalSuccess | Self::Success)
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::CriticalSuccess => "critical success",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::CriticalFailure => "critical failure",
        };
        f.write_str(s)
    }
}

/// The full record of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionOutcome {
    /// Attribute the check used.
    pub attribute: Attribute,
    /// Raw die result.
    pub roll_value: u32,
    /// Modifier of the selected attribute.
    pub attribute_modifier: i32,
    /// `roll_value + attribute_modifier`.
    pub total: i32,
    /// Target derived from plausibility.
    pub difficulty: u32,
    /// `total - difficulty`.
    pub margin: i32,
    /// Outcome bucket.
    pub classification: Classification,
}

impl ResolutionOutcome {
    /// Assemble an outcome from its inputs.
    pub fn from_parts(attribute: Attribute, roll_value: u32, attribute_modifier: i32, difficulty: u32) -> Self {
        let total = roll_value as i32 + attribute_modifier;
        Self {
            attribute,
            roll_value,
            attribute_modifier,
            total,
            difficulty,
            margin: total - difficulty as i32,
            classification: Classification::classify(total, difficulty),
        }
    }
}

/// Roll a check for an already validated intent.
///
/// The intent must carry a plausibility; a missing one resolves at the
/// hardest difficulty.
pub fn resolve_check<R: RollSource + ?Sized>(
    intent: &ActionIntent,
    player: &Player,
    rolls: &mut R,
) -> ResolutionOutcome {
    let attribute = select_attribute(intent.action_type, &intent.method);
    let modifier = player.attributes.modifier(attribute);
    let difficulty = difficulty_for(intent.plausibility.unwrap_or(0.0));
    let roll_value = rolls.roll(CHECK_DIE);
    let outcome = ResolutionOutcome::from_parts(attribute, roll_value, modifier, difficulty);
    tracing::debug!(
        %attribute,
        roll = roll_value,
        modifier,
        difficulty,
        margin = outcome.margin,
        classification = %outcome.classification,
        "resolved check"
    );
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::FixedRolls;
    use crate::intent::ActionType;
    use dv_core::Attributes;

    #[test]
    fn classification_boundaries() {
        assert_eq!(Classification::classify(20, 10), Classification::CriticalSuccess);
        assert_eq!(Classification::classify(19, 10), Classification::Success);
        assert_eq!(Classification::classify(10, 10), Classification::Success);
        assert_eq!(Classification::classify(9, 10), Classification::Failure);
        assert_eq!(Classification::classify(1, 10), Classification::Failure);
        assert_eq!(Classification::classify(0, 10), Classification::CriticalFailure);
        assert_eq!(Classification::classify(-3, 5), Classification::CriticalFailure);
    }

    #[test]
    fn end_to_end_three_quarter_plausibility() {
        let player = Player::new("Ayla", Attributes::default().with(Attribute::Strength, 14));
        let intent = ActionIntent::new(ActionType::PhysicalAttack, 0.75)
            .with_target("Shadow Rat")
            .with_method("slash with my dagger");
        let mut rolls = FixedRolls::new([14]);

        let out = resolve_check(&intent, &player, &mut rolls);
        assert_eq!(out.attribute, Attribute::Strength);
        assert_eq!(out.difficulty, 8);
        assert_eq!(out.roll_value, 14);
        assert_eq!(out.attribute_modifier, 2);
        assert_eq!(out.total, 16);
        assert_eq!(out.margin, 8);
        assert_eq!(out.classification, Classification::Success);
    }

    #[test]
    fn negative_modifier_lowers_total() {
        let player = Player::new("Bram", Attributes::default().with(Attribute::Dexterity, 6));
        let intent = ActionIntent::new(ActionType::Move, 0.5).with_method("jump the gap");
        let out = resolve_check(&intent, &player, &mut FixedRolls::new([3]));
        assert_eq!(out.attribute, Attribute::Dexterity);
        assert_eq!(out.total, 1);
        assert_eq!(out.margin, -11);
        assert_eq!(out.classification, Classification::CriticalFailure);
    }

    #[test]
    fn margin_always_reported() {
        let out = ResolutionOutcome::from_parts(Attribute::Wisdom, 20, 3, 5);
        assert_eq!(out.margin, 18);
        assert_eq!(out.classification, Classification::CriticalSuccess);
    }
}
