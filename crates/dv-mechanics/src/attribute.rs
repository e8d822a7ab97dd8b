//! Choosing which attribute a check rolls against.
//!
//! The method text is scanned for fixed keyword sets in a fixed order
//! (strength, dexterity, wisdom, intelligence); the first set with a
//! substring hit wins. With no hit the action type decides.

use dv_core::Attribute;

use crate::intent::ActionType;

/// Keywords that make a check a strength check.
pub const STRENGTH_KEYWORDS: &[&str] = &["force", "break", "smash", "lift", "push"];
/// Keywords that make a check a dexterity check.
pub const DEXTERITY_KEYWORDS: &[&str] = &["dodge", "sneak", "climb", "jump", "quick"];
/// Keywords that make a check a wisdom check.
pub const WISDOM_KEYWORDS: &[&str] = &["perceive", "notice", "sense", "listen", "spot"];
/// Keywords that make a check an intelligence check.
pub const INTELLIGENCE_KEYWORDS: &[&str] = &["investigate", "recall", "decipher", "analyze"];

const KEYWORD_SETS: [(Attribute, &[&str]); 4] = [
    (Attribute::Strength, STRENGTH_KEYWORDS),
    (Attribute::Dexterity, DEXTERITY_KEYWORDS),
    (Attribute::Wisdom, WISDOM_KEYWORDS),
    (Attribute::Intelligence, INTELLIGENCE_KEYWORDS),
];

/// The attribute an action type uses when no keyword matches.
pub fn default_attribute(action_type: ActionType) -> Attribute {
    match action_type {
        ActionType::PhysicalAttack | ActionType::EnvironmentAction => Attribute::Strength,
        ActionType::Move => Attribute::Dexterity,
        ActionType::InteractObject | ActionType::UseItem => Attribute::Wisdom,
        ActionType::Social | ActionType::AttemptMagic => Attribute::Intelligence,
    }
}

/// Select the attribute for a check. Always one of the four check attributes.
pub fn select_attribute(action_type: ActionType, method: &str) -> Attribute {
    let method = method.to_lowercase();
    KEYWORD_SETS
        .iter()
        .find(|(_, words)| words.iter().any(|w| method.contains(w)))
        .map_or_else(|| default_attribute(action_type), |(attr, _)| *attr)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_override_action_type() {
        assert_eq!(
            select_attribute(ActionType::Social, "Sneak past the guard"),
            Attribute::Dexterity
        );
        assert_eq!(
            select_attribute(ActionType::Move, "listen at the door"),
            Attribute::Wisdom
        );
        assert_eq!(
            select_attribute(ActionType::PhysicalAttack, "decipher the runes"),
            Attribute::Intelligence
        );
    }

    #[test]
    fn strength_set_checked_first() {
        // "push" (strength) and "quick" (dexterity) both hit.
        assert_eq!(
            select_attribute(ActionType::Move, "push quickly"),
            Attribute::Strength
        );
    }

    #[test]
    fn defaults_are_total() {
        for t in ActionType::ALL {
            let attr = select_attribute(t, "");
            assert_ne!(attr, Attribute::Vitality);
        }
        assert_eq!(select_attribute(ActionType::PhysicalAttack, "swing"), Attribute::Strength);
        assert_eq!(select_attribute(ActionType::EnvironmentAction, "wave"), Attribute::Strength);
    }
}
