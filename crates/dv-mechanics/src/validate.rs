//! The action validator.
//!
//! A pure decision over an intent, the player, and the current room. Checks
//! run in a fixed order and stop at the first failure. Nothing here mutates
//! state; component consistency is checked later, at apply time.

use dv_core::{Capability, Player, Room};
use serde::{Deserialize, Serialize};

use crate::difficulty::PLAUSIBILITY_FLOOR;
use crate::intent::ActionIntent;

/// Why an action was refused. Always recoverable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    /// The interpreter itself flagged the action as infeasible.
    InterpreterRejected,
    /// Plausibility missing, out of range, or below the floor.
    Implausible,
    /// The named target is not in the room.
    TargetNotPresent,
    /// The method needs a capability the player has not equipped.
    PhysicsViolation,
    /// A claimed component is not in the pack. Found at apply time.
    InconsistentComponents,
}

impl RejectionReason {
    /// The wire code, e.g. `TARGET_NOT_PRESENT`.
    pub fn code(self) -> &'static str {
        match self {
            Self::InterpreterRejected => "INTERPRETER_REJECTED",
            Self::Implausible => "IMPLAUSIBLE",
            Self::TargetNotPresent => "TARGET_NOT_PRESENT",
            Self::PhysicsViolation => "PHYSICS_VIOLATION",
            Self::InconsistentComponents => "INCONSISTENT_COMPONENTS",
        }
    }

    /// One-line explanation for the player.
    pub fn explain(self) -> &'static str {
        match self {
            Self::InterpreterRejected => "That is not something you can do here.",
            Self::Implausible => "That is beyond the realm of possibility.",
            Self::TargetNotPresent => "There is nothing like that here.",
            Self::PhysicsViolation => "You lack the means to defy the laws of nature like that.",
            Self::InconsistentComponents => "You do not have what you meant to use.",
        }
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The validator's verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Whether resolution may proceed.
    pub allowed: bool,
    /// Set whenever `allowed` is false.
    pub reason: Option<RejectionReason>,
    /// Extra detail, such as the missing capability.
    #[serde(default)]
    pub detail: Option<String>,
}

impl ValidationResult {
    /// Allow the action.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            detail: None,
        }
    }

    /// Refuse the action.
    pub fn reject(reason: RejectionReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
            detail: None,
        }
    }

    fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Capabilities whose keyword (or its spaced spelling) appears in `method`.
pub fn forbidden_capabilities(method: &str) -> Vec<Capability> {
    let method = method.to_lowercase();
    Capability::ALL
        .into_iter()
        .filter(|cap| {
            let keyword = cap.keyword();
            method.contains(keyword) || method.contains(&keyword.replace('_', " "))
        })
        .collect()
}

/// Decide whether an intent may be resolved.
pub fn validate(intent: &ActionIntent, player: &Player, room: &Room) -> ValidationResult {
    if !intent.valid {
        let result = ValidationResult::reject(RejectionReason::InterpreterRejected);
        return match &intent.reason_if_invalid {
            Some(reason) => result.with_detail(reason.clone()),
            None => result,
        };
    }

    match intent.plausibility {
        Some(p) if (0.0..=1.0).contains(&p) && p >= PLAUSIBILITY_FLOOR => {}
        Some(p) => {
            return ValidationResult::reject(RejectionReason::Implausible)
                .with_detail(format!("plausibility {p}"));
        }
        None => {
            return ValidationResult::reject(RejectionReason::Implausible)
                .with_detail("plausibility missing");
        }
    }

    if let Some(target) = &intent.target {
        if !room.has_target(target) {
            return ValidationResult::reject(RejectionReason::TargetNotPresent)
                .with_detail(target.clone());
        }
    }

    if let Some(cap) = forbidden_capabilities(&intent.method)
        .into_iter()
        .find(|cap| !player.has_capability(*cap))
    {
        return ValidationResult::reject(RejectionReason::PhysicsViolation)
            .with_detail(format!("requires {cap}"));
    }

    ValidationResult::allow()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::ActionType;
    use dv_core::{Attributes, Item, ItemKind, Monster, Position, RoomType};

    fn rat_room() -> Room {
        let mut room = Room::new(Position::new(1, 0, 0), RoomType::Monster);
        room.monster = Some(Monster::new("Shadow Rat", 10, 3, 1));
        room.features.push("Altar".to_string());
        room
    }

    fn player() -> Player {
        Player::new("Ayla", Attributes::default())
    }

    fn attack(p: f64) -> ActionIntent {
        ActionIntent::new(ActionType::PhysicalAttack, p).with_target("shadow rat")
    }

    #[test]
    fn accepts_plausible_attack_on_present_target() {
        let v = validate(&attack(0.9), &player(), &rat_room());
        assert!(v.allowed);
        assert_eq!(v.reason, None);
    }

    #[test]
    fn interpreter_rejection_comes_first() {
        let intent = ActionIntent::new(ActionType::PhysicalAttack, 0.05)
            .with_target("ghost")
            .rejected("no ghosts");
        let v = validate(&intent, &player(), &rat_room());
        assert_eq!(v.reason, Some(RejectionReason::InterpreterRejected));
        assert_eq!(v.detail.as_deref(), Some("no ghosts"));
    }

    #[test]
    fn rejects_below_floor_regardless_of_other_fields() {
        for p in [0.0, 0.05, 0.0999] {
            let v = validate(&attack(p), &player(), &rat_room());
            assert_eq!(v.reason, Some(RejectionReason::Implausible), "p = {p}");
        }
        assert!(validate(&attack(0.1), &player(), &rat_room()).allowed);
    }

    #[test]
    fn rejects_missing_or_out_of_range_plausibility() {
        let mut intent = attack(0.5);
        intent.plausibility = None;
        assert_eq!(
            validate(&intent, &player(), &rat_room()).reason,
            Some(RejectionReason::Implausible)
        );
        intent.plausibility = Some(1.5);
        assert_eq!(
            validate(&intent, &player(), &rat_room()).reason,
            Some(RejectionReason::Implausible)
        );
        intent.plausibility = Some(f64::NAN);
        assert!(!validate(&intent, &player(), &rat_room()).allowed);
    }

    #[test]
    fn target_must_be_present() {
        let intent = ActionIntent::new(ActionType::PhysicalAttack, 0.9).with_target("Dragon");
        assert_eq!(
            validate(&intent, &player(), &rat_room()).reason,
            Some(RejectionReason::TargetNotPresent)
        );
        let intent = ActionIntent::new(ActionType::InteractObject, 0.9).with_target(" ALTAR ");
        assert!(validate(&intent, &player(), &rat_room()).allowed);
    }

    #[test]
    fn flight_needs_equipped_item() {
        let intent = ActionIntent::new(ActionType::Move, 0.6).with_method("fly to the ceiling");
        let mut p = player();
        let v = validate(&intent, &p, &rat_room());
        assert_eq!(v.reason, Some(RejectionReason::PhysicsViolation));

        let ring = Item::new("lev", "Levitation Ring", ItemKind::Ring).with_capability(Capability::Fly);
        p.add_item(ring.clone(), 1);
        // Carried is not enough.
        assert!(!validate(&intent, &p, &rat_room()).allowed);

        p.equip(&ring.id);
        assert!(validate(&intent, &p, &rat_room()).allowed);
    }

    #[test]
    fn spaced_keywords_are_detected() {
        assert_eq!(
            forbidden_capabilities("I Phase Through the wall"),
            vec![Capability::PhaseThrough]
        );
        assert_eq!(
            forbidden_capabilities("time travel to yesterday"),
            vec![Capability::TimeTravel]
        );
        assert!(forbidden_capabilities("walk carefully").is_empty());
    }

    #[test]
    fn validator_does_not_mutate() {
        let p = player();
        let room = rat_room();
        let before = (p.clone(), room.clone());
        let _ = validate(&attack(0.9), &p, &room);
        assert_eq!((p, room), before);
    }
}
