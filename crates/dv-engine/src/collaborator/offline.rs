//! Deterministic stand-ins for the text-generation collaborators.
//!
//! These keep the game playable with no model attached. The interpreter
//! maps leading verbs onto action types and picks the target out of the
//! room; the narrator fills fixed templates.

use dv_core::RoomType;
use dv_mechanics::{ActionType, AppliedDelta, Classification};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{CollaboratorError, IntentExtractor, IntentRequest, NarrationRequest, Narrator, RoomView};

const VERBS: &[(ActionType, &[&str])] = &[
    (
        ActionType::PhysicalAttack,
        &["attack", "hit", "strike", "slash", "stab", "punch", "kick", "fight", "smite"],
    ),
    (ActionType::UseItem, &["use", "drink", "eat", "apply", "quaff", "read"]),
    (
        ActionType::Move,
        &["climb", "jump", "sneak", "crawl", "swim", "run", "dodge", "fly", "teleport"],
    ),
    (
        ActionType::InteractObject,
        &["open", "examine", "inspect", "search", "take", "grab", "pick", "touch", "pull", "look"],
    ),
    (
        ActionType::Social,
        &["talk", "ask", "persuade", "greet", "threaten", "bribe", "say", "tell", "free", "rescue"],
    ),
    (
        ActionType::AttemptMagic,
        &["cast", "conjure", "enchant", "channel", "summon", "resurrect"],
    ),
];

const FILLER: &[&str] = &["the", "a", "an", "at", "to", "with", "on", "up"];

/// Verb-table interpreter.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordInterpreter;

impl KeywordInterpreter {
    /// Create the interpreter.
    pub fn new() -> Self {
        Self
    }

    fn classify(words: &[String]) -> ActionType {
        words
            .first()
            .and_then(|verb| {
                VERBS
                    .iter()
                    .find(|(_, verbs)| verbs.contains(&verb.as_str()))
                    .map(|(t, _)| *t)
            })
            .unwrap_or(ActionType::EnvironmentAction)
    }

    fn base_plausibility(action: ActionType) -> f64 {
        match action {
            ActionType::PhysicalAttack => 0.7,
            ActionType::UseItem => 0.9,
            ActionType::Move => 0.6,
            ActionType::InteractObject => 0.8,
            ActionType::Social => 0.6,
            ActionType::EnvironmentAction => 0.5,
            ActionType::AttemptMagic => 0.4,
        }
    }

    /// The longest room target named in the text, then a room target whose
    /// trailing words are the object phrase ("rat" for "Shadow Rat"), then
    /// the object phrase itself for actions that need a target.
    fn target(action: ActionType, text: &str, words: &[String], room: &RoomView) -> Option<String> {
        let named = room
            .target_names()
            .filter(|name| text.contains(&name.to_lowercase()))
            .max_by_key(|name| name.len());
        if let Some(name) = named {
            return Some(name.to_string());
        }

        let object = words
            .iter()
            .skip(1)
            .map(String::as_str)
            .skip_while(|w| FILLER.contains(w))
            .collect::<Vec<_>>()
            .join(" ");
        if object.is_empty() {
            return None;
        }
        let suffix = format!(" {object}");
        let shortened = room
            .target_names()
            .find(|name| name.to_lowercase().ends_with(&suffix));
        if let Some(name) = shortened {
            return Some(name.to_string());
        }

        matches!(action, ActionType::PhysicalAttack | ActionType::Social).then_some(object)
    }
}

impl IntentExtractor for KeywordInterpreter {
    fn extract(&self, request: &IntentRequest) -> Result<String, CollaboratorError> {
        let text = request.action_text.trim().to_lowercase();
        let words: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        let action = Self::classify(&words);
        let target = Self::target(action, &text, &words, &request.room);
        let components: Vec<&str> = if action == ActionType::UseItem {
            request
                .player
                .inventory
                .iter()
                .filter(|name| text.contains(&name.to_lowercase()))
                .map(String::as_str)
                .collect()
        } else {
            Vec::new()
        };
        let valid = action != ActionType::UseItem || !components.is_empty();

        let intent = json!({
            "action_type": action,
            "target": target,
            "method": request.action_text.trim(),
            "plausibility": Self::base_plausibility(action),
            "valid": valid,
            "reason_if_invalid": (!valid).then_some("you are not carrying that"),
            "components_used": components,
        });
        Ok(intent.to_string())
    }
}

/// Narrative style of the template narrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NarratorTone {
    /// Plain, matter-of-fact.
    #[default]
    Plain,
    /// Grim and ominous.
    Grim,
    /// Light-hearted.
    Wry,
}

impl NarratorTone {
    /// Parse a tone name, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "plain" => Some(Self::Plain),
            "grim" => Some(Self::Grim),
            "wry" => Some(Self::Wry),
            _ => None,
        }
    }
}

/// Template narrator.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplateNarrator {
    tone: NarratorTone,
}

impl TemplateNarrator {
    /// Create a narrator with the given tone.
    pub fn new(tone: NarratorTone) -> Self {
        Self { tone }
    }

    fn headline(&self, classification: Classification) -> &'static str {
        match (self.tone, classification) {
            (NarratorTone::Plain, Classification::CriticalSuccess) => "A perfect attempt.",
            (NarratorTone::Plain, Classification::Success) => "You succeed.",
            (NarratorTone::Plain, Classification::Failure) => "It does not work.",
            (NarratorTone::Plain, Classification::CriticalFailure) => "It goes badly wrong.",
            (NarratorTone::Grim, Classification::CriticalSuccess) => "Fate bends to your will.",
            (NarratorTone::Grim, Classification::Success) => "You prevail, for now.",
            (NarratorTone::Grim, Classification::Failure) => "The dark swallows your effort.",
            (NarratorTone::Grim, Classification::CriticalFailure) => "The dungeon punishes your hubris.",
            (NarratorTone::Wry, Classification::CriticalSuccess) => "Flawless. Someone should write a song.",
            (NarratorTone::Wry, Classification::Success) => "That actually worked.",
            (NarratorTone::Wry, Classification::Failure) => "Well, that was a thing you did.",
            (NarratorTone::Wry, Classification::CriticalFailure) => "Spectacularly, gloriously wrong.",
        }
    }

    fn describe_delta(delta: &AppliedDelta) -> String {
        match delta {
            AppliedDelta::XpGained { amount } => format!("+{amount} XP."),
            AppliedDelta::LevelUp { level, max_hp } => {
                format!("You reach level {level}! (max HP {max_hp})")
            }
            AppliedDelta::GoldGained { amount } => format!("+{amount} gold."),
            AppliedDelta::MonsterDamaged {
                name,
                damage,
                remaining_hp,
            } => format!("The {name} takes {damage} damage ({remaining_hp} HP left)."),
            AppliedDelta::MonsterDefeated { name, boss, .. } => {
                if *boss {
                    format!("The {name} falls. The dungeon is yours!")
                } else {
                    format!("The {name} is slain.")
                }
            }
            AppliedDelta::ItemAcquired { name, .. } => format!("You take the {name}."),
            AppliedDelta::HpRestored { amount } => format!("You recover {amount} HP."),
            AppliedDelta::HpLost { amount } => format!("You lose {amount} HP."),
            AppliedDelta::ComponentConsumed { id } => format!("The {id} is used up."),
            AppliedDelta::ItemLost { id } => format!("You lose your {id}."),
            AppliedDelta::QuestProgress { quest_id, .. } => format!("Quest '{quest_id}' advances."),
            AppliedDelta::QuestCompleted { quest_id, xp, gold } => {
                format!("Quest '{quest_id}' complete! (+{xp} XP, +{gold} gold)")
            }
            AppliedDelta::MonstersAlerted { count } => {
                if *count == 1 {
                    "Something nearby is now on guard.".to_string()
                } else {
                    format!("{count} creatures nearby are now on guard.")
                }
            }
        }
    }

    fn room_opening(&self, room_type: RoomType) -> &'static str {
        match (self.tone, room_type) {
            (_, RoomType::StairsDown) => "A stairway spirals down into darkness.",
            (_, RoomType::StairsUp) => "Worn steps lead back up.",
            (_, RoomType::Boss) => "The air is thick with menace. This is the lair.",
            (NarratorTone::Grim, _) => "Cold stone walls close in around you.",
            (NarratorTone::Wry, _) => "Another room. Dungeons are mostly rooms, it turns out.",
            (NarratorTone::Plain, _) => "You stand in a stone chamber.",
        }
    }
}

impl Narrator for TemplateNarrator {
    fn narrate(&self, request: &NarrationRequest) -> Result<String, CollaboratorError> {
        if let Some(reason) = request.rejection {
            return Ok(reason.explain().to_string());
        }
        let mut out = match request.classification {
            Some(c) => self.headline(c).to_string(),
            None => String::new(),
        };
        for delta in &request.deltas {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&Self::describe_delta(delta));
        }
        Ok(out)
    }

    fn describe_room(&self, room: &RoomView) -> Result<String, CollaboratorError> {
        let mut out = self.room_opening(room.room_type).to_string();
        if let Some(monster) = &room.monster {
            out.push_str(&format!(" A {monster} watches you."));
        }
        if let Some(npc) = &room.npc {
            out.push_str(&format!(" {npc} is here."));
        }
        if let Some(hazard) = &room.hazard {
            out.push_str(&format!(" Beware: {hazard}."));
        }
        for item in &room.items {
            out.push_str(&format!(" A {item} lies on the floor."));
        }
        for feature in &room.features {
            out.push_str(&format!(" There is a {feature} here."));
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::{PlayerView, RoomView};
    use dv_core::{Attributes, Item, ItemKind, Monster, Player, Position, Room};
    use dv_mechanics::ActionIntent;

    fn request(text: &str) -> IntentRequest {
        let mut room = Room::new(Position::new(1, 0, 0), RoomType::Monster);
        room.monster = Some(Monster::new("Shadow Rat", 10, 3, 1));
        room.features.push("Chest".to_string());
        let mut player = Player::new("Ayla", Attributes::default());
        player.add_item(
            Item::new("healing_potion", "Healing Potion", ItemKind::Consumable).with_heal(15),
            1,
        );
        IntentRequest {
            action_text: text.to_string(),
            player: PlayerView::of(&player),
            room: RoomView::of(&room),
        }
    }

    fn interpret(text: &str) -> ActionIntent {
        let raw = KeywordInterpreter::new().extract(&request(text)).unwrap();
        ActionIntent::from_json(&raw).unwrap()
    }

    #[test]
    fn attack_finds_room_target() {
        let intent = interpret("Attack the shadow rat with my fists");
        assert_eq!(intent.action_type, ActionType::PhysicalAttack);
        assert_eq!(intent.target.as_deref(), Some("Shadow Rat"));
        assert!(intent.valid);
        assert!(intent.plausibility.is_some());
    }

    #[test]
    fn last_word_of_a_name_finds_the_target() {
        let intent = interpret("attack the rat");
        assert_eq!(intent.target.as_deref(), Some("Shadow Rat"));

        // "potion" is not a room target, so nothing is chosen for an inspect.
        assert_eq!(interpret("inspect the potion").target, None);
    }

    #[test]
    fn help_example_passes_validation() {
        let req = request("attack the rat");
        let raw = KeywordInterpreter::new().extract(&req).unwrap();
        let intent = ActionIntent::from_json(&raw).unwrap();
        let mut room = Room::new(Position::new(1, 0, 0), RoomType::Monster);
        room.monster = Some(Monster::new("Shadow Rat", 10, 3, 1));
        let player = Player::new("Ayla", Attributes::default());
        assert!(dv_mechanics::validate(&intent, &player, &room).allowed);
    }

    #[test]
    fn attack_on_absent_creature_names_it() {
        let intent = interpret("attack the dragon");
        assert_eq!(intent.target.as_deref(), Some("dragon"));
    }

    #[test]
    fn use_item_claims_component() {
        let intent = interpret("drink healing potion");
        assert_eq!(intent.action_type, ActionType::UseItem);
        assert!(intent.components_used.contains("Healing Potion"));
    }

    #[test]
    fn using_something_not_carried_is_invalid() {
        let intent = interpret("use the magic lamp");
        assert!(!intent.valid);
    }

    #[test]
    fn unknown_verb_is_environment_action() {
        let intent = interpret("stomp around loudly");
        assert_eq!(intent.action_type, ActionType::EnvironmentAction);
        assert_eq!(intent.method, "stomp around loudly");
    }

    #[test]
    fn open_chest_targets_feature() {
        let intent = interpret("open the chest");
        assert_eq!(intent.action_type, ActionType::InteractObject);
        assert_eq!(intent.target.as_deref(), Some("Chest"));
    }

    #[test]
    fn narration_mentions_deltas() {
        let narrator = TemplateNarrator::default();
        let text = narrator
            .narrate(&NarrationRequest {
                action_type: ActionType::PhysicalAttack,
                target: Some("Shadow Rat".into()),
                method: String::new(),
                classification: Some(Classification::Success),
                margin: Some(4),
                rejection: None,
                deltas: vec![AppliedDelta::XpGained { amount: 10 }],
            })
            .unwrap();
        assert!(text.starts_with("You succeed."));
        assert!(text.contains("+10 XP"));
    }

    #[test]
    fn room_description_lists_occupants() {
        let req = request("look");
        let text = TemplateNarrator::new(NarratorTone::Grim).describe_room(&req.room).unwrap();
        assert!(text.contains("Shadow Rat"));
        assert!(text.contains("Chest"));
    }

    #[test]
    fn stair_rooms_get_stair_prose() {
        let room = Room::new(Position::new(2, 2, 0), RoomType::StairsDown);
        let text = TemplateNarrator::default().describe_room(&RoomView::of(&room)).unwrap();
        assert!(text.contains("down"));
    }

    #[test]
    fn tone_names_parse() {
        assert_eq!(NarratorTone::parse("GRIM"), Some(NarratorTone::Grim));
        assert_eq!(NarratorTone::parse(" wry"), Some(NarratorTone::Wry));
        assert_eq!(NarratorTone::parse("jolly"), None);
    }
}
