//! Contracts for the external intent-extraction and narration collaborators.
//!
//! Both collaborators are text generators that may be slow, unavailable, or
//! wrong. The engine only ever calls them through [`Guarded`], which bounds
//! every call by a timeout, and it treats every failure as a reason to fall
//! back rather than as an error. Narration is display-only: nothing the
//! narrator returns is parsed or fed back into the game state.

pub mod guard;
pub mod offline;

pub use guard::Guarded;
pub use offline::{KeywordInterpreter, NarratorTone, TemplateNarrator};

use dv_core::{Attributes, Capability, Player, Position, Room, RoomType};
use dv_mechanics::{ActionType, AppliedDelta, Classification, RejectionReason};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a collaborator call produced nothing usable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    /// No answer within the configured timeout.
    #[error("no response within {0} ms")]
    Timeout(u64),
    /// The backend refused or could not be reached.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    /// The worker stopped without answering.
    #[error("collaborator worker disconnected")]
    Disconnected,
}

/// What the interpreter is told about the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerView {
    /// Character name.
    pub name: String,
    /// Character level.
    pub level: u32,
    /// Current HP.
    pub hp: u32,
    /// Maximum HP.
    pub max_hp: u32,
    /// Attribute scores.
    pub attributes: Attributes,
    /// Names of carried items.
    pub inventory: Vec<String>,
    /// Capabilities granted by equipped items.
    pub capabilities: Vec<Capability>,
}

impl PlayerView {
    /// Summarize a player.
    pub fn of(player: &Player) -> Self {
        Self {
            name: player.name.clone(),
            level: player.level,
            hp: player.hp(),
            max_hp: player.max_hp(),
            attributes: player.attributes,
            inventory: player
                .inventory()
                .filter_map(|(id, _)| player.item(id).map(|item| item.name.clone()))
                .collect(),
            capabilities: player.capabilities().into_iter().collect(),
        }
    }
}

/// What the collaborators are told about a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomView {
    /// Where the room is.
    pub position: Position,
    /// The room type.
    pub room_type: RoomType,
    /// Current description, possibly empty.
    pub description: String,
    /// Monster name, if any.
    pub monster: Option<String>,
    /// NPC name, if any.
    pub npc: Option<String>,
    /// Loose item names.
    pub items: Vec<String>,
    /// Hazard name, if any.
    pub hazard: Option<String>,
    /// Fixture names.
    pub features: Vec<String>,
}

impl RoomView {
    /// Summarize a room.
    pub fn of(room: &Room) -> Self {
        Self {
            position: room.position,
            room_type: room.room_type,
            description: room.description.clone(),
            monster: room.monster.as_ref().map(|m| m.name.clone()),
            npc: room.npc.as_ref().map(|n| n.name.clone()),
            items: room.items.iter().map(|i| i.name.clone()).collect(),
            hazard: room.hazard.clone(),
            features: room.features.clone(),
        }
    }

    /// Every name an action could target.
    pub fn target_names(&self) -> impl Iterator<Item = &str> {
        self.monster
            .iter()
            .chain(self.npc.iter())
            .chain(self.items.iter())
            .chain(self.hazard.iter())
            .chain(self.features.iter())
            .map(String::as_str)
    }
}

/// Request to turn free text into an intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentRequest {
    /// What the player typed.
    pub action_text: String,
    /// The acting player.
    pub player: PlayerView,
    /// The room the player stands in.
    pub room: RoomView,
}

/// Request to narrate a resolved (or rejected) action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NarrationRequest {
    /// The action category.
    pub action_type: ActionType,
    /// The action target.
    pub target: Option<String>,
    /// How the player went about it.
    pub method: String,
    /// Outcome bucket, if a check was rolled.
    pub classification: Option<Classification>,
    /// Check margin, if a check was rolled.
    pub margin: Option<i32>,
    /// Why the action was refused, if it was.
    pub rejection: Option<RejectionReason>,
    /// Changes that were applied.
    pub deltas: Vec<AppliedDelta>,
}

/// Turns free text into intent JSON.
///
/// Implementations return the raw response; the engine parses and checks it.
pub trait IntentExtractor: Send + Sync {
    /// Interpret one action.
    fn extract(&self, request: &IntentRequest) -> Result<String, CollaboratorError>;
}

/// Produces display prose. Its output never affects state.
pub trait Narrator: Send + Sync {
    /// Narrate an action result.
    fn narrate(&self, request: &NarrationRequest) -> Result<String, CollaboratorError>;

    /// Describe a room the player has just entered.
    fn describe_room(&self, room: &RoomView) -> Result<String, CollaboratorError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use dv_core::{Item, ItemKind, Monster};

    #[test]
    fn room_view_lists_targets() {
        let mut room = Room::new(Position::new(1, 1, 0), RoomType::Monster);
        room.monster = Some(Monster::new("Shadow Rat", 10, 3, 1));
        room.items.push(Item::new("rope", "Rope", ItemKind::Material));
        room.features.push("Altar".to_string());
        let view = RoomView::of(&room);
        let names: Vec<&str> = view.target_names().collect();
        assert_eq!(names, vec!["Shadow Rat", "Rope", "Altar"]);
    }

    #[test]
    fn player_view_lists_capabilities() {
        let mut player = Player::new("Ayla", Attributes::default());
        let ring = Item::new("lev", "Levitation Ring", ItemKind::Ring).with_capability(Capability::Fly);
        player.add_item(ring.clone(), 1);
        player.add_item(Item::new("rope", "Rope", ItemKind::Material), 2);
        player.equip(&ring.id);

        let view = PlayerView::of(&player);
        assert_eq!(view.inventory, vec!["Rope".to_string()]);
        assert_eq!(view.capabilities, vec![Capability::Fly]);
    }

    #[test]
    fn requests_serialize() {
        let request = NarrationRequest {
            action_type: ActionType::Social,
            target: None,
            method: "wave".to_string(),
            classification: Some(Classification::Failure),
            margin: Some(-3),
            rejection: None,
            deltas: Vec::new(),
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"social\""));
        assert!(json.contains("\"failure\""));
    }
}
