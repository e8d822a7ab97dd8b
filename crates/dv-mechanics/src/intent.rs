//! The structured action intent produced by interpreting free-form text.
//!
//! Intents arrive as JSON from an intent-extraction collaborator. Parsing is
//! strict about shape (an unknown `action_type` or a missing `valid` flag is
//! malformed) but deliberately lenient about `plausibility`: an absent value
//! parses as `None` so the validator can reject it instead of a default
//! silently standing in.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{MechError, MechResult};

/// The closed set of action categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Strike a creature.
    PhysicalAttack,
    /// Use something from the pack.
    UseItem,
    /// Climb, jump, sneak, or otherwise move within the room.
    Move,
    /// Examine, open, or manipulate an object.
    InteractObject,
    /// Talk, persuade, intimidate.
    Social,
    /// Act on the surroundings: break, push, search.
    EnvironmentAction,
    /// Cast or improvise magic.
    AttemptMagic,
}

impl ActionType {
    /// Every action type.
    pub const ALL: [ActionType; 7] = [
        Self::PhysicalAttack,
        Self::UseItem,
        Self::Move,
        Self::InteractObject,
        Self::Social,
        Self::EnvironmentAction,
        Self::AttemptMagic,
    ];

    /// The wire name, e.g. `physical_attack`.
    pub fn name(self) -> &'static str {
        match self {
            Self::PhysicalAttack => "physical_attack",
            Self::UseItem => "use_item",
            Self::Move => "move",
            Self::InteractObject => "interact_object",
            Self::Social => "social",
            Self::EnvironmentAction => "environment_action",
            Self::AttemptMagic => "attempt_magic",
        }
    }

    /// Parse a wire name.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        Self::ALL.into_iter().find(|t| t.name() == s)
    }
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A structured, not yet validated player action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionIntent {
    /// What kind of action this is.
    pub action_type: ActionType,
    /// Name of the monster, NPC, or object acted upon.
    #[serde(default)]
    pub target: Option<String>,
    /// How the player goes about it. Matched against keyword sets, never executed.
    #[serde(default)]
    pub method: String,
    /// Feasibility in `[0, 1]`. `None` when the interpreter omitted it.
    #[serde(default)]
    pub plausibility: Option<f64>,
    /// The interpreter's own feasibility verdict.
    pub valid: bool,
    /// Why the interpreter judged the action infeasible.
    #[serde(default)]
    pub reason_if_invalid: Option<String>,
    /// Inventory items the player claims to spend, by id or name.
    #[serde(default)]
    pub components_used: BTreeSet<String>,
}

impl ActionIntent {
    /// A feasible intent with no target, method, or components.
    pub fn new(action_type: ActionType, plausibility: f64) -> Self {
        Self {
            action_type,
            target: None,
            method: String::new(),
            plausibility: Some(plausibility),
            valid: true,
            reason_if_invalid: None,
            components_used: BTreeSet::new(),
        }
    }

    /// The deterministic stand-in used when interpretation fails.
    pub fn fallback(raw_text: &str, plausibility: f64) -> Self {
        Self::new(ActionType::EnvironmentAction, plausibility).with_method(raw_text.trim())
    }

    /// Set the target.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the method text.
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Claim an inventory item as consumed.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.components_used.insert(component.into());
        self
    }

    /// Mark the intent as infeasible.
    pub fn rejected(mut self, reason: impl Into<String>) -> Self {
        self.valid = false;
        self.reason_if_invalid = Some(reason.into());
        self
    }

    /// Parse a collaborator response.
    ///
    /// Markdown code fences around the object are tolerated. Blank targets
    /// and the strings `"none"`/`"null"` normalize to no target.
    pub fn from_json(raw: &str) -> MechResult<Self> {
        let body = strip_fences(raw);
        let mut intent: Self =
            serde_json::from_str(body).map_err(|e| MechError::MalformedIntent(e.to_string()))?;
        intent.target = intent.target.and_then(|t| {
            let t = t.trim();
            let empty = t.is_empty() || t.eq_ignore_ascii_case("none") || t.eq_ignore_ascii_case("null");
            (!empty).then(|| t.to_string())
        });
        Ok(intent)
    }

    /// Serialize for logs and collaborator requests.
    pub fn to_json(&self) -> MechResult<String> {
        serde_json::to_string(self).map_err(|e| MechError::MalformedIntent(e.to_string()))
    }
}

fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_end().strip_suffix("```"));
    inner.map_or(trimmed, str::trim)
}
