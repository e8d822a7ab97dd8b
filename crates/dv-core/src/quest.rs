//! Quests, objectives, and the player's quest log.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// What an objective asks the player to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// Defeat a named monster.
    Kill,
    /// Free or escort a named NPC.
    Rescue,
    /// Pick up a named item.
    Collect,
    /// Enter a named place.
    Reach,
    /// Use or examine a named object.
    Interact,
}

impl std::fmt::Display for ObjectiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Kill => "kill",
            Self::Rescue => "rescue",
            Self::Collect => "collect",
            Self::Reach => "reach",
            Self::Interact => "interact",
        };
        f.write_str(s)
    }
}

/// A single countable step of a quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestObjective {
    /// The kind of deed that counts.
    pub kind: ObjectiveKind,
    /// Name of the monster, NPC, item, or place involved.
    pub target: String,
    /// How many times the deed must happen.
    pub required: u32,
    /// How many times it has happened so far.
    #[serde(default)]
    pub current: u32,
    /// Set once `current` reaches `required`.
    #[serde(default)]
    pub completed: bool,
}

impl QuestObjective {
    /// Create an objective with no progress.
    pub fn new(kind: ObjectiveKind, target: impl Into<String>, required: u32) -> Self {
        Self {
            kind,
            target: target.into(),
            required: required.max(1),
            current: 0,
            completed: false,
        }
    }

    /// Returns true if a deed of `kind` against `target` counts toward this objective.
    pub fn matches(&self, kind: ObjectiveKind, target: &str) -> bool {
        !self.completed
            && self.kind == kind
            && self.target.to_lowercase() == target.trim().to_lowercase()
    }

    /// Record one deed. Returns true if the deed counted.
    pub fn progress(&mut self, kind: ObjectiveKind, target: &str) -> bool {
        if !self.matches(kind, target) {
            return false;
        }
        self.current = (self.current + 1).min(self.required);
        self.completed = self.current >= self.required;
        true
    }
}

/// A quest: a set of objectives and a reward paid once on completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    /// Stable identifier, unique within a quest log.
    pub id: String,
    /// Short title.
    pub title: String,
    /// Longer description shown in the quest list.
    #[serde(default)]
    pub description: String,
    /// Steps that must all complete.
    pub objectives: Vec<QuestObjective>,
    /// XP paid on completion.
    #[serde(default)]
    pub xp_reward: u64,
    /// Gold paid on completion.
    #[serde(default)]
    pub gold_reward: u64,
    /// Set once the reward has been paid.
    #[serde(default)]
    pub rewarded: bool,
}

impl Quest {
    /// Create a quest with no objectives and no reward.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            objectives: Vec::new(),
            xp_reward: 0,
            gold_reward: 0,
            rewarded: false,
        }
    }

    /// The main quest of every run: defeat the boss.
    pub fn slay_boss(boss_name: &str) -> Self {
        Self::new("main", format!("Slay the {boss_name}"))
            .with_description(format!(
                "The {boss_name} lurks at the bottom of the dungeon. End its reign."
            ))
            .with_objective(QuestObjective::new(ObjectiveKind::Kill, boss_name, 1))
            .with_reward(500, 100)
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append an objective.
    pub fn with_objective(mut self, objective: QuestObjective) -> Self {
        self.objectives.push(objective);
        self
    }

    /// Set the XP and gold reward.
    pub fn with_reward(mut self, xp: u64, gold: u64) -> Self {
        self.xp_reward = xp;
        self.gold_reward = gold;
        self
    }

    /// Returns true when every objective is complete.
    pub fn is_complete(&self) -> bool {
        !self.objectives.is_empty() && self.objectives.iter().all(|o| o.completed)
    }

    /// Record a deed against the first matching open objective.
    pub fn advance(&mut self, kind: ObjectiveKind, target: &str) -> bool {
        self.objectives
            .iter_mut()
            .find(|o| o.matches(kind, target))
            .is_some_and(|o| o.progress(kind, target))
    }
}

/// Reward released by a quest that just completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestReward {
    /// The completed quest.
    pub quest_id: String,
    /// XP to pay.
    pub xp: u64,
    /// Gold to pay.
    pub gold: u64,
}

/// All quests known to the player, keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestLog {
    quests: BTreeMap<String, Quest>,
}

impl QuestLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a quest, replacing any quest with the same id.
    pub fn add(&mut self, quest: Quest) {
        self.quests.insert(quest.id.clone(), quest);
    }

    /// Look up a quest by id.
    pub fn get(&self, id: &str) -> Option<&Quest> {
        self.quests.get(id)
    }

    /// All quests in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    /// Quests that still have open objectives.
    pub fn active(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values().filter(|q| !q.is_complete())
    }

    /// Number of quests in the log.
    pub fn len(&self) -> usize {
        self.quests.len()
    }

    /// Returns true if the log holds no quests.
    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }

    /// Returns true if some open objective would count a deed of `kind` against `target`.
    pub fn would_advance(&self, kind: ObjectiveKind, target: &str) -> bool {
        self.quests
            .values()
            .flat_map(|q| q.objectives.iter())
            .any(|o| o.matches(kind, target))
    }

    /// Record a deed against every quest it counts for.
    ///
    /// Returns the ids of quests whose progress changed.
    pub fn advance(&mut self, kind: ObjectiveKind, target: &str) -> Vec<String> {
        self.quests
            .values_mut()
            .filter_map(|q| q.advance(kind, target).then(|| q.id.clone()))
            .collect()
    }

    /// Mark every completed, unpaid quest as rewarded and return the rewards.
    pub fn claim_rewards(&mut self) -> Vec<QuestReward> {
        self.quests
            .values_mut()
            .filter(|q| q.is_complete() && !q.rewarded)
            .map(|q| {
                q.rewarded = true;
                QuestReward {
                    quest_id: q.id.clone(),
                    xp: q.xp_reward,
                    gold: q.gold_reward,
                }
            })
            .collect()
    }
}
