//! Configuration for a game session.

use std::path::Path;

use dv_core::{CoreError, DungeonConfig};
use dv_mechanics::{ImpactTable, Progression, ThreatRules};
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;

/// Configuration for a session.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Seed for dungeon generation and dice.
    pub seed: u64,
    /// Dungeon shape and spawn chances.
    pub dungeon: DungeonConfig,
    /// Upper bound on any single collaborator call.
    pub collaborator_timeout_ms: u64,
    /// Plausibility given to the fallback intent.
    pub fallback_plausibility: f64,
    /// Reward and penalty recipes.
    pub impact: ImpactTable,
    /// XP curve.
    pub progression: Progression,
    /// Hazard saves and monster strikes.
    pub threats: ThreatRules,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            dungeon: DungeonConfig::default(),
            collaborator_timeout_ms: 5_000,
            fallback_plausibility: 0.5,
            impact: ImpactTable::default(),
            progression: Progression::default(),
            threats: ThreatRules::default(),
        }
    }
}

impl EngineConfig {
    /// Load from a JSON file and validate.
    pub fn from_json_file(path: &Path) -> EngineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text).map_err(CoreError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the dungeon configuration.
    pub fn with_dungeon(mut self, dungeon: DungeonConfig) -> Self {
        self.dungeon = dungeon;
        self
    }

    /// Set the dungeon size and depth.
    pub fn with_size(mut self, size: usize, num_levels: usize) -> Self {
        self.dungeon.size = size;
        self.dungeon.num_levels = num_levels;
        self
    }

    /// Set the collaborator timeout.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.collaborator_timeout_ms = timeout_ms;
        self
    }

    /// Set the impact table.
    pub fn with_impact(mut self, impact: ImpactTable) -> Self {
        self.impact = impact;
        self
    }

    /// Set the progression curve.
    pub fn with_progression(mut self, progression: Progression) -> Self {
        self.progression = progression;
        self
    }

    /// Set the hazard and monster-strike rules.
    pub fn with_threats(mut self, threats: ThreatRules) -> Self {
        self.threats = threats;
        self
    }

    /// Check every section.
    pub fn validate(&self) -> EngineResult<()> {
        self.dungeon.validate()?;
        self.impact.validate()?;
        self.progression.validate()?;
        self.threats.validate()?;
        if self.collaborator_timeout_ms == 0 {
            return Err(CoreError::InvalidConfig(
                "collaborator_timeout_ms must be positive".to_string(),
            )
            .into());
        }
        if !(0.1..=1.0).contains(&self.fallback_plausibility) {
            return Err(CoreError::InvalidConfig(format!(
                "fallback_plausibility must be within [0.1, 1], got {}",
                self.fallback_plausibility
            ))
            .into());
        }
        Ok(())
    }
}
