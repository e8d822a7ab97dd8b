//! Save files: a full game snapshot wrapped in a checksummed envelope.
//!
//! The envelope is `{format_version, checksum, snapshot}` where `checksum` is
//! the hex SHA-256 of the snapshot's compact JSON encoding. Every collection
//! in the model is ordered, so the encoding of a decoded snapshot is
//! byte-identical to the one that was sealed.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::dungeon::{Dungeon, StairDirection};
use crate::error::{CoreError, CoreResult};
use crate::player::Player;

/// Current envelope version. Files with any other version are rejected.
pub const FORMAT_VERSION: u32 = 1;

/// Everything needed to resume a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    /// The dungeon and all room occupants.
    pub dungeon: Dungeon,
    /// The player, including inventory and quests.
    pub player: Player,
    /// A stair prompt that was awaiting an answer.
    #[serde(default)]
    pub pending_stairs: Option<StairDirection>,
    /// Number of turns taken.
    #[serde(default)]
    pub turn: u64,
    /// Set once the boss has fallen.
    #[serde(default)]
    pub victory: bool,
}

impl GameSnapshot {
    /// Check cross-object invariants.
    pub fn validate(&self) -> CoreResult<()> {
        self.dungeon.validate()?;
        let pos = self.player.position;
        let room = self.dungeon.get_room(pos).map_err(|_| {
            CoreError::StateCorruption(format!("player position {pos} is outside the dungeon"))
        })?;
        if !self.player.is_consistent() {
            return Err(CoreError::StateCorruption(
                "player record is inconsistent".to_string(),
            ));
        }
        if let Some(direction) = self.pending_stairs {
            if room.room_type.stair_direction() != Some(direction) {
                return Err(CoreError::StateCorruption(format!(
                    "pending stairs {direction} but player stands in a {} room",
                    room.room_type
                )));
            }
        }
        Ok(())
    }
}

/// The on-disk envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFile {
    /// Envelope version.
    pub format_version: u32,
    /// Hex SHA-256 of the snapshot.
    pub checksum: String,
    /// The game state.
    pub snapshot: GameSnapshot,
}

/// Hex SHA-256 over the compact JSON encoding of a snapshot.
pub fn checksum(snapshot: &GameSnapshot) -> CoreResult<String> {
    let bytes = serde_json::to_vec(snapshot)?;
    let digest: [u8; 32] = Sha256::digest(&bytes).into();
    Ok(hex::encode(digest))
}

impl SaveFile {
    /// Wrap a snapshot, computing its checksum.
    pub fn seal(snapshot: GameSnapshot) -> CoreResult<Self> {
        let checksum = checksum(&snapshot)?;
        Ok(Self {
            format_version: FORMAT_VERSION,
            checksum,
            snapshot,
        })
    }

    /// Pretty JSON for writing to disk.
    pub fn to_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and verify a save file, returning the snapshot only if every check passes.
    pub fn open(json: &str) -> CoreResult<GameSnapshot> {
        let file: SaveFile = serde_json::from_str(json)
            .map_err(|e| CoreError::StateCorruption(format!("unreadable save file: {e}")))?;
        file.verify()?;
        Ok(file.snapshot)
    }

    /// Check version, checksum, and snapshot invariants.
    pub fn verify(&self) -> CoreResult<()> {
        if self.format_version != FORMAT_VERSION {
            return Err(CoreError::StateCorruption(format!(
                "unsupported save format version {} (expected {FORMAT_VERSION})",
                self.format_version
            )));
        }
        let actual = checksum(&self.snapshot)?;
        if actual != self.checksum {
            return Err(CoreError::StateCorruption(format!(
                "checksum mismatch: file says {}, contents hash to {actual}",
                self.checksum
            )));
        }
        self.snapshot.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{DungeonConfig, generate};
    use crate::item::{Capability, Item, ItemKind};
    use crate::player::{Attribute, Attributes};
    use crate::quest::{ObjectiveKind, Quest};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn snapshot(size: usize, levels: usize, seed: u64) -> GameSnapshot {
        let cfg = DungeonConfig::default().with_size(size).with_levels(levels);
        let dungeon = generate(&cfg, &mut StdRng::seed_from_u64(seed)).unwrap();
        let mut player = Player::new("Ayla", Attributes::default().with(Attribute::Wisdom, 13));
        player.add_item(
            Item::new("lev", "Levitation Ring", ItemKind::Ring).with_capability(Capability::Fly),
            1,
        );
        player.add_item(Item::new("rope", "Rope", ItemKind::Material), 3);
        player.equip(&"lev".into());
        player.gold = 17;
        player.quests.add(Quest::slay_boss("Orc Chieftain"));
        player.quests.advance(ObjectiveKind::Kill, "nobody");
        GameSnapshot {
            dungeon,
            player,
            pending_stairs: None,
            turn: 4,
            victory: false,
        }
    }

    #[test]
    fn sealed_file_opens() {
        let snap = snapshot(4, 3, 11);
        let json = SaveFile::seal(snap.clone()).unwrap().to_json().unwrap();
        assert_eq!(SaveFile::open(&json).unwrap(), snap);
    }

    #[test]
    fn tampering_is_detected() {
        let snap = snapshot(3, 2, 5);
        let mut file = SaveFile::seal(snap).unwrap();
        file.snapshot.player.gold = 9999;
        let json = file.to_json().unwrap();
        assert!(matches!(
            SaveFile::open(&json),
            Err(CoreError::StateCorruption(msg)) if msg.contains("checksum")
        ));
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut file = SaveFile::seal(snapshot(3, 1, 1)).unwrap();
        file.format_version = 99;
        let json = file.to_json().unwrap();
        assert!(matches!(
            SaveFile::open(&json),
            Err(CoreError::StateCorruption(_))
        ));
    }

    #[test]
    fn garbage_is_corruption_not_panic() {
        assert!(matches!(
            SaveFile::open("{ not json"),
            Err(CoreError::StateCorruption(_))
        ));
    }

    #[test]
    fn pending_stairs_must_match_room() {
        let mut snap = snapshot(3, 2, 2);
        snap.pending_stairs = Some(StairDirection::Down);
        assert!(snap.validate().is_err());

        snap.player.position = snap.dungeon.stair_position(0);
        assert!(snap.validate().is_ok());
    }

    proptest! {
        #[test]
        fn round_trip_any_depth(levels in 1usize..=5, size in 2usize..=6, seed in any::<u64>()) {
            let snap = snapshot(size, levels, seed);
            let json = SaveFile::seal(snap.clone()).unwrap().to_json().unwrap();
            let back = SaveFile::open(&json).unwrap();
            prop_assert_eq!(back, snap);
        }
    }
}
