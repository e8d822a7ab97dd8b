//! Journal storage and export.

use serde::{Deserialize, Serialize};

use super::entry::JournalEntry;

/// A chronological log of run events.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Journal {
    entries: Vec<JournalEntry>,
}

impl Journal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to the journal.
    pub fn append(&mut self, entry: JournalEntry) {
        self.entries.push(entry);
    }

    /// Get all entries.
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// The most recent `n` entries, oldest first.
    pub fn recent(&self, n: usize) -> &[JournalEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the journal is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// One line of plain text for an entry.
    pub fn render_line(entry: &JournalEntry) -> String {
        match entry {
            JournalEntry::RunStarted { player, seed, .. } => {
                format!("{player} enters the dungeon (seed {seed})")
            }
            JournalEntry::Moved { from, to, .. } => format!("Moved {from} -> {to}"),
            JournalEntry::StairsTaken {
                direction, new_z, ..
            } => format!("Took the stairs {direction} to level {}", new_z + 1),
            JournalEntry::StairsDeclined { direction, .. } => {
                format!("Stayed off the stairs leading {direction}")
            }
            JournalEntry::ActionResolved {
                text,
                classification,
                roll,
                total,
                difficulty,
                ..
            } => format!("\"{text}\": d20 {roll} -> {total} vs {difficulty}, {classification}"),
            JournalEntry::ActionRejected { text, reason, .. } => {
                format!("\"{text}\": rejected ({reason})")
            }
            JournalEntry::HazardSprung {
                hazard,
                avoided,
                damage,
                ..
            } => {
                if *avoided {
                    format!("Avoided the {hazard}")
                } else {
                    format!("Caught by the {hazard} for {damage} damage")
                }
            }
            JournalEntry::MonsterStruck {
                monster, hit, damage, ..
            } => {
                if *hit {
                    format!("The {monster} struck for {damage} damage")
                } else {
                    format!("Dodged the {monster}")
                }
            }
            JournalEntry::CollaboratorFallback {
                collaborator,
                cause,
                ..
            } => format!("{collaborator} fell back: {cause}"),
            JournalEntry::Saved { path, .. } => format!("Saved to {path}"),
            JournalEntry::Loaded { path, .. } => format!("Loaded {path}"),
            JournalEntry::RunEnded {
                victory, turns, ..
            } => {
                if *victory {
                    format!("Victory after {turns} turns")
                } else {
                    format!("Died after {turns} turns")
                }
            }
        }
    }

    /// Export the journal as markdown.
    pub fn export_markdown(&self) -> String {
        let mut out = String::from("# Delve Run Journal\n\n");
        for entry in &self.entries {
            let time = entry.timestamp().format("%H:%M:%S");
            match entry {
                JournalEntry::RunStarted { .. } => {
                    out.push_str(&format!("## {}\n\n", Self::render_line(entry)));
                }
                JournalEntry::ActionResolved { narration, .. } => {
                    out.push_str(&format!("- `{time}` **{}**\n", Self::render_line(entry)));
                    if !narration.is_empty() {
                        out.push_str(&format!("  > {narration}\n"));
                    }
                }
                JournalEntry::RunEnded { .. } => {
                    out.push_str(&format!("\n**{}**\n", Self::render_line(entry)));
                }
                _ => {
                    out.push_str(&format!("- `{time}` {}\n", Self::render_line(entry)));
                }
            }
        }
        out
    }

    /// Export the journal as plain text.
    pub fn export_text(&self) -> String {
        let mut out = String::from("Delve Run Journal\n=================\n\n");
        for entry in &self.entries {
            out.push_str(&Self::render_line(entry));
            out.push('\n');
        }
        out
    }
}
