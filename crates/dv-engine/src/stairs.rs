//! The two-state stair prompt.
//!
//! Landing on a stair room by ordinary movement opens a prompt. The prompt
//! is answered by [`StairMachine::confirm`] or [`StairMachine::decline`];
//! any other command discards it through [`StairMachine::interrupt`].
//! Arriving by the stairs themselves never opens a prompt.

use dv_core::{RoomType, StairDirection};
use serde::{Deserialize, Serialize};

/// Where the stair prompt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StairState {
    /// No prompt open.
    #[default]
    Exploring,
    /// Waiting for a yes or no.
    AwaitingConfirmation {
        /// Where the stairs lead.
        direction: StairDirection,
    },
}

/// Tracks the stair prompt for one session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StairMachine {
    state: StairState,
}

impl StairMachine {
    /// Start in [`StairState::Exploring`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a machine with a prompt already open, as found in a save file.
    pub fn with_pending(direction: Option<StairDirection>) -> Self {
        let state = match direction {
            Some(direction) => StairState::AwaitingConfirmation { direction },
            None => StairState::Exploring,
        };
        Self { state }
    }

    /// The current state.
    pub fn state(&self) -> StairState {
        self.state
    }

    /// The direction awaiting an answer, if any.
    pub fn pending(&self) -> Option<StairDirection> {
        match self.state {
            StairState::Exploring => None,
            StairState::AwaitingConfirmation { direction } => Some(direction),
        }
    }

    /// Record arrival in a room by ordinary movement.
    ///
    /// Returns the direction if a prompt opened.
    pub fn arrive(&mut self, room_type: RoomType) -> Option<StairDirection> {
        let direction = room_type.stair_direction();
        self.state = match direction {
            Some(direction) => StairState::AwaitingConfirmation { direction },
            None => StairState::Exploring,
        };
        direction
    }

    /// Accept the prompt. Returns the direction to travel.
    pub fn confirm(&mut self) -> Option<StairDirection> {
        let direction = self.pending()?;
        self.state = StairState::Exploring;
        Some(direction)
    }

    /// Refuse the prompt. Returns the direction that was declined.
    pub fn decline(&mut self) -> Option<StairDirection> {
        let direction = self.pending()?;
        self.state = StairState::Exploring;
        Some(direction)
    }

    /// Discard the prompt because some other command arrived.
    ///
    /// Returns the discarded direction so the caller can refuse the command.
    pub fn interrupt(&mut self) -> Option<StairDirection> {
        self.decline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stairs_down_opens_prompt() {
        let mut m = StairMachine::new();
        assert_eq!(m.arrive(RoomType::StairsDown), Some(StairDirection::Down));
        assert_eq!(
            m.state(),
            StairState::AwaitingConfirmation {
                direction: StairDirection::Down
            }
        );
    }

    #[test]
    fn ordinary_room_keeps_exploring() {
        let mut m = StairMachine::new();
        assert_eq!(m.arrive(RoomType::Monster), None);
        assert_eq!(m.arrive(RoomType::Boss), None);
        assert_eq!(m.state(), StairState::Exploring);
    }

    #[test]
    fn confirm_returns_direction_once() {
        let mut m = StairMachine::new();
        m.arrive(RoomType::StairsUp);
        assert_eq!(m.confirm(), Some(StairDirection::Up));
        assert_eq!(m.confirm(), None);
        assert_eq!(m.state(), StairState::Exploring);
    }

    #[test]
    fn decline_and_interrupt_clear() {
        let mut m = StairMachine::new();
        m.arrive(RoomType::StairsDown);
        assert_eq!(m.decline(), Some(StairDirection::Down));
        assert_eq!(m.pending(), None);

        m.arrive(RoomType::StairsDown);
        assert_eq!(m.interrupt(), Some(StairDirection::Down));
        assert_eq!(m.interrupt(), None);
    }

    #[test]
    fn restored_prompt() {
        let m = StairMachine::with_pending(Some(StairDirection::Up));
        assert_eq!(m.pending(), Some(StairDirection::Up));
        assert_eq!(StairMachine::with_pending(None), StairMachine::new());
    }
}
