//! Action resolution rules for Delve.
//!
//! Turns an [`ActionIntent`] into state changes in four pure-ish steps:
//! [`validate`] decides whether the action may be attempted,
//! [`difficulty_for`] maps plausibility to a target, [`resolve_check`] rolls
//! a d20 plus the selected attribute modifier through an injectable
//! [`RollSource`], and [`apply_impact`] runs the table-driven recipe for the
//! outcome atomically. The [`threat`] module rolls the harm hazards and
//! monsters deal back.

pub mod attribute;
pub mod check;
pub mod dice;
pub mod difficulty;
pub mod error;
pub mod impact;
pub mod intent;
pub mod threat;
pub mod validate;

pub use attribute::{default_attribute, select_attribute};
pub use check::{Classification, ResolutionOutcome, resolve_check};
pub use dice::{Die, FixedRolls, RollSource};
pub use difficulty::difficulty_for;
pub use error::{MechError, MechResult};
pub use impact::{AppliedDelta, Effect, ImpactReport, ImpactTable, OutcomeRecipes, Progression, apply_impact};
pub use intent::{ActionIntent, ActionType};
pub use threat::{HazardOutcome, StrikeOutcome, ThreatRules, monster_strike, provokes, spring_hazard};
pub use validate::{RejectionReason, ValidationResult, validate};
