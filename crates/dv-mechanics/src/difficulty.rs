//! Mapping plausibility to a difficulty target.
//!
//! `difficulty = floor(20 - 15 * p)`, clamped to `[5, 20]`. This passes
//! through the anchors `1.0 -> 5`, `0.5 -> 12`, and `0.1 -> 18` (the last
//! after flooring 18.5).

/// Easiest possible target.
pub const MIN_DIFFICULTY: u32 = 5;
/// Hardest possible target.
pub const MAX_DIFFICULTY: u32 = 20;
/// Plausibility below which no roll is attempted.
pub const PLAUSIBILITY_FLOOR: f64 = 0.1;

/// Difficulty target for a plausibility score.
///
/// Non-finite input maps to the hardest target.
pub fn difficulty_for(plausibility: f64) -> u32 {
    if !plausibility.is_finite() {
        return MAX_DIFFICULTY;
    }
    let raw = (20.0 - 15.0 * plausibility).floor();
    raw.clamp(f64::from(MIN_DIFFICULTY), f64::from(MAX_DIFFICULTY)) as u32
}
