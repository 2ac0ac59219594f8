//! Scoring module - line-clear points and level progression
//!
//! Every cleared line is worth a flat 100 points regardless of level. The
//! level starts at the player's choice and rises with cumulative lines, but
//! never beyond [`MAX_LEVEL`](crate::types::MAX_LEVEL).

use crate::types::{fall_interval_ms, LINES_PER_LEVEL, MAX_LEVEL, MIN_LEVEL, POINTS_PER_LINE};

/// Points for clearing `lines` rows in one lock
pub fn line_clear_points(lines: u32) -> u32 {
    lines.saturating_mul(POINTS_PER_LINE)
}

/// Current level for a chosen base level and cumulative lines
///
/// `max(chosen, min(MAX_LEVEL, 1 + lines / LINES_PER_LEVEL))`
pub fn level_for(chosen_level: u32, lines_cleared: u32) -> u32 {
    let earned = (1 + lines_cleared / LINES_PER_LEVEL).min(MAX_LEVEL);
    chosen_level.max(earned)
}

/// Clamp a requested starting level into the playable range
pub fn clamp_chosen_level(level: u32) -> u32 {
    level.clamp(MIN_LEVEL, MAX_LEVEL)
}

/// Level and fall interval after `lines_cleared` total lines
pub fn progression(chosen_level: u32, lines_cleared: u32) -> (u32, u32) {
    let level = level_for(chosen_level, lines_cleared);
    (level, fall_interval_ms(level))
}
