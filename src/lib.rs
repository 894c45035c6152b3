//! # Delve
//!
//! A procedural dungeon generator and turn-based survival loop.
//!
//! ## Architecture Overview
//!
//! The crate is a small synchronous core with a thin async wrapper for hosts
//! that need a real level-clear timer:
//!
//! - **Game State**: Player, monsters, gold and the level status machine
//! - **Turn Engine**: Resolves one directional move into movement, contact
//!   damage, pickups and a monster step
//! - **Generation System**: Rooms, twisting corridors, wall noise, strict
//!   connectivity repair and entity placement
//! - **Session**: A shared, mutex-guarded state with a cancellable dwell timer
//!
//! Every random decision draws from an explicitly injected [`rand::rngs::StdRng`],
//! so a seed fully determines a level and, given the same inputs, a whole run.

pub mod game;
pub mod generation;
pub mod rendering;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use rendering::*;

/// Core error type for the Delve engine.
///
/// Gameplay itself never fails; these cover the validated edges of the API.
#[derive(thiserror::Error, Debug)]
pub enum DungeonError {
    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Level number outside `1..=MAX_LEVEL`
    #[error("Invalid level: {0} (expected 1..={})", config::MAX_LEVEL)]
    InvalidLevel(u32),

    /// Position delta that is not a unit cardinal step
    #[error("Invalid direction delta: ({0}, {1})")]
    InvalidDirection(i32, i32),

    /// Generated content failed validation
    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}

/// Result type used throughout the Delve codebase.
pub type DungeonResult<T> = Result<T, DungeonError>;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Fixed game constants.
///
/// These are part of the game's contract and deliberately not configurable.
pub mod config {
    use std::time::Duration;

    /// Dungeon width in tiles
    pub const GRID_WIDTH: i32 = 40;

    /// Dungeon height in tiles
    pub const GRID_HEIGHT: i32 = 25;

    /// Deepest level; clearing it wins the game
    pub const MAX_LEVEL: u32 = 26;

    /// Distance kept free between generated rooms/entities and the grid edge
    pub const EDGE_MARGIN: i32 = 2;

    /// Attempts per entity before the placer gives up on it
    pub const MAX_PLACEMENT_ATTEMPTS: u32 = 500;

    /// How long a cleared level is shown before the next one starts
    pub const LEVEL_CLEAR_DWELL: Duration = Duration::from_millis(2000);

    /// Player hit point cap for a level: `min(25 + level * 5, 100)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::config::max_hit_points;
    ///
    /// assert_eq!(max_hit_points(1), 30);
    /// assert_eq!(max_hit_points(2), 35);
    /// assert_eq!(max_hit_points(26), 100);
    /// ```
    pub fn max_hit_points(level: u32) -> i32 {
        (25 + level as i32 * 5).min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hit_point_curve_caps_at_100() {
        assert_eq!(config::max_hit_points(15), 100);
        assert_eq!(config::max_hit_points(14), 95);
    }

    #[test]
    fn test_error_messages() {
        let err = DungeonError::InvalidLevel(27);
        assert_eq!(err.to_string(), "Invalid level: 27 (expected 1..=26)");

        let err = DungeonError::InvalidDirection(1, 1);
        assert_eq!(err.to_string(), "Invalid direction delta: (1, 1)");
    }
}
