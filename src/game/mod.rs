//! # Game Module
//!
//! Core game state management, the tile grid, and the turn engine.
//!
//! This module contains the fundamental building blocks of a Delve session:
//! - Positions, directions and validated level numbers
//! - The fixed-size wall/floor grid
//! - Game state and its level status machine
//! - The turn engine that resolves player moves
//! - A shared session wrapper with a cancellable level-clear timer

pub mod autoplay;
pub mod grid;
pub mod session;
pub mod state;
pub mod turn;

pub use autoplay::*;
pub use grid::*;
pub use session::*;
pub use state::*;
pub use turn::*;

use crate::{config, DungeonError, DungeonResult};
use serde::{Deserialize, Serialize};

/// Represents a 2D coordinate on the grid.
///
/// Coordinates are signed so that stepping off the edge produces a position
/// the grid can reject instead of wrapping.
///
/// # Examples
///
/// ```
/// use delve::Position;
///
/// let pos = Position::new(10, 5);
/// assert_eq!(pos.x, 10);
/// assert_eq!(pos.y, 5);
///
/// let neighbours = pos.cardinal_adjacent_positions();
/// assert_eq!(neighbours.len(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    /// Creates a new position with the given coordinates.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Calculates the Manhattan distance to another position.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::Position;
    ///
    /// let pos1 = Position::new(0, 0);
    /// let pos2 = Position::new(3, 4);
    /// assert_eq!(pos1.manhattan_distance(pos2), 7);
    /// ```
    pub fn manhattan_distance(self, other: Position) -> u32 {
        ((self.x - other.x).abs() + (self.y - other.y).abs()) as u32
    }

    /// Returns only the 4 cardinal adjacent positions (no diagonals).
    pub fn cardinal_adjacent_positions(self) -> Vec<Position> {
        Direction::ALL.iter().map(|&dir| self + dir.to_delta()).collect()
    }
}

impl std::ops::Add for Position {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl std::ops::Sub for Position {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// The four directions a player or monster can step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All cardinal directions, in the order monsters roll them.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    /// Converts a direction to a position delta.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Direction, Position};
    ///
    /// let delta = Direction::North.to_delta();
    /// assert_eq!(delta, Position::new(0, -1));
    /// ```
    pub fn to_delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, -1),
            Direction::South => Position::new(0, 1),
            Direction::East => Position::new(1, 0),
            Direction::West => Position::new(-1, 0),
        }
    }
}

impl TryFrom<Position> for Direction {
    type Error = DungeonError;

    /// Converts a unit cardinal delta back into a direction.
    fn try_from(delta: Position) -> DungeonResult<Self> {
        match (delta.x, delta.y) {
            (0, -1) => Ok(Direction::North),
            (0, 1) => Ok(Direction::South),
            (1, 0) => Ok(Direction::East),
            (-1, 0) => Ok(Direction::West),
            (x, y) => Err(DungeonError::InvalidDirection(x, y)),
        }
    }
}

/// A level number known to lie in `1..=MAX_LEVEL`.
///
/// Generation and scaling formulas take a `Depth` rather than a raw integer,
/// so they never have to handle an impossible level.
///
/// # Examples
///
/// ```
/// use delve::Depth;
///
/// let depth = Depth::new(3).unwrap();
/// assert_eq!(depth.get(), 3);
/// assert_eq!(depth.next().map(|d| d.get()), Some(4));
/// assert!(Depth::new(0).is_err());
/// assert!(Depth::LAST.next().is_none());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Depth(u32);

impl Depth {
    /// The first level of a run.
    pub const FIRST: Depth = Depth(1);

    /// The final level; clearing it wins.
    pub const LAST: Depth = Depth(config::MAX_LEVEL);

    /// Validates a raw level number.
    pub fn new(level: u32) -> DungeonResult<Self> {
        if (1..=config::MAX_LEVEL).contains(&level) {
            Ok(Self(level))
        } else {
            Err(DungeonError::InvalidLevel(level))
        }
    }

    /// Returns the raw level number.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Returns the following level, or `None` from the last one.
    pub fn next(self) -> Option<Depth> {
        Depth::new(self.0 + 1).ok()
    }

    /// Iterates every level from first to last.
    pub fn all() -> impl Iterator<Item = Depth> {
        (1..=config::MAX_LEVEL).map(Depth)
    }
}

impl TryFrom<u32> for Depth {
    type Error = DungeonError;

    fn try_from(level: u32) -> DungeonResult<Self> {
        Depth::new(level)
    }
}

impl From<Depth> for u32 {
    fn from(depth: Depth) -> u32 {
        depth.0
    }
}

impl std::fmt::Display for Depth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
