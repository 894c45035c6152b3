//! # Generation Module
//!
//! Procedural content generation: room-and-corridor layouts, connectivity
//! repair, and gold/monster placement.
//!
//! Every generator draws from an injected [`StdRng`]; the same seed and depth
//! always yield the same level.

pub mod connectivity;
pub mod dungeon;
pub mod entities;

pub use connectivity::*;
pub use dungeon::*;
pub use entities::*;

use crate::game::{Depth, Grid, Position};
use crate::{DungeonError, DungeonResult};
use log::debug;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// Per-level scaling curves.
///
/// All difficulty knobs derive from the level number through these formulas,
/// which are fixed rather than configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelProfile {
    depth: Depth,
}

impl LevelProfile {
    /// Creates the profile for a level.
    pub fn new(depth: Depth) -> Self {
        Self { depth }
    }

    fn level(&self) -> u32 {
        self.depth.get()
    }

    /// Rooms before the random `0..4` bonus: `5 + level/5`.
    pub fn base_room_count(&self) -> u32 {
        5 + self.level() / 5
    }

    /// Room width before the random `0..10` bonus: `6 + level/8`.
    pub fn base_room_width(&self) -> i32 {
        6 + (self.level() / 8) as i32
    }

    /// Room height before the random `0..8` bonus: `4 + level/8`.
    pub fn base_room_height(&self) -> i32 {
        4 + (self.level() / 8) as i32
    }

    /// Corridor waypoints before the random `0..2` bonus: `level/10`.
    pub fn base_twists(&self) -> u32 {
        self.level() / 10
    }

    /// Chance for each interior floor tile to be walled over: `0.1 + (level/26)*0.2`.
    pub fn wall_density(&self) -> f64 {
        0.1 + (self.level() as f64 / 26.0) * 0.2
    }

    /// Nominal gold pickups: `6 + level*2`.
    pub fn gold_count(&self) -> usize {
        (6 + self.level() * 2) as usize
    }

    /// Nominal monsters: `3 + floor(level*1.3)`.
    pub fn monster_count(&self) -> usize {
        (3 + self.level() * 13 / 10) as usize
    }

    /// Chance each monster moves on a given turn: `0.65 + level*0.008`.
    pub fn monster_move_chance(&self) -> f64 {
        0.65 + self.level() as f64 * 0.008
    }

    /// Damage the player takes walking into a monster: `5 + level/3`.
    pub fn bump_damage(&self) -> i32 {
        5 + (self.level() / 3) as i32
    }

    /// Damage the player takes when a monster steps into them: `4 + level/4`.
    pub fn monster_damage(&self) -> i32 {
        4 + (self.level() / 4) as i32
    }

    /// Player hit point cap.
    pub fn max_hit_points(&self) -> i32 {
        crate::config::max_hit_points(self.level())
    }
}

/// A rectangular room laid down during generation.
///
/// Rooms only anchor corridor carving; they are not kept past generation
/// except for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Placement order, starting at zero
    pub id: u32,
    /// Top-left corner of the room
    pub top_left: Position,
    /// Width of the room in tiles
    pub width: i32,
    /// Height of the room in tiles
    pub height: i32,
}

impl Room {
    /// Creates a new room with the given parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Room, Position};
    ///
    /// let room = Room::new(1, Position::new(5, 5), 10, 8);
    /// assert_eq!(room.id, 1);
    /// assert_eq!(room.center(), Position::new(10, 9));
    /// ```
    pub fn new(id: u32, top_left: Position, width: i32, height: i32) -> Self {
        Self {
            id,
            top_left,
            width,
            height,
        }
    }

    /// Gets the bottom-right corner of the room.
    pub fn bottom_right(&self) -> Position {
        Position::new(
            self.top_left.x + self.width - 1,
            self.top_left.y + self.height - 1,
        )
    }

    /// Gets the center position of the room.
    pub fn center(&self) -> Position {
        Position::new(
            self.top_left.x + self.width / 2,
            self.top_left.y + self.height / 2,
        )
    }

    /// Gets all positions within this room.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (self.top_left.y..self.top_left.y + self.height).flat_map(move |y| {
            (self.top_left.x..self.top_left.x + self.width).map(move |x| Position::new(x, y))
        })
    }
}

/// Trait for procedural generators.
///
/// Generators are infallible for any valid [`Depth`]; `validate` lets callers
/// and tests assert the structural guarantees a generator promises.
pub trait Generator<T> {
    /// Generates content for a level using the provided random number generator.
    fn generate(&self, depth: Depth, rng: &mut StdRng) -> T;

    /// Validates that the generated content meets requirements.
    fn validate(&self, content: &T, depth: Depth) -> DungeonResult<()>;
}

/// Everything a level needs to start: the map plus its entities.
#[derive(Debug, Clone)]
pub struct GeneratedLevel {
    pub depth: Depth,
    pub grid: Grid,
    pub rooms: Vec<Room>,
    /// Center of the first room; always floor
    pub player_start: Position,
    pub gold: Vec<Position>,
    pub monsters: Vec<Position>,
    pub repair: RepairReport,
}

/// Runs the whole pipeline for one level: layout, repair, then entities.
///
/// # Examples
///
/// ```
/// use delve::{generate_level, Depth};
/// use delve::generation::utils::create_rng;
///
/// let mut rng = create_rng(7);
/// let level = generate_level(Depth::FIRST, &mut rng);
/// assert!(level.grid.is_floor(level.player_start));
/// assert!(level.gold.len() <= 8);
/// ```
pub fn generate_level(depth: Depth, rng: &mut StdRng) -> GeneratedLevel {
    let layout = RoomCorridorGenerator::new().generate(depth, rng);
    let (gold, monsters) = EntityPlacer::new().place(&layout.grid, depth, layout.player_start, rng);

    debug!(
        "Level {} generated: {} rooms, {} floor tiles, {} gold, {} monsters",
        depth,
        layout.rooms.len(),
        layout.grid.floor_count(),
        gold.len(),
        monsters.len()
    );

    GeneratedLevel {
        depth,
        grid: layout.grid,
        rooms: layout.rooms,
        player_start: layout.player_start,
        gold,
        monsters,
        repair: layout.repair,
    }
}

/// Utility functions for generation algorithms.
pub mod utils {
    use super::*;
    use rand::SeedableRng;

    /// Creates a seeded random number generator.
    pub fn create_rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    /// Validates that a grid meets basic requirements: some floor, and every
    /// floor tile reachable from `start`.
    pub fn validate_grid(grid: &Grid, start: Position) -> DungeonResult<()> {
        if !grid.is_floor(start) {
            return Err(DungeonError::GenerationFailed(format!(
                "Start {:?} is not a floor tile",
                start
            )));
        }

        let reached = flood_fill(grid, start);
        let stranded = grid.floor_count() - reached.len();
        if stranded > 0 {
            return Err(DungeonError::GenerationFailed(format!(
                "{} floor tiles unreachable from {:?}",
                stranded, start
            )));
        }

        Ok(())
    }
}
