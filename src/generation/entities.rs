//! # Entity Placement
//!
//! Scatters gold pickups and monsters over a finished layout.

use crate::config::{EDGE_MARGIN, MAX_PLACEMENT_ATTEMPTS};
use crate::game::{Depth, Grid, Position};
use crate::generation::LevelProfile;
use log::debug;
use rand::{rngs::StdRng, Rng};
use std::collections::HashSet;

/// Places gold and monsters by rejection sampling.
///
/// Each entity gets a bounded number of attempts; one that never finds a free
/// floor tile is dropped, so a cramped level ends up with fewer entities
/// rather than failing.
#[derive(Debug, Clone)]
pub struct EntityPlacer {
    /// Maximum attempts to place an entity before giving up on it
    pub max_placement_attempts: u32,
}

impl EntityPlacer {
    /// Creates a placer with the standard attempt cap.
    pub fn new() -> Self {
        Self {
            max_placement_attempts: MAX_PLACEMENT_ATTEMPTS,
        }
    }

    /// Places the level's gold, then its monsters.
    ///
    /// Samples stay at least `EDGE_MARGIN` cells from every edge and never
    /// land on a wall, on `player_start`, or on another entity of either kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Depth, EntityPlacer, Grid, Position, TileKind};
    /// use delve::generation::utils::create_rng;
    ///
    /// let grid = Grid::filled(TileKind::Floor);
    /// let start = Position::new(10, 10);
    /// let (gold, monsters) = EntityPlacer::new().place(&grid, Depth::FIRST, start, &mut create_rng(5));
    ///
    /// assert_eq!(gold.len(), 8);
    /// assert_eq!(monsters.len(), 4);
    /// assert!(!gold.contains(&start) && !monsters.contains(&start));
    /// ```
    pub fn place(
        &self,
        grid: &Grid,
        depth: Depth,
        player_start: Position,
        rng: &mut StdRng,
    ) -> (Vec<Position>, Vec<Position>) {
        let profile = LevelProfile::new(depth);
        let mut occupied: HashSet<Position> = HashSet::new();

        let gold = self.scatter(grid, profile.gold_count(), player_start, &mut occupied, rng);
        let monsters =
            self.scatter(grid, profile.monster_count(), player_start, &mut occupied, rng);

        if gold.len() < profile.gold_count() || monsters.len() < profile.monster_count() {
            debug!(
                "Level {} under-placed: {}/{} gold, {}/{} monsters",
                depth,
                gold.len(),
                profile.gold_count(),
                monsters.len(),
                profile.monster_count()
            );
        }

        (gold, monsters)
    }

    fn scatter(
        &self,
        grid: &Grid,
        count: usize,
        player_start: Position,
        occupied: &mut HashSet<Position>,
        rng: &mut StdRng,
    ) -> Vec<Position> {
        let mut placed = Vec::with_capacity(count);

        for _ in 0..count {
            if let Some(pos) = self.try_place(grid, player_start, occupied, rng) {
                occupied.insert(pos);
                placed.push(pos);
            }
        }

        placed
    }

    /// Attempts to find one free tile.
    fn try_place(
        &self,
        grid: &Grid,
        player_start: Position,
        occupied: &HashSet<Position>,
        rng: &mut StdRng,
    ) -> Option<Position> {
        for _ in 0..self.max_placement_attempts {
            let pos = Position::new(
                rng.gen_range(EDGE_MARGIN..Grid::WIDTH - EDGE_MARGIN),
                rng.gen_range(EDGE_MARGIN..Grid::HEIGHT - EDGE_MARGIN),
            );

            if grid.is_floor(pos) && pos != player_start && !occupied.contains(&pos) {
                return Some(pos);
            }
        }

        None // Failed to place entity after all attempts
    }
}

impl Default for EntityPlacer {
    fn default() -> Self {
        Self::new()
    }
}
