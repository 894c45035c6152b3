//! # Autoplay Module
//!
//! Picks moves automatically, for headless runs and soak tests.
//!
//! The strategy is deliberately simple: walk the shortest path to the nearest
//! gold that does not pass through a monster, and wander at random when no
//! such path exists.

use crate::generation::utils::create_rng;
use crate::{Direction, GameState, GameStatus, Position};
use pathfinding::prelude::bfs;
use rand::{rngs::StdRng, seq::SliceRandom};

/// Returns the shortest monster-free path from the player to the nearest gold.
///
/// The path starts at the player's position and ends on a gold tile.
pub fn path_to_nearest_gold(state: &GameState) -> Option<Vec<Position>> {
    let grid = state.grid();
    let start = state.player().position;

    bfs(
        &start,
        |&pos: &Position| {
            pos.cardinal_adjacent_positions()
                .into_iter()
                .filter(|&next| grid.is_floor(next) && !state.monster_at(next))
                .collect::<Vec<_>>()
        },
        |&pos| state.gold_at(pos),
    )
}

/// First step of [`path_to_nearest_gold`], if any.
pub fn next_step(state: &GameState) -> Option<Direction> {
    let path = path_to_nearest_gold(state)?;
    let (&from, &to) = (path.first()?, path.get(1)?);
    Direction::try_from(to - from).ok()
}

/// Picks a random direction onto open floor, avoiding monsters when possible.
///
/// Falls back to bumping a monster when the player is boxed in by them.
pub fn wander_step(state: &GameState, rng: &mut StdRng) -> Option<Direction> {
    let position = state.player().position;
    let open: Vec<Direction> = Direction::ALL
        .iter()
        .copied()
        .filter(|direction| state.grid().is_floor(position + direction.to_delta()))
        .collect();
    let safe: Vec<Direction> = open
        .iter()
        .copied()
        .filter(|direction| !state.monster_at(position + direction.to_delta()))
        .collect();

    safe.choose(rng).or_else(|| open.choose(rng)).copied()
}

/// Drives a session one move at a time.
#[derive(Debug, Clone)]
pub struct Autoplayer {
    rng: StdRng,
    /// Moves chosen by wandering because no gold was reachable
    pub wander_moves: u64,
}

impl Autoplayer {
    /// Creates an autoplayer whose wandering is seeded by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: create_rng(seed),
            wander_moves: 0,
        }
    }

    /// Chooses the next move, or `None` when input would be ignored or the
    /// player cannot move at all.
    pub fn next_move(&mut self, state: &GameState) -> Option<Direction> {
        if state.status() != GameStatus::InProgress {
            return None;
        }

        next_step(state).or_else(|| {
            self.wander_moves += 1;
            wander_step(state, &mut self.rng)
        })
    }
}
