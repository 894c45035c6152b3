//! # Text Display
//!
//! Draws the map with entity overlays plus a one-line status bar.

use crate::{config, GameState, GameStatus, Grid, Position, StateSnapshot};
use std::collections::HashSet;

/// Glyph for the player.
pub const PLAYER_GLYPH: char = '@';
/// Glyph for a gold pickup.
pub const GOLD_GLYPH: char = '$';
/// Glyph for a monster.
pub const MONSTER_GLYPH: char = 'M';

/// Renders snapshots as text.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    /// Append the status line below the map
    pub show_status: bool,
}

impl TextRenderer {
    pub fn new() -> Self {
        Self { show_status: true }
    }

    /// Renders the map, then optionally the status line.
    pub fn render(&self, snapshot: &StateSnapshot) -> String {
        let mut out = self.render_map(snapshot);
        if self.show_status {
            out.push_str(&status_line(snapshot));
            out.push('\n');
        }
        out
    }

    /// Renders just the map. The player is drawn over anything else on its
    /// tile, then monsters, then gold.
    pub fn render_map(&self, snapshot: &StateSnapshot) -> String {
        let monsters: HashSet<Position> = snapshot.monsters.iter().copied().collect();
        let gold: HashSet<Position> = snapshot.gold.iter().copied().collect();
        let mut out = String::with_capacity(((Grid::WIDTH + 1) * Grid::HEIGHT) as usize);

        for (y, row) in snapshot.grid.rows().enumerate() {
            for (x, tile) in row.iter().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                let glyph = if pos == snapshot.player.position {
                    PLAYER_GLYPH
                } else if monsters.contains(&pos) {
                    MONSTER_GLYPH
                } else if gold.contains(&pos) {
                    GOLD_GLYPH
                } else {
                    tile.glyph()
                };
                out.push(glyph);
            }
            out.push('\n');
        }

        out
    }
}

/// One-line summary of level, health, gold and status.
pub fn status_line(snapshot: &StateSnapshot) -> String {
    let status = match snapshot.status {
        GameStatus::InProgress if snapshot.player.hit => "Hit!",
        GameStatus::InProgress => "Exploring",
        GameStatus::LevelCleared => "Level cleared",
        GameStatus::Defeated => "Defeated",
        GameStatus::Victorious => "Victorious",
    };

    format!(
        "Level {}/{}  HP {}/{}  Gold {} ({} left)  Turn {}  {}",
        snapshot.level,
        config::MAX_LEVEL,
        snapshot.player.hit_points,
        snapshot.player.max_hit_points,
        snapshot.player.gold,
        snapshot.gold.len(),
        snapshot.turn_number,
        status
    )
}

/// Renders a state with the default renderer.
pub fn render_text(state: &GameState) -> String {
    TextRenderer::new().render(&state.snapshot())
}
