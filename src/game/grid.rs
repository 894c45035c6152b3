//! # Tile Grid
//!
//! The fixed-size wall/floor map every level is played on.

use crate::{config, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Solid rock
    Wall,
    /// Walkable floor
    Floor,
}

impl TileKind {
    /// Whether entities may stand on this tile.
    pub fn is_passable(self) -> bool {
        self == TileKind::Floor
    }

    /// Character used for text dumps.
    pub fn glyph(self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Floor => '.',
        }
    }
}

/// A `GRID_WIDTH` x `GRID_HEIGHT` matrix of tiles, stored row-major.
///
/// Border cells are ordinary cells; nothing guarantees a wall rim beyond what
/// generation produces.
///
/// # Examples
///
/// ```
/// use delve::{Grid, Position, TileKind};
///
/// let mut grid = Grid::new();
/// assert_eq!(grid.get(Position::new(3, 3)), Some(TileKind::Wall));
///
/// grid.set(Position::new(3, 3), TileKind::Floor);
/// assert!(grid.is_floor(Position::new(3, 3)));
/// assert_eq!(grid.get(Position::new(40, 0)), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    tiles: Vec<TileKind>,
}

impl Grid {
    pub const WIDTH: i32 = config::GRID_WIDTH;
    pub const HEIGHT: i32 = config::GRID_HEIGHT;

    /// Creates a grid filled entirely with walls.
    pub fn new() -> Self {
        Self::filled(TileKind::Wall)
    }

    /// Creates a grid with every tile set to `kind`.
    pub fn filled(kind: TileKind) -> Self {
        Self {
            tiles: vec![kind; (Self::WIDTH * Self::HEIGHT) as usize],
        }
    }

    /// Parses a text map using `#` for walls and anything else for floor.
    ///
    /// Rows shorter than the grid, and rows missing entirely, are padded with
    /// walls; characters beyond the grid are ignored. Handy for hand-built
    /// test levels.
    pub fn from_ascii(rows: &[&str]) -> Self {
        let mut grid = Self::new();
        for (y, row) in rows.iter().enumerate().take(Self::HEIGHT as usize) {
            for (x, ch) in row.chars().enumerate().take(Self::WIDTH as usize) {
                if ch != '#' {
                    grid.set(Position::new(x as i32, y as i32), TileKind::Floor);
                }
            }
        }
        grid
    }

    /// Checks whether a position lies inside the grid.
    pub fn in_bounds(pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < Self::WIDTH && pos.y < Self::HEIGHT
    }

    /// Checks whether a position lies on the outermost ring of cells.
    pub fn is_border(pos: Position) -> bool {
        Self::in_bounds(pos)
            && (pos.x == 0 || pos.y == 0 || pos.x == Self::WIDTH - 1 || pos.y == Self::HEIGHT - 1)
    }

    fn index(pos: Position) -> Option<usize> {
        Self::in_bounds(pos).then(|| (pos.y * Self::WIDTH + pos.x) as usize)
    }

    /// Gets the tile at a position, or `None` outside the grid.
    pub fn get(&self, pos: Position) -> Option<TileKind> {
        Self::index(pos).map(|idx| self.tiles[idx])
    }

    /// Sets a tile. Out-of-bounds writes are ignored and reported as `false`.
    pub fn set(&mut self, pos: Position, kind: TileKind) -> bool {
        match Self::index(pos) {
            Some(idx) => {
                self.tiles[idx] = kind;
                true
            }
            None => false,
        }
    }

    /// Whether the position is in bounds and walkable.
    pub fn is_floor(&self, pos: Position) -> bool {
        self.get(pos).is_some_and(TileKind::is_passable)
    }

    /// Iterates every position in row-major order.
    pub fn positions() -> impl Iterator<Item = Position> {
        (0..Self::HEIGHT).flat_map(|y| (0..Self::WIDTH).map(move |x| Position::new(x, y)))
    }

    /// Iterates every floor position in row-major order.
    pub fn floor_positions(&self) -> impl Iterator<Item = Position> + '_ {
        Self::positions().filter(move |&pos| self.is_floor(pos))
    }

    /// Number of floor tiles.
    pub fn floor_count(&self) -> usize {
        self.tiles.iter().filter(|tile| tile.is_passable()).count()
    }

    /// Returns the tiles as rows, for presentation layers.
    pub fn rows(&self) -> impl Iterator<Item = &[TileKind]> {
        self.tiles.chunks(Self::WIDTH as usize)
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows() {
            let line: String = row.iter().map(|tile| tile.glyph()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grid_is_all_wall() {
        let grid = Grid::new();
        assert_eq!(grid.floor_count(), 0);
        assert_eq!(Grid::positions().count(), 40 * 25);
    }

    #[test]
    fn test_bounds() {
        assert!(Grid::in_bounds(Position::new(0, 0)));
        assert!(Grid::in_bounds(Position::new(39, 24)));
        assert!(!Grid::in_bounds(Position::new(40, 24)));
        assert!(!Grid::in_bounds(Position::new(39, 25)));
        assert!(!Grid::in_bounds(Position::new(-1, 3)));
    }

    #[test]
    fn test_border_detection() {
        assert!(Grid::is_border(Position::new(0, 10)));
        assert!(Grid::is_border(Position::new(39, 10)));
        assert!(Grid::is_border(Position::new(10, 24)));
        assert!(!Grid::is_border(Position::new(1, 1)));
        assert!(!Grid::is_border(Position::new(-1, 0)));
    }

    #[test]
    fn test_out_of_bounds_set_is_ignored() {
        let mut grid = Grid::new();
        assert!(!grid.set(Position::new(50, 50), TileKind::Floor));
        assert_eq!(grid.floor_count(), 0);
        assert!(!grid.is_floor(Position::new(50, 50)));
    }

    #[test]
    fn test_from_ascii_and_display() {
        let grid = Grid::from_ascii(&["####", "#..#", "####"]);
        assert!(grid.is_floor(Position::new(1, 1)));
        assert!(grid.is_floor(Position::new(2, 1)));
        assert!(!grid.is_floor(Position::new(3, 1)));
        assert_eq!(grid.floor_count(), 2);

        let text = grid.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 25);
        assert_eq!(lines[1].len(), 40);
        assert!(lines[1].starts_with("#..#"));
    }
}
