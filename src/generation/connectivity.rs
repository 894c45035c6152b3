//! # Connectivity Repair
//!
//! Guarantees every floor tile of a level can be walked to from the player
//! start using 4-directional moves.
//!
//! Repair is iterative: flood fill from the seed, bridge each stranded floor
//! component to the nearest reached tile with an L-shaped corridor, and repeat
//! until nothing is stranded. Diagonal contact alone never counts as connected.

use crate::game::{Grid, Position, TileKind};
use pathfinding::prelude::bfs_reach;
use std::collections::HashSet;

/// What a repair run had to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Flood fills performed, including the final clean one
    pub passes: u32,
    /// Corridors carved to rejoin stranded components
    pub bridges: u32,
    /// Wall tiles turned into floor
    pub cells_opened: u32,
}

/// Returns every floor position reachable from `seed` through floor tiles.
///
/// An empty set is returned when `seed` itself is not floor.
///
/// # Examples
///
/// ```
/// use delve::{flood_fill, Grid, Position};
///
/// let grid = Grid::from_ascii(&["#####", "#..##", "###.#"]);
/// let reached = flood_fill(&grid, Position::new(1, 1));
/// assert_eq!(reached.len(), 2); // (3, 2) only touches diagonally
/// ```
pub fn flood_fill(grid: &Grid, seed: Position) -> HashSet<Position> {
    if !grid.is_floor(seed) {
        return HashSet::new();
    }

    bfs_reach(seed, |&pos: &Position| floor_neighbours(grid, pos)).collect()
}

fn floor_neighbours(grid: &Grid, pos: Position) -> Vec<Position> {
    pos.cardinal_adjacent_positions()
        .into_iter()
        .filter(|&next| grid.is_floor(next))
        .collect()
}

/// Groups floor tiles outside `reached` into 4-connected components,
/// discovered in row-major order.
pub fn stranded_components(grid: &Grid, reached: &HashSet<Position>) -> Vec<Vec<Position>> {
    let mut assigned: HashSet<Position> = HashSet::new();
    let mut components = Vec::new();

    for pos in grid.floor_positions() {
        if reached.contains(&pos) || assigned.contains(&pos) {
            continue;
        }

        let mut component: Vec<Position> = flood_fill(grid, pos).into_iter().collect();
        component.sort_by_key(|p| (p.y, p.x));
        assigned.extend(component.iter().copied());
        components.push(component);
    }

    components
}

/// Reconnects every floor tile to `seed`, carving corridors as needed.
///
/// If `seed` is a wall it is opened first, so the guarantee always holds.
///
/// # Examples
///
/// ```
/// use delve::{flood_fill, repair, Grid, Position};
///
/// let mut grid = Grid::from_ascii(&[
///     "##########",
///     "#...######",
///     "#...###..#",
///     "##########",
/// ]);
/// let report = repair(&mut grid, Position::new(1, 1));
///
/// assert_eq!(report.bridges, 1);
/// assert_eq!(flood_fill(&grid, Position::new(1, 1)).len(), grid.floor_count());
/// ```
pub fn repair(grid: &mut Grid, seed: Position) -> RepairReport {
    let mut report = RepairReport::default();

    if grid.get(seed) == Some(TileKind::Wall) {
        grid.set(seed, TileKind::Floor);
        report.cells_opened += 1;
    }

    loop {
        report.passes += 1;

        let reached = flood_fill(grid, seed);
        let stranded = stranded_components(grid, &reached);
        if stranded.is_empty() || reached.is_empty() {
            break;
        }

        // Row-major scan keeps tie-breaking independent of hash order
        let reached_ordered: Vec<Position> =
            Grid::positions().filter(|pos| reached.contains(pos)).collect();

        for component in &stranded {
            let anchor = component_anchor(component);
            let Some(target) = reached_ordered
                .iter()
                .copied()
                .min_by_key(|pos| pos.manhattan_distance(anchor))
            else {
                continue;
            };

            report.cells_opened += carve_bridge(grid, anchor, target);
            report.bridges += 1;
        }
    }

    report
}

/// Picks the component tile closest to the component's centroid.
fn component_anchor(component: &[Position]) -> Position {
    let count = component.len().max(1) as f64;
    let cx = component.iter().map(|p| p.x as f64).sum::<f64>() / count;
    let cy = component.iter().map(|p| p.y as f64).sum::<f64>() / count;
    let centroid = Position::new(cx.round() as i32, cy.round() as i32);

    component
        .iter()
        .copied()
        .min_by_key(|pos| pos.manhattan_distance(centroid))
        .unwrap_or(centroid)
}

/// Carves an L-shaped floor path between two tiles, returning how many walls
/// were opened.
fn carve_bridge(grid: &mut Grid, from: Position, to: Position) -> u32 {
    let horizontal = (from.x.min(to.x)..=from.x.max(to.x)).map(|x| Position::new(x, from.y));
    let vertical = (from.y.min(to.y)..=from.y.max(to.y)).map(|y| Position::new(to.x, y));

    let mut opened = 0;
    for pos in horizontal.chain(vertical) {
        if grid.get(pos) == Some(TileKind::Wall) {
            grid.set(pos, TileKind::Floor);
            opened += 1;
        }
    }
    opened
}
