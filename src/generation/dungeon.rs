//! # Dungeon Generation
//!
//! Procedural dungeon layout generation using a room-and-corridor algorithm.
//!
//! Layouts are built in four passes:
//! 1. Rooms are dropped at random (overlaps allowed, they simply merge)
//! 2. Each room is joined to the previous one by a corridor with waypoint twists
//! 3. Wall noise is sprinkled over interior floor
//! 4. Connectivity repair reconnects anything the noise cut off

use crate::config::EDGE_MARGIN;
use crate::generation::{repair, utils, Generator, LevelProfile, RepairReport, Room};
use crate::game::{Depth, Grid, Position, TileKind};
use crate::{DungeonError, DungeonResult};
use log::debug;
use rand::{rngs::StdRng, Rng};

/// The raw map produced by [`RoomCorridorGenerator`], before entities.
#[derive(Debug, Clone)]
pub struct DungeonLayout {
    pub grid: Grid,
    pub rooms: Vec<Room>,
    /// Center of the first room; the connectivity seed and player start
    pub player_start: Position,
    pub repair: RepairReport,
}

/// Primary dungeon generator using room-and-corridor algorithm.
///
/// Rooms are connected strictly in placement order, never nearest-neighbour,
/// so corridors criss-cross the map and deeper levels get longer detours.
#[derive(Debug, Clone, Default)]
pub struct RoomCorridorGenerator;

impl RoomCorridorGenerator {
    /// Creates a new dungeon generator.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{Depth, Generator, RoomCorridorGenerator};
    /// use delve::generation::utils::create_rng;
    ///
    /// let generator = RoomCorridorGenerator::new();
    /// let layout = generator.generate(Depth::FIRST, &mut create_rng(1));
    /// assert!(generator.validate(&layout, Depth::FIRST).is_ok());
    /// ```
    pub fn new() -> Self {
        Self
    }

    /// Places and carves every room for the level.
    fn place_rooms(&self, grid: &mut Grid, profile: &LevelProfile, rng: &mut StdRng) -> Vec<Room> {
        let room_count = profile.base_room_count() + rng.gen_range(0..4);

        (0..room_count)
            .map(|room_id| {
                let room = self.generate_room(room_id, profile, rng);
                self.carve_room(grid, &room);
                room
            })
            .collect()
    }

    /// Rolls a room's size and position.
    ///
    /// Sizes are clamped so the room always fits inside the edge margin,
    /// which makes placement infallible.
    fn generate_room(&self, room_id: u32, profile: &LevelProfile, rng: &mut StdRng) -> Room {
        let max_width = Grid::WIDTH - 2 * EDGE_MARGIN;
        let max_height = Grid::HEIGHT - 2 * EDGE_MARGIN;

        let width = (profile.base_room_width() + rng.gen_range(0..10)).min(max_width);
        let height = (profile.base_room_height() + rng.gen_range(0..8)).min(max_height);

        let x = rng.gen_range(EDGE_MARGIN..=Grid::WIDTH - EDGE_MARGIN - width);
        let y = rng.gen_range(EDGE_MARGIN..=Grid::HEIGHT - EDGE_MARGIN - height);

        Room::new(room_id, Position::new(x, y), width, height)
    }

    /// Checks if a room sits entirely inside the edge margin.
    fn room_fits_in_margin(&self, room: &Room) -> bool {
        let bottom_right = room.bottom_right();
        room.top_left.x >= EDGE_MARGIN
            && room.top_left.y >= EDGE_MARGIN
            && bottom_right.x < Grid::WIDTH - EDGE_MARGIN
            && bottom_right.y < Grid::HEIGHT - EDGE_MARGIN
    }

    /// Carves out a room's full rectangle as floor.
    fn carve_room(&self, grid: &mut Grid, room: &Room) {
        for pos in room.positions() {
            grid.set(pos, TileKind::Floor);
        }
    }

    /// Connects each room to the one placed before it.
    fn connect_rooms(&self, grid: &mut Grid, rooms: &[Room], profile: &LevelProfile, rng: &mut StdRng) {
        for pair in rooms.windows(2) {
            let start = pair[0].center();
            let end = pair[1].center();
            let twists = profile.base_twists() + rng.gen_range(0..2);

            let mut cursor = start;
            for waypoint in self.corridor_waypoints(start, end, twists, rng) {
                self.carve_l_corridor(grid, cursor, waypoint);
                cursor = waypoint;
            }
        }
    }

    /// Computes the waypoints a corridor passes through, ending at `end`.
    ///
    /// Intermediate points interpolate linearly from `start` toward `end` and
    /// are jittered by up to one cell on each axis, staying off the border.
    fn corridor_waypoints(
        &self,
        start: Position,
        end: Position,
        twists: u32,
        rng: &mut StdRng,
    ) -> Vec<Position> {
        let mut waypoints = Vec::with_capacity(twists as usize + 1);
        let segments = (twists + 1) as f64;

        for step in 1..=twists {
            let t = step as f64 / segments;
            let x = start.x as f64 + (end.x - start.x) as f64 * t;
            let y = start.y as f64 + (end.y - start.y) as f64 * t;

            let jitter_x = rng.gen_range(-1..=1);
            let jitter_y = rng.gen_range(-1..=1);

            waypoints.push(Position::new(
                (x.round() as i32 + jitter_x).clamp(1, Grid::WIDTH - 2),
                (y.round() as i32 + jitter_y).clamp(1, Grid::HEIGHT - 2),
            ));
        }

        waypoints.push(end);
        waypoints
    }

    /// Carves a horizontal run along `start.y`, then a vertical run along `end.x`.
    fn carve_l_corridor(&self, grid: &mut Grid, start: Position, end: Position) {
        for x in start.x.min(end.x)..=start.x.max(end.x) {
            grid.set(Position::new(x, start.y), TileKind::Floor);
        }

        for y in start.y.min(end.y)..=start.y.max(end.y) {
            grid.set(Position::new(end.x, y), TileKind::Floor);
        }
    }

    /// Walls over random interior floor tiles.
    ///
    /// This can sever corridors; repair runs afterwards.
    fn apply_noise(&self, grid: &mut Grid, profile: &LevelProfile, rng: &mut StdRng) -> usize {
        let density = profile.wall_density();
        let mut walled = 0;

        for pos in Grid::positions() {
            if Grid::is_border(pos) || !grid.is_floor(pos) {
                continue;
            }
            if rng.gen_bool(density) {
                grid.set(pos, TileKind::Wall);
                walled += 1;
            }
        }

        walled
    }
}

impl Generator<DungeonLayout> for RoomCorridorGenerator {
    fn generate(&self, depth: Depth, rng: &mut StdRng) -> DungeonLayout {
        let profile = LevelProfile::new(depth);

        // Create empty level (all walls)
        let mut grid = Grid::new();

        let rooms = self.place_rooms(&mut grid, &profile, rng);
        self.connect_rooms(&mut grid, &rooms, &profile, rng);
        let walled = self.apply_noise(&mut grid, &profile, rng);

        // Room count is at least five, so the first room always exists
        let player_start = rooms
            .first()
            .map(Room::center)
            .unwrap_or_else(|| Position::new(Grid::WIDTH / 2, Grid::HEIGHT / 2));
        grid.set(player_start, TileKind::Floor);

        let report = repair(&mut grid, player_start);

        debug!(
            "Level {}: {} rooms, {} tiles walled by noise, repair {:?}",
            depth,
            rooms.len(),
            walled,
            report
        );

        DungeonLayout {
            grid,
            rooms,
            player_start,
            repair: report,
        }
    }

    fn validate(&self, layout: &DungeonLayout, _depth: Depth) -> DungeonResult<()> {
        if layout.rooms.is_empty() {
            return Err(DungeonError::GenerationFailed(
                "Layout has no rooms".to_string(),
            ));
        }

        if let Some(room) = layout.rooms.iter().find(|room| !self.room_fits_in_margin(room)) {
            return Err(DungeonError::GenerationFailed(format!(
                "Room {} crosses the edge margin",
                room.id
            )));
        }

        utils::validate_grid(&layout.grid, layout.player_start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::utils::create_rng;

    #[test]
    fn test_rooms_always_fit_margin() {
        let generator = RoomCorridorGenerator::new();
        let mut rng = create_rng(12345);

        for depth in Depth::all() {
            let profile = LevelProfile::new(depth);
            for room_id in 0..50 {
                let room = generator.generate_room(room_id, &profile, &mut rng);
                assert!(
                    generator.room_fits_in_margin(&room),
                    "room {:?} escaped margin on level {}",
                    room,
                    depth
                );
            }
        }
    }

    #[test]
    fn test_room_fits_in_margin() {
        let generator = RoomCorridorGenerator::new();

        let good_room = Room::new(1, Position::new(2, 2), 36, 21);
        let bad_room = Room::new(2, Position::new(1, 5), 10, 8);
        let too_wide = Room::new(3, Position::new(2, 2), 37, 5);

        assert!(generator.room_fits_in_margin(&good_room));
        assert!(!generator.room_fits_in_margin(&bad_room));
        assert!(!generator.room_fits_in_margin(&too_wide));
    }

    #[test]
    fn test_l_corridor_carving() {
        let generator = RoomCorridorGenerator::new();
        let mut grid = Grid::new();

        let start = Position::new(5, 5);
        let end = Position::new(15, 15);
        generator.carve_l_corridor(&mut grid, start, end);

        assert!(grid.is_floor(start));
        assert!(grid.is_floor(end));
        // Elbow sits at (end.x, start.y)
        assert!(grid.is_floor(Position::new(15, 5)));
        assert!(!grid.is_floor(Position::new(5, 15)));
        assert_eq!(grid.floor_count(), 21);
    }

    #[test]
    fn test_corridor_waypoints_end_at_target() {
        let generator = RoomCorridorGenerator::new();
        let mut rng = create_rng(7);

        let start = Position::new(4, 4);
        let end = Position::new(30, 20);

        for twists in 0..4 {
            let waypoints = generator.corridor_waypoints(start, end, twists, &mut rng);
            assert_eq!(waypoints.len(), twists as usize + 1);
            assert_eq!(*waypoints.last().unwrap(), end);

            for (step, waypoint) in waypoints.iter().take(twists as usize).enumerate() {
                assert!(!Grid::is_border(*waypoint));
                // Never more than a cell (plus rounding) away from the straight line
                let t = (step + 1) as f64 / (twists + 1) as f64;
                let ideal_x = 4.0 + 26.0 * t;
                assert!((waypoint.x as f64 - ideal_x).abs() <= 1.5);
            }
        }
    }

    #[test]
    fn test_noise_never_touches_border() {
        let generator = RoomCorridorGenerator::new();
        let mut grid = Grid::filled(TileKind::Floor);
        let profile = LevelProfile::new(Depth::LAST);

        let walled = generator.apply_noise(&mut grid, &profile, &mut create_rng(3));

        assert!(walled > 0);
        for pos in Grid::positions().filter(|&pos| Grid::is_border(pos)) {
            assert!(grid.is_floor(pos));
        }
    }

    #[test]
    fn test_generation_validates_on_every_level() {
        let generator = RoomCorridorGenerator::new();

        for depth in Depth::all() {
            let mut rng = create_rng(1000 + depth.get() as u64);
            let layout = generator.generate(depth, &mut rng);

            assert!(layout.rooms.len() >= LevelProfile::new(depth).base_room_count() as usize);
            assert_eq!(layout.player_start, layout.rooms[0].center());
            generator.validate(&layout, depth).unwrap();
        }
    }

    #[test]
    fn test_same_seed_same_grid() {
        let generator = RoomCorridorGenerator::new();
        let a = generator.generate(Depth::FIRST, &mut create_rng(42));
        let b = generator.generate(Depth::FIRST, &mut create_rng(42));
        let c = generator.generate(Depth::FIRST, &mut create_rng(43));

        assert_eq!(a.grid, b.grid);
        assert_eq!(a.rooms, b.rooms);
        assert_ne!(a.grid, c.grid);
    }
}
