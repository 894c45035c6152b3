//! # Game State Module
//!
//! Central game state for one play session.
//!
//! `GameState` owns the current level (grid, player, monsters, gold), the
//! level status machine and the random stream every later roll draws from.
//! It is mutated only through [`GameState::resolve_move`], the level-clear
//! transition entry points, and [`GameState::restart`].

use crate::generation::{generate_level, utils::create_rng, GeneratedLevel, LevelProfile};
use crate::{
    config, Depth, Direction, DungeonError, DungeonResult, GameEvent, Grid, MoveOutcome, Position,
    TurnEngine, TurnReport,
};
use log::{debug, info};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Where a level stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Player is exploring
    InProgress,
    /// Hit points reached zero; terminal until restart
    Defeated,
    /// All gold collected; waiting out the dwell before the next level
    LevelCleared,
    /// Final level cleared; terminal until restart
    Victorious,
}

impl GameStatus {
    /// Whether the session is over until an explicit restart.
    pub fn is_terminal(self) -> bool {
        matches!(self, GameStatus::Defeated | GameStatus::Victorious)
    }
}

/// The player character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub position: Position,
    pub hit_points: i32,
    pub max_hit_points: i32,
    /// Gold collected on the current level
    pub gold: u32,
    /// Set when the player took damage this turn, for feedback
    pub hit: bool,
}

impl Player {
    /// Creates a player at full health for the given level.
    pub fn new(position: Position, depth: Depth) -> Self {
        let max_hit_points = config::max_hit_points(depth.get());
        Self {
            position,
            hit_points: max_hit_points,
            max_hit_points,
            gold: 0,
            hit: false,
        }
    }

    /// Applies damage, clamping at zero. Returns the damage actually taken.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.hit_points;
        self.hit_points = (self.hit_points - amount.max(0)).clamp(0, self.max_hit_points);
        self.hit = true;
        before - self.hit_points
    }

    pub fn is_alive(&self) -> bool {
        self.hit_points > 0
    }
}

/// A monster. Monsters carry no stats of their own; damage scales with level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monster {
    pub position: Position,
}

/// A gold pickup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldPickup {
    pub position: Position,
}

/// Token that completes a pending level-clear transition.
///
/// Tickets are tied to the level they were issued on; once the session
/// restarts or moves on, an old ticket is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionTicket {
    epoch: u64,
    depth: Depth,
}

impl TransitionTicket {
    /// Level that was cleared.
    pub fn depth(&self) -> Depth {
        self.depth
    }
}

/// Game statistics tracking player progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Turns resolved (blocked and ignored moves excluded)
    pub turns: u64,
    /// Total steps taken
    pub steps_taken: u64,
    /// Moves into walls or off the map
    pub blocked_moves: u64,
    /// Gold collected across all levels
    pub gold_collected: u32,
    /// Total damage taken
    pub damage_taken: u64,
    /// Times the player walked into a monster
    pub monster_bumps: u32,
    /// Levels cleared
    pub levels_cleared: u32,
    /// Deepest level reached
    pub max_depth_reached: u32,
}

impl GameStatistics {
    /// Creates new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Updates statistics based on a game event.
    pub fn update_from_event(&mut self, event: &GameEvent) {
        match event {
            GameEvent::PlayerMoved { .. } => {
                self.steps_taken += 1;
            }
            GameEvent::PlayerBlocked { .. } => {
                self.blocked_moves += 1;
            }
            GameEvent::MonsterBumped { .. } => {
                self.monster_bumps += 1;
            }
            GameEvent::GoldCollected { .. } => {
                self.gold_collected += 1;
            }
            GameEvent::PlayerDamaged { amount, .. } => {
                self.damage_taken += *amount as u64;
            }
            GameEvent::LevelCleared { .. } => {
                self.levels_cleared += 1;
            }
            _ => {}
        }
    }
}

/// Read-only view of the state for presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub level: Depth,
    pub status: GameStatus,
    pub turn_number: u64,
    pub grid: Grid,
    pub player: Player,
    pub monsters: Vec<Position>,
    pub gold: Vec<Position>,
}

/// Central game state containing all data for the session.
#[derive(Debug, Clone)]
pub struct GameState {
    pub(crate) depth: Depth,
    pub(crate) grid: Grid,
    pub(crate) player: Player,
    pub(crate) monsters: Vec<Monster>,
    pub(crate) gold: Vec<GoldPickup>,
    pub(crate) status: GameStatus,
    pub(crate) rng: StdRng,
    pub(crate) turn_number: u64,
    pub(crate) statistics: GameStatistics,
    /// Bumped on every level install so stale tickets can be recognised
    epoch: u64,
    dwell: Duration,
    dwell_elapsed: Duration,
    seed: u64,
}

impl GameState {
    /// Starts a new session at level 1.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{GameState, GameStatus};
    ///
    /// let state = GameState::new(12345);
    /// assert_eq!(state.depth().get(), 1);
    /// assert_eq!(state.status(), GameStatus::InProgress);
    /// assert_eq!(state.player().hit_points, 30);
    /// assert_eq!(state.player().gold, 0);
    /// ```
    pub fn new(seed: u64) -> Self {
        Self::with_dwell(seed, config::LEVEL_CLEAR_DWELL)
    }

    /// Starts a new session with a custom level-clear dwell period.
    pub fn with_dwell(seed: u64, dwell: Duration) -> Self {
        let mut rng = create_rng(seed);
        let level = generate_level(Depth::FIRST, &mut rng);
        let mut state = Self::empty(level.depth, rng, seed, dwell);
        state.install_level(level);
        state
    }

    /// Creates a game state from a pre-built level.
    ///
    /// Used when a level is hand-made or generated elsewhere; the random
    /// stream for monster movement and later levels is seeded from `seed`.
    pub fn from_level(level: GeneratedLevel, seed: u64) -> DungeonResult<Self> {
        if !level.grid.is_floor(level.player_start) {
            return Err(DungeonError::InvalidState(format!(
                "Player start {:?} is not a floor tile",
                level.player_start
            )));
        }

        let mut state = Self::empty(level.depth, create_rng(seed), seed, config::LEVEL_CLEAR_DWELL);
        state.install_level(level);
        Ok(state)
    }

    fn empty(depth: Depth, rng: StdRng, seed: u64, dwell: Duration) -> Self {
        Self {
            depth,
            grid: Grid::new(),
            player: Player::new(Position::new(0, 0), depth),
            monsters: Vec::new(),
            gold: Vec::new(),
            status: GameStatus::InProgress,
            rng,
            turn_number: 0,
            statistics: GameStatistics::new(),
            epoch: 0,
            dwell,
            dwell_elapsed: Duration::ZERO,
            seed,
        }
    }

    /// Replaces the current level wholesale.
    fn install_level(&mut self, level: GeneratedLevel) {
        self.epoch += 1;
        self.depth = level.depth;
        self.player = Player::new(level.player_start, level.depth);
        self.monsters = level
            .monsters
            .into_iter()
            .map(|position| Monster { position })
            .collect();
        self.gold = level
            .gold
            .into_iter()
            .map(|position| GoldPickup { position })
            .collect();
        self.grid = level.grid;
        self.status = GameStatus::InProgress;
        self.dwell_elapsed = Duration::ZERO;
        self.statistics.max_depth_reached = self.statistics.max_depth_reached.max(self.depth.get());

        info!(
            "Entering level {} ({} gold, {} monsters, {} hp)",
            self.depth,
            self.gold.len(),
            self.monsters.len(),
            self.player.hit_points
        );

        // A level with nothing to collect is cleared on arrival
        if self.gold.is_empty() {
            self.enter_level_cleared();
        }
    }

    fn start_level(&mut self, depth: Depth) {
        let level = generate_level(depth, &mut self.rng);
        self.install_level(level);
    }

    /// Resolves one player move. See [`TurnEngine::resolve_move`].
    pub fn resolve_move(&mut self, direction: Direction) -> TurnReport {
        let report = TurnEngine::resolve_move(self, direction);
        if !matches!(report.outcome, MoveOutcome::Blocked | MoveOutcome::Ignored) {
            self.statistics.turns += 1;
        }
        for event in &report.events {
            self.statistics.update_from_event(event);
        }
        report
    }

    pub(crate) fn enter_level_cleared(&mut self) {
        self.status = GameStatus::LevelCleared;
        self.dwell_elapsed = Duration::ZERO;
        info!("Level {} cleared", self.depth);
    }

    pub(crate) fn enter_defeated(&mut self) {
        self.status = GameStatus::Defeated;
        info!("Player defeated on level {} after {} turns", self.depth, self.turn_number);
    }

    /// Returns the ticket for the pending level-clear transition, if any.
    pub fn pending_transition(&self) -> Option<TransitionTicket> {
        (self.status == GameStatus::LevelCleared).then_some(TransitionTicket {
            epoch: self.epoch,
            depth: self.depth,
        })
    }

    /// Finishes a level-clear transition once the dwell period has passed.
    ///
    /// Moves to the next level, or to `Victorious` after the last one.
    /// Returns `false` and changes nothing when the ticket is stale.
    pub fn complete_transition(&mut self, ticket: TransitionTicket) -> bool {
        if self.pending_transition() != Some(ticket) {
            debug!("Ignoring stale transition ticket for level {}", ticket.depth);
            return false;
        }

        match self.depth.next() {
            Some(next) => self.start_level(next),
            None => {
                self.status = GameStatus::Victorious;
                info!("Victory after {} turns", self.turn_number);
            }
        }
        true
    }

    /// Advances the dwell clock for hosts without their own timer.
    ///
    /// Returns `true` when this call completed the level-clear transition.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        let Some(ticket) = self.pending_transition() else {
            return false;
        };

        self.dwell_elapsed += elapsed;
        if self.dwell_elapsed < self.dwell {
            return false;
        }
        self.complete_transition(ticket)
    }

    /// Resets to level 1 with a fresh map, whatever the current status.
    ///
    /// Any outstanding transition ticket becomes stale.
    pub fn restart(&mut self) {
        info!("Restarting from level 1");
        self.turn_number = 0;
        self.statistics = GameStatistics::new();
        self.start_level(Depth::FIRST);
    }

    /// Current level.
    pub fn depth(&self) -> Depth {
        self.depth
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    pub fn gold(&self) -> &[GoldPickup] {
        &self.gold
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn turn_number(&self) -> u64 {
        self.turn_number
    }

    pub fn statistics(&self) -> &GameStatistics {
        &self.statistics
    }

    /// Hit point cap for the current level.
    pub fn max_hit_points(&self) -> i32 {
        LevelProfile::new(self.depth).max_hit_points()
    }

    /// Level-clear dwell period.
    pub fn dwell(&self) -> Duration {
        self.dwell
    }

    /// Seed the session was started with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Whether a monster stands on `pos`.
    pub fn monster_at(&self, pos: Position) -> bool {
        self.monsters.iter().any(|monster| monster.position == pos)
    }

    /// Whether a gold pickup lies on `pos`.
    pub fn gold_at(&self, pos: Position) -> bool {
        self.gold.iter().any(|gold| gold.position == pos)
    }

    /// Captures a serialisable view of the current state.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            level: self.depth,
            status: self.status,
            turn_number: self.turn_number,
            grid: self.grid.clone(),
            player: self.player.clone(),
            monsters: self.monsters.iter().map(|m| m.position).collect(),
            gold: self.gold.iter().map(|g| g.position).collect(),
        }
    }

    /// Serialises the current snapshot to JSON.
    pub fn snapshot_json(&self) -> DungeonResult<String> {
        serde_json::to_string(&self.snapshot()).map_err(DungeonError::from)
    }

    /// Checks the invariants that must hold between turns.
    pub fn check_invariants(&self) -> DungeonResult<()> {
        if !self.grid.is_floor(self.player.position) {
            return Err(DungeonError::InvalidState(format!(
                "Player at {:?} is not on floor",
                self.player.position
            )));
        }

        if self.player.hit_points < 0 || self.player.hit_points > self.max_hit_points() {
            return Err(DungeonError::InvalidState(format!(
                "Hit points {} outside 0..={}",
                self.player.hit_points,
                self.max_hit_points()
            )));
        }

        let mut seen = HashSet::new();
        for monster in &self.monsters {
            if !seen.insert(monster.position) {
                return Err(DungeonError::InvalidState(format!(
                    "Two monsters share {:?}",
                    monster.position
                )));
            }
            if monster.position == self.player.position {
                return Err(DungeonError::InvalidState(format!(
                    "Monster on player tile {:?}",
                    monster.position
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::RepairReport;

    fn open_level(depth: Depth, gold: Vec<Position>, monsters: Vec<Position>) -> GeneratedLevel {
        GeneratedLevel {
            depth,
            grid: Grid::from_ascii(&["#######", "#.....#", "#.....#", "#.....#", "#######"]),
            rooms: Vec::new(),
            player_start: Position::new(1, 1),
            gold,
            monsters,
            repair: RepairReport::default(),
        }
    }

    #[test]
    fn test_new_session_starts_at_level_one() {
        let state = GameState::new(12345);
        assert_eq!(state.depth(), Depth::FIRST);
        assert_eq!(state.status(), GameStatus::InProgress);
        assert_eq!(state.turn_number(), 0);
        assert_eq!(state.max_hit_points(), 30);
        assert!(!state.gold().is_empty());
        state.check_invariants().unwrap();
    }

    #[test]
    fn test_same_seed_same_session() {
        let a = GameState::new(777);
        let b = GameState::new(777);
        assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn test_from_level_rejects_wall_start() {
        let mut level = open_level(Depth::FIRST, vec![Position::new(3, 3)], vec![]);
        level.player_start = Position::new(0, 0);
        assert!(GameState::from_level(level, 1).is_err());
    }

    #[test]
    fn test_level_without_gold_is_cleared_on_arrival() {
        let state = GameState::from_level(open_level(Depth::FIRST, vec![], vec![]), 1).unwrap();
        assert_eq!(state.status(), GameStatus::LevelCleared);
        assert!(state.pending_transition().is_some());
    }

    #[test]
    fn test_transition_advances_level_and_resets_player() {
        let mut state = GameState::from_level(open_level(Depth::FIRST, vec![], vec![]), 1).unwrap();
        let ticket = state.pending_transition().unwrap();
        assert_eq!(ticket.depth(), Depth::FIRST);

        assert!(state.complete_transition(ticket));

        assert_eq!(state.depth().get(), 2);
        assert_eq!(state.player().hit_points, 35);
        assert_eq!(state.player().max_hit_points, 35);
        assert_eq!(state.player().gold, 0);
        assert!(!state.complete_transition(ticket), "ticket is single use");
    }

    #[test]
    fn test_transition_from_last_level_is_victory() {
        let mut state = GameState::from_level(open_level(Depth::LAST, vec![], vec![]), 1).unwrap();
        let ticket = state.pending_transition().unwrap();

        assert!(state.complete_transition(ticket));

        assert_eq!(state.status(), GameStatus::Victorious);
        assert_eq!(state.depth(), Depth::LAST);
        assert!(state.status().is_terminal());
        assert!(state.pending_transition().is_none());
    }

    #[test]
    fn test_restart_invalidates_pending_ticket() {
        let mut state = GameState::from_level(open_level(Depth::new(5).unwrap(), vec![], vec![]), 1)
            .unwrap();
        let ticket = state.pending_transition().unwrap();

        state.restart();
        assert_eq!(state.depth(), Depth::FIRST);

        assert!(!state.complete_transition(ticket));
        assert_eq!(state.depth(), Depth::FIRST);
    }

    #[test]
    fn test_tick_waits_for_dwell() {
        let mut state = GameState::from_level(open_level(Depth::FIRST, vec![], vec![]), 1).unwrap();

        assert!(!state.tick(Duration::from_millis(1500)));
        assert_eq!(state.status(), GameStatus::LevelCleared);

        assert!(state.tick(Duration::from_millis(500)));
        assert_eq!(state.depth().get(), 2);
    }

    #[test]
    fn test_tick_is_noop_while_playing() {
        let mut state = GameState::new(3);
        assert!(!state.tick(Duration::from_secs(60)));
        assert_eq!(state.depth(), Depth::FIRST);
    }

    #[test]
    fn test_player_damage_clamps() {
        let mut player = Player::new(Position::new(1, 1), Depth::FIRST);
        assert_eq!(player.take_damage(12), 12);
        assert_eq!(player.hit_points, 18);
        assert!(player.hit);
        assert_eq!(player.take_damage(50), 18);
        assert_eq!(player.hit_points, 0);
        assert!(!player.is_alive());
    }

    #[test]
    fn test_statistics_update() {
        let mut stats = GameStatistics::new();

        stats.update_from_event(&GameEvent::PlayerMoved {
            from: Position::new(0, 0),
            to: Position::new(1, 0),
        });
        stats.update_from_event(&GameEvent::PlayerDamaged {
            amount: 7,
            source: crate::DamageSource::Bump,
            hit_points: 23,
        });

        assert_eq!(stats.steps_taken, 1);
        assert_eq!(stats.damage_taken, 7);
    }

    #[test]
    fn test_turns_statistic_skips_blocked_and_ignored() {
        let mut state =
            GameState::from_level(open_level(Depth::FIRST, vec![Position::new(5, 3)], vec![]), 1)
                .unwrap();

        state.resolve_move(Direction::North);
        state.resolve_move(Direction::East);
        state.resolve_move(Direction::East);

        assert_eq!(state.statistics().turns, 2);
        assert_eq!(state.statistics().turns, state.turn_number());
        assert_eq!(state.statistics().blocked_moves, 1);

        let mut cleared = GameState::from_level(open_level(Depth::FIRST, vec![], vec![]), 1).unwrap();
        assert_eq!(cleared.resolve_move(Direction::East).outcome, MoveOutcome::Ignored);
        assert_eq!(cleared.statistics().turns, 0);
    }

    #[test]
    fn test_turns_statistic_tracks_long_run() {
        let mut state = GameState::new(12345);
        let moves = [Direction::East, Direction::South, Direction::West, Direction::North];

        for direction in moves.iter().cycle().take(200) {
            state.resolve_move(*direction);
        }

        assert_eq!(state.statistics().turns, state.turn_number());
    }

    #[test]
    fn test_snapshot_serialization() {
        let state = GameState::new(12345);
        let json = state.snapshot_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["level"], 1);
        assert_eq!(value["status"], "InProgress");

        let snapshot: StateSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot, state.snapshot());
    }

    #[test]
    fn test_invariant_check_catches_stacked_monsters() {
        let state = GameState::from_level(
            open_level(
                Depth::FIRST,
                vec![Position::new(5, 3)],
                vec![Position::new(3, 2), Position::new(3, 2)],
            ),
            1,
        )
        .unwrap();
        assert!(state.check_invariants().is_err());
    }
}
