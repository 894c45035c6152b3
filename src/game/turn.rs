//! # Turn Engine
//!
//! Resolves a single directional input into the full turn: the player's
//! step (or bump, or pickup), one monster step, and the terminal check.

use crate::generation::LevelProfile;
use crate::{Depth, Direction, GameState, GameStatus, Grid, Monster, Player, Position};
use log::trace;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// What a move amounted to, from the presentation layer's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// Player stepped onto an empty floor tile
    Moved,
    /// Wall or map edge; nothing happened
    Blocked,
    /// Player walked into a monster and stayed put
    Damaged,
    /// Player stepped onto gold and picked it up
    PickedUp,
    /// The last gold was collected this turn
    LevelCleared,
    /// Hit points reached zero this turn
    Died,
    /// The level is not in progress; input discarded
    Ignored,
}

/// Who dealt damage to the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DamageSource {
    /// Player walked into a monster
    Bump,
    /// A monster stepped into the player
    Monster,
}

/// Something that happened during a turn, in order.
///
/// Audio and visual layers key their feedback off these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerMoved { from: Position, to: Position },
    PlayerBlocked { at: Position },
    MonsterBumped { at: Position },
    GoldCollected { at: Position, remaining: usize },
    PlayerDamaged { amount: i32, source: DamageSource, hit_points: i32 },
    MonsterMoved { from: Position, to: Position },
    LevelCleared { level: Depth },
    PlayerDied { level: Depth },
}

/// Result of resolving one move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReport {
    pub outcome: MoveOutcome,
    /// Gold was picked up this turn (even if the outcome is `LevelCleared`)
    pub picked_up_gold: bool,
    /// Total damage the player took this turn
    pub damage_taken: i32,
    pub events: Vec<GameEvent>,
}

impl TurnReport {
    fn new(outcome: MoveOutcome) -> Self {
        Self {
            outcome,
            picked_up_gold: false,
            damage_taken: 0,
            events: Vec::new(),
        }
    }

    fn damage(&mut self, player: &mut Player, amount: i32, source: DamageSource) {
        let taken = player.take_damage(amount);
        self.damage_taken += taken;
        self.events.push(GameEvent::PlayerDamaged {
            amount: taken,
            source,
            hit_points: player.hit_points,
        });
    }
}

/// Stateless turn resolution over a [`GameState`].
pub struct TurnEngine;

impl TurnEngine {
    /// Resolves one player move.
    ///
    /// Order of play:
    /// 1. A move off the map or into a wall is `Blocked`; nothing else happens.
    /// 2. Moving into a monster deals bump damage; the player stays put.
    /// 3. Moving onto gold collects it.
    /// 4. Otherwise the player simply moves.
    /// 5. Every monster then gets a chance to step; stepping into the player
    ///    deals monster damage instead of moving.
    /// 6. Death wins over clearing the level when both happen at once.
    ///
    /// Input is ignored unless the level is in progress.
    pub fn resolve_move(state: &mut GameState, direction: Direction) -> TurnReport {
        if state.status != GameStatus::InProgress {
            return TurnReport::new(MoveOutcome::Ignored);
        }

        let profile = LevelProfile::new(state.depth);
        let from = state.player.position;
        let target = from + direction.to_delta();

        if !state.grid.is_floor(target) {
            let mut report = TurnReport::new(MoveOutcome::Blocked);
            report.events.push(GameEvent::PlayerBlocked { at: target });
            return report;
        }

        state.player.hit = false;
        state.turn_number += 1;

        let mut report = if state.monster_at(target) {
            let mut report = TurnReport::new(MoveOutcome::Damaged);
            report.events.push(GameEvent::MonsterBumped { at: target });
            report.damage(&mut state.player, profile.bump_damage(), DamageSource::Bump);
            report
        } else if let Some(index) = state.gold.iter().position(|gold| gold.position == target) {
            state.gold.swap_remove(index);
            state.player.gold += 1;
            state.player.position = target;

            let mut report = TurnReport::new(MoveOutcome::PickedUp);
            report.picked_up_gold = true;
            report.events.push(GameEvent::PlayerMoved { from, to: target });
            report.events.push(GameEvent::GoldCollected {
                at: target,
                remaining: state.gold.len(),
            });
            report
        } else {
            state.player.position = target;
            let mut report = TurnReport::new(MoveOutcome::Moved);
            report.events.push(GameEvent::PlayerMoved { from, to: target });
            report
        };

        Self::step_monsters(state, &profile, &mut report);
        Self::evaluate_terminal(state, &mut report);

        trace!(
            "Turn {}: {:?} {:?} -> {:?} (hp {})",
            state.turn_number,
            direction,
            from,
            report.outcome,
            state.player.hit_points
        );

        report
    }

    /// Gives each monster, in order, one chance to take a random step.
    fn step_monsters(state: &mut GameState, profile: &LevelProfile, report: &mut TurnReport) {
        let GameState {
            grid,
            monsters,
            player,
            rng,
            ..
        } = state;
        let move_chance = profile.monster_move_chance();

        for index in 0..monsters.len() {
            if !rng.gen_bool(move_chance) {
                continue;
            }

            let direction = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
            let from = monsters[index].position;
            let target = from + direction.to_delta();

            if !can_monster_enter(grid, monsters, index, target) {
                continue;
            }

            if target == player.position {
                report.damage(player, profile.monster_damage(), DamageSource::Monster);
                continue;
            }

            monsters[index].position = target;
            report.events.push(GameEvent::MonsterMoved { from, to: target });
        }
    }

    fn evaluate_terminal(state: &mut GameState, report: &mut TurnReport) {
        if !state.player.is_alive() {
            report.outcome = MoveOutcome::Died;
            report.events.push(GameEvent::PlayerDied { level: state.depth });
            state.enter_defeated();
        } else if state.gold.is_empty() {
            report.outcome = MoveOutcome::LevelCleared;
            report.events.push(GameEvent::LevelCleared { level: state.depth });
            state.enter_level_cleared();
        }
    }
}

/// A monster may step onto in-bounds floor not held by another monster.
fn can_monster_enter(grid: &Grid, monsters: &[Monster], index: usize, target: Position) -> bool {
    grid.is_floor(target)
        && !monsters
            .iter()
            .enumerate()
            .any(|(other, monster)| other != index && monster.position == target)
}
