//! Property tests for turn resolution over arbitrary move sequences.

use delve::{Direction, GameState, GameStatus, MoveOutcome};
use proptest::prelude::*;

fn direction_strategy() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::North),
        Just(Direction::South),
        Just(Direction::East),
        Just(Direction::West),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn random_moves_keep_state_valid(
        seed in any::<u64>(),
        moves in prop::collection::vec(direction_strategy(), 1..300),
    ) {
        let mut state = GameState::new(seed);

        for direction in moves {
            let before_gold = state.gold().len();
            let before_collected = state.player().gold;
            let before_position = state.player().position;

            let report = state.resolve_move(direction);

            // Bounds and positional invariants
            prop_assert!(state.check_invariants().is_ok(), "{:?}", state.check_invariants());
            prop_assert!(state.player().hit_points >= 0);
            prop_assert!(state.player().hit_points <= state.max_hit_points());

            // Gold only ever goes away, one piece per turn at most
            prop_assert!(state.gold().len() <= before_gold);
            prop_assert!(before_gold - state.gold().len() <= 1);
            prop_assert_eq!(report.picked_up_gold, state.gold().len() < before_gold);
            prop_assert_eq!(
                state.player().gold,
                before_collected + u32::from(report.picked_up_gold)
            );

            match report.outcome {
                MoveOutcome::Blocked | MoveOutcome::Ignored | MoveOutcome::Damaged => {
                    prop_assert_eq!(state.player().position, before_position);
                }
                MoveOutcome::Died => {
                    prop_assert_eq!(state.status(), GameStatus::Defeated);
                    prop_assert_eq!(state.player().hit_points, 0);
                }
                MoveOutcome::LevelCleared => {
                    prop_assert_eq!(state.status(), GameStatus::LevelCleared);
                    prop_assert!(state.gold().is_empty());
                }
                MoveOutcome::Moved | MoveOutcome::PickedUp => {
                    prop_assert_eq!(
                        state.player().position.manhattan_distance(before_position),
                        1
                    );
                }
            }

            if state.status().is_terminal() || state.status() == GameStatus::LevelCleared {
                break;
            }
        }
    }

    #[test]
    fn same_seed_same_moves_same_outcome(
        seed in any::<u64>(),
        moves in prop::collection::vec(direction_strategy(), 1..100),
    ) {
        let mut a = GameState::new(seed);
        let mut b = GameState::new(seed);

        for direction in moves {
            let ra = a.resolve_move(direction);
            let rb = b.resolve_move(direction);
            prop_assert_eq!(ra, rb);
        }
        prop_assert_eq!(a.snapshot(), b.snapshot());
    }

    #[test]
    fn blocked_moves_change_nothing(seed in any::<u64>(), direction in direction_strategy()) {
        let mut state = GameState::new(seed);
        let target = state.player().position + direction.to_delta();
        prop_assume!(!state.grid().is_floor(target));

        let before = state.snapshot();
        let report = state.resolve_move(direction);

        prop_assert_eq!(report.outcome, MoveOutcome::Blocked);
        prop_assert_eq!(state.snapshot(), before);
    }
}
