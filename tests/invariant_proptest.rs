/// Property-based tests for the scoring state machine using proptest
///
/// Random walks through legal actions must never break the ball accounting,
/// the winner/loser bookkeeping or the turn rotation.
use piste_on_piste::core::{Action, BallQuery, GameConfig, GameState};
use piste_on_piste::history::StateSnapshot;
use piste_on_piste::rules::RulesEngine;
use proptest::prelude::*;

// Strategy for a game configuration: rack size and starting order
fn config_strategy() -> impl Strategy<Value = GameConfig> {
    (1u32..=15, any::<bool>(), any::<u64>()).prop_map(|(num_reds, randomize, seed)| {
        let config = GameConfig::new(["Ann", "Bo", "Cid"]).with_num_reds(num_reds);
        if randomize {
            config.randomized(seed)
        } else {
            config
        }
    })
}

// Strategy for a sequence of choices; each picks among the legal actions
fn choices_strategy() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(any::<usize>(), 1..=250)
}

fn check_invariants(state: &GameState) -> Result<(), TestCaseError> {
    let balls = state.num_balls(BallQuery::All);
    prop_assert_eq!(state.num_reds() + state.num_colors(), balls);
    prop_assert!(balls <= state.max_balls());
    prop_assert!(state.num_points() >= 0);

    let players = state.get_players();
    for (pos, player) in players.iter().enumerate() {
        prop_assert_eq!(player.pos(), pos);
        prop_assert!(!(player.is_winner() && player.is_loser()));
        prop_assert!(player.points() >= 0);
    }

    let winners = players.iter().filter(|p| p.is_winner()).count();
    let losers = players.iter().filter(|p| p.is_loser()).count();
    prop_assert!(winners <= 1 && losers <= 1);
    prop_assert_eq!(state.is_frame_over(), winners == 1 && losers == 1);

    if !state.is_frame_over() {
        prop_assert!(state.current_player().is_active());
        prop_assert!(!state.legal_actions().is_empty());
    } else {
        prop_assert!(state.frame_result().is_some());
        prop_assert!(state.is_legal(&Action::NewFrame));
    }

    Ok(())
}

fn walk(
    config: &GameConfig,
    choices: &[usize],
    mut visit: impl FnMut(&GameState, &Action, &GameState),
) {
    let mut state = GameState::new(config, 0);
    for &choice in choices {
        let legal = state.legal_actions();
        let action = legal[choice % legal.len()];
        let before = state.clone();
        state.apply(&action);
        visit(&before, &action, &state);
    }
}

proptest! {
    #[test]
    fn test_random_play_keeps_invariants(config in config_strategy(), choices in choices_strategy()) {
        let mut result = check_invariants(&GameState::new(&config, 0));
        walk(&config, &choices, |_, _, after| {
            if result.is_ok() {
                result = check_invariants(after);
            }
        });
        result?;
    }

    #[test]
    fn test_shots_never_add_points(config in config_strategy(), choices in choices_strategy()) {
        let mut violations = Vec::new();
        walk(&config, &choices, |before, action, after| {
            let shot = matches!(action, Action::PotBall(_) | Action::CommitFoul(_));
            if shot && !after.is_respot_black() && after.num_points() > before.num_points() {
                violations.push(*action);
            }
        });
        prop_assert!(violations.is_empty(), "points grew after {:?}", violations);
    }

    #[test]
    fn test_decided_players_stay_decided(config in config_strategy(), choices in choices_strategy()) {
        let mut violations = 0;
        walk(&config, &choices, |before, action, after| {
            if *action == Action::NewFrame {
                return;
            }
            for player in before.get_players() {
                let now = after.player(player.pid());
                if !player.is_active() && player.status() != now.status() {
                    violations += 1;
                }
            }
        });
        prop_assert_eq!(violations, 0);
    }

    #[test]
    fn test_snapshot_roundtrip(config in config_strategy(), choices in choices_strategy()) {
        let mut state = GameState::new(&config, 0);
        for &choice in &choices {
            let legal = state.legal_actions();
            state.apply(&legal[choice % legal.len()]);
        }

        let json = serde_json::to_string(&StateSnapshot::from(&state)).unwrap();
        let snapshot: StateSnapshot = serde_json::from_str(&json).unwrap();
        let restored = GameState::try_from(snapshot).unwrap();

        prop_assert_eq!(&restored, &state);
        prop_assert_eq!(restored.legal_actions(), state.legal_actions());
    }
}
