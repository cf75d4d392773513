//! Rules engine trait and frame results.
//!
//! `RulesEngine` is the action-level view of the state machine:
//! - What actions are legal right now
//! - How an action changes the state
//! - Whether the frame has been decided

use thiserror::Error;

use crate::core::action::Action;
use crate::core::ball::Ball;
use crate::core::player::{PlayerId, NUM_PLAYERS};
use crate::core::state::GameState;

/// Final placings of a decided frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameResult {
    /// Players from first to third.
    pub placings: [PlayerId; NUM_PLAYERS],
}

impl FrameResult {
    #[must_use]
    pub fn winner(&self) -> PlayerId {
        self.placings[0]
    }

    #[must_use]
    pub fn loser(&self) -> PlayerId {
        self.placings[NUM_PLAYERS - 1]
    }

    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        self.winner() == player
    }

    /// 1-based finishing place of a player.
    #[must_use]
    pub fn place(&self, player: PlayerId) -> usize {
        self.placings
            .iter()
            .position(|&p| p == player)
            .map_or(NUM_PLAYERS, |i| i + 1)
    }
}

/// An action was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    /// The action's precondition does not hold in the current state.
    #[error("illegal action: {0}")]
    IllegalAction(Action),

    /// There is no game to act on.
    #[error("no game in progress")]
    NoGame,
}

/// Rules engine trait.
///
/// ## Implementation Notes
///
/// - `is_legal` must agree with the state's `can_*` predicates
/// - `apply` panics on illegal actions; `try_apply` refuses them instead
/// - `frame_result`: return None while the frame continues
pub trait RulesEngine {
    /// Check whether an action may be applied now.
    fn is_legal(&self, action: &Action) -> bool;

    /// Apply an action. Panics if it is not legal.
    fn apply(&mut self, action: &Action);

    /// Placings once the frame is decided.
    fn frame_result(&self) -> Option<FrameResult>;

    // === Convenience Methods ===

    /// Apply an action if it is legal, leaving the state untouched otherwise.
    fn try_apply(&mut self, action: &Action) -> Result<(), RulesError> {
        if !self.is_legal(action) {
            return Err(RulesError::IllegalAction(*action));
        }
        self.apply(action);
        Ok(())
    }

    /// Enumerate all legal actions.
    ///
    /// Point edits take an arbitrary amount and are not enumerated.
    fn legal_actions(&self) -> Vec<Action> {
        candidate_actions()
            .into_iter()
            .filter(|a| self.is_legal(a))
            .collect()
    }
}

fn candidate_actions() -> Vec<Action> {
    let mut actions: Vec<Action> = Ball::ALL.iter().map(|&b| Action::PotBall(b)).collect();
    actions.extend(Ball::COLORS.iter().map(|&b| Action::CommitFoul(b)));
    actions.extend([Action::EndTurn, Action::FoulRetake]);
    actions.extend(PlayerId::all().map(Action::Concede));
    actions.extend(PlayerId::all().map(Action::DeclareWinner));
    actions.extend([Action::PlusBalls, Action::MinusBalls, Action::NewFrame]);
    actions
}

impl RulesEngine for GameState {
    fn is_legal(&self, action: &Action) -> bool {
        match *action {
            Action::PotBall(ball) => self.can_pot_ball(ball),
            Action::CommitFoul(ball) => self.can_commit_foul(ball),
            Action::EndTurn => self.can_end_turn(),
            Action::FoulRetake => self.can_foul_retake(),
            Action::Concede(pid) => self.can_concede(pid),
            Action::DeclareWinner(pid) => self.can_declare_winner(pid),
            Action::PlusBalls => self.can_plus_balls(),
            Action::MinusBalls => self.can_minus_balls(),
            Action::NewFrame => self.can_new_frame(),
            Action::EditPoints { player, amount } => self.can_player_edit_points(player, amount),
        }
    }

    fn apply(&mut self, action: &Action) {
        log::debug!("{}: {action}", self.current_pid());

        match *action {
            Action::PotBall(ball) => self.pot_ball(ball),
            Action::CommitFoul(ball) => self.commit_foul(ball),
            Action::EndTurn => self.end_turn(),
            Action::FoulRetake => self.foul_retake(),
            Action::Concede(pid) => self.concede(pid),
            Action::DeclareWinner(pid) => self.declare_winner(pid),
            Action::PlusBalls => self.plus_balls(),
            Action::MinusBalls => self.minus_balls(),
            Action::NewFrame => self.new_frame(),
            Action::EditPoints { player, amount } => self.player_edit_points(player, amount),
        }
    }

    fn frame_result(&self) -> Option<FrameResult> {
        if !self.is_frame_over() {
            return None;
        }

        let ranking = self.ranking();
        Some(FrameResult {
            placings: [ranking[2], ranking[1], ranking[0]],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;

    fn state() -> GameState {
        GameState::new(&GameConfig::default(), 1)
    }

    #[test]
    fn test_frame_result_places() {
        let result = FrameResult {
            placings: [PlayerId::new(2), PlayerId::new(0), PlayerId::new(1)],
        };

        assert!(result.is_winner(PlayerId::new(2)));
        assert!(!result.is_winner(PlayerId::new(0)));
        assert_eq!(result.loser(), PlayerId::new(1));
        assert_eq!(result.place(PlayerId::new(0)), 2);
    }

    #[test]
    fn test_opening_legal_actions() {
        let state = state();
        let actions = state.legal_actions();

        assert!(actions.contains(&Action::PotBall(Ball::Red)));
        assert!(!actions.contains(&Action::PotBall(Ball::Yellow)));
        assert!(actions.contains(&Action::CommitFoul(Ball::Yellow)));
        assert!(actions.contains(&Action::EndTurn));
        assert!(actions.contains(&Action::MinusBalls));
        assert!(!actions.contains(&Action::PlusBalls));
        assert!(!actions.contains(&Action::FoulRetake));
        assert!(!actions.contains(&Action::NewFrame));
        assert!(!actions.iter().any(|a| matches!(a, Action::Concede(_))));
    }

    #[test]
    fn test_try_apply_refuses_without_mutation() {
        let mut state = state();
        let before = state.clone();

        let err = state.try_apply(&Action::PotBall(Ball::Black)).unwrap_err();

        assert_eq!(err, RulesError::IllegalAction(Action::PotBall(Ball::Black)));
        assert_eq!(state, before);
    }

    #[test]
    fn test_apply_dispatches() {
        let mut state = state();

        state.apply(&Action::PotBall(Ball::Red));
        state.apply(&Action::PotBall(Ball::Pink));
        state.apply(&Action::EditPoints { player: PlayerId::new(2), amount: 3 });

        assert_eq!(state.current_player().points(), 7);
        assert_eq!(state.player(PlayerId::new(2)).points(), 3);
        assert!(state.frame_result().is_none());
    }
}
