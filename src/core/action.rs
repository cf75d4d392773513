//! Commands a scorer can give.
//!
//! Each variant corresponds to one command on [`crate::core::GameState`] and
//! has a matching `can_*` predicate there. Actions are plain data so they can
//! be logged, enumerated and replayed.

use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::player::PlayerId;

/// A single scoring command.
///
/// ```
/// use piste_on_piste::core::{Action, Ball, PlayerId};
///
/// let pot = Action::PotBall(Ball::Red);
/// assert!(pot.logs_shot());
///
/// let concede = Action::Concede(PlayerId::new(2));
/// assert!(!concede.logs_shot());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// Current player pots a ball.
    PotBall(Ball),
    /// Current player commits a foul worth the ball's value.
    CommitFoul(Ball),
    /// Current player's visit ends without a pot.
    EndTurn,
    /// After a foul, the fouling player is asked to play again.
    FoulRetake,
    /// A player concedes the frame.
    Concede(PlayerId),
    /// A player is declared the frame winner.
    DeclareWinner(PlayerId),
    /// Referee correction: one more ball on the table.
    PlusBalls,
    /// Referee correction: one ball fewer on the table.
    MinusBalls,
    /// Start the next frame.
    NewFrame,
    /// Manual score correction.
    EditPoints { player: PlayerId, amount: i32 },
}

impl Action {
    /// Whether this action is a shot at the table, i.e. it advances the
    /// frame clock and the current player's time.
    #[must_use]
    pub fn logs_shot(&self) -> bool {
        matches!(
            self,
            Action::PotBall(_) | Action::CommitFoul(_) | Action::EndTurn | Action::FoulRetake
        )
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::PotBall(ball) => write!(f, "pot {ball}"),
            Action::CommitFoul(ball) => write!(f, "foul {}", ball.value()),
            Action::EndTurn => f.write_str("end turn"),
            Action::FoulRetake => f.write_str("foul retake"),
            Action::Concede(pid) => write!(f, "{pid} concedes"),
            Action::DeclareWinner(pid) => write!(f, "{pid} declared winner"),
            Action::PlusBalls => f.write_str("plus balls"),
            Action::MinusBalls => f.write_str("minus balls"),
            Action::NewFrame => f.write_str("new frame"),
            Action::EditPoints { player, amount } => write!(f, "{player} points {amount:+}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Action::PotBall(Ball::Pink).to_string(), "pot pink");
        assert_eq!(Action::CommitFoul(Ball::Brown).to_string(), "foul 4");
        assert_eq!(
            Action::EditPoints { player: PlayerId::new(1), amount: -3 }.to_string(),
            "Player 1 points -3"
        );
    }

    #[test]
    fn test_action_serialization() {
        let actions = [
            Action::PotBall(Ball::Black),
            Action::Concede(PlayerId::new(2)),
            Action::EditPoints { player: PlayerId::new(0), amount: 7 },
        ];

        for action in actions {
            let json = serde_json::to_string(&action).unwrap();
            let deserialized: Action = serde_json::from_str(&json).unwrap();
            assert_eq!(action, deserialized);
        }
    }
}
