//! Snooker balls and their point values.
//!
//! Reds are worth 1 and come in a pack; the six colors are worth 2 (yellow)
//! to 7 (black) and there is one of each. While reds remain, every red must
//! be followed by a color, which is respotted. Once the reds are gone the
//! colors are cleared in ascending order.

use serde::{Deserialize, Serialize};

/// Number of colored balls on a full table.
pub const NUM_COLORS: u32 = 6;

/// Reds in a standard frame.
pub const DEFAULT_REDS: u32 = 15;

/// A snooker ball, represented by its point value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Ball {
    Red = 1,
    Yellow = 2,
    Green = 3,
    Brown = 4,
    Blue = 5,
    Pink = 6,
    Black = 7,
}

impl Ball {
    /// All balls, lowest value first.
    pub const ALL: [Ball; 7] = [
        Ball::Red,
        Ball::Yellow,
        Ball::Green,
        Ball::Brown,
        Ball::Blue,
        Ball::Pink,
        Ball::Black,
    ];

    /// The six colors in clearance order.
    pub const COLORS: [Ball; 6] = [
        Ball::Yellow,
        Ball::Green,
        Ball::Brown,
        Ball::Blue,
        Ball::Pink,
        Ball::Black,
    ];

    /// Point value, 1..=7.
    #[must_use]
    pub const fn value(self) -> u32 {
        self as u32
    }

    /// Look up a ball by point value.
    ///
    /// ```
    /// use piste_on_piste::core::Ball;
    ///
    /// assert_eq!(Ball::try_from_value(5), Some(Ball::Blue));
    /// assert_eq!(Ball::try_from_value(0), None);
    /// ```
    #[must_use]
    pub fn try_from_value(value: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.value() == value)
    }

    #[must_use]
    pub const fn is_red(self) -> bool {
        matches!(self, Ball::Red)
    }

    /// How many colors must still be on the table for this color to be
    /// among them: black needs one, yellow needs all six.
    #[must_use]
    pub(crate) const fn colors_needed(self) -> u32 {
        8 - self.value()
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Ball::Red => "red",
            Ball::Yellow => "yellow",
            Ball::Green => "green",
            Ball::Brown => "brown",
            Ball::Blue => "blue",
            Ball::Pink => "pink",
            Ball::Black => "black",
        }
    }

    /// CSS color used to draw the ball.
    #[must_use]
    pub const fn css_color(self) -> &'static str {
        match self {
            Ball::Red => "red",
            Ball::Yellow => "gold",
            Ball::Green => "green",
            Ball::Brown => "saddlebrown",
            Ball::Blue => "blue",
            Ball::Pink => "hotpink",
            Ball::Black => "black",
        }
    }
}

impl std::fmt::Display for Ball {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// CSS color for a signed point value as found in a break log.
///
/// Fouls are logged as negative values and use the color of the ball
/// involved; zero (no ball) is drawn gray.
#[must_use]
pub fn value_to_css_color(value: i32) -> &'static str {
    Ball::try_from_value(value.unsigned_abs())
        .map(Ball::css_color)
        .unwrap_or("dimgray")
}

/// Which balls to count in [`crate::core::GameState::num_balls`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BallQuery {
    /// Every ball left on the table.
    All,
    /// Reds left on the table.
    Reds,
    /// 1 if this ball is still on the table, else 0. `Color(Ball::Red)`
    /// counts reds.
    Color(Ball),
}
