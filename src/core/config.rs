//! Game configuration.
//!
//! A `GameConfig` describes one game before it starts: the player roster,
//! how many reds are racked, and whether the starting order is drawn at
//! random. The roster is validated before a game can begin.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ball::DEFAULT_REDS;
use super::player::{PlayerId, NUM_PLAYERS};
use super::rng::GameRng;

/// Number of starting orders; the order rotates through all of them.
pub const NUM_PERMUTATIONS: usize = 6;

/// Most reds that fit in a rack.
pub const MAX_REDS: u32 = 15;

/// Invalid game configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A player was given no name.
    #[error("{0} has no name")]
    EmptyName(PlayerId),

    /// Two players share a name (case-insensitively).
    #[error("duplicate player name '{0}'")]
    DuplicateName(String),

    /// Unsupported number of reds.
    #[error("number of reds must be 1..={max}, got {0}", max = MAX_REDS)]
    RedCount(u32),
}

/// Complete game configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Player names, indexed by `PlayerId`.
    pub names: [String; NUM_PLAYERS],

    /// Reds racked at the start of each frame.
    pub num_reds: u32,

    /// Draw the first frame's starting order instead of using the first one.
    pub randomize_start: bool,

    /// Seed for the starting order draw and the seating shuffle.
    pub seed: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            names: std::array::from_fn(|i| format!("Player {}", i + 1)),
            num_reds: DEFAULT_REDS,
            randomize_start: false,
            seed: 0,
        }
    }
}

impl GameConfig {
    /// Create a configuration with the given names and standard settings.
    pub fn new(names: [&str; NUM_PLAYERS]) -> Self {
        Self {
            names: names.map(str::to_string),
            ..Self::default()
        }
    }

    /// Set the number of reds.
    #[must_use]
    pub fn with_num_reds(mut self, num_reds: u32) -> Self {
        self.num_reds = num_reds;
        self
    }

    /// Draw the starting order from `seed`.
    #[must_use]
    pub fn randomized(mut self, seed: u64) -> Self {
        self.randomize_start = true;
        self.seed = seed;
        self
    }

    /// Display name for a player; blank names fall back to `player N`.
    #[must_use]
    pub fn player_name(&self, pid: PlayerId) -> String {
        let name = self.names[pid.index()].trim();
        if name.is_empty() {
            format!("player {}", pid.0)
        } else {
            name.to_string()
        }
    }

    /// Balls on the table at the start of a frame.
    #[must_use]
    pub fn max_balls(&self) -> u32 {
        self.num_reds + super::ball::NUM_COLORS
    }

    /// A name is valid if it is non-empty and no other player has it,
    /// ignoring case.
    #[must_use]
    pub fn valid_name(&self, name: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }

        let upper = name.to_uppercase();
        self.names
            .iter()
            .filter(|n| n.to_uppercase() == upper)
            .count()
            == 1
    }

    /// Check the whole configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_reds == 0 || self.num_reds > MAX_REDS {
            return Err(ConfigError::RedCount(self.num_reds));
        }

        for pid in PlayerId::all() {
            let name = &self.names[pid.index()];
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyName(pid));
            }
            if !self.valid_name(name) {
                return Err(ConfigError::DuplicateName(name.clone()));
            }
        }

        Ok(())
    }

    /// Index of the first frame's starting order.
    #[must_use]
    pub fn start_perm(&self) -> usize {
        if self.randomize_start {
            GameRng::new(self.seed).gen_range_usize(0..NUM_PERMUTATIONS)
        } else {
            0
        }
    }

    /// Draw seats: shuffle the roster.
    pub fn shuffle_names(&mut self, rng: &mut GameRng) {
        rng.shuffle(&mut self.names);
    }
}
