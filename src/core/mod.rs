//! Core scoring types: players, balls, actions, configuration, state.
//!
//! `GameState` is the rules engine proper. Everything it needs to decide a
//! frame lives in this module; history and persistence are layered on top.

pub mod action;
pub mod ball;
pub mod clock;
pub mod config;
pub mod player;
mod play;
pub mod rng;
pub mod state;

pub use action::Action;
pub use ball::{Ball, BallQuery};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, GameConfig};
pub use player::{Break, Player, PlayerId, PlayerMap, PlayerStatus, NUM_PLAYERS};
pub use rng::GameRng;
pub use state::{GameState, PERMUTATIONS};
