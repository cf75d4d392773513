//! # piste-on-piste
//!
//! Scorekeeping for three-player snooker.
//!
//! Three players share one table and one rack. Everyone plays for themselves;
//! the first player out of reach of the others wins the frame, the first one
//! who can no longer catch up loses it, and the winner and loser drop out of
//! the rotation as soon as they are decided.
//!
//! ## Design Principles
//!
//! 1. **Explicit state machine**: `GameState` holds every rule. Commands
//!    have side-effect-free `can_*` predicates and panic when called
//!    without them holding.
//!
//! 2. **Immutable history**: Every command produces a new state. Undo and
//!    redo move a cursor over a persistent vector of states.
//!
//! 3. **Versioned persistence**: States are saved through an explicit
//!    snapshot schema, never by dumping internal layout.
//!
//! ## Modules
//!
//! - `core`: Players, balls, actions, configuration, RNG, clock, `GameState`
//! - `rules`: `RulesEngine` trait and frame results
//! - `history`: Undo/redo history, snapshots, save slots
//! - `game`: The scoring session tying history, clock and saves together

pub mod core;
pub mod game;
pub mod history;
pub mod rules;

// Re-export commonly used types
pub use crate::core::{
    Action, Ball, BallQuery, Clock, ConfigError, GameConfig, GameState, ManualClock, Player,
    PlayerId, PlayerMap, PlayerStatus, SystemClock,
};

pub use crate::game::Game;

pub use crate::history::{
    DirStore, History, MemoryStore, SaveError, SaveGameId, SaveSlots, SlotStore, SnapshotError,
    StateSnapshot,
};

pub use crate::rules::{FrameResult, RulesEngine, RulesError};
