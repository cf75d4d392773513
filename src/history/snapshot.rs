//! Versioned, serializable snapshots of a game state.
//!
//! `GameState` itself is not serializable. Saving goes through
//! `StateSnapshot`, a flat schema with an explicit version, and loading
//! rebuilds the state field by field, rejecting anything that would break
//! the state machine's invariants. Fields added in later versions must be
//! `#[serde(default)]` so older saves still load.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use thiserror::Error;

use crate::core::ball::{DEFAULT_REDS, NUM_COLORS};
use crate::core::config::{MAX_REDS, NUM_PERMUTATIONS};
use crate::core::player::{Break, Player, PlayerId, PlayerMap, NUM_PLAYERS};
use crate::core::state::GameState;

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A snapshot that cannot be turned back into a game state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),

    #[error("expected {expected} players, found {0}", expected = NUM_PLAYERS)]
    PlayerCount(usize),

    #[error("player ids must be 0, 1 and 2")]
    PlayerIds,

    #[error("player positions must be 0, 1 and 2")]
    Positions,

    #[error("unknown player id {0}")]
    UnknownPlayer(u8),

    #[error("{num_balls} balls on a table of {max_balls}")]
    BallCount { num_balls: u32, max_balls: u32 },

    #[error("unsupported number of reds {0}")]
    RedCount(u32),

    #[error("starting order {0} out of range")]
    Permutation(usize),

    #[error("table position {0} out of range")]
    Position(usize),

    #[error("player {0} is both winner and loser")]
    ConflictingPlacing(u8),

    #[error("player {0} has a zero entry in a break")]
    BreakEntry(u8),

    #[error("player {0} has a negative score")]
    NegativePoints(u8),
}

/// Serialized form of one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub pid: u8,
    pub name: String,

    pub frame_1st: u32,
    pub frame_2nd: u32,
    pub frame_3rd: u32,
    pub game_high_break: i32,
    pub game_balls: u32,

    pub pos: usize,
    pub points: i32,
    pub winner: bool,
    pub loser: bool,
    pub frame_high_break: i32,
    pub frame_balls: u32,
    #[serde(default)]
    pub frame_time: u64,

    pub current_break: Vec<i32>,
    pub last_break: Vec<i32>,
}

/// Serialized form of a game state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub version: u32,

    pub cur_perm: usize,
    pub num_frames: u32,
    #[serde(default = "default_reds")]
    pub num_reds: u32,

    #[serde(default)]
    pub timestamp: u64,
    #[serde(default)]
    pub start_timestamp: u64,
    #[serde(default)]
    pub end_timestamp: u64,
    #[serde(default)]
    pub shot_timestamp: u64,
    pub num_balls: u32,

    pub cur_pos: usize,
    pub cur_pid: u8,
    pub prev_pid: Option<u8>,
    pub red: bool,
    pub foul: bool,
    pub retake: bool,
    #[serde(default)]
    pub respot_black: bool,

    pub players: Vec<PlayerSnapshot>,
}

fn default_reds() -> u32 {
    DEFAULT_REDS
}

impl From<&Player> for PlayerSnapshot {
    fn from(p: &Player) -> Self {
        Self {
            pid: p.pid.0,
            name: p.name.clone(),
            frame_1st: p.frame_1st,
            frame_2nd: p.frame_2nd,
            frame_3rd: p.frame_3rd,
            game_high_break: p.game_high_break,
            game_balls: p.game_balls,
            pos: p.pos,
            points: p.points,
            winner: p.winner,
            loser: p.loser,
            frame_high_break: p.frame_high_break,
            frame_balls: p.frame_balls,
            frame_time: p.frame_time,
            current_break: p.current_break.to_vec(),
            last_break: p.last_break.to_vec(),
        }
    }
}

impl From<&GameState> for StateSnapshot {
    fn from(s: &GameState) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            cur_perm: s.cur_perm,
            num_frames: s.num_frames,
            num_reds: s.max_balls - NUM_COLORS,
            timestamp: s.timestamp,
            start_timestamp: s.start_timestamp,
            end_timestamp: s.end_timestamp,
            shot_timestamp: s.shot_timestamp,
            num_balls: s.num_balls,
            cur_pos: s.cur_pos,
            cur_pid: s.cur_pid.0,
            prev_pid: s.prev_pid.map(|p| p.0),
            red: s.red,
            foul: s.foul,
            retake: s.retake,
            respot_black: s.respot_black,
            players: s.players.values().map(PlayerSnapshot::from).collect(),
        }
    }
}

fn restore_break(pid: u8, entries: &[i32]) -> Result<Break, SnapshotError> {
    if entries.contains(&0) {
        return Err(SnapshotError::BreakEntry(pid));
    }
    Ok(SmallVec::from_slice(entries))
}

fn restore_player(p: &PlayerSnapshot) -> Result<Player, SnapshotError> {
    if p.winner && p.loser {
        return Err(SnapshotError::ConflictingPlacing(p.pid));
    }
    if p.points < 0 {
        return Err(SnapshotError::NegativePoints(p.pid));
    }

    Ok(Player {
        pid: PlayerId::new(p.pid),
        name: p.name.clone(),
        frame_1st: p.frame_1st,
        frame_2nd: p.frame_2nd,
        frame_3rd: p.frame_3rd,
        game_high_break: p.game_high_break,
        game_balls: p.game_balls,
        pos: p.pos,
        points: p.points,
        winner: p.winner,
        loser: p.loser,
        frame_high_break: p.frame_high_break,
        frame_balls: p.frame_balls,
        frame_time: p.frame_time,
        current_break: restore_break(p.pid, &p.current_break)?,
        last_break: restore_break(p.pid, &p.last_break)?,
    })
}

fn known_pid(pid: u8) -> Result<PlayerId, SnapshotError> {
    if usize::from(pid) < NUM_PLAYERS {
        Ok(PlayerId::new(pid))
    } else {
        Err(SnapshotError::UnknownPlayer(pid))
    }
}

impl TryFrom<&StateSnapshot> for GameState {
    type Error = SnapshotError;

    fn try_from(s: &StateSnapshot) -> Result<Self, Self::Error> {
        if s.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(s.version));
        }
        if s.players.len() != NUM_PLAYERS {
            return Err(SnapshotError::PlayerCount(s.players.len()));
        }

        let pids: BTreeSet<u8> = s.players.iter().map(|p| p.pid).collect();
        if !pids.iter().copied().eq(0..NUM_PLAYERS as u8) {
            return Err(SnapshotError::PlayerIds);
        }
        let positions: BTreeSet<usize> = s.players.iter().map(|p| p.pos).collect();
        if !positions.iter().copied().eq(0..NUM_PLAYERS) {
            return Err(SnapshotError::Positions);
        }

        if s.num_reds == 0 || s.num_reds > MAX_REDS {
            return Err(SnapshotError::RedCount(s.num_reds));
        }
        let max_balls = s.num_reds + NUM_COLORS;
        if s.num_balls > max_balls {
            return Err(SnapshotError::BallCount {
                num_balls: s.num_balls,
                max_balls,
            });
        }
        if s.cur_perm >= NUM_PERMUTATIONS {
            return Err(SnapshotError::Permutation(s.cur_perm));
        }
        if s.cur_pos >= NUM_PLAYERS {
            return Err(SnapshotError::Position(s.cur_pos));
        }

        let cur_pid = known_pid(s.cur_pid)?;
        let prev_pid = s.prev_pid.map(known_pid).transpose()?;

        let mut restored = Vec::with_capacity(NUM_PLAYERS);
        for p in &s.players {
            restored.push(restore_player(p)?);
        }
        restored.sort_by_key(|p| p.pid);
        let players: [Player; NUM_PLAYERS] = restored
            .try_into()
            .map_err(|v: Vec<Player>| SnapshotError::PlayerCount(v.len()))?;

        Ok(Self {
            cur_perm: s.cur_perm,
            num_frames: s.num_frames,
            max_balls,
            timestamp: s.timestamp,
            start_timestamp: s.start_timestamp,
            end_timestamp: s.end_timestamp,
            shot_timestamp: s.shot_timestamp,
            num_balls: s.num_balls,
            cur_pos: s.cur_pos,
            cur_pid,
            prev_pid,
            red: s.red,
            foul: s.foul,
            retake: s.retake,
            respot_black: s.respot_black,
            players: PlayerMap::from(players),
        })
    }
}

impl TryFrom<StateSnapshot> for GameState {
    type Error = SnapshotError;

    fn try_from(s: StateSnapshot) -> Result<Self, Self::Error> {
        GameState::try_from(&s)
    }
}
