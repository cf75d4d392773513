//! Player identity, per-player storage and per-player scoring.
//!
//! ## PlayerId
//!
//! Stable identity of one of the three players. Never changes during a game,
//! unlike the player's table position which is reshuffled every round.
//!
//! ## PlayerMap
//!
//! Fixed per-player storage indexed by `PlayerId`.
//!
//! ## Player
//!
//! Points, breaks, frame/game statistics and the frame clock of one player.

use std::cmp::Ordering;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::clock;

/// Number of players at the table. The rules only make sense for three.
pub const NUM_PLAYERS: usize = 3;

/// Player identifier, `0..3`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw player index (0-based).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over the three player IDs.
    ///
    /// ```
    /// use piste_on_piste::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all().collect();
    /// assert_eq!(players, vec![PlayerId(0), PlayerId(1), PlayerId(2)]);
    /// ```
    pub fn all() -> impl Iterator<Item = PlayerId> {
        (0..NUM_PLAYERS as u8).map(PlayerId)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Per-player data storage with O(1) access.
///
/// ```
/// use piste_on_piste::core::{PlayerId, PlayerMap};
///
/// let mut points: PlayerMap<i32> = PlayerMap::new(|_| 0);
/// points[PlayerId::new(1)] += 4;
/// assert_eq!(points[PlayerId::new(1)], 4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PlayerMap<T> {
    data: [T; NUM_PLAYERS],
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(factory: impl Fn(PlayerId) -> T) -> Self {
        Self {
            data: std::array::from_fn(|i| factory(PlayerId(i as u8))),
        }
    }

    /// Get a reference to a player's data.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// Get a mutable reference to a player's data.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over all values in `PlayerId` order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }

    /// Iterate mutably over all values in `PlayerId` order.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.data.iter_mut()
    }
}

impl<T> From<[T; NUM_PLAYERS]> for PlayerMap<T> {
    fn from(data: [T; NUM_PLAYERS]) -> Self {
        Self { data }
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

/// Signed point log of one turn: positive entries are pots, negative
/// entries mark a foul by this player.
pub type Break = SmallVec<[i32; 16]>;

/// Where a player stands in the current frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlayerStatus {
    /// Still playing for a place.
    Active,
    /// Finished first; out of the rotation.
    Winner,
    /// Finished last; out of the rotation.
    Loser,
}

/// One player's scores and statistics.
///
/// Frame-scoped fields are reset by [`Player::new_frame`]; game-scoped tallies
/// (frame placements, game high break and ball count) live for the whole game.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub(crate) pid: PlayerId,
    pub(crate) name: String,

    // === Game ===
    pub(crate) frame_1st: u32,
    pub(crate) frame_2nd: u32,
    pub(crate) frame_3rd: u32,
    pub(crate) game_high_break: i32,
    pub(crate) game_balls: u32,

    // === Frame ===
    pub(crate) pos: usize,
    pub(crate) points: i32,
    pub(crate) winner: bool,
    pub(crate) loser: bool,
    pub(crate) frame_high_break: i32,
    pub(crate) frame_balls: u32,
    pub(crate) frame_time: u64,

    // === Turn ===
    pub(crate) current_break: Break,
    pub(crate) last_break: Break,
}

impl Player {
    /// Create a player at the start of a game.
    #[must_use]
    pub fn new(pid: PlayerId, pos: usize, name: impl Into<String>) -> Self {
        Self {
            pid,
            name: name.into(),
            frame_1st: 0,
            frame_2nd: 0,
            frame_3rd: 0,
            game_high_break: 0,
            game_balls: 0,
            pos,
            points: 0,
            winner: false,
            loser: false,
            frame_high_break: 0,
            frame_balls: 0,
            frame_time: 0,
            current_break: Break::new(),
            last_break: Break::new(),
        }
    }

    #[must_use]
    pub fn pid(&self) -> PlayerId {
        self.pid
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current table slot, which decides the turn order.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    #[must_use]
    pub fn points(&self) -> i32 {
        self.points
    }

    #[must_use]
    pub fn is_winner(&self) -> bool {
        self.winner
    }

    #[must_use]
    pub fn is_loser(&self) -> bool {
        self.loser
    }

    /// Neither winner nor loser yet.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.winner && !self.loser
    }

    #[must_use]
    pub fn status(&self) -> PlayerStatus {
        if self.winner {
            PlayerStatus::Winner
        } else if self.loser {
            PlayerStatus::Loser
        } else {
            PlayerStatus::Active
        }
    }

    #[must_use]
    pub fn frame_high_break(&self) -> i32 {
        self.frame_high_break
    }

    #[must_use]
    pub fn frame_balls(&self) -> u32 {
        self.frame_balls
    }

    #[must_use]
    pub fn game_high_break(&self) -> i32 {
        self.game_high_break
    }

    #[must_use]
    pub fn game_balls(&self) -> u32 {
        self.game_balls
    }

    /// Frame placements so far: (first, second, third).
    #[must_use]
    pub fn frame_placements(&self) -> (u32, u32, u32) {
        (self.frame_1st, self.frame_2nd, self.frame_3rd)
    }

    /// Raw point log of the turn in progress.
    #[must_use]
    pub fn current_break_log(&self) -> &[i32] {
        &self.current_break
    }

    /// Raw point log of the previous turn.
    #[must_use]
    pub fn last_break_log(&self) -> &[i32] {
        &self.last_break
    }

    /// Size of the break in progress.
    #[must_use]
    pub fn cur_break(&self) -> i32 {
        break_size(&self.current_break)
    }

    /// Size of the previous turn's break.
    #[must_use]
    pub fn last_break(&self) -> i32 {
        break_size(&self.last_break)
    }

    /// Score a pot and update break statistics.
    pub fn pot_points(&mut self, points: i32) {
        self.points += points;
        self.current_break.push(points);

        let cur_break = self.cur_break();

        self.game_balls += 1;
        self.game_high_break = self.game_high_break.max(cur_break);

        self.frame_balls += 1;
        self.frame_high_break = self.frame_high_break.max(cur_break);
    }

    /// Mark a foul in the break log. Foul points go to the opponents.
    pub fn log_foul(&mut self, points: i32) {
        self.current_break.push(-points);
    }

    /// Close the current turn.
    pub fn end_turn(&mut self) {
        self.last_break = std::mem::take(&mut self.current_break);
    }

    /// Accumulate time spent at the table, in milliseconds.
    pub fn log_time(&mut self, duration_ms: u64) {
        self.frame_time += duration_ms;
    }

    #[must_use]
    pub fn frame_time_ms(&self) -> u64 {
        self.frame_time
    }

    /// Time at the table this frame as `MM:SS`.
    #[must_use]
    pub fn frame_time(&self) -> String {
        clock::format_ms(self.frame_time)
    }

    /// Reset frame-scoped state and take a new table slot.
    pub fn new_frame(&mut self, pos: usize) {
        self.end_turn();

        self.points = 0;
        self.pos = pos;
        self.winner = false;
        self.loser = false;

        self.frame_high_break = 0;
        self.frame_balls = 0;
        self.frame_time = 0;
    }

    /// Ranking order: losers below active players below winners, then by
    /// points, then by table position.
    #[must_use]
    pub fn compare(&self, other: &Player) -> Ordering {
        self.rank_key().cmp(&other.rank_key())
    }

    fn rank_key(&self) -> (u8, i32, usize) {
        let status = match self.status() {
            PlayerStatus::Loser => 0,
            PlayerStatus::Active => 1,
            PlayerStatus::Winner => 2,
        };
        (status, self.points, self.pos)
    }
}

fn break_size(entries: &[i32]) -> i32 {
    entries.iter().filter(|&&v| v > 0).sum()
}
