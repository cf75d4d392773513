//! Frame and game state of one three-player game.
//!
//! ## Ball accounting
//!
//! Only the number of balls left is tracked. With `n` balls on the table,
//! `max(n - 6, 0)` are reds and `min(n, 6)` are colors; the colors still on
//! the table are always the highest-valued ones.
//!
//! ## Positions
//!
//! Each player has a fixed `pid` and a table position `pos`. Positions
//! decide the order of play and are reassigned by ranking at the end of
//! every round. `cur_pos` is the position currently at the table.
//!
//! ## Commands
//!
//! The commands that change the state live in `play.rs`. This file holds the
//! data, the side-effect-free queries and the `can_*` predicates.

use smallvec::SmallVec;

use super::ball::{Ball, BallQuery, NUM_COLORS};
use super::clock;
use super::config::{GameConfig, NUM_PERMUTATIONS};
use super::player::{Player, PlayerId, PlayerMap, NUM_PLAYERS};

/// Starting orders. Entry `i` of a permutation is the pid sitting at
/// position `i`; each new frame moves on to the next entry.
pub const PERMUTATIONS: [[u8; NUM_PLAYERS]; NUM_PERMUTATIONS] = [
    [0, 1, 2],
    [1, 2, 0],
    [2, 0, 1],
    [0, 2, 1],
    [1, 0, 2],
    [2, 1, 0],
];

/// Position of `pid` in starting order `perm`.
pub(crate) fn perm_pos(perm: usize, pid: PlayerId) -> usize {
    PERMUTATIONS[perm]
        .iter()
        .position(|&p| p == pid.0)
        .unwrap_or(pid.index())
}

/// Player ids sorted by ranking, lowest first.
pub(crate) type Ranking = SmallVec<[PlayerId; NUM_PLAYERS]>;

/// Complete state of a game in progress.
///
/// Cloning produces an independent deep copy; history keeps one per action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    // === Game ===
    pub(crate) cur_perm: usize,
    pub(crate) num_frames: u32,
    pub(crate) max_balls: u32,

    // === Frame ===
    pub(crate) timestamp: u64,
    pub(crate) start_timestamp: u64,
    pub(crate) end_timestamp: u64,
    pub(crate) shot_timestamp: u64,
    pub(crate) num_balls: u32,

    // === Turn ===
    pub(crate) cur_pos: usize,
    pub(crate) cur_pid: PlayerId,
    pub(crate) prev_pid: Option<PlayerId>,
    pub(crate) red: bool,
    pub(crate) foul: bool,
    pub(crate) retake: bool,
    pub(crate) respot_black: bool,

    pub(crate) players: PlayerMap<Player>,
}

impl GameState {
    /// Create the state for the first frame of a new game.
    ///
    /// `now_ms` stamps the game; see [`clock`].
    #[must_use]
    pub fn new(config: &GameConfig, now_ms: u64) -> Self {
        let cur_perm = config.start_perm();
        let players = PlayerMap::new(|pid| {
            Player::new(pid, perm_pos(cur_perm, pid), config.player_name(pid))
        });
        let cur_pid = PlayerId::new(PERMUTATIONS[cur_perm][0]);

        Self {
            cur_perm,
            num_frames: 0,
            max_balls: config.max_balls(),
            timestamp: now_ms,
            start_timestamp: 0,
            end_timestamp: 0,
            shot_timestamp: 0,
            num_balls: config.max_balls(),
            cur_pos: 0,
            cur_pid,
            prev_pid: None,
            red: false,
            foul: false,
            retake: false,
            respot_black: false,
            players,
        }
    }

    // === Players ===

    /// Get a player by id.
    #[must_use]
    pub fn player(&self, pid: PlayerId) -> &Player {
        &self.players[pid]
    }

    pub(crate) fn player_by_pos(&self, pos: usize) -> &Player {
        self.players
            .values()
            .find(|p| p.pos == pos)
            .expect("positions are a permutation of 0..3")
    }

    /// The player at the table.
    #[must_use]
    pub fn current_player(&self) -> &Player {
        &self.players[self.cur_pid]
    }

    /// The player who had the previous visit, if any.
    #[must_use]
    pub fn previous_player(&self) -> Option<&Player> {
        self.prev_pid.map(|pid| &self.players[pid])
    }

    #[must_use]
    pub fn current_pid(&self) -> PlayerId {
        self.cur_pid
    }

    #[must_use]
    pub fn previous_pid(&self) -> Option<PlayerId> {
        self.prev_pid
    }

    #[must_use]
    pub fn current_pos(&self) -> usize {
        self.cur_pos
    }

    /// Players in table order.
    #[must_use]
    pub fn get_players(&self) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by_key(|p| p.pos);
        players
    }

    /// Whether `pid` is at the table. False once the frame is over.
    #[must_use]
    pub fn is_current_player(&self, pid: PlayerId) -> bool {
        !self.is_frame_over() && self.cur_pid == pid
    }

    /// Whether `pid` had the previous visit. False once the frame is over.
    #[must_use]
    pub fn is_previous_player(&self, pid: PlayerId) -> bool {
        !self.is_frame_over() && self.prev_pid == Some(pid)
    }

    // === Balls ===

    /// Balls on a full table.
    #[must_use]
    pub fn max_balls(&self) -> u32 {
        self.max_balls
    }

    #[must_use]
    pub fn num_reds(&self) -> u32 {
        self.num_balls.saturating_sub(NUM_COLORS)
    }

    #[must_use]
    pub fn num_colors(&self) -> u32 {
        self.num_balls.min(NUM_COLORS)
    }

    /// Count balls on the table.
    #[must_use]
    pub fn num_balls(&self, query: BallQuery) -> u32 {
        match query {
            BallQuery::All => self.num_balls,
            BallQuery::Reds | BallQuery::Color(Ball::Red) => self.num_reds(),
            BallQuery::Color(ball) => u32::from(self.is_color_on_table(ball)),
        }
    }

    pub(crate) fn is_color_on_table(&self, ball: Ball) -> bool {
        self.num_colors() >= ball.colors_needed()
    }

    /// Most points still available on the table: every red followed by the
    /// black, then the remaining colors.
    #[must_use]
    pub fn num_points(&self) -> i32 {
        if self.num_colors() == 0 {
            return 0;
        }

        let reds_and_blacks = self.num_reds() * (Ball::Red.value() + Ball::Black.value());
        let colors: u32 = Ball::COLORS
            .iter()
            .rev()
            .take(self.num_colors() as usize)
            .map(|b| b.value())
            .sum();

        (reds_and_blacks + colors) as i32
    }

    // === Turn flags ===

    /// A red was just potted; any color may follow.
    #[must_use]
    pub fn is_red_on(&self) -> bool {
        self.red
    }

    /// The last visit ended in a foul.
    #[must_use]
    pub fn is_foul(&self) -> bool {
        self.foul
    }

    /// The fouling player is replaying the visit.
    #[must_use]
    pub fn is_retake(&self) -> bool {
        self.retake
    }

    /// The black was respotted to decide the frame.
    #[must_use]
    pub fn is_respot_black(&self) -> bool {
        self.respot_black
    }

    // === Frame ===

    #[must_use]
    pub fn num_frames(&self) -> u32 {
        self.num_frames
    }

    /// Index into [`PERMUTATIONS`] of this frame's starting order.
    #[must_use]
    pub fn cur_perm(&self) -> usize {
        self.cur_perm
    }

    pub(crate) fn num_players_left(&self) -> usize {
        self.players.values().filter(|p| p.is_active()).count()
    }

    pub(crate) fn have_winner(&self) -> bool {
        self.players.values().any(|p| p.winner)
    }

    pub(crate) fn have_loser(&self) -> bool {
        self.players.values().any(|p| p.loser)
    }

    /// The frame is decided once there is both a winner and a loser.
    #[must_use]
    pub fn is_frame_over(&self) -> bool {
        self.have_winner() && self.have_loser()
    }

    /// Players still in the frame, lowest ranked first.
    pub(crate) fn active_ranking(&self) -> Ranking {
        let mut ranking: Ranking = self
            .players
            .iter()
            .filter(|(_, p)| p.is_active())
            .map(|(pid, _)| pid)
            .collect();
        ranking.sort_by(|&a, &b| self.players[a].compare(&self.players[b]));
        ranking
    }

    /// All players, lowest ranked first.
    pub(crate) fn ranking(&self) -> Ranking {
        let mut ranking: Ranking = PlayerId::all().collect();
        ranking.sort_by(|&a, &b| self.players[a].compare(&self.players[b]));
        ranking
    }

    /// The gap between two players can no longer be closed. Only considered
    /// once the last color is on its own.
    pub(crate) fn out_of_reach(&self, a: PlayerId, b: PlayerId) -> bool {
        if self.num_colors() > 1 {
            return false;
        }

        (self.players[a].points - self.players[b].points).abs() > self.num_points()
    }

    // === Timing ===

    /// When this game (or frame, after `new_frame`) was created.
    #[must_use]
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub(crate) fn has_frame_started(&self) -> bool {
        self.start_timestamp != 0
    }

    /// Milliseconds played in this frame.
    #[must_use]
    pub fn frame_time_ms(&self, now_ms: u64) -> u64 {
        if self.is_frame_over() {
            self.end_timestamp.saturating_sub(self.start_timestamp)
        } else if self.has_frame_started() {
            now_ms.saturating_sub(self.start_timestamp)
        } else {
            0
        }
    }

    /// Frame time as `MM:SS`.
    #[must_use]
    pub fn frame_time(&self, now_ms: u64) -> String {
        clock::format_ms(self.frame_time_ms(now_ms))
    }

    // === Predicates ===

    #[must_use]
    pub fn can_pot_ball(&self, ball: Ball) -> bool {
        if self.is_frame_over() {
            return false;
        }

        if ball.is_red() {
            // more than one red may go down on a shot
            return self.num_reds() > 0;
        }

        if self.red {
            return true;
        }

        self.num_reds() == 0 && self.num_colors() == ball.colors_needed()
    }

    /// A foul is worth the value of a ball still on the table, so the
    /// values that remain possible shrink as the colors are cleared.
    #[must_use]
    pub fn can_commit_foul(&self, ball: Ball) -> bool {
        !self.is_frame_over() && !ball.is_red() && self.is_color_on_table(ball)
    }

    #[must_use]
    pub fn can_end_turn(&self) -> bool {
        !self.is_frame_over()
    }

    #[must_use]
    pub fn can_foul_retake(&self) -> bool {
        self.foul
            && !self.is_frame_over()
            && !self.respot_black
            && self
                .previous_player()
                .is_some_and(|p| p.is_active())
    }

    /// Only the last player still in the frame may concede, and only when
    /// snookers are required. A frame has a single loser.
    #[must_use]
    pub fn can_concede(&self, pid: PlayerId) -> bool {
        if self.is_frame_over() || self.have_loser() || self.is_current_player(pid) {
            return false;
        }

        let ranking = self.active_ranking();
        if ranking.len() < 2 || ranking[0] != pid {
            return false;
        }

        self.players[ranking[1]].points - self.players[ranking[0]].points > self.num_points()
    }

    /// With everyone still in the frame, the leader may be declared the
    /// winner when the runner-up needs snookers.
    #[must_use]
    pub fn can_declare_winner(&self, pid: PlayerId) -> bool {
        if self.is_frame_over() || self.is_current_player(pid) {
            return false;
        }

        let ranking = self.active_ranking();
        if ranking.len() != NUM_PLAYERS || ranking[2] != pid {
            return false;
        }

        self.players[ranking[2]].points - self.players[ranking[1]].points > self.num_points()
    }

    #[must_use]
    pub fn can_plus_balls(&self) -> bool {
        self.num_balls < self.max_balls
    }

    #[must_use]
    pub fn can_minus_balls(&self) -> bool {
        self.num_balls > 0
    }

    #[must_use]
    pub fn can_new_frame(&self) -> bool {
        self.is_frame_over()
    }

    #[must_use]
    pub fn can_player_edit_points(&self, pid: PlayerId, amount: i32) -> bool {
        self.players[pid]
            .points
            .checked_add(amount)
            .is_some_and(|p| p >= 0)
    }
}
