//! Commands that advance a frame.
//!
//! Every command asserts its `can_*` predicate: calling one that is not
//! allowed is a bug in the caller, not a game situation.
//!
//! ## End of a visit
//!
//! Pots, fouls and explicit turn ends all finish in `finish_turn`, which
//! flags players who can no longer be caught (or can no longer catch up),
//! hands the table to the next player still in the frame, and ends the frame
//! once there is a winner and a loser.

use log::{debug, info};

use super::ball::Ball;
use super::config::NUM_PERMUTATIONS;
use super::player::{PlayerId, NUM_PLAYERS};
use super::state::{perm_pos, GameState};

impl GameState {
    /// Record the time of a shot by the current player.
    ///
    /// The first shot of a frame starts the frame clock and takes no time;
    /// every later shot credits the time since the previous one.
    pub fn log_shot(&mut self, now_ms: u64) {
        let duration = if self.has_frame_started() {
            now_ms.saturating_sub(self.shot_timestamp)
        } else {
            self.start_timestamp = now_ms;
            0
        };

        self.shot_timestamp = now_ms;
        self.players[self.cur_pid].log_time(duration);
    }

    /// Stamp the state with a creation time, e.g. after `new_frame`.
    pub fn set_timestamp(&mut self, now_ms: u64) {
        self.timestamp = now_ms;
    }

    // === Potting ===

    /// Current player pots `ball`.
    ///
    /// Reds and colors are removed from the table except for colors potted
    /// after a red, which are respotted. When nothing is left to play for
    /// the visit ends.
    pub fn pot_ball(&mut self, ball: Ball) {
        assert!(self.can_pot_ball(ball), "cannot pot {ball}");

        if ball.is_red() {
            self.num_balls -= 1;
            self.red = true;
        } else {
            if self.num_reds() == 0 && !self.red {
                self.num_balls -= 1;
            }
            self.red = false;
        }

        self.foul = false;
        self.players[self.cur_pid].pot_points(ball.value() as i32);

        if self.num_points() == 0 {
            self.finish_turn();
        }
    }

    // === Fouls ===

    /// Current player fouls; the value goes to the opponents.
    ///
    /// The previous player alone receives the points when the foul is the
    /// first shot of a normal visit. On the opening visit, after a pot in
    /// the same visit, on a retake, or when the player is on a second visit
    /// in a row, both opponents receive them.
    pub fn commit_foul(&mut self, ball: Ball) {
        assert!(self.can_commit_foul(ball), "cannot foul {}", ball.value());

        let value = ball.value() as i32;
        let cur = self.cur_pid;

        let beneficiary = match self.prev_pid {
            Some(prev)
                if self.players[cur].current_break.is_empty()
                    && !self.retake
                    && prev != cur =>
            {
                Some(prev)
            }
            _ => None,
        };

        match beneficiary {
            Some(prev) => self.players[prev].points += value,
            None => {
                for p in self.players.values_mut().filter(|p| p.pid != cur) {
                    p.points += value;
                }
            }
        }

        self.players[cur].log_foul(value);

        // a foul on the last ball ends the frame
        if self.num_colors() == 1 {
            self.num_balls -= 1;
        }

        self.finish_turn();

        self.foul = true;
    }

    /// Ask the fouling player to play again.
    ///
    /// The table goes back to the previous player without ending a visit.
    /// When that visit ends, the player who asked for the retake is next.
    pub fn foul_retake(&mut self) {
        assert!(self.can_foul_retake(), "no foul to retake");

        self.retake = true;
        self.foul = false;

        if let Some(prev) = self.prev_pid {
            self.cur_pid = prev;
        }
    }

    /// Current player's visit ends.
    pub fn end_turn(&mut self) {
        assert!(self.can_end_turn(), "frame is over");
        self.finish_turn();
    }

    // === Manual decisions ===

    /// `pid` concedes the frame and becomes the loser.
    pub fn concede(&mut self, pid: PlayerId) {
        assert!(self.can_concede(pid), "{pid} cannot concede");

        info!("{pid} concedes");
        self.players[pid].loser = true;
        self.finish_if_decided();
    }

    /// `pid` is declared the frame winner.
    pub fn declare_winner(&mut self, pid: PlayerId) {
        assert!(self.can_declare_winner(pid), "{pid} cannot be declared winner");

        info!("{pid} declared winner");
        self.players[pid].winner = true;
        self.finish_if_decided();
    }

    // === Corrections ===

    pub fn plus_balls(&mut self) {
        assert!(self.can_plus_balls(), "table is full");
        self.num_balls += 1;
    }

    pub fn minus_balls(&mut self) {
        assert!(self.can_minus_balls(), "table is empty");
        self.num_balls -= 1;
    }

    pub fn player_edit_points(&mut self, pid: PlayerId, amount: i32) {
        assert!(
            self.can_player_edit_points(pid, amount),
            "{pid} points cannot go below zero"
        );
        let player = &mut self.players[pid];
        player.points = player.points.saturating_add(amount);
    }

    // === Frames ===

    /// Start the next frame with the next starting order.
    ///
    /// Frame placements and game statistics carry over.
    pub fn new_frame(&mut self) {
        assert!(self.can_new_frame(), "frame is not over");

        self.cur_perm = (self.cur_perm + 1) % NUM_PERMUTATIONS;

        self.start_timestamp = 0;
        self.end_timestamp = 0;
        self.shot_timestamp = 0;
        self.num_balls = self.max_balls;

        self.cur_pos = 0;
        self.prev_pid = None;
        self.red = false;
        self.foul = false;
        self.retake = false;
        self.respot_black = false;

        for pid in PlayerId::all() {
            let pos = perm_pos(self.cur_perm, pid);
            self.players[pid].new_frame(pos);
            if pos == 0 {
                self.cur_pid = pid;
            }
        }

        info!("frame {} starts, {} breaks", self.num_frames + 1, self.cur_pid);
    }

    // === Internals ===

    /// Flag players that the remaining points can no longer separate.
    fn detect_win_lose(&mut self) {
        let ranking = self.active_ranking();

        match ranking.as_slice() {
            &[last, middle, first] => {
                if self.out_of_reach(last, middle) {
                    self.players[last].loser = true;
                }
                if self.out_of_reach(middle, first) {
                    self.players[first].winner = true;
                }
            }
            &[last, first] => {
                if self.out_of_reach(last, first) {
                    if self.have_winner() {
                        self.players[last].loser = true;
                    } else {
                        self.players[first].winner = true;
                    }
                }
            }
            _ => {}
        }
    }

    /// Reassign positions by ranking, lowest first.
    fn reseat(&mut self) {
        for (pos, pid) in self.ranking().into_iter().enumerate() {
            self.players[pid].pos = pos;
        }
    }

    pub(crate) fn finish_turn(&mut self) {
        self.players[self.cur_pid].end_turn();

        self.detect_win_lose();

        // the player who asked for a retake plays next, unless the retake
        // decided their place in the frame
        let requested_retake = if self.retake {
            let requester = self.player_by_pos(self.cur_pos);
            requester.is_active().then_some(requester.pid)
        } else {
            None
        };

        self.prev_pid = Some(self.cur_pid);
        self.red = false;
        self.foul = false;
        self.retake = false;
        self.respot_black = false;

        match (self.num_players_left(), requested_retake) {
            (1, _) => self.reseat(),
            (_, Some(pid)) => self.cur_pid = pid,
            (3, None) => {
                self.cur_pos += 1;

                // new round
                if self.cur_pos >= NUM_PLAYERS {
                    self.reseat();
                    self.cur_pos = 0;
                }

                self.cur_pid = self.player_by_pos(self.cur_pos).pid;
            }
            (2, None) => {
                let next = loop {
                    self.cur_pos = (self.cur_pos + 1) % NUM_PLAYERS;
                    let player = self.player_by_pos(self.cur_pos);
                    if player.is_active() {
                        break player.pid;
                    }
                };

                self.reseat();

                self.cur_pid = next;
                self.cur_pos = self.players[next].pos;
            }
            _ => {}
        }

        debug!("{} to play, {} balls left", self.cur_pid, self.num_balls);

        if self.is_frame_over() {
            self.end_frame();
        } else if self.num_colors() == 0 {
            self.num_balls += 1;
            self.respot_black = true;
            info!("black respotted");
        }
    }

    /// A manual decision may settle the frame outside of a visit.
    fn finish_if_decided(&mut self) {
        if self.is_frame_over() {
            self.reseat();
            self.end_frame();
        }
    }

    fn end_frame(&mut self) {
        self.end_timestamp = self.shot_timestamp;
        self.num_frames += 1;

        for p in self.players.values_mut() {
            match p.pos {
                0 => p.frame_3rd += 1,
                1 => p.frame_2nd += 1,
                _ => p.frame_1st += 1,
            }
        }

        info!("frame {} over", self.num_frames);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::GameConfig;

    fn state() -> GameState {
        GameState::new(&GameConfig::new(["Ann", "Bo", "Cid"]), 1)
    }

    fn pid(id: u8) -> PlayerId {
        PlayerId::new(id)
    }

    #[test]
    fn test_red_then_color_keeps_color_on_table() {
        let mut state = state();

        state.pot_ball(Ball::Red);
        assert_eq!(state.num_balls, 20);
        assert!(state.is_red_on());

        state.pot_ball(Ball::Black);
        assert_eq!(state.num_balls, 20);
        assert!(!state.is_red_on());
        assert_eq!(state.current_player().points(), 8);
        assert_eq!(state.current_player().cur_break(), 8);
    }

    #[test]
    fn test_rotation_through_round() {
        let mut state = state();

        state.end_turn();
        assert_eq!(state.current_pid(), pid(1));
        assert_eq!(state.previous_pid(), Some(pid(0)));

        state.end_turn();
        assert_eq!(state.current_pid(), pid(2));

        state.pot_ball(Ball::Red);
        state.end_turn();

        // new round: reseated by points, lowest first
        assert_eq!(state.current_pos(), 0);
        assert_eq!(state.player(pid(2)).pos(), 2);
        assert_eq!(state.current_pid(), pid(0));
    }

    #[test]
    fn test_foul_goes_to_previous_player() {
        let mut state = state();
        state.end_turn();

        state.commit_foul(Ball::Blue);

        assert_eq!(state.player(pid(0)).points(), 5);
        assert_eq!(state.player(pid(2)).points(), 0);
        assert!(state.is_foul());
        assert_eq!(state.current_pid(), pid(2));
    }

    #[test]
    fn test_foul_after_pot_goes_to_both() {
        let mut state = state();
        state.end_turn();

        state.pot_ball(Ball::Red);
        state.commit_foul(Ball::Brown);

        assert_eq!(state.player(pid(0)).points(), 4);
        assert_eq!(state.player(pid(2)).points(), 4);
        assert_eq!(state.player(pid(1)).points(), 1);
    }

    #[test]
    fn test_retake_returns_to_requester() {
        let mut state = state();
        state.end_turn();
        state.commit_foul(Ball::Brown);
        assert!(state.can_foul_retake());

        state.foul_retake();
        assert_eq!(state.current_pid(), pid(1));
        assert!(state.is_retake());
        assert!(!state.is_foul());

        // foul during the retake is paid to both opponents
        state.commit_foul(Ball::Brown);
        assert_eq!(state.player(pid(0)).points(), 8);
        assert_eq!(state.player(pid(2)).points(), 4);
        assert_eq!(state.current_pid(), pid(2));
    }

    #[test]
    fn test_manual_corrections() {
        let mut state = state();

        state.minus_balls();
        assert_eq!(state.num_balls, 20);
        state.plus_balls();
        assert_eq!(state.num_balls, 21);

        state.player_edit_points(pid(1), 12);
        state.player_edit_points(pid(1), -2);
        assert_eq!(state.player(pid(1)).points(), 10);
        assert!(!state.can_player_edit_points(pid(1), -11));
    }

    #[test]
    fn test_edit_points_out_of_range() {
        let mut state = state();
        state.player_edit_points(pid(0), 1);

        assert!(!state.can_player_edit_points(pid(0), i32::MAX));
        assert!(!state.can_player_edit_points(pid(0), i32::MIN));

        state.player_edit_points(pid(0), i32::MAX - 1);
        assert_eq!(state.player(pid(0)).points(), i32::MAX);
    }

    #[test]
    #[should_panic(expected = "cannot pot")]
    fn test_illegal_pot_panics() {
        let mut state = state();
        state.pot_ball(Ball::Pink);
    }

    #[test]
    #[should_panic(expected = "frame is not over")]
    fn test_new_frame_requires_decided_frame() {
        let mut state = state();
        state.new_frame();
    }

    #[test]
    fn test_log_shot_times_visits() {
        let mut state = state();

        state.log_shot(10_000);
        assert_eq!(state.current_player().frame_time_ms(), 0);
        state.end_turn();

        state.log_shot(25_000);
        assert_eq!(state.current_player().frame_time_ms(), 15_000);
        assert_eq!(state.frame_time_ms(40_000), 30_000);
    }
}
