//! The scoring session: one game's history, its save slot and a clock.
//!
//! `Game` is what a scoreboard front end drives. Every accepted command
//! pushes a new state onto the history and writes the history to the game's
//! save slot, so undo, redo and reloading all see the same sequence.

use crate::core::action::Action;
use crate::core::ball::{Ball, NUM_COLORS};
use crate::core::clock::{Clock, SystemClock};
use crate::core::config::{ConfigError, GameConfig};
use crate::core::player::PlayerId;
use crate::core::state::GameState;
use crate::history::save::{SaveGameId, SaveSlots, SlotStore};
use crate::history::undo::History;
use crate::rules::{RulesEngine, RulesError};

/// A scoring session.
///
/// ```
/// use piste_on_piste::core::{Ball, GameConfig, ManualClock};
/// use piste_on_piste::game::Game;
/// use piste_on_piste::history::MemoryStore;
///
/// let mut game = Game::new(MemoryStore::new(), ManualClock::new(1_000));
/// game.new_game(GameConfig::new(["Ann", "Bo", "Cid"])).unwrap();
///
/// game.pot_ball(Ball::Red).unwrap();
/// assert_eq!(game.state().unwrap().current_player().points(), 1);
///
/// game.undo();
/// assert_eq!(game.state().unwrap().current_player().points(), 0);
/// ```
#[derive(Debug)]
pub struct Game<S: SlotStore, C: Clock = SystemClock> {
    config: GameConfig,
    history: History<GameState>,
    slots: SaveSlots<S>,
    slot: usize,
    clock: C,
}

impl<S: SlotStore> Game<S, SystemClock> {
    /// Session on the system clock.
    pub fn with_store(store: S) -> Self {
        Self::new(store, SystemClock)
    }
}

impl<S: SlotStore, C: Clock> Game<S, C> {
    /// Session with no game loaded.
    pub fn new(store: S, clock: C) -> Self {
        Self {
            config: GameConfig::default(),
            history: History::new(),
            slots: SaveSlots::new(store),
            slot: 0,
            clock,
        }
    }

    // === Accessors ===

    /// Current state, if a game is loaded.
    pub fn state(&self) -> Option<&GameState> {
        self.history.current()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn history(&self) -> &History<GameState> {
        &self.history
    }

    /// Slot the game is saved to.
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn slots(&self) -> &SaveSlots<S> {
        &self.slots
    }

    /// Give up the session, keeping its store.
    pub fn into_store(self) -> S {
        self.slots.into_store()
    }

    /// Saved games, newest first.
    pub fn saved_games(&self) -> Vec<SaveGameId> {
        self.slots.saved_games()
    }

    /// Elapsed frame time as `MM:SS`.
    pub fn frame_time(&self) -> Option<String> {
        let now = self.clock.now_ms();
        self.state().map(|s| s.frame_time(now))
    }

    // === Session ===

    /// Start a game in the slot holding the oldest save.
    ///
    /// Nothing is written until the first command.
    pub fn new_game(&mut self, config: GameConfig) -> Result<(), ConfigError> {
        config.validate()?;

        let state = GameState::new(&config, self.clock.now_ms());
        self.slot = self.slots.new_game_slot();
        self.history = History::new();
        self.history.push(state);
        self.config = config;

        log::info!("new game in slot {}", self.slot);
        Ok(())
    }

    /// Resume the game saved in `slot`. Leaves the session untouched and
    /// returns false if there is nothing usable there.
    pub fn load(&mut self, slot: usize) -> bool {
        let Some(history) = self.slots.load(slot) else {
            return false;
        };
        let Some(state) = history.current() else {
            return false;
        };

        let mut config = GameConfig::default().with_num_reds(state.max_balls() - NUM_COLORS);
        for player in state.get_players() {
            config.names[player.pid().index()] = player.name().to_string();
        }

        log::info!(
            "loaded slot {slot} at state {} of {}",
            history.cursor().map_or(0, |i| i + 1),
            history.len()
        );
        self.config = config;
        self.history = history;
        self.slot = slot;
        true
    }

    fn save(&mut self) {
        if let Err(e) = self.slots.save(self.slot, &self.history) {
            log::error!("failed to save slot {}: {e}", self.slot);
        }
    }

    // === Commands ===

    /// Apply a command to a copy of the current state and make the copy
    /// current.
    pub fn apply(&mut self, action: Action) -> Result<(), RulesError> {
        let current = self.history.current().ok_or(RulesError::NoGame)?;
        if !current.is_legal(&action) {
            return Err(RulesError::IllegalAction(action));
        }

        let now = self.clock.now_ms();
        let mut next = current.clone();
        if action.logs_shot() {
            next.log_shot(now);
        }
        next.apply(&action);
        if action == Action::NewFrame {
            next.set_timestamp(now);
        }

        self.history.push(next);
        self.save();
        Ok(())
    }

    pub fn pot_ball(&mut self, ball: Ball) -> Result<(), RulesError> {
        self.apply(Action::PotBall(ball))
    }

    pub fn commit_foul(&mut self, ball: Ball) -> Result<(), RulesError> {
        self.apply(Action::CommitFoul(ball))
    }

    pub fn end_turn(&mut self) -> Result<(), RulesError> {
        self.apply(Action::EndTurn)
    }

    pub fn foul_retake(&mut self) -> Result<(), RulesError> {
        self.apply(Action::FoulRetake)
    }

    pub fn concede(&mut self, pid: PlayerId) -> Result<(), RulesError> {
        self.apply(Action::Concede(pid))
    }

    pub fn declare_winner(&mut self, pid: PlayerId) -> Result<(), RulesError> {
        self.apply(Action::DeclareWinner(pid))
    }

    pub fn plus_balls(&mut self) -> Result<(), RulesError> {
        self.apply(Action::PlusBalls)
    }

    pub fn minus_balls(&mut self) -> Result<(), RulesError> {
        self.apply(Action::MinusBalls)
    }

    pub fn new_frame(&mut self) -> Result<(), RulesError> {
        self.apply(Action::NewFrame)
    }

    pub fn edit_points(&mut self, player: PlayerId, amount: i32) -> Result<(), RulesError> {
        self.apply(Action::EditPoints { player, amount })
    }

    // === Undo/Redo ===

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Step back one command. Panics if there is nothing to undo.
    pub fn undo(&mut self) {
        self.history.undo();
        self.save();
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Step forward one command. Panics if there is nothing to redo.
    pub fn redo(&mut self) {
        self.history.redo();
        self.save();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::history::save::MemoryStore;

    fn game() -> Game<MemoryStore, ManualClock> {
        let mut game = Game::new(MemoryStore::new(), ManualClock::new(1_000));
        game.new_game(GameConfig::new(["Ann", "Bo", "Cid"])).unwrap();
        game
    }

    #[test]
    fn test_no_game() {
        let mut game = Game::new(MemoryStore::new(), ManualClock::new(0));

        assert!(game.state().is_none());
        assert_eq!(game.end_turn(), Err(RulesError::NoGame));
        assert!(!game.load(0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut game = Game::new(MemoryStore::new(), ManualClock::new(0));
        let err = game.new_game(GameConfig::new(["Ann", "ann", "Cid"])).unwrap_err();

        assert_eq!(err, ConfigError::DuplicateName("Ann".to_string()));
        assert!(game.state().is_none());
    }

    #[test]
    fn test_new_game_not_saved_until_first_command() {
        let mut game = game();
        assert!(game.slots().load(0).is_none());

        game.pot_ball(Ball::Red).unwrap();
        assert_eq!(game.slots().load(0).unwrap().len(), 2);
    }

    #[test]
    fn test_illegal_command_leaves_history() {
        let mut game = game();

        assert_eq!(
            game.pot_ball(Ball::Pink),
            Err(RulesError::IllegalAction(Action::PotBall(Ball::Pink)))
        );
        assert_eq!(game.history().len(), 1);
    }

    #[test]
    fn test_oversized_edit_is_refused() {
        let mut game = game();
        game.edit_points(PlayerId::new(0), 1).unwrap();

        assert_eq!(
            game.edit_points(PlayerId::new(0), i32::MAX),
            Err(RulesError::IllegalAction(Action::EditPoints {
                player: PlayerId::new(0),
                amount: i32::MAX,
            }))
        );
        assert_eq!(game.state().unwrap().player(PlayerId::new(0)).points(), 1);
        assert_eq!(game.history().len(), 2);
    }

    #[test]
    fn test_shots_are_timed() {
        let mut game = game();

        game.clock().advance(2_000);
        game.pot_ball(Ball::Red).unwrap();
        game.clock().advance(5_000);
        game.pot_ball(Ball::Black).unwrap();

        let state = game.state().unwrap();
        assert_eq!(state.current_player().frame_time_ms(), 5_000);
        assert_eq!(game.frame_time().as_deref(), Some("00:05"));
    }

    #[test]
    fn test_undo_then_command_drops_redo() {
        let mut game = game();
        game.pot_ball(Ball::Red).unwrap();
        game.pot_ball(Ball::Blue).unwrap();

        game.undo();
        assert!(game.can_redo());
        game.end_turn().unwrap();

        assert!(!game.can_redo());
        assert_eq!(game.history().len(), 3);
        assert_eq!(game.state().unwrap().player(PlayerId::new(0)).points(), 1);
    }
}
