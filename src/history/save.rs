//! Save slots.
//!
//! A game's whole history is written to one of three slots after every
//! change. Slot contents are a bincode-encoded [`SaveFile`]; the bytes live
//! in a [`SlotStore`], either in memory or as files in a directory.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::snapshot::{SnapshotError, StateSnapshot};
use super::undo::History;
use crate::core::state::GameState;

/// Number of save slots.
pub const NUM_SLOTS: usize = 3;

/// Current save file version.
pub const SAVE_VERSION: u32 = 1;

/// Failure to write or read a save.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("bincode: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("unsupported save version {0}")]
    UnsupportedVersion(u32),

    #[error("cursor {cursor} outside a history of {len}")]
    Cursor { cursor: usize, len: usize },

    #[error("slot {0} out of range")]
    Slot(usize),

    #[error("nothing to save")]
    Empty,
}

/// On-disk form of a game history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFile {
    pub version: u32,
    pub cursor: usize,
    pub snapshots: Vec<StateSnapshot>,
}

impl SaveFile {
    /// Capture a history. Fails if it is empty.
    pub fn from_history(history: &History<GameState>) -> Result<Self, SaveError> {
        let cursor = history.cursor().ok_or(SaveError::Empty)?;
        Ok(Self {
            version: SAVE_VERSION,
            cursor,
            snapshots: history.iter().map(StateSnapshot::from).collect(),
        })
    }

    /// Rebuild the history, validating every snapshot.
    pub fn into_history(self) -> Result<History<GameState>, SaveError> {
        if self.version != SAVE_VERSION {
            return Err(SaveError::UnsupportedVersion(self.version));
        }

        let len = self.snapshots.len();
        let states = self
            .snapshots
            .into_iter()
            .map(GameState::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        History::from_parts(states, self.cursor).ok_or(SaveError::Cursor {
            cursor: self.cursor,
            len,
        })
    }

    /// Creation time of the game, from its first snapshot.
    #[must_use]
    pub fn timestamp(&self) -> u64 {
        self.snapshots.first().map_or(0, |s| s.timestamp)
    }
}

/// Byte storage for save slots.
pub trait SlotStore {
    /// Bytes stored under `key`, if any.
    fn load(&self, key: &str) -> Option<Vec<u8>>;

    /// Replace the bytes stored under `key`.
    fn store(&mut self, key: &str, bytes: Vec<u8>) -> Result<(), SaveError>;

    /// Forget `key`. Removing a missing key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), SaveError>;
}

/// In-process store.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: FxHashMap<String, Vec<u8>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SlotStore for MemoryStore {
    fn load(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.get(key).cloned()
    }

    fn store(&mut self, key: &str, bytes: Vec<u8>) -> Result<(), SaveError> {
        self.entries.insert(key.to_string(), bytes);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SaveError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One file per key under a directory.
#[derive(Clone, Debug)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    /// Open a store, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, SaveError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.bin"))
    }
}

impl SlotStore for DirStore {
    fn load(&self, key: &str) -> Option<Vec<u8>> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Some(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("cannot read {}: {e}", self.path(key).display());
                None
            }
        }
    }

    fn store(&mut self, key: &str, bytes: Vec<u8>) -> Result<(), SaveError> {
        let path = self.path(key);
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), SaveError> {
        match fs::remove_file(self.path(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// A slot and when the game in it was started (0 for an empty slot).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveGameId {
    pub slot: usize,
    pub timestamp: u64,
}

/// The three save slots on top of a store.
#[derive(Clone, Debug, Default)]
pub struct SaveSlots<S: SlotStore> {
    store: S,
}

impl<S: SlotStore> SaveSlots<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Storage key of a slot.
    #[must_use]
    pub fn slot_key(slot: usize) -> String {
        format!("piste-on-piste-save-{slot}")
    }

    fn checked_key(slot: usize) -> Result<String, SaveError> {
        if slot < NUM_SLOTS {
            Ok(Self::slot_key(slot))
        } else {
            Err(SaveError::Slot(slot))
        }
    }

    /// Write a history to a slot.
    pub fn save(&mut self, slot: usize, history: &History<GameState>) -> Result<(), SaveError> {
        let key = Self::checked_key(slot)?;
        let file = SaveFile::from_history(history)?;
        let bytes = bincode::serialize(&file)?;
        self.store.store(&key, bytes)?;

        log::debug!("saved {} states to slot {slot}", file.snapshots.len());
        Ok(())
    }

    fn read(&self, slot: usize) -> Result<Option<SaveFile>, SaveError> {
        let key = Self::checked_key(slot)?;
        match self.store.load(&key) {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Read a slot, reporting why it could not be loaded.
    pub fn try_load(&self, slot: usize) -> Result<Option<History<GameState>>, SaveError> {
        self.read(slot)?.map(SaveFile::into_history).transpose()
    }

    /// Read a slot. Empty and unreadable slots both give `None`.
    #[must_use]
    pub fn load(&self, slot: usize) -> Option<History<GameState>> {
        match self.try_load(slot) {
            Ok(history) => history,
            Err(e) => {
                log::warn!("discarding save slot {slot}: {e}");
                None
            }
        }
    }

    /// Empty a slot.
    pub fn clear(&mut self, slot: usize) -> Result<(), SaveError> {
        let key = Self::checked_key(slot)?;
        self.store.remove(&key)
    }

    /// All slots, most recently started game first.
    #[must_use]
    pub fn saved_games(&self) -> Vec<SaveGameId> {
        let mut games: Vec<SaveGameId> = (0..NUM_SLOTS)
            .map(|slot| SaveGameId {
                slot,
                timestamp: self
                    .read(slot)
                    .ok()
                    .flatten()
                    .map_or(0, |file| file.timestamp()),
            })
            .collect();
        games.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        games
    }

    /// Slot for a new game: the one holding the oldest game, or the first
    /// empty one.
    #[must_use]
    pub fn new_game_slot(&self) -> usize {
        self.saved_games()
            .into_iter()
            .min_by_key(|g| (g.timestamp, g.slot))
            .map_or(0, |g| g.slot)
    }

    /// Slot contents as pretty JSON.
    pub fn export_json(&self, slot: usize) -> Result<Option<String>, SaveError> {
        match self.read(slot)? {
            Some(file) => Ok(Some(serde_json::to_string_pretty(&file)?)),
            None => Ok(None),
        }
    }

    /// Replace a slot with JSON produced by [`Self::export_json`]. The data
    /// is validated before anything is written.
    pub fn import_json(&mut self, slot: usize, json: &str) -> Result<(), SaveError> {
        let file: SaveFile = serde_json::from_str(json)?;
        let history = file.into_history()?;
        self.save(slot, &history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Ball, GameConfig};

    fn history(now_ms: u64) -> History<GameState> {
        let mut state = GameState::new(&GameConfig::default(), now_ms);
        let mut history = History::new();
        history.push(state.clone());
        state.pot_ball(Ball::Red);
        history.push(state);
        history
    }

    #[test]
    fn test_slot_keys() {
        assert_eq!(SaveSlots::<MemoryStore>::slot_key(0), "piste-on-piste-save-0");
        assert_eq!(SaveSlots::<MemoryStore>::slot_key(2), "piste-on-piste-save-2");
    }

    #[test]
    fn test_save_and_load() {
        let mut slots = SaveSlots::new(MemoryStore::new());
        let mut saved = history(10);
        saved.undo();

        slots.save(1, &saved).unwrap();
        let loaded = slots.load(1).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.cursor(), Some(0));
        assert_eq!(loaded.current(), saved.current());
        assert!(slots.load(0).is_none());
    }

    #[test]
    fn test_corrupt_slot_is_empty() {
        let mut slots = SaveSlots::new(MemoryStore::new());
        let key = SaveSlots::<MemoryStore>::slot_key(0);
        slots.store.store(&key, vec![0xff; 7]).unwrap();
        slots.save(1, &history(50)).unwrap();

        assert!(slots.load(0).is_none());
        assert!(slots.try_load(0).is_err());
        assert_eq!(slots.saved_games()[0], SaveGameId { slot: 1, timestamp: 50 });
        assert!(slots.saved_games().contains(&SaveGameId { slot: 0, timestamp: 0 }));
    }

    #[test]
    fn test_bad_cursor_rejected() {
        let mut file = SaveFile::from_history(&history(10)).unwrap();
        file.cursor = 5;

        assert!(matches!(
            file.into_history(),
            Err(SaveError::Cursor { cursor: 5, len: 2 })
        ));
    }

    #[test]
    fn test_saved_games_order() {
        let mut slots = SaveSlots::new(MemoryStore::new());
        assert_eq!(slots.new_game_slot(), 0);

        slots.save(0, &history(300)).unwrap();
        assert_eq!(slots.new_game_slot(), 1);
        slots.save(1, &history(100)).unwrap();
        slots.save(2, &history(200)).unwrap();

        let order: Vec<_> = slots.saved_games().iter().map(|g| g.slot).collect();
        assert_eq!(order, vec![0, 2, 1]);
        assert_eq!(slots.new_game_slot(), 1);
    }

    #[test]
    fn test_json_export_import() {
        let mut slots = SaveSlots::new(MemoryStore::new());
        slots.save(0, &history(10)).unwrap();

        let json = slots.export_json(0).unwrap().unwrap();
        assert!(json.contains("\"cursor\": 1"));

        slots.import_json(2, &json).unwrap();
        assert_eq!(
            slots.load(2).unwrap().current(),
            slots.load(0).unwrap().current()
        );
        assert!(slots.import_json(1, "{}").is_err());
        assert!(slots.load(1).is_none());
    }

    #[test]
    fn test_out_of_range_slot() {
        let mut slots = SaveSlots::new(MemoryStore::new());
        assert!(matches!(slots.save(3, &history(1)), Err(SaveError::Slot(3))));
        assert!(slots.load(3).is_none());
    }

    #[test]
    fn test_empty_history_not_saved() {
        let mut slots = SaveSlots::new(MemoryStore::new());
        assert!(matches!(slots.save(0, &History::new()), Err(SaveError::Empty)));
    }
}
