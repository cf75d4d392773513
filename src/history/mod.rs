//! Undo/redo history and persistence.
//!
//! - `undo`: snapshot sequence with a cursor
//! - `snapshot`: versioned serializable form of a `GameState`
//! - `save`: save slots and their byte stores

pub mod save;
pub mod snapshot;
pub mod undo;

pub use save::{
    DirStore, MemoryStore, SaveError, SaveFile, SaveGameId, SaveSlots, SlotStore, NUM_SLOTS,
};
pub use snapshot::{PlayerSnapshot, SnapshotError, StateSnapshot, SNAPSHOT_VERSION};
pub use undo::History;
