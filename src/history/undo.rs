//! Undo/redo history of immutable snapshots.
//!
//! Backed by an `im` persistent vector, so cloning a whole history (for a
//! save or a UI preview) is O(1).

use im::Vector;

/// Append-only snapshot sequence with a movable cursor.
///
/// Pushing after an undo discards the undone entries.
///
/// ```
/// use piste_on_piste::history::History;
///
/// let mut history = History::new();
/// history.push(1);
/// history.push(2);
/// history.undo();
/// assert_eq!(history.current(), Some(&1));
/// history.push(3);
/// assert!(!history.can_redo());
/// assert_eq!(history.len(), 2);
/// ```
#[derive(Clone, Debug)]
pub struct History<T: Clone> {
    entries: Vector<T>,
    cursor: Option<usize>,
}

impl<T: Clone> Default for History<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> History<T> {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vector::new(),
            cursor: None,
        }
    }

    /// Rebuild a history from saved entries. `None` if the cursor does not
    /// point at an entry.
    #[must_use]
    pub fn from_parts(entries: Vec<T>, cursor: usize) -> Option<Self> {
        if cursor >= entries.len() {
            return None;
        }

        Some(Self {
            entries: entries.into_iter().collect(),
            cursor: Some(cursor),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Index of the current entry.
    #[must_use]
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// The entry under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.cursor.and_then(|i| self.entries.get(i))
    }

    /// Add an entry after the cursor, dropping any redo entries.
    pub fn push(&mut self, entry: T) {
        let next = self.cursor.map_or(0, |i| i + 1);
        self.entries.truncate(next);
        self.entries.push_back(entry);
        self.cursor = Some(next);
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|i| i > 0)
    }

    pub fn undo(&mut self) {
        assert!(self.can_undo(), "nothing to undo");
        self.cursor = self.cursor.map(|i| i - 1);
    }

    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|i| i + 1 < self.entries.len())
    }

    pub fn redo(&mut self) {
        assert!(self.can_redo(), "nothing to redo");
        self.cursor = self.cursor.map(|i| i + 1);
    }

    /// All entries, oldest first, including undone ones.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_history() {
        let history: History<u32> = History::new();

        assert!(history.is_empty());
        assert_eq!(history.current(), None);
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_bounds() {
        let mut history = History::new();
        for i in 0..3 {
            history.push(i);
        }

        history.undo();
        history.undo();
        assert_eq!(history.current(), Some(&0));
        assert!(!history.can_undo());

        history.redo();
        history.redo();
        assert_eq!(history.current(), Some(&2));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_push_truncates_redo() {
        let mut history = History::new();
        history.push("a");
        history.push("b");
        history.push("c");
        history.undo();
        history.undo();

        history.push("d");

        let entries: Vec<_> = history.iter().copied().collect();
        assert_eq!(entries, vec!["a", "d"]);
        assert_eq!(history.cursor(), Some(1));
    }

    #[test]
    fn test_from_parts() {
        let history = History::from_parts(vec![1, 2, 3], 1).unwrap();
        assert_eq!(history.current(), Some(&2));
        assert!(history.can_redo());

        assert!(History::from_parts(vec![1, 2], 2).is_none());
        assert!(History::<u8>::from_parts(vec![], 0).is_none());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut history = History::new();
        history.push(1);
        let snapshot = history.clone();

        history.push(2);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(history.len(), 2);
    }

    #[test]
    #[should_panic(expected = "nothing to undo")]
    fn test_undo_past_start_panics() {
        let mut history = History::new();
        history.push(1);
        history.undo();
    }
}
