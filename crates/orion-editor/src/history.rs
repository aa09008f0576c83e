//! Linear snapshot history.
//!
//! Every committed gesture or document replacement stores the full document
//! text. Undo and redo move a cursor over the list; the caller rebuilds the
//! scene from whatever `current()` returns afterwards.

/// Snapshot list with a cursor. Never empty.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: Vec<String>,
    cursor: usize,
    /// Maximum number of retained snapshots.
    max_depth: usize,
}

impl History {
    pub fn new(initial: impl Into<String>, max_depth: usize) -> Self {
        Self {
            snapshots: vec![initial.into()],
            cursor: 0,
            max_depth: max_depth.max(1),
        }
    }

    /// Record a new snapshot after the cursor. Anything that was undone is
    /// discarded.
    pub fn commit(&mut self, snapshot: impl Into<String>) {
        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push(snapshot.into());
        self.cursor = self.snapshots.len() - 1;

        if self.snapshots.len() > self.max_depth {
            let excess = self.snapshots.len() - self.max_depth;
            self.snapshots.drain(..excess);
            self.cursor -= excess;
        }
        log::debug!(
            "history commit: {} of {}",
            self.cursor + 1,
            self.snapshots.len()
        );
    }

    /// Step back. Returns the snapshot to restore, or `None` at the start.
    pub fn undo(&mut self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Step forward. Returns the snapshot to restore, or `None` at the end.
    pub fn redo(&mut self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(&self.snapshots[self.cursor])
    }

    /// Forget everything and start over from `snapshot`.
    pub fn reset(&mut self, snapshot: impl Into<String>) {
        self.snapshots.clear();
        self.snapshots.push(snapshot.into());
        self.cursor = 0;
    }

    pub fn current(&self) -> &str {
        &self.snapshots[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undo_then_redo_restores() {
        let mut history = History::new("0", 10);
        history.commit("A");
        history.commit("B");
        assert_eq!(history.undo(), Some("A"));
        assert_eq!(history.redo(), Some("B"));
        assert_eq!(history.current(), "B");
    }

    #[test]
    fn commit_after_undo_drops_redo() {
        let mut history = History::new("0", 10);
        history.commit("A");
        history.commit("B");
        history.undo();
        history.commit("C");
        assert!(!history.can_redo());
        assert_eq!(history.redo(), None);
        assert_eq!(history.current(), "C");
        assert_eq!(history.undo(), Some("A"));
    }

    #[test]
    fn bounds_are_no_ops() {
        let mut history = History::new("0", 10);
        assert_eq!(history.undo(), None);
        assert_eq!(history.redo(), None);
        assert_eq!(history.current(), "0");
    }

    #[test]
    fn depth_cap_drops_oldest() {
        let mut history = History::new("0", 3);
        for s in ["1", "2", "3", "4"] {
            history.commit(s);
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.current(), "4");
        assert_eq!(history.undo(), Some("3"));
        assert_eq!(history.undo(), Some("2"));
        assert_eq!(history.undo(), None);
    }

    #[test]
    fn reset_clears_everything() {
        let mut history = History::new("0", 10);
        history.commit("A");
        history.reset("fresh");
        assert_eq!(history.len(), 1);
        assert!(!history.can_undo());
        assert_eq!(history.current(), "fresh");
    }
}
