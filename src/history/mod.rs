//! # History
//!
//! A linear two-stack undo/redo history. Actions are plain data; the history
//! never holds a reference to the document it edits. Instead the owner passes
//! its document in at undo/redo time as an [`ActionConsumer`], which
//! interprets the action in the requested direction.
//!
//! Branching is not supported: recording a new action after an undo throws
//! away everything that could have been redone.

/// Direction an action is being interpreted in.
#[derive(Debug, PartialEq, Eq)]
pub enum DoUndo<'a, A> {
    /// Re-apply the forward effect (redo).
    Do(&'a A),
    /// Apply the reverse effect (undo).
    Undo(&'a A),
}

/// Something an action can be interpreted against.
pub trait ActionConsumer<A> {
    fn apply(&mut self, action: DoUndo<'_, A>);
}

#[derive(Debug, Clone)]
pub struct History<A> {
    undo_stack: Vec<A>,
    redo_stack: Vec<A>,
}

impl<A> Default for History<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> History<A> {
    pub const fn new() -> Self {
        History {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Record an action that the caller has *already* applied.
    pub fn append(&mut self, action: A) {
        self.redo_stack.clear();
        self.undo_stack.push(action);
    }

    /// Reverse the most recent action against `target`.
    ///
    /// Returns `false` (and touches nothing) when there is nothing to undo.
    pub fn undo<C: ActionConsumer<A>>(&mut self, target: &mut C) -> bool {
        let Some(action) = self.undo_stack.pop() else {
            return false;
        };
        target.apply(DoUndo::Undo(&action));
        self.redo_stack.push(action);
        true
    }

    /// Re-apply the most recently undone action against `target`.
    pub fn redo<C: ActionConsumer<A>>(&mut self, target: &mut C) -> bool {
        let Some(action) = self.redo_stack.pop() else {
            return false;
        };
        target.apply(DoUndo::Do(&action));
        self.undo_stack.push(action);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Integer log: `Do(n)` pushes n, `Undo(n)` pops and checks it was n.
    #[derive(Default)]
    struct Log(Vec<i32>);

    impl ActionConsumer<i32> for Log {
        fn apply(&mut self, action: DoUndo<'_, i32>) {
            match action {
                DoUndo::Do(n) => self.0.push(*n),
                DoUndo::Undo(n) => assert_eq!(self.0.pop(), Some(*n)),
            }
        }
    }

    fn recorded(values: &[i32]) -> (History<i32>, Log) {
        let mut history = History::new();
        let mut log = Log::default();
        for &v in values {
            log.0.push(v);
            history.append(v);
        }
        (history, log)
    }

    #[test]
    fn empty_history_is_a_noop() {
        let mut history = History::<i32>::new();
        let mut log = Log::default();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert!(!history.undo(&mut log));
        assert!(!history.redo(&mut log));
        assert!(log.0.is_empty());
    }

    #[test]
    fn undo_runs_in_reverse_order() {
        let (mut history, mut log) = recorded(&[1, 2, 3]);
        assert!(history.undo(&mut log));
        assert_eq!(log.0, vec![1, 2]);
        assert!(history.undo(&mut log));
        assert!(history.undo(&mut log));
        assert!(log.0.is_empty());
        assert!(!history.can_undo());
        assert_eq!(history.redo_depth(), 3);
    }

    #[test]
    fn redo_reapplies_what_was_undone() {
        let (mut history, mut log) = recorded(&[7, 8]);
        history.undo(&mut log);
        history.undo(&mut log);
        assert!(history.redo(&mut log));
        assert_eq!(log.0, vec![7]);
        assert!(history.redo(&mut log));
        assert_eq!(log.0, vec![7, 8]);
        assert!(!history.can_redo());
    }

    #[test]
    fn append_discards_redo_branch() {
        let (mut history, mut log) = recorded(&[1, 2]);
        history.undo(&mut log);
        assert!(history.can_redo());

        log.0.push(5);
        history.append(5);
        assert!(!history.can_redo());
        assert!(!history.redo(&mut log));
        assert_eq!(log.0, vec![1, 5]);
        assert_eq!(history.undo_depth(), 2);
    }

    #[test]
    fn an_action_lives_on_exactly_one_stack() {
        let (mut history, mut log) = recorded(&[1, 2, 3]);
        history.undo(&mut log);
        history.undo(&mut log);
        history.redo(&mut log);
        assert_eq!(history.undo_depth() + history.redo_depth(), 3);
    }
}
