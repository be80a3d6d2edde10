/// Linear undo/redo history over immutable snapshots.
use std::fmt;

/// Handle returned by [`History::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<T> = Box<dyn FnMut(&T)>;

/// An ordered run of snapshots with a cursor.
///
/// The cursor always points at a valid entry: the constructor seeds the
/// first snapshot and nothing can remove the last one. Subscribers are
/// called synchronously, once, after each call that changes what
/// [`History::current`] returns or what lies around it.
pub struct History<T> {
    entries: Vec<T>,
    cursor: usize,
    limit: Option<usize>,
    listeners: Vec<(SubscriptionId, Listener<T>)>,
    next_subscription: u64,
}

impl<T> History<T> {
    pub fn new(initial: T) -> Self {
        Self {
            entries: vec![initial],
            cursor: 0,
            limit: None,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// A history that keeps at most `limit` snapshots, dropping the oldest.
    /// A limit of zero is treated as one.
    pub fn with_limit(initial: T, limit: usize) -> Self {
        Self {
            limit: Some(limit.max(1)),
            ..Self::new(initial)
        }
    }

    /// Record a new snapshot. Anything ahead of the cursor is discarded.
    pub fn push(&mut self, state: T) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(state);
        if let Some(limit) = self.limit {
            if self.entries.len() > limit {
                let overflow = self.entries.len() - limit;
                self.entries.drain(..overflow);
            }
        }
        self.cursor = self.entries.len() - 1;
        self.notify();
    }

    /// Step back one snapshot. Does nothing at the start.
    pub fn undo(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        self.notify();
    }

    /// Step forward one snapshot. Does nothing at the end.
    pub fn redo(&mut self) {
        if self.cursor + 1 >= self.entries.len() {
            return;
        }
        self.cursor += 1;
        self.notify();
    }

    /// Replace the whole history with a single snapshot, e.g. after loading
    /// a project, so the previous session cannot be undone into.
    pub fn clear_and_push(&mut self, state: T) {
        self.entries.clear();
        self.entries.push(state);
        self.cursor = 0;
        self.notify();
    }

    pub fn current(&self) -> &T {
        &self.entries[self.cursor]
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&T) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        let current = &self.entries[self.cursor];
        for (_, listener) in self.listeners.iter_mut() {
            listener(current);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for History<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("entries", &self.entries)
            .field("cursor", &self.cursor)
            .field("limit", &self.limit)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder(history: &mut History<&'static str>) -> Rc<RefCell<Vec<&'static str>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        history.subscribe(move |s: &&'static str| sink.borrow_mut().push(*s));
        seen
    }

    #[test]
    fn push_undo_push_clears_redo() {
        let mut h = History::new("S0");
        assert_eq!((h.len(), h.cursor()), (1, 0));
        h.push("S1");
        h.push("S2");
        assert_eq!((h.len(), h.cursor()), (3, 2));

        h.undo();
        h.undo();
        assert_eq!(h.cursor(), 0);
        assert_eq!(*h.current(), "S0");

        h.push("S3");
        assert_eq!(h.len(), 2);
        assert_eq!(*h.current(), "S3");
        h.undo();
        assert_eq!(*h.current(), "S0");
        assert!(!h.can_undo());
        assert!(h.can_redo());
    }

    #[test]
    fn boundaries_are_silent_no_ops() {
        let mut h = History::new("S0");
        let seen = recorder(&mut h);
        h.undo();
        h.redo();
        assert_eq!(h.cursor(), 0);
        assert!(seen.borrow().is_empty());

        h.push("S1");
        h.redo();
        assert_eq!(*seen.borrow(), vec!["S1"]);
    }

    #[test]
    fn every_mutation_notifies_once() {
        let mut h = History::new("S0");
        let seen = recorder(&mut h);
        h.push("S1");
        h.push("S2");
        h.undo();
        h.redo();
        h.clear_and_push("L");
        assert_eq!(*seen.borrow(), vec!["S1", "S2", "S1", "S2", "L"]);
    }

    #[test]
    fn clear_and_push_resets() {
        let mut h = History::new(0);
        h.push(1);
        h.push(2);
        h.undo();
        h.clear_and_push(9);
        assert_eq!(h.len(), 1);
        assert_eq!(h.cursor(), 0);
        assert_eq!(*h.current(), 9);
        assert!(!h.can_undo());
        assert!(!h.can_redo());
        assert!(!h.is_empty());
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let mut h = History::new("S0");
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        let id = h.subscribe(move |_| *sink.borrow_mut() += 1);
        h.push("S1");
        assert!(h.unsubscribe(id));
        assert!(!h.unsubscribe(id));
        h.push("S2");
        assert_eq!(*seen.borrow(), 1);
    }

    #[test]
    fn limit_drops_oldest() {
        let mut h = History::with_limit(0, 3);
        for i in 1..=5 {
            h.push(i);
        }
        assert_eq!(h.len(), 3);
        assert_eq!(h.cursor(), 2);
        assert_eq!(*h.current(), 5);
        h.undo();
        h.undo();
        assert_eq!(*h.current(), 3);
        assert!(!h.can_undo());
        assert_eq!(History::with_limit(0, 0).limit(), Some(1));
    }
}
