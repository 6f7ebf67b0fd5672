/*!
 * Listener registration with explicit unsubscribe handles.
 */

use std::fmt;

/// Callback invoked for every emitted event
pub type Listener<E> = Box<dyn FnMut(&E)>;

/// Handle returned by `subscribe`; pass it back to `unsubscribe`.
///
/// Not `Clone`; a subscription is removed at most once.
#[derive(Debug, PartialEq, Eq, Hash)]
#[must_use = "dropping a Subscription leaves the listener registered"]
pub struct Subscription {
    id: u64,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Ordered set of listeners for one event type
pub struct ListenerRegistry<E> {
    next_id: u64,
    listeners: Vec<(u64, Listener<E>)>,
}

impl<E> ListenerRegistry<E> {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            listeners: Vec::new(),
        }
    }

    /// Register a listener; it is called in registration order
    pub fn subscribe(&mut self, listener: Listener<E>) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, listener));
        Subscription { id }
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(id, _)| *id != subscription.id);
        self.listeners.len() != before
    }

    /// Deliver an event to every registered listener
    pub fn emit(&mut self, event: &E) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Drop every listener
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

impl<E> Default for ListenerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for ListenerRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
