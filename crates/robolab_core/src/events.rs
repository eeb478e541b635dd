//! Message passing between a host application and the scene controller
//!
//! Three small pieces replace ambient global event dispatch:
//!
//! - [`CommandQueue`] / [`CommandSender`]: inbound commands. Producers hold
//!   a cloneable sender; the frame loop drains the queue once per frame.
//! - [`NotificationBus`]: outbound notifications delivered synchronously
//!   to subscribers, unsubscribed through a [`SubscriptionHandle`].
//! - [`ListenerRegistry`]: bookkeeping for input listeners a host has
//!   wired up, so teardown can remove all of them exactly once.
//!
//! # Example
//!
//! ```rust
//! use robolab_core::events::{CommandQueue, NotificationBus};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut queue = CommandQueue::<u32>::new();
//! let sender = queue.sender();
//! sender.send(7);
//! assert_eq!(queue.drain(), vec![7]);
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let mut bus = NotificationBus::<&'static str>::new();
//! let sink = seen.clone();
//! let handle = bus.subscribe(move |n| sink.borrow_mut().push(*n));
//! bus.publish(&"score");
//! bus.unsubscribe(handle);
//! bus.publish(&"ignored");
//! assert_eq!(*seen.borrow(), vec!["score"]);
//! ```

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::hash::Hash;
use std::sync::mpsc::{self, Receiver, Sender};

/// Sending half of a [`CommandQueue`]
///
/// Cloneable and `Send` so it can be handed to whatever produces input.
#[derive(Debug)]
pub struct CommandSender<T> {
    tx: Sender<T>,
}

impl<T> Clone for CommandSender<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> CommandSender<T> {
    /// Queue a command. Returns `false` once the queue has been closed;
    /// commands sent after teardown are dropped silently.
    pub fn send(&self, command: T) -> bool {
        self.tx.send(command).is_ok()
    }
}

/// Inbound command queue drained by the frame loop
#[derive(Debug)]
pub struct CommandQueue<T> {
    tx: Sender<T>,
    rx: Option<Receiver<T>>,
}

impl<T> Default for CommandQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CommandQueue<T> {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx: Some(rx) }
    }

    /// Create a new sender for this queue
    pub fn sender(&self) -> CommandSender<T> {
        CommandSender {
            tx: self.tx.clone(),
        }
    }

    /// Take every command queued so far, in send order
    pub fn drain(&mut self) -> Vec<T> {
        match &self.rx {
            Some(rx) => rx.try_iter().collect(),
            None => Vec::new(),
        }
    }

    /// Close the queue; pending commands are discarded
    pub fn close(&mut self) {
        if let Some(rx) = self.rx.take() {
            let dropped = rx.try_iter().count();
            if dropped > 0 {
                tracing::debug!(dropped, "discarded pending commands on close");
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.rx.is_none()
    }
}

/// Handle returned by [`NotificationBus::subscribe`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionHandle(u64);

type Subscriber<T> = Box<dyn FnMut(&T)>;

/// Synchronous publish/subscribe channel for outbound notifications
pub struct NotificationBus<T> {
    subscribers: SmallVec<[(SubscriptionHandle, Subscriber<T>); 4]>,
    next_id: u64,
    published: u64,
}

impl<T> Default for NotificationBus<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NotificationBus<T> {
    pub fn new() -> Self {
        Self {
            subscribers: SmallVec::new(),
            next_id: 1,
            published: 0,
        }
    }

    /// Register a subscriber
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionHandle
    where
        F: FnMut(&T) + 'static,
    {
        let handle = SubscriptionHandle(self.next_id);
        self.next_id += 1;
        self.subscribers.push((handle, Box::new(callback)));
        handle
    }

    /// Remove a subscriber. Unknown handles are ignored.
    pub fn unsubscribe(&mut self, handle: SubscriptionHandle) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(h, _)| *h != handle);
        before != self.subscribers.len()
    }

    /// Deliver a notification to every subscriber in subscription order
    pub fn publish(&mut self, notification: &T) {
        self.published += 1;
        for (_, callback) in self.subscribers.iter_mut() {
            callback(notification);
        }
    }

    /// Drop all subscribers
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Total notifications published over the bus lifetime
    pub fn published_count(&self) -> u64 {
        self.published
    }
}

/// Identifier for a registered listener
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Tracks which listener kinds a host has attached
///
/// Removal is idempotent: removing an id twice, or after [`clear`](Self::clear),
/// is a no-op that reports `false`.
#[derive(Debug)]
pub struct ListenerRegistry<K> {
    listeners: FxHashMap<ListenerId, K>,
    next_id: u64,
}

impl<K> Default for ListenerRegistry<K> {
    fn default() -> Self {
        Self {
            listeners: FxHashMap::default(),
            next_id: 1,
        }
    }
}

impl<K: Copy + Eq + Hash> ListenerRegistry<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: K) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.insert(id, kind);
        id
    }

    pub fn remove(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Whether at least one listener of this kind is attached
    pub fn is_listening(&self, kind: K) -> bool {
        self.listeners.values().any(|k| *k == kind)
    }

    /// Remove every listener, returning how many were attached
    pub fn clear(&mut self) -> usize {
        let count = self.listeners.len();
        self.listeners.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_queue_preserves_order_across_senders() {
        let mut queue = CommandQueue::new();
        let a = queue.sender();
        let b = a.clone();
        a.send(1);
        b.send(2);
        a.send(3);
        assert_eq!(queue.drain(), vec![1, 2, 3]);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_send_after_close_is_dropped() {
        let mut queue = CommandQueue::new();
        let sender = queue.sender();
        sender.send("pending");
        queue.close();
        assert!(queue.is_closed());
        assert!(!sender.send("late"));
        assert!(queue.drain().is_empty());
        queue.close();
    }

    #[test]
    fn test_bus_unsubscribe() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = NotificationBus::new();

        let first = log.clone();
        let h1 = bus.subscribe(move |n: &i32| first.borrow_mut().push(("a", *n)));
        let second = log.clone();
        bus.subscribe(move |n: &i32| second.borrow_mut().push(("b", *n)));

        bus.publish(&1);
        assert!(bus.unsubscribe(h1));
        assert!(!bus.unsubscribe(h1));
        bus.publish(&2);

        assert_eq!(*log.borrow(), vec![("a", 1), ("b", 1), ("b", 2)]);
        assert_eq!(bus.published_count(), 2);
    }

    #[test]
    fn test_listener_registry_idempotent_removal() {
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        enum Kind {
            Keyboard,
            Pointer,
        }

        let mut registry = ListenerRegistry::new();
        let key = registry.register(Kind::Keyboard);
        registry.register(Kind::Pointer);
        assert!(registry.is_listening(Kind::Keyboard));

        assert!(registry.remove(key));
        assert!(!registry.remove(key));
        assert!(!registry.is_listening(Kind::Keyboard));

        assert_eq!(registry.clear(), 1);
        assert_eq!(registry.clear(), 0);
        assert!(registry.is_empty());
    }
}
