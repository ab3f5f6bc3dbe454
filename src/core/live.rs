//! Live views - push-based query results.
//!
//! A [`LiveView`] is a registry of subscribers for one logical query. Stores call
//! [`LiveView::publish`] with a freshly recomputed result after each committed write,
//! and every subscriber receives it on its own unbounded channel. Dropping or
//! cancelling a [`Subscription`] removes its registry entry and nothing else.
//!
//! The registry does not order concurrent publishers itself; stores publish while
//! holding their write gate, which keeps delivery in commit order.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;
use tracing::{debug, trace};

type Registry<T> = Mutex<Subscribers<T>>;

#[derive(Debug)]
struct Subscribers<T> {
    next_id: u64,
    senders: HashMap<u64, mpsc::UnboundedSender<T>>,
}

/// Subscriber registry for one logical view.
#[derive(Debug)]
pub struct LiveView<T> {
    name: &'static str,
    registry: Arc<Registry<T>>,
}

impl<T: Clone> LiveView<T> {
    /// Creates an empty registry; `name` only appears in logs.
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            registry: Arc::new(Mutex::new(Subscribers {
                next_id: 0,
                senders: HashMap::new(),
            })),
        }
    }

    /// Registers a subscriber and queues `initial` as its first value.
    pub fn subscribe(&self, initial: T) -> Subscription<T> {
        let (sender, receiver) = mpsc::unbounded_channel();
        // The receiver is alive, so this send cannot fail.
        let _ = sender.send(initial);

        let mut subscribers = lock(&*self.registry);
        let id = subscribers.next_id;
        subscribers.next_id += 1;
        subscribers.senders.insert(id, sender);
        debug!(view = self.name, id, "Subscriber registered");

        Subscription {
            id,
            receiver,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Whether any subscriber is registered.
    ///
    /// Stores use this to skip recomputing a view nobody is watching.
    #[must_use]
    pub fn is_observed(&self) -> bool {
        !lock(&*self.registry).senders.is_empty()
    }

    /// Number of registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        lock(&*self.registry).senders.len()
    }

    /// Delivers `value` to every subscriber, pruning those whose receiver is gone.
    pub fn publish(&self, value: &T) {
        let mut subscribers = lock(&*self.registry);
        subscribers
            .senders
            .retain(|_, sender| sender.send(value.clone()).is_ok());
        trace!(
            view = self.name,
            subscribers = subscribers.senders.len(),
            "Published view update"
        );
    }
}

/// A live view handle. Values arrive in commit order.
#[derive(Debug)]
pub struct Subscription<T> {
    id: u64,
    receiver: mpsc::UnboundedReceiver<T>,
    registry: Weak<Registry<T>>,
}

impl<T> Subscription<T> {
    /// Waits for the next value.
    ///
    /// Returns `None` once the owning store has been dropped and every queued value
    /// has been consumed.
    pub async fn next(&mut self) -> Option<T> {
        self.receiver.recv().await
    }

    /// Returns the next queued value without waiting.
    pub fn try_next(&mut self) -> Option<T> {
        self.receiver.try_recv().ok()
    }

    /// Stops receiving updates. Equivalent to dropping the subscription.
    pub fn cancel(self) {}
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&*registry).senders.remove(&self.id);
            trace!(id = self.id, "Subscriber removed");
        }
    }
}

fn lock<T>(registry: &Registry<T>) -> std::sync::MutexGuard<'_, Subscribers<T>> {
    // Registry mutations cannot panic midway, so a poisoned lock still holds valid data.
    registry
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}
