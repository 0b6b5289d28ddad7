//! Read progress notification
//!
//! A [`ListenerRegistry`] can be shared between threads: listeners may be added or
//! removed while another thread drives a stream. Notification runs synchronously on
//! the reading thread and takes a snapshot of the registered listeners first, so a
//! listener may unregister itself (or others) from inside its callback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::trace;

/// Receives the absolute byte offset each time a stream's read cursor advances.
pub trait ProgressListener: Send + Sync {
    fn progress(&self, offset: u64);
}

impl<F> ProgressListener for F
where
    F: Fn(u64) + Send + Sync,
{
    fn progress(&self, offset: u64) {
        self(offset)
    }
}

/// Handle returned by [`ListenerRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Thread-safe set of progress listeners.
#[derive(Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(ListenerId, Arc<dyn ProgressListener>)>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry pre-populated with `listeners`.
    pub fn with_listeners<I>(listeners: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ProgressListener>>,
    {
        let registry = Self::new();
        for listener in listeners {
            registry.register(listener);
        }
        registry
    }

    pub fn register(&self, listener: Arc<dyn ProgressListener>) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().unwrap_or_else(PoisonError::into_inner).push((id, listener));
        trace!("Registered progress listener {:?}", id);
        id
    }

    /// Remove a listener; false when the id is unknown.
    pub fn unregister(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(registered, _)| *registered != id);
        before != listeners.len()
    }

    pub fn len(&self) -> usize {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Call every registered listener with `offset`.
    pub fn notify(&self, offset: u64) {
        let snapshot: Vec<Arc<dyn ProgressListener>> = {
            let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
            if listeners.is_empty() {
                return;
            }
            listeners.iter().map(|(_, listener)| Arc::clone(listener)).collect()
        };

        for listener in snapshot {
            listener.progress(offset);
        }
    }
}

impl std::fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry").field("listeners", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::thread;

    #[test]
    fn closures_receive_offsets() {
        let registry = ListenerRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry.register(Arc::new(move |offset: u64| sink.lock().unwrap().push(offset)));

        registry.notify(3200);
        registry.notify(3600);

        assert_eq!(*seen.lock().unwrap(), vec![3200, 3600]);
    }

    #[test]
    fn prepopulated_registry_notifies_each_listener() {
        let total = Arc::new(AtomicU64::new(0));
        let listeners: Vec<Arc<dyn ProgressListener>> = (1..=3)
            .map(|weight| {
                let sink = Arc::clone(&total);
                Arc::new(move |offset: u64| {
                    sink.fetch_add(weight * offset, Ordering::Relaxed);
                }) as Arc<dyn ProgressListener>
            })
            .collect();

        let registry = ListenerRegistry::with_listeners(listeners);
        assert_eq!(registry.len(), 3);

        registry.notify(10);
        assert_eq!(total.load(Ordering::Relaxed), 60);
    }

    #[test]
    fn unregister_by_id() {
        let registry = ListenerRegistry::new();
        let first = registry.register(Arc::new(|_: u64| {}));
        let second = registry.register(Arc::new(|_: u64| {}));
        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);

        assert!(registry.unregister(first));
        assert!(!registry.unregister(first));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn listener_can_unregister_itself_during_notify() {
        let registry = Arc::new(ListenerRegistry::new());
        let calls = Arc::new(AtomicU64::new(0));
        let own_id = Arc::new(Mutex::new(None));

        let inner_registry = Arc::clone(&registry);
        let inner_calls = Arc::clone(&calls);
        let inner_id = Arc::clone(&own_id);
        let id = registry.register(Arc::new(move |_: u64| {
            inner_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *inner_id.lock().unwrap() {
                inner_registry.unregister(id);
            }
        }));
        *own_id.lock().unwrap() = Some(id);

        registry.notify(1);
        registry.notify(2);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(registry.is_empty());
    }

    #[test]
    fn concurrent_registration_while_notifying() {
        let registry = Arc::new(ListenerRegistry::new());
        let total = Arc::new(AtomicU64::new(0));

        let writers: Vec<_> = (0..4)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let total = Arc::clone(&total);
                thread::spawn(move || {
                    for _ in 0..25 {
                        let total = Arc::clone(&total);
                        let id = registry.register(Arc::new(move |_: u64| {
                            total.fetch_add(1, Ordering::Relaxed);
                        }));
                        registry.notify(0);
                        assert!(registry.unregister(id));
                    }
                })
            })
            .collect();

        for writer in writers {
            writer.join().unwrap();
        }

        assert!(registry.is_empty());
        assert!(total.load(Ordering::Relaxed) >= 100);
    }
}
