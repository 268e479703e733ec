//! Change notification for stores.

use std::{
    collections::HashMap,
    fmt::Debug,
    sync::{Arc, Mutex, Weak},
};

/// A handle to a registered change listener.
///
/// The listener is removed when the handle is cancelled or dropped.
#[must_use = "dropping a subscription cancels it"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Create a subscription that runs `cancel` when it is cancelled or dropped.
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Combine several subscriptions into one that cancels all of them.
    pub fn combine(subscriptions: Vec<Subscription>) -> Self {
        Self::new(move || drop(subscriptions))
    }

    /// Stop receiving notifications.
    pub fn cancel(mut self) {
        self.run_cancel();
    }

    fn run_cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_cancel();
    }
}

impl Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

/// A listener that receives a value each time the watched key changes.
pub type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Registry<K, T: ?Sized> {
    next_id: u64,
    listeners: HashMap<u64, (K, Listener<T>)>,
}

/// A set of listeners keyed by what they watch.
///
/// Listeners are called without the registry lock held, so a listener may
/// register or cancel other listeners.
pub struct WatcherRegistry<K, T: ?Sized> {
    inner: Arc<Mutex<Registry<K, T>>>,
}

impl<K, T: ?Sized> Clone for WatcherRegistry<K, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, T: ?Sized> Default for WatcherRegistry<K, T> {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Registry {
                next_id: 0,
                listeners: HashMap::new(),
            })),
        }
    }
}

impl<K, T> WatcherRegistry<K, T>
where
    K: PartialEq + Send + 'static,
    T: ?Sized + 'static,
{
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a listener for `key`.
    pub fn register(&self, key: K, listener: Listener<T>) -> Subscription {
        let id = match self.inner.lock() {
            Ok(mut registry) => {
                let id = registry.next_id;
                registry.next_id += 1;
                registry.listeners.insert(id, (key, listener));
                id
            }
            Err(error) => {
                tracing::error!("could not acquire watcher registry lock: {error}");
                return Subscription::new(|| {});
            }
        };

        let registry: Weak<Mutex<Registry<K, T>>> = Arc::downgrade(&self.inner);

        Subscription::new(move || {
            let Some(registry) = registry.upgrade() else {
                return;
            };

            match registry.lock() {
                Ok(mut registry) => {
                    registry.listeners.remove(&id);
                }
                Err(error) => {
                    tracing::error!("could not acquire watcher registry lock: {error}")
                }
            }
        })
    }

    /// Whether any listener is watching `key`.
    pub fn is_watched(&self, key: &K) -> bool {
        !self.listeners_for(key).is_empty()
    }

    /// Call every listener watching `key` with `value`.
    pub fn notify(&self, key: &K, value: &T) {
        for listener in self.listeners_for(key) {
            listener(value);
        }
    }

    fn listeners_for(&self, key: &K) -> Vec<Listener<T>> {
        match self.inner.lock() {
            Ok(registry) => {
                let mut listeners = registry
                    .listeners
                    .iter()
                    .filter(|(_, (watched, _))| watched == key)
                    .map(|(id, (_, listener))| (*id, listener.clone()))
                    .collect::<Vec<_>>();
                listeners.sort_by_key(|(id, _)| *id);

                listeners
                    .into_iter()
                    .map(|(_, listener)| listener)
                    .collect()
            }
            Err(error) => {
                tracing::error!("could not acquire watcher registry lock: {error}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use super::{Subscription, WatcherRegistry};

    #[test]
    fn notifies_only_matching_listeners() {
        let registry = WatcherRegistry::<String, i32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_listener = seen.clone();

        let _subscription = registry.register(
            "a".to_owned(),
            Arc::new(move |value: &i32| seen_by_listener.lock().unwrap().push(*value)),
        );

        registry.notify(&"a".to_owned(), &1);
        registry.notify(&"b".to_owned(), &2);

        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn slice_listeners_receive_vec_contents() {
        let registry = WatcherRegistry::<&str, [i32]>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_by_listener = seen.clone();

        let _subscription = registry.register(
            "a",
            Arc::new(move |values: &[i32]| {
                seen_by_listener.lock().unwrap().extend_from_slice(values)
            }),
        );

        let values = vec![1, 2, 3];
        registry.notify(&"a", &values);

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn dropping_subscription_removes_listener() {
        let registry = WatcherRegistry::<&str, ()>::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let subscription = registry.register(
            "a",
            Arc::new(move |_: &()| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );
        registry.notify(&"a", &());
        drop(subscription);
        registry.notify(&"a", &());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!registry.is_watched(&"a"));
    }

    #[test]
    fn cancel_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let subscription = Subscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        subscription.cancel();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn combined_subscription_cancels_all() {
        let registry = WatcherRegistry::<&str, ()>::new();
        let first = registry.register("a", Arc::new(|_: &()| {}));
        let second = registry.register("b", Arc::new(|_: &()| {}));

        let combined = Subscription::combine(vec![first, second]);
        assert!(registry.is_watched(&"a"));
        assert!(registry.is_watched(&"b"));

        combined.cancel();
        assert!(!registry.is_watched(&"a"));
        assert!(!registry.is_watched(&"b"));
    }

    #[test]
    fn listener_may_cancel_itself() {
        let registry = WatcherRegistry::<&str, ()>::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));
        let slot_for_listener = slot.clone();

        let subscription = registry.register(
            "a",
            Arc::new(move |_: &()| {
                slot_for_listener.lock().unwrap().take();
            }),
        );
        *slot.lock().unwrap() = Some(subscription);

        registry.notify(&"a", &());

        assert!(!registry.is_watched(&"a"));
    }
}
