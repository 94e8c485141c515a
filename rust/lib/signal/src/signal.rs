use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Callback type for value change notifications.
pub type ChangeHandler<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Unique handle for a subscription, returned by `subscribe()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

struct Inner<T> {
    value: RwLock<Arc<T>>,
    handlers: RwLock<Vec<(SubscriptionId, ChangeHandler<T>)>>,
    next_id: AtomicU64,
}

impl<T> Inner<T> {
    fn get(&self) -> Arc<T> {
        Arc::clone(&self.value.read().unwrap())
    }

    fn subscribe(&self, handler: ChangeHandler<T>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.write().unwrap().push((id, handler));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write().unwrap();
        let before = handlers.len();
        handlers.retain(|(hid, _)| *hid != id);
        handlers.len() < before
    }

    /// Call every handler with `value`, the value the triggering write
    /// committed. Locks are not held while handlers run.
    fn notify(&self, value: Arc<T>) {
        let handlers: Vec<ChangeHandler<T>> = self
            .handlers
            .read()
            .unwrap()
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in handlers {
            handler(&value);
        }
    }
}

/// A writable reactive value.
///
/// There is exactly one `Signal` per value; hand out [`ReadSignal`]s to
/// consumers that must not write.
pub struct Signal<T> {
    inner: Arc<Inner<T>>,
}

impl<T: Send + Sync + 'static> Signal<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                value: RwLock::new(Arc::new(value)),
                handlers: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Current value (Arc clone, no data copy).
    pub fn get(&self) -> Arc<T> {
        self.inner.get()
    }

    /// Run `f` against the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.read().unwrap())
    }

    /// Replace the value and notify subscribers.
    pub fn set(&self, value: T) {
        let value = Arc::new(value);
        *self.inner.value.write().unwrap() = Arc::clone(&value);
        self.inner.notify(value);
    }

    /// Mutate the value in place, notify subscribers and return whatever `f`
    /// returned.
    ///
    /// Outstanding snapshots from `get()` keep the old value (copy-on-write).
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R
    where
        T: Clone,
    {
        let (out, committed) = {
            let mut guard = self.inner.value.write().unwrap();
            let out = f(Arc::make_mut(&mut guard));
            (out, Arc::clone(&guard))
        };
        self.inner.notify(committed);
        out
    }

    /// Mutate a copy of the value; commit and notify only when `f` returns
    /// true. Returns whether the change was committed.
    pub fn update_if(&self, f: impl FnOnce(&mut T) -> bool) -> bool
    where
        T: Clone,
    {
        let committed = {
            let mut guard = self.inner.value.write().unwrap();
            let mut next = T::clone(&guard);
            if f(&mut next) {
                let next = Arc::new(next);
                *guard = Arc::clone(&next);
                Some(next)
            } else {
                None
            }
        };
        match committed {
            Some(value) => {
                self.inner.notify(value);
                true
            }
            None => false,
        }
    }

    /// Register a handler called after every committed change.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.inner.subscribe(Arc::new(handler))
    }

    /// Remove a handler. Returns false if the id was unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.unsubscribe(id)
    }

    /// A read-only view sharing this signal's value and subscriptions.
    pub fn read_only(&self) -> ReadSignal<T> {
        ReadSignal {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.handlers.read().unwrap().len()
    }
}

impl<T: Default + Send + Sync + 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("value", &self.inner.get())
            .finish()
    }
}

/// Read-only handle to a [`Signal`].
pub struct ReadSignal<T> {
    inner: Arc<Inner<T>>,
}

impl<T> ReadSignal<T> {
    pub fn get(&self) -> Arc<T> {
        self.inner.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.read().unwrap())
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.inner.subscribe(Arc::new(handler))
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.unsubscribe(id)
    }
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadSignal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReadSignal")
            .field("value", &self.inner.get())
            .finish()
    }
}
