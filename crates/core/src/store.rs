//! Observable single-value store.
//!
//! Holds one process-wide value (a theme, a locale) that is handed to the
//! components needing it instead of being looked up globally.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Inner<T> {
    value: T,
    next_id: u64,
    listeners: Vec<(u64, Listener<T>)>,
}

pub struct ObservableStore<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for ObservableStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Default + Clone + PartialEq + Send + 'static> Default for ObservableStore<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + Send + 'static> ObservableStore<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                value,
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    #[must_use]
    pub fn get(&self) -> T {
        lock(&self.inner).value.clone()
    }

    /// Replace the value and notify listeners if it changed.
    ///
    /// Listeners run after the store lock is released, so they may read or
    /// write the store themselves.
    pub fn set(&self, value: T) {
        let listeners: Vec<Listener<T>> = {
            let mut inner = lock(&self.inner);
            if inner.value == value {
                return;
            }
            inner.value = value.clone();
            inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };
        for listener in listeners {
            listener(&value);
        }
    }

    /// Register `listener`; it stays attached while the subscription lives.
    #[must_use = "dropping the subscription detaches the listener"]
    pub fn on_change(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let mut inner = lock(&self.inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.push((id, Arc::new(listener)));
        drop(inner);

        let weak: Weak<Mutex<Inner<T>>> = Arc::downgrade(&self.inner);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    lock(&inner).listeners.retain(|(lid, _)| *lid != id);
                }
            })),
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        lock(&self.inner).listeners.len()
    }
}

fn lock<T>(inner: &Mutex<Inner<T>>) -> MutexGuard<'_, Inner<T>> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle returned by `ObservableStore::on_change`.
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.run_detach();
    }

    fn run_detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_detach();
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
