use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockWriteGuard};

use crate::binding::Binding;
use crate::error::WriteError;

type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Reactive state wrapper with interior mutability.
///
/// `State<T>` is a shared handle: it uses `Arc<RwLock<T>>` internally, so
/// clones are cheap and every clone sees the same value. Observers registered
/// with [`State::subscribe`] run synchronously after each `set`/`update`, in
/// registration order. Writers are serialized and the next mutation waits
/// until every observer of the previous one has returned, so notifications
/// are delivered in exactly the order the mutations happened.
///
/// The value lock is released before observers run, so an observer may read
/// the state it observes. It must not mutate it; that deadlocks.
///
/// # Example
///
/// ```
/// use tabula::state::State;
///
/// let widths = State::new(vec!["auto".to_string()]);
/// let _sub = widths.subscribe(|v| println!("now {v:?}"));
/// widths.update(|v| v.push("120px".into()));
/// assert_eq!(widths.get().len(), 2);
/// ```
pub struct State<T> {
    inner: Arc<RwLock<T>>,
    writer: Arc<Mutex<()>>,
    dirty: Arc<AtomicBool>,
    observers: Arc<RwLock<Vec<(u64, Observer<T>)>>>,
    next_id: Arc<AtomicU64>,
}

impl<T> State<T> {
    /// Create a new state with the given value
    pub fn new(value: T) -> Self {
        Self {
            inner: Arc::new(RwLock::new(value)),
            writer: Arc::new(Mutex::new(())),
            dirty: Arc::new(AtomicBool::new(false)),
            observers: Arc::new(RwLock::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get a clone of the current value
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.with(T::clone)
    }

    /// Borrow the current value for the duration of `f`.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        match self.inner.read() {
            Ok(guard) => f(&guard),
            Err(poisoned) => f(&poisoned.into_inner()),
        }
    }

    /// Set a new value
    pub fn set(&self, value: T) {
        self.update(|current| *current = value);
    }

    /// Update the value using a closure
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let Ok(()) = self.try_update(|value| {
            f(value);
            Ok::<_, Infallible>(())
        });
    }

    /// Update the value with a closure that may refuse.
    ///
    /// On `Err` the closure must have left the value as it found it; the
    /// state is not marked dirty and no observer runs.
    pub fn try_update<R, E>(&self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let _writer = self.writer_guard();
        let out = {
            let mut guard = self.write_guard();
            f(&mut *guard)?
        };
        self.dirty.store(true, Ordering::SeqCst);
        self.with(|value| self.notify(value));
        Ok(out)
    }

    /// A handle that can read and observe this state but not change it.
    pub fn read_only(&self) -> ReadState<T> {
        ReadState(self.clone())
    }

    /// Register an observer called after every mutation.
    ///
    /// The observer stays attached until the returned [`Subscription`] is
    /// cancelled or dropped; call [`Subscription::detach`] to keep it for the
    /// lifetime of the state.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
        T: 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut observers) = self.observers.write() {
            observers.push((id, Arc::new(observer)));
        }

        let observers = Arc::downgrade(&self.observers);
        Subscription {
            cancel: Some(Box::new(move || {
                if let Some(observers) = observers.upgrade()
                    && let Ok(mut observers) = observers.write()
                {
                    observers.retain(|(existing, _)| *existing != id);
                }
            })),
        }
    }

    /// Number of attached observers.
    pub fn observer_count(&self) -> usize {
        self.observers.read().map(|o| o.len()).unwrap_or(0)
    }

    /// Check if the state has been modified since last check
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    /// Clear the dirty flag
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    fn writer_guard(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, T> {
        self.inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn notify(&self, value: &T) {
        // Snapshot so observers can subscribe/cancel without holding this lock.
        let observers: Vec<Observer<T>> = match self.observers.read() {
            Ok(observers) => observers.iter().map(|(_, o)| Arc::clone(o)).collect(),
            Err(_) => return,
        };
        for observer in observers {
            observer(value);
        }
    }
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            writer: Arc::clone(&self.writer),
            dirty: Arc::clone(&self.dirty),
            observers: Arc::clone(&self.observers),
            next_id: Arc::clone(&self.next_id),
        }
    }
}

impl<T: Default> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with(|value| {
            f.debug_struct("State")
                .field("value", value)
                .field("dirty", &self.is_dirty())
                .field("observers", &self.observer_count())
                .finish()
        })
    }
}

impl<T> Binding<T> for State<T>
where
    T: Clone + Send + Sync,
{
    fn read(&self) -> T {
        self.get()
    }

    fn write(&self, value: T) -> Result<(), WriteError> {
        self.set(value);
        Ok(())
    }
}

/// Read-only view of a [`State`].
///
/// Handed out where callers may watch a value whose every change has to pass
/// through its owner.
///
/// ```compile_fail
/// use tabula::state::State;
///
/// let view = State::new(1).read_only();
/// view.set(2);
/// ```
pub struct ReadState<T>(State<T>);

impl<T> ReadState<T> {
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.0.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        self.0.with(f)
    }

    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
        T: 'static,
    {
        self.0.subscribe(observer)
    }
}

impl<T> Clone for ReadState<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ReadState<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.with(|value| f.debug_tuple("ReadState").field(value).finish())
    }
}

/// Handle returned by [`State::subscribe`].
#[must_use = "dropping a Subscription detaches the observer"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    /// Detach the observer now.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Keep the observer attached for as long as the state lives.
    pub fn detach(mut self) {
        self.cancel = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}
