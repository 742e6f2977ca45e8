//! Persisted column customizations: order and width.
//!
//! Each axis is a small state machine. It starts from the caller's default,
//! tries once to adopt a persisted value (validated against the current field
//! set, all or nothing), and writes its full value back to the backend after
//! every mutation. Without a backend it simply keeps the default and skips
//! writes.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ConfigError, CustomizationError};
use crate::persist::PersistenceBackend;
use crate::state::{ReadState, State, Subscription};

/// Display order of the columns: a permutation of the field keys.
pub type ColumnOrders = Vec<String>;

/// Explicit column widths; columns without an entry have no explicit width.
pub type ColumnWidths = BTreeMap<String, String>;

type Check<T> = fn(&T, &[String]) -> Result<(), CustomizationError>;

/// Where an axis got its current value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisStatus {
    /// Still on the caller-supplied default.
    Default,
    /// A persisted value was validated and adopted.
    Restored,
}

/// Check a column order against the current field set.
///
/// Every element must be a known field, every field must be present, and no
/// element may repeat.
pub fn check_orders(candidate: &ColumnOrders, fields: &[String]) -> Result<(), CustomizationError> {
    let mut seen = HashSet::with_capacity(candidate.len());
    for key in candidate {
        if !fields.contains(key) {
            return Err(CustomizationError::UnknownKey(key.clone()));
        }
        if !seen.insert(key.as_str()) {
            return Err(CustomizationError::DuplicateKey(key.clone()));
        }
    }
    match fields.iter().find(|f| !seen.contains(f.as_str())) {
        Some(missing) => Err(CustomizationError::MissingKey(missing.clone())),
        None => Ok(()),
    }
}

/// Check column widths against the current field set.
///
/// Widths may cover any subset of the fields, but no key outside it.
pub fn check_widths(candidate: &ColumnWidths, fields: &[String]) -> Result<(), CustomizationError> {
    match candidate.keys().find(|key| !fields.contains(key)) {
        Some(unknown) => Err(CustomizationError::UnknownKey(unknown.clone())),
        None => Ok(()),
    }
}

fn parse_checked<T: DeserializeOwned>(
    raw: &str,
    fields: &[String],
    check: Check<T>,
) -> Result<T, CustomizationError> {
    let candidate: T = serde_json::from_str(raw).map_err(CustomizationError::parse)?;
    check(&candidate, fields)?;
    Ok(candidate)
}

/// One persisted customization axis.
///
/// The value can only change through [`set`](Self::set),
/// [`update`](Self::update), [`load_raw`](Self::load_raw) and
/// [`reset`](Self::reset), all of which keep it valid for the field set.
pub struct Persisted<T> {
    key: String,
    default: T,
    state: State<T>,
    restored: AtomicBool,
    fields: Arc<[String]>,
    check: Check<T>,
    _write_back: Option<Subscription>,
}

impl<T> Persisted<T>
where
    T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn new(
        key: String,
        default: T,
        fields: Arc<[String]>,
        check: Check<T>,
        backend: Option<Arc<dyn PersistenceBackend>>,
    ) -> Self {
        let state = State::new(default.clone());
        let mut restored = false;

        let write_back = backend.map(|backend| {
            match backend.get(&key) {
                Ok(Some(raw)) => match parse_checked(&raw, &fields, check) {
                    Ok(value) => {
                        debug!("restored '{key}' from persisted customization");
                        state.set(value);
                        state.clear_dirty();
                        restored = true;
                    }
                    Err(e) => warn!("discarding persisted '{key}': {e}"),
                },
                Ok(None) => debug!("no persisted '{key}', keeping default"),
                Err(e) => warn!("could not read '{key}', keeping default: {e}"),
            }

            let key = key.clone();
            state.subscribe(move |value: &T| write(backend.as_ref(), &key, value))
        });

        Self {
            key,
            default,
            state,
            restored: AtomicBool::new(restored),
            fields,
            check,
            _write_back: write_back,
        }
    }

    /// The backend key this axis persists under.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn status(&self) -> AxisStatus {
        if self.restored.load(Ordering::SeqCst) {
            AxisStatus::Restored
        } else {
            AxisStatus::Default
        }
    }

    pub fn get(&self) -> T {
        self.state.get()
    }

    /// A live, read-only handle on the current value.
    pub fn state(&self) -> ReadState<T> {
        self.state.read_only()
    }

    /// Replace the value, if `candidate` passes validation.
    ///
    /// A rejected candidate leaves the value untouched and writes nothing.
    pub fn set(&self, candidate: T) -> Result<(), CustomizationError> {
        (self.check)(&candidate, &self.fields)?;
        self.state.set(candidate);
        Ok(())
    }

    /// Apply `f` to a copy of the value and adopt the result if it validates.
    pub fn update<E>(&self, f: impl FnOnce(&mut T) -> Result<(), E>) -> Result<(), CustomizationError>
    where
        E: Into<CustomizationError>,
    {
        let mut candidate = self.get();
        f(&mut candidate).map_err(Into::into)?;
        self.set(candidate)
    }

    /// Try to adopt a raw serialized candidate, e.g. one pasted by a user.
    ///
    /// An adopted candidate counts as restored.
    pub fn load_raw(&self, raw: &str) -> Result<(), CustomizationError> {
        let candidate = parse_checked(raw, &self.fields, self.check)?;
        self.state.set(candidate);
        self.restored.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Go back to the default value. The default is persisted like any change.
    pub fn reset(&self) {
        self.state.set(self.default.clone());
        self.restored.store(false, Ordering::SeqCst);
    }
}

impl<T> std::fmt::Debug for Persisted<T>
where
    T: std::fmt::Debug + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persisted")
            .field("key", &self.key)
            .field("status", &self.status())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn write<T: Serialize>(backend: &dyn PersistenceBackend, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("could not serialize '{key}': {e}");
            return;
        }
    };
    match backend.set(key, &raw) {
        Ok(()) => debug!("persisted '{key}'"),
        Err(e) => warn!("could not persist '{key}': {e}"),
    }
}

/// Column order and width customizations for one table.
///
/// The default column order is the authoritative field set: persisted orders
/// must be a permutation of it, persisted widths may only name its keys.
#[derive(Debug)]
pub struct CustomizationStore {
    fields: Arc<[String]>,
    orders: Persisted<ColumnOrders>,
    widths: Persisted<ColumnWidths>,
}

impl CustomizationStore {
    /// Create the store and restore persisted values from `backend`.
    ///
    /// Values are stored under `"{storage_key}-columnOrders"` and
    /// `"{storage_key}-columnWidths"`.
    pub fn new(
        storage_key: &str,
        default_orders: ColumnOrders,
        default_widths: ColumnWidths,
        backend: Option<Arc<dyn PersistenceBackend>>,
    ) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for key in &default_orders {
            if !seen.insert(key.as_str()) {
                return Err(ConfigError::DuplicateField(key.clone()));
            }
        }
        if let Some(unknown) = default_widths.keys().find(|k| !seen.contains(k.as_str())) {
            return Err(ConfigError::UnknownColumn(unknown.clone()));
        }

        let fields: Arc<[String]> = default_orders.clone().into();
        let orders = Persisted::new(
            format!("{storage_key}-columnOrders"),
            default_orders,
            Arc::clone(&fields),
            check_orders,
            backend.clone(),
        );
        let widths = Persisted::new(
            format!("{storage_key}-columnWidths"),
            default_widths,
            Arc::clone(&fields),
            check_widths,
            backend,
        );

        Ok(Self {
            fields,
            orders,
            widths,
        })
    }

    /// The authoritative field keys, in default order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn orders(&self) -> &Persisted<ColumnOrders> {
        &self.orders
    }

    pub fn widths(&self) -> &Persisted<ColumnWidths> {
        &self.widths
    }

    pub fn column_orders(&self) -> ColumnOrders {
        self.orders.get()
    }

    pub fn column_widths(&self) -> ColumnWidths {
        self.widths.get()
    }

    pub fn set_column_orders(&self, orders: ColumnOrders) -> Result<(), CustomizationError> {
        self.orders.set(orders)
    }

    /// Move column `key` so that it ends up at `index`.
    pub fn move_column(&self, key: &str, index: usize) -> Result<(), CustomizationError> {
        self.orders.update(|orders| {
            let from = orders
                .iter()
                .position(|k| k == key)
                .ok_or_else(|| CustomizationError::UnknownKey(key.to_string()))?;
            if index >= orders.len() {
                return Err(CustomizationError::OutOfRange {
                    index,
                    len: orders.len(),
                });
            }
            let moved = orders.remove(from);
            orders.insert(index, moved);
            Ok(())
        })
    }

    pub fn set_column_width(&self, key: &str, width: impl Into<String>) -> Result<(), CustomizationError> {
        let width = width.into();
        self.widths.update(|widths| {
            widths.insert(key.to_string(), width);
            Ok::<_, CustomizationError>(())
        })
    }

    /// Drop the explicit width of `key`.
    pub fn clear_column_width(&self, key: &str) -> Result<(), CustomizationError> {
        if !self.fields.iter().any(|f| f == key) {
            return Err(CustomizationError::UnknownKey(key.to_string()));
        }
        self.widths.update(|widths| {
            widths.remove(key);
            Ok::<_, CustomizationError>(())
        })
    }

    /// Restore both axes to their defaults.
    pub fn reset(&self) {
        self.orders.reset();
        self.widths.reset();
    }

    /// Both axes as JSON, e.g. for a diagnostic label.
    pub fn summary(&self) -> String {
        summarize(&self.orders.state(), &self.widths.state())
    }
}

/// JSON rendering of both axes, read live from their states.
pub fn summarize(orders: &ReadState<ColumnOrders>, widths: &ReadState<ColumnWidths>) -> String {
    let orders = orders.with(|o| serde_json::to_string(o).unwrap_or_default());
    let widths = widths.with(|w| serde_json::to_string(w).unwrap_or_default());
    format!("{orders} {widths}")
}
