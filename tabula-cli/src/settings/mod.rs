//! Persistent storage for column customizations.

mod sqlite;

use std::path::Path;
use std::sync::Arc;

use log::warn;
use tabula::PersistenceBackend;

pub use sqlite::SqliteBackend;

/// Open the customization backend for this run.
///
/// Returns `None` when persistence is disabled or the database cannot be
/// opened; tables then keep their defaults and write nowhere.
pub fn open_backend(data_dir: &Path, persist: bool) -> Option<Arc<dyn PersistenceBackend>> {
    if !persist {
        return None;
    }
    match SqliteBackend::open(crate::paths::settings_db(data_dir)) {
        Ok(backend) => Some(Arc::new(backend)),
        Err(e) => {
            warn!("customizations will not be saved: {e}");
            None
        }
    }
}
