//! Platform-specific directory paths.
//!
//! Uses XDG on Linux, standard locations on macOS/Windows. A `--data-dir`
//! override replaces the data directory only; logs always go to the cache
//! directory.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

const QUALIFIER: &str = "dev";
const ORGANIZATION: &str = "tabula";
const APPLICATION: &str = "tabula";

/// Get project directories, or None if home directory cannot be determined.
fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// Get the data directory holding the record files and the settings database.
///
/// - Linux: `$XDG_DATA_HOME/tabula` or `~/.local/share/tabula`
/// - macOS: `~/Library/Application Support/dev.tabula.tabula`
/// - Windows: `C:\Users\<User>\AppData\Roaming\tabula\tabula\data`
pub fn data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}

/// Get the cache directory for logs.
///
/// - Linux: `$XDG_CACHE_HOME/tabula` or `~/.cache/tabula`
/// - macOS: `~/Library/Caches/dev.tabula.tabula`
/// - Windows: `C:\Users\<User>\AppData\Local\tabula\tabula\cache`
pub fn cache_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Path of the settings database inside `data_dir`.
pub fn settings_db(data_dir: &Path) -> PathBuf {
    data_dir.join("settings.db")
}
