//! File logging, one file per run.
//!
//! The current run writes `latest.log`. On startup the previous run's file is
//! archived as `run-<last write time>.log`; the stamp sorts by name, so the
//! oldest archives are the first names in the directory listing.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use simplelog::{Config, LevelFilter, WriteLogger};

use crate::paths;

const LATEST: &str = "latest.log";
const ARCHIVE_PREFIX: &str = "run-";
const KEEP_ARCHIVES: usize = 25;

/// Log to `<cache dir>/latest.log` at `level`.
///
/// Logging is best effort: problems are reported on stderr and the command
/// runs without a log.
pub fn init(level: LevelFilter) {
    let Some(dir) = paths::cache_dir() else { return };
    let logs = LogDir::new(dir, KEEP_ARCHIVES);
    let file = match logs.start_run() {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Warning: cannot open log in {}: {e}", logs.dir.display());
            return;
        }
    };
    if let Err(e) = WriteLogger::init(level, Config::default(), file) {
        eprintln!("Warning: logging disabled: {e}");
    }
}

/// A directory of run logs.
struct LogDir {
    dir: PathBuf,
    keep: usize,
}

impl LogDir {
    fn new(dir: impl Into<PathBuf>, keep: usize) -> Self {
        Self {
            dir: dir.into(),
            keep,
        }
    }

    fn latest(&self) -> PathBuf {
        self.dir.join(LATEST)
    }

    /// Archive the previous run, prune old archives and open a fresh log.
    fn start_run(&self) -> io::Result<File> {
        fs::create_dir_all(&self.dir)?;
        self.archive_latest()?;
        self.prune()?;
        File::create(self.latest())
    }

    fn archive_latest(&self) -> io::Result<()> {
        let latest = self.latest();
        let modified = match fs::metadata(&latest) {
            Ok(meta) => meta.modified()?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        let stamp = DateTime::<Local>::from(modified).format("%Y%m%d-%H%M%S%.3f");
        fs::rename(latest, self.dir.join(format!("{ARCHIVE_PREFIX}{stamp}.log")))
    }

    fn prune(&self) -> io::Result<()> {
        let mut archives = archives_in(&self.dir)?;
        if archives.len() <= self.keep {
            return Ok(());
        }
        archives.sort();
        let excess = archives.len() - self.keep;
        for old in archives.drain(..excess) {
            fs::remove_file(old)?;
        }
        Ok(())
    }
}

fn archives_in(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut archives = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_archive = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(ARCHIVE_PREFIX) && name.ends_with(".log"));
        if is_archive {
            archives.push(path);
        }
    }
    Ok(archives)
}
