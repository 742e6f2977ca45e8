//! JSON file record sources.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, info};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tabula::RecordSource;

use crate::error::SourceError;

/// Records stored as a pretty-printed JSON array in one file.
pub struct JsonFileSource<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonFileSource<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `contents` to the file unless it already exists.
    pub async fn seed(&self, contents: &str) -> Result<(), SourceError> {
        if tokio::fs::try_exists(&self.path).await.map_err(|e| self.io(e))? {
            return Ok(());
        }
        info!("seeding {}", self.path().display());
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| self.io(e))
    }

    fn io(&self, source: std::io::Error) -> SourceError {
        SourceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn json(&self, source: serde_json::Error) -> SourceError {
        SourceError::Json {
            path: self.path.clone(),
            source,
        }
    }
}

impl<T> JsonFileSource<T>
where
    T: Serialize + DeserializeOwned,
{
    pub async fn read(&self) -> Result<Vec<T>, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.io(e))?;
        let records: Vec<T> = serde_json::from_str(&raw).map_err(|e| self.json(e))?;
        debug!("read {} records from {}", records.len(), self.path.display());
        Ok(records)
    }

    pub async fn write(&self, records: &[T]) -> Result<(), SourceError> {
        let raw = serde_json::to_string_pretty(records).map_err(|e| self.json(e))?;
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| self.io(e))?;
        debug!("wrote {} records to {}", records.len(), self.path.display());
        Ok(())
    }
}

#[async_trait]
impl<T> RecordSource<T> for JsonFileSource<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    type Error = SourceError;

    async fn fetch(&self) -> Result<Vec<T>, SourceError> {
        self.read().await
    }

    async fn persist(&self, records: Vec<T>) -> Result<(), SourceError> {
        self.write(&records).await
    }
}
