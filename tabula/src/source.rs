//! The record source a table loads from and saves to.

use async_trait::async_trait;

/// Fetches and persists the record collection behind a table.
///
/// The table trusts what `fetch` returns: shape validation belongs to the
/// source. Errors are passed back to the caller unchanged.
#[async_trait]
pub trait RecordSource<R>: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Get the current records.
    async fn fetch(&self) -> Result<Vec<R>, Self::Error>;

    /// Persist an updated collection.
    async fn persist(&self, records: Vec<R>) -> Result<(), Self::Error>;
}

/// Progress of the initial fetch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A fetch is in flight; the body is empty.
    Loading,
    /// Records arrived.
    Ready,
    /// The fetch failed with this message.
    Failed(String),
}

impl LoadState {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}
