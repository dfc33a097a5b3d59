//! Dataset persistence
//!
//! The forecaster keeps one canonical dataset. Uploads replace it, ticks
//! append to it and predictions read it back.

use async_trait::async_trait;

use crate::domain::{ForecastError, TimeSeriesRecord};

pub mod csv_store;
pub mod memory;

pub use csv_store::CsvDatasetStore;
pub use memory::MemoryDatasetStore;

/// Storage for the canonical dataset.
///
/// Implementations serialize writes so a concurrent `load` sees either the
/// old or the new dataset, never a mix.
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Read the stored dataset in file order.
    /// Returns `StoreUnavailable` when nothing has been stored yet.
    async fn load(&self) -> Result<Vec<TimeSeriesRecord>, ForecastError>;

    /// Add one record, creating the dataset if absent
    async fn append(&self, record: TimeSeriesRecord) -> Result<(), ForecastError>;

    /// Replace the dataset
    async fn overwrite(&self, records: Vec<TimeSeriesRecord>) -> Result<(), ForecastError>;
}
