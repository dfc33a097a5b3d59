use async_trait::async_trait;
use tokio::sync::RwLock;

use super::DatasetStore;
use crate::domain::{ForecastError, TimeSeriesRecord};

/// Dataset kept in process memory
#[derive(Default)]
pub struct MemoryDatasetStore {
    records: RwLock<Option<Vec<TimeSeriesRecord>>>,
}

impl MemoryDatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<TimeSeriesRecord>) -> Self {
        Self {
            records: RwLock::new(Some(records)),
        }
    }
}

#[async_trait]
impl DatasetStore for MemoryDatasetStore {
    async fn load(&self) -> Result<Vec<TimeSeriesRecord>, ForecastError> {
        match self.records.read().await.as_ref() {
            Some(records) if !records.is_empty() => Ok(records.clone()),
            _ => Err(ForecastError::StoreUnavailable),
        }
    }

    async fn append(&self, record: TimeSeriesRecord) -> Result<(), ForecastError> {
        self.records
            .write()
            .await
            .get_or_insert_with(Vec::new)
            .push(record);
        Ok(())
    }

    async fn overwrite(&self, records: Vec<TimeSeriesRecord>) -> Result<(), ForecastError> {
        *self.records.write().await = Some(records);
        Ok(())
    }
}
