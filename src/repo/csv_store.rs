//! CSV file dataset store

use async_trait::async_trait;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use super::DatasetStore;
use crate::domain::{ForecastError, TimeSeriesRecord};
use crate::ingest::validator::{parse_records, REQUIRED_COLUMNS};
use crate::ingest::RawTable;

/// Dates are persisted in the compact day-month-year form
const DATE_FORMAT: &str = "%d%m%Y";

/// Stores the dataset as a CSV file with the canonical lower-case header.
///
/// All file access goes through one async mutex and runs on the blocking
/// pool. Overwrites go to a sibling temp file that is then renamed into place.
#[derive(Clone)]
pub struct CsvDatasetStore {
    path: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
}

impl CsvDatasetStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, ForecastError>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T, ForecastError> + Send + 'static,
    {
        // the guard moves into the blocking task so a cancelled caller cannot
        // release the lock while file work is still running
        let guard = Arc::clone(&self.lock).lock_owned().await;
        let path = Arc::clone(&self.path);
        tokio::task::spawn_blocking(move || {
            let _guard = guard;
            op(path.as_path())
        })
        .await
        .map_err(|e| ForecastError::Store(format!("store task failed: {e}")))?
    }
}

fn record_cells(record: &TimeSeriesRecord) -> [String; 8] {
    [
        record.date.format(DATE_FORMAT).to_string(),
        record.hour.to_string(),
        record.consumption.to_string(),
        if record.holiday { "1" } else { "0" }.to_string(),
        record.wind_speed.to_string(),
        record.cloud_coverage.to_string(),
        record.temperature.to_string(),
        record.irradiance.to_string(),
    ]
}

fn write_records<W: Write>(
    writer: W,
    records: &[TimeSeriesRecord],
    with_header: bool,
) -> Result<(), ForecastError> {
    let mut csv = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
    if with_header {
        csv.write_record(REQUIRED_COLUMNS)?;
    }
    for record in records {
        csv.write_record(record_cells(record))?;
    }
    csv.flush()?;
    Ok(())
}

fn ensure_parent(path: &Path) -> Result<(), ForecastError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => Ok(fs::create_dir_all(parent)?),
        _ => Ok(()),
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn load_file(path: &Path) -> Result<Vec<TimeSeriesRecord>, ForecastError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ForecastError::StoreUnavailable)
        }
        Err(e) => return Err(e.into()),
    };
    let table = RawTable::from_csv_bytes(&bytes)?;
    if table.is_empty() {
        return Err(ForecastError::StoreUnavailable);
    }
    // the file was written by this store, so a bad row means the file is damaged
    parse_records(&table).map_err(|e| match e {
        e if e.is_validation() => {
            ForecastError::Store(format!("stored dataset {} is corrupt: {e}", path.display()))
        }
        e => e,
    })
}

fn overwrite_file(path: &Path, records: &[TimeSeriesRecord]) -> Result<(), ForecastError> {
    ensure_parent(path)?;
    let tmp = temp_sibling(path);
    let written = File::create(&tmp)
        .map_err(ForecastError::from)
        .and_then(|file| write_records(BufWriter::new(file), records, true));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path)?;
    Ok(())
}

fn append_file(path: &Path, record: &TimeSeriesRecord) -> Result<(), ForecastError> {
    ensure_parent(path)?;
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let empty = file.metadata()?.len() == 0;
    write_records(BufWriter::new(file), std::slice::from_ref(record), empty)
}

#[async_trait]
impl DatasetStore for CsvDatasetStore {
    async fn load(&self) -> Result<Vec<TimeSeriesRecord>, ForecastError> {
        let records = self.blocking(load_file).await?;
        debug!(rows = records.len(), path = %self.path.display(), "Dataset loaded");
        Ok(records)
    }

    async fn append(&self, record: TimeSeriesRecord) -> Result<(), ForecastError> {
        self.blocking(move |path| append_file(path, &record)).await
    }

    async fn overwrite(&self, records: Vec<TimeSeriesRecord>) -> Result<(), ForecastError> {
        self.blocking(move |path| overwrite_file(path, &records)).await
    }
}
