use crate::domain::{ForecastError, InferenceWindow, TimeSeriesRecord, WINDOW_SIZE};

/// Sort a dataset by timestamp and keep the newest [`WINDOW_SIZE`] records.
///
/// The sort is stable: records sharing a date and hour keep their original
/// relative order.
pub fn build_window(dataset: &[TimeSeriesRecord]) -> Result<InferenceWindow, ForecastError> {
    if dataset.len() < WINDOW_SIZE {
        return Err(ForecastError::InsufficientData {
            required: WINDOW_SIZE,
            actual: dataset.len(),
        });
    }

    let mut sorted = dataset.to_vec();
    sorted.sort_by_key(TimeSeriesRecord::timestamp);
    let newest = sorted.split_off(sorted.len() - WINDOW_SIZE);
    Ok(InferenceWindow::new(newest))
}
