use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// Number of hourly observations fed to the forecasting models.
pub const WINDOW_SIZE: usize = 24;

// ============================================================================
// Telemetry Records
// ============================================================================

/// One hourly observation of consumption and weather
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesRecord {
    /// Calendar date of the observation
    pub date: NaiveDate,
    /// Hour of day (0-23)
    pub hour: u32,
    /// Consumption (>= 0)
    pub consumption: f64,
    /// Public holiday flag
    pub holiday: bool,
    pub wind_speed: f64,
    /// Cloud coverage, expected 0-100
    pub cloud_coverage: f64,
    pub temperature: f64,
    pub irradiance: f64,
}

impl TimeSeriesRecord {
    /// Orderable timestamp: the calendar date at midnight plus `hour` hours
    pub fn timestamp(&self) -> NaiveDateTime {
        self.date.and_time(NaiveTime::MIN) + chrono::Duration::hours(i64::from(self.hour))
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    /// Holiday flag as the 0/1 value the models were trained on
    pub fn holiday_flag(&self) -> f64 {
        if self.holiday {
            1.0
        } else {
            0.0
        }
    }
}

// ============================================================================
// Inference Window
// ============================================================================

/// The most recent [`WINDOW_SIZE`] records in ascending time order.
///
/// Only the window builder constructs this type, so every instance holds
/// exactly [`WINDOW_SIZE`] chronologically sorted records.
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceWindow {
    records: Vec<TimeSeriesRecord>,
}

impl InferenceWindow {
    pub(crate) fn new(records: Vec<TimeSeriesRecord>) -> Self {
        debug_assert_eq!(records.len(), WINDOW_SIZE);
        Self { records }
    }

    pub fn records(&self) -> &[TimeSeriesRecord] {
        &self.records
    }

    /// The newest observation in the window
    pub fn latest(&self) -> &TimeSeriesRecord {
        // non-empty by construction
        &self.records[self.records.len() - 1]
    }
}

impl Deref for InferenceWindow {
    type Target = [TimeSeriesRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

/// What a successful upload reports back to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadSummary {
    /// Date of the last row in file order
    pub last_date: NaiveDate,
    /// Hour of the last row in file order
    pub last_time: u32,
    /// Number of accepted rows
    pub rows: usize,
}
