//! Input validation
//!
//! Turns untyped tables and tick payloads into [`TimeSeriesRecord`]s. A batch
//! is accepted or rejected as a whole; bad rows are never silently dropped.

use serde_json::Value;

use super::{dates, RawTable};
use crate::domain::{ForecastError, TimeSeriesRecord, WINDOW_SIZE};

/// Columns every input must provide, in canonical order
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "date",
    "time",
    "consumption",
    "holiday",
    "wind_speed",
    "cloud_coverage",
    "temperature",
    "irradiance",
];

const DATE: usize = 0;
const TIME: usize = 1;
const CONSUMPTION: usize = 2;
const HOLIDAY: usize = 3;
const WIND_SPEED: usize = 4;
const CLOUD_COVERAGE: usize = 5;
const TEMPERATURE: usize = 6;
const IRRADIANCE: usize = 7;

/// Position of each required column within a table's header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMap([usize; 8]);

impl ColumnMap {
    /// Match headers case-insensitively after trimming whitespace
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Result<Self, ForecastError> {
        let normalized: Vec<String> = headers
            .iter()
            .map(|h| h.as_ref().trim().to_lowercase())
            .collect();

        let mut positions = [0usize; 8];
        let mut missing = Vec::new();
        for (slot, required) in REQUIRED_COLUMNS.iter().enumerate() {
            match normalized.iter().position(|h| h == required) {
                Some(pos) => positions[slot] = pos,
                None => missing.push(*required),
            }
        }

        if !missing.is_empty() {
            return Err(ForecastError::Schema(format!(
                "missing required columns: {}. Required: {}",
                missing.join(","),
                REQUIRED_COLUMNS.join(",")
            )));
        }
        Ok(Self(positions))
    }
}

/// Validate an uploaded batch.
///
/// Checks run in order: schema, row count, then numeric coercion and date
/// normalization of every row.
pub fn validate(table: &RawTable) -> Result<Vec<TimeSeriesRecord>, ForecastError> {
    let columns = ColumnMap::resolve(&table.headers)?;
    if table.len() < WINDOW_SIZE {
        return Err(ForecastError::InsufficientData {
            required: WINDOW_SIZE,
            actual: table.len(),
        });
    }
    parse_rows(table, columns)
}

/// Schema check and row parsing without a minimum row count
pub fn parse_records(table: &RawTable) -> Result<Vec<TimeSeriesRecord>, ForecastError> {
    let columns = ColumnMap::resolve(&table.headers)?;
    parse_rows(table, columns)
}

fn parse_rows(table: &RawTable, columns: ColumnMap) -> Result<Vec<TimeSeriesRecord>, ForecastError> {
    table
        .rows
        .iter()
        .enumerate()
        .map(|(idx, row)| {
            let cells: [&str; 8] = std::array::from_fn(|slot| {
                row.get(columns.0[slot]).map(String::as_str).unwrap_or("")
            });
            parse_row(idx + 1, &cells)
        })
        .collect()
}

/// Parse one row whose cells are in [`REQUIRED_COLUMNS`] order.
/// `row` is 1-based and only used in error messages.
pub fn parse_row(row: usize, cells: &[&str; 8]) -> Result<TimeSeriesRecord, ForecastError> {
    let number = |slot: usize| parse_number(row, REQUIRED_COLUMNS[slot], cells[slot]);

    let consumption = number(CONSUMPTION)?;
    let holiday = number(HOLIDAY)?;
    let wind_speed = number(WIND_SPEED)?;
    let cloud_coverage = number(CLOUD_COVERAGE)?;
    let temperature = number(TEMPERATURE)?;
    let irradiance = number(IRRADIANCE)?;
    let time = number(TIME)?;

    if consumption < 0.0 {
        return Err(ForecastError::data_quality(
            row,
            "consumption",
            format!("must be >= 0, got {consumption}"),
        ));
    }
    let holiday = if holiday == 0.0 {
        false
    } else if holiday == 1.0 {
        true
    } else {
        return Err(ForecastError::data_quality(
            row,
            "holiday",
            format!("must be 0 or 1, got {holiday}"),
        ));
    };
    if time.fract() != 0.0 || !(0.0..=23.0).contains(&time) {
        return Err(ForecastError::data_quality(
            row,
            "time",
            format!("must be a whole hour between 0 and 23, got {time}"),
        ));
    }

    Ok(TimeSeriesRecord {
        date: dates::parse_date(cells[DATE])?,
        hour: time as u32,
        consumption,
        holiday,
        wind_speed,
        cloud_coverage,
        temperature,
        irradiance,
    })
}

fn parse_number(row: usize, column: &str, cell: &str) -> Result<f64, ForecastError> {
    let cell = cell.trim();
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(_) => Err(ForecastError::data_quality(row, column, format!("non-finite value '{cell}'"))),
        Err(_) => Err(ForecastError::data_quality(row, column, format!("'{cell}' is not numeric"))),
    }
}

/// Validate a single tick payload (a JSON object keyed by column name)
pub fn record_from_json(payload: &Value) -> Result<TimeSeriesRecord, ForecastError> {
    let object = payload
        .as_object()
        .ok_or_else(|| ForecastError::Schema("tick payload must be a JSON object".to_string()))?;

    let lookup = |name: &str| {
        object
            .iter()
            .find(|(key, _)| key.trim().eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    };

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| lookup(name).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ForecastError::Schema(format!(
            "Missing fields in tick payload: {}",
            missing.join(",")
        )));
    }

    let mut owned: [String; 8] = Default::default();
    for (slot, name) in REQUIRED_COLUMNS.iter().enumerate() {
        // presence checked above
        let value = lookup(name).unwrap_or(&Value::Null);
        owned[slot] = json_cell(value).ok_or_else(|| {
            ForecastError::data_quality(1, *name, format!("unsupported value {value}"))
        })?;
    }
    let cells: [&str; 8] = std::array::from_fn(|slot| owned[slot].as_str());
    parse_row(1, &cells)
}

fn json_cell(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                // whole floats such as 25092025.0 keep their integer form
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.abs() < 1e15 {
                        format!("{}", f as i64)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn header() -> Vec<String> {
        REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect()
    }

    fn row(hour: u32) -> Vec<String> {
        vec![
            "25092025".to_string(),
            hour.to_string(),
            "420.5".to_string(),
            "0".to_string(),
            "5.2".to_string(),
            "40".to_string(),
            "18.0".to_string(),
            "350".to_string(),
        ]
    }

    fn table(rows: usize) -> RawTable {
        RawTable::new(header(), (0..rows).map(|i| row((i % 24) as u32)).collect())
    }

    #[test]
    fn test_valid_table() {
        let records = validate(&table(30)).unwrap();
        assert_eq!(records.len(), 30);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2025, 9, 25).unwrap());
        assert_eq!(records[5].hour, 5);
        assert!(!records[0].holiday);
    }

    #[test]
    fn test_headers_are_case_and_space_insensitive() {
        let mut t = table(24);
        t.headers = vec![
            " Date", "TIME ", "Consumption", "Holiday", "Wind_Speed", "CLOUD_COVERAGE",
            "temperature", " Irradiance ",
        ]
        .into_iter()
        .map(String::from)
        .collect();
        assert_eq!(validate(&t).unwrap().len(), 24);
    }

    #[test]
    fn test_columns_may_be_reordered() {
        let mut t = table(24);
        t.headers.reverse();
        for r in &mut t.rows {
            r.reverse();
        }
        let records = validate(&t).unwrap();
        assert_eq!(records[3].hour, 3);
        assert_eq!(records[3].consumption, 420.5);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let mut t = table(24);
        t.headers[6] = "temp".to_string();
        let err = validate(&t).unwrap_err();
        assert!(matches!(err, ForecastError::Schema(ref msg) if msg.contains("temperature")));
    }

    #[test]
    fn test_short_table_fails_before_coercion() {
        let mut t = table(10);
        t.rows[0][2] = "not a number".to_string();
        let err = validate(&t).unwrap_err();
        assert!(matches!(
            err,
            ForecastError::InsufficientData { required: 24, actual: 10 }
        ));
    }

    #[test]
    fn test_non_numeric_cell_rejects_batch() {
        let mut t = table(30);
        t.rows[17][4] = "windy".to_string();
        let err = validate(&t).unwrap_err();
        match err {
            ForecastError::DataQuality { row, column, .. } => {
                assert_eq!(row, 18);
                assert_eq!(column, "wind_speed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_cell_is_data_quality_error() {
        let mut t = table(24);
        t.rows[2].truncate(5);
        assert!(matches!(
            validate(&t).unwrap_err(),
            ForecastError::DataQuality { row: 3, .. }
        ));
    }

    #[test]
    fn test_out_of_domain_values() {
        let mut t = table(24);
        t.rows[0][1] = "24".to_string();
        assert!(matches!(validate(&t).unwrap_err(), ForecastError::DataQuality { .. }));

        let mut t = table(24);
        t.rows[0][1] = "4.5".to_string();
        assert!(matches!(validate(&t).unwrap_err(), ForecastError::DataQuality { .. }));

        let mut t = table(24);
        t.rows[0][3] = "2".to_string();
        assert!(matches!(validate(&t).unwrap_err(), ForecastError::DataQuality { .. }));

        let mut t = table(24);
        t.rows[0][2] = "-1".to_string();
        assert!(matches!(validate(&t).unwrap_err(), ForecastError::DataQuality { .. }));

        let mut t = table(24);
        t.rows[0][6] = "NaN".to_string();
        assert!(matches!(validate(&t).unwrap_err(), ForecastError::DataQuality { .. }));
    }

    #[test]
    fn test_bad_date_is_date_format_error() {
        let mut t = table(24);
        t.rows[23][0] = "someday".to_string();
        assert!(matches!(validate(&t).unwrap_err(), ForecastError::DateFormat(_)));
    }

    #[test]
    fn test_parse_records_has_no_minimum() {
        assert_eq!(parse_records(&table(2)).unwrap().len(), 2);
    }

    #[test]
    fn test_tick_from_json() {
        let payload = json!({
            "date": 25092025,
            "time": 14,
            "consumption": 401.2,
            "holiday": 1,
            "wind_speed": "6.5",
            "cloud_coverage": 20,
            "temperature": 21.5,
            "irradiance": 610.0
        });
        let record = record_from_json(&payload).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 9, 25).unwrap());
        assert_eq!(record.hour, 14);
        assert!(record.holiday);
        assert_eq!(record.wind_speed, 6.5);
    }

    #[test]
    fn test_tick_with_float_date() {
        let payload = json!({
            "date": 1092025.0, "time": 0, "consumption": 1, "holiday": 0,
            "wind_speed": 0, "cloud_coverage": 0, "temperature": 0, "irradiance": 0
        });
        let record = record_from_json(&payload).unwrap();
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
    }

    #[test]
    fn test_tick_missing_field_is_schema_error() {
        let payload = json!({ "date": "25092025", "time": 1 });
        let err = record_from_json(&payload).unwrap_err();
        assert!(matches!(err, ForecastError::Schema(ref msg) if msg.contains("irradiance")));

        assert!(matches!(
            record_from_json(&json!([1, 2, 3])).unwrap_err(),
            ForecastError::Schema(_)
        ));
    }
}
