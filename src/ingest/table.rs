use std::io::Read;

use crate::domain::ForecastError;

/// Untyped tabular input: a header row plus string cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Decode uploaded bytes and parse them as CSV.
    ///
    /// UTF-8 (with or without a byte order mark) is tried first. Anything
    /// else is read as Latin-1, which maps every byte to a character.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self, ForecastError> {
        let text = decode_text(bytes);
        Self::from_csv_reader(text.as_bytes())
    }

    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, ForecastError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| ForecastError::Schema(format!("failed to read CSV header: {e}")))?
            .iter()
            .map(str::to_string)
            .collect();

        let mut rows = Vec::new();
        for (idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                ForecastError::Schema(format!("failed to read CSV row {}: {e}", idx + 1))
            })?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Ok(Self { headers, rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            tracing::debug!("upload is not valid UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}
