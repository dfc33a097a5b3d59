//! Ingestion: raw tables and tick payloads to an inference window
//!
//! - `table`: CSV decoding into untyped rows
//! - `validator`: schema, row count and numeric checks
//! - `dates`: date token normalization
//! - `window`: chronological sort and the most recent 24 records

pub mod dates;
pub mod table;
pub mod validator;
pub mod window;

pub use dates::{parse_date, DateStrategy};
pub use table::RawTable;
pub use validator::{parse_records, record_from_json, validate, REQUIRED_COLUMNS};
pub use window::build_window;
