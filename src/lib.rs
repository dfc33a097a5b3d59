//! Demand, wind and solar forecasting from rolling hourly telemetry.
//!
//! Uploaded or ticked observations are validated into a canonical dataset,
//! the newest 24 hours form the inference window, and three independently
//! trained models run concurrently over their own feature encodings.

pub mod api;
pub mod config;
pub mod controller;
pub mod domain;
pub mod forecast;
pub mod ingest;
pub mod ml;
pub mod repo;
pub mod telemetry;
