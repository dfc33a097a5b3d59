//! Forecasting: feature encoding, per-model pipelines and the concurrent engine

pub mod engine;
pub mod features;
pub mod pipeline;
pub mod postprocess;

pub use engine::ForecastEngine;
pub use pipeline::{DemandPipeline, ForecastPipeline, SolarPipeline, WindPipeline};
