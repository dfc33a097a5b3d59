use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::{ForecastError, ForecastKind, ForecastOutcome, InferenceWindow, PredictionResult};
use crate::ml::inference::ModelRegistry;

/// Runs the three forecast pipelines concurrently and merges their outcomes.
///
/// A failing or panicking pipeline only affects its own forecast.
#[derive(Clone)]
pub struct ForecastEngine {
    registry: Arc<ModelRegistry>,
}

impl ForecastEngine {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub async fn predict(&self, window: InferenceWindow) -> PredictionResult {
        let window = Arc::new(window);
        let (demand, wind, solar) = tokio::join!(
            self.run(ForecastKind::Demand, Arc::clone(&window)),
            self.run(ForecastKind::Wind, Arc::clone(&window)),
            self.run(ForecastKind::Solar, Arc::clone(&window)),
        );
        PredictionResult::from_outcomes(demand, wind, solar)
    }

    async fn run(&self, kind: ForecastKind, window: Arc<InferenceWindow>) -> ForecastOutcome {
        let pipeline = match self.registry.pipeline(kind) {
            Ok(pipeline) => pipeline,
            Err(_) => {
                debug!(kind = %kind, "Model unavailable, skipping forecast");
                return ForecastOutcome::Unavailable;
            }
        };

        let joined = tokio::task::spawn_blocking(move || pipeline.run(&window)).await;
        let message = match joined {
            Ok(Ok(value)) => return ForecastOutcome::Value(value),
            Ok(Err(e)) => format!("{e:#}"),
            Err(join_error) if join_error.is_panic() => "pipeline panicked".to_string(),
            Err(join_error) => join_error.to_string(),
        };

        let error = ForecastError::Inference { kind, message };
        warn!(kind = %kind, error = %error, "Forecast failed");
        ForecastOutcome::Failed(error.to_string())
    }
}
