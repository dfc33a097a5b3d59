use anyhow::Result;
use energy_forecaster::{api, config, controller, telemetry};
use config::Config;
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;

    let app_state = controller::AppState::new(cfg.clone())?;
    for status in app_state.controller.model_status() {
        if !status.available {
            warn!(kind = %status.kind, "forecast disabled: model not loaded");
        }
    }

    let app = api::router(app_state, &cfg);
    let addr = cfg.server.socket_addr()?;

    info!(%addr, data_csv = %cfg.store.data_csv.display(), "starting energy forecaster");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(telemetry::shutdown_signal())
        .await?;

    warn!("shutdown complete");
    Ok(())
}
