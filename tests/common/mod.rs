#![allow(dead_code)]

use std::path::{Path, PathBuf};

use energy_forecaster::config::Config;
use figment::{providers::{Format, Toml}, Figment};

/// Demand model output: scaled 0.5 on a [0, 1000] consumption range
pub const DEMAND_VALUE: f64 = 500.0;
/// Wind model output: raw 300 divided by six
pub const WIND_VALUE: f64 = 50.0;
/// Solar model output: raw 600 divided by six
pub const SOLAR_VALUE: f64 = 100.0;

pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub config: Config,
}

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn unit_scaler(n: usize) -> String {
    serde_json::json!({"kind": "standard", "mean": vec![0.0; n], "scale": vec![1.0; n]}).to_string()
}

/// Constant-output models for all three forecasts. With `with_wind = false`
/// the wind model file is never written.
pub fn fixture(with_wind: bool) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();

    let demand = write(
        root,
        "demand.json",
        &serde_json::json!({
            "input_steps": 24,
            "input_features": 4,
            "layers": [{"weights": [vec![0.0; 96]], "bias": [0.5], "activation": "linear"}]
        })
        .to_string(),
    );
    let demand_scaler = write(
        root,
        "demand_scaler.json",
        r#"{"kind":"min_max","data_min":[0.0],"data_max":[1000.0]}"#,
    );

    let wind = root.join("wind.json");
    if with_wind {
        write(root, "wind.json", r#"{"coefficients":[0,0,0,0,0],"intercept":300}"#);
    }
    let wind_scaler = write(root, "wind_scaler.json", &unit_scaler(5));

    let solar = write(
        root,
        "solar.json",
        &serde_json::json!({
            "input_size": 6,
            "hidden_size": 1,
            "layers": [{
                "weight_ih": vec![vec![0.0; 6]; 4],
                "weight_hh": vec![vec![0.0; 1]; 4],
                "bias_ih": [0.0, 0.0, 0.0, 0.0],
                "bias_hh": [0.0, 0.0, 0.0, 0.0]
            }],
            "head": {"weight": [[0.0]], "bias": [600.0]}
        })
        .to_string(),
    );
    let solar_features = write(root, "solar_features.json", &unit_scaler(6));
    let solar_target = write(root, "solar_target.json", &unit_scaler(1));

    let toml = format!(
        r#"
        [server]
        host = "127.0.0.1"
        port = 0
        max_upload_bytes = 1048576

        [store]
        data_csv = {data:?}

        [models.demand]
        model = {demand:?}
        scaler = {demand_scaler:?}

        [models.wind]
        model = {wind:?}
        scaler = {wind_scaler:?}
        format = "linear"

        [models.solar]
        model = {solar:?}
        feature_scaler = {solar_features:?}
        target_scaler = {solar_target:?}
        "#,
        data = root.join("data/data.csv").display().to_string(),
        demand = demand.display().to_string(),
        demand_scaler = demand_scaler.display().to_string(),
        wind = wind.display().to_string(),
        wind_scaler = wind_scaler.display().to_string(),
        solar = solar.display().to_string(),
        solar_features = solar_features.display().to_string(),
        solar_target = solar_target.display().to_string(),
    );
    let config = Config::from_figment(Figment::from(Toml::string(&toml))).unwrap();

    Fixture { dir, config }
}

pub const HEADER: &str = "date,time,consumption,holiday,wind_speed,cloud_coverage,temperature,irradiance";

/// `hours` consecutive hourly rows starting 2025-09-01 00:00, dates as DDMMYYYY
pub fn csv_rows(hours: u32) -> Vec<String> {
    (0..hours)
        .map(|i| {
            let day = 1 + i / 24;
            let hour = i % 24;
            format!("{day:02}092025,{hour},{},0,5.5,20,18,{}", 300 + i, hour * 10)
        })
        .collect()
}

pub fn csv_text(rows: &[String]) -> String {
    let mut text = String::from(HEADER);
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text
}
