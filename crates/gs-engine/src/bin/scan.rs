//! Command-line runner for GridScape surface scans.
//!
//! Loads a JSON scan description, builds the parameter state and grid, picks
//! one of the built-in demo objectives, and streams the surface to a TSV
//! trace file plus the console.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gs_engine::Engine;
use gs_grid::GridSpace;
use gs_report::{ConsoleSink, TsvFileSink};
use gs_types::{AxisSpec, GsResult, MemoryStore, Objective, ParameterStore, ScanConfig};

#[derive(Debug, Deserialize)]
struct ServiceConfig {
    name: String,
    #[serde(default)]
    description: String,
    parameters: Vec<ParameterInit>,
    axes: Vec<AxisSpec>,
    objective: ObjectiveSpec,
    #[serde(default = "default_trace_path")]
    trace: PathBuf,
    #[serde(default)]
    every: Option<u64>,
    #[serde(default)]
    max_points: Option<u64>,
    #[serde(default)]
    resume_from: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ParameterInit {
    id: String,
    values: Vec<f64>,
}

/// Built-in demo objectives; real deployments implement [`Objective`] around
/// their own likelihood and drive the engine as a library.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ObjectiveSpec {
    Quadratic { center: f64 },
    Gaussian { mean: f64, sigma: f64 },
}

fn default_trace_path() -> PathBuf {
    PathBuf::from("surface.log")
}

/// Negative squared distance of every parameter component from `center`.
struct QuadraticObjective {
    center: f64,
}

impl Objective for QuadraticObjective {
    fn log_density(&mut self, store: &dyn ParameterStore) -> GsResult<f64> {
        let mut total = 0.0;
        for id in store.node_ids() {
            for value in store.values(&id)? {
                let distance = value - self.center;
                total -= distance * distance;
            }
        }
        Ok(total)
    }
}

/// Spherical Gaussian log-density over every parameter component.
struct GaussianObjective {
    mean: f64,
    sigma: f64,
}

impl Objective for GaussianObjective {
    fn log_density(&mut self, store: &dyn ParameterStore) -> GsResult<f64> {
        let norm = (self.sigma * (2.0 * std::f64::consts::PI).sqrt()).ln();
        let mut total = 0.0;
        for id in store.node_ids() {
            for value in store.values(&id)? {
                let z = (value - self.mean) / self.sigma;
                total += -0.5 * z * z - norm;
            }
        }
        Ok(total)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("GRIDSCAPE_SCAN_CONFIG").ok())
        .context("usage: gridscape-scan <config.json> (or set GRIDSCAPE_SCAN_CONFIG)")?;
    let raw = std::fs::read_to_string(&path)
        .with_context(|| format!("reading scan config from {path}"))?;
    let service: ServiceConfig =
        serde_json::from_str(&raw).with_context(|| format!("parsing scan config {path}"))?;

    let mut store = MemoryStore::new();
    for parameter in &service.parameters {
        store.insert(parameter.id.clone(), parameter.values.clone())?;
    }

    let mut config = ScanConfig::new(service.name.clone());
    config.description = service.description.clone();
    for axis in &service.axes {
        config = config.with_axis(axis.clone());
    }
    if let Some(max_points) = service.max_points {
        config = config.with_max_points(max_points);
    }
    if let Some(sample) = service.resume_from {
        config = config.with_resume_from(sample);
    }

    let space = GridSpace::from_specs(&config.axes)?;
    let objective: Box<dyn Objective> = match service.objective {
        ObjectiveSpec::Quadratic { center } => Box::new(QuadraticObjective { center }),
        ObjectiveSpec::Gaussian { mean, sigma } => {
            if sigma <= 0.0 {
                bail!("gaussian objective requires sigma > 0, got {sigma}");
            }
            Box::new(GaussianObjective { mean, sigma })
        }
    };

    let mut engine = Engine::new(config, store, space, objective)?;
    let every = service.every.unwrap_or(1);
    engine.add_sink(Box::new(TsvFileSink::new(&service.trace).with_every(every)));
    engine.add_sink(Box::new(ConsoleSink::new().with_every(every)));

    info!(scan = %service.name, trace = %service.trace.display(), "configured surface scan");
    let report = engine.run()?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
