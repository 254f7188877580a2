use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique scan identifier
pub type ScanId = Uuid;

/// Which concrete axis variant an [`AxisSpec`] builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisKind {
    Real,
    Integer,
    Boolean,
}

impl Default for AxisKind {
    fn default() -> Self {
        Self::Real
    }
}

/// Declarative description of one grid axis.
///
/// Exactly one of `values` or the full `from`/`to`/`by` triple must be set;
/// the conflict is rejected when the spec is built into an axis, not at
/// deserialization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSpec {
    /// Id of the parameter this axis controls.
    pub parameter: String,

    /// Component of the bound parameter, for vector-valued parameters.
    #[serde(default)]
    pub component: usize,

    #[serde(default)]
    pub kind: AxisKind,

    /// Explicit value sequence (overrides from/to/by).
    #[serde(default)]
    pub values: Option<Vec<f64>>,

    /// Where to start gridding.
    #[serde(default)]
    pub from: Option<f64>,

    /// Where to grid to.
    #[serde(default)]
    pub to: Option<f64>,

    /// Step size.
    #[serde(default)]
    pub by: Option<f64>,
}

impl AxisSpec {
    pub fn with_values(parameter: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            parameter: parameter.into(),
            component: 0,
            kind: AxisKind::Real,
            values: Some(values),
            from: None,
            to: None,
            by: None,
        }
    }

    pub fn with_range(parameter: impl Into<String>, from: f64, to: f64, by: f64) -> Self {
        Self {
            parameter: parameter.into(),
            component: 0,
            kind: AxisKind::Real,
            values: None,
            from: Some(from),
            to: Some(to),
            by: Some(by),
        }
    }

    pub fn with_component(mut self, component: usize) -> Self {
        self.component = component;
        self
    }

    pub fn with_kind(mut self, kind: AxisKind) -> Self {
        self.kind = kind;
        self
    }

    /// Column label used in reports and error messages.
    pub fn label(&self) -> String {
        if self.component == 0 {
            self.parameter.clone()
        } else {
            format!("{}[{}]", self.parameter, self.component)
        }
    }
}

fn default_max_points() -> u64 {
    50_000_000
}

/// Top-level configuration for a surface scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub id: ScanId,
    pub name: String,
    pub description: String,

    /// Grid axes in nesting order; axis 0 is the outermost (slowest) loop.
    pub axes: Vec<AxisSpec>,

    /// Tractability cap on the total number of grid points.
    #[serde(default = "default_max_points")]
    pub max_points: u64,

    /// Linear sample index to restart a checkpointed run from.
    #[serde(default)]
    pub resume_from: Option<u64>,

    pub created_at: DateTime<Utc>,
}

impl ScanConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: String::new(),
            axes: Vec::new(),
            max_points: default_max_points(),
            resume_from: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_axis(mut self, axis: AxisSpec) -> Self {
        self.axes.push(axis);
        self
    }

    pub fn with_max_points(mut self, max_points: u64) -> Self {
        self.max_points = max_points;
        self
    }

    pub fn with_resume_from(mut self, sample: u64) -> Self {
        self.resume_from = Some(sample);
        self
    }
}

/// Lifecycle state for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Aggregate status of a scan run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanStatus {
    pub id: ScanId,
    pub state: ScanState,
    pub samples_completed: u64,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl ScanStatus {
    pub fn new(id: ScanId) -> Self {
        Self {
            id,
            state: ScanState::Pending,
            samples_completed: 0,
            started_at: None,
            finished_at: None,
            error: None,
        }
    }

    pub fn mark_running(&mut self) {
        self.state = ScanState::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn mark_completed(&mut self, samples_completed: u64) {
        self.state = ScanState::Completed;
        self.samples_completed = samples_completed;
        self.finished_at = Some(Utc::now());
    }

    pub fn mark_failed(&mut self, samples_completed: u64, error: String) {
        self.state = ScanState::Failed;
        self.samples_completed = samples_completed;
        self.finished_at = Some(Utc::now());
        self.error = Some(error);
    }
}

/// Final report of a completed scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub scan_id: ScanId,
    pub total_samples: u64,
    pub final_log_density: f64,
    pub elapsed_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_spec_labels() {
        let scalar = AxisSpec::with_values("kappa", vec![1.0, 2.0]);
        assert_eq!(scalar.label(), "kappa");

        let vector = AxisSpec::with_range("freqs", 0.1, 0.4, 0.1).with_component(2);
        assert_eq!(vector.label(), "freqs[2]");
    }

    #[test]
    fn config_builder_chain() {
        let config = ScanConfig::new("kappa_sweep")
            .with_axis(AxisSpec::with_range("kappa", 0.5, 4.0, 0.5))
            .with_axis(AxisSpec::with_values("gammaShape", vec![0.1, 1.0, 10.0]))
            .with_max_points(1_000);

        assert_eq!(config.axes.len(), 2);
        assert_eq!(config.max_points, 1_000);
        assert!(config.resume_from.is_none());
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ScanConfig::new("roundtrip")
            .with_axis(AxisSpec::with_values("mu", vec![0.001, 0.01]).with_kind(AxisKind::Real));

        let json = serde_json::to_string(&config).unwrap();
        let back: ScanConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn spec_defaults_apply_on_deserialize() {
        let spec: AxisSpec =
            serde_json::from_str(r#"{"parameter": "kappa", "values": [1.0, 2.0]}"#).unwrap();

        assert_eq!(spec.component, 0);
        assert_eq!(spec.kind, AxisKind::Real);
        assert!(spec.from.is_none());
    }

    #[test]
    fn status_lifecycle() {
        let mut status = ScanStatus::new(Uuid::new_v4());
        assert_eq!(status.state, ScanState::Pending);
        assert!(status.started_at.is_none());

        status.mark_running();
        assert_eq!(status.state, ScanState::Running);
        assert!(status.started_at.is_some());

        status.mark_completed(42);
        assert_eq!(status.state, ScanState::Completed);
        assert_eq!(status.samples_completed, 42);
        assert!(status.finished_at.is_some());
    }

    #[test]
    fn status_failure_keeps_partial_count() {
        let mut status = ScanStatus::new(Uuid::new_v4());
        status.mark_running();
        status.mark_failed(7, "objective returned NaN".to_string());

        assert_eq!(status.state, ScanState::Failed);
        assert_eq!(status.samples_completed, 7);
        assert_eq!(status.error.as_deref(), Some("objective returned NaN"));
    }
}
