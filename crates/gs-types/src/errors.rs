use thiserror::Error;

/// Main error type for the GridScape system
#[derive(Error, Debug)]
pub enum GsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("Sink error: {0}")]
    Sink(#[from] SinkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Configuration errors, all detected before any evaluation starts
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Axis '{axis}' must set exactly one of explicit values or a from/to/by range")]
    ValueSourceConflict { axis: String },

    #[error("Axis '{axis}' has a non-positive step size: {by}")]
    NonPositiveStep { axis: String, by: f64 },

    #[error("Axis '{axis}' expands to an empty value sequence")]
    EmptySequence { axis: String },

    #[error("Axis '{axis}' has an empty value list")]
    EmptyValues { axis: String },

    #[error("Axis '{axis}' requires integral values, got {value}")]
    NonIntegralValue { axis: String, value: f64 },

    #[error("Axis '{axis}' requires boolean (0/1) values, got {value}")]
    NonBooleanValue { axis: String, value: f64 },

    #[error("A from/to/by range is not supported for {kind} axis '{axis}'")]
    RangeNotSupported { axis: String, kind: String },

    #[error("Axis '{axis}' is bound to parameter '{parameter}' which is not part of the state")]
    UnknownParameter { axis: String, parameter: String },

    #[error("Axis '{axis}' matches {count} state nodes named '{parameter}'; bindings must be unique")]
    AmbiguousParameter {
        axis: String,
        parameter: String,
        count: usize,
    },

    #[error("Axes '{first}' and '{second}' are both bound to '{parameter}[{component}]'")]
    DuplicateBinding {
        first: String,
        second: String,
        parameter: String,
        component: usize,
    },

    #[error("Axis '{axis}' targets component {component} but parameter '{parameter}' has {len} component(s)")]
    ComponentOutOfRange {
        axis: String,
        parameter: String,
        component: usize,
        len: usize,
    },

    #[error("Grid size overflows a 64-bit sample counter")]
    GridSizeOverflow,

    #[error("Grid has {points} points, exceeding the configured cap of {max}")]
    GridTooLarge { points: u64, max: u64 },

    #[error("Scan has no grid axes")]
    NoAxes,

    #[error("Companion setter for '{parameter}' has no values")]
    EmptyCompanion { parameter: String },

    #[error("Companion setter for '{parameter}[{component}]' collides with a grid axis binding")]
    CompanionCollision { parameter: String, component: usize },

    #[error("Resume sample {sample} is beyond the grid size of {points} points")]
    ResumeOutOfRange { sample: u64, points: u64 },
}

/// Parameter-state errors
#[derive(Error, Debug)]
pub enum StateError {
    #[error("Unknown parameter: {id}")]
    UnknownNode { id: String },

    #[error("Parameter '{id}' already exists in the state")]
    DuplicateNode { id: String },

    #[error("Component {component} out of range for parameter '{id}' with {len} component(s)")]
    ComponentOutOfRange {
        id: String,
        component: usize,
        len: usize,
    },
}

/// Evaluation errors abort the whole scan
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Objective failed at sample {sample}, point {point:?}: {reason}")]
    ObjectiveFailed {
        sample: u64,
        point: Vec<f64>,
        reason: String,
    },
}

/// Reporting sink errors
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Sink '{sink}' failed to open: {reason}")]
    OpenFailed { sink: String, reason: String },

    #[error("Sink '{sink}' failed to record a row: {reason}")]
    RecordFailed { sink: String, reason: String },

    #[error("Sink '{sink}' failed to close: {reason}")]
    CloseFailed { sink: String, reason: String },
}

/// Result type alias for GridScape operations
pub type GsResult<T> = Result<T, GsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_the_axis() {
        let error = ConfigError::NonPositiveStep {
            axis: "clockRate".to_string(),
            by: 0.0,
        };

        assert!(error.to_string().contains("clockRate"));
        assert!(error.to_string().contains("non-positive"));
    }

    #[test]
    fn eval_error_carries_sample_and_point() {
        let error = EvalError::ObjectiveFailed {
            sample: 17,
            point: vec![0.5, 2.0],
            reason: "likelihood underflow".to_string(),
        };

        let text = error.to_string();
        assert!(text.contains("sample 17"));
        assert!(text.contains("0.5"));
        assert!(text.contains("likelihood underflow"));
    }

    #[test]
    fn error_conversion() {
        let config_error = ConfigError::NoAxes;
        let gs_error: GsError = config_error.into();

        match gs_error {
            GsError::Config(_) => (),
            _ => panic!("Expected Config error"),
        }
    }
}
