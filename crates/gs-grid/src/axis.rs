//! Grid axis variants and construction from declarative specs.

use gs_types::{AxisKind, AxisSpec, ConfigError, GsResult, ParameterStore};
use tracing::warn;

/// Hard cap on the length of a single expanded range, independent of the
/// per-scan grid-size cap (which is only checked once all axes exist).
const MAX_RANGE_POINTS: usize = 100_000_000;

/// One parameter axis with a finite ordered sequence of values to visit.
///
/// The index accessor wraps: `value_at(i)` equals `value_at(i % len())` for
/// every index, so callers may run past the end of the sequence and cycle
/// through it instead of hitting a range error.
pub trait GridAxis {
    /// Number of values on this axis, always at least 1.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `index`, taken modulo `len()`.
    fn value_at(&self, index: usize) -> f64;

    /// Id of the bound parameter.
    fn parameter(&self) -> &str;

    /// Component of the bound parameter this axis controls.
    fn component(&self) -> usize;

    /// Column label for reports and error messages.
    fn label(&self) -> String {
        axis_label(self.parameter(), self.component())
    }

    /// Current traversal position.
    fn cursor(&self) -> usize;

    /// Reset the cursor to the start of the sequence.
    fn reset(&mut self);

    /// Position the cursor, for runs resumed from a checkpoint.
    fn seek(&mut self, cursor: usize);

    /// Push `value_at(index)` into the bound parameter. Pure side effect.
    fn apply(&self, store: &mut dyn ParameterStore, index: usize) -> GsResult<()> {
        store.set_value(self.parameter(), self.component(), self.value_at(index))
    }

    /// Apply the value under the cursor, then move the cursor forward. The
    /// cursor itself never wraps; only the value lookup does.
    fn advance(&mut self, store: &mut dyn ParameterStore) -> GsResult<()> {
        let index = self.cursor();
        self.apply(store, index)?;
        self.seek(index + 1);
        Ok(())
    }
}

fn axis_label(parameter: &str, component: usize) -> String {
    if component == 0 {
        parameter.to_string()
    } else {
        format!("{parameter}[{component}]")
    }
}

/// Parameter binding and cursor shared by every axis variant.
#[derive(Debug, Clone)]
struct AxisBinding {
    parameter: String,
    component: usize,
    cursor: usize,
}

impl AxisBinding {
    fn new(parameter: impl Into<String>, component: usize) -> Self {
        Self {
            parameter: parameter.into(),
            component,
            cursor: 0,
        }
    }

    fn label(&self) -> String {
        axis_label(&self.parameter, self.component)
    }
}

// ---- Real-valued axis ----

/// Axis over real values, from an explicit list or an expanded range.
#[derive(Debug, Clone)]
pub struct RealAxis {
    binding: AxisBinding,
    values: Vec<f64>,
}

impl RealAxis {
    pub fn from_values(
        parameter: impl Into<String>,
        component: usize,
        values: Vec<f64>,
    ) -> GsResult<Self> {
        let binding = AxisBinding::new(parameter, component);
        if values.is_empty() {
            return Err(ConfigError::EmptyValues {
                axis: binding.label(),
            }
            .into());
        }
        Ok(Self { binding, values })
    }

    /// Expand `from`, `to`, `by` into `values[i] = from + i*by`, stopping at
    /// the last value not beyond `to`. A step that does not evenly divide the
    /// range is allowed; the sequence is used as generated and a warning is
    /// emitted.
    pub fn from_range(
        parameter: impl Into<String>,
        component: usize,
        from: f64,
        to: f64,
        by: f64,
    ) -> GsResult<Self> {
        let binding = AxisBinding::new(parameter, component);
        let axis = binding.label();
        if !by.is_finite() || by <= 0.0 {
            return Err(ConfigError::NonPositiveStep { axis, by }.into());
        }

        let steps = 1.0 + (to - from).abs() / by;
        if !steps.is_finite() || steps as usize > MAX_RANGE_POINTS {
            return Err(ConfigError::GridTooLarge {
                points: steps as u64,
                max: MAX_RANGE_POINTS as u64,
            }
            .into());
        }
        let count = steps.floor() as usize;
        if count == 0 {
            return Err(ConfigError::EmptySequence { axis }.into());
        }

        let values: Vec<f64> = (0..count).map(|i| from + i as f64 * by).collect();
        if let Some(&last) = values.last() {
            if last != to {
                warn!(
                    axis = %axis,
                    last,
                    to,
                    "step does not evenly divide the range; grid stops short of 'to'"
                );
            }
        }

        Ok(Self { binding, values })
    }
}

impl GridAxis for RealAxis {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn value_at(&self, index: usize) -> f64 {
        self.values[index % self.values.len()]
    }

    fn parameter(&self) -> &str {
        &self.binding.parameter
    }

    fn component(&self) -> usize {
        self.binding.component
    }

    fn cursor(&self) -> usize {
        self.binding.cursor
    }

    fn reset(&mut self) {
        self.binding.cursor = 0;
    }

    fn seek(&mut self, cursor: usize) {
        self.binding.cursor = cursor;
    }
}

// ---- Integer-valued axis ----

/// Axis over integer values, pushed into the store as `f64`.
#[derive(Debug, Clone)]
pub struct IntegerAxis {
    binding: AxisBinding,
    values: Vec<i64>,
}

impl IntegerAxis {
    pub fn from_values(
        parameter: impl Into<String>,
        component: usize,
        values: Vec<i64>,
    ) -> GsResult<Self> {
        let binding = AxisBinding::new(parameter, component);
        if values.is_empty() {
            return Err(ConfigError::EmptyValues {
                axis: binding.label(),
            }
            .into());
        }
        Ok(Self { binding, values })
    }

    pub fn from_range(
        parameter: impl Into<String>,
        component: usize,
        from: i64,
        to: i64,
        by: i64,
    ) -> GsResult<Self> {
        let binding = AxisBinding::new(parameter, component);
        let axis = binding.label();
        if by <= 0 {
            return Err(ConfigError::NonPositiveStep {
                axis,
                by: by as f64,
            }
            .into());
        }

        let count = (1 + (to - from).abs() / by) as usize;
        let values: Vec<i64> = (0..count).map(|i| from + i as i64 * by).collect();
        if values.last() != Some(&to) {
            warn!(
                axis = %axis,
                to,
                "step does not evenly divide the range; grid stops short of 'to'"
            );
        }

        Ok(Self { binding, values })
    }
}

impl GridAxis for IntegerAxis {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn value_at(&self, index: usize) -> f64 {
        self.values[index % self.values.len()] as f64
    }

    fn parameter(&self) -> &str {
        &self.binding.parameter
    }

    fn component(&self) -> usize {
        self.binding.component
    }

    fn cursor(&self) -> usize {
        self.binding.cursor
    }

    fn reset(&mut self) {
        self.binding.cursor = 0;
    }

    fn seek(&mut self, cursor: usize) {
        self.binding.cursor = cursor;
    }
}

// ---- Boolean-valued axis ----

/// Axis over boolean values, pushed into the store as 0.0 / 1.0.
#[derive(Debug, Clone)]
pub struct BooleanAxis {
    binding: AxisBinding,
    values: Vec<bool>,
}

impl BooleanAxis {
    /// The full boolean axis, `[false, true]`.
    pub fn new(parameter: impl Into<String>, component: usize) -> Self {
        Self {
            binding: AxisBinding::new(parameter, component),
            values: vec![false, true],
        }
    }

    pub fn from_values(
        parameter: impl Into<String>,
        component: usize,
        values: Vec<bool>,
    ) -> GsResult<Self> {
        let binding = AxisBinding::new(parameter, component);
        if values.is_empty() {
            return Err(ConfigError::EmptyValues {
                axis: binding.label(),
            }
            .into());
        }
        Ok(Self { binding, values })
    }
}

impl GridAxis for BooleanAxis {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn value_at(&self, index: usize) -> f64 {
        if self.values[index % self.values.len()] {
            1.0
        } else {
            0.0
        }
    }

    fn parameter(&self) -> &str {
        &self.binding.parameter
    }

    fn component(&self) -> usize {
        self.binding.component
    }

    fn cursor(&self) -> usize {
        self.binding.cursor
    }

    fn reset(&mut self) {
        self.binding.cursor = 0;
    }

    fn seek(&mut self, cursor: usize) {
        self.binding.cursor = cursor;
    }
}

// ---- Spec dispatch ----

impl std::fmt::Debug for dyn GridAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridAxis")
            .field("label", &self.label())
            .field("len", &self.len())
            .field("cursor", &self.cursor())
            .finish_non_exhaustive()
    }
}

/// Build the concrete axis described by `spec`.
///
/// Exactly one of explicit values or the full from/to/by triple must be
/// present; anything else is a configuration error named after the axis.
pub fn build_axis(spec: &AxisSpec) -> GsResult<Box<dyn GridAxis>> {
    let axis = spec.label();
    let has_values = spec.values.is_some();
    let has_range = spec.from.is_some() && spec.to.is_some() && spec.by.is_some();
    let partial_range =
        !has_range && (spec.from.is_some() || spec.to.is_some() || spec.by.is_some());
    if has_values == has_range || partial_range {
        return Err(ConfigError::ValueSourceConflict { axis }.into());
    }

    match (spec.kind, &spec.values) {
        (AxisKind::Real, Some(values)) => Ok(Box::new(RealAxis::from_values(
            &spec.parameter,
            spec.component,
            values.clone(),
        )?)),
        (AxisKind::Real, None) => Ok(Box::new(RealAxis::from_range(
            &spec.parameter,
            spec.component,
            spec.from.unwrap_or_default(),
            spec.to.unwrap_or_default(),
            spec.by.unwrap_or_default(),
        )?)),
        (AxisKind::Integer, Some(values)) => {
            let ints = values
                .iter()
                .map(|&value| as_integer(&axis, value))
                .collect::<GsResult<Vec<i64>>>()?;
            Ok(Box::new(IntegerAxis::from_values(
                &spec.parameter,
                spec.component,
                ints,
            )?))
        }
        (AxisKind::Integer, None) => {
            let from = as_integer(&axis, spec.from.unwrap_or_default())?;
            let to = as_integer(&axis, spec.to.unwrap_or_default())?;
            let by = as_integer(&axis, spec.by.unwrap_or_default())?;
            Ok(Box::new(IntegerAxis::from_range(
                &spec.parameter,
                spec.component,
                from,
                to,
                by,
            )?))
        }
        (AxisKind::Boolean, Some(values)) => {
            let bools = values
                .iter()
                .map(|&value| as_boolean(&axis, value))
                .collect::<GsResult<Vec<bool>>>()?;
            Ok(Box::new(BooleanAxis::from_values(
                &spec.parameter,
                spec.component,
                bools,
            )?))
        }
        (AxisKind::Boolean, None) => Err(ConfigError::RangeNotSupported {
            axis,
            kind: "boolean".to_string(),
        }
        .into()),
    }
}

fn as_integer(axis: &str, value: f64) -> GsResult<i64> {
    if value.fract() != 0.0 || !value.is_finite() {
        return Err(ConfigError::NonIntegralValue {
            axis: axis.to_string(),
            value,
        }
        .into());
    }
    Ok(value as i64)
}

fn as_boolean(axis: &str, value: f64) -> GsResult<bool> {
    if value == 0.0 {
        Ok(false)
    } else if value == 1.0 {
        Ok(true)
    } else {
        Err(ConfigError::NonBooleanValue {
            axis: axis.to_string(),
            value,
        }
        .into())
    }
}
