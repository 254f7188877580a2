//! Ordered axis collection and binding validation.

use gs_types::{AxisSpec, ConfigError, GsResult, ParameterStore};

use crate::axis::{build_axis, GridAxis};

/// The full grid: an ordered list of axes. Axis 0 is the outermost (slowest)
/// dimension of the cross-product.
#[derive(Default)]
pub struct GridSpace {
    axes: Vec<Box<dyn GridAxis>>,
}

impl GridSpace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_specs(specs: &[AxisSpec]) -> GsResult<Self> {
        let mut space = Self::new();
        for spec in specs {
            space.push(build_axis(spec)?);
        }
        Ok(space)
    }

    pub fn push(&mut self, axis: Box<dyn GridAxis>) {
        self.axes.push(axis);
    }

    pub fn with_axis(mut self, axis: Box<dyn GridAxis>) -> Self {
        self.push(axis);
        self
    }

    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    pub fn axes(&self) -> &[Box<dyn GridAxis>] {
        &self.axes
    }

    pub fn axes_mut(&mut self) -> &mut [Box<dyn GridAxis>] {
        &mut self.axes
    }

    /// Per-axis sequence lengths, in nesting order.
    pub fn sizes(&self) -> Vec<usize> {
        self.axes.iter().map(|axis| axis.len()).collect()
    }

    /// Column labels, in nesting order.
    pub fn labels(&self) -> Vec<String> {
        self.axes.iter().map(|axis| axis.label()).collect()
    }

    /// Total number of grid points, i.e. the product of all axis lengths.
    pub fn grid_size(&self) -> GsResult<u64> {
        if self.axes.is_empty() {
            return Err(ConfigError::NoAxes.into());
        }
        self.axes
            .iter()
            .try_fold(1u64, |product, axis| {
                product.checked_mul(axis.len() as u64)
            })
            .ok_or_else(|| ConfigError::GridSizeOverflow.into())
    }

    /// Check every axis binding against the store: the bound parameter must
    /// appear exactly once among the managed nodes, the component must be in
    /// range, and no two axes may share a `(parameter, component)` binding.
    ///
    /// Side-effect free and idempotent; a failure rejects the whole scan
    /// rather than skipping the offending axis.
    pub fn validate(&self, store: &dyn ParameterStore) -> GsResult<()> {
        if self.axes.is_empty() {
            return Err(ConfigError::NoAxes.into());
        }

        let ids = store.node_ids();
        let mut bound: Vec<(&str, usize, String)> = Vec::new();
        for axis in &self.axes {
            let parameter = axis.parameter();
            let matches = ids.iter().filter(|id| id.as_str() == parameter).count();
            if matches == 0 {
                return Err(ConfigError::UnknownParameter {
                    axis: axis.label(),
                    parameter: parameter.to_string(),
                }
                .into());
            }
            if matches > 1 {
                return Err(ConfigError::AmbiguousParameter {
                    axis: axis.label(),
                    parameter: parameter.to_string(),
                    count: matches,
                }
                .into());
            }

            let len = store.node_len(parameter)?;
            if axis.component() >= len {
                return Err(ConfigError::ComponentOutOfRange {
                    axis: axis.label(),
                    parameter: parameter.to_string(),
                    component: axis.component(),
                    len,
                }
                .into());
            }

            if let Some((_, _, first)) = bound
                .iter()
                .find(|(id, component, _)| *id == parameter && *component == axis.component())
            {
                return Err(ConfigError::DuplicateBinding {
                    first: first.clone(),
                    second: axis.label(),
                    parameter: parameter.to_string(),
                    component: axis.component(),
                }
                .into());
            }
            bound.push((parameter, axis.component(), axis.label()));
        }

        Ok(())
    }

    /// Snapshot of the current grid-point coordinates, read back from the
    /// store in axis order.
    pub fn point(&self, store: &dyn ParameterStore) -> GsResult<Vec<f64>> {
        self.axes
            .iter()
            .map(|axis| store.value(axis.parameter(), axis.component()))
            .collect()
    }

    /// Reset every axis cursor to the start of its sequence.
    pub fn reset(&mut self) {
        for axis in &mut self.axes {
            axis.reset();
        }
    }
}

impl std::fmt::Debug for GridSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridSpace")
            .field("axes", &self.labels())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::axis::RealAxis;
    use gs_types::{GsError, MemoryStore};

    fn sample_store() -> MemoryStore {
        MemoryStore::new()
            .with_parameter("kappa", vec![2.0])
            .unwrap()
            .with_parameter("freqs", vec![0.25, 0.25, 0.25, 0.25])
            .unwrap()
    }

    fn real_axis(parameter: &str, component: usize, values: Vec<f64>) -> Box<dyn GridAxis> {
        Box::new(RealAxis::from_values(parameter, component, values).unwrap())
    }

    #[test]
    fn grid_size_is_product_of_axis_lengths() {
        let space = GridSpace::new()
            .with_axis(real_axis("kappa", 0, vec![1.0, 2.0]))
            .with_axis(real_axis("freqs", 1, vec![0.1, 0.2, 0.3]));

        assert_eq!(space.grid_size().unwrap(), 6);
        assert_eq!(space.sizes(), vec![2, 3]);
        assert_eq!(space.labels(), vec!["kappa", "freqs[1]"]);
    }

    #[test]
    fn empty_space_rejected() {
        let space = GridSpace::new();
        assert!(matches!(
            space.grid_size(),
            Err(GsError::Config(ConfigError::NoAxes))
        ));
        assert!(matches!(
            space.validate(&sample_store()),
            Err(GsError::Config(ConfigError::NoAxes))
        ));
    }

    #[test]
    fn validate_accepts_unique_bindings() {
        let space = GridSpace::new()
            .with_axis(real_axis("kappa", 0, vec![1.0, 2.0]))
            .with_axis(real_axis("freqs", 2, vec![0.1, 0.2]));

        space.validate(&sample_store()).unwrap();
    }

    #[test]
    fn validate_is_idempotent() {
        let store = sample_store();
        let space = GridSpace::new().with_axis(real_axis("kappa", 0, vec![1.0]));

        space.validate(&store).unwrap();
        space.validate(&store).unwrap();

        let bad = GridSpace::new().with_axis(real_axis("mu", 0, vec![1.0]));
        assert!(bad.validate(&store).is_err());
        assert!(bad.validate(&store).is_err());
    }

    #[test]
    fn validate_names_unknown_parameter() {
        let space = GridSpace::new().with_axis(real_axis("mu", 0, vec![1.0]));

        match space.validate(&sample_store()) {
            Err(GsError::Config(ConfigError::UnknownParameter { axis, parameter })) => {
                assert_eq!(axis, "mu");
                assert_eq!(parameter, "mu");
            }
            other => panic!("expected UnknownParameter, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_duplicate_bindings() {
        let space = GridSpace::new()
            .with_axis(real_axis("kappa", 0, vec![1.0, 2.0]))
            .with_axis(real_axis("kappa", 0, vec![3.0, 4.0]));

        match space.validate(&sample_store()) {
            Err(GsError::Config(ConfigError::DuplicateBinding {
                first,
                second,
                parameter,
                component,
            })) => {
                assert_eq!(first, "kappa");
                assert_eq!(second, "kappa");
                assert_eq!(parameter, "kappa");
                assert_eq!(component, 0);
            }
            other => panic!("expected DuplicateBinding, got {other:?}"),
        }
    }

    #[test]
    fn validate_allows_distinct_components_of_one_parameter() {
        let space = GridSpace::new()
            .with_axis(real_axis("freqs", 0, vec![0.1, 0.2]))
            .with_axis(real_axis("freqs", 1, vec![0.3, 0.4]));

        space.validate(&sample_store()).unwrap();
    }

    #[test]
    fn validate_rejects_out_of_range_component() {
        let space = GridSpace::new().with_axis(real_axis("kappa", 1, vec![1.0]));

        match space.validate(&sample_store()) {
            Err(GsError::Config(ConfigError::ComponentOutOfRange {
                axis,
                component,
                len,
                ..
            })) => {
                assert_eq!(axis, "kappa[1]");
                assert_eq!(component, 1);
                assert_eq!(len, 1);
            }
            other => panic!("expected ComponentOutOfRange, got {other:?}"),
        }
    }

    #[test]
    fn validate_rejects_ambiguous_parameter_ids() {
        /// A store whose node enumeration reports a duplicated id, which a
        /// well-formed store never does; validation must still reject it.
        struct AmbiguousStore;

        impl ParameterStore for AmbiguousStore {
            fn node_ids(&self) -> Vec<String> {
                vec!["kappa".to_string(), "kappa".to_string()]
            }
            fn node_len(&self, _id: &str) -> GsResult<usize> {
                Ok(1)
            }
            fn value(&self, _id: &str, _component: usize) -> GsResult<f64> {
                Ok(0.0)
            }
            fn values(&self, _id: &str) -> GsResult<Vec<f64>> {
                Ok(vec![0.0])
            }
            fn set_value(&mut self, _id: &str, _component: usize, _value: f64) -> GsResult<()> {
                Ok(())
            }
            fn is_dirty(&self, _id: &str) -> GsResult<bool> {
                Ok(false)
            }
            fn propagate_dirty(&mut self, _all_dirty: bool) {}
            fn accept_changes(&mut self) {}
            fn recompute_dirtiness(&mut self) {}
        }

        let space = GridSpace::new().with_axis(real_axis("kappa", 0, vec![1.0]));

        match space.validate(&AmbiguousStore) {
            Err(GsError::Config(ConfigError::AmbiguousParameter { count, .. })) => {
                assert_eq!(count, 2);
            }
            other => panic!("expected AmbiguousParameter, got {other:?}"),
        }
    }

    #[test]
    fn point_reads_coordinates_in_axis_order() {
        let mut store = sample_store();
        let space = GridSpace::new()
            .with_axis(real_axis("freqs", 1, vec![0.1]))
            .with_axis(real_axis("kappa", 0, vec![1.0]));

        space.axes()[0].apply(&mut store, 0).unwrap();
        space.axes()[1].apply(&mut store, 0).unwrap();

        assert_eq!(space.point(&store).unwrap(), vec![0.1, 1.0]);
    }

    #[test]
    fn from_specs_builds_all_axes() {
        let specs = vec![
            AxisSpec::with_range("kappa", 1.0, 3.0, 1.0),
            AxisSpec::with_values("freqs", vec![0.2, 0.3]).with_component(1),
        ];
        let space = GridSpace::from_specs(&specs).unwrap();

        assert_eq!(space.len(), 2);
        assert_eq!(space.sizes(), vec![3, 2]);
        assert_eq!(space.labels(), vec!["kappa", "freqs[1]"]);
    }
}
