use gs_types::{ConfigError, GsResult, ParameterStore};

/// Applies a value list to a parameter in lockstep with the sample counter,
/// cycling through the list, without contributing a grid dimension.
///
/// Useful for co-varying a nuisance parameter alongside a scan; the value for
/// sample `n` is `values[n % values.len()]`.
#[derive(Debug, Clone)]
pub struct CompanionSetter {
    parameter: String,
    component: usize,
    values: Vec<f64>,
}

impl CompanionSetter {
    pub fn new(
        parameter: impl Into<String>,
        component: usize,
        values: Vec<f64>,
    ) -> GsResult<Self> {
        let parameter = parameter.into();
        if values.is_empty() {
            return Err(ConfigError::EmptyCompanion { parameter }.into());
        }
        Ok(Self {
            parameter,
            component,
            values,
        })
    }

    pub fn parameter(&self) -> &str {
        &self.parameter
    }

    pub fn component(&self) -> usize {
        self.component
    }

    pub fn label(&self) -> String {
        if self.component == 0 {
            self.parameter.clone()
        } else {
            format!("{}[{}]", self.parameter, self.component)
        }
    }

    /// Push the value for `sample` into the bound parameter.
    pub fn apply(&self, store: &mut dyn ParameterStore, sample: u64) -> GsResult<()> {
        let index = (sample % self.values.len() as u64) as usize;
        store.set_value(&self.parameter, self.component, self.values[index])
    }
}
