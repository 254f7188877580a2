use serde::{Deserialize, Serialize};

use crate::errors::{GsResult, StateError};

/// The parameter state consumed by a scan.
///
/// Implementations own the current value of every managed parameter and the
/// dirtiness bookkeeping that lets an [`Objective`] reuse cached partial
/// results. A scan brackets each evaluation with `accept_changes` /
/// `recompute_dirtiness` before and `propagate_dirty(false)` after, so dirty
/// flags are still visible while the objective runs.
pub trait ParameterStore {
    /// Ids of every managed parameter node, in a stable order.
    fn node_ids(&self) -> Vec<String>;

    /// Whether `id` names a managed node.
    fn contains(&self, id: &str) -> bool {
        self.node_ids().iter().any(|node| node == id)
    }

    /// Number of components of the named parameter.
    fn node_len(&self, id: &str) -> GsResult<usize>;

    /// Current value of one component.
    fn value(&self, id: &str, component: usize) -> GsResult<f64>;

    /// Current value vector of the named parameter.
    fn values(&self, id: &str) -> GsResult<Vec<f64>>;

    /// Set one component of a possibly multi-dimensional parameter.
    fn set_value(&mut self, id: &str, component: usize, value: f64) -> GsResult<()>;

    /// Whether the named parameter has uncommitted or unpropagated changes.
    fn is_dirty(&self, id: &str) -> GsResult<bool>;

    /// Mark every node dirty (`true`) or clean (`false`).
    fn propagate_dirty(&mut self, all_dirty: bool);

    /// Accept all pending node mutations.
    fn accept_changes(&mut self);

    /// Refresh which downstream calculations are stale.
    fn recompute_dirtiness(&mut self);
}

/// One named parameter with its current value vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterNode {
    pub id: String,
    pub values: Vec<f64>,
    #[serde(skip)]
    dirty: bool,
}

impl ParameterNode {
    pub fn new(id: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            id: id.into(),
            values,
            dirty: false,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// In-memory [`ParameterStore`] implementation.
///
/// Values are committed in place; `accept_changes` only advances the commit
/// generation, and dirty flags survive until `propagate_dirty(false)` so a
/// caching objective can see which nodes moved since the last evaluation.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    nodes: Vec<ParameterNode>,
    stale: bool,
    generation: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with_parameter(mut self, id: impl Into<String>, values: Vec<f64>) -> GsResult<Self> {
        self.insert(id, values)?;
        Ok(self)
    }

    pub fn insert(&mut self, id: impl Into<String>, values: Vec<f64>) -> GsResult<()> {
        let id = id.into();
        if self.contains(&id) {
            return Err(StateError::DuplicateNode { id }.into());
        }
        self.nodes.push(ParameterNode::new(id, values));
        Ok(())
    }

    /// Number of committed change-sets so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether any node is currently dirty.
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    fn find(&self, id: &str) -> GsResult<&ParameterNode> {
        self.nodes
            .iter()
            .find(|node| node.id == id)
            .ok_or_else(|| StateError::UnknownNode { id: id.to_string() }.into())
    }

    fn find_mut(&mut self, id: &str) -> GsResult<&mut ParameterNode> {
        self.nodes
            .iter_mut()
            .find(|node| node.id == id)
            .ok_or_else(|| StateError::UnknownNode { id: id.to_string() }.into())
    }
}

impl ParameterStore for MemoryStore {
    fn node_ids(&self) -> Vec<String> {
        self.nodes.iter().map(|node| node.id.clone()).collect()
    }

    fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }

    fn node_len(&self, id: &str) -> GsResult<usize> {
        Ok(self.find(id)?.values.len())
    }

    fn value(&self, id: &str, component: usize) -> GsResult<f64> {
        let node = self.find(id)?;
        node.values.get(component).copied().ok_or_else(|| {
            StateError::ComponentOutOfRange {
                id: id.to_string(),
                component,
                len: node.values.len(),
            }
            .into()
        })
    }

    fn values(&self, id: &str) -> GsResult<Vec<f64>> {
        Ok(self.find(id)?.values.clone())
    }

    fn set_value(&mut self, id: &str, component: usize, value: f64) -> GsResult<()> {
        let node = self.find_mut(id)?;
        let len = node.values.len();
        match node.values.get_mut(component) {
            Some(slot) => {
                *slot = value;
                node.dirty = true;
                Ok(())
            }
            None => Err(StateError::ComponentOutOfRange {
                id: id.to_string(),
                component,
                len,
            }
            .into()),
        }
    }

    fn is_dirty(&self, id: &str) -> GsResult<bool> {
        Ok(self.find(id)?.dirty)
    }

    fn propagate_dirty(&mut self, all_dirty: bool) {
        for node in &mut self.nodes {
            node.dirty = all_dirty;
        }
        self.stale = all_dirty;
    }

    fn accept_changes(&mut self) {
        self.generation += 1;
    }

    fn recompute_dirtiness(&mut self) {
        self.stale = self.nodes.iter().any(|node| node.dirty);
    }
}

/// The opaque objective evaluator.
///
/// Returns the current log-density given the store's values. Implementations
/// may cache partial results keyed on the store's dirty flags; correctness
/// must hold with a full recomputation as well.
pub trait Objective {
    fn log_density(&mut self, store: &dyn ParameterStore) -> GsResult<f64>;
}

impl<F> Objective for F
where
    F: FnMut(&dyn ParameterStore) -> GsResult<f64>,
{
    fn log_density(&mut self, store: &dyn ParameterStore) -> GsResult<f64> {
        self(store)
    }
}
