//! The operation contract consumed by act-on dispatch.

use std::collections::HashMap;
use std::fmt;

use ndarray::Array2;
use num_complex::Complex64;

use arvak_ir::{MeasurementKey, Qid};

use crate::error::StateResult;
use crate::state::ActOnTarget;

/// Something that can be applied to a simulation state.
///
/// Every hook is optional. Dispatch tries them in order: [`act_on`],
/// [`matrix`], then [`decompose`]. An operation that offers none of them
/// cannot be simulated.
///
/// [`act_on`]: Operation::act_on
/// [`matrix`]: Operation::matrix
/// [`decompose`]: Operation::decompose
pub trait Operation: fmt::Debug + Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// Qids the operation acts on.
    fn qids(&self) -> &[Qid];

    /// Apply directly to `target` if this operation knows how to.
    ///
    /// Returns `Ok(false)` to let dispatch try the next strategy.
    fn act_on(&self, _target: &mut dyn ActOnTarget, _qids: &[Qid]) -> StateResult<bool> {
        Ok(false)
    }

    /// Dense unitary, if known.
    fn matrix(&self) -> Option<Array2<Complex64>> {
        None
    }

    /// Simpler operations equivalent to applying this one to `qids`.
    ///
    /// Sub-operations must only touch qids from `qids`.
    fn decompose(&self, _qids: &[Qid]) -> StateResult<Option<Vec<Box<dyn Operation>>>> {
        Ok(None)
    }

    /// Fully qualified keys of the measurements this operation performs.
    fn measurement_keys(&self) -> StateResult<Vec<MeasurementKey>> {
        Ok(Vec::new())
    }

    /// Copy with `component` prepended to every measurement key path.
    fn with_key_path_prefix(&self, _component: &str) -> StateResult<Box<dyn Operation>> {
        Ok(self.clone_box())
    }

    /// Copy with measurement key names substituted through `mapping`.
    fn with_measurement_key_mapping(
        &self,
        _mapping: &HashMap<String, String>,
    ) -> StateResult<Box<dyn Operation>> {
        Ok(self.clone_box())
    }

    /// Boxed clone.
    fn clone_box(&self) -> Box<dyn Operation>;
}

impl Clone for Box<dyn Operation> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
