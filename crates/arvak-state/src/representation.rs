//! The contract a concrete state representation fulfils.

use ndarray::Array2;
use num_complex::Complex64;

use crate::error::StateResult;

/// A numeric representation of a joint quantum state.
///
/// The owning [`SimulationState`](crate::SimulationState) translates qids
/// into `axes` (positions in its qid list) and passes the matching
/// per-axis `dims` along, so implementations never see qid identities.
pub trait Representation: Clone + Send + Sync + 'static {
    /// Short name used in diagnostics.
    const NAME: &'static str;

    /// Projectively measure `axes`, collapsing the state.
    ///
    /// Returns one outcome per axis, in axis order.
    fn perform_measurement(&mut self, axes: &[usize], dims: &[usize]) -> StateResult<Vec<i64>>;

    /// Draw `repetitions` samples of `axes` without collapsing the state.
    ///
    /// Only the random source may advance.
    fn sample(
        &mut self,
        axes: &[usize],
        dims: &[usize],
        repetitions: usize,
    ) -> StateResult<Vec<Vec<i64>>>;

    /// Apply a dense matrix to `axes`.
    ///
    /// Returns `Ok(false)` when this representation cannot apply arbitrary
    /// matrices, which makes the dispatcher move on to the next strategy.
    fn apply_matrix(
        &mut self,
        _matrix: &Array2<Complex64>,
        _axes: &[usize],
        _dims: &[usize],
    ) -> StateResult<bool> {
        Ok(false)
    }

    /// Reseed any internal random source.
    fn reseed(&mut self, _seed: u64) {}
}
