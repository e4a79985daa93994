//! Mixed-radix statevector representation.
//!
//! Axis `k` is the `k`-th qid of the owning state. Amplitudes are stored
//! little-endian: axis 0 varies fastest, and the stride of axis `k` is the
//! product of the dimensions of axes `0..k`.

use ndarray::{Array1, Array2};
use num_complex::Complex64;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use arvak_ir::Qid;

use crate::error::{StateError, StateResult};
use crate::representation::Representation;
use crate::state::SimulationState;

/// Tolerance below which an outcome probability counts as zero.
const EPSILON: f64 = 1e-12;

/// A statevector over axes of arbitrary dimension.
#[derive(Debug, Clone)]
pub struct StateVector {
    /// The state amplitudes (product of `dims` complex numbers).
    amplitudes: Vec<Complex64>,
    /// Dimension of each axis.
    dims: Vec<usize>,
    /// Stride of each axis in `amplitudes`.
    strides: Vec<usize>,
    rng: StdRng,
}

impl StateVector {
    /// Create a statevector initialized to |0...0⟩.
    pub fn new(dims: &[usize]) -> Self {
        let mut strides = Vec::with_capacity(dims.len());
        let mut size = 1usize;
        for &d in dims {
            strides.push(size);
            size *= d;
        }
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            dims: dims.to_vec(),
            strides,
            rng: StdRng::from_entropy(),
        }
    }

    /// Create a statevector sized for `qids`.
    pub fn for_qids(qids: &[Qid]) -> Self {
        let dims: Vec<usize> = qids.iter().map(|q| q.dimension() as usize).collect();
        Self::new(&dims)
    }

    /// Use a fixed seed for measurement and sampling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Get the number of axes.
    pub fn num_axes(&self) -> usize {
        self.dims.len()
    }

    /// The raw amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Probability of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    #[inline]
    fn digit(&self, index: usize, axis: usize) -> usize {
        (index / self.strides[axis]) % self.dims[axis]
    }

    fn check_axes(&self, axes: &[usize], dims: &[usize]) -> StateResult<()> {
        if axes.len() != dims.len() {
            return Err(StateError::Representation(format!(
                "{} axes but {} dimensions",
                axes.len(),
                dims.len()
            )));
        }
        for (i, (&axis, &dim)) in axes.iter().zip(dims).enumerate() {
            if axis >= self.dims.len() {
                return Err(StateError::Representation(format!(
                    "axis {axis} out of range for {} axes",
                    self.dims.len()
                )));
            }
            if self.dims[axis] != dim {
                return Err(StateError::Representation(format!(
                    "axis {axis} has dimension {}, expected {dim}",
                    self.dims[axis]
                )));
            }
            if axes[..i].contains(&axis) {
                return Err(StateError::Representation(format!(
                    "axis {axis} given twice"
                )));
            }
        }
        Ok(())
    }

    /// Joint outcome index of `axes` in basis state `index`, axis 0 fastest.
    fn outcome_of(&self, index: usize, axes: &[usize]) -> usize {
        let mut outcome = 0;
        let mut weight = 1;
        for &axis in axes {
            outcome += self.digit(index, axis) * weight;
            weight *= self.dims[axis];
        }
        outcome
    }

    fn outcome_digits(&self, mut outcome: usize, axes: &[usize]) -> Vec<i64> {
        axes.iter()
            .map(|&axis| {
                let d = self.dims[axis];
                let digit = outcome % d;
                outcome /= d;
                digit as i64
            })
            .collect()
    }

    fn outcome_probabilities(&self, axes: &[usize]) -> Vec<f64> {
        let size: usize = axes.iter().map(|&a| self.dims[a]).product();
        let mut probs = vec![0.0; size];
        for (i, amp) in self.amplitudes.iter().enumerate() {
            probs[self.outcome_of(i, axes)] += amp.norm_sqr();
        }
        probs
    }

    fn draw(rng: &mut StdRng, probs: &[f64]) -> usize {
        let total: f64 = probs.iter().sum();
        let r: f64 = rng.gen_range(0.0..1.0) * total;
        let mut cumulative = 0.0;
        for (i, p) in probs.iter().enumerate() {
            cumulative += p;
            if r < cumulative {
                return i;
            }
        }
        // Rounding can leave `r` just above the last cumulative sum.
        probs.iter().rposition(|&p| p > EPSILON).unwrap_or(0)
    }

    // =========================================================================
    // Qubit kernels
    // =========================================================================

    /// Pauli-X on a two-level axis.
    pub fn apply_x(&mut self, axis: usize) {
        let s = self.strides[axis];
        for i in 0..self.amplitudes.len() {
            if self.digit(i, axis) == 0 {
                self.amplitudes.swap(i, i + s);
            }
        }
    }

    /// Pauli-Z on a two-level axis.
    pub fn apply_z(&mut self, axis: usize) {
        for i in 0..self.amplitudes.len() {
            if self.digit(i, axis) == 1 {
                self.amplitudes[i] = -self.amplitudes[i];
            }
        }
    }

    /// Hadamard on a two-level axis.
    pub fn apply_h(&mut self, axis: usize) {
        let s = self.strides[axis];
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..self.amplitudes.len() {
            if self.digit(i, axis) == 0 {
                let a = self.amplitudes[i];
                let b = self.amplitudes[i + s];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[i + s] = sqrt2_inv * (a - b);
            }
        }
    }

    /// Controlled-X between two two-level axes.
    pub fn apply_cx(&mut self, control: usize, target: usize) {
        let s = self.strides[target];
        for i in 0..self.amplitudes.len() {
            if self.digit(i, control) == 1 && self.digit(i, target) == 0 {
                self.amplitudes.swap(i, i + s);
            }
        }
    }

    /// Controlled-Z between two two-level axes.
    pub fn apply_cz(&mut self, a: usize, b: usize) {
        for i in 0..self.amplitudes.len() {
            if self.digit(i, a) == 1 && self.digit(i, b) == 1 {
                self.amplitudes[i] = -self.amplitudes[i];
            }
        }
    }

    /// SWAP between two two-level axes.
    pub fn apply_swap(&mut self, a: usize, b: usize) {
        let (sa, sb) = (self.strides[a], self.strides[b]);
        for i in 0..self.amplitudes.len() {
            if self.digit(i, a) == 1 && self.digit(i, b) == 0 {
                let j = i - sa + sb;
                self.amplitudes.swap(i, j);
            }
        }
    }
}

impl Representation for StateVector {
    const NAME: &'static str = "statevector";

    fn perform_measurement(&mut self, axes: &[usize], dims: &[usize]) -> StateResult<Vec<i64>> {
        self.check_axes(axes, dims)?;
        let probs = self.outcome_probabilities(axes);
        let outcome = Self::draw(&mut self.rng, &probs);

        // Project onto the outcome and renormalize.
        let norm = probs[outcome].sqrt();
        if norm <= EPSILON {
            return Err(StateError::Representation(
                "measurement drew an outcome with zero probability".to_string(),
            ));
        }
        for i in 0..self.amplitudes.len() {
            if self.outcome_of(i, axes) == outcome {
                self.amplitudes[i] /= norm;
            } else {
                self.amplitudes[i] = Complex64::new(0.0, 0.0);
            }
        }

        Ok(self.outcome_digits(outcome, axes))
    }

    fn sample(
        &mut self,
        axes: &[usize],
        dims: &[usize],
        repetitions: usize,
    ) -> StateResult<Vec<Vec<i64>>> {
        self.check_axes(axes, dims)?;
        let probs = self.outcome_probabilities(axes);
        let mut samples = Vec::with_capacity(repetitions);
        for _ in 0..repetitions {
            let outcome = Self::draw(&mut self.rng, &probs);
            samples.push(self.outcome_digits(outcome, axes));
        }
        Ok(samples)
    }

    fn apply_matrix(
        &mut self,
        matrix: &Array2<Complex64>,
        axes: &[usize],
        dims: &[usize],
    ) -> StateResult<bool> {
        self.check_axes(axes, dims)?;
        let sub_size: usize = dims.iter().product();
        if matrix.shape() != [sub_size, sub_size] {
            return Err(StateError::Representation(format!(
                "matrix of shape {:?} does not act on a {sub_size}-dimensional subspace",
                matrix.shape()
            )));
        }

        // Offset of every joint sub-index relative to a base index whose
        // target digits are all zero.
        let offsets: Vec<usize> = (0..sub_size)
            .map(|mut m| {
                let mut offset = 0;
                for &axis in axes {
                    let d = self.dims[axis];
                    offset += (m % d) * self.strides[axis];
                    m /= d;
                }
                offset
            })
            .collect();

        for base in 0..self.amplitudes.len() {
            if axes.iter().any(|&axis| self.digit(base, axis) != 0) {
                continue;
            }
            let v: Array1<Complex64> = offsets.iter().map(|&o| self.amplitudes[base + o]).collect();
            let out = matrix.dot(&v);
            for (&o, amp) in offsets.iter().zip(out.iter()) {
                self.amplitudes[base + o] = *amp;
            }
        }
        Ok(true)
    }

    fn reseed(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

impl SimulationState<StateVector> {
    /// A |0...0⟩ statevector state over `qids`.
    pub fn statevector(qids: impl IntoIterator<Item = Qid>) -> StateResult<Self> {
        let qids: Vec<Qid> = qids.into_iter().collect();
        let repr = StateVector::for_qids(&qids);
        Self::new(qids, repr)
    }
}
