//! The simulation-state container.

use std::any::Any;
use std::ops::Index;

use ndarray::Array2;
use num_complex::Complex64;
use tracing::debug;

use arvak_ir::{MeasurementKey, Qid};

use crate::dispatch::ActOnDispatcher;
use crate::error::{StateError, StateResult};
use crate::log::MeasurementLog;
use crate::operation::Operation;
use crate::representation::Representation;

/// The view of a simulation state that operations and act-on strategies see.
///
/// This is object safe so operations can be written once against any
/// representation; an operation that has a fast path for one particular
/// representation can recover the concrete type through
/// [`ActOnTarget::as_any_mut`].
pub trait ActOnTarget {
    /// Qids in axis order.
    fn qids(&self) -> &[Qid];

    /// Axis of `qid`.
    fn index_of(&self, qid: &Qid) -> StateResult<usize>;

    /// Measure `qids`, store the results under `key`.
    fn measure(&mut self, qids: &[Qid], key: MeasurementKey, invert_mask: &[bool])
    -> StateResult<()>;

    /// Try to apply a dense matrix to `qids`. `Ok(false)` if unsupported.
    fn apply_matrix(&mut self, matrix: &Array2<Complex64>, qids: &[Qid]) -> StateResult<bool>;

    /// Name of the underlying representation.
    fn representation_name(&self) -> &'static str;

    /// Escape hatch for exact-type capability checks.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A joint simulated state over an ordered set of qids, together with the
/// log of measurement results produced so far.
///
/// The position of a qid in [`SimulationState::qids`] is the axis the
/// representation uses for it. The whole object is one entangled state, so
/// looking up any member qid gives back the container itself.
///
/// A state is mutated in place. Use [`SimulationState::copy`] to branch,
/// e.g. one copy per repetition; copies share nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState<R> {
    qids: Vec<Qid>,
    log: MeasurementLog,
    repr: R,
}

impl<R: Representation> SimulationState<R> {
    /// Create a state over `qids` backed by `repr`.
    pub fn new(qids: impl IntoIterator<Item = Qid>, repr: R) -> StateResult<Self> {
        Self::with_log(qids, repr, MeasurementLog::new())
    }

    /// Create a state that continues an existing measurement log.
    pub fn with_log(
        qids: impl IntoIterator<Item = Qid>,
        repr: R,
        log: MeasurementLog,
    ) -> StateResult<Self> {
        let qids: Vec<Qid> = qids.into_iter().collect();
        for (i, qid) in qids.iter().enumerate() {
            if qids[..i].contains(qid) {
                return Err(StateError::DuplicateQid { qid: *qid });
            }
        }
        Ok(Self { qids, log, repr })
    }

    /// Qids in axis order.
    pub fn qids(&self) -> &[Qid] {
        &self.qids
    }

    /// Measurement results recorded so far.
    pub fn log(&self) -> &MeasurementLog {
        &self.log
    }

    /// Consume the state, keeping only its measurement log.
    pub fn into_log(self) -> MeasurementLog {
        self.log
    }

    /// The concrete representation.
    pub fn representation(&self) -> &R {
        &self.repr
    }

    /// Mutable access to the concrete representation.
    pub fn representation_mut(&mut self) -> &mut R {
        &mut self.repr
    }

    /// Axis of `qid`.
    pub fn index_of(&self, qid: &Qid) -> StateResult<usize> {
        self.qids
            .iter()
            .position(|q| q == qid)
            .ok_or(StateError::QidNotFound { qid: *qid })
    }

    /// Whether `qid` belongs to this state.
    pub fn contains(&self, qid: &Qid) -> bool {
        self.qids.contains(qid)
    }

    /// The sub-state `qid` belongs to, which is always this state.
    pub fn get(&self, qid: &Qid) -> StateResult<&Self> {
        if self.contains(qid) {
            Ok(self)
        } else {
            Err(StateError::QidNotFound { qid: *qid })
        }
    }

    /// Number of qids.
    pub fn len(&self) -> usize {
        self.qids.len()
    }

    /// Whether the state has no qids.
    pub fn is_empty(&self) -> bool {
        self.qids.is_empty()
    }

    /// Iterate the qids in axis order.
    pub fn iter(&self) -> std::slice::Iter<'_, Qid> {
        self.qids.iter()
    }

    fn axes(&self, qids: &[Qid]) -> StateResult<(Vec<usize>, Vec<usize>)> {
        let axes = qids
            .iter()
            .map(|q| self.index_of(q))
            .collect::<StateResult<Vec<_>>>()?;
        let dims = qids.iter().map(|q| q.dimension() as usize).collect();
        Ok((axes, dims))
    }

    /// Exchange the roles of two member qids.
    ///
    /// No amplitude data moves; `a` takes over `b`'s axis and vice versa.
    /// Fails before touching anything if the dimensions differ.
    pub fn swap(&mut self, a: &Qid, b: &Qid) -> StateResult<()> {
        if a.dimension() != b.dimension() {
            return Err(StateError::DimensionMismatch {
                operation: "swap",
                a: *a,
                b: *b,
            });
        }
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        self.qids.swap(i, j);
        Ok(())
    }

    /// Replace `from` by `to` on the same axis.
    pub fn rename(&mut self, from: &Qid, to: &Qid) -> StateResult<()> {
        if from.dimension() != to.dimension() {
            return Err(StateError::DimensionMismatch {
                operation: "rename to",
                a: *from,
                b: *to,
            });
        }
        let i = self.index_of(from)?;
        if from == to {
            return Ok(());
        }
        if self.contains(to) {
            return Err(StateError::DuplicateQid { qid: *to });
        }
        self.qids[i] = *to;
        Ok(())
    }

    /// Projectively measure `qids` and store the results under `key`.
    ///
    /// Result `i` is XORed with 1 where `invert_mask[i]` is set. Mask
    /// entries past the last result are ignored and results past the end of
    /// the mask are stored as measured. A key that was already used is
    /// overwritten.
    pub fn measure(
        &mut self,
        qids: &[Qid],
        key: MeasurementKey,
        invert_mask: &[bool],
    ) -> StateResult<()> {
        let (axes, dims) = self.axes(qids)?;
        let mut bits = self.repr.perform_measurement(&axes, &dims)?;
        for (bit, &invert) in bits.iter_mut().zip(invert_mask) {
            if invert {
                *bit ^= 1;
            }
        }
        if self.log.contains(key.as_str()) {
            debug!(%key, "Overwriting earlier measurement results");
        }
        self.log.record(key, bits);
        Ok(())
    }

    /// Sample `qids` without collapsing the state.
    pub fn sample(&mut self, qids: &[Qid], repetitions: usize) -> StateResult<Vec<Vec<i64>>> {
        let (axes, dims) = self.axes(qids)?;
        self.repr.sample(&axes, &dims, repetitions)
    }

    /// Apply `op` to `qids` with the default strategies.
    ///
    /// When decomposition is allowed and a sub-operation fails, the ones
    /// before it stay applied. Copy the state first if that matters.
    pub fn act_on(
        &mut self,
        op: &dyn Operation,
        qids: &[Qid],
        allow_decompose: bool,
    ) -> StateResult<()> {
        crate::dispatch::act_on(op, self, qids, allow_decompose)
    }

    /// Apply `op` to `qids` through a custom dispatcher.
    pub fn act_on_with(
        &mut self,
        dispatcher: &ActOnDispatcher,
        op: &dyn Operation,
        qids: &[Qid],
        allow_decompose: bool,
    ) -> StateResult<()> {
        dispatcher.act_on(op, self, qids, allow_decompose)
    }

    /// Apply `op` to its own qids, allowing decomposition.
    pub fn apply_operation(&mut self, op: &dyn Operation) -> StateResult<()> {
        self.act_on(op, op.qids(), true)
    }

    /// Independent deep copy.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Reseed the representation's random source.
    pub fn reseed(&mut self, seed: u64) {
        self.repr.reseed(seed);
    }
}

impl<R: Representation> ActOnTarget for SimulationState<R> {
    fn qids(&self) -> &[Qid] {
        &self.qids
    }

    fn index_of(&self, qid: &Qid) -> StateResult<usize> {
        SimulationState::index_of(self, qid)
    }

    fn measure(
        &mut self,
        qids: &[Qid],
        key: MeasurementKey,
        invert_mask: &[bool],
    ) -> StateResult<()> {
        SimulationState::measure(self, qids, key, invert_mask)
    }

    fn apply_matrix(&mut self, matrix: &Array2<Complex64>, qids: &[Qid]) -> StateResult<bool> {
        let (axes, dims) = self.axes(qids)?;
        self.repr.apply_matrix(matrix, &axes, &dims)
    }

    fn representation_name(&self) -> &'static str {
        R::NAME
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<R: Representation> Index<&Qid> for SimulationState<R> {
    type Output = Self;

    /// # Panics
    ///
    /// Panics if `qid` is not part of the state. Use
    /// [`SimulationState::get`] for a fallible lookup.
    fn index(&self, qid: &Qid) -> &Self {
        match self.get(qid) {
            Ok(state) => state,
            Err(e) => panic!("{e}"),
        }
    }
}

impl<'a, R> IntoIterator for &'a SimulationState<R> {
    type Item = &'a Qid;
    type IntoIter = std::slice::Iter<'a, Qid>;

    fn into_iter(self) -> Self::IntoIter {
        self.qids.iter()
    }
}
