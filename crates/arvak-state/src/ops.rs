//! Concrete operations: gates, measurements and nested sub-circuits.

use std::collections::HashMap;

use ndarray::Array2;
use num_complex::Complex64;

use arvak_ir::{IrError, MEASUREMENT_KEY_SEPARATOR, MeasurementKey, Qid, StandardGate};

use crate::error::{StateError, StateResult};
use crate::operation::Operation;
use crate::state::{ActOnTarget, SimulationState};
use crate::statevector::StateVector;

fn check_distinct(qids: &[Qid]) -> StateResult<()> {
    for (i, qid) in qids.iter().enumerate() {
        if qids[..i].contains(qid) {
            return Err(StateError::DuplicateQid { qid: *qid });
        }
    }
    Ok(())
}

// =============================================================================
// Gates
// =============================================================================

/// A [`StandardGate`] applied to specific qubits.
#[derive(Debug, Clone, PartialEq)]
pub struct GateOperation {
    gate: StandardGate,
    qids: Vec<Qid>,
}

impl GateOperation {
    /// Apply `gate` to `qids`.
    ///
    /// The operand count must match the gate and every operand must be a
    /// qubit.
    pub fn new(gate: StandardGate, qids: impl IntoIterator<Item = Qid>) -> StateResult<Self> {
        let qids: Vec<Qid> = qids.into_iter().collect();
        if qids.len() != gate.num_qubits() {
            return Err(StateError::OperandCount {
                operation: gate.name().to_string(),
                expected: gate.num_qubits(),
                got: qids.len(),
            });
        }
        check_qubits(gate, &qids)?;
        check_distinct(&qids)?;
        Ok(Self { gate, qids })
    }

    /// The gate.
    pub fn gate(&self) -> StandardGate {
        self.gate
    }

    /// Fast path for the qubit kernels of [`StateVector`].
    fn apply_kernel(
        &self,
        state: &mut SimulationState<StateVector>,
        qids: &[Qid],
    ) -> StateResult<bool> {
        let axes = qids
            .iter()
            .map(|q| state.index_of(q))
            .collect::<StateResult<Vec<_>>>()?;
        let sv = state.representation_mut();
        match self.gate {
            StandardGate::I => {}
            StandardGate::X => sv.apply_x(axes[0]),
            StandardGate::Z => sv.apply_z(axes[0]),
            StandardGate::H => sv.apply_h(axes[0]),
            StandardGate::CX => sv.apply_cx(axes[0], axes[1]),
            StandardGate::CZ => sv.apply_cz(axes[0], axes[1]),
            StandardGate::Swap => sv.apply_swap(axes[0], axes[1]),
            _ => return Ok(false),
        }
        Ok(true)
    }
}

fn check_qubits(gate: StandardGate, qids: &[Qid]) -> StateResult<()> {
    match qids.iter().find(|q| !q.is_qubit()) {
        Some(qid) => Err(StateError::GateDimension {
            gate: gate.name().to_string(),
            qid: *qid,
        }),
        None => Ok(()),
    }
}

impl Operation for GateOperation {
    fn name(&self) -> &str {
        self.gate.name()
    }

    fn qids(&self) -> &[Qid] {
        &self.qids
    }

    fn act_on(&self, target: &mut dyn ActOnTarget, qids: &[Qid]) -> StateResult<bool> {
        let Some(state) = target
            .as_any_mut()
            .downcast_mut::<SimulationState<StateVector>>()
        else {
            return Ok(false);
        };
        if qids.len() != self.gate.num_qubits() {
            return Err(StateError::OperandCount {
                operation: self.name().to_string(),
                expected: self.gate.num_qubits(),
                got: qids.len(),
            });
        }
        check_qubits(self.gate, qids)?;
        self.apply_kernel(state, qids)
    }

    fn matrix(&self) -> Option<Array2<Complex64>> {
        self.gate.matrix()
    }

    fn decompose(&self, qids: &[Qid]) -> StateResult<Option<Vec<Box<dyn Operation>>>> {
        let Some(parts) = self.gate.decompose(qids) else {
            return Ok(None);
        };
        let ops = parts
            .into_iter()
            .map(|(gate, qids)| {
                GateOperation::new(gate, qids).map(|op| Box::new(op) as Box<dyn Operation>)
            })
            .collect::<StateResult<Vec<_>>>()?;
        Ok(Some(ops))
    }

    fn clone_box(&self) -> Box<dyn Operation> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Measurement
// =============================================================================

/// Projective measurement of one or more qids, logged under a key.
#[derive(Debug, Clone, PartialEq)]
pub struct Measure {
    qids: Vec<Qid>,
    key: MeasurementKey,
    invert_mask: Vec<bool>,
}

impl Measure {
    /// Measure `qids` under `key`.
    pub fn new(qids: impl IntoIterator<Item = Qid>, key: MeasurementKey) -> StateResult<Self> {
        let qids: Vec<Qid> = qids.into_iter().collect();
        check_distinct(&qids)?;
        Ok(Self {
            qids,
            key,
            invert_mask: Vec::new(),
        })
    }

    /// Flip result `i` where `mask[i]` is set.
    #[must_use]
    pub fn with_invert_mask(mut self, mask: impl IntoIterator<Item = bool>) -> Self {
        self.invert_mask = mask.into_iter().collect();
        self
    }

    /// The measurement key.
    pub fn key(&self) -> &MeasurementKey {
        &self.key
    }

    /// The invert mask.
    pub fn invert_mask(&self) -> &[bool] {
        &self.invert_mask
    }
}

impl Operation for Measure {
    fn name(&self) -> &str {
        "measure"
    }

    fn qids(&self) -> &[Qid] {
        &self.qids
    }

    fn act_on(&self, target: &mut dyn ActOnTarget, qids: &[Qid]) -> StateResult<bool> {
        target.measure(qids, self.key.clone(), &self.invert_mask)?;
        Ok(true)
    }

    fn measurement_keys(&self) -> StateResult<Vec<MeasurementKey>> {
        Ok(vec![self.key.clone()])
    }

    fn with_key_path_prefix(&self, component: &str) -> StateResult<Box<dyn Operation>> {
        Ok(Box::new(Self {
            key: self.key.with_path_prefix(component)?,
            ..self.clone()
        }))
    }

    fn with_measurement_key_mapping(
        &self,
        mapping: &HashMap<String, String>,
    ) -> StateResult<Box<dyn Operation>> {
        Ok(Box::new(Self {
            key: self.key.remap_name(mapping)?,
            ..self.clone()
        }))
    }

    fn clone_box(&self) -> Box<dyn Operation> {
        Box::new(self.clone())
    }
}

// =============================================================================
// Sub-circuits
// =============================================================================

/// A nested scope of operations.
///
/// Measurement keys inside the scope are qualified by the scope's path:
/// any enclosing components followed by this scope's own `component`.
/// Applying a sub-circuit decomposes it into its operations with their keys
/// qualified, so nesting flattens naturally through dispatch.
#[derive(Debug, Clone)]
pub struct SubCircuit {
    component: String,
    /// Components of enclosing scopes, outermost first.
    parent_path: Vec<String>,
    ops: Vec<Box<dyn Operation>>,
    qids: Vec<Qid>,
}

fn check_component(component: &str) -> StateResult<()> {
    if component.contains(MEASUREMENT_KEY_SEPARATOR) {
        return Err(IrError::InvalidKey {
            key: component.to_string(),
            reason: format!("'{MEASUREMENT_KEY_SEPARATOR}' is not allowed in a key path component"),
        }
        .into());
    }
    Ok(())
}

impl SubCircuit {
    /// Wrap `ops` in a scope named `component`.
    pub fn new(component: impl Into<String>, ops: Vec<Box<dyn Operation>>) -> StateResult<Self> {
        let component = component.into();
        check_component(&component)?;
        let mut qids: Vec<Qid> = Vec::new();
        for op in &ops {
            for qid in op.qids() {
                if !qids.contains(qid) {
                    qids.push(*qid);
                }
            }
        }
        Ok(Self {
            component,
            parent_path: Vec::new(),
            ops,
            qids,
        })
    }

    /// This scope's own path component.
    pub fn component(&self) -> &str {
        &self.component
    }

    /// Full path of this scope, outermost first.
    pub fn path(&self) -> Vec<&str> {
        self.parent_path
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(self.component.as_str()))
            .collect()
    }

    /// The wrapped operations, keys not yet qualified.
    pub fn operations(&self) -> &[Box<dyn Operation>] {
        &self.ops
    }

    fn qualify(&self, op: &dyn Operation) -> StateResult<Box<dyn Operation>> {
        let mut qualified = op.with_key_path_prefix(&self.component)?;
        for component in self.parent_path.iter().rev() {
            qualified = qualified.with_key_path_prefix(component)?;
        }
        Ok(qualified)
    }
}

impl Operation for SubCircuit {
    fn name(&self) -> &str {
        &self.component
    }

    fn qids(&self) -> &[Qid] {
        &self.qids
    }

    fn decompose(&self, _qids: &[Qid]) -> StateResult<Option<Vec<Box<dyn Operation>>>> {
        let ops = self
            .ops
            .iter()
            .map(|op| self.qualify(op.as_ref()))
            .collect::<StateResult<Vec<_>>>()?;
        Ok(Some(ops))
    }

    fn measurement_keys(&self) -> StateResult<Vec<MeasurementKey>> {
        let mut keys = Vec::new();
        for op in &self.ops {
            for key in op.measurement_keys()? {
                let mut qualified = key.with_path_prefix(self.component.as_str())?;
                for component in self.parent_path.iter().rev() {
                    qualified = qualified.with_path_prefix(component.as_str())?;
                }
                keys.push(qualified);
            }
        }
        Ok(keys)
    }

    fn with_key_path_prefix(&self, component: &str) -> StateResult<Box<dyn Operation>> {
        check_component(component)?;
        let mut scoped = self.clone();
        scoped.parent_path.insert(0, component.to_string());
        Ok(Box::new(scoped))
    }

    fn with_measurement_key_mapping(
        &self,
        mapping: &HashMap<String, String>,
    ) -> StateResult<Box<dyn Operation>> {
        let ops = self
            .ops
            .iter()
            .map(|op| op.with_measurement_key_mapping(mapping))
            .collect::<StateResult<Vec<_>>>()?;
        Ok(Box::new(Self {
            ops,
            ..self.clone()
        }))
    }

    fn clone_box(&self) -> Box<dyn Operation> {
        Box::new(self.clone())
    }
}
