//! Tests for layered act-on dispatch.

use std::collections::HashMap;

use arvak_ir::{MeasurementKey, Qid, StandardGate};
use arvak_state::{
    ActOnDispatcher, ActOnTarget, ApplyMatrix, GateOperation, Measure, Operation,
    Representation, SimulationState, StateError, StateResult, SubCircuit,
};
use ndarray::Array2;
use num_complex::Complex64;

/// Representation that records every matrix it is handed.
#[derive(Debug, Clone, Default, PartialEq)]
struct Recorder {
    applied: Vec<(usize, Vec<usize>)>,
    accept_matrices: bool,
}

impl Representation for Recorder {
    const NAME: &'static str = "recorder";

    fn perform_measurement(&mut self, axes: &[usize], _dims: &[usize]) -> StateResult<Vec<i64>> {
        Ok(vec![1; axes.len()])
    }

    fn sample(
        &mut self,
        axes: &[usize],
        _dims: &[usize],
        repetitions: usize,
    ) -> StateResult<Vec<Vec<i64>>> {
        Ok(vec![vec![1; axes.len()]; repetitions])
    }

    fn apply_matrix(
        &mut self,
        matrix: &Array2<Complex64>,
        axes: &[usize],
        _dims: &[usize],
    ) -> StateResult<bool> {
        if !self.accept_matrices {
            return Ok(false);
        }
        self.applied.push((matrix.nrows(), axes.to_vec()));
        Ok(true)
    }
}

fn recorder(qids: &[Qid]) -> SimulationState<Recorder> {
    SimulationState::new(
        qids.iter().copied(),
        Recorder {
            applied: vec![],
            accept_matrices: true,
        },
    )
    .unwrap()
}

/// Operation with no hooks except a fixed decomposition.
#[derive(Debug, Clone)]
struct Composite {
    qids: Vec<Qid>,
    parts: Vec<Box<dyn Operation>>,
}

impl Operation for Composite {
    fn name(&self) -> &str {
        "composite"
    }

    fn qids(&self) -> &[Qid] {
        &self.qids
    }

    fn decompose(&self, _qids: &[Qid]) -> StateResult<Option<Vec<Box<dyn Operation>>>> {
        Ok(Some(self.parts.clone()))
    }

    fn clone_box(&self) -> Box<dyn Operation> {
        Box::new(self.clone())
    }
}

/// Operation nothing can simulate.
#[derive(Debug, Clone)]
struct Opaque {
    qids: Vec<Qid>,
}

impl Operation for Opaque {
    fn name(&self) -> &str {
        "opaque"
    }

    fn qids(&self) -> &[Qid] {
        &self.qids
    }

    fn clone_box(&self) -> Box<dyn Operation> {
        Box::new(self.clone())
    }
}

/// Operation that handles itself by logging through the target.
#[derive(Debug, Clone)]
struct SelfLogging {
    qids: Vec<Qid>,
}

impl Operation for SelfLogging {
    fn name(&self) -> &str {
        "self_logging"
    }

    fn qids(&self) -> &[Qid] {
        &self.qids
    }

    fn act_on(&self, target: &mut dyn ActOnTarget, qids: &[Qid]) -> StateResult<bool> {
        target.measure(qids, MeasurementKey::new("direct")?, &[])?;
        Ok(true)
    }

    fn matrix(&self) -> Option<Array2<Complex64>> {
        StandardGate::X.matrix()
    }

    fn clone_box(&self) -> Box<dyn Operation> {
        Box::new(self.clone())
    }
}

fn x(q: Qid) -> Box<dyn Operation> {
    Box::new(GateOperation::new(StandardGate::X, [q]).unwrap())
}

// ---------------------------------------------------------------------------
// Strategy order
// ---------------------------------------------------------------------------

#[test]
fn direct_hook_wins_over_matrix() {
    let q = Qid::qubit(0);
    let mut state = recorder(&[q]);
    state.act_on(&SelfLogging { qids: vec![q] }, &[q], false).unwrap();

    assert!(state.log().contains("direct"));
    assert!(state.representation().applied.is_empty());
}

#[test]
fn matrix_used_when_no_direct_hook() {
    let qids = Qid::qubit_range(2);
    let mut state = recorder(&qids);
    let cx = GateOperation::new(StandardGate::CX, [qids[1], qids[0]]).unwrap();
    state.act_on(&cx, cx.qids(), false).unwrap();

    assert_eq!(state.representation().applied, vec![(4, vec![1, 0])]);
}

#[test]
fn composite_decomposes_when_allowed() {
    let q = Qid::qubit(0);
    let mut state = recorder(&[q]);
    let op = Composite {
        qids: vec![q],
        parts: vec![x(q)],
    };

    state.act_on(&op, &[q], true).unwrap();
    assert_eq!(state.representation().applied, vec![(2, vec![0])]);
}

#[test]
fn composite_unsupported_without_decomposition() {
    let q = Qid::qubit(0);
    let mut state = recorder(&[q]);
    let op = Composite {
        qids: vec![q],
        parts: vec![x(q)],
    };

    let err = state.act_on(&op, &[q], false).unwrap_err();
    assert_eq!(
        err,
        StateError::UnsupportedOperation {
            operation: "composite".to_string(),
            representation: "recorder".to_string(),
        }
    );
    assert!(state.representation().applied.is_empty());
}

#[test]
fn opaque_operation_is_unsupported() {
    let q = Qid::qubit(0);
    let mut state = recorder(&[q]);

    let err = state.apply_operation(&Opaque { qids: vec![q] }).unwrap_err();
    assert!(matches!(err, StateError::UnsupportedOperation { .. }));
    assert!(
        err.to_string()
            .contains("Can't simulate operation 'opaque'")
    );
}

#[test]
fn representation_without_matrices_falls_through() {
    let q = Qid::qubit(0);
    let mut state = SimulationState::new([q], Recorder::default()).unwrap();
    let err = state.act_on(x(q).as_ref(), &[q], true).unwrap_err();

    assert!(matches!(err, StateError::UnsupportedOperation { .. }));
}

#[test]
fn empty_dispatcher_supports_nothing() {
    let q = Qid::qubit(0);
    let mut state = recorder(&[q]);
    let result = state.act_on_with(&ActOnDispatcher::empty(), x(q).as_ref(), &[q], true);

    assert!(matches!(
        result,
        Err(StateError::UnsupportedOperation { .. })
    ));
}

#[test]
fn custom_dispatcher_skips_direct_hooks() {
    let q = Qid::qubit(0);
    let mut state = recorder(&[q]);
    let matrix_only = ActOnDispatcher::empty().with_strategy(ApplyMatrix);
    state
        .act_on_with(&matrix_only, &SelfLogging { qids: vec![q] }, &[q], false)
        .unwrap();

    assert!(state.log().is_empty());
    assert_eq!(state.representation().applied.len(), 1);
}

// ---------------------------------------------------------------------------
// Decomposition
// ---------------------------------------------------------------------------

#[test]
fn failed_decomposition_keeps_earlier_parts() {
    let q = Qid::qubit(0);
    let mut state = recorder(&[q]);
    let op = Composite {
        qids: vec![q],
        parts: vec![x(q), Box::new(Opaque { qids: vec![q] }), x(q)],
    };

    let err = state.act_on(&op, &[q], true).unwrap_err();
    assert_eq!(
        err,
        StateError::UnsupportedOperation {
            operation: "opaque".to_string(),
            representation: "recorder".to_string(),
        }
    );
    assert_eq!(state.representation().applied.len(), 1);
}

#[test]
fn decomposition_must_stay_on_targets() {
    let qids = Qid::qubit_range(2);
    let mut state = recorder(&qids);
    let op = Composite {
        qids: vec![qids[0]],
        parts: vec![x(qids[1])],
    };

    let err = state.act_on(&op, &[qids[0]], true).unwrap_err();
    assert_eq!(
        err,
        StateError::DecompositionEscapesTargets {
            operation: "composite".to_string(),
            qid: qids[1],
        }
    );
    assert!(state.representation().applied.is_empty());
}

#[test]
fn nested_composites_recurse() {
    let q = Qid::qubit(0);
    let mut state = recorder(&[q]);
    let inner: Box<dyn Operation> = Box::new(Composite {
        qids: vec![q],
        parts: vec![x(q), x(q)],
    });
    let outer = Composite {
        qids: vec![q],
        parts: vec![inner, x(q)],
    };

    state.apply_operation(&outer).unwrap();
    assert_eq!(state.representation().applied.len(), 3);
}

#[test]
fn toffoli_runs_through_decomposition() {
    let qids = Qid::qubit_range(3);
    let mut state = recorder(&qids);
    let ccx = GateOperation::new(StandardGate::CCX, qids.clone()).unwrap();

    assert!(ccx.matrix().is_none());
    assert!(state.act_on(&ccx, &qids, false).is_err());
    state.act_on(&ccx, &qids, true).unwrap();
    assert!(!state.representation().applied.is_empty());
}

// ---------------------------------------------------------------------------
// Sub-circuits
// ---------------------------------------------------------------------------

#[test]
fn sub_circuits_qualify_logged_keys() {
    let qids = Qid::qubit_range(2);
    let mut state = recorder(&qids);

    let m: Box<dyn Operation> =
        Box::new(Measure::new([qids[0]], MeasurementKey::new("m").unwrap()).unwrap());
    let top: Box<dyn Operation> =
        Box::new(Measure::new([qids[1]], MeasurementKey::new("m").unwrap()).unwrap());
    let inner: Box<dyn Operation> = Box::new(SubCircuit::new("inner", vec![m]).unwrap());
    let outer = SubCircuit::new("outer", vec![inner, top]).unwrap();

    state.apply_operation(&outer).unwrap();

    let keys: Vec<String> = state.log().keys().iter().map(|k| k.to_string()).collect();
    assert_eq!(keys, vec!["outer:inner:m", "outer:m"]);
}

#[test]
fn sub_circuit_needs_decomposition() {
    let q = Qid::qubit(0);
    let mut state = recorder(&[q]);
    let m: Box<dyn Operation> =
        Box::new(Measure::new([q], MeasurementKey::new("m").unwrap()).unwrap());
    let sub = SubCircuit::new("scope", vec![m]).unwrap();

    assert!(state.act_on(&sub, sub.qids(), false).is_err());
    assert!(state.log().is_empty());
}

#[test]
fn key_mapping_applies_inside_sub_circuit() {
    let q = Qid::qubit(0);
    let mut state = recorder(&[q]);
    let m: Box<dyn Operation> =
        Box::new(Measure::new([q], MeasurementKey::new("m").unwrap()).unwrap());
    let sub = SubCircuit::new("scope", vec![m]).unwrap();

    let mapping: HashMap<String, String> =
        [("m".to_string(), "renamed".to_string())].into_iter().collect();
    let remapped = sub.with_measurement_key_mapping(&mapping).unwrap();
    state.apply_operation(remapped.as_ref()).unwrap();

    assert!(state.log().contains("scope:renamed"));
}
