//! Tests for the simulation-state container: addressing, measurement
//! logging and qid bookkeeping.

use arvak_ir::{MeasurementKey, Qid};
use arvak_state::{MeasurementLog, Representation, SimulationState, StateError, StateResult};

/// Representation that reports canned measurement results.
#[derive(Debug, Clone, PartialEq)]
struct Canned {
    results: Vec<i64>,
}

impl Representation for Canned {
    const NAME: &'static str = "canned";

    fn perform_measurement(&mut self, axes: &[usize], _dims: &[usize]) -> StateResult<Vec<i64>> {
        Ok(self.results.iter().copied().take(axes.len()).collect())
    }

    fn sample(
        &mut self,
        axes: &[usize],
        dims: &[usize],
        repetitions: usize,
    ) -> StateResult<Vec<Vec<i64>>> {
        (0..repetitions)
            .map(|_| self.perform_measurement(axes, dims))
            .collect()
    }
}

fn canned(qids: &[Qid], results: &[i64]) -> SimulationState<Canned> {
    SimulationState::new(
        qids.iter().copied(),
        Canned {
            results: results.to_vec(),
        },
    )
    .unwrap()
}

fn key(name: &str) -> MeasurementKey {
    MeasurementKey::new(name).unwrap()
}

// ---------------------------------------------------------------------------
// Addressing
// ---------------------------------------------------------------------------

#[test]
fn iterates_in_axis_order() {
    let qids = vec![Qid::qubit(3), Qid::qubit(1), Qid::qubit(2)];
    let state = canned(&qids, &[]);

    let seen: Vec<Qid> = state.iter().copied().collect();
    assert_eq!(seen, qids);
    let seen: Vec<&Qid> = (&state).into_iter().collect();
    assert_eq!(seen.len(), 3);
    assert_eq!(state.len(), 3);
    assert!(!state.is_empty());
}

#[test]
fn member_lookup_returns_whole_state() {
    let qids = Qid::qubit_range(2);
    let state = canned(&qids, &[]);

    let found = state.get(&qids[1]).unwrap();
    assert!(std::ptr::eq(found, &state));
    assert!(std::ptr::eq(&state[&qids[0]], &state));
    assert_eq!(state.index_of(&qids[1]).unwrap(), 1);
}

#[test]
fn non_member_lookup_fails() {
    let state = canned(&Qid::qubit_range(2), &[]);
    let stranger = Qid::qubit(7);

    assert_eq!(
        state.get(&stranger).unwrap_err(),
        StateError::QidNotFound { qid: stranger }
    );
    assert!(!state.contains(&stranger));
}

#[test]
#[should_panic(expected = "not part of this simulation state")]
fn non_member_index_panics() {
    let state = canned(&Qid::qubit_range(1), &[]);
    let _ = &state[&Qid::qubit(9)];
}

#[test]
fn duplicate_qids_rejected() {
    let q = Qid::qubit(0);
    let result = SimulationState::new([q, q], Canned { results: vec![] });
    assert_eq!(result.unwrap_err(), StateError::DuplicateQid { qid: q });
}

#[test]
fn empty_state() {
    let state = canned(&[], &[]);
    assert!(state.is_empty());
    assert_eq!(state.iter().count(), 0);
}

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

#[test]
fn measure_records_raw_results() {
    let q = Qid::qubit(0);
    let mut state = canned(&[q], &[5]);

    state.measure(&[q], key("k"), &[false]).unwrap();
    assert_eq!(state.log().get("k"), Some(&[5][..]));
}

#[test]
fn measure_applies_invert_mask() {
    let qids = Qid::qubit_range(3);
    let mut state = canned(&qids, &[0, 1, 1]);

    state.measure(&qids, key("k"), &[true, true]).unwrap();
    assert_eq!(state.log().get("k"), Some(&[1, 0, 1][..]));
}

#[test]
fn invert_mask_longer_than_results_is_ignored() {
    let q = Qid::qubit(0);
    let mut state = canned(&[q], &[5]);

    state.measure(&[q], key("k"), &[true, true, true]).unwrap();
    assert_eq!(state.log().get("k"), Some(&[4][..]));
}

#[test]
fn measure_unknown_qid_leaves_log_untouched() {
    let mut state = canned(&Qid::qubit_range(1), &[1]);
    let result = state.measure(&[Qid::qubit(4)], key("k"), &[]);

    assert!(matches!(result, Err(StateError::QidNotFound { .. })));
    assert!(state.log().is_empty());
}

#[test]
fn reused_key_is_overwritten() {
    let q = Qid::qubit(0);
    let mut state = canned(&[q], &[1]);
    state.measure(&[q], key("k"), &[]).unwrap();
    state.measure(&[q], key("k"), &[true]).unwrap();

    assert_eq!(state.log().len(), 1);
    assert_eq!(state.log().get("k"), Some(&[0][..]));
}

#[test]
fn nested_key_is_logged_under_canonical_form() {
    let q = Qid::qubit(0);
    let mut state = canned(&[q], &[1]);
    let nested = MeasurementKey::with_path("m", ["outer", "inner"]).unwrap();
    state.measure(&[q], nested, &[]).unwrap();

    assert!(state.log().contains("outer:inner:m"));
    assert!(!state.log().contains("m"));
}

#[test]
fn continues_existing_log() {
    let mut log = MeasurementLog::new();
    log.record(key("earlier"), vec![1]);
    let state =
        SimulationState::with_log(Qid::qubit_range(1), Canned { results: vec![] }, log).unwrap();

    assert_eq!(state.log().get("earlier"), Some(&[1][..]));
}

#[test]
fn sample_does_not_log() {
    let q = Qid::qubit(0);
    let mut state = canned(&[q], &[1]);
    let samples = state.sample(&[q], 3).unwrap();

    assert_eq!(samples, vec![vec![1], vec![1], vec![1]]);
    assert!(state.log().is_empty());
}

// ---------------------------------------------------------------------------
// Swap and rename
// ---------------------------------------------------------------------------

#[test]
fn swap_exchanges_axes() {
    let qids = Qid::qubit_range(2);
    let mut state = canned(&qids, &[]);
    state.swap(&qids[0], &qids[1]).unwrap();

    assert_eq!(state.qids(), &[qids[1], qids[0]]);
    assert_eq!(state.index_of(&qids[0]).unwrap(), 1);
}

#[test]
fn swap_different_dimensions_fails_without_mutation() {
    let qubit = Qid::qubit(0);
    let qutrit = Qid::qudit(1, 3).unwrap();
    let mut state = canned(&[qubit, qutrit], &[]);
    let before = state.copy();

    let err = state.swap(&qubit, &qutrit).unwrap_err();
    assert!(matches!(err, StateError::DimensionMismatch { .. }));
    assert!(err.to_string().starts_with("Cannot swap different dimensions"));
    assert_eq!(state, before);
}

#[test]
fn rename_replaces_qid_in_place() {
    let qids = Qid::qubit_range(2);
    let mut state = canned(&qids, &[]);
    let fresh = Qid::qubit(9);
    state.rename(&qids[0], &fresh).unwrap();

    assert_eq!(state.qids(), &[fresh, qids[1]]);
    assert!(!state.contains(&qids[0]));
}

#[test]
fn rename_different_dimensions_fails_without_mutation() {
    let qubit = Qid::qubit(0);
    let qutrit = Qid::qudit(1, 3).unwrap();
    let mut state = canned(&[qubit], &[]);
    let before = state.copy();

    let err = state.rename(&qubit, &qutrit).unwrap_err();
    assert!(
        err.to_string()
            .starts_with("Cannot rename to different dimensions")
    );
    assert_eq!(state, before);
}

#[test]
fn rename_onto_existing_member_fails() {
    let qids = Qid::qubit_range(2);
    let mut state = canned(&qids, &[]);

    assert_eq!(
        state.rename(&qids[0], &qids[1]).unwrap_err(),
        StateError::DuplicateQid { qid: qids[1] }
    );
}

#[test]
fn copy_is_independent() {
    let q = Qid::qubit(0);
    let original = canned(&[q], &[1]);
    let mut branch = original.copy();
    branch.measure(&[q], key("k"), &[]).unwrap();

    assert!(original.log().is_empty());
    assert_eq!(branch.log().len(), 1);
}
