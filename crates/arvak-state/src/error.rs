//! Error types for the simulation-state crate.

use arvak_ir::{IrError, Qid};
use thiserror::Error;

/// Errors produced while driving a simulation state.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum StateError {
    /// Two qids of different dimension were asked to trade places.
    #[error("Cannot {operation} different dimensions: {a} and {b}")]
    DimensionMismatch {
        /// `"swap"` or `"rename to"`.
        operation: &'static str,
        /// First qid.
        a: Qid,
        /// Second qid.
        b: Qid,
    },

    /// Qid is not part of this state.
    #[error("Qid {qid} is not part of this simulation state")]
    QidNotFound {
        /// The qid that was looked up.
        qid: Qid,
    },

    /// Qid would appear twice in the state.
    #[error("Duplicate qid {qid} in simulation state")]
    DuplicateQid {
        /// The repeated qid.
        qid: Qid,
    },

    /// No act-on strategy could apply the operation.
    #[error("Can't simulate operation '{operation}' on representation '{representation}'")]
    UnsupportedOperation {
        /// Name of the operation.
        operation: String,
        /// Name of the state representation.
        representation: String,
    },

    /// A decomposition produced a sub-operation outside the parent's targets.
    #[error("Decomposition of '{operation}' acts on {qid}, which is not one of its targets")]
    DecompositionEscapesTargets {
        /// Name of the decomposed operation.
        operation: String,
        /// The out-of-range qid.
        qid: Qid,
    },

    /// Operation was given the wrong number of qids.
    #[error("Operation '{operation}' acts on {expected} qids, got {got}")]
    OperandCount {
        /// Name of the operation.
        operation: String,
        /// Required number of qids.
        expected: usize,
        /// Number supplied.
        got: usize,
    },

    /// A qubit gate was applied to a site that is not a qubit.
    #[error("Gate '{gate}' acts on qubits but {qid} is not a qubit")]
    GateDimension {
        /// Gate name.
        gate: String,
        /// The offending qid.
        qid: Qid,
    },

    /// Failure reported by a concrete state representation.
    #[error("Representation error: {0}")]
    Representation(String),

    /// IR value construction failed.
    #[error("IR error: {0}")]
    Ir(#[from] IrError),
}

/// Result type for simulation-state operations.
pub type StateResult<T> = Result<T, StateError>;
