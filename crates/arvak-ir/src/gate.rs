//! Quantum gate types.
//!
//! Gates know their matrix (for one- and two-qubit gates) and, where a
//! standard network exists, how to decompose into simpler gates. Matrices
//! use little-endian basis ordering over the gate's operands: operand `k`
//! contributes bit `k` of the row/column index.

use ndarray::{Array2, array};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_1_SQRT_2;

use crate::qubit::Qid;

/// Standard gates with known semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StandardGate {
    // Single-qubit Pauli gates
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,

    // Single-qubit Clifford gates
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,

    // Single-qubit rotation gates
    /// Rotation around X axis.
    Rx(f64),
    /// Rotation around Y axis.
    Ry(f64),
    /// Rotation around Z axis.
    Rz(f64),

    // Two-qubit gates
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Z gate.
    CZ,
    /// SWAP gate.
    Swap,

    // Three-qubit gates
    /// Toffoli gate (CCX).
    CCX,
}

fn c(re: f64, im: f64) -> Complex64 {
    Complex64::new(re, im)
}

impl StandardGate {
    /// Get the name of this gate.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            StandardGate::I => "id",
            StandardGate::X => "x",
            StandardGate::Y => "y",
            StandardGate::Z => "z",
            StandardGate::H => "h",
            StandardGate::S => "s",
            StandardGate::Sdg => "sdg",
            StandardGate::T => "t",
            StandardGate::Tdg => "tdg",
            StandardGate::Rx(_) => "rx",
            StandardGate::Ry(_) => "ry",
            StandardGate::Rz(_) => "rz",
            StandardGate::CX => "cx",
            StandardGate::CZ => "cz",
            StandardGate::Swap => "swap",
            StandardGate::CCX => "ccx",
        }
    }

    /// Get the number of qubits this gate operates on.
    #[inline]
    pub fn num_qubits(&self) -> usize {
        match self {
            StandardGate::I
            | StandardGate::X
            | StandardGate::Y
            | StandardGate::Z
            | StandardGate::H
            | StandardGate::S
            | StandardGate::Sdg
            | StandardGate::T
            | StandardGate::Tdg
            | StandardGate::Rx(_)
            | StandardGate::Ry(_)
            | StandardGate::Rz(_) => 1,

            StandardGate::CX | StandardGate::CZ | StandardGate::Swap => 2,

            StandardGate::CCX => 3,
        }
    }

    /// Unitary matrix of the gate, if it has a dense form.
    ///
    /// Three-qubit gates have no dense form here and are simulated through
    /// [`StandardGate::decompose`].
    pub fn matrix(&self) -> Option<Array2<Complex64>> {
        let zero = c(0.0, 0.0);
        let one = c(1.0, 0.0);
        let m = match *self {
            StandardGate::I => array![[one, zero], [zero, one]],
            StandardGate::X => array![[zero, one], [one, zero]],
            StandardGate::Y => array![[zero, c(0.0, -1.0)], [c(0.0, 1.0), zero]],
            StandardGate::Z => array![[one, zero], [zero, -one]],
            StandardGate::H => {
                let s = c(FRAC_1_SQRT_2, 0.0);
                array![[s, s], [s, -s]]
            }
            StandardGate::S => array![[one, zero], [zero, c(0.0, 1.0)]],
            StandardGate::Sdg => array![[one, zero], [zero, c(0.0, -1.0)]],
            StandardGate::T => array![[one, zero], [zero, c(FRAC_1_SQRT_2, FRAC_1_SQRT_2)]],
            StandardGate::Tdg => array![[one, zero], [zero, c(FRAC_1_SQRT_2, -FRAC_1_SQRT_2)]],
            StandardGate::Rx(theta) => {
                let cos = c((theta / 2.0).cos(), 0.0);
                let neg_i_sin = c(0.0, -(theta / 2.0).sin());
                array![[cos, neg_i_sin], [neg_i_sin, cos]]
            }
            StandardGate::Ry(theta) => {
                let cos = c((theta / 2.0).cos(), 0.0);
                let sin = c((theta / 2.0).sin(), 0.0);
                array![[cos, -sin], [sin, cos]]
            }
            StandardGate::Rz(theta) => array![
                [Complex64::from_polar(1.0, -theta / 2.0), zero],
                [zero, Complex64::from_polar(1.0, theta / 2.0)]
            ],
            // Operand 0 is the control (bit 0), operand 1 the target (bit 1).
            StandardGate::CX => array![
                [one, zero, zero, zero],
                [zero, zero, zero, one],
                [zero, zero, one, zero],
                [zero, one, zero, zero]
            ],
            StandardGate::CZ => array![
                [one, zero, zero, zero],
                [zero, one, zero, zero],
                [zero, zero, one, zero],
                [zero, zero, zero, -one]
            ],
            StandardGate::Swap => array![
                [one, zero, zero, zero],
                [zero, zero, one, zero],
                [zero, one, zero, zero],
                [zero, zero, zero, one]
            ],
            StandardGate::CCX => return None,
        };
        Some(m)
    }

    /// Decompose the gate applied to `qubits` into simpler gates.
    ///
    /// Returns `None` for gates that are already primitive or when the
    /// operand count does not match.
    pub fn decompose(&self, qubits: &[Qid]) -> Option<Vec<(StandardGate, Vec<Qid>)>> {
        if qubits.len() != self.num_qubits() {
            return None;
        }
        let ops = match self {
            StandardGate::CZ => {
                let (a, b) = (qubits[0], qubits[1]);
                vec![
                    (StandardGate::H, vec![b]),
                    (StandardGate::CX, vec![a, b]),
                    (StandardGate::H, vec![b]),
                ]
            }
            StandardGate::Swap => {
                let (a, b) = (qubits[0], qubits[1]);
                vec![
                    (StandardGate::CX, vec![a, b]),
                    (StandardGate::CX, vec![b, a]),
                    (StandardGate::CX, vec![a, b]),
                ]
            }
            StandardGate::CCX => {
                let (a, b, t) = (qubits[0], qubits[1], qubits[2]);
                vec![
                    (StandardGate::H, vec![t]),
                    (StandardGate::CX, vec![b, t]),
                    (StandardGate::Tdg, vec![t]),
                    (StandardGate::CX, vec![a, t]),
                    (StandardGate::T, vec![t]),
                    (StandardGate::CX, vec![b, t]),
                    (StandardGate::Tdg, vec![t]),
                    (StandardGate::CX, vec![a, t]),
                    (StandardGate::T, vec![b]),
                    (StandardGate::T, vec![t]),
                    (StandardGate::H, vec![t]),
                    (StandardGate::CX, vec![a, b]),
                    (StandardGate::T, vec![a]),
                    (StandardGate::Tdg, vec![b]),
                    (StandardGate::CX, vec![a, b]),
                ]
            }
            _ => return None,
        };
        Some(ops)
    }
}
