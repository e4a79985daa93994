//! Arvak Circuit Intermediate Representation
//!
//! This crate provides the value types that circuit simulation builds on.
//!
//! # Core Components
//!
//! - **Sites**: [`Qid`] addresses a qubit or qudit with a fixed dimension
//! - **Measurement keys**: [`MeasurementKey`] identifies measurement results,
//!   qualified by the path of enclosing sub-circuits
//! - **Gates**: [`StandardGate`] with matrices and standard decompositions
//!
//! # Example: Qualifying a Key Inside Nested Scopes
//!
//! ```rust
//! use arvak_ir::MeasurementKey;
//!
//! // Flattening walks inside-out: the innermost scope prefixes first.
//! let key = MeasurementKey::new("m")?
//!     .with_path_prefix("inner")?
//!     .with_path_prefix("outer")?;
//!
//! assert_eq!(key.to_string(), "outer:inner:m");
//! assert_eq!(MeasurementKey::parse_serialized("outer:inner:m")?, key);
//! # Ok::<(), arvak_ir::IrError>(())
//! ```
//!
//! # Supported Gates
//!
//! | Gate | Qubits | Description |
//! |------|--------|-------------|
//! | `I`, `X`, `Y`, `Z` | 1 | Identity and Pauli gates |
//! | `H` | 1 | Hadamard gate |
//! | `S`, `Sdg`, `T`, `Tdg` | 1 | Phase gates |
//! | `Rx`, `Ry`, `Rz` | 1 | Rotation gates |
//! | `CX`, `CZ` | 2 | Controlled-NOT and Controlled-Z |
//! | `Swap` | 2 | SWAP gate |
//! | `CCX` | 3 | Toffoli gate (decomposition only) |

pub mod error;
pub mod gate;
pub mod measurement_key;
pub mod qubit;

pub use error::{IrError, IrResult};
pub use gate::StandardGate;
pub use measurement_key::{MEASUREMENT_KEY_SEPARATOR, MeasurementKey};
pub use qubit::{QUBIT_DIMENSION, Qid};
