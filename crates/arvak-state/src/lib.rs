//! Arvak Simulation State
//!
//! This crate holds the state a circuit simulator evolves: a joint quantum
//! state over an ordered set of qids, plus the log of measurement results
//! recorded so far. Operations are applied through a layered dispatcher.
//!
//! # Architecture
//!
//! ```text
//! Operation
//!     │
//!     ▼
//! ┌────────────────┐
//! │ ActOnDispatcher │
//! └────────────────┘
//!     │
//!     ├── DirectActOn   (operation drives the state itself)
//!     ├── ApplyMatrix   (dense unitary through the representation)
//!     └── Decompose     (sub-operations, dispatched recursively)
//!     │
//!     ▼
//! SimulationState<R: Representation>  ──►  MeasurementLog
//! ```
//!
//! # Example: Bell Pair
//!
//! ```rust
//! use arvak_ir::{MeasurementKey, Qid, StandardGate};
//! use arvak_state::{GateOperation, Measure, SimulationState, StateVector};
//!
//! let qids = Qid::qubit_range(2);
//! let repr = StateVector::for_qids(&qids).with_seed(7);
//! let mut state = SimulationState::new(qids.clone(), repr)?;
//!
//! state.apply_operation(&GateOperation::new(StandardGate::H, [qids[0]])?)?;
//! state.apply_operation(&GateOperation::new(StandardGate::CX, [qids[0], qids[1]])?)?;
//! state.apply_operation(&Measure::new(qids.clone(), MeasurementKey::new("bell")?)?)?;
//!
//! let bits = state.log().get("bell").unwrap();
//! assert_eq!(bits[0], bits[1]);
//! # Ok::<(), arvak_state::StateError>(())
//! ```

pub mod dispatch;
pub mod error;
pub mod log;
pub mod operation;
pub mod ops;
pub mod representation;
pub mod simulator;
pub mod state;
pub mod statevector;

pub use dispatch::{
    ActOnDispatcher, ActOnStrategy, Applied, ApplyMatrix, Decompose, DirectActOn, act_on,
};
pub use error::{StateError, StateResult};
pub use log::MeasurementLog;
pub use operation::Operation;
pub use ops::{GateOperation, Measure, SubCircuit};
pub use representation::Representation;
pub use simulator::{RunResult, Simulator, SimulatorConfig};
pub use state::{ActOnTarget, SimulationState};
pub use statevector::StateVector;
