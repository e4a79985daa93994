//! Layered act-on dispatch.
//!
//! Applying an operation to a state tries an ordered list of strategies and
//! stops at the first one that succeeds:
//!
//! 1. [`DirectActOn`]: the operation acts on the target itself.
//! 2. [`ApplyMatrix`]: the operation's matrix is handed to the representation.
//! 3. [`Decompose`]: the operation is split into sub-operations which are
//!    dispatched recursively.
//!
//! If none applies the result is [`StateError::UnsupportedOperation`].
//!
//! Decomposition is not transactional. When a sub-operation fails, the
//! sub-operations before it have already mutated the state and the failure
//! is returned as is. Callers that need all-or-nothing semantics must copy
//! the state beforehand and discard the copy on error.

use std::fmt;
use std::sync::LazyLock;

use tracing::{debug, trace};

use arvak_ir::Qid;

use crate::error::{StateError, StateResult};
use crate::operation::Operation;
use crate::state::ActOnTarget;

/// Outcome of a single strategy attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The operation has been applied.
    Done,
    /// The strategy does not apply; try the next one.
    NotApplicable,
}

/// One way of applying an operation to a state.
pub trait ActOnStrategy: Send + Sync {
    /// Get the name of this strategy.
    fn name(&self) -> &str;

    /// Try to apply `op` to `qids` of `target`.
    ///
    /// `dispatcher` is the dispatcher running this strategy, for strategies
    /// that need to recurse.
    fn try_apply(
        &self,
        dispatcher: &ActOnDispatcher,
        op: &dyn Operation,
        target: &mut dyn ActOnTarget,
        qids: &[Qid],
        allow_decompose: bool,
    ) -> StateResult<Applied>;
}

/// Delegates to [`Operation::act_on`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectActOn;

impl ActOnStrategy for DirectActOn {
    fn name(&self) -> &'static str {
        "direct"
    }

    fn try_apply(
        &self,
        _dispatcher: &ActOnDispatcher,
        op: &dyn Operation,
        target: &mut dyn ActOnTarget,
        qids: &[Qid],
        _allow_decompose: bool,
    ) -> StateResult<Applied> {
        if op.act_on(target, qids)? {
            Ok(Applied::Done)
        } else {
            Ok(Applied::NotApplicable)
        }
    }
}

/// Applies [`Operation::matrix`] through the representation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApplyMatrix;

impl ActOnStrategy for ApplyMatrix {
    fn name(&self) -> &'static str {
        "matrix"
    }

    fn try_apply(
        &self,
        _dispatcher: &ActOnDispatcher,
        op: &dyn Operation,
        target: &mut dyn ActOnTarget,
        qids: &[Qid],
        _allow_decompose: bool,
    ) -> StateResult<Applied> {
        let Some(matrix) = op.matrix() else {
            return Ok(Applied::NotApplicable);
        };
        if target.apply_matrix(&matrix, qids)? {
            Ok(Applied::Done)
        } else {
            Ok(Applied::NotApplicable)
        }
    }
}

/// Splits the operation via [`Operation::decompose`] and dispatches each
/// part in order.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decompose;

impl ActOnStrategy for Decompose {
    fn name(&self) -> &'static str {
        "decompose"
    }

    fn try_apply(
        &self,
        dispatcher: &ActOnDispatcher,
        op: &dyn Operation,
        target: &mut dyn ActOnTarget,
        qids: &[Qid],
        allow_decompose: bool,
    ) -> StateResult<Applied> {
        if !allow_decompose {
            return Ok(Applied::NotApplicable);
        }
        let Some(sub_ops) = op.decompose(qids)? else {
            return Ok(Applied::NotApplicable);
        };

        for sub in &sub_ops {
            if let Some(qid) = sub.qids().iter().find(|q| !qids.contains(*q)) {
                return Err(StateError::DecompositionEscapesTargets {
                    operation: op.name().to_string(),
                    qid: *qid,
                });
            }
        }

        trace!(
            "Decomposed '{}' into {} sub-operations",
            op.name(),
            sub_ops.len()
        );
        for sub in &sub_ops {
            dispatcher.act_on(sub.as_ref(), target, sub.qids(), true)?;
        }
        Ok(Applied::Done)
    }
}

/// An ordered list of act-on strategies.
pub struct ActOnDispatcher {
    /// Strategies, tried in order.
    strategies: Vec<Box<dyn ActOnStrategy>>,
}

static DEFAULT_DISPATCHER: LazyLock<ActOnDispatcher> = LazyLock::new(ActOnDispatcher::new);

impl ActOnDispatcher {
    /// Dispatcher with the standard strategies: direct, matrix, decompose.
    pub fn new() -> Self {
        Self::empty()
            .with_strategy(DirectActOn)
            .with_strategy(ApplyMatrix)
            .with_strategy(Decompose)
    }

    /// Dispatcher without any strategy. Every operation is unsupported.
    pub fn empty() -> Self {
        Self { strategies: vec![] }
    }

    /// Append a strategy. It runs after all strategies added before it.
    #[must_use]
    pub fn with_strategy(mut self, strategy: impl ActOnStrategy + 'static) -> Self {
        self.strategies.push(Box::new(strategy));
        self
    }

    /// Names of the strategies, in order.
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Apply `op` to `qids` of `target`.
    pub fn act_on(
        &self,
        op: &dyn Operation,
        target: &mut dyn ActOnTarget,
        qids: &[Qid],
        allow_decompose: bool,
    ) -> StateResult<()> {
        for strategy in &self.strategies {
            match strategy.try_apply(self, op, target, qids, allow_decompose)? {
                Applied::Done => {
                    debug!("Applied '{}' via {} strategy", op.name(), strategy.name());
                    return Ok(());
                }
                Applied::NotApplicable => {
                    trace!("Strategy {} not applicable to '{}'", strategy.name(), op.name());
                }
            }
        }

        Err(StateError::UnsupportedOperation {
            operation: op.name().to_string(),
            representation: target.representation_name().to_string(),
        })
    }
}

impl fmt::Debug for ActOnDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActOnDispatcher")
            .field("strategies", &self.strategy_names())
            .finish()
    }
}

impl Default for ActOnDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `op` to `qids` of `target` with the standard strategies.
pub fn act_on(
    op: &dyn Operation,
    target: &mut dyn ActOnTarget,
    qids: &[Qid],
    allow_decompose: bool,
) -> StateResult<()> {
    DEFAULT_DISPATCHER.act_on(op, target, qids, allow_decompose)
}
