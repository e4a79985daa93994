//! Qubit and qudit identities.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{IrError, IrResult};

/// Dimension of an ordinary qubit.
pub const QUBIT_DIMENSION: u32 = 2;

/// An addressable site of a simulated system: a qubit or, more generally, a
/// qudit with a fixed number of levels.
///
/// Ordering is by index first, then by dimension. Two qids that share an
/// index but differ in dimension are distinct.
///
/// Deserialization goes through [`Qid::qudit`], so a dimension below 2 is
/// rejected there too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "QidRecord", into = "QidRecord")]
pub struct Qid {
    /// Position label of the site (e.g. line index).
    index: u32,
    /// Number of basis levels.
    dimension: u32,
}

/// Serialized form of a [`Qid`].
#[derive(Serialize, Deserialize)]
struct QidRecord {
    index: u32,
    dimension: u32,
}

impl TryFrom<QidRecord> for Qid {
    type Error = IrError;

    fn try_from(record: QidRecord) -> IrResult<Self> {
        Qid::qudit(record.index, record.dimension)
    }
}

impl From<Qid> for QidRecord {
    fn from(qid: Qid) -> Self {
        Self {
            index: qid.index,
            dimension: qid.dimension,
        }
    }
}

impl Qid {
    /// Create a qubit (dimension 2).
    pub const fn qubit(index: u32) -> Self {
        Self {
            index,
            dimension: QUBIT_DIMENSION,
        }
    }

    /// Create a qudit with the given number of levels.
    ///
    /// Returns an error if `dimension < 2`.
    pub fn qudit(index: u32, dimension: u32) -> IrResult<Self> {
        if dimension < QUBIT_DIMENSION {
            return Err(IrError::InvalidDimension { index, dimension });
        }
        Ok(Self { index, dimension })
    }

    /// Position label of the site.
    #[inline]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Number of basis levels, always at least 2.
    #[inline]
    pub fn dimension(&self) -> u32 {
        self.dimension
    }

    /// A contiguous run of qubits `0..n`.
    pub fn qubit_range(n: u32) -> Vec<Self> {
        (0..n).map(Self::qubit).collect()
    }

    /// Whether this site is a two-level system.
    #[inline]
    pub fn is_qubit(&self) -> bool {
        self.dimension == QUBIT_DIMENSION
    }
}

impl fmt::Display for Qid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_qubit() {
            write!(f, "q{}", self.index)
        } else {
            write!(f, "q{} (d={})", self.index, self.dimension)
        }
    }
}

impl From<u32> for Qid {
    fn from(index: u32) -> Self {
        Qid::qubit(index)
    }
}
