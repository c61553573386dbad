//! Error type shared by every synapse crate.

use std::fmt;

/// Every failure a tensor operation or layer can report.
///
/// Errors are raised before any mutation begins, so the operands of a
/// failed call are left exactly as they were.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SynapseError {
    /// Operands of a tensor operation have incompatible dimensions.
    #[error("{op}: shape mismatch between {lhs:?} and {rhs:?}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Vec<usize>,
        rhs: Vec<usize>,
    },

    /// A layer received an input whose feature dimensions disagree with its
    /// declared input shape, or which has no batch dimension.
    #[error("{0}")]
    ShapeError(String),

    /// A layer was built or invoked with a rank it does not handle.
    #[error("{layer}: unsupported shape {got:?} ({expected})")]
    UnsupportedShape {
        layer: &'static str,
        expected: &'static str,
        got: Vec<usize>,
    },

    #[error("unsupported initializer: {0}")]
    UnsupportedInitializer(String),

    #[error("unsupported activation: {0}")]
    UnsupportedActivation(String),

    #[error("unsupported pooling type: {0}")]
    UnsupportedPooling(String),

    #[error("unsupported padding type: {0}")]
    UnsupportedPadding(String),

    /// A numeric configuration value is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Coarse classification of a [`SynapseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ShapeMismatch,
    ShapeError,
    UnsupportedShape,
    UnsupportedInitializer,
    UnsupportedActivation,
    UnsupportedPooling,
    UnsupportedPadding,
    InvalidParameter,
}

impl SynapseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SynapseError::ShapeMismatch { .. } => ErrorKind::ShapeMismatch,
            SynapseError::ShapeError(_) => ErrorKind::ShapeError,
            SynapseError::UnsupportedShape { .. } => ErrorKind::UnsupportedShape,
            SynapseError::UnsupportedInitializer(_) => ErrorKind::UnsupportedInitializer,
            SynapseError::UnsupportedActivation(_) => ErrorKind::UnsupportedActivation,
            SynapseError::UnsupportedPooling(_) => ErrorKind::UnsupportedPooling,
            SynapseError::UnsupportedPadding(_) => ErrorKind::UnsupportedPadding,
            SynapseError::InvalidParameter(_) => ErrorKind::InvalidParameter,
        }
    }

    pub(crate) fn shape_mismatch(op: &'static str, lhs: &[usize], rhs: &[usize]) -> Self {
        SynapseError::ShapeMismatch {
            op,
            lhs: lhs.to_vec(),
            rhs: rhs.to_vec(),
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
