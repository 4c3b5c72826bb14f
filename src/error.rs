//! Error types of basis construction, evaluation and transforms.
//!
//! Every error is raised where the precondition is violated and is
//! meant to be fixed by the caller, none of them is transient.
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, BasisError>;

/// Errors that can occur when working with bases.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BasisError {
    /// Quadrature tag is not known for this family.
    #[error("Unsupported quadrature rule '{rule}' for {family} basis")]
    UnsupportedQuadratureRule {
        /// Quadrature tag as given
        rule: String,
        /// Family name
        family: String,
    },

    /// Derivative order above what the family supports.
    #[error("Unsupported derivative order {order} for {family} basis, max is {max}")]
    UnsupportedDerivativeOrder {
        /// Requested order
        order: usize,
        /// Highest supported order
        max: usize,
        /// Family name
        family: String,
    },

    /// Basis index outside of the interior range of the variant.
    #[error("Basis index {index} out of valid range 0..{valid}")]
    IndexOutOfValidRange {
        /// Requested index
        index: usize,
        /// Exclusive upper bound of valid indices
        valid: usize,
    },

    /// Wrong number of boundary values for the variant.
    #[error("{variant} basis expects {expected} boundary values, got {actual}")]
    BoundaryArityMismatch {
        /// Boundary type
        variant: String,
        /// Number of values the variant needs
        expected: usize,
        /// Number of values given
        actual: usize,
    },

    /// Array size along the transform axis does not match the basis.
    #[error("Size mismatch along axis {axis}: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Axis of the array
        axis: usize,
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Invalid construction parameter.
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

impl BasisError {
    /// Create an invalid parameter error.
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
