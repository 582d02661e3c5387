//! Error taxonomy for the reliability engine
//!
//! Formula-level edge cases (λ = 0, k > n, n = 0) are numeric policies and
//! never show up here. These variants cover structural problems that the
//! caller has to fix before a number can be produced.

use miette::Diagnostic;
use thiserror::Error;

use crate::entities::component::ComponentType;

/// Errors raised by the component formulas, the aggregator and the Markov solver
#[derive(Debug, Clone, PartialEq, Error, Diagnostic)]
pub enum ReliabilityError {
    #[error("Invalid parameters for {component_type} component '{component}': {reason}")]
    #[diagnostic(
        code(mtbf::invalid_parameters),
        help("Run `mtbf component types` to see the keys each component type expects")
    )]
    InvalidParameters {
        component: String,
        component_type: ComponentType,
        reason: String,
    },

    #[error("System has no components")]
    #[diagnostic(
        code(mtbf::empty_system),
        help("Add at least one entry under `components:` before running the analysis")
    )]
    EmptySystem,

    /// `row` is set when a single row breaks the zero row-sum property
    #[error("Invalid generator matrix: {reason}")]
    #[diagnostic(code(mtbf::invalid_generator))]
    InvalidGenerator { reason: String, row: Option<usize> },

    #[error("Degenerate rate: {context}")]
    #[diagnostic(code(mtbf::degenerate_rate))]
    DegenerateRate { context: String },
}

impl ReliabilityError {
    /// Build an `InvalidParameters` error for a named component
    pub fn invalid_parameters(
        component: impl Into<String>,
        component_type: ComponentType,
        reason: impl Into<String>,
    ) -> Self {
        ReliabilityError::InvalidParameters {
            component: component.into(),
            component_type,
            reason: reason.into(),
        }
    }

    /// `InvalidGenerator` for a whole-matrix problem (shape, finiteness, solve)
    pub fn invalid_generator(reason: impl Into<String>) -> Self {
        ReliabilityError::InvalidGenerator {
            reason: reason.into(),
            row: None,
        }
    }

    /// `InvalidGenerator` for a row whose rates do not sum to zero
    pub fn unbalanced_row(row: usize, sum: f64, tolerance: f64) -> Self {
        ReliabilityError::InvalidGenerator {
            reason: format!(
                "row {} sums to {:e} (tolerance {:e}); each diagonal entry must equal minus the sum of the other rates in its row",
                row, sum, tolerance
            ),
            row: Some(row),
        }
    }
}
