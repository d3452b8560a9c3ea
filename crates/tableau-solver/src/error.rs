use thiserror::Error;

/// Hard failures: the input could not be turned into a tableau, or the
/// solver gave up. Infeasible and unbounded problems are not errors, see
/// [`crate::Outcome`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SolveError {
    #[error("Row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("Constraint {constraint} has {found} coefficients but the objective has {expected}")]
    DimensionMismatch {
        constraint: String,
        expected: usize,
        found: usize,
    },
    #[error("A matrix needs at least the right-hand side column")]
    NoColumns,
    #[error("Objective has {found} coefficients but the problem declares {expected} variables")]
    ObjectiveLength { expected: usize, found: usize },
    #[error("Empty tableau: expected an objective row")]
    EmptyTableau,
    #[error("Missing optimization direction at the end of the objective row")]
    MissingSense,
    #[error("Unknown optimization direction: {0}")]
    UnknownSense(String),
    #[error("Non-numeric value {value:?} at row {row}, column {col}")]
    NonNumeric {
        row: usize,
        col: usize,
        value: String,
    },
    #[error("Row {0} has no basic variable")]
    UnresolvedBasis(usize),
    #[error("Iteration limit of {0} reached")]
    IterationLimit(usize),
}
