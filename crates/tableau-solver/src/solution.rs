use std::fmt;

use crate::matrix::Matrix;
use crate::problem::Relation;

/// An optimal vertex of an LP problem
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Optimal values for each original variable
    pub values: Vec<f64>,
    /// Optimal objective value
    pub objective_value: f64,
    /// Pivots taken by the optimizer loop
    pub iterations: usize,
}

/// How a solve ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// An optimal solution was found
    Optimal(Solution),
    /// The constraints admit no non-negative solution
    Infeasible,
    /// The objective improves without bound
    Unbounded,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Optimal,
    Infeasible,
    Unbounded,
}

/// Information about a violated constraint
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    /// Constraint name
    pub constraint: String,
    pub relation: Relation,
    /// Required value (from constraint RHS)
    pub required: f64,
    /// Actual value achieved
    pub actual: f64,
    /// How much the constraint is violated by
    pub amount: f64,
}

impl Solution {
    /// Read the basic variable values off a final tableau.
    ///
    /// The objective is evaluated over every canonical column before the
    /// values are truncated to the first `n_original` variables.
    pub(crate) fn extract(
        objective: &[f64],
        matrix: &Matrix,
        basis: &[usize],
        n_original: usize,
        precision: u32,
        iterations: usize,
    ) -> Self {
        let mut values = vec![0.0; objective.len()];
        for (row, &col) in basis.iter().enumerate() {
            values[col] = matrix.rhs(row);
        }

        let objective_value: f64 = objective.iter().zip(&values).map(|(c, v)| c * v).sum();

        values.truncate(n_original);
        Self {
            values: values.into_iter().map(|v| round_to(v, precision)).collect(),
            objective_value: round_to(objective_value, precision),
            iterations,
        }
    }
}

impl Outcome {
    pub fn status(&self) -> Status {
        match self {
            Outcome::Optimal(_) => Status::Optimal,
            Outcome::Infeasible => Status::Infeasible,
            Outcome::Unbounded => Status::Unbounded,
        }
    }

    pub fn solution(&self) -> Option<&Solution> {
        match self {
            Outcome::Optimal(solution) => Some(solution),
            _ => None,
        }
    }

    pub fn into_solution(self) -> Option<Solution> {
        match self {
            Outcome::Optimal(solution) => Some(solution),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Optimal => write!(f, "OPTIMAL"),
            Status::Infeasible => write!(f, "INFEASIBLE"),
            Status::Unbounded => write!(f, "UNBOUNDED"),
        }
    }
}

/// Most fractional digits an `f64` can carry meaningfully
pub const MAX_PRECISION: u32 = 15;

/// Round to `precision` fractional digits, folding `-0.0` into `0.0`.
///
/// `precision` is capped at [`MAX_PRECISION`]. Values too large to scale
/// are returned unchanged.
pub fn round_to(value: f64, precision: u32) -> f64 {
    let scale = 10f64.powi(precision.min(MAX_PRECISION) as i32);
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / scale;
    if rounded == 0.0 { 0.0 } else { rounded }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(6.999999999999, 8), 7.0);
        assert_eq!(round_to(2.5 / 3.0, 2), 0.83);
        assert!(round_to(-1e-12, 8).is_sign_positive());
    }

    #[test]
    fn test_round_to_large_precision() {
        assert_eq!(round_to(0.0, 400), 0.0);
        assert_eq!(round_to(201.0, 300), 201.0);
        assert_eq!(round_to(201.0, u32::MAX), 201.0);
        assert_eq!(round_to(1e305, 8), 1e305);
    }

    #[test]
    fn test_extract_truncates_and_rounds() {
        let matrix = Matrix::from_rows(
            4,
            vec![vec![0.0, 1.0, 0.0, 2.000000000001], vec![1.0, 0.0, 1.0, 3.0]],
        )
        .unwrap();
        let objective = [1.0, 2.0, 5.0];

        let solution = Solution::extract(&objective, &matrix, &[1, 2], 2, 8, 4);

        assert_eq!(solution.values, vec![0.0, 2.0]);
        // the truncated column still counts towards the objective
        assert_eq!(solution.objective_value, 19.0);
        assert_eq!(solution.iterations, 4);
    }

    #[test]
    fn test_outcome_into_solution() {
        assert_eq!(Outcome::Infeasible.into_solution(), None);
        assert_eq!(Outcome::Unbounded.status(), Status::Unbounded);
        assert_eq!(Status::Optimal.to_string(), "OPTIMAL");
    }
}
