use crate::error::SolveError;
use crate::matrix::Matrix;

/// Pivot until no right-hand side is negative.
///
/// Works on the row with the most negative right-hand side, pivoting on its
/// most negative coefficient. Returns `Ok(false)` when such a row has no
/// negative coefficient: its left-hand side can never go below zero, so the
/// problem is infeasible.
pub fn repair_feasibility(
    matrix: &mut Matrix,
    basis: &mut [usize],
    tolerance: f64,
    max_iterations: usize,
) -> Result<bool, SolveError> {
    let mut iterations = 0;
    loop {
        let Some(row) = most_negative_rhs(matrix, tolerance) else {
            return Ok(true);
        };
        let Some(col) = most_negative_coefficient(matrix, row, tolerance) else {
            log::debug!(
                "row {row} has rhs {} and no negative coefficient",
                matrix.rhs(row)
            );
            return Ok(false);
        };
        if iterations == max_iterations {
            return Err(SolveError::IterationLimit(max_iterations));
        }
        iterations += 1;

        log::trace!("repairing rhs: pivot on ({row}, {col})");
        matrix.pivot(row, col);
        basis[row] = col;
    }
}

fn most_negative_rhs(matrix: &Matrix, tolerance: f64) -> Option<usize> {
    let mut min_val = -tolerance;
    let mut min_row = None;
    for row in 0..matrix.rows() {
        let rhs = matrix.rhs(row);
        if rhs < min_val {
            min_val = rhs;
            min_row = Some(row);
        }
    }
    min_row
}

fn most_negative_coefficient(matrix: &Matrix, row: usize, tolerance: f64) -> Option<usize> {
    let mut min_val = -tolerance;
    let mut min_col = None;
    for (col, &value) in matrix.coefficients(row).iter().enumerate() {
        if value < min_val {
            min_val = value;
            min_col = Some(col);
        }
    }
    min_col
}
