use crate::error::SolveError;
use crate::matrix::Matrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasisEntry {
    /// The column holding the unit vector for this row
    Resolved(usize),
    Unresolved,
}

/// Basic column per constraint row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Basis {
    entries: Vec<BasisEntry>,
}

impl Basis {
    pub fn unresolved(rows: usize) -> Self {
        Self {
            entries: vec![BasisEntry::Unresolved; rows],
        }
    }

    pub fn get(&self, row: usize) -> BasisEntry {
        self.entries[row]
    }

    pub fn entries(&self) -> &[BasisEntry] {
        &self.entries
    }

    pub fn is_resolved(&self) -> bool {
        self.entries
            .iter()
            .all(|e| matches!(e, BasisEntry::Resolved(_)))
    }

    /// Column indices per row; fails on the first unresolved row.
    pub fn into_columns(self) -> Result<Vec<usize>, SolveError> {
        self.entries
            .into_iter()
            .enumerate()
            .map(|(row, entry)| match entry {
                BasisEntry::Resolved(col) => Ok(col),
                BasisEntry::Unresolved => Err(SolveError::UnresolvedBasis(row)),
            })
            .collect()
    }

    fn resolve(&mut self, row: usize, col: usize) {
        self.entries[row] = BasisEntry::Resolved(col);
    }
}

/// Find the columns that already form an identity sub-matrix.
///
/// The first unit column found for a row wins; scanning stops once every
/// row has one.
pub fn find_basis(matrix: &Matrix, tolerance: f64) -> Basis {
    let mut basis = Basis::unresolved(matrix.rows());
    let mut remaining = matrix.rows();

    for col in 0..matrix.rhs_col() {
        if remaining == 0 {
            break;
        }
        let Some(row) = unit_row(matrix, col, tolerance) else {
            continue;
        };
        if basis.get(row) == BasisEntry::Unresolved {
            basis.resolve(row, col);
            remaining -= 1;
        }
    }

    basis
}

/// Row holding the single 1 of a unit column, if `col` is one
fn unit_row(matrix: &Matrix, col: usize, tolerance: f64) -> Option<usize> {
    let mut one = None;
    for row in 0..matrix.rows() {
        let value = matrix[(row, col)];
        if (value - 1.0).abs() <= tolerance {
            if one.is_some() {
                return None;
            }
            one = Some(row);
        } else if value.abs() > tolerance {
            return None;
        }
    }
    one
}

/// Pivot a basic column into every unresolved row.
///
/// Each unresolved row pivots on its first nonzero coefficient. An all-zero
/// row is dropped when it reads `0 = 0` and makes the problem infeasible
/// when it reads `0 = b`, in which case this returns `false`.
pub fn synthesize_basis(matrix: &mut Matrix, basis: &mut Basis, tolerance: f64) -> bool {
    let mut row = 0;
    while row < matrix.rows() {
        if basis.get(row) != BasisEntry::Unresolved {
            row += 1;
            continue;
        }

        let pivot_col = matrix
            .coefficients(row)
            .iter()
            .position(|v| v.abs() > tolerance);

        match pivot_col {
            Some(col) => {
                log::trace!("synthesizing basis: pivot on ({row}, {col})");
                matrix.pivot(row, col);
                basis.resolve(row, col);
                row += 1;
            }
            None if matrix.rhs(row).abs() > tolerance => {
                log::debug!("row {row} reads 0 = {}", matrix.rhs(row));
                return false;
            }
            None => {
                log::debug!("dropping redundant row {row}");
                matrix.remove_row(row);
                basis.entries.remove(row);
            }
        }
    }
    true
}
