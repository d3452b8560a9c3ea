use std::ops::{Index, IndexMut};

use crate::error::SolveError;

/// Dense row-major matrix holding the constraint rows of a tableau.
///
/// The last column is the right-hand side.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    data: Vec<f64>,
    rows: usize,
    cols: usize,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Self {
        assert!(cols > 0, "a matrix needs at least the right-hand side column");
        Self {
            data: vec![0.0; rows * cols],
            rows,
            cols,
        }
    }

    /// Build from row vectors that must all have `cols` entries.
    pub fn from_rows<I>(cols: usize, rows: I) -> Result<Self, SolveError>
    where
        I: IntoIterator<Item = Vec<f64>>,
    {
        if cols == 0 {
            return Err(SolveError::NoColumns);
        }
        let mut data = Vec::new();
        let mut count = 0;
        for row in rows {
            if row.len() != cols {
                return Err(SolveError::RaggedRow {
                    row: count,
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend(row);
            count += 1;
        }
        Ok(Self {
            data,
            rows: count,
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Index of the right-hand side column
    pub fn rhs_col(&self) -> usize {
        self.cols - 1
    }

    pub fn rhs(&self, row: usize) -> f64 {
        self[(row, self.rhs_col())]
    }

    pub fn row(&self, row: usize) -> &[f64] {
        assert!(row < self.rows, "row {row} out of bounds ({} rows)", self.rows);
        &self.data[row * self.cols..(row + 1) * self.cols]
    }

    pub fn row_mut(&mut self, row: usize) -> &mut [f64] {
        assert!(row < self.rows, "row {row} out of bounds ({} rows)", self.rows);
        &mut self.data[row * self.cols..(row + 1) * self.cols]
    }

    /// Coefficients of a row without the right-hand side
    pub fn coefficients(&self, row: usize) -> &[f64] {
        &self.row(row)[..self.rhs_col()]
    }

    pub fn remove_row(&mut self, row: usize) {
        assert!(row < self.rows, "row {row} out of bounds ({} rows)", self.rows);
        self.data.drain(row * self.cols..(row + 1) * self.cols);
        self.rows -= 1;
    }

    /// Gauss-Jordan step: scale `row` so the pivot becomes 1, then clear
    /// `col` in every other row.
    ///
    /// The pivot element must be nonzero; row and column selection
    /// guarantee this.
    pub fn pivot(&mut self, row: usize, col: usize) {
        let pivot = self[(row, col)];
        debug_assert!(pivot != 0.0, "pivot on zero element at ({row}, {col})");

        let cols = self.cols;
        for value in self.row_mut(row) {
            *value /= pivot;
        }

        let (before, rest) = self.data.split_at_mut(row * cols);
        let (pivot_row, after) = rest.split_at_mut(cols);
        pivot_row[col] = 1.0;

        for other in before
            .chunks_exact_mut(cols)
            .chain(after.chunks_exact_mut(cols))
        {
            let factor = other[col];
            if factor == 0.0 {
                continue;
            }
            for (value, &p) in other.iter_mut().zip(pivot_row.iter()) {
                *value -= factor * p;
            }
            other[col] = 0.0;
        }
    }

    fn offset(&self, row: usize, col: usize) -> usize {
        assert!(
            row < self.rows && col < self.cols,
            "index ({row}, {col}) out of bounds for {}x{} matrix",
            self.rows,
            self.cols
        );
        row * self.cols + col
    }
}

impl Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[self.offset(row, col)]
    }
}

impl IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        let offset = self.offset(row, col);
        &mut self.data[offset]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(rows: &[&[f64]]) -> Matrix {
        Matrix::from_rows(rows[0].len(), rows.iter().map(|r| r.to_vec())).unwrap()
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let err = Matrix::from_rows(3, vec![vec![1.0, 2.0, 3.0], vec![1.0, 2.0]]).unwrap_err();
        assert_eq!(
            err,
            SolveError::RaggedRow {
                row: 1,
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_pivot_clears_column() {
        let mut m = matrix(&[
            &[1.0, 5.0, 7.0, 4.0, -3.0],
            &[2.0, 8.0, 1.0, -4.0, 5.0],
            &[-7.0, 4.0, 2.0, 8.0, 1.0],
        ]);
        m.pivot(1, 2);

        assert_eq!(m[(0, 2)], 0.0);
        assert_eq!(m[(1, 2)], 1.0);
        assert_eq!(m[(2, 2)], 0.0);
        // pivot element was already 1, so the pivot row is unchanged
        assert_eq!(m.row(1), &[2.0, 8.0, 1.0, -4.0, 5.0]);
        assert_eq!(m.row(0), &[-13.0, -51.0, 0.0, 32.0, -38.0]);
    }

    #[test]
    fn test_pivot_normalizes_row() {
        let mut m = matrix(&[&[2.0, 4.0, 8.0], &[1.0, 1.0, 3.0]]);
        m.pivot(0, 0);

        assert_eq!(m.row(0), &[1.0, 2.0, 4.0]);
        assert_eq!(m.row(1), &[0.0, -1.0, -1.0]);
    }

    #[test]
    fn test_remove_row() {
        let mut m = matrix(&[&[1.0, 2.0], &[3.0, 4.0], &[5.0, 6.0]]);
        m.remove_row(1);

        assert_eq!(m.rows(), 2);
        assert_eq!(m.row(1), &[5.0, 6.0]);
        assert_eq!(m.rhs(0), 2.0);
    }

    #[test]
    fn test_zero_columns_rejected() {
        assert_eq!(Matrix::from_rows(0, vec![]), Err(SolveError::NoColumns));
        assert_eq!(Matrix::from_rows(0, vec![vec![]]), Err(SolveError::NoColumns));
    }

    #[test]
    #[should_panic(expected = "right-hand side column")]
    fn test_zeros_without_columns() {
        Matrix::zeros(2, 0);
    }

    #[test]
    #[should_panic]
    fn test_out_of_bounds_index() {
        let m = Matrix::zeros(2, 2);
        let _ = m[(2, 0)];
    }
}
