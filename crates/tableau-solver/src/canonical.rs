use crate::error::SolveError;
use crate::matrix::Matrix;
use crate::problem::{Constraint, Objective, Relation, Sense};

/// One entry of a raw canonical table: a number, or the direction token
/// that closes the objective row.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Token(String),
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i32> for Cell {
    fn from(value: i32) -> Self {
        Cell::Number(f64::from(value))
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Token(value.to_string())
    }
}

/// Equality-only tableau: objective coefficients for every column and one
/// constraint row per equation, right-hand side last.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalTableau {
    pub objective: Vec<f64>,
    pub sense: Sense,
    pub constraints: Matrix,
}

impl CanonicalTableau {
    pub fn new(objective: Vec<f64>, sense: Sense, constraints: Matrix) -> Result<Self, SolveError> {
        if constraints.cols() != objective.len() + 1 {
            return Err(SolveError::RaggedRow {
                row: 1,
                expected: objective.len() + 1,
                found: constraints.cols(),
            });
        }
        Ok(Self {
            objective,
            sense,
            constraints,
        })
    }

    /// Build from the row layout `[c.., sense]`, then `[a.., b]` per constraint.
    pub fn from_rows(rows: Vec<Vec<Cell>>) -> Result<Self, SolveError> {
        let mut rows = rows.into_iter();
        let mut header = rows.next().ok_or(SolveError::EmptyTableau)?;

        let sense = match header.pop() {
            Some(Cell::Token(token)) => token.parse::<Sense>()?,
            Some(Cell::Number(_)) | None => return Err(SolveError::MissingSense),
        };
        let objective = numeric_row(0, header)?;
        let width = objective.len() + 1;

        let constraints = rows
            .enumerate()
            .map(|(i, row)| {
                let row = numeric_row(i + 1, row)?;
                if row.len() != width {
                    return Err(SolveError::RaggedRow {
                        row: i + 1,
                        expected: width,
                        found: row.len(),
                    });
                }
                Ok(row)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(objective, sense, Matrix::from_rows(width, constraints)?)
    }

    /// Number of columns excluding the right-hand side
    pub fn num_variables(&self) -> usize {
        self.objective.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.rows()
    }
}

fn numeric_row(row: usize, cells: Vec<Cell>) -> Result<Vec<f64>, SolveError> {
    cells
        .into_iter()
        .enumerate()
        .map(|(col, cell)| match cell {
            Cell::Number(value) => Ok(value),
            Cell::Token(value) => Err(SolveError::NonNumeric { row, col, value }),
        })
        .collect()
}

/// Convert an objective and mixed constraints into equality form.
///
/// Every `<=` row gains a slack column (+1) and every `>=` row a surplus
/// column (-1). Right-hand sides keep their sign.
pub fn canonicalize(objective: &Objective, constraints: &[Constraint]) -> Result<CanonicalTableau, SolveError> {
    let n_vars = objective.coefficients.len();
    let n_slack = constraints
        .iter()
        .filter(|c| c.relation != Relation::Eq)
        .count();
    let total_cols = n_vars + n_slack + 1; // +1 for RHS

    let mut coefficients = objective.coefficients.clone();
    coefficients.resize(n_vars + n_slack, 0.0);

    let mut matrix = Matrix::zeros(constraints.len(), total_cols);
    let mut slack_idx = n_vars;

    for (i, c) in constraints.iter().enumerate() {
        if c.coefficients.len() > n_vars {
            return Err(SolveError::DimensionMismatch {
                constraint: c.name.clone(),
                expected: n_vars,
                found: c.coefficients.len(),
            });
        }

        // Original variables; shorter rows stay zero-padded
        matrix.row_mut(i)[..c.coefficients.len()].copy_from_slice(&c.coefficients);
        matrix[(i, total_cols - 1)] = c.rhs;

        match c.relation {
            Relation::Le => {
                matrix[(i, slack_idx)] = 1.0;
                slack_idx += 1;
            }
            Relation::Ge => {
                matrix[(i, slack_idx)] = -1.0; // surplus
                slack_idx += 1;
            }
            Relation::Eq => {}
        }
    }

    CanonicalTableau::new(coefficients, objective.sense, matrix)
}
