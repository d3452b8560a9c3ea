use std::collections::HashSet;

use crate::basis::{find_basis, synthesize_basis};
use crate::canonical::{canonicalize, CanonicalTableau};
use crate::error::SolveError;
use crate::feasibility::repair_feasibility;
use crate::matrix::Matrix;
use crate::problem::{Constraint, LpProblem, Objective, Sense};
use crate::solution::{Outcome, Solution};

/// Tableau simplex solver for linear programming problems
#[derive(Debug, Clone)]
pub struct Solver {
    /// Maximum pivots per phase before giving up
    max_iterations: usize,
    /// Tolerance for floating point comparisons
    tolerance: f64,
    /// Fractional digits kept in reported values
    precision: u32,
}

impl Default for Solver {
    fn default() -> Self {
        Self {
            max_iterations: 10000,
            tolerance: 1e-9,
            precision: 8,
        }
    }
}

/// Solve an objective and mixed constraints with the default solver.
///
/// `Ok(None)` means the problem is infeasible or unbounded.
pub fn solve_problem(objective: &Objective, constraints: &[Constraint]) -> Result<Option<Solution>, SolveError> {
    Solver::new()
        .solve_constraints(objective, constraints)
        .map(Outcome::into_solution)
}

/// Solve a tableau already in canonical form with the default solver.
///
/// `Ok(None)` means the problem is infeasible or unbounded.
pub fn solve_canonical(tableau: &CanonicalTableau) -> Result<Option<Solution>, SolveError> {
    Solver::new().solve_tableau(tableau).map(Outcome::into_solution)
}

impl Solver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_tolerance(mut self, tol: f64) -> Self {
        self.tolerance = tol;
        self
    }

    pub fn with_precision(mut self, digits: u32) -> Self {
        self.precision = digits;
        self
    }

    /// Solve a problem; values cover every declared variable.
    ///
    /// A short objective is zero-padded to the variable count. One longer
    /// than the variable list is rejected.
    pub fn solve(&self, problem: &LpProblem) -> Result<Outcome, SolveError> {
        let expected = problem.num_variables();
        let found = problem.objective.coefficients.len();
        if found > expected {
            return Err(SolveError::ObjectiveLength { expected, found });
        }

        let mut objective = problem.objective.clone();
        objective.coefficients.resize(expected, 0.0);
        self.solve_constraints(&objective, &problem.constraints)
    }

    /// Canonicalize, then solve; values cover the original variables only.
    pub fn solve_constraints(&self, objective: &Objective, constraints: &[Constraint]) -> Result<Outcome, SolveError> {
        let tableau = canonicalize(objective, constraints)?;
        self.run(&tableau, objective.coefficients.len())
    }

    /// Solve a canonical tableau; values cover every column.
    pub fn solve_tableau(&self, tableau: &CanonicalTableau) -> Result<Outcome, SolveError> {
        self.run(tableau, tableau.num_variables())
    }

    fn run(&self, tableau: &CanonicalTableau, n_original: usize) -> Result<Outcome, SolveError> {
        log::debug!(
            "solving {} problem: {} rows, {} columns",
            tableau.sense,
            tableau.num_constraints(),
            tableau.num_variables()
        );

        let mut matrix = tableau.constraints.clone();
        let mut basis = find_basis(&matrix, self.tolerance);
        if !basis.is_resolved() && !synthesize_basis(&mut matrix, &mut basis, self.tolerance) {
            log::info!("infeasible: contradictory constraint row");
            return Ok(Outcome::Infeasible);
        }

        let mut workspace = Workspace {
            objective: &tableau.objective,
            sense: tableau.sense,
            basis: basis.into_columns()?,
            matrix,
        };

        if !repair_feasibility(
            &mut workspace.matrix,
            &mut workspace.basis,
            self.tolerance,
            self.max_iterations,
        )? {
            log::info!("infeasible: negative right-hand side cannot be repaired");
            return Ok(Outcome::Infeasible);
        }

        match self.optimize(&mut workspace)? {
            SimplexResult::Optimal { iterations } => {
                log::info!("optimal after {iterations} pivots");
                Ok(Outcome::Optimal(Solution::extract(
                    workspace.objective,
                    &workspace.matrix,
                    &workspace.basis,
                    n_original,
                    self.precision,
                    iterations,
                )))
            }
            SimplexResult::Unbounded => {
                log::info!("unbounded");
                Ok(Outcome::Unbounded)
            }
        }
    }

    /// Pivot on reduced costs until none can improve the objective.
    ///
    /// Starts with the most improving column and the first minimum ratio.
    /// Once a basis repeats the loop is cycling, and it switches to Bland's
    /// rule for the rest of the solve.
    fn optimize(&self, workspace: &mut Workspace) -> Result<SimplexResult, SolveError> {
        let mut rule = PivotRule::Dantzig;
        let mut visited = HashSet::new();
        visited.insert(workspace.basis.clone());
        let mut iterations = 0;

        loop {
            let deltas = workspace.deltas();
            let Some(col) = entering_column(&deltas, workspace.sense, rule, self.tolerance) else {
                return Ok(SimplexResult::Optimal { iterations });
            };
            let Some(row) = leaving_row(&workspace.matrix, &workspace.basis, col, rule, self.tolerance) else {
                log::debug!("column {col} has no positive entry");
                return Ok(SimplexResult::Unbounded);
            };
            if iterations == self.max_iterations {
                return Err(SolveError::IterationLimit(self.max_iterations));
            }
            iterations += 1;

            log::trace!("pivot on ({row}, {col}), delta {}", deltas[col]);
            workspace.pivot(row, col);

            if !visited.insert(workspace.basis.clone()) && rule == PivotRule::Dantzig {
                log::debug!("basis repeated after {iterations} pivots, switching to Bland's rule");
                rule = PivotRule::Bland;
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PivotRule {
    /// Most improving reduced cost
    Dantzig,
    /// Lowest index, guaranteed not to cycle
    Bland,
}

#[derive(Debug, PartialEq)]
enum SimplexResult {
    Optimal { iterations: usize },
    Unbounded,
}

/// State of one solve: the tableau and the basic column of every row
struct Workspace<'a> {
    objective: &'a [f64],
    sense: Sense,
    matrix: Matrix,
    basis: Vec<usize>,
}

impl Workspace<'_> {
    /// Reduced cost of every column: `sum_i a[i][j] * c[basis[i]] - c[j]`
    fn deltas(&self) -> Vec<f64> {
        (0..self.objective.len())
            .map(|col| {
                let z: f64 = self
                    .basis
                    .iter()
                    .enumerate()
                    .map(|(row, &basic)| self.matrix[(row, col)] * self.objective[basic])
                    .sum();
                z - self.objective[col]
            })
            .collect()
    }

    fn pivot(&mut self, row: usize, col: usize) {
        self.matrix.pivot(row, col);
        self.basis[row] = col;
    }
}

fn entering_column(deltas: &[f64], sense: Sense, rule: PivotRule, tolerance: f64) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (col, &delta) in deltas.iter().enumerate() {
        if !sense.is_improving(delta, tolerance) {
            continue;
        }
        if rule == PivotRule::Bland {
            return Some(col);
        }
        let better = match best {
            None => true,
            Some(b) => match sense {
                Sense::Maximize => delta < deltas[b],
                Sense::Minimize => delta > deltas[b],
            },
        };
        if better {
            best = Some(col);
        }
    }
    best
}

/// Ratio test over rows with a positive entry in `col`.
fn leaving_row(matrix: &Matrix, basis: &[usize], col: usize, rule: PivotRule, tolerance: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for row in 0..matrix.rows() {
        let val = matrix[(row, col)];
        if val <= tolerance {
            continue;
        }
        let ratio = matrix.rhs(row) / val;
        best = match best {
            None => Some((row, ratio)),
            Some((_, min)) if ratio < min - tolerance => Some((row, ratio)),
            Some((min_row, min))
                if rule == PivotRule::Bland
                    && (ratio - min).abs() <= tolerance
                    && basis[row] < basis[min_row] =>
            {
                Some((row, ratio))
            }
            keep => keep,
        };
    }
    best.map(|(row, _)| row)
}
