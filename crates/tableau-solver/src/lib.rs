mod basis;
mod canonical;
mod error;
mod feasibility;
mod matrix;
mod problem;
mod simplex;
mod solution;

pub use basis::{find_basis, synthesize_basis, Basis, BasisEntry};
pub use canonical::{canonicalize, CanonicalTableau, Cell};
pub use error::SolveError;
pub use feasibility::repair_feasibility;
pub use matrix::Matrix;
pub use problem::{Constraint, LpProblem, Objective, Relation, Sense};
pub use simplex::{solve_canonical, solve_problem, Solver};
pub use solution::{round_to, ConstraintViolation, Outcome, Solution, Status, MAX_PRECISION};
