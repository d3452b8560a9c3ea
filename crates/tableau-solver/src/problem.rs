use std::fmt;
use std::str::FromStr;

use crate::error::SolveError;
use crate::solution::ConstraintViolation;

/// Represents a linear programming problem over non-negative variables
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpProblem {
    /// Variable names
    pub variables: Vec<String>,
    /// Objective function
    pub objective: Objective,
    /// Constraints
    pub constraints: Vec<Constraint>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    /// Coefficients for each variable
    pub coefficients: Vec<f64>,
    /// Whether to maximize or minimize
    pub sense: Sense,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Name/label for the constraint (for diagnostics)
    pub name: String,
    /// Coefficients for each variable, zero-padded to the variable count
    pub coefficients: Vec<f64>,
    /// Comparison operator
    pub relation: Relation,
    /// Right-hand side value
    pub rhs: f64,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Less than or equal (<=)
    Le,
    /// Greater than or equal (>=)
    Ge,
    /// Equal (=)
    Eq,
}

impl Sense {
    /// Whether a reduced cost still promises a better objective.
    pub fn is_improving(self, delta: f64, tolerance: f64) -> bool {
        match self {
            Sense::Maximize => delta < -tolerance,
            Sense::Minimize => delta > tolerance,
        }
    }
}

impl FromStr for Sense {
    type Err = SolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "max" | "maximize" => Ok(Sense::Maximize),
            "min" | "minimize" => Ok(Sense::Minimize),
            _ => Err(SolveError::UnknownSense(s.to_string())),
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Maximize => write!(f, "max"),
            Sense::Minimize => write!(f, "min"),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Le => write!(f, "<="),
            Relation::Ge => write!(f, ">="),
            Relation::Eq => write!(f, "="),
        }
    }
}

impl Objective {
    pub fn new(coefficients: Vec<f64>, sense: Sense) -> Self {
        Self { coefficients, sense }
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(c, v)| c * v)
            .sum()
    }
}

impl Constraint {
    pub fn new(name: impl Into<String>, coefficients: Vec<f64>, relation: Relation, rhs: f64) -> Self {
        Self {
            name: name.into(),
            coefficients,
            relation,
            rhs,
        }
    }

    /// Left-hand side evaluated at `values`; missing values count as zero.
    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(c, v)| c * v)
            .sum()
    }

    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        let lhs = self.lhs(values);
        match self.relation {
            Relation::Le => lhs <= self.rhs + tolerance,
            Relation::Ge => lhs >= self.rhs - tolerance,
            Relation::Eq => (lhs - self.rhs).abs() <= tolerance,
        }
    }
}

impl LpProblem {
    pub fn new(variables: Vec<String>) -> Self {
        let n = variables.len();
        Self {
            variables,
            objective: Objective {
                coefficients: vec![0.0; n],
                sense: Sense::Maximize,
            },
            constraints: Vec::new(),
        }
    }

    pub fn set_objective(&mut self, coefficients: Vec<f64>, sense: Sense) {
        self.objective = Objective { coefficients, sense };
    }

    pub fn add_constraint(&mut self, name: impl Into<String>, coefficients: Vec<f64>, relation: Relation, rhs: f64) {
        self.constraints.push(Constraint::new(name, coefficients, relation, rhs));
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Constraints that `values` break, worst first
    pub fn violations(&self, values: &[f64], tolerance: f64) -> Vec<ConstraintViolation> {
        let mut violations: Vec<ConstraintViolation> = self
            .constraints
            .iter()
            .filter(|c| !c.is_satisfied_by(values, tolerance))
            .map(|c| {
                let actual = c.lhs(values);
                ConstraintViolation {
                    constraint: c.name.clone(),
                    relation: c.relation,
                    required: c.rhs,
                    actual,
                    amount: (actual - c.rhs).abs(),
                }
            })
            .collect();

        violations.sort_by(|a, b| b.amount.total_cmp(&a.amount));
        violations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sense_from_str() {
        assert_eq!("max".parse::<Sense>().unwrap(), Sense::Maximize);
        assert_eq!("MIN".parse::<Sense>().unwrap(), Sense::Minimize);
        assert_eq!(" minimize ".parse::<Sense>().unwrap(), Sense::Minimize);
        assert_eq!(
            "best".parse::<Sense>(),
            Err(SolveError::UnknownSense("best".to_string()))
        );
    }

    #[test]
    fn test_improving_direction() {
        assert!(Sense::Maximize.is_improving(-1.0, 1e-9));
        assert!(!Sense::Maximize.is_improving(1.0, 1e-9));
        assert!(Sense::Minimize.is_improving(1.0, 1e-9));
        assert!(!Sense::Minimize.is_improving(-1e-12, 1e-9));
    }

    #[test]
    fn test_violations_sorted_worst_first() {
        let mut problem = LpProblem::new(vec!["x".to_string(), "y".to_string()]);
        problem.set_objective(vec![1.0, 1.0], Sense::Minimize);
        problem.add_constraint("sum", vec![1.0, 1.0], Relation::Ge, 10.0);
        problem.add_constraint("x_max", vec![1.0], Relation::Le, 1.0);
        problem.add_constraint("y_fixed", vec![0.0, 1.0], Relation::Eq, 2.0);

        let violations = problem.violations(&[3.0, 2.0], 1e-9);

        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].constraint, "sum");
        assert!((violations[0].amount - 5.0).abs() < 1e-12);
        assert_eq!(violations[1].constraint, "x_max");
        assert!((violations[1].actual - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_objective_evaluate() {
        let objective = Objective::new(vec![9.0, 5.0, 4.0], Sense::Maximize);
        assert_eq!(objective.evaluate(&[0.0, 7.0, 10.0]), 75.0);
    }
}
