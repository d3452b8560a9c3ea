use std::path::Path;

use tableau_solver::LpProblem;
use thiserror::Error;

use crate::ast::*;
use crate::lexer::Span;
use crate::Parser;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Variable x{index} at position {span:?}: indices start at 1")]
    InvalidVariableIndex { index: usize, span: Span },
    #[error("Variable x{index} at position {span:?} exceeds the limit of {limit} variables")]
    VariableIndexTooLarge { index: usize, limit: usize, span: Span },
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error in {0}: {1}")]
    ParseError(String, String),
}

/// Largest variable index a problem file may use
pub const MAX_VARIABLES: usize = 100_000;

/// Compiler for converting a parsed problem file to an LP problem
#[derive(Debug, Clone)]
pub struct Compiler {
    /// Prefix for generated constraint names
    constraint_prefix: String,
}

impl Compiler {
    pub fn new() -> Self {
        Self {
            constraint_prefix: "c".to_string(),
        }
    }

    pub fn with_constraint_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.constraint_prefix = prefix.into();
        self
    }

    /// Lower a program to dense coefficient rows.
    ///
    /// The variable count is the largest index used on any line, so every
    /// row comes out the same width. Repeated terms for one variable add up.
    pub fn compile(&self, program: &Program) -> Result<LpProblem, CompileError> {
        let terms = program
            .objective
            .terms
            .iter()
            .chain(program.constraints.iter().flat_map(|c| &c.terms));
        for term in terms {
            check_index(term)?;
        }

        let n = program.max_variable();
        let variables = (1..=n).map(|i| format!("x{i}")).collect();

        let mut problem = LpProblem::new(variables);
        problem.set_objective(dense(&program.objective.terms, n), program.objective.sense);

        for (i, line) in program.constraints.iter().enumerate() {
            problem.add_constraint(
                format!("{}{}", self.constraint_prefix, i + 1),
                dense(&line.terms, n),
                line.relation,
                line.rhs,
            );
        }

        Ok(problem)
    }

    pub fn compile_source(&self, source: &str) -> Result<LpProblem, CompileError> {
        let program = Parser::parse(source)
            .map_err(|e| CompileError::ParseError("<source>".to_string(), e.to_string()))?;
        self.compile(&program)
    }
}

/// Read, parse, and compile a problem file
pub fn load_file(path: impl AsRef<Path>) -> Result<LpProblem, CompileError> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .map_err(|e| CompileError::IoError(format!("{}: {}", path.display(), e)))?;
    let program = Parser::parse(&source)
        .map_err(|e| CompileError::ParseError(path.display().to_string(), e.to_string()))?;
    Compiler::new().compile(&program)
}

/// Indices are 1-based and bounded so the dense rows stay allocatable
fn check_index(term: &Term) -> Result<(), CompileError> {
    match term.variable {
        0 => Err(CompileError::InvalidVariableIndex {
            index: 0,
            span: term.span,
        }),
        index if index > MAX_VARIABLES => Err(CompileError::VariableIndexTooLarge {
            index,
            limit: MAX_VARIABLES,
            span: term.span,
        }),
        _ => Ok(()),
    }
}

/// Expects indices already validated by `check_index`
fn dense(terms: &[Term], n: usize) -> Vec<f64> {
    let mut coefficients = vec![0.0; n];
    for term in terms {
        coefficients[term.variable - 1] += term.coefficient;
    }
    coefficients
}

#[cfg(test)]
mod tests {
    use super::*;
    use tableau_solver::{Relation, Sense, Solver};

    #[test]
    fn test_compile_pads_to_widest_line() {
        let source = "3x1 - x2 -> min\nx1 + x4 >= 2\n2x2 = 1";
        let problem = Compiler::new().compile_source(source).unwrap();

        assert_eq!(problem.variables, vec!["x1", "x2", "x3", "x4"]);
        assert_eq!(problem.objective.coefficients, vec![3.0, -1.0, 0.0, 0.0]);
        assert_eq!(problem.objective.sense, Sense::Minimize);
        assert_eq!(problem.constraints[0].coefficients, vec![1.0, 0.0, 0.0, 1.0]);
        assert_eq!(problem.constraints[0].relation, Relation::Ge);
        assert_eq!(problem.constraints[1].name, "c2");
        assert_eq!(problem.constraints[1].coefficients, vec![0.0, 2.0, 0.0, 0.0]);
    }

    #[test]
    fn test_repeated_terms_add_up() {
        let problem = Compiler::new()
            .with_constraint_prefix("row")
            .compile_source("x1 + 2x1 - x2 -> max\nx2 - x2 + x1 <= 5")
            .unwrap();

        assert_eq!(problem.objective.coefficients, vec![3.0, -1.0]);
        assert_eq!(problem.constraints[0].coefficients, vec![1.0, 0.0]);
        assert_eq!(problem.constraints[0].name, "row1");
    }

    #[test]
    fn test_zero_index_rejected() {
        let err = Compiler::new().compile_source("x0 + x1 -> max").unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidVariableIndex {
                index: 0,
                span: Span::new(0, 2)
            }
        );
    }

    #[test]
    fn test_huge_index_rejected() {
        let err = Compiler::new()
            .compile_source("x1 -> max\nx1 + x18446744073709551615 <= 3")
            .unwrap_err();
        assert_eq!(
            err,
            CompileError::VariableIndexTooLarge {
                index: usize::MAX,
                limit: MAX_VARIABLES,
                span: Span::new(13, 36)
            }
        );

        let err = Compiler::new().compile_source("x999999999 -> min").unwrap_err();
        assert!(matches!(err, CompileError::VariableIndexTooLarge { index: 999999999, .. }), "{err:?}");
    }

    #[test]
    fn test_largest_allowed_index() {
        let source = format!("x{MAX_VARIABLES} -> max\nx{MAX_VARIABLES} <= 1");
        let problem = Compiler::new().compile_source(&source).unwrap();
        assert_eq!(problem.num_variables(), MAX_VARIABLES);
        assert_eq!(problem.objective.coefficients[MAX_VARIABLES - 1], 1.0);
    }

    #[test]
    fn test_parse_errors_are_wrapped() {
        let err = Compiler::new().compile_source("x1 ->").unwrap_err();
        assert!(matches!(err, CompileError::ParseError(..)), "{err:?}");
    }

    #[test]
    fn test_load_and_solve_file() {
        let path = std::env::temp_dir().join(format!("tableau-lang-{}.lp", std::process::id()));
        std::fs::write(
            &path,
            "9x1 + 5x2 + 4x3 + 3x4 + 2x5 -> max\n\
             x1 - 2x2 + 2x3 + x6 = 6\n\
             x1 + 2x2 + x3 + x4 = 24\n\
             2x1 + x2 - 4x3 + x5 = 30\n",
        )
        .unwrap();

        let problem = load_file(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let outcome = Solver::new().solve(&problem).unwrap();
        let solution = outcome.solution().unwrap();
        assert_eq!(solution.values, vec![0.0, 7.0, 10.0, 0.0, 63.0, 0.0]);
        assert_eq!(solution.objective_value, 201.0);
    }

    #[test]
    fn test_missing_file() {
        let err = load_file("/nonexistent/problem.lp").unwrap_err();
        assert!(matches!(err, CompileError::IoError(_)), "{err:?}");
    }
}
