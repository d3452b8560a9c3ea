use tableau_solver::{Relation, Sense};

use crate::lexer::Span;

/// A parsed problem file: the objective line, then one line per constraint
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub objective: ObjectiveLine,
    pub constraints: Vec<ConstraintLine>,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveLine {
    pub span: Span,
    pub terms: Vec<Term>,
    pub sense: Sense,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintLine {
    pub span: Span,
    pub terms: Vec<Term>,
    pub relation: Relation,
    pub rhs: f64,
}

/// `coefficient * x<variable>`, sign already applied
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub span: Span,
    pub coefficient: f64,
    /// 1-based index as written in the source
    pub variable: usize,
}

impl Program {
    /// Largest variable index referenced anywhere
    pub fn max_variable(&self) -> usize {
        self.objective
            .terms
            .iter()
            .chain(self.constraints.iter().flat_map(|c| &c.terms))
            .map(|t| t.variable)
            .max()
            .unwrap_or(0)
    }
}
