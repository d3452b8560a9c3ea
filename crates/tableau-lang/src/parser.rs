use tableau_solver::{Relation, Sense};
use thiserror::Error;

use crate::ast::*;
use crate::lexer::{Span, Token, TokenKind};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at position {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of file")]
    UnexpectedEof,
    #[error("Missing objective line")]
    MissingObjective,
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Invalid variable: {0}")]
    InvalidVariable(String),
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn parse(source: &str) -> Result<Program, ParseError> {
        let tokens = crate::lexer::Lexer::tokenize(source);
        let mut parser = Parser::new(tokens);
        parser.parse_program()
    }

    fn current(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Eof)
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    /// Comments end at a newline, so skipping them never leaves the line
    fn skip_comments(&mut self) {
        while self.peek_kind() == TokenKind::Comment {
            self.advance();
        }
    }

    fn skip_blank_lines(&mut self) {
        while matches!(self.peek_kind(), TokenKind::Newline | TokenKind::Comment) {
            self.advance();
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        match self.current() {
            Some(t) if t.kind != TokenKind::Eof => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("{:?}", t.kind),
                span: t.span,
            },
            _ => ParseError::UnexpectedEof,
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, ParseError> {
        self.skip_comments();
        match self.current().cloned() {
            Some(t) if t.kind == kind => {
                self.advance();
                Ok(t)
            }
            _ => Err(self.unexpected(&format!("{:?}", kind))),
        }
    }

    fn expect_end_of_line(&mut self) -> Result<(), ParseError> {
        self.skip_comments();
        match self.peek_kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of line")),
        }
    }

    fn parse_program(&mut self) -> Result<Program, ParseError> {
        self.skip_blank_lines();
        if self.peek_kind() == TokenKind::Eof {
            return Err(ParseError::MissingObjective);
        }
        let objective = self.parse_objective()?;

        let mut constraints = Vec::new();
        loop {
            self.skip_blank_lines();
            if self.peek_kind() == TokenKind::Eof {
                break;
            }
            constraints.push(self.parse_constraint()?);
        }

        Ok(Program {
            objective,
            constraints,
        })
    }

    fn parse_objective(&mut self) -> Result<ObjectiveLine, ParseError> {
        let (terms, span) = self.parse_expression()?;

        // The arrow before the direction is optional
        self.skip_comments();
        if self.peek_kind() == TokenKind::Arrow {
            self.advance();
        }

        self.skip_comments();
        let sense = match self.peek_kind() {
            TokenKind::Max => Sense::Maximize,
            TokenKind::Min => Sense::Minimize,
            _ => return Err(self.unexpected("max or min")),
        };
        let end = self.advance().map(|t| t.span).unwrap_or(span);
        self.expect_end_of_line()?;

        Ok(ObjectiveLine {
            span: span.merge(end),
            terms,
            sense,
        })
    }

    fn parse_constraint(&mut self) -> Result<ConstraintLine, ParseError> {
        let (terms, span) = self.parse_expression()?;

        self.skip_comments();
        let relation = match self.peek_kind() {
            TokenKind::LessEq => Relation::Le,
            TokenKind::GreaterEq => Relation::Ge,
            TokenKind::Equal => Relation::Eq,
            _ => return Err(self.unexpected("<=, >= or =")),
        };
        self.advance();

        let (rhs, end) = self.parse_signed_number()?;
        self.expect_end_of_line()?;

        Ok(ConstraintLine {
            span: span.merge(end),
            terms,
            relation,
            rhs,
        })
    }

    /// One or more terms; a term without a leading sign is added
    fn parse_expression(&mut self) -> Result<(Vec<Term>, Span), ParseError> {
        let first = self.parse_term()?;
        let mut span = first.span;
        let mut terms = vec![first];

        loop {
            self.skip_comments();
            match self.peek_kind() {
                TokenKind::Plus | TokenKind::Minus | TokenKind::Number | TokenKind::Variable => {
                    let term = self.parse_term()?;
                    span = span.merge(term.span);
                    terms.push(term);
                }
                _ => break,
            }
        }

        Ok((terms, span))
    }

    fn parse_term(&mut self) -> Result<Term, ParseError> {
        self.skip_comments();
        let start = self
            .current()
            .map(|t| t.span)
            .ok_or(ParseError::UnexpectedEof)?;

        let sign = self.parse_sign();

        let coefficient = if self.peek_kind() == TokenKind::Number {
            let token = self.expect(TokenKind::Number)?;
            if self.peek_kind() == TokenKind::Star {
                self.advance();
            }
            parse_number(&token.text)?
        } else {
            1.0
        };

        let variable = self.expect(TokenKind::Variable)?;
        let index = variable.text[1..]
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidVariable(variable.text.clone()))?;

        Ok(Term {
            span: start.merge(variable.span),
            coefficient: sign * coefficient,
            variable: index,
        })
    }

    fn parse_sign(&mut self) -> f64 {
        match self.peek_kind() {
            TokenKind::Plus => {
                self.advance();
                1.0
            }
            TokenKind::Minus => {
                self.advance();
                -1.0
            }
            _ => 1.0,
        }
    }

    fn parse_signed_number(&mut self) -> Result<(f64, Span), ParseError> {
        self.skip_comments();
        let start = self
            .current()
            .map(|t| t.span)
            .ok_or(ParseError::UnexpectedEof)?;
        let sign = self.parse_sign();
        let token = self.expect(TokenKind::Number)?;
        Ok((sign * parse_number(&token.text)?, start.merge(token.span)))
    }
}

fn parse_number(text: &str) -> Result<f64, ParseError> {
    text.parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_problem() {
        let source = r#"
            9x1 + 5x2 + 4x3 + 3x4 + 2x5 -> max
            x1 - 2x2 + 2x3 + x6 = 6
            x1 + 2x2 + x3 + x4 <= 24
        "#;
        let program = Parser::parse(source).unwrap();

        assert_eq!(program.objective.sense, Sense::Maximize);
        assert_eq!(program.objective.terms.len(), 5);
        assert_eq!(program.constraints.len(), 2);

        let first = &program.constraints[0];
        assert_eq!(first.relation, Relation::Eq);
        assert_eq!(first.rhs, 6.0);
        let coefficients: Vec<_> = first.terms.iter().map(|t| (t.coefficient, t.variable)).collect();
        assert_eq!(coefficients, vec![(1.0, 1), (-2.0, 2), (2.0, 3), (1.0, 6)]);
        assert_eq!(program.max_variable(), 6);
    }

    #[test]
    fn test_signed_terms_without_spaces() {
        let source = "+3x1 -x2 -> min\n-4x1 -3x2 >= -33";
        let program = Parser::parse(source).unwrap();

        assert_eq!(program.objective.sense, Sense::Minimize);
        let objective: Vec<_> = program.objective.terms.iter().map(|t| t.coefficient).collect();
        assert_eq!(objective, vec![3.0, -1.0]);

        let constraint = &program.constraints[0];
        assert_eq!(constraint.relation, Relation::Ge);
        assert_eq!(constraint.rhs, -33.0);
    }

    #[test]
    fn test_implicit_plus_and_star() {
        let program = Parser::parse("2 * x1 1.5x2 max").unwrap();
        let terms: Vec<_> = program.objective.terms.iter().map(|t| (t.coefficient, t.variable)).collect();
        assert_eq!(terms, vec![(2.0, 1), (1.5, 2)]);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let source = "# objective\nx1 + x2 -> max // profit\n\n// capacity\nx1 + x2 <= 4 # total\n";
        let program = Parser::parse(source).unwrap();
        assert_eq!(program.constraints.len(), 1);
        assert_eq!(program.constraints[0].rhs, 4.0);
    }

    #[test]
    fn test_missing_sense() {
        let err = Parser::parse("x1 + x2 ->\nx1 <= 3").unwrap_err();
        match err {
            ParseError::UnexpectedToken { expected, found, .. } => {
                assert_eq!(expected, "max or min");
                assert_eq!(found, "Newline");
            }
            other => panic!("Expected unexpected token, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_relation() {
        let err = Parser::parse("x1 -> max\nx1 + x2 < 4").unwrap_err();
        match err {
            ParseError::UnexpectedToken { expected, found, .. } => {
                assert_eq!(expected, "<=, >= or =");
                assert_eq!(found, "Error");
            }
            other => panic!("Expected unexpected token, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_rhs() {
        assert_eq!(
            Parser::parse("x1 -> max\nx1 <=").unwrap_err(),
            ParseError::UnexpectedEof
        );
    }

    #[test]
    fn test_trailing_garbage() {
        let err = Parser::parse("x1 -> max\nx1 <= 4 5").unwrap_err();
        match err {
            ParseError::UnexpectedToken { expected, span, .. } => {
                assert_eq!(expected, "end of line");
                assert_eq!(span, Span::new(18, 19));
            }
            other => panic!("Expected unexpected token, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(
            Parser::parse("\n  # nothing\n").unwrap_err(),
            ParseError::MissingObjective
        );
    }

    #[test]
    fn test_variable_overflow() {
        let err = Parser::parse("x99999999999999999999999 -> max").unwrap_err();
        assert_eq!(
            err,
            ParseError::InvalidVariable("x99999999999999999999999".to_string())
        );
    }
}
