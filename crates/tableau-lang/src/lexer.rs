use std::str::Chars;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Max,
    Min,

    // Literals
    Number,
    Variable,
    Ident,

    // Operators
    Plus,
    Minus,
    Star,
    Arrow,
    LessEq,
    GreaterEq,
    Equal,

    // Special
    Newline,
    Comment,
    Eof,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current;
        self.current = self.chars.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        c
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_comment(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        Token::new(
            TokenKind::Comment,
            Span::new(start, self.pos),
            &self.source[start..self.pos],
        )
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;

        // Integer part
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
            } else {
                break;
            }
        }

        // Decimal part
        if self.peek() == Some('.') && self.peek_next().is_some_and(|c| c.is_ascii_digit()) {
            self.advance(); // consume the dot
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    self.advance();
                } else {
                    break;
                }
            }
        }

        Token::new(
            TokenKind::Number,
            Span::new(start, self.pos),
            &self.source[start..self.pos],
        )
    }

    fn read_ident(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];
        let kind = match text.to_ascii_lowercase().as_str() {
            "max" | "maximize" => TokenKind::Max,
            "min" | "minimize" => TokenKind::Min,
            _ if is_variable(text) => TokenKind::Variable,
            _ => TokenKind::Ident,
        };
        Token::new(kind, Span::new(start, self.pos), text)
    }

    /// Emit a one- or two-character operator token
    fn operator(&mut self, kind: TokenKind, len: usize) -> Token {
        let start = self.pos;
        for _ in 0..len {
            self.advance();
        }
        Token::new(kind, Span::new(start, self.pos), &self.source[start..self.pos])
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), "");
        };

        match (c, self.peek_next()) {
            ('\n', _) => self.operator(TokenKind::Newline, 1),
            ('#', _) | ('/', Some('/')) => self.read_comment(),
            ('-', Some('>')) => self.operator(TokenKind::Arrow, 2),
            ('<', Some('=')) => self.operator(TokenKind::LessEq, 2),
            ('>', Some('=')) => self.operator(TokenKind::GreaterEq, 2),
            ('=', _) => self.operator(TokenKind::Equal, 1),
            ('+', _) => self.operator(TokenKind::Plus, 1),
            ('-', _) => self.operator(TokenKind::Minus, 1),
            ('*', _) => self.operator(TokenKind::Star, 1),
            (c, _) if c.is_ascii_digit() => self.read_number(),
            (c, _) if c.is_alphabetic() || c == '_' => self.read_ident(),
            _ => self.operator(TokenKind::Error, 1),
        }
    }
}

/// `x` or `X` followed by at least one digit
fn is_variable(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some('x' | 'X'))
        && !chars.as_str().is_empty()
        && chars.all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source).iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_objective_line() {
        assert_eq!(
            kinds("9x1 + 5x2 -> max"),
            vec![
                TokenKind::Number,
                TokenKind::Variable,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Variable,
                TokenKind::Arrow,
                TokenKind::Max,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_relations() {
        assert_eq!(
            kinds("<= >= = - *"),
            vec![
                TokenKind::LessEq,
                TokenKind::GreaterEq,
                TokenKind::Equal,
                TokenKind::Minus,
                TokenKind::Star,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens = Lexer::tokenize("100 8.5 0.005 3.");
        let texts: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["100", "8.5", "0.005", "3", ".", ""]);
        assert_eq!(tokens[4].kind, TokenKind::Error);
    }

    #[test]
    fn test_variables_and_idents() {
        assert_eq!(
            kinds("x12 X3 x y2 MIN"),
            vec![
                TokenKind::Variable,
                TokenKind::Variable,
                TokenKind::Ident,
                TokenKind::Ident,
                TokenKind::Min,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments() {
        assert_eq!(
            kinds("x1 # note\n// whole line\nx2"),
            vec![
                TokenKind::Variable,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Comment,
                TokenKind::Newline,
                TokenKind::Variable,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_spans() {
        let tokens = Lexer::tokenize("+3x2 <= 10");
        assert_eq!(tokens[1].span, Span::new(1, 2));
        assert_eq!(tokens[2].span, Span::new(2, 4));
        assert_eq!(tokens[3].span, Span::new(5, 7));
        assert_eq!(tokens[1].span.merge(tokens[2].span), Span::new(1, 4));
    }
}
